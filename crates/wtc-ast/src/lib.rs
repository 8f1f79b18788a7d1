//! Document tree for classical-layout markup.
//!
//! The parser produces a [`Document`], the grid layout engine consumes it.
//! Node kinds form a closed enumeration so every consumer matches them
//! exhaustively.

use serde::Serialize;

mod options;

pub use options::{parse_key_value, Options};

// =============================================================================
// Document root
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Template selector from `\documentclass[...]`, empty when absent
    pub template: String,
    /// Document class name from `\documentclass{...}`
    pub document_class: String,
    pub title: String,
    /// Chapter heading, may contain `\\` line separators
    pub chapter: String,
    /// Setup directives in source order
    pub setup: Vec<SetupDirective>,
    pub children: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body containers (`document` environments) at the top level.
    pub fn bodies(&self) -> impl Iterator<Item = &Node> {
        self.children
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Body))
    }
}

/// A `\xxxSetup{...}` directive or punctuation-mode switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupDirective {
    pub kind: SetupKind,
    pub params: Options,
}

impl SetupDirective {
    pub fn new(kind: SetupKind, params: Options) -> Self {
        Self { kind, params }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetupKind {
    Content,
    Page,
    Banxin,
    SideNote,
    Jiazhu,
    PiZhu,
    MeiPi,
    Guji,
    Judou,
    JudouOn,
    JudouOff,
    JudouNone,
}

impl std::fmt::Display for SetupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SetupKind::Content => "content",
            SetupKind::Page => "page",
            SetupKind::Banxin => "banxin",
            SetupKind::SideNote => "sidenode",
            SetupKind::Jiazhu => "jiazhu",
            SetupKind::PiZhu => "pizhu",
            SetupKind::MeiPi => "meipi",
            SetupKind::Guji => "guji",
            SetupKind::Judou => "judou",
            SetupKind::JudouOn => "judou-on",
            SetupKind::JudouOff => "judou-off",
            SetupKind::JudouNone => "judou-none",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Nodes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Options::is_empty")]
    pub options: Options,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            options: Options::new(),
            children: Vec::new(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            value: value.into(),
        })
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    /// Concatenated text of this node and all descendants, markup dropped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Number of grid cells the plain text fills. Source line breaks take no cell.
    pub fn char_count(&self) -> usize {
        match &self.kind {
            NodeKind::Text { value } => cell_chars(value).count(),
            _ => self.children.iter().map(Node::char_count).sum(),
        }
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match &node.kind {
        NodeKind::Text { value } => out.push_str(value),
        _ => node.children.iter().for_each(|child| collect_text(child, out)),
    }
}

/// Characters of `text` that occupy a grid cell.
pub fn cell_chars(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().filter(|c| !matches!(c, '\n' | '\r'))
}

/// Plain text of a slice of sibling nodes.
pub fn plain_text_of(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        collect_text(node, &mut out);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    // Structural containers
    Body,
    ContentBlock,
    Paragraph,
    List,
    ListItem,
    /// Bare `{...}` group with more than one child
    Group,
    /// Environment with no registered definition
    Unknown {
        name: String,
    },

    // Inline content
    Text {
        value: String,
    },
    Math {
        value: String,
    },
    /// Forced intra-column newline (`\\`)
    Newline,
    ParagraphBreak,
    ColumnBreak,

    // Annotations
    Jiazhu {
        /// Single-column variant, never balanced into two sub-columns
        single: bool,
    },
    SideNote,
    MeiPi,
    PiZhu,
    TextBox,
    FillTextBox,
    Stamp {
        src: String,
    },
    Decoration {
        style: DecorationStyle,
    },

    // Layout directives
    Space {
        count: usize,
    },
    NuoTai {
        count: usize,
    },
    Taitou {
        level: usize,
    },
    RelativeTaitou {
        offset: usize,
    },
    SetIndent {
        indent: usize,
    },
    CatalogEntry,
}

impl NodeKind {
    /// Floating kinds never occupy grid cells.
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            NodeKind::MeiPi | NodeKind::PiZhu | NodeKind::Stamp { .. }
        )
    }

    pub fn is_elevation(&self) -> bool {
        matches!(self, NodeKind::Taitou { .. } | NodeKind::RelativeTaitou { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DecorationStyle {
    Emphasis,
    Decorate,
    ProperName,
    BookTitle,
    Inverted,
    Octagon,
    Circled,
    InvertedOctagon,
    Fix,
}

impl std::fmt::Display for DecorationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DecorationStyle::Emphasis => "emphasis",
            DecorationStyle::Decorate => "decorate",
            DecorationStyle::ProperName => "proper name",
            DecorationStyle::BookTitle => "book title",
            DecorationStyle::Inverted => "inverted",
            DecorationStyle::Octagon => "octagon",
            DecorationStyle::Circled => "circled",
            DecorationStyle::InvertedOctagon => "inverted octagon",
            DecorationStyle::Fix => "fix",
        };
        f.write_str(name)
    }
}
