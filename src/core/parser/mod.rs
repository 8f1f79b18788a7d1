//! Markup parser
//!
//! Tokenizes source text and builds a [`Document`] against the command and
//! environment registries. Parsing always succeeds; problems are reported
//! as [`ParseWarning`]s in document order.

mod builder;
pub mod lexer;
pub mod registry;
pub mod token;

pub use builder::Parser;
pub use lexer::{tokenize, Lexer};
pub use token::{detokenize, Token};

use wtc_ast::Document;

// =============================================================================
// Warning System
// =============================================================================

/// Kind of warning generated during parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A command with no registered definition
    UnknownCommand,
    /// An environment with no registered definition
    UnknownEnvironment,
    /// Input ended inside an environment
    UnclosedEnvironment,
    /// An `\end` that does not close the open environment
    MismatchedEnd,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::UnknownCommand => write!(f, "unknown command"),
            WarningKind::UnknownEnvironment => write!(f, "unknown environment"),
            WarningKind::UnclosedEnvironment => write!(f, "unclosed environment"),
            WarningKind::MismatchedEnd => write!(f, "mismatched end"),
        }
    }
}

/// A warning generated while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// The kind of warning
    pub kind: WarningKind,
    /// Human-readable message
    pub message: String,
    /// Location context (e.g., "token 42")
    pub location: Option<String>,
}

impl ParseWarning {
    /// Create a new warning
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        ParseWarning {
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Add location context to the warning
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn unknown_command(name: &str) -> Self {
        ParseWarning::new(WarningKind::UnknownCommand, format!("Unknown command: \\{}", name))
    }

    pub fn unknown_environment(name: &str) -> Self {
        ParseWarning::new(
            WarningKind::UnknownEnvironment,
            format!("Unknown environment: {}", name),
        )
    }

    pub fn unclosed_environment(name: &str) -> Self {
        ParseWarning::new(
            WarningKind::UnclosedEnvironment,
            format!("Unclosed environment: {}", name),
        )
    }

    /// `expected` is the open environment, `None` when nothing is open
    pub fn mismatched_end(found: &str, expected: Option<&str>) -> Self {
        let message = match expected {
            Some(expected) => {
                format!("Mismatched \\end{{{}}}, expected \\end{{{}}}", found, expected)
            }
            None => format!("Mismatched \\end{{{}}}, no environment is open", found),
        };
        ParseWarning::new(WarningKind::MismatchedEnd, message)
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {}", self.message, location),
            None => write!(f, "{}", self.message),
        }
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Parsed document plus its warnings
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub document: Document,
    pub warnings: Vec<ParseWarning>,
}

impl ParseOutput {
    /// Warnings as plain strings, in document order
    pub fn format_warnings(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Tokenize and parse `source`
pub fn parse(source: &str) -> ParseOutput {
    let tokens = tokenize(source);
    log::debug!("parsing {} tokens", tokens.len());
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wtc_ast::{DecorationStyle, Node, NodeKind, SetupKind};

    fn body_of(source: &str) -> Vec<Node> {
        let out = parse(source);
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.format_warnings());
        out.document.children
    }

    #[test]
    fn test_metadata_commands() {
        let out = parse(
            "\\documentclass[四库全书]{ltc-guji}\\title{欽定四庫全書}\\chapter{史記\\\\卷一}",
        );
        let doc = &out.document;
        assert_eq!(doc.template, "四库全书");
        assert_eq!(doc.document_class, "ltc-guji");
        assert_eq!(doc.title, "欽定四庫全書");
        assert_eq!(doc.chapter, "史記\\\\卷一");
        assert!(doc.children.is_empty());
    }

    #[test]
    fn test_setup_directive_params() {
        let out = parse("\\contentSetup{font-size=28pt, n-column=8}");
        let setup = &out.document.setup[0];
        assert_eq!(setup.kind, SetupKind::Content);
        assert_eq!(setup.params.get("font-size"), Some("28pt"));
        assert_eq!(setup.params.get("n-column"), Some("8"));
    }

    #[test]
    fn test_setup_keeps_nested_braces() {
        let out = parse("\\pageSetup{color={180, 95, 75}, border}");
        let params = &out.document.setup[0].params;
        assert_eq!(params.get("color"), Some("{180, 95, 75}"));
        assert_eq!(params.get("border"), Some("true"));
    }

    #[test]
    fn test_punctuation_mode_switch_is_setup() {
        let out = parse("\\句读模式 \\正常标点模式");
        let kinds: Vec<_> = out.document.setup.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SetupKind::JudouOn, SetupKind::JudouOff]);
    }

    #[test]
    fn test_unknown_command_fallback() {
        let out = parse("\\foo{bar}");
        assert_eq!(out.warnings.len(), 1);
        assert!(out.format_warnings()[0].contains("Unknown command"));
        assert_eq!(out.document.children, vec![Node::text("bar")]);
    }

    #[test]
    fn test_unclosed_environment() {
        let out = parse("\\begin{正文}天地");
        assert_eq!(out.warnings.len(), 1);
        assert!(out.format_warnings()[0].contains("Unclosed environment"));
        assert_eq!(out.document.children[0].kind, NodeKind::ContentBlock);
        assert_eq!(out.document.children[0].plain_text(), "天地");
    }

    #[test]
    fn test_mismatched_end_is_ignored() {
        let out = parse("\\begin{正文}天\\end{段落}地\\end{正文}");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::MismatchedEnd);
        assert_eq!(out.document.children[0].plain_text(), "天地");
    }

    #[test]
    fn test_stray_end_does_not_hang() {
        let out = parse("天\\end{正文}地");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.document.children, vec![Node::text("天"), Node::text("地")]);
    }

    #[test]
    fn test_unknown_environment_keeps_body() {
        let out = parse("\\begin{奇}天\\end{奇}");
        assert!(out.format_warnings()[0].contains("Unknown environment"));
        let node = &out.document.children[0];
        assert_eq!(node.kind, NodeKind::Unknown { name: "奇".into() });
        assert_eq!(node.plain_text(), "天");
    }

    #[test]
    fn test_list_items_grouped() {
        let nodes = body_of("\\begin{列表}\\item 甲\\item 乙\\end{列表}");
        let list = &nodes[0];
        assert_eq!(list.kind, NodeKind::List);
        assert_eq!(list.children.len(), 2);
        assert!(list.children.iter().all(|c| c.kind == NodeKind::ListItem));
        assert_eq!(list.children[1].plain_text(), "乙");
    }

    #[test]
    fn test_list_implicit_first_item() {
        let nodes = body_of("\\begin{列表}前\\item 后\\end{列表}");
        assert_eq!(nodes[0].children.len(), 2);
        assert_eq!(nodes[0].children[0].plain_text(), "前");
    }

    #[test]
    fn test_space_and_default_taitou() {
        let nodes = body_of("\\空格[3]\\平抬\\抬头[]\\抬头");
        assert_eq!(nodes[0].kind, NodeKind::Space { count: 3 });
        assert_eq!(nodes[1].kind, NodeKind::Taitou { level: 0 });
        assert_eq!(nodes[1].options.get("value"), Some("0"));
        // present but empty: no default applied
        assert_eq!(nodes[2].kind, NodeKind::Taitou { level: 0 });
        assert_eq!(nodes[3].kind, NodeKind::Taitou { level: 1 });
    }

    #[test]
    fn test_nested_markup_in_argument() {
        let nodes = body_of("\\夹注{甲\\抬头[2]乙}");
        let jiazhu = &nodes[0];
        assert_eq!(jiazhu.kind, NodeKind::Jiazhu { single: false });
        assert_eq!(jiazhu.children.len(), 3);
        assert_eq!(jiazhu.children[1].kind, NodeKind::Taitou { level: 2 });
    }

    #[test]
    fn test_jiazhu_options_and_alias() {
        let nodes = body_of("\\JiaZhu[align=inward]{小字}");
        assert_eq!(nodes[0].options.get("align"), Some("inward"));
        assert_eq!(nodes[0].plain_text(), "小字");
    }

    #[test]
    fn test_paragraph_environment_options() {
        let nodes = body_of("\\begin{段落}[indent=2]文\\end{段落}");
        assert_eq!(nodes[0].kind, NodeKind::Paragraph);
        assert_eq!(nodes[0].options.get_usize("indent"), Some(2));
    }

    #[test]
    fn test_same_named_environments_nest() {
        let nodes =
            body_of("\\begin{段落}[indent=1]甲\\begin{段落}[indent=2]乙\\end{段落}丙\\end{段落}");
        assert_eq!(nodes.len(), 1);
        let outer = &nodes[0];
        assert_eq!(outer.kind, NodeKind::Paragraph);
        assert_eq!(outer.options.get_usize("indent"), Some(1));
        assert_eq!(outer.children.len(), 3);
        assert_eq!(outer.children[0], Node::text("甲"));
        assert_eq!(outer.children[2], Node::text("丙"));

        let inner = &outer.children[1];
        assert_eq!(inner.kind, NodeKind::Paragraph);
        assert_eq!(inner.options.get_usize("indent"), Some(2));
        assert_eq!(inner.children, vec![Node::text("乙")]);
    }

    #[test]
    fn test_decoration_and_stamp() {
        let nodes = body_of("\\圈点{要}\\印章[x=1]{seal.png}");
        assert_eq!(
            nodes[0].kind,
            NodeKind::Decoration {
                style: DecorationStyle::Emphasis
            }
        );
        assert_eq!(nodes[1].kind, NodeKind::Stamp { src: "seal.png".into() });
        assert!(nodes[1].children.is_empty());
    }

    #[test]
    fn test_bare_groups() {
        assert!(body_of("{}").is_empty());
        assert_eq!(body_of("{天}"), vec![Node::text("天")]);
        let nodes = body_of("{天\\\\地}");
        assert_eq!(nodes[0].kind, NodeKind::Group);
        assert_eq!(nodes[0].children.len(), 3);
    }

    #[test]
    fn test_ignored_commands_consume_args() {
        assert_eq!(body_of("\\usepackage[x]{y}\\definecolor{a}{b}{c}天"), vec![Node::text("天")]);
    }

    #[test]
    fn test_stray_brackets_are_text() {
        assert_eq!(
            body_of("天[地]"),
            vec![Node::text("天"), Node::text("["), Node::text("地"), Node::text("]")]
        );
    }

    #[test]
    fn test_metadata_in_argument_is_dropped() {
        let out = parse("\\夹注{\\title{内}注}");
        assert_eq!(out.document.title, "");
        assert_eq!(out.document.children[0].plain_text(), "注");
    }

    #[test]
    fn test_warning_display_has_location() {
        let out = parse("\\foo");
        assert_eq!(out.format_warnings(), vec!["Unknown command: \\foo at token 0".to_string()]);
    }
}
