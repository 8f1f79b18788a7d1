//! Compile options and configuration resolution
//!
//! The parser collects the raw inputs (the `\documentclass` template name
//! and the setup directives). [`ResolvedConfig::resolve`] turns them into
//! the grid geometry and punctuation mode the layout engine runs with.

pub mod templates;

use serde::Serialize;
use wtc_ast::{Document, SetupDirective, SetupKind};

use crate::core::preprocess::DEFAULT_MAX_PASSES;
use crate::utils::{WtcError, WtcResult};

pub use templates::{grid_for, template_id, DEFAULT_TEMPLATE_ID};

// =============================================================================
// Grid geometry
// =============================================================================

/// Cells per column and columns per half page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub rows_per_column: usize,
    pub columns_per_half_page: usize,
}

impl GridConfig {
    /// Validated constructor; both dimensions must be positive.
    pub fn new(rows_per_column: usize, columns_per_half_page: usize) -> WtcResult<Self> {
        if rows_per_column == 0 || columns_per_half_page == 0 {
            return Err(WtcError::InvalidGrid {
                rows: rows_per_column,
                cols: columns_per_half_page,
            });
        }
        Ok(Self {
            rows_per_column,
            columns_per_half_page,
        })
    }

    /// Columns on a full page (both halves)
    pub fn columns_per_page(&self) -> usize {
        2 * self.columns_per_half_page
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows_per_column: 21,
            columns_per_half_page: 8,
        }
    }
}

impl std::fmt::Display for GridConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows_per_column, self.columns_per_half_page)
    }
}

// =============================================================================
// Punctuation
// =============================================================================

/// How CJK punctuation in running text is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PunctuationMode {
    /// Punctuation occupies cells like any other character
    #[default]
    Normal,
    /// Clause marks detach onto the preceding cell, book-title brackets
    /// become decorations
    Judou,
    /// All CJK punctuation is dropped
    None,
}

impl PunctuationMode {
    /// Mode selected by a setup directive, if it is a mode switch
    pub fn from_setup(kind: SetupKind) -> Option<Self> {
        match kind {
            SetupKind::JudouOn => Some(PunctuationMode::Judou),
            SetupKind::JudouOff => Some(PunctuationMode::Normal),
            SetupKind::JudouNone => Some(PunctuationMode::None),
            _ => None,
        }
    }
}

impl std::str::FromStr for PunctuationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(PunctuationMode::Normal),
            "judou" => Ok(PunctuationMode::Judou),
            "none" => Ok(PunctuationMode::None),
            other => Err(format!("unknown punctuation mode: {}", other)),
        }
    }
}

impl std::fmt::Display for PunctuationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PunctuationMode::Normal => write!(f, "normal"),
            PunctuationMode::Judou => write!(f, "judou"),
            PunctuationMode::None => write!(f, "none"),
        }
    }
}

// =============================================================================
// Compile options
// =============================================================================

/// Options for a compile run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Ceiling on macro expansion passes
    /// Default: 20
    pub max_expansion_passes: usize,

    /// Template name or id that wins over the document's own choice
    /// Default: None
    pub template_override: Option<String>,

    /// Punctuation mode that wins over the document's mode switches
    /// Default: None
    pub punctuation_override: Option<PunctuationMode>,

    /// Grid geometry that wins over the template's
    /// Default: None
    pub grid_override: Option<GridConfig>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_expansion_passes: DEFAULT_MAX_PASSES,
            template_override: None,
            punctuation_override: None,
            grid_override: None,
        }
    }
}

impl CompileOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out without any punctuation in the text
    pub fn unpunctuated() -> Self {
        Self {
            punctuation_override: Some(PunctuationMode::None),
            ..Self::default()
        }
    }

    /// Lay out with judou marks regardless of the document's switches
    pub fn judou() -> Self {
        Self {
            punctuation_override: Some(PunctuationMode::Judou),
            ..Self::default()
        }
    }

    pub fn with_template(mut self, name: impl Into<String>) -> Self {
        self.template_override = Some(name.into());
        self
    }

    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid_override = Some(grid);
        self
    }

    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_expansion_passes = passes;
        self
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Document metadata carried through to the layout result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub title: String,
    pub chapter: String,
    #[serde(rename = "setupDirectives")]
    pub setup: Vec<SetupDirective>,
}

/// Everything the layout engine needs besides the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub template_id: &'static str,
    pub grid: GridConfig,
    pub punctuation: PunctuationMode,
    pub meta: Meta,
}

impl ResolvedConfig {
    /// Resolve template, grid and punctuation mode for a parsed document.
    ///
    /// Template precedence, lowest first: the `\documentclass` option, the
    /// last `\gujiSetup{template=...}` naming a known template, then
    /// [`CompileOptions::template_override`]. Punctuation: the last mode
    /// switch, then the override.
    pub fn resolve(doc: &Document, options: &CompileOptions) -> Self {
        let mut template = template_id(&doc.template).unwrap_or(DEFAULT_TEMPLATE_ID);
        let mut punctuation = PunctuationMode::default();

        for directive in &doc.setup {
            if directive.kind == SetupKind::Guji {
                if let Some(id) = directive.params.get("template").and_then(template_id) {
                    template = id;
                }
            }
            if let Some(mode) = PunctuationMode::from_setup(directive.kind) {
                punctuation = mode;
            }
        }

        if let Some(name) = &options.template_override {
            match template_id(name) {
                Some(id) => template = id,
                None => log::warn!("unknown template override {:?}, keeping {}", name, template),
            }
        }
        let punctuation = options.punctuation_override.unwrap_or(punctuation);
        let grid = options.grid_override.unwrap_or_else(|| grid_for(template));

        log::debug!(
            "resolved template {} with grid {} and {} punctuation",
            template,
            grid,
            punctuation
        );

        ResolvedConfig {
            template_id: template,
            grid,
            punctuation,
            meta: Meta {
                title: doc.title.clone(),
                chapter: doc.chapter.clone(),
                setup: doc.setup.clone(),
            },
        }
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            template_id: DEFAULT_TEMPLATE_ID,
            grid: GridConfig::default(),
            punctuation: PunctuationMode::default(),
            meta: Meta::default(),
        }
    }
}
