//! # webtex-cn
//!
//! Compiler for a TeX-like markup dialect used to typeset classical Chinese
//! books on a woodblock-style grid.
//!
//! ## Pipeline
//!
//! 1. Macro expansion of user commands from a template configuration
//! 2. Tokenizing and parsing into a [`wtc_ast::Document`]
//! 3. Grid layout into pages of placed items
//!
//! Every stage is total: malformed markup yields warnings and a best-effort
//! tree, never an error.
//!
//! ## Quick Start
//!
//! ```rust
//! use webtex_cn::{compile, CompileOptions};
//!
//! let source = "\\begin{document}\\begin{正文}天地玄黃\\end{正文}\\end{document}";
//! let compiled = compile(source, None, &CompileOptions::default());
//! assert!(compiled.warnings.is_empty());
//!
//! let layout = compiled.layout();
//! assert_eq!(layout.page_count(), 1);
//! ```

pub mod config;
pub mod core;
pub mod utils;

use std::path::Path;

pub use wtc_ast;
use wtc_ast::Document;

pub use crate::config::{CompileOptions, GridConfig, Meta, PunctuationMode, ResolvedConfig};
pub use crate::core::layout::slices::{balance, HalfSlice, PageSlices};
pub use crate::core::layout::{
    layout, JiazhuPlacement, LayoutResult, Marker, Page, PlacedItem, Placement,
};
pub use crate::core::parser::{parse, ParseOutput, ParseWarning, WarningKind};
pub use crate::core::preprocess::{parse_cfg, MacroSet, DEFAULT_MAX_PASSES};
pub use crate::utils::{WtcError, WtcResult};

/// Expand configuration macros in `source`.
///
/// Without a configuration the source is returned unchanged.
pub fn preprocess(source: &str, cfg: Option<&str>, max_passes: usize) -> String {
    match cfg {
        Some(cfg) => crate::core::preprocess::preprocess_with_cfg(source, cfg, max_passes),
        None => source.to_string(),
    }
}

/// Output of the front end, ready for layout
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Source after macro expansion
    pub expanded_source: String,
    pub document: Document,
    pub warnings: Vec<ParseWarning>,
    pub config: ResolvedConfig,
}

impl Compilation {
    /// Lay out the parsed document with the resolved configuration.
    pub fn layout(&self) -> LayoutResult<'_> {
        layout(&self.document, &self.config)
    }

    /// Warnings as plain strings, in document order
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Run macro expansion and parsing, then resolve the layout configuration.
pub fn compile(source: &str, cfg: Option<&str>, options: &CompileOptions) -> Compilation {
    let expanded_source = preprocess(source, cfg, options.max_expansion_passes);
    let ParseOutput { document, warnings } = parse(&expanded_source);
    let config = ResolvedConfig::resolve(&document, options);
    log::debug!(
        "compiled {} bytes with {} warning(s)",
        source.len(),
        warnings.len()
    );

    Compilation {
        expanded_source,
        document,
        warnings,
        config,
    }
}

/// Read a source file (and optional configuration file) and compile it.
pub fn compile_file(
    path: &Path,
    cfg_path: Option<&Path>,
    options: &CompileOptions,
) -> WtcResult<Compilation> {
    let source = std::fs::read_to_string(path).map_err(|err| WtcError::io(path, err))?;
    let cfg = cfg_path
        .map(|cfg| std::fs::read_to_string(cfg).map_err(|err| WtcError::io(cfg, err)))
        .transpose()?;
    Ok(compile(&source, cfg.as_deref(), options))
}
