//! Macro preprocessor
//!
//! Expands user-defined commands and environments from a template
//! configuration source before tokenization. The configuration's non-macro
//! commands form a preamble that is spliced in right after the document's
//! `\documentclass` declaration.

pub mod definitions;
pub mod expand;
pub mod scan;

pub use definitions::{
    parse_arg_spec, parse_cfg, ArgKind, ArgSpec, EnvironmentDef, MacroDef, MacroSet,
};
pub use expand::{
    expand_macros, expand_once, extract_template_name, substitute_params, DEFAULT_MAX_PASSES,
};

/// Splice a configuration's preamble into `source` and expand its macros.
pub fn preprocess_with_cfg(source: &str, cfg: &str, max_passes: usize) -> String {
    let set = parse_cfg(cfg);
    preprocess_with_set(source, &set, max_passes)
}

/// Same as [`preprocess_with_cfg`] with an already parsed [`MacroSet`].
pub fn preprocess_with_set(source: &str, set: &MacroSet, max_passes: usize) -> String {
    let combined = if set.preamble.is_empty() {
        source.to_string()
    } else {
        match expand::documentclass_end(source) {
            Some(at) => format!("{}\n{}\n{}", &source[..at], set.preamble, &source[at..]),
            None => format!("{}\n{}", set.preamble, source),
        }
    };

    if set.is_empty() {
        combined
    } else {
        expand_macros(&combined, set, max_passes)
    }
}
