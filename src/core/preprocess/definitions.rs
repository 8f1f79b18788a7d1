//! Macro and environment definitions read from a template configuration
//!
//! Recognised definition forms:
//! - `\NewDocumentCommand{\name}{argspec}{body}`
//! - `\NewDocumentEnvironment{name}{argspec}{begin}{end}`
//!
//! Every other command (with its brace and bracket groups) and any loose
//! text is collected into a preamble that is spliced into the document.

use fxhash::FxHashMap;
use lazy_static::lazy_static;
use regex::Regex;

use super::scan::{
    char_at, read_balanced_braces, read_balanced_brackets, read_command_name, skip_spaces,
    skip_whitespace,
};

lazy_static! {
    static ref FULL_LINE_COMMENT: Regex = Regex::new(r"(?m)^%.*$").expect("static regex");
    static ref TRAILING_COMMENT: Regex = Regex::new(r"(?m)([^\\])%.*$").expect("static regex");
    static ref LINE_CONTINUATION: Regex = Regex::new(r"%\s*\n\s*").expect("static regex");
}

// =============================================================================
// Argument specifications
// =============================================================================

/// Kind of a declared macro argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// `m`, a braced group
    Mandatory,
    /// `o`, a bracketed group
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub kind: ArgKind,
    /// `+m`: the argument may contain paragraph breaks
    pub long: bool,
}

impl ArgSpec {
    pub fn mandatory() -> Self {
        ArgSpec {
            kind: ArgKind::Mandatory,
            long: false,
        }
    }

    pub fn long_mandatory() -> Self {
        ArgSpec {
            kind: ArgKind::Mandatory,
            long: true,
        }
    }

    pub fn optional() -> Self {
        ArgSpec {
            kind: ArgKind::Optional,
            long: false,
        }
    }
}

/// Parse an xparse-style argument specification (`m`, `+m`, `o`).
///
/// Whitespace and unsupported specifiers are skipped.
pub fn parse_arg_spec(spec: &str) -> Vec<ArgSpec> {
    let mut specs = Vec::new();
    let mut long = false;
    for ch in spec.chars() {
        match ch {
            '+' => long = true,
            'm' => {
                specs.push(ArgSpec {
                    kind: ArgKind::Mandatory,
                    long,
                });
                long = false;
            }
            'o' => specs.push(ArgSpec::optional()),
            _ => {}
        }
    }
    specs
}

// =============================================================================
// Definitions
// =============================================================================

/// A user-defined command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    pub name: String,
    pub args: Vec<ArgSpec>,
    pub body: String,
}

/// A user-defined environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDef {
    pub name: String,
    pub args: Vec<ArgSpec>,
    pub begin: String,
    pub end: String,
}

/// Everything extracted from a template configuration source
#[derive(Debug, Clone, Default)]
pub struct MacroSet {
    /// Non-definition commands and text, one per line
    pub preamble: String,
    pub macros: FxHashMap<String, MacroDef>,
    pub environments: FxHashMap<String, EnvironmentDef>,
}

impl MacroSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty() && self.environments.is_empty()
    }

    pub fn define_macro(&mut self, name: &str, args: Vec<ArgSpec>, body: &str) {
        self.macros.insert(
            name.to_string(),
            MacroDef {
                name: name.to_string(),
                args,
                body: body.to_string(),
            },
        );
    }

    pub fn define_environment(&mut self, name: &str, args: Vec<ArgSpec>, begin: &str, end: &str) {
        self.environments.insert(
            name.to_string(),
            EnvironmentDef {
                name: name.to_string(),
                args,
                begin: begin.to_string(),
                end: end.to_string(),
            },
        );
    }
}

/// Remove `%` comments, keeping escaped `\%`
fn strip_comments(source: &str) -> String {
    let without_lines = FULL_LINE_COMMENT.replace_all(source, "");
    TRAILING_COMMENT
        .replace_all(&without_lines, "${1}")
        .into_owned()
}

/// Remove `%`-newline continuations and trim
fn clean_body(body: &str) -> String {
    LINE_CONTINUATION.replace_all(body, "").trim().to_string()
}

/// Read `count` consecutive brace groups separated by whitespace.
fn read_groups(source: &str, mut pos: usize, count: usize) -> Option<(Vec<&str>, usize)> {
    let mut groups = Vec::with_capacity(count);
    for _ in 0..count {
        pos = skip_whitespace(source, pos);
        let group = read_balanced_braces(source, pos)?;
        groups.push(group.content);
        pos = group.end;
    }
    Some((groups, pos))
}

/// Parse a template configuration source into a [`MacroSet`].
pub fn parse_cfg(cfg: &str) -> MacroSet {
    let cfg = match cfg.find("\\endinput") {
        Some(idx) => &cfg[..idx],
        None => cfg,
    };
    let source = strip_comments(cfg);
    let source = source.as_str();

    let mut set = MacroSet::new();
    let mut preamble = String::new();
    let mut pos = 0;

    while pos < source.len() {
        pos = skip_whitespace(source, pos);
        if pos >= source.len() {
            break;
        }

        if char_at(source, pos) != Some('\\') {
            let text_end = source[pos..]
                .find('\\')
                .map(|i| pos + i)
                .unwrap_or(source.len());
            let text = source[pos..text_end].trim();
            if !text.is_empty() {
                preamble.push_str(text);
                preamble.push('\n');
            }
            pos = text_end;
            continue;
        }

        let Some((name, name_end)) = read_command_name(source, pos + 1) else {
            pos += 1;
            continue;
        };

        match name {
            "NewDocumentCommand" => match read_groups(source, name_end, 3) {
                Some((groups, end)) => {
                    let macro_name = groups[0].trim();
                    let macro_name = macro_name.strip_prefix('\\').unwrap_or(macro_name).trim();
                    set.define_macro(macro_name, parse_arg_spec(groups[1]), &clean_body(groups[2]));
                    pos = end;
                }
                None => pos = name_end,
            },
            "NewDocumentEnvironment" => match read_groups(source, name_end, 4) {
                Some((groups, end)) => {
                    set.define_environment(
                        groups[0].trim(),
                        parse_arg_spec(groups[1]),
                        &clean_body(groups[2]),
                        &clean_body(groups[3]),
                    );
                    pos = end;
                }
                None => pos = name_end,
            },
            _ => {
                let mut p = skip_spaces(source, name_end);
                let mut line = format!("\\{}", name);
                loop {
                    let group = match char_at(source, p) {
                        Some('{') => read_balanced_braces(source, p).map(|g| ('{', '}', g)),
                        Some('[') => read_balanced_brackets(source, p).map(|g| ('[', ']', g)),
                        _ => None,
                    };
                    let Some((open, close, group)) = group else {
                        break;
                    };
                    line.push(open);
                    line.push_str(group.content);
                    if group.closed {
                        line.push(close);
                    }
                    p = skip_spaces(source, group.end);
                }
                preamble.push_str(&line);
                preamble.push('\n');
                pos = p;
            }
        }
    }

    set.preamble = preamble.trim().to_string();
    log::debug!(
        "parsed cfg: {} macros, {} environments, {} preamble bytes",
        set.macros.len(),
        set.environments.len(),
        set.preamble.len()
    );
    set
}
