//! Text-level macro expansion
//!
//! Each pass scans the source once and replaces every invocation of a known
//! macro or environment with its substituted body. Passes repeat until one
//! makes no substitution or the pass ceiling is hit.

use lazy_static::lazy_static;
use regex::Regex;

use super::definitions::{ArgKind, ArgSpec, MacroSet};
use super::scan::{
    read_balanced_braces, read_balanced_brackets, read_command_name, skip_spaces, skip_whitespace,
};

/// Default pass ceiling for [`expand_macros`]
pub const DEFAULT_MAX_PASSES: usize = 20;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"##|#(\d)").expect("static regex");
    static ref BLANK_LINE: Regex = Regex::new(r"\n[ \t]*\n").expect("static regex");
}

/// Replace `#1`..`#9` with the given arguments; `##` becomes `#`.
///
/// A placeholder beyond the supplied arguments is left untouched.
pub fn substitute_params(template: &str, args: &[String]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let Some(digit) = caps.get(1) else {
                return "#".to_string();
            };
            let index = digit.as_str().parse::<usize>().unwrap_or(0);
            match index.checked_sub(1).and_then(|i| args.get(i)) {
                Some(arg) => arg.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Read invocation arguments at `pos`.
///
/// Absent arguments become empty strings. Returns `None` when a group is
/// unterminated or a short mandatory argument spans a blank line; the
/// invocation is then left unexpanded.
fn read_macro_args(
    source: &str,
    mut pos: usize,
    specs: &[ArgSpec],
) -> Option<(Vec<String>, usize)> {
    let mut args = Vec::with_capacity(specs.len());
    for spec in specs {
        pos = skip_whitespace(source, pos);
        let group = match spec.kind {
            ArgKind::Mandatory => read_balanced_braces(source, pos),
            ArgKind::Optional => read_balanced_brackets(source, pos),
        };
        match group {
            Some(group) => {
                if !group.closed {
                    return None;
                }
                if spec.kind == ArgKind::Mandatory
                    && !spec.long
                    && BLANK_LINE.is_match(group.content)
                {
                    return None;
                }
                args.push(group.content.to_string());
                pos = group.end;
            }
            None => args.push(String::new()),
        }
    }
    Some((args, pos))
}

/// Find the `\end{name}` balancing an already-open `\begin{name}`.
///
/// Returns the body slice and the position after the end marker.
fn find_matching_end<'a>(source: &'a str, start: usize, name: &str) -> Option<(&'a str, usize)> {
    let begin_pat = format!("\\begin{{{}}}", name);
    let end_pat = format!("\\end{{{}}}", name);
    let mut depth = 1usize;
    let mut pos = start;

    while pos < source.len() {
        let rest = &source[pos..];
        if rest.starts_with(&begin_pat) {
            depth += 1;
            pos += begin_pat.len();
        } else if rest.starts_with(&end_pat) {
            depth -= 1;
            if depth == 0 {
                return Some((&source[start..pos], pos + end_pat.len()));
            }
            pos += end_pat.len();
        } else {
            let mut chars = rest.chars();
            let step = match chars.next() {
                // escape pair, never a delimiter
                Some('\\') => 1 + chars.next().map_or(0, char::len_utf8),
                Some(c) => c.len_utf8(),
                None => break,
            };
            pos += step;
        }
    }
    None
}

/// Try to expand `\begin{env}...\end{env}` for a known environment.
fn expand_environment(source: &str, after_begin: usize, set: &MacroSet) -> Option<(String, usize)> {
    let p = skip_whitespace(source, after_begin);
    let name_group = read_balanced_braces(source, p)?;
    if !name_group.closed {
        return None;
    }
    let name = name_group.content.trim();
    let def = set.environments.get(name)?;
    let (args, args_end) = read_macro_args(source, name_group.end, &def.args)?;
    let (body, end) = find_matching_end(source, args_end, name)?;

    let mut out = substitute_params(&def.begin, &args);
    out.push_str(body);
    out.push_str(&substitute_params(&def.end, &args));
    Some((out, end))
}

/// One scan-and-replace pass. Returns the new text and whether anything changed.
pub fn expand_once(source: &str, set: &MacroSet) -> (String, bool) {
    let mut out = String::with_capacity(source.len());
    let mut changed = false;
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];
        let Some(slash) = rest.find('\\') else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..slash]);
        pos += slash;

        let Some((name, name_end)) = read_command_name(source, pos + 1) else {
            out.push('\\');
            pos += 1;
            continue;
        };

        if name == "begin" {
            if let Some((expanded, end)) = expand_environment(source, name_end, set) {
                out.push_str(&expanded);
                pos = end;
                changed = true;
                continue;
            }
        } else if let Some(def) = set.macros.get(name) {
            let p = skip_spaces(source, name_end);
            if let Some((args, end)) = read_macro_args(source, p, &def.args) {
                out.push_str(&substitute_params(&def.body, &args));
                pos = end;
                changed = true;
                continue;
            }
        }

        out.push_str(&source[pos..name_end]);
        pos = name_end;
    }

    (out, changed)
}

/// Expand until a pass changes nothing or `max_passes` passes have run.
///
/// Reaching the ceiling is not an error; the partially expanded text is
/// returned as is.
pub fn expand_macros(source: &str, set: &MacroSet, max_passes: usize) -> String {
    let mut current = source.to_string();
    for pass in 0..max_passes {
        let (next, changed) = expand_once(&current, set);
        if !changed {
            log::debug!("macro expansion reached fixed point after {} passes", pass);
            return current;
        }
        current = next;
    }
    log::debug!("macro expansion stopped at pass ceiling {}", max_passes);
    current
}

/// Bracketed option of `\documentclass[...]{...}`, trimmed.
pub fn extract_template_name(source: &str) -> Option<String> {
    lazy_static! {
        static ref DOCUMENTCLASS_OPTION: Regex =
            Regex::new(r"\\documentclass\s*\[([^\]]*)\]\s*\{[^}]*\}").expect("static regex");
    }
    DOCUMENTCLASS_OPTION
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Position just after the `\documentclass` declaration, if any.
pub(crate) fn documentclass_end(source: &str) -> Option<usize> {
    lazy_static! {
        static ref DOCUMENTCLASS: Regex =
            Regex::new(r"\\documentclass\s*(\[[^\]]*\])?\s*\{[^}]*\}").expect("static regex");
    }
    DOCUMENTCLASS.find(source).map(|m| m.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preprocess::definitions::parse_arg_spec;
    use pretty_assertions::assert_eq;

    fn set_with(defs: &[(&str, &str, &str)]) -> MacroSet {
        let mut set = MacroSet::new();
        for (name, spec, body) in defs {
            set.define_macro(name, parse_arg_spec(spec), body);
        }
        set
    }

    #[test]
    fn test_substitute_params() {
        let args = vec!["A".to_string(), "B".to_string()];
        assert_eq!(substitute_params("#2-#1", &args), "B-A");
        assert_eq!(substitute_params("##1", &args), "#1");
        assert_eq!(substitute_params("#3", &args), "#3");
    }

    #[test]
    fn test_zero_arg_macro_eats_following_space() {
        let set = set_with(&[("foo", "", "bar baz")]);
        assert_eq!(expand_macros("hello \\foo world", &set, 20), "hello bar bazworld");
    }

    #[test]
    fn test_unknown_commands_pass_through() {
        let set = set_with(&[("foo", "", "FOO")]);
        assert_eq!(expand_macros("\\bar \\foo \\baz", &set, 20), "\\bar FOO\\baz");
    }

    #[test]
    fn test_mandatory_and_optional_args() {
        let set = set_with(&[("注", "o m", "\\夹注[#1]{#2}")]);
        assert_eq!(expand_macros("\\注[inward]{小字}", &set, 20), "\\夹注[inward]{小字}");
        assert_eq!(expand_macros("\\注{小字}", &set, 20), "\\夹注[]{小字}");
    }

    #[test]
    fn test_nested_expansion_across_passes() {
        let set = set_with(&[("outer", "m", "[\\inner{#1}]"), ("inner", "m", "<#1>")]);
        assert_eq!(expand_macros("\\outer{x}", &set, 20), "[<x>]");
    }

    #[test]
    fn test_self_recursive_macro_hits_ceiling() {
        let set = set_with(&[("loop", "", "x\\loop")]);
        let out = expand_macros("\\loop", &set, 3);
        assert!(out.starts_with("xxx"));
        assert!(out.ends_with("\\loop"));
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let set = set_with(&[("foo", "m", "<#1>")]);
        let once = expand_macros("a \\foo{b} c", &set, 20);
        assert_eq!(expand_macros(&once, &set, 20), once);
    }

    #[test]
    fn test_unterminated_argument_left_unexpanded() {
        let set = set_with(&[("foo", "m", "<#1>")]);
        assert_eq!(expand_macros("\\foo{abc", &set, 20), "\\foo{abc");
    }

    #[test]
    fn test_short_argument_rejects_blank_line() {
        let set = set_with(&[("short", "m", "<#1>"), ("long", "+m", "<#1>")]);
        assert_eq!(expand_macros("\\short{a\n\nb}", &set, 20), "\\short{a\n\nb}");
        assert_eq!(expand_macros("\\long{a\n\nb}", &set, 20), "<a\n\nb>");
    }

    #[test]
    fn test_environment_expansion_with_nesting() {
        let mut set = MacroSet::new();
        set.define_environment("框", vec![], "<", ">");
        let src = "\\begin{框}a\\begin{框}b\\end{框}c\\end{框}";
        assert_eq!(expand_macros(src, &set, 20), "<a<b>c>");
    }

    #[test]
    fn test_environment_without_end_passes_through() {
        let mut set = MacroSet::new();
        set.define_environment("框", vec![], "<", ">");
        let src = "\\begin{框}never closed";
        assert_eq!(expand_macros(src, &set, 20), src);
    }

    #[test]
    fn test_escaped_backslash_is_not_an_end_marker() {
        let mut set = MacroSet::new();
        set.define_environment("框", vec![ArgSpec::mandatory()], "<#1|", ">");
        let src = "\\begin{框}{k}x\\\\end{框}y\\end{框}";
        assert_eq!(expand_macros(src, &set, 20), "<k|x\\\\end{框}y>");
    }

    #[test]
    fn test_extract_template_name() {
        assert_eq!(
            extract_template_name("\\documentclass[ 四库全书 ]{ltc-guji}"),
            Some("四库全书".to_string())
        );
        assert_eq!(extract_template_name("\\documentclass{ltc-guji}"), None);
    }
}
