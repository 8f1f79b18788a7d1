//! Position-based scanning helpers for macro expansion
//!
//! All positions are byte offsets into the source string and always sit on
//! a character boundary.

use crate::utils::chars::{is_cjk, is_latin_name_char};

/// A delimited group read from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group<'a> {
    /// Text between the delimiters, escapes copied verbatim
    pub content: &'a str,
    /// Position just past the closing delimiter (or end of input)
    pub end: usize,
    /// False if input ended before the group was closed
    pub closed: bool,
}

/// Character at `pos`, if any
pub fn char_at(source: &str, pos: usize) -> Option<char> {
    source.get(pos..).and_then(|rest| rest.chars().next())
}

/// Read a balanced `open ... close` group starting at `pos`.
///
/// Returns `None` if `pos` is not at `open`. A backslash and the character
/// after it are copied through and never change the nesting depth.
pub fn read_balanced(source: &str, pos: usize, open: char, close: char) -> Option<Group<'_>> {
    if char_at(source, pos) != Some(open) {
        return None;
    }
    let start = pos + open.len_utf8();
    let mut depth = 1usize;
    let mut iter = source[start..].char_indices();

    while let Some((offset, ch)) = iter.next() {
        if ch == '\\' {
            iter.next();
            continue;
        }
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                let close_at = start + offset;
                return Some(Group {
                    content: &source[start..close_at],
                    end: close_at + close.len_utf8(),
                    closed: true,
                });
            }
        }
    }

    Some(Group {
        content: &source[start..],
        end: source.len(),
        closed: false,
    })
}

pub fn read_balanced_braces(source: &str, pos: usize) -> Option<Group<'_>> {
    read_balanced(source, pos, '{', '}')
}

pub fn read_balanced_brackets(source: &str, pos: usize) -> Option<Group<'_>> {
    read_balanced(source, pos, '[', ']')
}

/// Skip any whitespace (including newlines) from `pos`
pub fn skip_whitespace(source: &str, pos: usize) -> usize {
    let rest = &source[pos..];
    pos + (rest.len() - rest.trim_start().len())
}

/// Skip plain spaces from `pos`
pub fn skip_spaces(source: &str, pos: usize) -> usize {
    let rest = &source[pos..];
    pos + (rest.len() - rest.trim_start_matches(' ').len())
}

/// Read a command name starting just after its backslash.
///
/// A CJK run or a Latin run (`[A-Za-z@*]`) forms the name; any other single
/// character is a one-character name. Returns the name and the position
/// after it, or `None` at end of input.
pub fn read_command_name(source: &str, pos: usize) -> Option<(&str, usize)> {
    let first = char_at(source, pos)?;
    let class: fn(char) -> bool = if is_cjk(first) {
        is_cjk
    } else if is_latin_name_char(first) {
        is_latin_name_char
    } else {
        let end = pos + first.len_utf8();
        return Some((&source[pos..end], end));
    };

    let rest = &source[pos..];
    let len = rest
        .char_indices()
        .find(|(_, c)| !class(*c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    Some((&rest[..len], pos + len))
}
