//! Character classes shared by the preprocessor and the tokenizer.

/// CJK ideographs usable in command names
pub fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
}

/// Characters of a Latin command name
pub fn is_latin_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '@' || c == '*'
}

/// Characters that a backslash turns into literal text
pub fn is_escapable(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | '%' | '$' | '&' | '#' | '_' | '~' | '^')
}
