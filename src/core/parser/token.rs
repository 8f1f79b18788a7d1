//! Token definitions for the markup tokenizer.

use std::fmt;

use crate::utils::chars::{is_cjk, is_latin_name_char};

/// A markup token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A command like `\夹注` or `\title`.
    /// The string does NOT include the leading backslash.
    Command(String),

    /// `{`
    OpenBrace,

    /// `}`
    CloseBrace,

    /// `[`
    OpenBracket,

    /// `]`
    CloseBracket,

    /// A run of literal text, horizontal whitespace already collapsed
    Text(String),

    /// Forced intra-column newline `\\`
    Newline,

    /// Raw contents of `$...$`
    Math(String),

    /// Blank line inside a text run
    ParagraphBreak,

    /// `\begin`
    Begin,

    /// `\end`
    End,

    /// End of input marker
    Eof,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Command(name) => write!(f, "\\{}", name),
            Token::OpenBrace => f.write_str("{"),
            Token::CloseBrace => f.write_str("}"),
            Token::OpenBracket => f.write_str("["),
            Token::CloseBracket => f.write_str("]"),
            Token::Text(text) => {
                for ch in text.chars() {
                    if matches!(ch, '{' | '}' | '[' | ']' | '%' | '$') {
                        write!(f, "\\{}", ch)?;
                    } else {
                        write!(f, "{}", ch)?;
                    }
                }
                Ok(())
            }
            Token::Newline => f.write_str("\\\\"),
            Token::Math(content) => write!(f, "${}$", content),
            Token::ParagraphBreak => f.write_str("\n\n"),
            Token::Begin => f.write_str("\\begin"),
            Token::End => f.write_str("\\end"),
            Token::Eof => Ok(()),
        }
    }
}

/// Would the tokenizer glue `next` onto the command name `name`?
fn needs_separator(name: &str, next: &str) -> bool {
    let (Some(last), Some(first)) = (name.chars().last(), next.chars().next()) else {
        return false;
    };
    if is_latin_name_char(last) && name.chars().all(is_latin_name_char) {
        is_latin_name_char(first) || first == ' '
    } else if is_cjk(last) {
        is_cjk(first)
    } else {
        false
    }
}

/// Convert tokens back to source text that tokenizes to the same stream.
pub fn detokenize(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut iter = tokens.iter().peekable();

    while let Some(token) = iter.next() {
        out.push_str(&token.to_string());

        let name = match token {
            Token::Command(name) => name.as_str(),
            Token::Begin => "begin",
            Token::End => "end",
            _ => continue,
        };
        if let Some(Token::Text(next)) = iter.peek() {
            if needs_separator(name, next) {
                // a comment swallows itself and the line break
                out.push_str("%\n");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Token::Command("夹注".into()).to_string(), "\\夹注");
        assert_eq!(Token::Math("x^2".into()).to_string(), "$x^2$");
        assert_eq!(Token::Text("a{b}".into()).to_string(), "a\\{b\\}");
        assert_eq!(Token::Newline.to_string(), "\\\\");
    }

    #[test]
    fn test_detokenize_plain() {
        let tokens = vec![
            Token::Command("foo".into()),
            Token::OpenBrace,
            Token::Text("bar".into()),
            Token::CloseBrace,
        ];
        assert_eq!(detokenize(&tokens), "\\foo{bar}");
    }

    #[test]
    fn test_detokenize_separates_glued_names() {
        let latin = vec![Token::Command("par".into()), Token::Text("abc".into())];
        assert_eq!(detokenize(&latin), "\\par%\nabc");

        let cjk = vec![Token::Command("平抬".into()), Token::Text("天子".into())];
        assert_eq!(detokenize(&cjk), "\\平抬%\n天子");

        let mixed = vec![Token::Command("平抬".into()), Token::Text("abc".into())];
        assert_eq!(detokenize(&mixed), "\\平抬abc");
    }
}
