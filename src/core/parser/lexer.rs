//! Markup Lexer/Tokenizer
//!
//! Converts a source string into a stream of [`Token`]s:
//! - Latin and CJK command names
//! - Escaped structural characters
//! - `%` line comments
//! - `$...$` math runs
//! - Paragraph breaks inside text runs
//!
//! Tokenization is total. Malformed input degrades to text tokens.

use lazy_static::lazy_static;
use regex::Regex;

use super::token::Token;
use crate::utils::chars::{is_cjk, is_escapable, is_latin_name_char};

lazy_static! {
    static ref BLANK_LINE: Regex = Regex::new(r"\n[ \t]*\n").expect("static regex");
    static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[ \t]+").expect("static regex");
}

/// Characters that end a text run
fn is_text_stop(c: char) -> bool {
    matches!(c, '\\' | '{' | '}' | '[' | ']' | '%' | '$')
}

/// The markup lexer
pub struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of the next unread character
    pos: usize,
    /// Tokens queued by a text run that split into several parts
    pending: std::collections::VecDeque<Token>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            pos: 0,
            pending: std::collections::VecDeque::new(),
            finished: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Peek at the next character without consuming it
    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume and return the next character
    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume characters while `pred` holds and return them as a slice
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Skip a comment through and including the newline
    fn skip_comment(&mut self) {
        match self.rest().find('\n') {
            Some(i) => self.pos += i + 1,
            None => self.pos = self.source.len(),
        }
    }

    /// Read what follows a backslash
    fn read_command(&mut self) -> Token {
        let Some(c) = self.peek_char() else {
            return Token::Text("\\".to_string());
        };

        if c == '\\' {
            self.next_char();
            return Token::Newline;
        }
        if is_escapable(c) {
            self.next_char();
            return Token::Text(c.to_string());
        }
        if c == ' ' || c == '\n' {
            self.next_char();
            return Token::Text(" ".to_string());
        }

        let name = if is_latin_name_char(c) {
            let name = self.take_while(is_latin_name_char);
            // spaces after a Latin name are swallowed
            self.take_while(|c| c == ' ');
            name
        } else if is_cjk(c) {
            self.take_while(is_cjk)
        } else {
            self.next_char();
            return Token::Command(c.to_string());
        };

        match name {
            "begin" => Token::Begin,
            "end" => Token::End,
            _ => Token::Command(name.to_string()),
        }
    }

    /// Read a `$...$` run; unterminated math is literal text
    fn read_math(&mut self) -> Token {
        let rest = self.rest();
        match rest.find('$') {
            Some(end) => {
                self.pos += end + 1;
                Token::Math(rest[..end].to_string())
            }
            None => {
                self.pos = self.source.len();
                Token::Text(format!("${}", rest))
            }
        }
    }

    /// Read a plain text run, queueing its parts
    fn read_text(&mut self) {
        let text = self.take_while(|c| !is_text_stop(c));
        for (i, part) in BLANK_LINE.split(text).enumerate() {
            if i > 0 {
                self.pending.push_back(Token::ParagraphBreak);
            }
            let collapsed = HORIZONTAL_SPACE.replace_all(part, " ");
            if !collapsed.trim().is_empty() || collapsed == " " {
                self.pending.push_back(Token::Text(collapsed.into_owned()));
            }
        }
    }

    /// Read the next token
    fn next_token(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }

            let Some(c) = self.peek_char() else {
                if self.finished {
                    return None;
                }
                self.finished = true;
                return Some(Token::Eof);
            };

            match c {
                '%' => self.skip_comment(),
                '$' => {
                    self.next_char();
                    return Some(self.read_math());
                }
                '\\' => {
                    self.next_char();
                    return Some(self.read_command());
                }
                '{' => {
                    self.next_char();
                    return Some(Token::OpenBrace);
                }
                '}' => {
                    self.next_char();
                    return Some(Token::CloseBrace);
                }
                '[' => {
                    self.next_char();
                    return Some(Token::OpenBracket);
                }
                ']' => {
                    self.next_char();
                    return Some(Token::CloseBracket);
                }
                _ => self.read_text(),
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a string into an EOF-terminated token list
pub fn tokenize(source: &str) -> Vec<Token> {
    let tokens: Vec<Token> = Lexer::new(source).collect();
    log::trace!("tokenized {} bytes into {} tokens", source.len(), tokens.len());
    tokens
}
