//! Punctuation classes for judou layout
//!
//! In judou mode clause marks stop occupying cells: a ju (sentence end) or
//! dou (pause) mark hangs off the preceding character. Book-title brackets
//! turn the enclosed text into a book-title decoration, and every other
//! paired bracket is dropped.

use serde::Serialize;
use wtc_ast::cell_chars;

use crate::config::PunctuationMode;

/// Detached clause mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JudouKind {
    /// Sentence-final: 。？！
    Ju,
    /// Clause pause: ，；、：
    Dou,
}

/// Classification of a CJK punctuation character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunctClass {
    Mark(JudouKind),
    Open,
    Close,
}

pub fn classify(ch: char) -> Option<PunctClass> {
    match ch {
        '。' | '？' | '！' => Some(PunctClass::Mark(JudouKind::Ju)),
        '，' | '；' | '、' | '：' => Some(PunctClass::Mark(JudouKind::Dou)),
        '「' | '『' | '《' | '〈' | '（' | '【' | '〔' | '\u{2018}' | '\u{201C}' => {
            Some(PunctClass::Open)
        }
        '」' | '』' | '》' | '〉' | '）' | '】' | '〕' | '\u{2019}' | '\u{201D}' => {
            Some(PunctClass::Close)
        }
        _ => None,
    }
}

pub fn is_cjk_punctuation(ch: char) -> bool {
    classify(ch).is_some()
}

/// Closing bracket of a book-title bracket pair
pub fn book_title_close(open: char) -> Option<char> {
    match open {
        '《' => Some('》'),
        '〈' => Some('〉'),
        _ => None,
    }
}

// =============================================================================
// Running text
// =============================================================================

/// A piece of running text after judou segmentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPiece {
    Text(String),
    /// Contents of a `《...》` or `〈...〉` span
    BookTitle(String),
    Mark(char, JudouKind),
}

/// Split running text into plain runs, book titles and detached marks.
///
/// Non-title brackets are dropped. An unclosed book title runs to the end
/// of the text. Empty runs are never produced.
pub fn segment_text(text: &str) -> Vec<TextPiece> {
    let mut pieces = Vec::new();
    let mut buf = String::new();
    let mut chars = cell_chars(text);

    while let Some(ch) = chars.next() {
        if let Some(close) = book_title_close(ch) {
            flush(&mut buf, &mut pieces);
            let inner: String = chars.by_ref().take_while(|c| *c != close).collect();
            if !inner.is_empty() {
                pieces.push(TextPiece::BookTitle(inner));
            }
            continue;
        }
        match classify(ch) {
            Some(PunctClass::Mark(kind)) => {
                flush(&mut buf, &mut pieces);
                pieces.push(TextPiece::Mark(ch, kind));
            }
            Some(PunctClass::Open | PunctClass::Close) => flush(&mut buf, &mut pieces),
            None => buf.push(ch),
        }
    }
    flush(&mut buf, &mut pieces);
    pieces
}

fn flush(buf: &mut String, pieces: &mut Vec<TextPiece>) {
    if !buf.is_empty() {
        pieces.push(TextPiece::Text(std::mem::take(buf)));
    }
}

/// Text with every CJK punctuation character removed
pub fn strip_punctuation(text: &str) -> String {
    cell_chars(text).filter(|c| !is_cjk_punctuation(*c)).collect()
}

// =============================================================================
// Annotation text
// =============================================================================

/// One annotation character with the decorations it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RichChar {
    pub ch: char,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judou: Option<JudouKind>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub book_title: bool,
}

impl RichChar {
    pub fn plain(ch: char) -> Self {
        Self {
            ch,
            judou: None,
            book_title: false,
        }
    }
}

/// Annotation text as rich characters under the given punctuation mode.
///
/// In judou mode a clause mark decorates the character before it; a mark
/// with nothing before it is dropped.
pub fn rich_chars(text: &str, mode: PunctuationMode) -> Vec<RichChar> {
    match mode {
        PunctuationMode::Normal => cell_chars(text).map(RichChar::plain).collect(),
        PunctuationMode::None => cell_chars(text)
            .filter(|c| !is_cjk_punctuation(*c))
            .map(RichChar::plain)
            .collect(),
        PunctuationMode::Judou => {
            let mut out: Vec<RichChar> = Vec::new();
            let mut in_title = false;
            for ch in cell_chars(text) {
                match ch {
                    '《' | '〈' => in_title = true,
                    '》' | '〉' => in_title = false,
                    _ => match classify(ch) {
                        Some(PunctClass::Mark(kind)) => {
                            if let Some(last) = out.last_mut() {
                                last.judou = Some(kind);
                            }
                        }
                        Some(_) => {}
                        None => out.push(RichChar {
                            ch,
                            judou: None,
                            book_title: in_title,
                        }),
                    },
                }
            }
            out
        }
    }
}
