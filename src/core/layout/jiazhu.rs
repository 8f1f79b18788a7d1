//! Jiazhu splitting
//!
//! An interlinear annotation is set as two half-width sub-columns inside a
//! main column. Short annotations form one segment. Long ones are cut into
//! segments: the first fills what is left of the current column, each later
//! one fills a whole column, and the last may be shorter.

use serde::Serialize;

use super::judou::RichChar;

/// Which sub-column takes the odd character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    /// First (right) sub-column gets the extra character
    #[default]
    Outward,
    /// Second sub-column gets it
    Inward,
}

impl Align {
    /// Parse the `align` option; anything but `inward` is outward.
    pub fn from_option(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("inward") => Align::Inward,
            _ => Align::Outward,
        }
    }
}

/// One dual sub-column piece of an annotation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JiazhuSegment {
    pub col1: Vec<RichChar>,
    pub col2: Vec<RichChar>,
}

impl JiazhuSegment {
    /// Rows of the main column this segment occupies
    pub fn rows(&self) -> usize {
        self.col1.len().max(self.col2.len())
    }

    pub fn len(&self) -> usize {
        self.col1.len() + self.col2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.col1.is_empty() && self.col2.is_empty()
    }
}

/// Split characters into two sub-columns.
///
/// Unbalanced splitting keeps everything in the first sub-column.
pub fn split_annotation(chars: &[RichChar], align: Align, balance: bool) -> JiazhuSegment {
    if !balance || chars.len() <= 1 {
        return JiazhuSegment {
            col1: chars.to_vec(),
            col2: Vec::new(),
        };
    }

    let mid = match align {
        Align::Outward => chars.len().div_ceil(2),
        Align::Inward => chars.len() / 2,
    };
    let (col1, col2) = chars.split_at(mid);
    JiazhuSegment {
        col1: col1.to_vec(),
        col2: col2.to_vec(),
    }
}

/// Split characters into segments.
///
/// `max_per_col` is the row capacity of a full column and `first_max` the
/// rows left in the current one (0 means a full column). A balanced
/// segment holds two characters per row, an unbalanced one holds one.
/// Always returns at least one segment.
pub fn split_annotation_multi(
    chars: &[RichChar],
    max_per_col: usize,
    first_max: usize,
    align: Align,
    balance: bool,
) -> Vec<JiazhuSegment> {
    let max_per_col = max_per_col.max(1);
    let first_max = if first_max == 0 { max_per_col } else { first_max };
    let per_row = if balance { 2 } else { 1 };

    let first_chunk = first_max * per_row;
    if chars.len() <= first_chunk {
        return vec![split_annotation(chars, align, balance)];
    }

    let (head, tail) = chars.split_at(first_chunk);
    std::iter::once(head)
        .chain(tail.chunks(max_per_col * per_row))
        .map(|chunk| split_annotation(chunk, align, balance))
        .collect()
}
