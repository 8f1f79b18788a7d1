//! Half-page slices with balanced spans
//!
//! Paragraphs, lists, list items and catalog entries can straddle a half
//! or page boundary. A renderer treats every half page as an independent
//! unit, so each slice carries the spans that were already open when it
//! starts and those still open when it ends. The stack at the end of one
//! slice is the stack at the start of the next, across pages too.

use super::{LayoutResult, Marker, PlacedItem};

/// One half page of items
#[derive(Debug, Clone, PartialEq)]
pub struct HalfSlice<'r, 'a> {
    /// Spans to reopen before the first item, outermost first
    pub reopened: Vec<Marker>,
    pub items: &'r [PlacedItem<'a>],
    /// Spans to close after the last item, outermost first
    pub still_open: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageSlices<'r, 'a> {
    pub right: HalfSlice<'r, 'a>,
    pub left: HalfSlice<'r, 'a>,
}

/// Apply the markers in `items` to an open-span stack.
///
/// A start marker pushes. An end marker removes the most recent open
/// marker of the same span kind; an end with no matching start is ignored.
pub fn carry(items: &[PlacedItem<'_>], mut stack: Vec<Marker>) -> Vec<Marker> {
    for marker in items.iter().filter_map(PlacedItem::marker) {
        if marker.opens().is_some() {
            stack.push(marker);
        } else if let Some(span) = marker.closes() {
            if let Some(at) = stack.iter().rposition(|open| open.opens() == Some(span)) {
                stack.remove(at);
            }
        }
    }
    stack
}

fn slice<'r, 'a>(items: &'r [PlacedItem<'a>], reopened: Vec<Marker>) -> HalfSlice<'r, 'a> {
    let still_open = carry(items, reopened.clone());
    HalfSlice {
        reopened,
        items,
        still_open,
    }
}

/// Split every page into right and left halves with their span stacks.
pub fn balance<'r, 'a>(result: &'r LayoutResult<'a>) -> Vec<PageSlices<'r, 'a>> {
    let mut stack = Vec::new();
    result
        .pages
        .iter()
        .map(|page| {
            let right = slice(page.right_half(), stack.clone());
            let left = slice(page.left_half(), right.still_open.clone());
            stack = left.still_open.clone();
            PageSlices { right, left }
        })
        .collect()
}
