//! Grid layout
//!
//! Assigns every piece of body content a page, column and row on the
//! virtual grid. A page has `2 * columns_per_half_page` columns: the right
//! half first, then the left half, each column `rows_per_column` cells tall.
//!
//! The result borrows the document: placed nodes point into the tree unless
//! layout had to synthesize them (judou text runs, book titles).

pub mod cursor;
mod engine;
pub mod jiazhu;
pub mod judou;
pub mod slices;

use std::borrow::Cow;

use serde::Serialize;
use wtc_ast::{Document, Node};

use crate::config::{GridConfig, Meta, PunctuationMode, ResolvedConfig};

pub use cursor::{CellPos, Cursor};
pub use engine::LayoutEngine;
pub use jiazhu::{split_annotation, split_annotation_multi, Align, JiazhuSegment};
pub use judou::{JudouKind, RichChar};

// =============================================================================
// Layout result
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult<'a> {
    /// Never empty
    pub pages: Vec<Page<'a>>,
    #[serde(rename = "gridConfig")]
    pub grid: GridConfig,
    pub template_id: &'static str,
    pub punctuation: PunctuationMode,
    pub meta: Meta,
}

impl<'a> LayoutResult<'a> {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Grid items on all pages, in placement order
    pub fn items(&self) -> impl Iterator<Item = &PlacedItem<'a>> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<'a> {
    pub items: Vec<PlacedItem<'a>>,
    /// Floating notes and stamps; they occupy no cells
    pub floats: Vec<&'a Node>,
    /// Index of the first item in the left half. Set once; a closed page
    /// always has it. A judou mark attached to a right-half cell after the
    /// boundary is set is inserted before it and shifts it by one, so the
    /// split between the halves stays where it was.
    pub half_boundary: Option<usize>,
}

impl<'a> Page<'a> {
    fn boundary(&self) -> usize {
        self.half_boundary
            .unwrap_or(self.items.len())
            .min(self.items.len())
    }

    pub fn right_half(&self) -> &[PlacedItem<'a>] {
        &self.items[..self.boundary()]
    }

    pub fn left_half(&self) -> &[PlacedItem<'a>] {
        &self.items[self.boundary()..]
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.floats.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem<'a> {
    pub placement: Placement<'a>,
    pub col: usize,
    pub row: usize,
    /// Paragraph indent in force when placed
    pub indent: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jiazhu: Option<JiazhuPlacement<'a>>,
}

impl PlacedItem<'_> {
    pub fn node(&self) -> Option<&Node> {
        match &self.placement {
            Placement::Node(node) => Some(&**node),
            _ => None,
        }
    }

    pub fn marker(&self) -> Option<Marker> {
        match self.placement {
            Placement::Marker(marker) => Some(marker),
            _ => None,
        }
    }
}

/// What a placed item carries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement<'a> {
    Node(Cow<'a, Node>),
    /// Detached clause mark hanging off the cell it was attached to
    Judou(JudouMark),
    Marker(Marker),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JudouMark {
    pub ch: char,
    pub kind: JudouKind,
}

/// Zero-content item delimiting a structural span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Marker {
    ParagraphStart { indent: usize },
    ParagraphEnd,
    ListStart,
    ListEnd,
    ListItemStart { first: bool },
    ListItemEnd,
    CatalogStart { level: usize },
    CatalogEnd,
    ColumnBreak,
}

/// Span kinds that start and end markers delimit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Span {
    Paragraph,
    List,
    ListItem,
    Catalog,
}

impl Marker {
    /// Span this marker opens
    pub fn opens(&self) -> Option<Span> {
        match self {
            Marker::ParagraphStart { .. } => Some(Span::Paragraph),
            Marker::ListStart => Some(Span::List),
            Marker::ListItemStart { .. } => Some(Span::ListItem),
            Marker::CatalogStart { .. } => Some(Span::Catalog),
            _ => None,
        }
    }

    /// Span this marker closes
    pub fn closes(&self) -> Option<Span> {
        match self {
            Marker::ParagraphEnd => Some(Span::Paragraph),
            Marker::ListEnd => Some(Span::List),
            Marker::ListItemEnd => Some(Span::ListItem),
            Marker::CatalogEnd => Some(Span::Catalog),
            _ => None,
        }
    }
}

/// How an annotation item is split
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JiazhuPlacement<'a> {
    /// Plain-text annotation; `index` of `total` pieces of the same node
    Segments {
        segments: Vec<JiazhuSegment>,
        index: usize,
        total: usize,
    },
    /// Run of mixed children between elevations
    Complex { children: &'a [Node], balanced: bool },
}

// =============================================================================
// Entry point
// =============================================================================

/// Lay out the document's body containers.
pub fn layout<'a>(doc: &'a Document, config: &ResolvedConfig) -> LayoutResult<'a> {
    let mut engine = LayoutEngine::new(config.grid);
    let mut cursor = Cursor::new(config.punctuation);
    for body in doc.bodies() {
        engine.walk_node(body, &mut cursor);
    }
    let pages = engine.finish();
    log::debug!(
        "laid out {} page(s) on a {} grid",
        pages.len(),
        config.grid
    );

    LayoutResult {
        pages,
        grid: config.grid,
        template_id: config.template_id,
        punctuation: config.punctuation,
        meta: config.meta.clone(),
    }
}
