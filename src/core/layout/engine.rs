//! Tree walk and placement rules

use std::borrow::Cow;

use wtc_ast::{plain_text_of, DecorationStyle, Node, NodeKind};

use super::cursor::{CellPos, Cursor};
use super::jiazhu::{split_annotation_multi, Align};
use super::judou::{rich_chars, segment_text, strip_punctuation, JudouKind, TextPiece};
use super::{JiazhuPlacement, JudouMark, Marker, Page, PlacedItem, Placement};
use crate::config::{GridConfig, PunctuationMode};

/// Page builder driven by a [`Cursor`]
#[derive(Debug)]
pub struct LayoutEngine<'a> {
    grid: GridConfig,
    /// Closed pages
    pages: Vec<Page<'a>>,
    /// Page under construction
    current: Page<'a>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            pages: Vec::new(),
            current: Page::default(),
        }
    }

    /// Close the last page and return all pages.
    pub fn finish(mut self) -> Vec<Page<'a>> {
        if self.current.half_boundary.is_none() {
            self.current.half_boundary = Some(self.current.items.len());
        }
        self.pages.push(self.current);
        self.pages
    }

    fn page_index(&self) -> usize {
        self.pages.len()
    }

    fn page_mut(&mut self, index: usize) -> Option<&mut Page<'a>> {
        if index == self.pages.len() {
            Some(&mut self.current)
        } else {
            self.pages.get_mut(index)
        }
    }

    // =========================================================================
    // Cursor movement
    // =========================================================================

    /// Record the half boundary the first time the cursor enters the left half.
    fn check_half_boundary(&mut self, cursor: &Cursor) {
        if self.current.half_boundary.is_none() && cursor.col >= self.grid.columns_per_half_page {
            log::trace!(
                "page {}: left half starts at item {}",
                self.page_index(),
                self.current.items.len()
            );
            self.current.half_boundary = Some(self.current.items.len());
        }
    }

    fn break_page(&mut self, cursor: &mut Cursor) {
        let mut page = std::mem::take(&mut self.current);
        if page.half_boundary.is_none() {
            page.half_boundary = Some(page.items.len());
        }
        self.pages.push(page);
        cursor.next_page();
        log::trace!("page break, now on page {}", self.page_index());
    }

    pub fn advance_column(&mut self, cursor: &mut Cursor) {
        cursor.next_column();
        self.check_half_boundary(cursor);
        if cursor.col >= self.grid.columns_per_page() {
            self.break_page(cursor);
        }
    }

    /// Fill `count` cells, wrapping columns and pages.
    pub fn advance_rows(&mut self, cursor: &mut Cursor, count: usize) {
        for _ in 0..count {
            cursor.last_cell = CellPos {
                page: self.page_index(),
                col: cursor.col,
                row: cursor.row,
            };
            cursor.row += 1;
            if cursor.row >= cursor.capacity(self.grid.rows_per_column) {
                self.advance_column(cursor);
            }
        }
    }

    fn place(
        &mut self,
        placement: Placement<'a>,
        cursor: &Cursor,
        jiazhu: Option<JiazhuPlacement<'a>>,
    ) {
        self.check_half_boundary(cursor);
        self.current.items.push(PlacedItem {
            placement,
            col: cursor.col,
            row: cursor.row,
            indent: cursor.indent,
            jiazhu,
        });
    }

    fn place_node(&mut self, node: &'a Node, cursor: &Cursor) {
        self.place(Placement::Node(Cow::Borrowed(node)), cursor, None);
    }

    fn place_owned(&mut self, node: Node, cursor: &Cursor) {
        self.place(Placement::Node(Cow::Owned(node)), cursor, None);
    }

    fn place_marker(&mut self, marker: Marker, cursor: &Cursor) {
        self.place(Placement::Marker(marker), cursor, None);
    }

    fn push_float(&mut self, node: &'a Node) {
        self.current.floats.push(node);
    }

    /// Hang a clause mark on the most recently filled cell.
    ///
    /// The mark goes to the page owning that cell. If the cell is in the
    /// right half and the page has already moved on to its left half, the
    /// mark is kept at the end of the right half.
    fn attach_mark(&mut self, ch: char, kind: JudouKind, cursor: &Cursor) {
        let cell = cursor.last_cell;
        let half = self.grid.columns_per_half_page;
        let item = PlacedItem {
            placement: Placement::Judou(JudouMark { ch, kind }),
            col: cell.col,
            row: cell.row,
            indent: cursor.indent,
            jiazhu: None,
        };
        let Some(page) = self.page_mut(cell.page) else {
            return;
        };
        match page.half_boundary {
            Some(boundary) if cell.col < half && boundary <= page.items.len() => {
                page.items.insert(boundary, item);
                page.half_boundary = Some(boundary + 1);
            }
            _ => page.items.push(item),
        }
    }

    // =========================================================================
    // Tree walk
    // =========================================================================

    pub fn walk_node(&mut self, node: &'a Node, cursor: &mut Cursor) {
        match &node.kind {
            NodeKind::Body | NodeKind::Group | NodeKind::Unknown { .. } => {
                self.walk_children(&node.children, cursor)
            }
            NodeKind::ContentBlock => {
                for child in &node.children {
                    if child.kind.is_float() {
                        self.push_float(child);
                    } else {
                        self.walk_node(child, cursor);
                    }
                }
            }
            NodeKind::Paragraph => self.walk_paragraph(node, cursor),
            NodeKind::List => self.walk_list(node, cursor),
            NodeKind::ListItem => self.walk_list_item(node, false, cursor),
            NodeKind::CatalogEntry => self.walk_catalog_entry(node, cursor),

            NodeKind::Text { value } => self.walk_text(node, value, cursor),
            NodeKind::Newline | NodeKind::ParagraphBreak | NodeKind::ColumnBreak => {
                if cursor.row > 0 {
                    self.place_marker(Marker::ColumnBreak, cursor);
                    self.advance_column(cursor);
                }
            }
            NodeKind::Math { .. } | NodeKind::SideNote => self.place_node(node, cursor),

            NodeKind::Jiazhu { single } => self.walk_jiazhu(node, *single, cursor),
            NodeKind::MeiPi | NodeKind::PiZhu | NodeKind::Stamp { .. } => self.push_float(node),
            NodeKind::TextBox | NodeKind::FillTextBox => {
                let height = node
                    .options
                    .get_any(&["height", "value"])
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(1);
                self.place_node(node, cursor);
                self.advance_rows(cursor, height);
            }
            NodeKind::Decoration { .. } => {
                self.place_node(node, cursor);
                self.advance_rows(cursor, node.char_count());
            }

            NodeKind::Space { count } | NodeKind::NuoTai { count } => {
                self.place_node(node, cursor);
                self.advance_rows(cursor, *count);
            }
            NodeKind::Taitou { .. } | NodeKind::RelativeTaitou { .. } => self.elevate(node, cursor),
            NodeKind::SetIndent { indent } => {
                cursor.indent = *indent;
                self.place_node(node, cursor);
            }
        }
    }

    fn walk_children(&mut self, children: &'a [Node], cursor: &mut Cursor) {
        for child in children {
            self.walk_node(child, cursor);
        }
    }

    /// Start a raised column for a taitou or relative taitou node.
    fn elevate(&mut self, node: &'a Node, cursor: &mut Cursor) {
        self.advance_column(cursor);
        cursor.row = match node.kind {
            NodeKind::Taitou { level } => level,
            NodeKind::RelativeTaitou { offset } => cursor.indent.saturating_sub(offset),
            _ => cursor.row,
        };
        cursor.ignore_indent = true;
        self.place_node(node, cursor);
    }

    fn walk_paragraph(&mut self, node: &'a Node, cursor: &mut Cursor) {
        let indent = node.options.get_usize("indent").unwrap_or(0);
        let saved = cursor.indent;
        cursor.indent = indent;

        self.place_marker(Marker::ParagraphStart { indent }, cursor);
        self.walk_children(&node.children, cursor);
        self.place_marker(Marker::ParagraphEnd, cursor);

        cursor.indent = saved;
    }

    fn walk_list(&mut self, node: &'a Node, cursor: &mut Cursor) {
        self.place_marker(Marker::ListStart, cursor);
        let mut first = true;
        for child in &node.children {
            if child.kind == NodeKind::ListItem {
                self.walk_list_item(child, first, cursor);
                first = false;
            } else {
                self.walk_node(child, cursor);
            }
        }
        self.place_marker(Marker::ListEnd, cursor);
    }

    fn walk_list_item(&mut self, node: &'a Node, first: bool, cursor: &mut Cursor) {
        if !first {
            self.advance_column(cursor);
        }
        self.place_marker(Marker::ListItemStart { first }, cursor);
        self.walk_children(&node.children, cursor);
        self.place_marker(Marker::ListItemEnd, cursor);
    }

    /// A catalog entry owns a whole column.
    fn walk_catalog_entry(&mut self, node: &'a Node, cursor: &mut Cursor) {
        if cursor.row > 0 {
            self.advance_column(cursor);
        }
        let level = node.options.get_usize("value").unwrap_or(0);
        cursor.row = level;

        self.place_marker(Marker::CatalogStart { level }, cursor);
        self.walk_children(&node.children, cursor);
        self.place_marker(Marker::CatalogEnd, cursor);
        self.advance_column(cursor);
    }

    fn walk_text(&mut self, node: &'a Node, value: &str, cursor: &mut Cursor) {
        match cursor.punctuation {
            PunctuationMode::Normal => {
                let cells = wtc_ast::cell_chars(value).count();
                if cells > 0 {
                    self.place_node(node, cursor);
                    self.advance_rows(cursor, cells);
                }
            }
            PunctuationMode::None => {
                let stripped = strip_punctuation(value);
                self.place_text_run(stripped, cursor);
            }
            PunctuationMode::Judou => {
                for piece in segment_text(value) {
                    match piece {
                        TextPiece::Text(text) => self.place_text_run(text, cursor),
                        TextPiece::BookTitle(inner) => {
                            let cells = inner.chars().count();
                            let title = Node::new(NodeKind::Decoration {
                                style: DecorationStyle::BookTitle,
                            })
                            .with_children(vec![Node::text(inner)]);
                            self.place_owned(title, cursor);
                            self.advance_rows(cursor, cells);
                        }
                        TextPiece::Mark(ch, kind) => self.attach_mark(ch, kind, cursor),
                    }
                }
            }
        }
    }

    fn place_text_run(&mut self, text: String, cursor: &mut Cursor) {
        let cells = text.chars().count();
        if cells > 0 {
            self.place_owned(Node::text(text), cursor);
            self.advance_rows(cursor, cells);
        }
    }

    // =========================================================================
    // Jiazhu
    // =========================================================================

    fn walk_jiazhu(&mut self, node: &'a Node, single: bool, cursor: &mut Cursor) {
        let balance = !single
            && node
                .options
                .get_any(&["auto-balance", "自动均衡"])
                .map_or(true, |v| v.trim() != "false");

        if node.children.iter().any(|child| !child.is_text()) {
            self.walk_jiazhu_complex(node, balance, cursor);
            return;
        }

        let align = Align::from_option(node.options.get("align"));
        let rows_per_column = self.grid.rows_per_column;
        let remaining = cursor.remaining(rows_per_column);
        let first_max = if remaining > 0 {
            remaining
        } else {
            cursor.capacity(rows_per_column)
        };
        // later segments each fill a whole column that starts at row 0
        let max = cursor.fresh_capacity(rows_per_column);

        let chars = rich_chars(&plain_text_of(&node.children), cursor.punctuation);
        if chars.is_empty() {
            return;
        }
        let segments = split_annotation_multi(&chars, max, first_max, align, balance);
        let total = segments.len();

        // every segment advances by its own height; a full first segment is
        // exactly `first_max` rows tall, so this is the remaining-space rule
        for (index, segment) in segments.into_iter().enumerate() {
            let rows = segment.rows();
            let placement = JiazhuPlacement::Segments {
                segments: vec![segment],
                index,
                total,
            };
            self.place(Placement::Node(Cow::Borrowed(node)), cursor, Some(placement));
            self.advance_rows(cursor, rows);
        }
    }

    /// Annotation with markup children: split at elevations.
    fn walk_jiazhu_complex(&mut self, node: &'a Node, balance: bool, cursor: &mut Cursor) {
        let mut start = 0;
        for (i, child) in node.children.iter().enumerate() {
            if child.kind.is_elevation() {
                self.place_jiazhu_run(node, &node.children[start..i], balance, cursor);
                self.elevate(child, cursor);
                start = i + 1;
            }
        }
        self.place_jiazhu_run(node, &node.children[start..], balance, cursor);
    }

    fn place_jiazhu_run(
        &mut self,
        node: &'a Node,
        run: &'a [Node],
        balance: bool,
        cursor: &mut Cursor,
    ) {
        let cells = rich_chars(&plain_text_of(run), cursor.punctuation).len();
        if cells == 0 {
            return;
        }
        let rows = if balance { cells.div_ceil(2) } else { cells };
        let placement = JiazhuPlacement::Complex {
            children: run,
            balanced: balance,
        };
        self.place(Placement::Node(Cow::Borrowed(node)), cursor, Some(placement));
        self.advance_rows(cursor, rows);
    }
}
