//! Grid layout tests driven from markup source

use webtex_cn::{balance, compile, CompileOptions, JiazhuPlacement, Marker, Placement};

/// Wrap body markup in a minimal book document
fn book(body: &str) -> String {
    format!(
        "\\documentclass[四库全书]{{ltc-guji}}\n\\begin{{document}}\n\\begin{{正文}}{}\\end{{正文}}\n\\end{{document}}",
        body
    )
}

fn compiled(body: &str) -> webtex_cn::Compilation {
    let compiled = compile(&book(body), None, &CompileOptions::default());
    assert!(
        compiled.warnings.is_empty(),
        "unexpected warnings: {:?}",
        compiled.warning_messages()
    );
    compiled
}

/// (col, row) of every item on the first page
fn positions(body: &str) -> Vec<(usize, usize)> {
    let compiled = compiled(body);
    let layout = compiled.layout();
    layout.pages[0].items.iter().map(|i| (i.col, i.row)).collect()
}

// ============================================================================
// Cursor movement
// ============================================================================

mod cursor {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_overflow_keeps_remainder() {
        let body = format!("{}\\空格", "天".repeat(25));
        assert_eq!(positions(&body).last(), Some(&(1, 4)));
    }

    #[test]
    fn test_exact_column_starts_next_column() {
        let body = format!("{}\\空格", "天".repeat(21));
        assert_eq!(positions(&body).last(), Some(&(1, 0)));
    }

    #[test]
    fn test_paragraph_indent_reduces_capacity() {
        let body = format!("\\begin{{段落}}[indent=3]{}\\end{{段落}}", "天".repeat(20));
        let compiled = compiled(&body);
        let layout = compiled.layout();
        let end = layout.pages[0].items.last().unwrap();
        assert_eq!(end.marker(), Some(Marker::ParagraphEnd));
        assert_eq!((end.col, end.row), (1, 2));
        assert_eq!(end.indent, 3);
    }

    #[test]
    fn test_indent_restored_after_paragraph() {
        let body = format!("\\begin{{段落}}[indent=3]天\\end{{段落}}{}\\空格", "地".repeat(20));
        // 1 indented cell, then 20 unindented cells from row 1
        assert_eq!(positions(&body).last(), Some(&(1, 0)));
    }

    #[test]
    fn test_taitou_levels() {
        let pos = positions("天\\抬头[2]地\\平抬{}人");
        assert_eq!(pos, vec![(0, 0), (1, 2), (1, 2), (2, 0), (2, 0)]);
    }

    #[test]
    fn test_breaks_do_not_open_empty_columns() {
        let pos = positions("\\\\天\\\\\n\n\\换行{}地");
        assert_eq!(pos, vec![(0, 0), (0, 1), (1, 0)]);
    }
}

// ============================================================================
// Pages and half pages
// ============================================================================

mod pages {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_has_one_empty_page() {
        let compiled = compile("", None, &CompileOptions::default());
        let layout = compiled.layout();
        assert_eq!(layout.page_count(), 1);
        assert!(layout.pages[0].items.is_empty());
        assert_eq!(layout.pages[0].half_boundary, Some(0));
    }

    #[test]
    fn test_seventeen_breaks_spill_to_second_page() {
        let compiled = compiled(&"天\\\\".repeat(17));
        assert!(compiled.layout().page_count() >= 2);
    }

    #[test]
    fn test_first_half_only() {
        let compiled = compiled(&"天\\\\".repeat(3));
        let layout = compiled.layout();
        let page = &layout.pages[0];
        assert_eq!(page.half_boundary, Some(page.items.len()));
        assert!(page.left_half().is_empty());
    }

    #[test]
    fn test_boundary_inside_page_when_crossing() {
        let body = format!("{}\\空格{{}}地", "天".repeat(21 * 8));
        let compiled = compiled(&body);
        let layout = compiled.layout();
        assert_eq!(layout.page_count(), 1);

        let page = &layout.pages[0];
        assert_eq!(page.half_boundary, Some(1));
        assert_eq!(page.right_half().len(), 1);
        let left: Vec<_> = page.left_half().iter().map(|i| (i.col, i.row)).collect();
        assert_eq!(left, vec![(8, 0), (8, 1)]);
    }

    #[test]
    fn test_honglou_grid_from_documentclass() {
        let source = "\\documentclass[红楼梦甲戌本]{ltc-guji}\\begin{document}\\begin{正文}天天\\end{正文}\\end{document}";
        let compiled = compile(source, None, &CompileOptions::default());
        let layout = compiled.layout();
        assert_eq!(layout.template_id, "honglou");
        assert_eq!(layout.grid.rows_per_column, 20);
        assert_eq!(layout.grid.columns_per_half_page, 9);
    }

    #[test]
    fn test_floats_collected_per_page() {
        let compiled = compiled("天\\眉批[x=1]{眉}\\批注{批}\\印章[]{seal.png}地");
        let layout = compiled.layout();
        let page = &layout.pages[0];
        assert_eq!(page.floats.len(), 3);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn test_only_body_is_laid_out() {
        let source = "前言\\begin{document}\\begin{正文}天\\end{正文}\\end{document}";
        let compiled = compile(source, None, &CompileOptions::default());
        assert_eq!(compiled.layout().pages[0].items.len(), 1);
    }
}

// ============================================================================
// Jiazhu
// ============================================================================

mod jiazhu {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_annotation_single_segment() {
        let compiled = compiled("黄帝者\\夹注{少典之子}姓公孫");
        let layout = compiled.layout();
        let items = &layout.pages[0].items;
        assert_eq!(items.len(), 3);
        match &items[1].jiazhu {
            Some(JiazhuPlacement::Segments { segments, total: 1, .. }) => {
                assert_eq!(segments[0].col1.len(), 2);
                assert_eq!(segments[0].col2.len(), 2);
            }
            other => panic!("unexpected placement {:?}", other),
        }
        assert_eq!((items[2].col, items[2].row), (0, 5));
    }

    #[test]
    fn test_long_annotation_splits_at_column_end() {
        let body = format!("黄帝者\\夹注{{{}}}少典之子", "注".repeat(40));
        let compiled = compiled(&body);
        let layout = compiled.layout();
        assert_eq!(layout.page_count(), 1);

        let items = &layout.pages[0].items;
        let segments: Vec<_> = items
            .iter()
            .filter_map(|item| match &item.jiazhu {
                Some(JiazhuPlacement::Segments { segments, index, total }) => {
                    Some((segments[0].clone(), *index, *total))
                }
                _ => None,
            })
            .collect();
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|(_, _, total)| *total == 2));
        assert!(segments[0].0.col1.len() <= 18);
        assert_eq!(segments[0].0.rows(), 18);
        assert_eq!(segments[1].0.len(), 4);

        let tail = items.last().unwrap();
        assert_eq!((tail.col, tail.row), (1, 2));
    }

    #[test]
    fn test_inward_alignment_option() {
        let compiled = compiled("\\夹注[align=inward]{一二三四五六七}");
        let layout = compiled.layout();
        match &layout.pages[0].items[0].jiazhu {
            Some(JiazhuPlacement::Segments { segments, .. }) => {
                assert_eq!((segments[0].col1.len(), segments[0].col2.len()), (3, 4));
            }
            other => panic!("unexpected placement {:?}", other),
        }
    }

    #[test]
    fn test_taitou_inside_annotation() {
        let compiled = compiled("天\\夹注{一二三\\抬头[1]四五}地");
        let layout = compiled.layout();
        let items = &layout.pages[0].items;
        assert_eq!(items.len(), 5);
        assert!(matches!(items[1].jiazhu, Some(JiazhuPlacement::Complex { .. })));
        assert_eq!((items[2].col, items[2].row), (1, 1));
        assert_eq!((items[4].col, items[4].row), (1, 2));
    }
}

// ============================================================================
// Punctuation modes
// ============================================================================

mod punctuation {
    use super::*;
    use pretty_assertions::assert_eq;

    fn judou_marks(source: &str) -> Vec<(char, usize, usize)> {
        let compiled = compile(source, None, &CompileOptions::default());
        let layout = compiled.layout();
        layout
            .items()
            .filter_map(|item| match item.placement {
                Placement::Judou(mark) => Some((mark.ch, item.col, item.row)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_judou_switch_in_document() {
        let source = "\\句读模式\\begin{document}\\begin{正文}天地，玄黄。\\end{正文}\\end{document}";
        assert_eq!(judou_marks(source), vec![('，', 0, 1), ('。', 0, 3)]);
    }

    #[test]
    fn test_normal_mode_places_punctuation() {
        assert!(judou_marks(&book("天地，玄黄。")).is_empty());
        assert_eq!(positions("天地，玄黄。\\空格").last(), Some(&(0, 6)));
    }

    #[test]
    fn test_none_mode_override() {
        let compiled = compile(&book("天地，玄黄。\\空格"), None, &CompileOptions::unpunctuated());
        let layout = compiled.layout();
        let last = layout.pages[0].items.last().unwrap();
        assert_eq!((last.col, last.row), (0, 4));
    }

    #[test]
    fn test_judou_in_annotation_decorates_chars() {
        let compiled = compile(&book("\\夹注{天地，玄黄。}"), None, &CompileOptions::judou());
        let layout = compiled.layout();
        match &layout.pages[0].items[0].jiazhu {
            Some(JiazhuPlacement::Segments { segments, .. }) => {
                assert_eq!(segments[0].len(), 4);
                assert!(segments[0].col1[1].judou.is_some());
            }
            other => panic!("unexpected placement {:?}", other),
        }
    }
}

// ============================================================================
// Span balancing
// ============================================================================

mod spans {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paragraph_reopened_on_next_page() {
        let body = format!("\\begin{{段落}}[indent=1]{}\\end{{段落}}", "天".repeat(20 * 17));
        let compiled = compiled(&body);
        let layout = compiled.layout();
        assert_eq!(layout.page_count(), 2);

        let slices = balance(&layout);
        let open = vec![Marker::ParagraphStart { indent: 1 }];
        assert!(slices[0].right.reopened.is_empty());
        assert_eq!(slices[0].right.still_open, open);
        assert_eq!(slices[0].left.reopened, open);
        assert_eq!(slices[1].right.reopened, open);
        assert!(slices[1].left.still_open.is_empty());
    }

    #[test]
    fn test_list_items_balanced_across_halves() {
        let items: String = (0..10).map(|_| "\\item 甲").collect();
        let body = format!("\\begin{{列表}}{}\\end{{列表}}", items);
        let compiled = compiled(&body);
        let layout = compiled.layout();
        let slices = balance(&layout);
        let page = &slices[0];
        assert_eq!(page.right.still_open, vec![Marker::ListStart]);
        assert_eq!(page.left.reopened, vec![Marker::ListStart]);
        assert!(page.left.still_open.is_empty());
    }
}
