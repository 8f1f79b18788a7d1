//! End-to-end tests: configuration, expansion, parsing and layout

use webtex_cn::wtc_ast::NodeKind;
use webtex_cn::{compile, CompileOptions, GridConfig, PunctuationMode, WarningKind};

const CFG: &str = r"% sample template configuration
\NewDocumentCommand{\小注}{m}{\夹注{#1}}
\NewDocumentEnvironment{按语}{o}{\begin{段落}[indent=#1]}{\end{段落}}
\gujiSetup{template=红楼梦甲戌本}
";

fn wrap(body: &str) -> String {
    format!(
        "\\documentclass[四库全书]{{ltc-guji}}\n\\title{{欽定四庫全書}}\n\\begin{{document}}\n\\begin{{正文}}{}\\end{{正文}}\n\\end{{document}}",
        body
    )
}

// ============================================================================
// Template configuration
// ============================================================================

mod configuration {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cfg_macro_expands_to_jiazhu() {
        let compiled = compile(&wrap("天\\小注{注文}地"), Some(CFG), &CompileOptions::default());
        assert!(compiled.warnings.is_empty(), "{:?}", compiled.warning_messages());
        assert!(compiled.expanded_source.contains("\\夹注{注文}"));

        let layout = compiled.layout();
        let items = &layout.pages[0].items;
        assert_eq!(items.len(), 3);
        assert!(matches!(
            items[1].node().map(|n| &n.kind),
            Some(NodeKind::Jiazhu { single: false })
        ));
    }

    #[test]
    fn test_cfg_environment_becomes_paragraph() {
        let compiled = compile(
            &wrap("\\begin{按语}[2]天地\\end{按语}"),
            Some(CFG),
            &CompileOptions::default(),
        );
        assert!(compiled.warnings.is_empty(), "{:?}", compiled.warning_messages());
        let layout = compiled.layout();
        assert_eq!(layout.pages[0].items[0].indent, 2);
    }

    #[test]
    fn test_cfg_preamble_selects_template() {
        let compiled = compile(&wrap("天"), Some(CFG), &CompileOptions::default());
        assert_eq!(compiled.config.template_id, "honglou");
        assert_eq!(compiled.config.grid, GridConfig::new(20, 9).unwrap());
    }

    #[test]
    fn test_template_override_wins() {
        let options = CompileOptions::default().with_template("四库全书");
        let compiled = compile(&wrap("天"), Some(CFG), &options);
        assert_eq!(compiled.config.template_id, "siku-quanshu");
        assert_eq!(compiled.config.grid, GridConfig::default());
    }

    #[test]
    fn test_unknown_override_keeps_document_template() {
        let options = CompileOptions::default().with_template("不存在");
        let compiled = compile(&wrap("天"), None, &options);
        assert_eq!(compiled.config.template_id, "siku-quanshu");
    }

    #[test]
    fn test_grid_override() {
        let grid = GridConfig::new(10, 2).unwrap();
        let options = CompileOptions::default().with_grid(grid);
        let compiled = compile(&wrap(&"天".repeat(45)), None, &options);
        let layout = compiled.layout();
        assert_eq!(layout.grid, grid);
        assert_eq!(layout.page_count(), 2);
    }

    #[test]
    fn test_metadata_carried_to_layout() {
        let compiled = compile(&wrap("天"), None, &CompileOptions::default());
        let layout = compiled.layout();
        assert_eq!(layout.meta.title, "欽定四庫全書");
    }
}

// ============================================================================
// Warnings
// ============================================================================

mod warnings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_command_keeps_content() {
        let compiled = compile(&wrap("天\\foo{地}"), None, &CompileOptions::default());
        assert_eq!(compiled.warnings.len(), 1);
        assert_eq!(compiled.warnings[0].kind, WarningKind::UnknownCommand);
        assert!(compiled.warning_messages()[0].starts_with("Unknown command: \\foo"));
        assert_eq!(compiled.layout().pages[0].items.len(), 2);
    }

    #[test]
    fn test_unclosed_environment_still_lays_out() {
        let source = "\\begin{document}\\begin{正文}天地";
        let compiled = compile(source, None, &CompileOptions::default());
        let kinds: Vec<_> = compiled.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::UnclosedEnvironment, WarningKind::UnclosedEnvironment]
        );
        assert_eq!(compiled.layout().pages[0].items.len(), 1);
    }

    #[test]
    fn test_warnings_in_document_order() {
        let compiled = compile(&wrap("\\foo \\夹注{\\bar}"), None, &CompileOptions::default());
        assert_eq!(
            compiled
                .warning_messages()
                .iter()
                .map(|m| m.split(" at ").next().unwrap_or_default().to_string())
                .collect::<Vec<_>>(),
            vec!["Unknown command: \\foo", "Unknown command: \\bar"]
        );
    }
}

// ============================================================================
// Punctuation and output
// ============================================================================

mod output {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_judou_switch_from_source() {
        let compiled = compile(&wrap("\\句读模式{}天地。"), None, &CompileOptions::default());
        assert_eq!(compiled.config.punctuation, PunctuationMode::Judou);
    }

    #[test]
    fn test_punctuation_override_beats_switch() {
        let options = CompileOptions::judou();
        let compiled = compile(&wrap("\\正常标点模式{}天"), None, &options);
        assert_eq!(compiled.config.punctuation, PunctuationMode::Judou);
    }

    #[test]
    fn test_layout_serializes_to_json() {
        let compiled = compile(&wrap("天\\夹注{注}\\眉批{眉}"), None, &CompileOptions::default());
        let json = serde_json::to_string(&compiled.layout()).unwrap();
        assert!(json.contains("\"pages\""));
        assert!(json.contains("\"halfBoundary\""));
        assert!(json.contains("\"templateId\":\"siku-quanshu\""));
        assert!(json.contains("\"floats\""));
    }

    #[test]
    fn test_layout_json_key_names() {
        let compiled = compile(&wrap("\\句读模式{}天"), None, &CompileOptions::default());
        let value = serde_json::to_value(&compiled.layout()).unwrap();
        assert_eq!(value["gridConfig"]["rowsPerColumn"], 21);
        assert_eq!(value["meta"]["setupDirectives"].as_array().map(Vec::len), Some(1));
        assert!(value.get("grid").is_none());
    }

    #[test]
    fn test_document_serializes_to_json() {
        let compiled = compile(&wrap("天"), None, &CompileOptions::default());
        let value = serde_json::to_value(&compiled.document).unwrap();
        assert_eq!(value["template"], "四库全书");
        assert_eq!(value["title"], "欽定四庫全書");
    }
}
