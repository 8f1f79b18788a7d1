//! Command and environment registries
//!
//! Each canonical name maps to a definition giving its argument shape and
//! what the parser builds from it. Aliases (traditional spellings, pinyin
//! and Latin names) point at a canonical name and are resolved through
//! [`resolve_chain`].

use fxhash::FxHashSet;
use phf::phf_map;
use wtc_ast::{DecorationStyle, SetupKind};

/// Declared argument, in reading order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    /// `[...]`
    Optional,
    /// `{...}`
    Required,
}

/// Documentation grouping of a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Structure,
    Annotation,
    Decoration,
    Layout,
    Setup,
    Ignored,
}

/// Node built by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTemplate {
    Jiazhu { single: bool },
    SideNote,
    MeiPi,
    PiZhu,
    TextBox,
    FillTextBox,
    Decoration(DecorationStyle),
    Space,
    SetIndent,
    ColumnBreak,
    Taitou,
    NuoTai,
    RelativeTaitou,
    Stamp,
    CatalogEntry,
}

/// What the parser does with a resolved command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget {
    DocumentClass,
    Title,
    Chapter,
    /// `\item` inside a list
    ItemSeparator,
    Node(NodeTemplate),
    Setup(SetupKind),
    /// Consume arguments, produce nothing
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDef {
    pub args: &'static [Arg],
    pub target: CommandTarget,
    /// Value used when the optional argument is absent
    pub default: Option<&'static str>,
    pub category: Category,
    pub description: &'static str,
}

/// Node built by an environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentTarget {
    Body,
    ContentBlock,
    Paragraph,
    List,
    Jiazhu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentDef {
    pub target: EnvironmentTarget,
    /// Reads a `[key=value]` group after `\begin{name}`
    pub has_options: bool,
    pub category: Category,
    pub description: &'static str,
}

/// A registry entry: a definition or an alias to another name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<T: 'static> {
    Def(T),
    Alias(&'static str),
}

const NONE: &[Arg] = &[];
const OPT: &[Arg] = &[Arg::Optional];
const REQ: &[Arg] = &[Arg::Required];
const OPT_REQ: &[Arg] = &[Arg::Optional, Arg::Required];

const fn def(
    args: &'static [Arg],
    target: CommandTarget,
    category: Category,
    description: &'static str,
) -> Entry<CommandDef> {
    Entry::Def(CommandDef {
        args,
        target,
        default: None,
        category,
        description,
    })
}

const fn node(
    args: &'static [Arg],
    template: NodeTemplate,
    category: Category,
    description: &'static str,
) -> Entry<CommandDef> {
    def(args, CommandTarget::Node(template), category, description)
}

const fn with_default(
    template: NodeTemplate,
    default: &'static str,
    description: &'static str,
) -> Entry<CommandDef> {
    Entry::Def(CommandDef {
        args: NONE,
        target: CommandTarget::Node(template),
        default: Some(default),
        category: Category::Layout,
        description,
    })
}

const fn jiazhu(description: &'static str) -> Entry<CommandDef> {
    node(OPT_REQ, NodeTemplate::Jiazhu { single: false }, Category::Annotation, description)
}

const fn decoration(
    args: &'static [Arg],
    style: DecorationStyle,
    description: &'static str,
) -> Entry<CommandDef> {
    node(args, NodeTemplate::Decoration(style), Category::Decoration, description)
}

const fn setup(
    args: &'static [Arg],
    kind: SetupKind,
    description: &'static str,
) -> Entry<CommandDef> {
    def(args, CommandTarget::Setup(kind), Category::Setup, description)
}

const fn ignore(args: &'static [Arg], description: &'static str) -> Entry<CommandDef> {
    def(args, CommandTarget::Ignore, Category::Ignored, description)
}

const fn alias<T: 'static>(target: &'static str) -> Entry<T> {
    Entry::Alias(target)
}

// =============================================================================
// Command Registry
// =============================================================================

pub static COMMANDS: phf::Map<&'static str, Entry<CommandDef>> = phf_map! {
    // Document structure
    "documentclass" => def(OPT_REQ, CommandTarget::DocumentClass, Category::Structure, "Document class and template selection"),
    "title" => def(REQ, CommandTarget::Title, Category::Structure, "Book title shown in the banxin"),
    "chapter" => def(REQ, CommandTarget::Chapter, Category::Structure, "Chapter title shown in the banxin"),
    "item" => def(NONE, CommandTarget::ItemSeparator, Category::Structure, "List item separator"),

    // Jiazhu
    "按" => jiazhu("Dual-column annotation, 按 variant"),
    "謹按" => alias("按"),
    "谨按" => alias("按"),
    "案" => alias("按"),
    "謹案" => alias("按"),
    "谨案" => alias("按"),
    "注" => jiazhu("Dual-column annotation, 注 variant"),
    "註" => alias("注"),
    "標" => jiazhu("Dual-column annotation, 標 variant"),
    "提" => alias("標"),
    "夹注" => jiazhu("Interlinear dual-column annotation"),
    "JiaZhu" => alias("夹注"),
    "夾注" => alias("夹注"),
    "单行夹注" => node(OPT_REQ, NodeTemplate::Jiazhu { single: true }, Category::Annotation, "Single-column annotation"),
    "DanHangJiaZhu" => alias("单行夹注"),
    "單行夾注" => alias("单行夹注"),

    // Margin and floating notes
    "侧批" => node(OPT_REQ, NodeTemplate::SideNote, Category::Annotation, "Margin note at the page edge"),
    "SideNode" => alias("侧批"),
    "CePi" => alias("侧批"),
    "側批" => alias("侧批"),
    "眉批" => node(OPT_REQ, NodeTemplate::MeiPi, Category::Annotation, "Page-header note"),
    "MeiPi" => alias("眉批"),
    "批注" => node(OPT_REQ, NodeTemplate::PiZhu, Category::Annotation, "Floating note at an absolute position"),
    "PiZhu" => alias("批注"),

    // Text boxes
    "文本框" => node(OPT_REQ, NodeTemplate::TextBox, Category::Layout, "Bordered multi-column text box"),
    "TextBox" => alias("文本框"),
    "填充文本框" => node(OPT_REQ, NodeTemplate::FillTextBox, Category::Layout, "Fill text box"),
    "FillTextBox" => alias("填充文本框"),

    // Decorations
    "圈点" => decoration(OPT_REQ, DecorationStyle::Emphasis, "Emphasis dots"),
    "EmphasisMark" => alias("圈点"),
    "着重号" => alias("圈点"),
    "著重號" => alias("圈点"),
    "装饰" => decoration(OPT_REQ, DecorationStyle::Decorate, "Generic character decoration"),
    "decorate" => alias("装饰"),
    "裝飾" => alias("装饰"),
    "专名号" => decoration(OPT_REQ, DecorationStyle::ProperName, "Proper name straight underline"),
    "ProperNameMark" => alias("专名号"),
    "專名號" => alias("专名号"),
    "下划线" => alias("专名号"),
    "下劃線" => alias("专名号"),
    "Underline" => alias("专名号"),
    "书名号" => decoration(OPT_REQ, DecorationStyle::BookTitle, "Book title wavy underline"),
    "BookTitleMark" => alias("书名号"),
    "書名號" => alias("书名号"),
    "波浪线" => alias("书名号"),
    "波浪線" => alias("书名号"),
    "WavyUnderline" => alias("书名号"),
    "反白" => decoration(REQ, DecorationStyle::Inverted, "White on black"),
    "inverted" => alias("反白"),
    "八角框" => decoration(REQ, DecorationStyle::Octagon, "Octagonal border"),
    "octagon" => alias("八角框"),
    "带圈" => decoration(REQ, DecorationStyle::Circled, "Circular border"),
    "circled" => alias("带圈"),
    "帶圈" => alias("带圈"),
    "反白八角框" => decoration(REQ, DecorationStyle::InvertedOctagon, "Inverted octagonal border"),
    "invertedOctagon" => alias("反白八角框"),
    "改" => decoration(REQ, DecorationStyle::Fix, "Correction mark"),
    "fix" => alias("改"),

    // Layout control
    "空格" => node(OPT, NodeTemplate::Space, Category::Layout, "Insert N full-width spaces"),
    "Space" => alias("空格"),
    "设置缩进" => node(REQ, NodeTemplate::SetIndent, Category::Layout, "Force the current indent"),
    "SetIndent" => alias("设置缩进"),
    "設置縮進" => alias("设置缩进"),
    "换行" => node(NONE, NodeTemplate::ColumnBreak, Category::Layout, "Force a column break"),
    "HuanHang" => alias("换行"),
    "換行" => alias("换行"),

    // Taitou
    "抬头" => node(OPT, NodeTemplate::Taitou, Category::Layout, "New column raised by N cells"),
    "TaiTou" => alias("抬头"),
    "抬頭" => alias("抬头"),
    "平抬" => with_default(NodeTemplate::Taitou, "0", "Taitou level 0"),
    "单抬" => with_default(NodeTemplate::Taitou, "1", "Taitou level 1"),
    "單抬" => alias("单抬"),
    "双抬" => with_default(NodeTemplate::Taitou, "2", "Taitou level 2"),
    "雙抬" => alias("双抬"),
    "三抬" => with_default(NodeTemplate::Taitou, "3", "Taitou level 3"),
    "挪抬" => node(OPT, NodeTemplate::NuoTai, Category::Layout, "Inline shift by N cells"),
    "NuoTai" => alias("挪抬"),
    "空抬" => with_default(NodeTemplate::NuoTai, "1", "Inline shift by one cell"),
    "KongTai" => alias("空抬"),
    "相对抬头" => node(OPT, NodeTemplate::RelativeTaitou, Category::Layout, "Elevation relative to the current indent"),
    "XiangDuiTaiTou" => alias("相对抬头"),
    "相對抬頭" => alias("相对抬头"),

    // Setup
    "contentSetup" => setup(REQ, SetupKind::Content, "Content area typography and grid"),
    "内容设置" => alias("contentSetup"),
    "內容設置" => alias("contentSetup"),
    "pageSetup" => setup(REQ, SetupKind::Page, "Page geometry and margins"),
    "页面设置" => alias("pageSetup"),
    "頁面設置" => alias("pageSetup"),
    "banxinSetup" => setup(REQ, SetupKind::Banxin, "Banxin configuration"),
    "版心设置" => alias("banxinSetup"),
    "版心設置" => alias("banxinSetup"),
    "sidenodeSetup" => setup(REQ, SetupKind::SideNote, "Margin note defaults"),
    "侧批设置" => alias("sidenodeSetup"),
    "側批設置" => alias("sidenodeSetup"),
    "jiazhuSetup" => setup(REQ, SetupKind::Jiazhu, "Jiazhu defaults"),
    "夹注设置" => alias("jiazhuSetup"),
    "夾注設置" => alias("jiazhuSetup"),
    "pizhuSetup" => setup(REQ, SetupKind::PiZhu, "Floating note defaults"),
    "批注设置" => alias("pizhuSetup"),
    "批注設置" => alias("pizhuSetup"),
    "meipiSetup" => setup(REQ, SetupKind::MeiPi, "Page-header note defaults"),
    "眉批设置" => alias("meipiSetup"),
    "眉批設置" => alias("meipiSetup"),
    "gujiSetup" => setup(REQ, SetupKind::Guji, "Load a preset template"),
    "古籍设置" => alias("gujiSetup"),
    "古籍設置" => alias("gujiSetup"),
    "judouSetup" => setup(REQ, SetupKind::Judou, "Judou punctuation configuration"),
    "句读设置" => alias("judouSetup"),
    "句讀設置" => alias("judouSetup"),

    // Punctuation modes
    "句读模式" => setup(OPT, SetupKind::JudouOn, "Enable judou punctuation"),
    "JudouOn" => alias("句读模式"),
    "开启句读" => alias("句读模式"),
    "開啟句讀" => alias("句读模式"),
    "JudouPunctuationMode" => alias("句读模式"),
    "正常标点模式" => setup(OPT, SetupKind::JudouOff, "Normal punctuation"),
    "JudouOff" => alias("正常标点模式"),
    "关闭句读" => alias("正常标点模式"),
    "關閉句讀" => alias("正常标点模式"),
    "NormalPunctuationMode" => alias("正常标点模式"),
    "无标点模式" => setup(OPT, SetupKind::JudouNone, "Drop all punctuation"),
    "NonePunctuationMode" => alias("无标点模式"),
    "無標點模式" => alias("无标点模式"),

    // Ignored
    "usepackage" => ignore(OPT_REQ, "Package loading"),
    "RequirePackage" => alias("usepackage"),
    "setmainfont" => ignore(OPT_REQ, "Font selection"),
    "设置字体" => alias("setmainfont"),
    "設置字體" => alias("setmainfont"),
    "pagestyle" => ignore(REQ, "Page style"),
    "noindent" => ignore(NONE, "No indent"),
    "par" => ignore(NONE, "Paragraph end"),
    "relax" => ignore(NONE, "No-op"),
    "ignorespaces" => ignore(NONE, "Space skipping"),
    "definecolor" => ignore(&[Arg::Required, Arg::Required, Arg::Required], "Color definition"),
    "AddToHook" => ignore(&[Arg::Required, Arg::Required], "Hook registration"),
    "禁用分页裁剪" => ignore(NONE, "Disable page splitting"),
    "disableSplitPage" => alias("禁用分页裁剪"),
    "显示坐标" => ignore(NONE, "Show coordinates"),
    "LtcDebugOn" => ignore(NONE, "Debug on"),
    "开启调试" => alias("LtcDebugOn"),
    "開啟調試" => alias("LtcDebugOn"),
    "LtcDebugOff" => ignore(NONE, "Debug off"),
    "关闭调试" => alias("LtcDebugOff"),
    "關閉調試" => alias("LtcDebugOff"),

    // Stamp and catalog
    "印章" => node(OPT_REQ, NodeTemplate::Stamp, Category::Layout, "Seal image overlay"),
    "YinZhang" => alias("印章"),
    "条目" => node(OPT_REQ, NodeTemplate::CatalogEntry, Category::Structure, "Catalog entry with level"),
    "條目" => alias("条目"),
    "TiaoMu" => alias("条目"),
};

// =============================================================================
// Environment Registry
// =============================================================================

const fn env(
    target: EnvironmentTarget,
    has_options: bool,
    category: Category,
    description: &'static str,
) -> Entry<EnvironmentDef> {
    Entry::Def(EnvironmentDef {
        target,
        has_options,
        category,
        description,
    })
}

pub static ENVIRONMENTS: phf::Map<&'static str, Entry<EnvironmentDef>> = phf_map! {
    "document" => env(EnvironmentTarget::Body, false, Category::Structure, "Document body"),
    "正文" => env(EnvironmentTarget::ContentBlock, false, Category::Structure, "Content block"),
    "BodyText" => alias("正文"),
    "段落" => env(EnvironmentTarget::Paragraph, true, Category::Structure, "Indented paragraph"),
    "Paragraph" => alias("段落"),
    "列表" => env(EnvironmentTarget::List, false, Category::Structure, "List with item grouping"),
    "夹注环境" => env(EnvironmentTarget::Jiazhu, true, Category::Annotation, "Jiazhu environment form"),
    "JiaZhuEnv" => alias("夹注环境"),
    "夾注環境" => alias("夹注环境"),
};

// =============================================================================
// Alias Resolution
// =============================================================================

/// Follow alias entries from `name` to a definition.
///
/// Each lookup carries its own visited set, so a cyclic chain ends in
/// `None` instead of looping.
pub fn resolve_chain<'m, T, F>(name: &str, lookup: F) -> Option<&'m T>
where
    F: Fn(&str) -> Option<&'m Entry<T>>,
    T: 'static,
{
    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut current = name.to_string();
    loop {
        match lookup(current.as_str())? {
            Entry::Def(def) => return Some(def),
            Entry::Alias(target) => {
                if !visited.insert(current) {
                    return None;
                }
                current = (*target).to_string();
            }
        }
    }
}

pub fn resolve_command(name: &str) -> Option<&'static CommandDef> {
    resolve_chain(name, |n| COMMANDS.get(n))
}

pub fn resolve_environment(name: &str) -> Option<&'static EnvironmentDef> {
    resolve_chain(name, |n| ENVIRONMENTS.get(n))
}
