//! Built-in template tables
//!
//! Template names as written in `\documentclass[...]` or
//! `\gujiSetup{template=...}` map to stable template ids, and each id maps
//! to its grid geometry. Simplified and traditional spellings are both
//! accepted.

use phf::phf_map;

use super::GridConfig;

/// Template used when the document names none or an unknown one
pub const DEFAULT_TEMPLATE_ID: &str = "siku-quanshu";

/// Display name -> template id
static TEMPLATE_IDS: phf::Map<&'static str, &'static str> = phf_map! {
    "四库全书" => "siku-quanshu",
    "四庫全書" => "siku-quanshu",
    "四库全书彩色" => "siku-quanshu-colored",
    "四庫全書彩色" => "siku-quanshu-colored",
    "红楼梦甲戌本" => "honglou",
    "紅樓夢甲戌本" => "honglou",
    "极简" => "minimal",
    "極簡" => "minimal",
};

/// Template id -> (rows per column, columns per half page)
static TEMPLATE_GRIDS: phf::Map<&'static str, (usize, usize)> = phf_map! {
    "siku-quanshu" => (21, 8),
    "siku-quanshu-colored" => (21, 8),
    "honglou" => (20, 9),
    "minimal" => (21, 8),
};

/// Look up a template display name.
///
/// Ids themselves are accepted too, so `siku-quanshu` resolves to itself.
pub fn template_id(name: &str) -> Option<&'static str> {
    let name = name.trim();
    TEMPLATE_IDS
        .get(name)
        .copied()
        .or_else(|| TEMPLATE_GRIDS.get_key(name).copied())
}

/// Grid geometry for a template id, the default geometry when unknown
pub fn grid_for(id: &str) -> GridConfig {
    let (rows, cols) = TEMPLATE_GRIDS
        .get(id)
        .copied()
        .unwrap_or((21, 8));
    GridConfig {
        rows_per_column: rows,
        columns_per_half_page: cols,
    }
}

/// All built-in template ids, for listings
pub fn template_ids() -> impl Iterator<Item = &'static str> {
    TEMPLATE_GRIDS.keys().copied()
}
