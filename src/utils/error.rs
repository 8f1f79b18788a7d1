//! Error handling for webtex-cn
//!
//! The compile pipeline itself never fails: malformed markup degrades to
//! warnings (see [`crate::core::parser::ParseWarning`]). The errors here
//! cover the outer surface: reading inputs, validating grids and emitting
//! JSON.

use std::path::PathBuf;

/// Result alias for fallible outer-surface operations
pub type WtcResult<T> = Result<T, WtcError>;

#[derive(Debug, thiserror::Error)]
pub enum WtcError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid grid {rows}x{cols}: rows and columns must be positive")]
    InvalidGrid { rows: usize, cols: usize },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WtcError {
    /// Wrap an I/O failure with the path that caused it
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WtcError::Io {
            path: path.into(),
            source,
        }
    }
}
