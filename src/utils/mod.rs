//! Utility modules
//!
//! - Error types for the outer surface
//! - Character classes shared by the front-end stages

pub mod chars;
pub mod error;

pub use error::{WtcError, WtcResult};
