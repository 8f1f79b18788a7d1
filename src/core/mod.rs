//! Compiler stages
//!
//! - `preprocess`: user macro expansion over raw source text
//! - `parser`: tokenizer, command registry and tree builder
//! - `layout`: grid placement of the parsed tree

pub mod layout;
pub mod parser;
pub mod preprocess;
