//! Rust Source Parser
//!
//! Tree-sitter based extraction of declarations, doc comments, `use`
//! bindings and child modules from Rust source files.
//!
//! ```rust,ignore
//! use shapedoc::analyzer::parser::{Parser, RustParser};
//!
//! let parser = RustParser::new()?;
//! let result = parser.parse("src/models.rs", content)?;
//! ```

pub mod attributes;
pub mod rust_lang;
pub mod traits;
pub mod use_tree;

pub use rust_lang::RustParser;
pub use traits::{
    ChildModule, ModuleSource, ParseResult, Parser, SyntaxError, collect_syntax_errors,
    create_ts_parser, get_node_line, get_node_text,
};
pub use use_tree::expand_use_tree;
