//! Source Analyzer Module
//!
//! - Rust parsing (declarations, doc comments, modules, imports)
//! - Manifest scanning with gitignore support

pub mod parser;
pub mod scanner;

pub use parser::{ModuleSource, ParseResult, Parser, RustParser};
pub use scanner::ManifestScanner;
