//! shapedoc - Documentation for Rust Data Types
//!
//! Produces a flat, path-addressed description of a data type: one entry
//! per reachable property (`$`, `$.name`, `$.students[*]`, `$.grades.*`),
//! each carrying a normalized type descriptor, the doc comment of the
//! property's type, the doc comment of the member position, and any
//! deprecation note. Doc comments come from the project's own source
//! tree, so no compiled-in metadata is needed.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use shapedoc::{GenerateOptions, Generator, NoRules, StoreLoader, find_project_root};
//!
//! let root = find_project_root("Cargo.toml")?;
//! let store = Arc::new(StoreLoader::new(root).load()?);
//! let doc = Generator::new(store).generate_for::<Teacher>(&NoRules, &GenerateOptions::default())?;
//! println!("{}", serde_json::to_string_pretty(&doc)?);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: type shapes, descriptors, output documents, errors
//! - [`analyzer`]: tree-sitter parsing of Rust source
//! - [`store`]: declaration/comment store, doc link rendering
//! - [`docgen`]: walker, correlator, merge and post-processing
//! - [`config`]: layered configuration

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod docgen;
pub mod store;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, OutputFormat};

// Error Types
pub use types::error::{ErrorKind, PackageError, Result, ShapeDocError};

// Shapes and Documents
pub use types::{
    Example, Member, ObjectDoc, Primitive, PropertyNode, Reflect, ShapeKind, TypeDescriptor,
    TypeShape,
};

// Store
pub use store::{DeclarationStore, StoreLoader, find_project_root, find_project_root_from};

// =============================================================================
// Generation Re-exports
// =============================================================================

pub use docgen::{
    ExclusionList, GenerateOptions, Generator, JsonPlanFile, NoRules, PropertyTransform,
    RuleFact, RulePlan, RulePlanner, SourceShapes, StaticPlan,
};
