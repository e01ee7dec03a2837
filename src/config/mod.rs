//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/shapedoc/config.toml)
//! 3. Project config (.shapedoc/config.toml)
//! 4. Explicit config file (`--config`)
//! 5. Environment variables (SHAPEDOC_*)
//! 6. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
