//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// Source tree loading constants
pub mod source {
    /// Marker file that bounds the project root
    pub const DEFAULT_MARKER: &str = "Cargo.toml";

    /// Default maximum size of a parsed source file (1MB)
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

    /// Syntax errors reported per file before the rest are dropped
    pub const MAX_SYNTAX_ERRORS_PER_FILE: usize = 10;

    /// Directories never searched for crates
    pub const DEFAULT_EXCLUDES: &[&str] = &["**/target/**", "**/.git/**", "**/node_modules/**"];
}

/// Doc comment rendering constants
pub mod render {
    /// Host serving rustdoc pages for rendered links
    pub const DEFAULT_DOC_LINK_BASE_URL: &str = "https://docs.rs";
}

/// Type expression parsing constants
pub mod shapes {
    /// Nesting depth at which a source type expression is treated as opaque
    pub const MAX_TYPE_DEPTH: usize = 32;
}

/// Configuration file locations
pub mod paths {
    /// Project-level directory holding the config file
    pub const PROJECT_DIR: &str = ".shapedoc";

    pub const CONFIG_FILE: &str = "config.toml";

    /// Prefix of environment overrides (`SHAPEDOC_OUTPUT__FORMAT=yaml`)
    pub const ENV_PREFIX: &str = "SHAPEDOC_";
}
