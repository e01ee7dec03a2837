//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/shapedoc/) and project (.shapedoc/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::render::DEFAULT_DOC_LINK_BASE_URL;
use crate::constants::source::{DEFAULT_MARKER, DEFAULT_MAX_FILE_SIZE};
use crate::types::{ROOT_PATH, Result, ShapeDocError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Source tree loading
    pub source: SourceConfig,

    /// Doc comment rendering
    pub render: RenderConfig,

    /// Generated document settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            source: SourceConfig::default(),
            render: RenderConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    /// Returns `ShapeDocError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.source.marker.trim().is_empty() {
            return Err(ShapeDocError::Config(
                "source.marker must not be empty".to_string(),
            ));
        }

        if self.source.max_file_size == 0 {
            return Err(ShapeDocError::Config(
                "source.max_file_size must be greater than 0".to_string(),
            ));
        }

        let base = url::Url::parse(&self.render.doc_link_base_url).map_err(|e| {
            ShapeDocError::Config(format!(
                "render.doc_link_base_url is not a valid URL ({}): {}",
                self.render.doc_link_base_url, e
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ShapeDocError::Config(format!(
                "render.doc_link_base_url must use http or https, got {}",
                base.scheme()
            )));
        }

        if let Some(path) = self
            .output
            .excluded_paths
            .iter()
            .find(|p| !p.starts_with(ROOT_PATH))
        {
            return Err(ShapeDocError::Config(format!(
                "output.excluded_paths entries must start with '{}', got '{}'",
                ROOT_PATH, path
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Source Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Project root; discovered from the marker when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// File marking the project root
    pub marker: String,

    /// Glob patterns (relative to the root) excluded from crate discovery
    pub exclude: Vec<String>,

    /// Source files larger than this are skipped (bytes)
    pub max_file_size: u64,

    /// Also index path dependencies and the registry crates pinned in
    /// `Cargo.lock`
    pub dependencies: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: None,
            marker: DEFAULT_MARKER.to_string(),
            exclude: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            dependencies: true,
        }
    }
}

// =============================================================================
// Render Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Host serving rustdoc pages for resolved doc links
    pub doc_link_base_url: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            doc_link_base_url: DEFAULT_DOC_LINK_BASE_URL.to_string(),
        }
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Property paths dropped from every generated document
    pub excluded_paths: Vec<String>,

    pub format: OutputFormat,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            excluded_paths: Vec::new(),
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Unknown output format: {}. Valid values: json, yaml",
                s
            )),
        }
    }
}
