//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/shapedoc/config.toml)
//! 3. Project config (.shapedoc/config.toml)
//! 4. Explicit `--config` file
//! 5. Environment variables (SHAPEDOC_* prefix, `__` between sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::constants::paths::{CONFIG_FILE, ENV_PREFIX, PROJECT_DIR};
use crate::types::{Result, ShapeDocError};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current directory:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_with(None)
    }

    /// Like [`load`](Self::load), with an explicit file merged over the
    /// global and project files
    pub fn load_with(explicit: Option<&Path>) -> Result<Config> {
        let cwd = std::env::current_dir()?;
        Self::load_from(&cwd, explicit)
    }

    /// Resolve configuration for a project directory
    pub fn load_from(project_root: &Path, explicit: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Merge global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        // Merge project config
        let project_path = Self::project_config_path(project_root);
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ShapeDocError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // Merge environment variables (e.g., SHAPEDOC_OUTPUT__FORMAT -> output.format)
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ShapeDocError::Config(format!("Configuration error: {}", e)))?;

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ShapeDocError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/shapedoc/)
    pub fn global_dir() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.config_dir().join("shapedoc"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Get path to a project's config file
    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_DIR).join(CONFIG_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path(project_root: &Path) {
        println!("Configuration paths:");
        println!();

        // Global config
        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        // Project config
        let project = Self::project_config_path(project_root);
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration
    pub fn render_config(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| ShapeDocError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a default project config; existing files are kept unless `force`
    pub fn init_project(project_root: &Path, force: bool) -> Result<PathBuf> {
        let config_path = Self::project_config_path(project_root);
        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created project config: {}", config_path.display());
        } else {
            info!("Project config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default project config content (TOML)
    fn default_project_config() -> String {
        r#"# shapedoc Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

[source]
marker = "Cargo.toml"
exclude = []
max_file_size = 1048576
dependencies = true

[render]
doc_link_base_url = "https://docs.rs"

[output]
# Property paths removed from every generated document
excluded_paths = []
format = "json"
pretty = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use tempfile::TempDir;

    #[test]
    fn test_init_project_writes_loadable_config() {
        let temp_dir = TempDir::new().unwrap();

        let path = ConfigLoader::init_project(temp_dir.path(), false).unwrap();
        assert_eq!(path, temp_dir.path().join(".shapedoc/config.toml"));

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert!(config.output.pretty);
        assert_eq!(config.source.marker, "Cargo.toml");
    }

    #[test]
    fn test_init_project_keeps_existing_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigLoader::project_config_path(temp_dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "version = \"custom\"\n").unwrap();

        ConfigLoader::init_project(temp_dir.path(), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"custom\"\n");

        ConfigLoader::init_project(temp_dir.path(), true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[output]"));
    }

    #[test]
    fn test_project_and_explicit_files_layer() {
        let temp_dir = TempDir::new().unwrap();
        let project = ConfigLoader::project_config_path(temp_dir.path());
        fs::create_dir_all(project.parent().unwrap()).unwrap();
        fs::write(
            &project,
            "[source]\nmarker = \"Project.toml\"\nexclude = [\"fixtures/**\"]\n",
        )
        .unwrap();

        let explicit = temp_dir.path().join("override.toml");
        fs::write(&explicit, "[source]\nmarker = \"Override.toml\"\n").unwrap();

        let config = ConfigLoader::load_from(temp_dir.path(), None).unwrap();
        assert_eq!(config.source.marker, "Project.toml");

        let config = ConfigLoader::load_from(temp_dir.path(), Some(&explicit)).unwrap();
        assert_eq!(config.source.marker, "Override.toml");
        assert_eq!(config.source.exclude, vec!["fixtures/**".to_string()]);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(ConfigLoader::load_from(temp_dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[output]\nexcluded_paths = [\"secret\"]\n").unwrap();
        assert!(ConfigLoader::load_from_file(&path).is_err());
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: This test runs in isolation
        unsafe {
            std::env::set_var("SHAPEDOC_OUTPUT__FORMAT", "yaml");
        }
        let config = ConfigLoader::load_from(temp_dir.path(), None).unwrap();
        assert_eq!(config.output.format, OutputFormat::Yaml);
        unsafe {
            std::env::remove_var("SHAPEDOC_OUTPUT__FORMAT");
        }
    }

    #[test]
    fn test_render_config() {
        let config = Config::default();
        let toml = ConfigLoader::render_config(&config, false).unwrap();
        assert!(toml.contains("[render]"));
        let json = ConfigLoader::render_config(&config, true).unwrap();
        assert!(json.contains("\"doc_link_base_url\""));
    }
}
