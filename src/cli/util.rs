//! CLI Common Utilities
//!
//! Shared project resolution and store loading for CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::{Config, ConfigLoader};
use crate::store::{DeclarationStore, StoreLoader, find_project_root_from};
use crate::types::Result;

/// Command execution context
///
/// Configuration resolved for the project root the command operates on.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Project root directory
    pub project_root: PathBuf,
}

impl CommandContext {
    /// Resolve the project root and load its configuration.
    ///
    /// Root precedence: `--root`, `source.root` from configuration, then
    /// the nearest ancestor of the working directory holding the marker.
    pub fn load(config_file: Option<&Path>, root: Option<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let initial = ConfigLoader::load_from(&cwd, config_file)?;

        let project_root = match root.or_else(|| initial.source.root.clone()) {
            Some(root) => root,
            None => find_project_root_from(&cwd, &initial.source.marker)?,
        };
        debug!("Project root: {}", project_root.display());

        let config = if project_root == cwd {
            initial
        } else {
            ConfigLoader::load_from(&project_root, config_file)?
        };

        Ok(Self {
            config,
            project_root,
        })
    }

    /// Parse every crate under the project root
    pub fn load_store(&self) -> Result<Arc<DeclarationStore>> {
        let store = StoreLoader::from_config(&self.project_root, &self.config).load()?;
        debug!(
            "Loaded {} declarations from {}",
            store.declaration_count(),
            self.project_root.display()
        );
        Ok(Arc::new(store))
    }
}
