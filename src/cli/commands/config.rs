//! Config Command
//!
//! Manage shapedoc configuration.
//!
//! Usage:
//!   shapedoc config show [-g] [-f json]
//!   shapedoc config path
//!   shapedoc config init [--force]

use std::path::Path;

use crate::cli::ui::output::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show configuration
pub fn show(global: bool, format: &str, explicit: Option<&Path>) -> Result<()> {
    if global {
        match ConfigLoader::global_config_path() {
            Some(path) if path.exists() => {
                println!("# Global Config: {}\n", path.display());
                println!("{}", std::fs::read_to_string(&path)?);
            }
            Some(_) => {
                println!("No global config found.");
            }
            None => println!("Cannot determine global config directory."),
        }
        return Ok(());
    }

    // Merged effective config
    let config = ConfigLoader::load_with(explicit)?;
    println!("{}", ConfigLoader::render_config(&config, format == "json")?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path(&std::env::current_dir()?);
    Ok(())
}

/// Initialize project configuration
pub fn init(force: bool) -> Result<()> {
    let root = std::env::current_dir()?;
    let config_path = ConfigLoader::init_project(&root, force)?;
    Output::new().success("Initialized project configuration");
    println!("  Config: {}", config_path.display());
    Ok(())
}
