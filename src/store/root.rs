//! Project root discovery.

use std::path::{Path, PathBuf};

use crate::types::{Result, ShapeDocError};

/// Find the project root above the current working directory
pub fn find_project_root(marker: &str) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    find_project_root_from(&cwd, marker)
}

/// Walk `start` and its ancestors for the first directory containing
/// `marker` as a regular file.
pub fn find_project_root_from(start: &Path, marker: &str) -> Result<PathBuf> {
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir()?.join(start)
    };

    for dir in start.ancestors() {
        let candidate = dir.join(marker);
        match std::fs::metadata(&candidate) {
            Ok(meta) if !meta.is_dir() => {
                tracing::debug!("Project root found at {}", dir.display());
                return Ok(dir.to_path_buf());
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ShapeDocError::store_load(
                    &candidate,
                    format!("failed to stat: {}", e),
                ));
            }
        }
    }

    Err(ShapeDocError::RootNotFound {
        start,
        marker: marker.to_string(),
    })
}
