use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::constants::source::{DEFAULT_EXCLUDES, DEFAULT_MARKER};
use crate::types::Result;

/// Finds crate manifests under a project root.
///
/// The walk honors `.gitignore` files and skips paths matching any
/// configured glob.
pub struct ManifestScanner {
    root: PathBuf,
    manifest_name: String,
    exclude: Vec<glob::Pattern>,
}

impl ManifestScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            manifest_name: DEFAULT_MARKER.to_string(),
            exclude: compile_patterns(DEFAULT_EXCLUDES.iter().copied()),
        }
    }

    pub fn with_exclude(mut self, patterns: &[String]) -> Self {
        self.exclude = compile_patterns(
            DEFAULT_EXCLUDES
                .iter()
                .copied()
                .chain(patterns.iter().map(String::as_str)),
        );
        self
    }

    /// Whether a path falls under one of the exclusion globs
    pub fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative.to_string_lossy();
        self.exclude.iter().any(|p| p.matches(&path_str))
    }

    /// Manifest paths, sorted so crate discovery is deterministic
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false) // Security: prevent symlink traversal attacks
            .build();

        let mut manifests = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                crate::types::ShapeDocError::store_load(&self.root, format!("walk failed: {}", e))
            })?;
            let path = entry.path();

            let file_name = path.file_name().and_then(|n| n.to_str());
            if !path.is_file() || file_name != Some(self.manifest_name.as_str()) {
                continue;
            }
            if self.is_excluded(path) {
                tracing::debug!("Skipping excluded manifest {}", path.display());
                continue;
            }
            manifests.push(path.to_path_buf());
        }

        manifests.sort();
        Ok(manifests)
    }
}

fn compile_patterns<'a>(patterns: impl Iterator<Item = &'a str>) -> Vec<glob::Pattern> {
    patterns
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!("Ignoring invalid exclude pattern '{}': {}", p, e);
                None
            }
        })
        .collect()
}
