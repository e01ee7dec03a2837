//! Dependency crate discovery.
//!
//! Registry dependencies are pinned by the project's `Cargo.lock` and read
//! from the sources Cargo unpacks under `$CARGO_HOME/registry/src`. Path
//! dependencies are taken from the crate manifests themselves.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Result, ShapeDocError};

const LOCKFILE: &str = "Cargo.lock";

#[derive(Debug, Deserialize)]
struct Lockfile {
    #[serde(default)]
    package: Vec<LockedPackage>,
}

/// One `[[package]]` entry of a lockfile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    /// `registry+...`, `sparse+...` or `git+...`; absent for local crates
    pub source: Option<String>,
}

impl LockedPackage {
    pub fn is_registry(&self) -> bool {
        self.source
            .as_deref()
            .is_some_and(|s| s.starts_with("registry+") || s.starts_with("sparse+"))
    }
}

/// Packages pinned by `root/Cargo.lock`; empty when there is no lockfile
pub fn read_lockfile(root: &Path) -> Result<Vec<LockedPackage>> {
    let path = root.join(LOCKFILE);
    if !path.is_file() {
        tracing::debug!("No {} under {}", LOCKFILE, root.display());
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path).map_err(|e| ShapeDocError::store_load(&path, e))?;
    let lockfile: Lockfile = toml::from_str(&content)
        .map_err(|e| ShapeDocError::store_load(&path, format!("invalid lockfile: {}", e)))?;
    Ok(lockfile.package)
}

/// `$CARGO_HOME`, else `~/.cargo`
pub fn default_cargo_home() -> Option<PathBuf> {
    std::env::var_os("CARGO_HOME")
        .map(PathBuf::from)
        .or_else(|| directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".cargo")))
}

/// Unpacked registry sources under a Cargo home
pub struct RegistrySources {
    registries: Vec<PathBuf>,
}

impl RegistrySources {
    pub fn new(cargo_home: &Path) -> Self {
        let src = cargo_home.join("registry").join("src");
        let mut registries: Vec<PathBuf> = fs::read_dir(&src)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|path| path.is_dir())
                    .collect()
            })
            .unwrap_or_default();
        registries.sort();
        Self { registries }
    }

    /// Manifest of an unpacked package, from the first registry holding it
    pub fn manifest(&self, package: &LockedPackage) -> Option<PathBuf> {
        let dir_name = format!("{}-{}", package.name, package.version);
        self.registries
            .iter()
            .map(|registry| registry.join(&dir_name).join("Cargo.toml"))
            .find(|path| path.is_file())
    }

    /// Manifests of every registry package in `packages` that has been
    /// unpacked. Git and local packages are skipped.
    pub fn manifests(&self, packages: &[LockedPackage]) -> Vec<PathBuf> {
        let mut manifests = Vec::new();
        for package in packages {
            if !package.is_registry() {
                if let Some(source) = &package.source {
                    tracing::debug!(
                        "Skipping {} {} from {}",
                        package.name,
                        package.version,
                        source
                    );
                }
                continue;
            }
            match self.manifest(package) {
                Some(path) => manifests.push(path),
                None => tracing::warn!(
                    "Sources of {} {} are not unpacked; run `cargo fetch` to index them",
                    package.name,
                    package.version
                ),
            }
        }
        manifests
    }
}
