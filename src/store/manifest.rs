//! Cargo manifest reading.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::{Result, ShapeDocError};

#[derive(Debug, Deserialize)]
struct RawManifest {
    package: Option<RawPackage>,
    lib: Option<RawTarget>,
    #[serde(default)]
    dependencies: BTreeMap<String, RawDependency>,
}

/// `name = "1"` or `name = { ... }`; only the table form can carry a path
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDependency {
    Detailed { path: Option<String> },
    Version(#[allow(dead_code)] String),
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    name: Option<String>,
    path: Option<String>,
}

/// A crate found in the project tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrateManifest {
    /// Identifier used in paths (`my-crate` becomes `my_crate`)
    pub name: String,
    pub manifest_path: PathBuf,
    /// Library root, else binary root; `None` for crates with neither
    pub entry: Option<PathBuf>,
    /// Directories of `path = ...` entries under `[dependencies]`
    pub path_dependencies: Vec<PathBuf>,
}

impl CrateManifest {
    /// Read a manifest; `Ok(None)` for manifests without a `[package]`
    pub fn read(manifest_path: &Path) -> Result<Option<Self>> {
        let content = std::fs::read_to_string(manifest_path)
            .map_err(|e| ShapeDocError::store_load(manifest_path, e))?;
        let raw: RawManifest = toml::from_str(&content)
            .map_err(|e| ShapeDocError::store_load(manifest_path, format!("invalid manifest: {}", e)))?;

        let Some(package) = raw.package else {
            return Ok(None);
        };

        let dir = manifest_path.parent().unwrap_or(Path::new("."));
        let lib_name = raw.lib.as_ref().and_then(|l| l.name.clone());
        let lib_path = raw.lib.as_ref().and_then(|l| l.path.clone());

        let entry = lib_path
            .map(|p| dir.join(p))
            .into_iter()
            .chain([dir.join("src/lib.rs"), dir.join("src/main.rs")])
            .find(|p| p.is_file());

        let path_dependencies = raw
            .dependencies
            .into_values()
            .filter_map(|dep| match dep {
                RawDependency::Detailed { path: Some(path) } => Some(dir.join(path)),
                _ => None,
            })
            .collect();

        Ok(Some(Self {
            name: lib_name.unwrap_or(package.name).replace('-', "_"),
            manifest_path: manifest_path.to_path_buf(),
            entry,
            path_dependencies,
        }))
    }
}
