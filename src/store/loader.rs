//! Store construction from a project tree.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::dependencies::{RegistrySources, default_cargo_home, read_lockfile};
use super::index::{DeclarationStore, ModuleInfo};
use super::manifest::CrateManifest;
use crate::analyzer::parser::{ChildModule, ModuleSource, Parser, RustParser};
use crate::analyzer::scanner::ManifestScanner;
use crate::config::Config;
use crate::constants::render::DEFAULT_DOC_LINK_BASE_URL;
use crate::constants::source::DEFAULT_MAX_FILE_SIZE;
use crate::types::{PackageError, Result, ShapeDocError};

/// Builds a [`DeclarationStore`] for every crate under a root directory,
/// plus the crates they depend on.
///
/// Path dependencies are followed transitively. Registry dependencies are
/// the packages pinned in the root's `Cargo.lock` whose sources Cargo has
/// unpacked. Syntax errors and `mod` items without a backing file are
/// collected over every loaded crate and reported together as
/// [`ShapeDocError::PackageErrors`].
pub struct StoreLoader {
    root: PathBuf,
    exclude: Vec<String>,
    max_file_size: u64,
    doc_link_base_url: String,
    dependencies: bool,
    cargo_home: Option<PathBuf>,
}

impl StoreLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            doc_link_base_url: DEFAULT_DOC_LINK_BASE_URL.to_string(),
            dependencies: true,
            cargo_home: None,
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self::new(root)
            .with_exclude(config.source.exclude.clone())
            .with_max_file_size(config.source.max_file_size)
            .with_doc_link_base_url(config.render.doc_link_base_url.clone())
            .with_dependencies(config.source.dependencies)
    }

    /// Index dependency crates as well (default on)
    pub fn with_dependencies(mut self, enabled: bool) -> Self {
        self.dependencies = enabled;
        self
    }

    /// Cargo home holding unpacked registry sources; defaults to
    /// `$CARGO_HOME` or `~/.cargo`
    pub fn with_cargo_home(mut self, cargo_home: impl Into<PathBuf>) -> Self {
        self.cargo_home = Some(cargo_home.into());
        self
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn with_doc_link_base_url(mut self, url: impl Into<String>) -> Self {
        self.doc_link_base_url = url.into();
        self
    }

    pub fn load(&self) -> Result<DeclarationStore> {
        if !self.root.is_dir() {
            return Err(ShapeDocError::store_load(&self.root, "not a directory"));
        }

        let parser = RustParser::new()?;
        let manifests = ManifestScanner::new(&self.root)
            .with_exclude(&self.exclude)
            .scan()?;

        let mut session = LoadSession {
            parser: &parser,
            store: DeclarationStore::new(&self.root)
                .with_doc_link_base_url(self.doc_link_base_url.clone()),
            errors: Vec::new(),
            visited: HashSet::new(),
            max_file_size: self.max_file_size,
            dependency: false,
        };

        let mut path_dependencies = Vec::new();
        for manifest_path in manifests {
            let Some(manifest) = CrateManifest::read(&manifest_path)? else {
                continue;
            };
            path_dependencies.extend(manifest.path_dependencies.iter().cloned());
            session.load_crate(&manifest)?;
        }

        if self.dependencies {
            session.dependency = true;
            self.load_path_dependencies(&mut session, path_dependencies)?;
            self.load_registry_dependencies(&mut session)?;
        }

        if !session.errors.is_empty() {
            return Err(ShapeDocError::PackageErrors {
                errors: session.errors,
            });
        }

        let store = session.store;
        tracing::info!(
            "Loaded {} crate(s), {} module(s), {} declaration(s) from {}",
            store.crates().count(),
            store.modules().count(),
            store.declaration_count(),
            self.root.display()
        );
        Ok(store)
    }

    /// Path dependencies outside the root, following their own path
    /// dependencies in turn
    fn load_path_dependencies(
        &self,
        session: &mut LoadSession<'_>,
        mut pending: Vec<PathBuf>,
    ) -> Result<()> {
        let mut seen = HashSet::new();
        while let Some(dir) = pending.pop() {
            let manifest_path = dir.join("Cargo.toml");
            if !manifest_path.is_file() {
                tracing::warn!("Path dependency {} has no Cargo.toml", dir.display());
                continue;
            }
            let key = fs::canonicalize(&manifest_path)
                .map_err(|e| ShapeDocError::store_load(&manifest_path, e))?;
            if !seen.insert(key) {
                continue;
            }
            let Some(manifest) = CrateManifest::read(&manifest_path)? else {
                continue;
            };
            pending.extend(manifest.path_dependencies.iter().cloned());
            session.load_crate(&manifest)?;
        }
        Ok(())
    }

    fn load_registry_dependencies(&self, session: &mut LoadSession<'_>) -> Result<()> {
        let packages = read_lockfile(&self.root)?;
        if packages.is_empty() {
            return Ok(());
        }
        let Some(cargo_home) = self.cargo_home.clone().or_else(default_cargo_home) else {
            tracing::warn!("Cargo home not found; registry dependencies are not indexed");
            return Ok(());
        };

        for manifest_path in RegistrySources::new(&cargo_home).manifests(&packages) {
            if let Some(manifest) = CrateManifest::read(&manifest_path)? {
                session.load_crate(&manifest)?;
            }
        }
        Ok(())
    }
}

struct LoadSession<'p> {
    parser: &'p RustParser,
    store: DeclarationStore,
    errors: Vec<PackageError>,
    visited: HashSet<PathBuf>,
    max_file_size: u64,
    /// Modules registered from now on belong to dependency crates
    dependency: bool,
}

impl LoadSession<'_> {
    /// Load a crate from its root file unless a crate of that name is
    /// already loaded. The first crate loaded under a name wins.
    fn load_crate(&mut self, manifest: &CrateManifest) -> Result<()> {
        let Some(entry) = manifest.entry.as_deref() else {
            tracing::debug!("Crate {} has no library or binary root", manifest.name);
            return Ok(());
        };
        if self.store.module(&manifest.name).is_some() {
            if self.dependency {
                tracing::debug!(
                    "Crate name {} already loaded; skipping {}",
                    manifest.name,
                    manifest.manifest_path.display()
                );
            } else {
                tracing::warn!(
                    "Crate name {} already loaded; skipping {}",
                    manifest.name,
                    manifest.manifest_path.display()
                );
            }
            return Ok(());
        }
        self.load_file(&manifest.name, entry, true)
    }

    /// Parse and register one module file. `owns_dir` is true for crate
    /// roots, `mod.rs` and `#[path]` files, whose children live next to them.
    fn load_file(&mut self, namespace: &str, file: &Path, owns_dir: bool) -> Result<()> {
        let canonical = fs::canonicalize(file).map_err(|e| ShapeDocError::store_load(file, e))?;
        if !self.visited.insert(canonical) {
            self.errors.push(PackageError {
                package: namespace.to_string(),
                file: file.to_path_buf(),
                line: None,
                message: "module file is already loaded as another module".to_string(),
            });
            return Ok(());
        }

        let size = fs::metadata(file)
            .map_err(|e| ShapeDocError::store_load(file, e))?
            .len();
        if size > self.max_file_size {
            tracing::warn!(
                "Skipping {} ({} bytes exceeds limit of {})",
                file.display(),
                size,
                self.max_file_size
            );
            return Ok(());
        }

        let content = fs::read_to_string(file).map_err(|e| ShapeDocError::store_load(file, e))?;
        let result = self.parser.parse(&file.to_string_lossy(), &content)?;
        tracing::debug!(
            "Parsed {} as {} ({} declarations)",
            file.display(),
            namespace,
            result.module.declarations.len()
        );

        for error in result.syntax_errors {
            self.errors.push(PackageError {
                package: namespace.to_string(),
                file: file.to_path_buf(),
                line: Some(error.line),
                message: format!("syntax error: {}", error.message),
            });
        }

        let parent = file.parent().unwrap_or(Path::new("."));
        let child_dir = if owns_dir {
            parent.to_path_buf()
        } else {
            let stem = file.file_stem().unwrap_or_default();
            parent.join(stem)
        };

        self.register(namespace, file, parent, &child_dir, result.module)
    }

    /// Add a module body to the store and follow its child modules.
    /// `path_base` anchors `#[path]` attributes.
    fn register(
        &mut self,
        namespace: &str,
        file: &Path,
        path_base: &Path,
        child_dir: &Path,
        source: ModuleSource,
    ) -> Result<()> {
        let mut info = ModuleInfo::new(namespace, file);
        info.dependency = self.dependency;
        info.imports = source.imports.into_iter().collect();
        info.children = source
            .children
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        for declaration in source.declarations {
            info.insert(declaration);
        }
        self.store.add_module(info);

        for child in source.children {
            let child_ns = format!("{}::{}", namespace, child.name());
            match child {
                ChildModule::Inline { name, body } => {
                    let dir = child_dir.join(&name);
                    self.register(&child_ns, file, &dir, &dir, body)?;
                }
                ChildModule::External {
                    name,
                    path_attr,
                    line,
                } => {
                    let candidates = match path_attr {
                        Some(path) => vec![(path_base.join(path), true)],
                        None => vec![
                            (child_dir.join(format!("{}.rs", name)), false),
                            (child_dir.join(&name).join("mod.rs"), true),
                        ],
                    };
                    match candidates.into_iter().find(|(path, _)| path.is_file()) {
                        Some((path, owns_dir)) => self.load_file(&child_ns, &path, owns_dir)?,
                        None => self.errors.push(PackageError {
                            package: namespace.to_string(),
                            file: file.to_path_buf(),
                            line: Some(line),
                            message: format!("file not found for module `{}`", name),
                        }),
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[test]
    fn test_loads_nested_modules() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "Cargo.toml", "[package]\nname = \"school\"\n");
        write(root, "src/lib.rs", "pub mod models;\nmod inline { pub struct Hidden; }\n");
        write(root, "src/models.rs", "pub mod moremodels;\n/// A teacher.\npub struct Teacher;\n");
        write(root, "src/models/moremodels/mod.rs", "pub struct University;\n");

        let store = StoreLoader::new(root).load().unwrap();
        assert!(store.lookup("school::models", "Teacher").is_ok());
        assert!(store.lookup("school::models::moremodels", "University").is_ok());
        assert!(store.lookup("school::inline", "Hidden").is_ok());
        assert_eq!(store.crates().collect::<Vec<_>>(), vec!["school"]);
    }

    #[test]
    fn test_path_attribute() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "Cargo.toml", "[package]\nname = \"paths\"\n");
        write(root, "src/lib.rs", "#[path = \"impls/unix.rs\"]\npub mod sys;\n");
        write(root, "src/impls/unix.rs", "pub struct Handle;\n");

        let store = StoreLoader::new(root).load().unwrap();
        assert!(store.lookup("paths::sys", "Handle").is_ok());
    }

    #[test]
    fn test_package_errors_are_aggregated() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "Cargo.toml", "[package]\nname = \"broken\"\n");
        write(root, "src/lib.rs", "mod missing;\nmod bad;\n");
        write(root, "src/bad.rs", "pub struct Bad {\n    a: ,\n}\n");

        let err = StoreLoader::new(root).load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PackageErrors);
        let ShapeDocError::PackageErrors { errors } = &err else {
            panic!("expected package errors");
        };
        assert!(errors.iter().any(|e| e.package == "broken" && e.line == Some(1)));
        assert!(errors.iter().any(|e| e.package == "broken::bad"));
        assert!(err.to_string().contains("file not found for module `missing`"));
    }

    #[test]
    fn test_missing_root_is_load_failure() {
        let temp = TempDir::new().unwrap();
        let err = StoreLoader::new(temp.path().join("nope")).load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreLoadFailure);
    }

    const LOCK: &str = "version = 4\n\n\
        [[package]]\nname = \"school\"\nversion = \"0.1.0\"\n\n\
        [[package]]\nname = \"url\"\nversion = \"2.5.4\"\n\
        source = \"registry+https://github.com/rust-lang/crates.io-index\"\n";

    fn registry_project() -> (TempDir, TempDir) {
        let project = TempDir::new().unwrap();
        let root = project.path();
        write(root, "Cargo.toml", "[package]\nname = \"school\"\n");
        write(root, "Cargo.lock", LOCK);
        write(root, "src/lib.rs", "pub struct Stamped { pub at: url::Url }\n");

        let home = TempDir::new().unwrap();
        let url = home.path().join("registry/src/index.crates.io-1949cf8c6b5b557f/url-2.5.4");
        write(&url, "Cargo.toml", "[package]\nname = \"url\"\nversion = \"2.5.4\"\n");
        write(&url, "src/lib.rs", "mod parser;\n/// A parsed URL record.\npub struct Url {\n    serialization: String,\n}\n");
        write(&url, "src/parser.rs", "pub enum ParseError { EmptyHost }\n");
        (project, home)
    }

    #[test]
    fn test_registry_dependencies_are_indexed() {
        let (project, home) = registry_project();
        let store = StoreLoader::new(project.path())
            .with_cargo_home(home.path())
            .load()
            .unwrap();

        let url = store.lookup("url", "Url").unwrap();
        assert_eq!(url.declaration.doc, "A parsed URL record.");
        assert!(url.module.dependency);
        assert!(store.lookup("url::parser", "ParseError").is_ok());
        assert!(!store.module("school").unwrap().dependency);
    }

    #[test]
    fn test_dependencies_can_be_disabled() {
        let (project, home) = registry_project();
        let store = StoreLoader::new(project.path())
            .with_cargo_home(home.path())
            .with_dependencies(false)
            .load()
            .unwrap();
        assert_eq!(store.crates().collect::<Vec<_>>(), vec!["school"]);
    }

    #[test]
    fn test_transitive_path_dependencies() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        write(base, "app/Cargo.toml", "[package]\nname = \"app\"\n\n[dependencies]\ncampus = { path = \"../campus\" }\n");
        write(base, "app/src/lib.rs", "pub struct App;\n");
        write(base, "campus/Cargo.toml", "[package]\nname = \"campus\"\n\n[dependencies]\nrooms = { path = \"../rooms\" }\n");
        write(base, "campus/src/lib.rs", "pub struct Building;\n");
        write(base, "rooms/Cargo.toml", "[package]\nname = \"rooms\"\n\n[dependencies]\ncampus = { path = \"../campus\" }\n");
        write(base, "rooms/src/lib.rs", "pub struct Room;\n");

        let store = StoreLoader::new(base.join("app")).load().unwrap();
        assert_eq!(store.crates().collect::<Vec<_>>(), vec!["app", "campus", "rooms"]);
        assert!(store.lookup("rooms", "Room").unwrap().module.dependency);
    }

    #[test]
    fn test_dependency_errors_are_aggregated() {
        let (project, home) = registry_project();
        let url = home.path().join("registry/src/index.crates.io-1949cf8c6b5b557f/url-2.5.4");
        write(&url, "src/lib.rs", "mod host;\npub struct Url;\n");

        let err = StoreLoader::new(project.path())
            .with_cargo_home(home.path())
            .load()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PackageErrors);
        assert!(err.to_string().contains("file not found for module `host`"));
    }
}
