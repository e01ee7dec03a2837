//! Declaration Index
//!
//! Read-only symbol table over every loaded module, keyed by module path.
//! Lookup and intra-doc path resolution live here; comment rendering is in
//! [`super::render`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::constants::render::DEFAULT_DOC_LINK_BASE_URL;
use crate::types::{DeclKind, Declaration, Result, ShapeDocError, qualified_name};

/// Import hops followed while resolving one path
const MAX_RESOLVE_DEPTH: usize = 8;

// =============================================================================
// Modules
// =============================================================================

/// One module of a loaded crate
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    /// Module path, starting with the crate name
    pub namespace: String,
    pub file: PathBuf,
    /// `use` bindings: local alias to path as written
    pub imports: BTreeMap<String, String>,
    /// Names of direct child modules
    pub children: BTreeSet<String>,
    /// Part of a dependency crate rather than the project itself
    pub dependency: bool,
    declarations: Vec<Declaration>,
    by_name: HashMap<String, usize>,
}

impl ModuleInfo {
    pub fn new(namespace: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            namespace: namespace.into(),
            file: file.into(),
            imports: BTreeMap::new(),
            children: BTreeSet::new(),
            dependency: false,
            declarations: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Add a declaration. Types win over values sharing their name.
    pub fn insert(&mut self, declaration: Declaration) {
        let index = self.declarations.len();
        let replace = match self.by_name.get(&declaration.name) {
            Some(&existing) => {
                !self.declarations[existing].kind.is_type() && declaration.kind.is_type()
            }
            None => true,
        };
        if replace {
            self.by_name.insert(declaration.name.clone(), index);
        }
        self.declarations.push(declaration);
    }

    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.by_name.get(name).map(|&i| &self.declarations[i])
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn crate_name(&self) -> &str {
        crate_root(&self.namespace)
    }
}

fn crate_root(namespace: &str) -> &str {
    namespace.split("::").next().unwrap_or(namespace)
}

// =============================================================================
// Handles and Link Targets
// =============================================================================

/// A declaration together with the module that owns it
#[derive(Debug, Clone, Copy)]
pub struct DeclarationHandle<'a> {
    pub declaration: &'a Declaration,
    pub module: &'a ModuleInfo,
}

impl DeclarationHandle<'_> {
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.module.namespace, &self.declaration.name)
    }
}

/// What an intra-doc link path points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Module {
        namespace: String,
    },
    Item {
        namespace: String,
        name: String,
        kind: DeclKind,
        /// Field or variant of the item
        member: Option<(String, String)>,
    },
}

// =============================================================================
// Store
// =============================================================================

/// Parsed declarations and doc comments of a project's crates.
///
/// Built once by [`super::StoreLoader`] and read-only afterwards; separate
/// stores for different roots can coexist.
#[derive(Debug, Clone)]
pub struct DeclarationStore {
    root: PathBuf,
    modules: BTreeMap<String, ModuleInfo>,
    crates: BTreeSet<String>,
    doc_link_base_url: String,
}

impl DeclarationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            modules: BTreeMap::new(),
            crates: BTreeSet::new(),
            doc_link_base_url: DEFAULT_DOC_LINK_BASE_URL.to_string(),
        }
    }

    pub fn with_doc_link_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.doc_link_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn add_module(&mut self, module: ModuleInfo) {
        self.crates.insert(module.crate_name().to_string());
        self.modules.insert(module.namespace.clone(), module);
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn doc_link_base_url(&self) -> &str {
        &self.doc_link_base_url
    }

    pub fn module(&self, namespace: &str) -> Option<&ModuleInfo> {
        self.modules.get(namespace)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.modules.values()
    }

    pub fn crates(&self) -> impl Iterator<Item = &str> {
        self.crates.iter().map(String::as_str)
    }

    pub fn declaration_count(&self) -> usize {
        self.modules.values().map(|m| m.declarations.len()).sum()
    }

    /// Find a declaration by module path and name
    pub fn lookup(&self, namespace: &str, name: &str) -> Result<DeclarationHandle<'_>> {
        let not_found = |package_loaded| ShapeDocError::DeclarationNotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
            package_loaded,
        };

        let module = self.modules.get(namespace).ok_or_else(|| not_found(false))?;
        let declaration = module.declaration(name).ok_or_else(|| not_found(true))?;
        Ok(DeclarationHandle {
            declaration,
            module,
        })
    }

    /// Find a declaration by its qualified key (`school::models.Teacher`)
    pub fn lookup_qualified(&self, key: &str) -> Result<DeclarationHandle<'_>> {
        match key.rsplit_once('.') {
            Some((namespace, name)) => self.lookup(namespace, name),
            None => self.lookup("", key),
        }
    }

    // -------------------------------------------------------------------------
    // Path Resolution
    // -------------------------------------------------------------------------

    /// Resolve a Rust path as written inside module `scope`.
    ///
    /// Handles `crate`/`self`/`super`, items and child modules in scope,
    /// `use` aliases, crate names and, as a last resort, any loaded module
    /// whose last segment matches the first path segment.
    pub fn resolve_path(&self, scope: &str, path: &str) -> Option<LinkTarget> {
        let path = path.trim().trim_start_matches("::");
        let segments: Vec<&str> = path.split("::").map(str::trim).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        self.resolve_segments(scope, &segments, 0)
    }

    fn resolve_segments(&self, scope: &str, segments: &[&str], depth: usize) -> Option<LinkTarget> {
        if depth > MAX_RESOLVE_DEPTH {
            return None;
        }
        let (first, rest) = segments.split_first()?;

        match *first {
            "crate" => return self.descend(crate_root(scope), rest),
            "self" => return self.descend(scope, rest),
            "super" => {
                let mut namespace = scope.rsplit_once("::")?.0;
                let mut rest = rest;
                while let Some((&"super", tail)) = rest.split_first() {
                    namespace = namespace.rsplit_once("::")?.0;
                    rest = tail;
                }
                return self.descend(namespace, rest);
            }
            _ => {}
        }

        if let Some(target) = self.descend(scope, segments) {
            return Some(target);
        }

        if let Some(import) = self.modules.get(scope).and_then(|m| m.imports.get(*first)) {
            let mut expanded: Vec<&str> = import.split("::").collect();
            expanded.extend_from_slice(rest);
            if let Some(target) = self.resolve_segments(scope, &expanded, depth + 1) {
                return Some(target);
            }
        }

        if self.crates.contains(*first)
            && let Some(target) = self.descend(first, rest)
        {
            return Some(target);
        }

        let suffix = format!("::{}", first);
        self.modules
            .keys()
            .filter(|ns| ns.ends_with(&suffix))
            .find_map(|ns| self.descend(ns, rest))
    }

    /// Walk child modules from `namespace`, ending at a module, an item
    /// or an item member
    fn descend(&self, namespace: &str, segments: &[&str]) -> Option<LinkTarget> {
        let mut module = self.modules.get(namespace)?;

        for (i, segment) in segments.iter().enumerate() {
            if let Some(declaration) = module.declaration(segment) {
                let member = match &segments[i + 1..] {
                    [] => None,
                    [member] if declaration.has_member(member) => Some((
                        member.to_string(),
                        declaration.member_anchor(member),
                    )),
                    _ => return None,
                };
                return Some(LinkTarget::Item {
                    namespace: module.namespace.clone(),
                    name: declaration.name.clone(),
                    kind: declaration.kind,
                    member,
                });
            }
            if !module.children.contains(*segment) {
                return None;
            }
            module = self
                .modules
                .get(&format!("{}::{}", module.namespace, segment))?;
        }

        Some(LinkTarget::Module {
            namespace: module.namespace.clone(),
        })
    }
}
