//! Declaration/Comment Store
//!
//! Parsed declarations and doc comments of every crate under a project
//! root, indexed by module path.
//!
//! ```rust,ignore
//! let root = find_project_root("Cargo.toml")?;
//! let store = StoreLoader::new(&root).load()?;
//! let teacher = store.lookup("school::models", "Teacher")?;
//! let doc = store.render_comment(&teacher.module.namespace, &teacher.declaration.documentation());
//! ```

pub mod dependencies;
pub mod index;
pub mod loader;
pub mod manifest;
pub mod render;
pub mod root;

pub use dependencies::{LockedPackage, RegistrySources};
pub use index::{DeclarationHandle, DeclarationStore, LinkTarget, ModuleInfo};
pub use loader::StoreLoader;
pub use manifest::CrateManifest;
pub use root::{find_project_root, find_project_root_from};
