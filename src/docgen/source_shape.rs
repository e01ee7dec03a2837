//! Shapes from Source
//!
//! Builds a [`TypeShape`] for a declaration found in the store, reading
//! field types and serde attributes from the parsed source instead of a
//! [`Reflect`](crate::types::Reflect) impl. Used by the command line,
//! where the documented types are not compiled in.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::analyzer::parser::attributes::split_top_level;
use crate::constants::shapes::MAX_TYPE_DEPTH;
use crate::store::{DeclarationStore, LinkTarget};
use crate::types::{
    DeclBody, DeclKind, Declaration, FieldDecl, Member, Primitive, Result, ShapeDocError,
    ShapeKind, TypeShape,
};

const SEQUENCES: &[&str] = &[
    "Vec",
    "VecDeque",
    "LinkedList",
    "HashSet",
    "BTreeSet",
    "BinaryHeap",
    "IndexSet",
];
const MAPPINGS: &[&str] = &["HashMap", "BTreeMap", "IndexMap"];
const POINTERS: &[&str] = &[
    "Option", "Box", "Arc", "Rc", "Cow", "RefCell", "Cell", "Mutex", "RwLock",
];

/// Type parameter name → shape of the argument it stands for
type Bindings = HashMap<String, TypeShape>;

#[derive(Debug, Clone)]
pub struct SourceShapes {
    store: Arc<DeclarationStore>,
}

impl SourceShapes {
    pub fn new(store: Arc<DeclarationStore>) -> Self {
        Self { store }
    }

    /// Shape of a type named `crate::module::Name`, `crate::module.Name`
    /// or a bare `Name` (first module declaring it)
    pub fn shape_of_path(&self, path: &str) -> Result<TypeShape> {
        let path = path.trim();
        if let Some((namespace, name)) = path.rsplit_once('.') {
            return self.shape_of(namespace, name);
        }
        if let Some((namespace, name)) = path.rsplit_once("::") {
            return self.shape_of(namespace, name);
        }

        let namespace = self
            .store
            .modules()
            .find(|m| m.declaration(path).is_some_and(|d| is_data_type(d.kind)))
            .map(|m| m.namespace.clone())
            .ok_or_else(|| ShapeDocError::DeclarationNotFound {
                namespace: String::new(),
                name: path.to_string(),
                package_loaded: false,
            })?;
        self.shape_of(&namespace, path)
    }

    pub fn shape_of(&self, namespace: &str, name: &str) -> Result<TypeShape> {
        let handle = self.store.lookup(namespace, name)?;
        if !is_data_type(handle.declaration.kind) {
            return Err(ShapeDocError::MalformedDeclaration {
                qualified_name: handle.qualified_name(),
                expected: "data type".to_string(),
                found: handle.declaration.kind.to_string(),
            });
        }
        Ok(declaration_shape(
            &self.store,
            &handle.module.namespace,
            handle.declaration,
            &Bindings::new(),
            0,
        ))
    }
}

fn is_data_type(kind: DeclKind) -> bool {
    kind.is_type() && kind != DeclKind::Trait
}

// =============================================================================
// Declarations
// =============================================================================

/// Shape of a declaration whose type parameters are bound to `bindings`
fn declaration_shape(
    store: &Arc<DeclarationStore>,
    namespace: &str,
    declaration: &Declaration,
    bindings: &Bindings,
    depth: usize,
) -> TypeShape {
    let name = declaration.name.as_str();

    match (&declaration.kind, &declaration.body) {
        (DeclKind::Struct, DeclBody::Named(fields)) => {
            if declaration.serde.transparent
                && let Some(field) = fields.iter().find(|f| !f.serde.skip)
            {
                let inner = resolve_type(store, namespace, &field.ty, bindings, depth + 1);
                return rename_underlying(name, namespace, inner);
            }

            let rename_all = declaration.serde.rename_all.as_deref();
            let bindings = Arc::new(bindings.clone());
            fields
                .iter()
                .fold(TypeShape::structure(name, namespace), |builder, field| {
                    builder.member(field_member(store, namespace, field, rename_all, &bindings))
                })
                .build()
        }
        (DeclKind::Struct, DeclBody::Tuple(fields)) if fields.len() == 1 => {
            let inner = resolve_type(store, namespace, &fields[0].ty, bindings, depth + 1);
            rename_underlying(name, namespace, inner)
        }
        (DeclKind::Struct, DeclBody::Empty) => {
            TypeShape::named(name, namespace, TypeShape::primitive(Primitive::Unit))
        }
        (DeclKind::Enum, DeclBody::Variants(variants)) if variants.iter().all(|v| !v.has_fields) => {
            TypeShape::named(name, namespace, TypeShape::primitive(Primitive::String))
        }
        (DeclKind::TypeAlias, DeclBody::Alias(target)) => {
            let inner = resolve_type(store, namespace, target, bindings, depth + 1);
            rename_underlying(name, namespace, inner)
        }
        _ => TypeShape {
            name: name.to_string(),
            namespace: namespace.to_string(),
            kind: ShapeKind::Opaque,
        },
    }
}

/// Structures keep their own identity behind aliases and newtypes
fn rename_underlying(name: &str, namespace: &str, underlying: TypeShape) -> TypeShape {
    if underlying.deref_pointers().is_structure() {
        underlying
    } else {
        TypeShape::named(name, namespace, underlying)
    }
}

fn field_member(
    store: &Arc<DeclarationStore>,
    namespace: &str,
    field: &FieldDecl,
    rename_all: Option<&str>,
    bindings: &Arc<Bindings>,
) -> Member {
    let store = Arc::clone(store);
    let bindings = Arc::clone(bindings);
    let scope = namespace.to_string();
    let ty = field.ty.clone();
    let member = Member::lazy(field.name.clone(), move || {
        resolve_type(&store, &scope, &ty, &bindings, 0)
    });

    if field.serde.skip {
        return member.skip();
    }

    let base = field.name.trim_start_matches("r#");
    let output = match (&field.serde.rename, rename_all) {
        (Some(rename), _) => rename.clone(),
        (None, Some(rule)) => apply_rename_rule(rule, base),
        (None, None) => base.to_string(),
    };
    let member = if output != field.name {
        member.rename(output)
    } else {
        member
    };

    if field.serde.flatten {
        member.flatten()
    } else {
        member
    }
}

/// serde `rename_all` applied to a snake_case field name
pub fn apply_rename_rule(rule: &str, name: &str) -> String {
    let pascal = || -> String {
        name.split('_')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                let mut chars = segment.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect()
    };

    match rule {
        "lowercase" => name.to_lowercase(),
        "UPPERCASE" => name.to_uppercase(),
        "PascalCase" => pascal(),
        "camelCase" => {
            let pascal = pascal();
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        "snake_case" => name.to_string(),
        "SCREAMING_SNAKE_CASE" => name.to_uppercase(),
        "kebab-case" => name.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => name.to_uppercase().replace('_', "-"),
        other => {
            debug!("Unknown rename rule {}", other);
            name.to_string()
        }
    }
}

// =============================================================================
// Type Expressions
// =============================================================================

/// Shape of a type expression written inside module `scope`
pub fn type_shape(store: &Arc<DeclarationStore>, scope: &str, text: &str, depth: usize) -> TypeShape {
    resolve_type(store, scope, text, &Bindings::new(), depth)
}

/// Like [`type_shape`], with the type parameters in scope bound to shapes.
/// Generic declarations bind their own parameters to the written arguments.
fn resolve_type(
    store: &Arc<DeclarationStore>,
    scope: &str,
    text: &str,
    bindings: &Bindings,
    depth: usize,
) -> TypeShape {
    let text = text.trim();
    if depth > MAX_TYPE_DEPTH {
        warn!("Type {} in {} nests too deeply; treating as opaque", text, scope);
        return TypeShape::opaque(text);
    }
    let next = depth + 1;

    if let Some(rest) = text.strip_prefix('&') {
        let target = strip_reference(rest);
        return TypeShape::pointer(resolve_type(store, scope, target, bindings, next));
    }
    if let Some(rest) = text
        .strip_prefix("*const ")
        .or_else(|| text.strip_prefix("*mut "))
    {
        return TypeShape::pointer(resolve_type(store, scope, rest, bindings, next));
    }

    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        let element = match top_level_position(inner, ';') {
            Some(i) => &inner[..i],
            None => inner,
        };
        return TypeShape::sequence(resolve_type(store, scope, element, bindings, next));
    }

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        if inner.trim().is_empty() {
            return TypeShape::primitive(Primitive::Unit);
        }
        let parts = split_top_level(inner);
        if parts.len() == 1 && !inner.trim_end().ends_with(',') {
            return resolve_type(store, scope, parts[0], bindings, next);
        }
        return TypeShape::opaque(text);
    }

    if text.starts_with("dyn ") || text.starts_with("impl ") || text.starts_with("fn(") {
        return TypeShape::opaque(text);
    }

    let (path, args) = split_generics(text);
    let args: Vec<&str> = args
        .into_iter()
        .map(str::trim)
        .filter(|a| !a.starts_with('\''))
        .collect();
    let last = path.rsplit("::").next().unwrap_or(path);

    if args.is_empty()
        && let Some(bound) = bindings.get(path)
    {
        return bound.clone();
    }

    if SEQUENCES.contains(&last) && !args.is_empty() {
        return TypeShape::sequence(resolve_type(store, scope, args[0], bindings, next));
    }
    if MAPPINGS.contains(&last) && args.len() >= 2 {
        return TypeShape::mapping(
            resolve_type(store, scope, args[0], bindings, next),
            resolve_type(store, scope, args[1], bindings, next),
        );
    }
    if POINTERS.contains(&last) && !args.is_empty() {
        return TypeShape::pointer(resolve_type(store, scope, args[0], bindings, next));
    }
    if let Some(primitive) = Primitive::from_type_name(last)
        && (path == last || is_std_path(path))
    {
        return TypeShape::primitive(primitive);
    }

    if let Some(LinkTarget::Item {
        namespace,
        name,
        kind,
        member: None,
    }) = store.resolve_path(scope, path)
        && is_data_type(kind)
        && let Ok(handle) = store.lookup(&namespace, &name)
    {
        let declaration = handle.declaration;
        if args.len() < declaration.generics.len() {
            debug!(
                "{} takes {} type argument(s), {} given in {}",
                name,
                declaration.generics.len(),
                args.len(),
                text
            );
        }
        let arguments: Bindings = declaration
            .generics
            .iter()
            .zip(&args)
            .map(|(param, arg)| {
                (param.clone(), resolve_type(store, scope, arg, bindings, next))
            })
            .collect();
        return declaration_shape(store, &namespace, declaration, &arguments, next);
    }

    warn!("Unresolved type {} in {}; treating as opaque", text, scope);
    TypeShape::opaque(last)
}

fn is_std_path(path: &str) -> bool {
    ["std::", "core::", "alloc::"]
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// `'a mut T` → `T`
fn strip_reference(text: &str) -> &str {
    let mut rest = text.trim_start();
    if rest.starts_with('\'') {
        rest = rest
            .split_once(char::is_whitespace)
            .map(|(_, tail)| tail)
            .unwrap_or("");
    }
    let rest = rest.trim_start();
    rest.strip_prefix("mut ").unwrap_or(rest)
}

/// `a::B<C, D>` → (`a::B`, [`C`, ` D`])
fn split_generics(text: &str) -> (&str, Vec<&str>) {
    match (text.find('<'), text.strip_suffix('>')) {
        (Some(open), Some(body)) => (text[..open].trim(), split_top_level(&body[open + 1..])),
        _ => (text, Vec::new()),
    }
}

fn top_level_position(text: &str, needle: char) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            c if c == needle && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreLoader;
    use crate::types::{ErrorKind, TypeDescriptor};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const MODELS: &str = r#"
use std::collections::HashMap;
use crate::campus::Building;

/// Teacher is a person who teaches.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub full_name: String,
    pub students: Vec<Student>,
    #[serde(rename = "years")]
    pub age: Option<u8>,
    #[serde(skip)]
    pub secret: String,
    pub office: Box<Building>,
    pub grades: HashMap<String, Grade>,
    #[serde(flatten)]
    pub contact: Contact,
    pub tags: Tags,
    pub mentor: Option<Box<Teacher>>,
    pub kind: &'static str,
    pub pair: (u8, u8),
    pub extra: serde_json::Value,
}

/// Student attends classes.
pub struct Student {
    pub index: StudentId,
}

#[serde(transparent)]
pub struct StudentId {
    value: u64,
}

pub struct Contact {
    pub email: String,
}

/// Grade of a student.
pub enum Grade {
    A,
    B,
}

pub type Tags = Vec<String>;

pub trait Teaches {}

/// One page of results.
pub struct Page<'a, T: Clone = Student> {
    pub items: Vec<T>,
    pub label: &'a str,
}

pub type Paged<T> = Page<'static, T>;

pub struct Roster {
    pub students: Page<'static, Student>,
    pub grades: Paged<Grade>,
}
"#;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn shapes() -> (TempDir, SourceShapes) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "Cargo.toml", "[package]\nname = \"school\"\n");
        write(root, "src/lib.rs", "pub mod campus;\npub mod models;\n");
        write(root, "src/models.rs", MODELS);
        write(root, "src/campus.rs", "/// A building.\npub struct Building {\n    pub floors: u8,\n}\n");
        let store = StoreLoader::new(root).load().unwrap();
        (temp, SourceShapes::new(Arc::new(store)))
    }

    fn member<'a>(shape: &'a TypeShape, name: &str) -> &'a Member {
        shape
            .members()
            .iter()
            .find(|m| m.name == name)
            .unwrap_or_else(|| panic!("member {} missing", name))
    }

    #[test]
    fn test_structure_members_follow_serde_attributes() {
        let (_temp, shapes) = shapes();
        let teacher = shapes.shape_of_path("school::models::Teacher").unwrap();
        assert_eq!(teacher.qualified_name(), "school::models.Teacher");

        assert_eq!(member(&teacher, "full_name").output_name(), Some("fullName"));
        assert_eq!(member(&teacher, "age").output_name(), Some("years"));
        assert_eq!(member(&teacher, "secret").output_name(), None);
        assert!(member(&teacher, "contact").flatten);
    }

    #[test]
    fn test_member_types_resolve_through_store() {
        let (_temp, shapes) = shapes();
        let teacher = shapes.shape_of("school::models", "Teacher").unwrap();

        let describe = |name: &str| TypeDescriptor::describe(&member(&teacher, name).shape());

        assert_eq!(describe("students").name, "sequence<Student>");
        assert_eq!(describe("students").namespace, "school::models");
        assert_eq!(describe("age").structural_kind, "u8");
        assert_eq!(describe("office").namespace, "school::campus");
        assert_eq!(describe("grades").structural_kind, "mapping<string,string>");
        assert_eq!(describe("tags").name, "Tags");
        assert_eq!(describe("tags").structural_kind, "sequence<string>");
        assert_eq!(describe("mentor").name, "Teacher");
        assert_eq!(describe("kind").structural_kind, "string");
        assert_eq!(describe("pair").structural_kind, "opaque");
        assert_eq!(describe("extra").structural_kind, "opaque");
    }

    #[test]
    fn test_generic_arguments_are_substituted() {
        let (_temp, shapes) = shapes();
        let roster = shapes.shape_of("school::models", "Roster").unwrap();

        let students = member(&roster, "students").shape();
        assert_eq!(students.qualified_name(), "school::models.Page");
        let items = TypeDescriptor::describe(&member(&students, "items").shape());
        assert_eq!(items.name, "sequence<Student>");
        assert_eq!(items.namespace, "school::models");

        let grades = member(&roster, "grades").shape();
        assert_eq!(grades.qualified_name(), "school::models.Page");
        let items = TypeDescriptor::describe(&member(&grades, "items").shape());
        assert_eq!(items.name, "sequence<Grade>");
        assert_eq!(items.structural_kind, "sequence<string>");

        let unbound = shapes.shape_of("school::models", "Page").unwrap();
        let items = TypeDescriptor::describe(&member(&unbound, "items").shape());
        assert!(items.structural_kind.contains("opaque"));
    }

    #[test]
    fn test_transparent_and_enum_shapes() {
        let (_temp, shapes) = shapes();
        let id = shapes.shape_of("school::models", "StudentId").unwrap();
        assert_eq!(TypeDescriptor::describe(&id).structural_kind, "u64");
        assert_eq!(id.qualified_name(), "school::models.StudentId");

        let grade = shapes.shape_of_path("Grade").unwrap();
        assert_eq!(grade.qualified_name(), "school::models.Grade");
        assert_eq!(TypeDescriptor::describe(&grade).structural_kind, "string");
    }

    #[test]
    fn test_non_data_declarations_are_rejected() {
        let (_temp, shapes) = shapes();
        let err = shapes.shape_of("school::models", "Teaches").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDeclaration);

        let err = shapes.shape_of_path("Nobody").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeclarationNotFound);
    }

    #[test]
    fn test_type_expression_forms() {
        let store = Arc::new(DeclarationStore::new("/tmp"));
        let kind = |text: &str| {
            crate::types::structural_kind(&type_shape(&store, "demo", text, 0))
        };
        assert_eq!(kind("Vec<Option<String>>"), "sequence<string>");
        assert_eq!(kind("[[u8; 4]; 2]"), "sequence<sequence<u8>>");
        assert_eq!(kind("&'a mut [i32]"), "sequence<i32>");
        assert_eq!(kind("std::borrow::Cow<'static, str>"), "string");
        assert_eq!(kind("BTreeMap<u32, Vec<bool>>"), "mapping<u32,sequence<bool>>");
        assert_eq!(kind("()"), "unit");
        assert_eq!(kind("(f64)"), "f64");
        assert_eq!(kind("Box<dyn Fn()>"), "opaque");
        assert_eq!(kind("Uuid"), "opaque");
    }

    #[test]
    fn test_rename_rules() {
        assert_eq!(apply_rename_rule("camelCase", "old_name"), "oldName");
        assert_eq!(apply_rename_rule("PascalCase", "old_name"), "OldName");
        assert_eq!(apply_rename_rule("kebab-case", "old_name"), "old-name");
        assert_eq!(apply_rename_rule("SCREAMING_SNAKE_CASE", "old_name"), "OLD_NAME");
        assert_eq!(apply_rename_rule("SCREAMING-KEBAB-CASE", "old_name"), "OLD-NAME");
        assert_eq!(apply_rename_rule("lowercase", "Old_Name"), "old_name");
        assert_eq!(apply_rename_rule("unknown", "old_name"), "old_name");
    }
}
