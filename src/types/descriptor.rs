//! Type Descriptors
//!
//! Normalizes a [`TypeShape`] into the `{name, structuralKind, namespace}`
//! triple attached to every property.

use serde::{Deserialize, Serialize};

use super::shape::{ShapeKind, TypeShape, qualified_name};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub name: String,
    pub structural_kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl TypeDescriptor {
    /// Describe a shape.
    ///
    /// Pointers are transparent. An anonymous sequence keeps its marker in
    /// the name and takes the element's namespace, so `Vec<Student>` is
    /// `sequence<Student>` in Student's namespace while `Vec<String>` stays
    /// built-in.
    pub fn describe(shape: &TypeShape) -> Self {
        let shape = shape.deref_pointers();
        let structural_kind = structural_kind(shape);

        let (target, in_sequence) = match &shape.kind {
            ShapeKind::Sequence(element) if shape.is_builtin() => (element.deref_pointers(), true),
            _ => (shape, false),
        };

        let (name, namespace) = if target.is_builtin() {
            (display_name(target), String::new())
        } else {
            (target.name.clone(), target.namespace.clone())
        };

        Self {
            name: if in_sequence {
                format!("sequence<{}>", name)
            } else {
                name
            },
            structural_kind,
            namespace,
        }
    }

    /// Describe a possibly absent shape; absence yields the zero descriptor
    pub fn describe_optional(shape: Option<&TypeShape>) -> Self {
        shape.map(Self::describe).unwrap_or_default()
    }

    /// Key used to find this type's documentation entry
    pub fn key(&self) -> String {
        qualified_name(&self.namespace, &self.name)
    }

    pub fn is_builtin(&self) -> bool {
        self.namespace.is_empty()
    }
}

/// Normalized shape string, recursive through sequences and mappings
pub fn structural_kind(shape: &TypeShape) -> String {
    let shape = shape.deref_pointers();
    match &shape.kind {
        ShapeKind::Primitive(primitive) => primitive.kind_name().to_string(),
        ShapeKind::Opaque => "opaque".to_string(),
        ShapeKind::Pointer(target) => structural_kind(target),
        ShapeKind::Sequence(element) => format!("sequence<{}>", structural_kind(element)),
        ShapeKind::Mapping(key, value) => format!(
            "mapping<{},{}>",
            structural_kind(key),
            structural_kind(value)
        ),
        ShapeKind::Structure(_) => "struct".to_string(),
    }
}

/// Human-readable name for anonymous or built-in shapes
fn display_name(shape: &TypeShape) -> String {
    let shape = shape.deref_pointers();
    if !shape.is_builtin() {
        return shape.qualified_name();
    }
    if !shape.name.is_empty() {
        return shape.name.clone();
    }
    match &shape.kind {
        ShapeKind::Sequence(element) => format!("sequence<{}>", display_name(element)),
        ShapeKind::Mapping(key, value) => {
            format!("mapping<{},{}>", display_name(key), display_name(value))
        }
        ShapeKind::Structure(_) => "struct".to_string(),
        _ => "opaque".to_string(),
    }
}
