//! Type Shapes
//!
//! A uniform, introspection-free description of a data type: primitives,
//! opaque values, pointers, sequences, mappings and structures. Structure
//! members resolve their own shape lazily, so a type that refers back to
//! itself still yields a finite value.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Lazily evaluated member shape
pub type ShapeFn = Arc<dyn Fn() -> TypeShape + Send + Sync>;

/// Serialization annotation value that removes a member from the output
pub const SUPPRESSED_NAME: &str = "-";

// =============================================================================
// Primitive Kinds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    String,
    Unit,
}

impl Primitive {
    /// Name as spelled in Rust source
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "String",
            Self::Unit => "()",
        }
    }

    /// Structural kind name
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Unit => "unit",
            other => other.type_name(),
        }
    }

    /// Recognize a primitive from its source spelling
    pub fn from_type_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "bool" => Self::Bool,
            "char" => Self::Char,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "i128" => Self::I128,
            "isize" => Self::Isize,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "usize" => Self::Usize,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "String" | "str" => Self::String,
            "()" => Self::Unit,
            _ => return None,
        };
        Some(primitive)
    }
}

// =============================================================================
// Shapes
// =============================================================================

#[derive(Clone)]
pub enum ShapeKind {
    Primitive(Primitive),
    /// A value with no further structure (trait objects, external types)
    Opaque,
    /// Indirection that never changes the identity of the target
    Pointer(Box<TypeShape>),
    Sequence(Box<TypeShape>),
    Mapping(Box<TypeShape>, Box<TypeShape>),
    Structure(Vec<Member>),
}

/// A named or anonymous type.
///
/// `namespace` is empty for built-in types. Named non-structure types carry
/// the kind of their underlying type, so `type Tags = Vec<Tag>` is a
/// sequence named `Tags`.
#[derive(Clone)]
pub struct TypeShape {
    pub name: String,
    pub namespace: String,
    pub kind: ShapeKind,
}

impl TypeShape {
    pub fn of<T: Reflect + ?Sized>() -> Self {
        T::shape()
    }

    pub fn primitive(primitive: Primitive) -> Self {
        Self {
            name: primitive.type_name().to_string(),
            namespace: String::new(),
            kind: ShapeKind::Primitive(primitive),
        }
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            kind: ShapeKind::Opaque,
        }
    }

    pub fn pointer(target: TypeShape) -> Self {
        Self::anonymous(ShapeKind::Pointer(Box::new(target)))
    }

    pub fn sequence(element: TypeShape) -> Self {
        Self::anonymous(ShapeKind::Sequence(Box::new(element)))
    }

    pub fn mapping(key: TypeShape, value: TypeShape) -> Self {
        Self::anonymous(ShapeKind::Mapping(Box::new(key), Box::new(value)))
    }

    /// Start a named structure
    pub fn structure(name: impl Into<String>, namespace: impl Into<String>) -> StructureBuilder {
        StructureBuilder {
            name: name.into(),
            namespace: namespace.into(),
            members: Vec::new(),
        }
    }

    /// Give an underlying shape a declared name
    pub fn named(
        name: impl Into<String>,
        namespace: impl Into<String>,
        underlying: TypeShape,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind: underlying.deref_pointers().kind.clone(),
        }
    }

    fn anonymous(kind: ShapeKind) -> Self {
        Self {
            name: String::new(),
            namespace: String::new(),
            kind,
        }
    }

    /// Strip every level of pointer indirection
    pub fn deref_pointers(&self) -> &TypeShape {
        let mut current = self;
        while let ShapeKind::Pointer(target) = &current.kind {
            current = target;
        }
        current
    }

    pub fn is_builtin(&self) -> bool {
        self.namespace.is_empty()
    }

    pub fn is_structure(&self) -> bool {
        matches!(self.kind, ShapeKind::Structure(_))
    }

    pub fn members(&self) -> &[Member] {
        match &self.kind {
            ShapeKind::Structure(members) => members,
            _ => &[],
        }
    }

    /// `namespace.name`, or the bare name for built-ins
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.namespace, &self.name)
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ShapeKind::Primitive(p) => write!(f, "{}", p.type_name()),
            ShapeKind::Opaque => write!(f, "opaque {}", self.qualified_name()),
            ShapeKind::Pointer(t) => write!(f, "&{:?}", t),
            ShapeKind::Sequence(e) if self.name.is_empty() => write!(f, "[{:?}]", e),
            ShapeKind::Mapping(k, v) if self.name.is_empty() => write!(f, "{{{:?}: {:?}}}", k, v),
            ShapeKind::Structure(members) => f
                .debug_struct(&self.qualified_name())
                .field("members", members)
                .finish(),
            _ => write!(f, "{}", self.qualified_name()),
        }
    }
}

/// Build the key shared by documentation entries and type descriptors
pub fn qualified_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

// =============================================================================
// Members
// =============================================================================

#[derive(Clone)]
pub struct Member {
    /// Declared name (tuple fields use their index)
    pub name: String,
    /// Serialization name override; [`SUPPRESSED_NAME`] removes the member
    pub rename: Option<String>,
    pub visible: bool,
    /// Members of the target structure are lifted into the owner
    pub flatten: bool,
    shape: ShapeFn,
}

impl Member {
    pub fn of<T: Reflect + ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::lazy(name, T::shape)
    }

    pub fn lazy(
        name: impl Into<String>,
        shape: impl Fn() -> TypeShape + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            rename: None,
            visible: true,
            flatten: false,
            shape: Arc::new(shape),
        }
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    pub fn skip(self) -> Self {
        self.rename(SUPPRESSED_NAME)
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    /// Name under which the member appears in the output, if any.
    ///
    /// Hidden and suppressed members have none. An empty override falls
    /// back to the declared name.
    pub fn output_name(&self) -> Option<&str> {
        if !self.visible {
            return None;
        }
        let name = match self.rename.as_deref() {
            Some(SUPPRESSED_NAME) => return None,
            Some("") | None => self.name.as_str(),
            Some(rename) => rename,
        };
        (!name.is_empty()).then_some(name)
    }

    pub fn shape(&self) -> TypeShape {
        (self.shape)()
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("rename", &self.rename)
            .field("visible", &self.visible)
            .field("flatten", &self.flatten)
            .finish_non_exhaustive()
    }
}

pub struct StructureBuilder {
    name: String,
    namespace: String,
    members: Vec<Member>,
}

impl StructureBuilder {
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Shorthand for a visible member with a serialization name
    pub fn field<T: Reflect + ?Sized + 'static>(self, name: &str, rename: &str) -> Self {
        self.member(Member::of::<T>(name).rename(rename))
    }

    pub fn build(self) -> TypeShape {
        TypeShape {
            name: self.name,
            namespace: self.namespace,
            kind: ShapeKind::Structure(self.members),
        }
    }
}

// =============================================================================
// Reflect
// =============================================================================

/// Types that can describe their own shape
pub trait Reflect {
    fn shape() -> TypeShape;
}

macro_rules! reflect_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn shape() -> TypeShape {
                    TypeShape::primitive(Primitive::$variant)
                }
            }
        )*
    };
}

reflect_primitive! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    str => String,
    () => Unit,
}

macro_rules! reflect_sequence {
    ($($container:ident),*) => {
        $(
            impl<T: Reflect> Reflect for $container<T> {
                fn shape() -> TypeShape {
                    TypeShape::sequence(T::shape())
                }
            }
        )*
    };
}

reflect_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Reflect, S> Reflect for HashSet<T, S> {
    fn shape() -> TypeShape {
        TypeShape::sequence(T::shape())
    }
}

impl<T: Reflect> Reflect for [T] {
    fn shape() -> TypeShape {
        TypeShape::sequence(T::shape())
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> TypeShape {
        TypeShape::sequence(T::shape())
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn shape() -> TypeShape {
        TypeShape::mapping(K::shape(), V::shape())
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn shape() -> TypeShape {
        TypeShape::mapping(K::shape(), V::shape())
    }
}

macro_rules! reflect_pointer {
    ($($container:ident),*) => {
        $(
            impl<T: Reflect + ?Sized> Reflect for $container<T> {
                fn shape() -> TypeShape {
                    TypeShape::pointer(T::shape())
                }
            }
        )*
    };
}

reflect_pointer!(Box, Arc, Rc);

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::pointer(T::shape())
    }
}

impl<T: Reflect + ?Sized> Reflect for &T {
    fn shape() -> TypeShape {
        TypeShape::pointer(T::shape())
    }
}

impl Reflect for serde_json::Value {
    fn shape() -> TypeShape {
        TypeShape::opaque("Value")
    }
}
