//! Source Declarations
//!
//! Item-level facts extracted from Rust source: kind, doc comment,
//! deprecation, serde attributes and members.

use serde::Serialize;
use std::fmt;

/// Note used when `#[deprecated]` carries no explanation
pub const DEFAULT_DEPRECATION_NOTE: &str = "This item is deprecated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Struct,
    Enum,
    Union,
    #[serde(rename = "type")]
    TypeAlias,
    Trait,
    #[serde(rename = "fn")]
    Function,
    Const,
    Static,
}

impl DeclKind {
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        let kind = match kind {
            "struct_item" => Self::Struct,
            "enum_item" => Self::Enum,
            "union_item" => Self::Union,
            "type_item" => Self::TypeAlias,
            "trait_item" => Self::Trait,
            "function_item" => Self::Function,
            "const_item" => Self::Const,
            "static_item" => Self::Static,
            _ => return None,
        };
        Some(kind)
    }

    /// Page prefix used by rustdoc (`struct.Foo.html`)
    pub fn rustdoc_prefix(&self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::TypeAlias => "type",
            Self::Trait => "trait",
            Self::Function => "fn",
            Self::Const => "constant",
            Self::Static => "static",
        }
    }

    /// Disambiguator accepted in intra-doc links (`struct@Foo`)
    pub fn from_disambiguator(prefix: &str) -> Option<Self> {
        let kind = match prefix {
            "struct" => Self::Struct,
            "enum" => Self::Enum,
            "union" => Self::Union,
            "type" => Self::TypeAlias,
            "trait" => Self::Trait,
            "fn" | "function" | "method" => Self::Function,
            "const" | "constant" => Self::Const,
            "static" => Self::Static,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Self::Struct | Self::Enum | Self::Union | Self::TypeAlias | Self::Trait
        )
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct => write!(f, "struct"),
            Self::Enum => write!(f, "enum"),
            Self::Union => write!(f, "union"),
            Self::TypeAlias => write!(f, "type alias"),
            Self::Trait => write!(f, "trait"),
            Self::Function => write!(f, "fn"),
            Self::Const => write!(f, "const"),
            Self::Static => write!(f, "static"),
        }
    }
}

/// The subset of `#[serde(...)]` that changes the serialized shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SerdeAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename_all: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skip: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub flatten: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub transparent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
    /// Field identifier, or the positional index for tuple fields
    pub name: String,
    /// Type as written in source
    #[serde(rename = "type")]
    pub ty: String,
    pub doc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    pub serde: SerdeAttrs,
    pub public: bool,
    pub line: u32,
}

impl FieldDecl {
    pub fn documentation(&self) -> String {
        with_deprecation(&self.doc, self.deprecated.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantDecl {
    pub name: String,
    pub doc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    pub serde: SerdeAttrs,
    /// Tuple or struct variant
    pub has_fields: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "items", rename_all = "lowercase")]
pub enum DeclBody {
    /// Unit struct, trait, function, constant
    Empty,
    Named(Vec<FieldDecl>),
    Tuple(Vec<FieldDecl>),
    Variants(Vec<VariantDecl>),
    /// Right-hand side of a type alias
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    /// Raw doc comment with markers stripped
    pub doc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    pub serde: SerdeAttrs,
    pub public: bool,
    /// Names of the declared type and const parameters, in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,
    pub body: DeclBody,
    pub line: u32,
}

impl Declaration {
    /// Doc comment with a `Deprecated:` paragraph for `#[deprecated]` items
    pub fn documentation(&self) -> String {
        with_deprecation(&self.doc, self.deprecated.as_deref())
    }

    /// Declared fields; empty for anything without a field list
    pub fn fields(&self) -> &[FieldDecl] {
        match &self.body {
            DeclBody::Named(fields) | DeclBody::Tuple(fields) => fields,
            _ => &[],
        }
    }

    pub fn variants(&self) -> &[VariantDecl] {
        match &self.body {
            DeclBody::Variants(variants) => variants,
            _ => &[],
        }
    }

    /// Whether `name` is a field or variant of this declaration
    pub fn has_member(&self, name: &str) -> bool {
        self.fields().iter().any(|f| f.name == name)
            || self.variants().iter().any(|v| v.name == name)
    }

    /// Anchor rustdoc uses for a member of this item
    pub fn member_anchor(&self, member: &str) -> String {
        match self.kind {
            DeclKind::Enum => format!("variant.{}", member),
            _ => format!("structfield.{}", member),
        }
    }

    /// Whether the declaration has a body matching a runtime structure
    pub fn is_structure(&self) -> bool {
        matches!(self.kind, DeclKind::Struct | DeclKind::Union)
            && matches!(
                self.body,
                DeclBody::Named(_) | DeclBody::Tuple(_) | DeclBody::Empty
            )
    }
}

fn with_deprecation(doc: &str, deprecated: Option<&str>) -> String {
    let Some(note) = deprecated else {
        return doc.to_string();
    };
    if doc.lines().any(|line| line.starts_with("Deprecated:")) {
        return doc.to_string();
    }
    let note = if note.trim().is_empty() {
        DEFAULT_DEPRECATION_NOTE
    } else {
        note.trim()
    };
    if doc.trim().is_empty() {
        format!("Deprecated: {}", note)
    } else {
        format!("{}\n\nDeprecated: {}", doc.trim_end(), note)
    }
}
