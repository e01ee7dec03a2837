pub mod declaration;
pub mod descriptor;
pub mod error;
pub mod property;
pub mod shape;

pub use declaration::{
    DEFAULT_DEPRECATION_NOTE, DeclBody, DeclKind, Declaration, FieldDecl, SerdeAttrs, VariantDecl,
};
pub use descriptor::{TypeDescriptor, structural_kind};
pub use error::{BoxedCause, ErrorKind, PackageError, Result, ShapeDocError};
pub use property::{Example, ObjectDoc, PropertyNode, ROOT_PATH};
pub use shape::{
    Member, Primitive, Reflect, SUPPRESSED_NAME, ShapeFn, ShapeKind, StructureBuilder, TypeShape,
    qualified_name,
};
