//! Unified Error Type System
//!
//! Centralized error types for the whole crate. Every failure is a structured
//! value carrying its kind and context so callers can branch on it.
//!
//! ## Error Kinds
//!
//! - **RootNotFound**: no project marker found walking up the directory tree
//! - **StoreLoadFailure**: the source tree could not be read
//! - **PackageErrors**: syntax or module-resolution errors, collected across the tree
//! - **DeclarationNotFound**: a qualified name is absent from the store
//! - **MalformedDeclaration**: a declaration's shape contradicts the runtime kind
//! - **NoDocumentation**: correlation produced nothing (built-in root type)
//! - **RulePlanFailure**: the external rule planner failed
//!
//! Member-level failures are wrapped with the owning type and member names;
//! [`ShapeDocError::kind`] looks through those wrappers.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Error Kinds
// =============================================================================

/// Root-cause classification of a [`ShapeDocError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RootNotFound,
    StoreLoadFailure,
    PackageErrors,
    DeclarationNotFound,
    MalformedDeclaration,
    NoDocumentation,
    RulePlanFailure,
    Config,
    Io,
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound => write!(f, "ROOT_NOT_FOUND"),
            Self::StoreLoadFailure => write!(f, "STORE_LOAD_FAILURE"),
            Self::PackageErrors => write!(f, "PACKAGE_ERRORS"),
            Self::DeclarationNotFound => write!(f, "DECLARATION_NOT_FOUND"),
            Self::MalformedDeclaration => write!(f, "MALFORMED_DECLARATION"),
            Self::NoDocumentation => write!(f, "NO_DOCUMENTATION"),
            Self::RulePlanFailure => write!(f, "RULE_PLAN_FAILURE"),
            Self::Config => write!(f, "CONFIG"),
            Self::Io => write!(f, "IO"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

// =============================================================================
// Package Error
// =============================================================================

/// A single syntax or resolution problem found while building the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageError {
    /// Module path of the offending package
    pub package: String,
    /// File the problem was found in
    pub file: PathBuf,
    /// 1-based line, when known
    pub line: Option<u32>,
    pub message: String,
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "package {} has reported an error at {}:{}: {}",
                self.package,
                self.file.display(),
                line,
                self.message
            ),
            None => write!(
                f,
                "package {} has reported an error in {}: {}",
                self.package,
                self.file.display(),
                self.message
            ),
        }
    }
}

fn join_package_errors(errors: &[PackageError]) -> String {
    errors
        .iter()
        .map(|e| format!("\n  - {}", e))
        .collect::<String>()
}

/// Boxed error returned by external collaborators (rule planners)
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ShapeDocError {
    // -------------------------------------------------------------------------
    // Store Construction
    // -------------------------------------------------------------------------
    #[error("{marker} not found in directory tree starting at {}", .start.display())]
    RootNotFound { start: PathBuf, marker: String },

    #[error("failed to load source tree at {}: {message}", .path.display())]
    StoreLoadFailure { path: PathBuf, message: String },

    #[error("{} package error(s) found:{}", .errors.len(), join_package_errors(.errors))]
    PackageErrors { errors: Vec<PackageError> },

    // -------------------------------------------------------------------------
    // Correlation
    // -------------------------------------------------------------------------
    #[error("{}", describe_not_found(.namespace, .name, .package_loaded))]
    DeclarationNotFound {
        namespace: String,
        name: String,
        package_loaded: bool,
    },

    #[error("failed to parse {qualified_name} declaration: expected {expected}, found {found}")]
    MalformedDeclaration {
        qualified_name: String,
        expected: String,
        found: String,
    },

    #[error("no documentation found for type {type_name}")]
    NoDocumentation { type_name: String },

    /// Failure inside a structure member, annotated with where it happened
    #[error("failed to correlate {owner} member {member}: {source}")]
    Member {
        owner: String,
        member: String,
        #[source]
        source: Box<ShapeDocError>,
    },

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------
    #[error("failed to generate rule plan for {type_name}: {source}")]
    RulePlanFailure {
        type_name: String,
        #[source]
        source: BoxedCause,
    },

    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(String),
}

fn describe_not_found(namespace: &str, name: &str, package_loaded: &bool) -> String {
    if *package_loaded {
        format!("{}.{} not found", namespace, name)
    } else {
        format!("could not find {} package for type {}", namespace, name)
    }
}

pub type Result<T> = std::result::Result<T, ShapeDocError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl ShapeDocError {
    /// Create a store load failure for a path
    pub fn store_load(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::StoreLoadFailure {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Wrap an error with the structure member it was raised for
    pub fn in_member(self, owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self::Member {
            owner: owner.into(),
            member: member.into(),
            source: Box::new(self),
        }
    }

    /// Root-cause kind, looking through member context wrappers
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RootNotFound { .. } => ErrorKind::RootNotFound,
            Self::StoreLoadFailure { .. } => ErrorKind::StoreLoadFailure,
            Self::PackageErrors { .. } => ErrorKind::PackageErrors,
            Self::DeclarationNotFound { .. } => ErrorKind::DeclarationNotFound,
            Self::MalformedDeclaration { .. } => ErrorKind::MalformedDeclaration,
            Self::NoDocumentation { .. } => ErrorKind::NoDocumentation,
            Self::Member { source, .. } => source.kind(),
            Self::RulePlanFailure { .. } => ErrorKind::RulePlanFailure,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) | Self::Yaml(_) => ErrorKind::Serialization,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Innermost error, skipping member context wrappers
    pub fn root_cause(&self) -> &ShapeDocError {
        match self {
            Self::Member { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Member trail from the outermost owner down to the failure point
    pub fn member_trail(&self) -> Vec<(&str, &str)> {
        let mut trail = Vec::new();
        let mut current = self;
        while let Self::Member {
            owner,
            member,
            source,
        } = current
        {
            trail.push((owner.as_str(), member.as_str()));
            current = source;
        }
        trail
    }
}

// =============================================================================
// Tests
// =============================================================================
