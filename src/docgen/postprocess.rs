//! Post-processing
//!
//! Path exclusion followed by an ordered pipeline of per-node text
//! transforms. Every transform is idempotent, so processing a finished
//! document again changes nothing.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use tracing::debug;

use crate::types::{ObjectDoc, PropertyNode};

static ENUM_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)ENUM.*").expect("valid regex"));
static DEPRECATED_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*Deprecated:\s*(.*)$").expect("valid regex"));

/// A pure function over one node
pub type PropertyTransform = fn(PropertyNode) -> PropertyNode;

/// Default pipeline, applied in order
pub const DEFAULT_TRANSFORMS: &[PropertyTransform] = &[
    remove_enum_declaration,
    extract_deprecated_information,
    trim_whitespace,
];

/// Drop everything from the first `ENUM` onwards from the type doc. The
/// marker is matched as plain text, so `MY_ENUM(...)` is cut at `ENUM` too.
pub fn remove_enum_declaration(mut node: PropertyNode) -> PropertyNode {
    node.type_doc = ENUM_DECLARATION.replace(&node.type_doc, "").into_owned();
    node
}

/// Move a `Deprecated:` line into `deprecated_doc`.
///
/// The type doc is consulted first; the field doc only when nothing has
/// been extracted yet. An empty `Deprecated:` line in the type doc is
/// stripped without counting as a note, so the field doc still gets its
/// turn and a second pass finds nothing left to move.
pub fn extract_deprecated_information(mut node: PropertyNode) -> PropertyNode {
    if let Some(note) = deprecated_note(&node.type_doc) {
        node.type_doc = DEPRECATED_PARAGRAPH.replace_all(&node.type_doc, "").into_owned();
        if !note.is_empty() {
            node.deprecated_doc = note;
        }
    }
    if node.deprecated_doc.is_empty()
        && let Some(note) = deprecated_note(&node.field_doc)
    {
        node.deprecated_doc = note;
        node.field_doc = DEPRECATED_PARAGRAPH.replace_all(&node.field_doc, "").into_owned();
    }
    node
}

fn deprecated_note(doc: &str) -> Option<String> {
    DEPRECATED_PARAGRAPH
        .captures(doc)
        .map(|caps| caps[1].trim().to_string())
}

pub fn trim_whitespace(mut node: PropertyNode) -> PropertyNode {
    node.type_doc = node.type_doc.trim().to_string();
    node.field_doc = node.field_doc.trim().to_string();
    node.deprecated_doc = node.deprecated_doc.trim().to_string();
    node
}

// =============================================================================
// Exclusion
// =============================================================================

/// Paths removed from a document together with everything beneath them
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    paths: BTreeSet<String>,
}

impl ExclusionList {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn extend<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether `path` is an excluded path or lies beneath one
    pub fn excludes(&self, path: &str) -> bool {
        self.paths.iter().any(|excluded| {
            path == excluded.as_str()
                || path
                    .strip_prefix(excluded.as_str())
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
        })
    }
}

/// Remove excluded nodes, prune their paths from the survivors' children
/// and run every transform over each remaining node
pub fn post_process(
    mut doc: ObjectDoc,
    exclusions: &ExclusionList,
    transforms: &[PropertyTransform],
) -> ObjectDoc {
    if !exclusions.is_empty() {
        let before = doc.properties.len();
        doc.properties.retain(|p| !exclusions.excludes(&p.path));
        for property in &mut doc.properties {
            property
                .children_paths
                .retain(|child| !exclusions.excludes(child));
        }
        debug!("Excluded {} properties", before - doc.properties.len());
    }

    doc.properties = doc
        .properties
        .into_iter()
        .map(|node| transforms.iter().fold(node, |node, transform| transform(node)))
        .collect();
    doc
}
