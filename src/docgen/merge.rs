//! Document Merging
//!
//! Folds rule facts and correlated documentation into the walked
//! property list.

use tracing::debug;

use super::correlator::DocMap;
use super::planner::RulePlan;
use crate::types::{ObjectDoc, PropertyNode};

/// Keys a rule fact may not carry, since they name node fields
const RESERVED_FACT_KEYS: &[&str] = &[
    "path",
    "typeDescriptor",
    "typeDoc",
    "fieldDoc",
    "deprecatedDoc",
    "childrenPaths",
];

/// Attach type and member documentation to every non-built-in node
pub fn merge_docs(doc: &mut ObjectDoc, docs: &DocMap) {
    for index in 0..doc.properties.len() {
        let property = &doc.properties[index];
        if property.type_descriptor.is_builtin() {
            continue;
        }
        let Some(entry) = docs.get(&property.key()) else {
            continue;
        };

        let path = property.path.clone();
        doc.properties[index].type_doc = entry.doc.clone();

        for (name, member) in &entry.members {
            let member_path = format!("{}.{}", path, name);
            if let Some(node) = doc.properties.iter_mut().find(|p| p.path == member_path) {
                node.field_doc = member.doc.clone();
            }
        }
    }
}

/// Apply a plan's name, facts and examples.
///
/// A fact replaces the node at its path with a fresh one holding the fact
/// data, keeping the walked descriptor unless the fact supplies one. Facts
/// for paths the walk never produced are ignored.
pub fn extend_with_rule_facts(doc: &mut ObjectDoc, plan: RulePlan) {
    if !plan.name.is_empty() {
        doc.name = plan.name;
    }

    for fact in plan.properties {
        let Some(node) = doc.properties.iter_mut().find(|p| p.path == fact.path) else {
            debug!("Ignoring rule fact for unknown path {}", fact.path);
            continue;
        };

        let mut facts = fact.data;
        facts.retain(|key, _| !RESERVED_FACT_KEYS.contains(&key.as_str()));

        let descriptor = match fact.type_descriptor {
            Some(descriptor) => descriptor,
            None => std::mem::take(&mut node.type_descriptor),
        };
        let mut replacement = PropertyNode::new(fact.path, descriptor);
        replacement.children_paths = std::mem::take(&mut node.children_paths);
        replacement.facts = facts;
        *node = replacement;
    }

    doc.examples = plan.examples;
}
