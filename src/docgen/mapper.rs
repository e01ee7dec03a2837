//! Structural Graph Walker
//!
//! Expands a [`TypeShape`] into the flat, path-addressed property list.
//!
//! Paths: root `$`, member `parent.name`, sequence element `parent[*]`,
//! mapping key `parent.~`, mapping value `parent.*`.

use crate::types::{
    Member, ObjectDoc, PropertyNode, ROOT_PATH, ShapeKind, TypeDescriptor, TypeShape,
};

pub const ELEMENT_SUFFIX: &str = "[*]";
pub const KEY_SUFFIX: &str = ".~";
pub const VALUE_SUFFIX: &str = ".*";

#[derive(Default)]
pub struct ObjectMapper {
    properties: Vec<PropertyNode>,
    /// Named structures currently being expanded, outermost first
    expanding: Vec<String>,
}

impl ObjectMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `shape` from the root path and return the document skeleton
    /// with children paths filled in
    pub fn object_doc(shape: &TypeShape) -> ObjectDoc {
        let mut mapper = Self::new();
        mapper.map(shape, ROOT_PATH);
        ObjectDoc {
            properties: mapper.into_properties(),
            ..Default::default()
        }
    }

    /// Append nodes for `shape` at `path` and everything reachable from it.
    ///
    /// A structure already being expanded further up the current branch
    /// gets its own node but is not expanded again.
    pub fn map(&mut self, shape: &TypeShape, path: &str) {
        let shape = shape.deref_pointers();
        self.properties
            .push(PropertyNode::new(path, TypeDescriptor::describe(shape)));

        match &shape.kind {
            ShapeKind::Structure(members) => {
                let key = shape.qualified_name();
                let guarded = !shape.name.is_empty();
                if guarded && self.expanding.contains(&key) {
                    tracing::debug!("Not expanding {} again at {}", key, path);
                    return;
                }
                if guarded {
                    self.expanding.push(key);
                }
                self.map_members(members, path);
                if guarded {
                    self.expanding.pop();
                }
            }
            ShapeKind::Sequence(element) => {
                self.map(element, &format!("{}{}", path, ELEMENT_SUFFIX));
            }
            ShapeKind::Mapping(key, value) => {
                self.map(key, &format!("{}{}", path, KEY_SUFFIX));
                self.map(value, &format!("{}{}", path, VALUE_SUFFIX));
            }
            _ => {}
        }
    }

    fn map_members(&mut self, members: &[Member], path: &str) {
        for member in members {
            let Some(name) = member.output_name() else {
                continue;
            };

            if member.flatten {
                let shape = member.shape();
                let target = shape.deref_pointers();
                if let ShapeKind::Structure(inner) = &target.kind {
                    let key = target.qualified_name();
                    if self.expanding.contains(&key) {
                        continue;
                    }
                    self.expanding.push(key);
                    self.map_members(inner, path);
                    self.expanding.pop();
                }
                continue;
            }

            self.map(&member.shape(), &format!("{}.{}", path, name));
        }
    }

    /// Finish the walk, computing each node's immediate children
    pub fn into_properties(self) -> Vec<PropertyNode> {
        let mut properties = self.properties;
        let children: Vec<Vec<String>> = properties
            .iter()
            .map(|p| children_paths(&p.path, &properties))
            .collect();
        for (property, children) in properties.iter_mut().zip(children) {
            property.children_paths = children;
        }
        properties
    }
}

/// Paths of the form `parent.segment` where `segment` holds no further `.`
pub fn children_paths(parent: &str, properties: &[PropertyNode]) -> Vec<String> {
    let prefix = format!("{}.", parent);
    properties
        .iter()
        .filter_map(|p| p.path.strip_prefix(&prefix))
        .filter(|rest| !rest.contains('.'))
        .map(|rest| format!("{}{}", prefix, rest))
        .collect()
}
