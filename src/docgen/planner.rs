//! Rule Planner Seam
//!
//! An external collaborator that, given the root shape, returns the
//! document name, per-path rule facts and examples.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

use crate::types::{BoxedCause, Example, TypeDescriptor, TypeShape};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulePlan {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<RuleFact>,
    #[serde(default)]
    pub examples: Vec<Example>,
}

/// Facts a planner knows about one path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFact {
    pub path: String,
    /// Replaces the walked descriptor when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_descriptor: Option<TypeDescriptor>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl RuleFact {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

pub trait RulePlanner {
    fn plan(&self, root: &TypeShape) -> Result<RulePlan, BoxedCause>;
}

/// Planner with no rules; the document is named after the root type
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl RulePlanner for NoRules {
    fn plan(&self, root: &TypeShape) -> Result<RulePlan, BoxedCause> {
        Ok(RulePlan {
            name: root.deref_pointers().name.clone(),
            ..Default::default()
        })
    }
}

/// A fixed plan returned for every root
#[derive(Debug, Clone)]
pub struct StaticPlan(pub RulePlan);

impl RulePlanner for StaticPlan {
    fn plan(&self, _root: &TypeShape) -> Result<RulePlan, BoxedCause> {
        Ok(self.0.clone())
    }
}

/// A plan read from a JSON file on each call
#[derive(Debug, Clone)]
pub struct JsonPlanFile {
    path: PathBuf,
}

impl JsonPlanFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RulePlanner for JsonPlanFile {
    fn plan(&self, _root: &TypeShape) -> Result<RulePlan, BoxedCause> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| format!("cannot read {}: {}", self.path.display(), e))?;
        let plan: RulePlan = serde_json::from_str(&content)
            .map_err(|e| format!("invalid rule plan {}: {}", self.path.display(), e))?;
        Ok(plan)
    }
}

impl<F> RulePlanner for F
where
    F: Fn(&TypeShape) -> Result<RulePlan, BoxedCause>,
{
    fn plan(&self, root: &TypeShape) -> Result<RulePlan, BoxedCause> {
        self(root)
    }
}
