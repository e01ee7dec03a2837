//! Generation Entry Point
//!
//! walk → correlate → plan → rule facts → merge → post-process

use std::sync::Arc;

use tracing::{debug, info};

use super::correlator::correlate;
use super::mapper::ObjectMapper;
use super::merge::{extend_with_rule_facts, merge_docs};
use super::planner::RulePlanner;
use super::postprocess::{DEFAULT_TRANSFORMS, ExclusionList, PropertyTransform, post_process};
use crate::config::Config;
use crate::store::DeclarationStore;
use crate::types::{ObjectDoc, ROOT_PATH, Reflect, Result, ShapeDocError, TypeShape};

/// Per-call options
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Paths removed on top of the generator-wide exclusions
    pub excluded_paths: Vec<String>,
    pub transforms: Vec<PropertyTransform>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            excluded_paths: Vec::new(),
            transforms: DEFAULT_TRANSFORMS.to_vec(),
        }
    }
}

impl GenerateOptions {
    pub fn with_excluded_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_transforms(mut self, transforms: Vec<PropertyTransform>) -> Self {
        self.transforms = transforms;
        self
    }
}

/// Produces documents against one loaded store
#[derive(Debug, Clone)]
pub struct Generator {
    store: Arc<DeclarationStore>,
    excluded_paths: Vec<String>,
}

impl Generator {
    pub fn new(store: Arc<DeclarationStore>) -> Self {
        Self {
            store,
            excluded_paths: Vec::new(),
        }
    }

    /// Generator with the configured process-wide exclusions
    pub fn from_config(store: Arc<DeclarationStore>, config: &Config) -> Self {
        Self::new(store).with_excluded_paths(config.output.excluded_paths.clone())
    }

    pub fn with_excluded_paths(mut self, paths: Vec<String>) -> Self {
        self.excluded_paths = paths;
        self
    }

    pub fn store(&self) -> &Arc<DeclarationStore> {
        &self.store
    }

    pub fn generate(
        &self,
        shape: &TypeShape,
        planner: &dyn RulePlanner,
        options: &GenerateOptions,
    ) -> Result<ObjectDoc> {
        let shape = shape.deref_pointers();
        let type_name = shape.qualified_name();
        debug!("Generating document for {}", type_name);

        let mut doc = ObjectMapper::object_doc(shape);
        let docs = correlate(&self.store, shape)?;

        let plan = planner
            .plan(shape)
            .map_err(|source| ShapeDocError::RulePlanFailure {
                type_name: type_name.clone(),
                source,
            })?;

        if doc.name.is_empty() {
            doc.name = shape.name.clone();
        }
        extend_with_rule_facts(&mut doc, plan);
        merge_docs(&mut doc, &docs);

        let mut exclusions = ExclusionList::new(self.excluded_paths.iter().cloned());
        exclusions.extend(options.excluded_paths.iter().cloned());
        let mut doc = post_process(doc, &exclusions, &options.transforms);

        doc.doc = doc
            .property(ROOT_PATH)
            .map(|root| root.type_doc.clone())
            .unwrap_or_default();

        info!(
            "Generated {} with {} properties",
            type_name,
            doc.properties.len()
        );
        Ok(doc)
    }

    pub fn generate_for<T: Reflect + ?Sized>(
        &self,
        planner: &dyn RulePlanner,
        options: &GenerateOptions,
    ) -> Result<ObjectDoc> {
        self.generate(&T::shape(), planner, options)
    }
}
