//! Document Generation
//!
//! Turns a [`TypeShape`](crate::types::TypeShape) plus the declaration
//! store into a flat, path-addressed [`ObjectDoc`](crate::types::ObjectDoc).
//!
//! ```rust,ignore
//! let store = Arc::new(StoreLoader::new(find_project_root("Cargo.toml")?).load()?);
//! let doc = Generator::new(store).generate_for::<Teacher>(&NoRules, &GenerateOptions::default())?;
//! ```

pub mod correlator;
pub mod generate;
pub mod mapper;
pub mod merge;
pub mod planner;
pub mod postprocess;
pub mod source_shape;

pub use correlator::{DocEntry, DocMap, MemberDoc, correlate};
pub use generate::{GenerateOptions, Generator};
pub use mapper::ObjectMapper;
pub use merge::{extend_with_rule_facts, merge_docs};
pub use planner::{JsonPlanFile, NoRules, RuleFact, RulePlan, RulePlanner, StaticPlan};
pub use postprocess::{
    DEFAULT_TRANSFORMS, ExclusionList, PropertyTransform, extract_deprecated_information,
    post_process, remove_enum_declaration, trim_whitespace,
};
pub use source_shape::SourceShapes;
