//! Generate Command
//!
//! Produce the flattened document for one type of the project.
//!
//! Usage:
//!   shapedoc generate --type school::models::Teacher
//!   shapedoc generate -t Teacher --rules rules.json --exclude '$.secret' -f yaml -o teacher.yaml

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::cli::ui::output::Output;
use crate::cli::util::CommandContext;
use crate::config::OutputFormat;
use crate::docgen::{GenerateOptions, Generator, JsonPlanFile, NoRules, RulePlanner, SourceShapes};
use crate::types::{ObjectDoc, Result};

#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    /// `crate::module::Type`, `crate::module.Type` or a bare type name
    pub type_path: String,
    /// JSON rule plan merged into the document
    pub rules: Option<PathBuf>,
    /// Extra paths excluded for this run
    pub exclude: Vec<String>,
    pub format: Option<OutputFormat>,
    /// Write here instead of stdout
    pub output: Option<PathBuf>,
    /// Force compact JSON
    pub compact: bool,
}

pub fn run(ctx: &CommandContext, args: GenerateArgs) -> Result<()> {
    let store = ctx.load_store()?;
    let shape = SourceShapes::new(store.clone()).shape_of_path(&args.type_path)?;

    let planner: Box<dyn RulePlanner> = match &args.rules {
        Some(path) => Box::new(JsonPlanFile::new(path)),
        None => Box::new(NoRules),
    };
    let options = GenerateOptions::default().with_excluded_paths(args.exclude.iter().cloned());

    let doc = Generator::from_config(store, &ctx.config).generate(&shape, planner.as_ref(), &options)?;

    let format = args.format.unwrap_or(ctx.config.output.format);
    if args.compact && format == OutputFormat::Yaml {
        Output::new().warning("--compact only applies to JSON output");
    }
    let pretty = ctx.config.output.pretty && !args.compact;
    let rendered = render(&doc, format, pretty)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &rendered)?;
            info!("Wrote {} to {}", doc.name, path.display());
            Output::new().success(&format!(
                "{} ({} properties) → {}",
                doc.name,
                doc.properties.len(),
                path.display()
            ));
        }
        None => println!("{}", rendered.trim_end()),
    }

    Ok(())
}

/// Serialize a document in the requested format
pub fn render(doc: &ObjectDoc, format: OutputFormat, pretty: bool) -> Result<String> {
    Ok(match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(doc)?,
        OutputFormat::Json => serde_json::to_string(doc)?,
        OutputFormat::Yaml => serde_yaml::to_string(doc)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PropertyNode, TypeDescriptor};

    fn doc() -> ObjectDoc {
        ObjectDoc {
            name: "Teacher".to_string(),
            doc: "Teacher teaches.".to_string(),
            properties: vec![PropertyNode::new(
                "$",
                TypeDescriptor {
                    name: "Teacher".to_string(),
                    structural_kind: "struct".to_string(),
                    namespace: "school::models".to_string(),
                },
            )],
            examples: Vec::new(),
        }
    }

    #[test]
    fn test_render_formats() {
        let compact = render(&doc(), OutputFormat::Json, false).unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.contains("\"structuralKind\":\"struct\""));

        let pretty = render(&doc(), OutputFormat::Json, true).unwrap();
        assert!(pretty.contains("\n  \"name\": \"Teacher\""));

        let yaml = render(&doc(), OutputFormat::Yaml, true).unwrap();
        assert!(yaml.contains("name: Teacher"));
        assert!(yaml.contains("structuralKind: struct"));
    }
}
