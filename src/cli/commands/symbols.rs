//! Symbols Command
//!
//! List the modules and declarations found under the project root.

use serde::Serialize;

use crate::cli::ui::output::Output;
use crate::cli::util::CommandContext;
use crate::store::DeclarationStore;
use crate::types::{Declaration, Result};

#[derive(Debug, Serialize)]
struct ModuleListing<'a> {
    namespace: &'a str,
    file: String,
    declarations: Vec<&'a Declaration>,
}

pub fn run(ctx: &CommandContext, filter: Option<&str>, format: &str) -> Result<()> {
    let store = ctx.load_store()?;
    let listings = listings(&store, filter);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    let out = Output::new();
    if listings.is_empty() {
        out.info("No type declarations found");
        return Ok(());
    }
    out.header(&format!(
        "{} module(s), {} declaration(s)",
        listings.len(),
        listings.iter().map(|l| l.declarations.len()).sum::<usize>()
    ));
    for listing in &listings {
        out.section(&format!("{} ({})", listing.namespace, listing.file));
        for declaration in &listing.declarations {
            let summary = declaration.doc.lines().next().unwrap_or_default();
            out.item(
                &format!("{} {}", declaration.kind, declaration.name),
                summary,
            );
        }
    }
    Ok(())
}

fn listings<'a>(store: &'a DeclarationStore, filter: Option<&str>) -> Vec<ModuleListing<'a>> {
    store
        .modules()
        .filter(|m| match filter {
            Some(prefix) => m.namespace.starts_with(prefix),
            None => !m.dependency,
        })
        .map(|m| ModuleListing {
            namespace: &m.namespace,
            file: m
                .file
                .strip_prefix(store.root())
                .unwrap_or(&m.file)
                .display()
                .to_string(),
            declarations: m.declarations().iter().filter(|d| d.kind.is_type()).collect(),
        })
        .filter(|l| !l.declarations.is_empty())
        .collect()
}
