//! `mystpub structure` command implementation.

use clap::Args;
use mystpub_site::{PageStructure, build_structure};
use serde_json::json;

use super::ProjectArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the structure command.
#[derive(Args)]
pub(crate) struct StructureArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Print the structure as JSON.
    #[arg(long)]
    json: bool,
}

impl StructureArgs {
    /// Execute the structure command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or TOC cannot be loaded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.project.load(None)?;
        let project = &config.project_resolved;

        let structure = build_structure(&project.toc, &project.source_dir)?;

        if self.json {
            output.data(&to_json(&structure)?);
        } else {
            print_tree(&output, &structure);
        }
        Ok(())
    }
}

fn to_json(structure: &PageStructure) -> Result<String, CliError> {
    let value = json!({
        "title": structure.title(),
        "pages": structure.pages(),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn tree_lines(structure: &PageStructure) -> Vec<String> {
    structure
        .pages()
        .iter()
        .map(|page| {
            let kind = if page.is_section() { " [section]" } else { "" };
            format!(
                "{}{} ({}){kind}",
                "  ".repeat(page.level),
                page.title,
                page.slug
            )
        })
        .collect()
}

fn print_tree(output: &Output, structure: &PageStructure) {
    if let Some(title) = structure.title() {
        output.highlight(title);
    }
    for line in tree_lines(structure) {
        output.data(&line);
    }
    output.info(&output.dimmed(&format!("\n{} pages", structure.len())));
}
