//! `mystpub publish` command implementation.

use std::path::PathBuf;

use clap::Args;
use mystpub_config::Config;
use mystpub_confluence::{
    ConfluenceClient, ConfluenceSink, DryRunSink, PageOutcome, PublishReport, SitePublisher,
};
use mystpub_myst::{CommandParser, DocumentParser, JsonFileParser};
use mystpub_site::Site;

use super::ProjectArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Read pre-generated JSON ASTs from this directory instead of running
    /// the parser.
    #[arg(long)]
    json_dir: Option<PathBuf>,

    /// Render pages without publishing them.
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output (shows INFO level logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if the structure cannot be built, Confluence is not
    /// configured, or any page failed to publish.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.project.load(self.json_dir.clone())?;
        let project = &config.project_resolved;

        let site = Site::load(&project.toc, &project.source_dir)?;
        output.info(&format!(
            "Publishing {} pages from {}...",
            site.structure().len(),
            project.toc.display()
        ));

        let parser = create_parser(&config)?;
        let publisher = SitePublisher::new(&site, parser.as_ref());

        let report = if self.dry_run {
            let mut sink = DryRunSink::new();
            let report = publisher.publish_all(&mut sink);
            output.highlight("\n[DRY RUN] No changes made.");
            report
        } else {
            let confluence = config.require_confluence()?;
            let client = ConfluenceClient::from_config(confluence);
            let mut sink = ConfluenceSink::new(&client, confluence);
            publisher.publish_all(&mut sink)
        };

        print_report(&output, &report);

        if report.is_success() {
            Ok(())
        } else {
            Err(CliError::PublishFailed {
                failed: report.failed().len(),
                total: report.len(),
            })
        }
    }
}

fn create_parser(config: &Config) -> Result<Box<dyn DocumentParser>, CliError> {
    let parser_config = &config.parser_resolved;
    Ok(match &parser_config.json_dir {
        Some(json_dir) => Box::new(
            JsonFileParser::new(config.project_resolved.source_dir.clone())
                .with_json_dir(json_dir.clone()),
        ),
        None => Box::new(CommandParser::new(&parser_config.command)?),
    })
}

fn print_report(output: &Output, report: &PublishReport) {
    for (slug, outcome) in report.outcomes() {
        match outcome {
            PageOutcome::Published { page, unresolved } => {
                let location = page.url.as_deref().unwrap_or(&page.id);
                output.info(&format!("  {slug} {}", output.dimmed(location)));
                for token in unresolved {
                    output.warning(&format!("    unresolved reference: {token}"));
                }
            }
            PageOutcome::Failed(error) => {
                output.error(&format!("  {slug} failed: {error}"));
            }
        }
    }

    output.separator();
    let failed = report.failed().len();
    let summary = format!(
        "{} succeeded, {failed} failed, {} unresolved references",
        report.succeeded(),
        report.unresolved_count()
    );
    if failed == 0 {
        output.success(&summary);
    } else {
        output.error(&summary);
    }
}
