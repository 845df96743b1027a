//! CLI command implementations.

pub(crate) mod publish;
pub(crate) mod structure;

pub(crate) use publish::PublishArgs;
pub(crate) use structure::StructureArgs;

use std::path::PathBuf;

use clap::Args;
use mystpub_config::{CliSettings, Config};

use crate::error::CliError;

/// Options shared by all commands.
#[derive(Args)]
pub(crate) struct ProjectArgs {
    /// Path to configuration file (default: auto-discover mystpub.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TOC description file (overrides config).
    #[arg(long)]
    toc: Option<PathBuf>,

    /// Base directory for TOC paths (overrides config).
    #[arg(long)]
    source_dir: Option<PathBuf>,
}

impl ProjectArgs {
    /// Load configuration with command line overrides applied.
    pub(crate) fn load(&self, json_dir: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            toc: self.toc.clone(),
            source_dir: self.source_dir.clone(),
            json_dir,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}
