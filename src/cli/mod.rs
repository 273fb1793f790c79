//! Command-line interface wiring for citemap.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Settings;

pub mod aggregate;
pub mod fetch;
pub mod plot;
pub mod run;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Europe PMC citation-weight aggregator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Run(args) => run::run(args, settings).await,
            Commands::Fetch(args) => fetch::run(args, settings).await,
            Commands::Aggregate(args) => aggregate::run(args, settings).await,
            Commands::Plot(args) => plot::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the staleness-gated fetch → aggregate → report pipeline.
    Run(run::Args),
    /// Fetch annotation and citation artifacts explicitly.
    Fetch(fetch::Args),
    /// Recompute the aggregated report from persisted artifacts.
    Aggregate(aggregate::Args),
    /// Render the citation-weight chart from the persisted report.
    Plot(plot::Args),
}

/// Stage selector for the `fetch` sub-command.
#[derive(Clone, Debug, ValueEnum)]
pub enum FetchStage {
    /// Annotation names only.
    Annotations,
    /// Citation counts only.
    Citations,
    /// Both stages, annotations first.
    All,
}

impl FetchStage {
    pub fn includes_annotations(&self) -> bool {
        matches!(self, Self::Annotations | Self::All)
    }

    pub fn includes_citations(&self) -> bool {
        matches!(self, Self::Citations | Self::All)
    }
}
