//! CLI entry-point for recomputing the aggregated report.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, report};

/// Args for the `aggregate` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Number of ranked names kept in the top-names artifact.
    #[arg(long, default_value_t = 100)]
    pub top: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    report::build_report(&settings, args.top)?;
    Ok(())
}
