//! CLI entry-point for rendering the citation-weight chart.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, data::artifacts, report};

/// Args for the `plot` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Number of ranked names drawn on the chart.
    #[arg(long, default_value_t = 100)]
    pub top: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let parsed = artifacts::read_counts(&settings.report_artifact())?;
    let ranked = report::top_names(&parsed.entries, args.top);
    report::plot::render_bar_chart(&ranked, &settings.plot_artifact())
}
