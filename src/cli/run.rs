//! CLI entry-point for the end-to-end pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data::{annotations, citations, pmids},
    report,
};

/// Args for the `run` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Path to the PMID list, one identifier per line.
    #[arg(long, default_value = "pmids.txt")]
    pub pmids: PathBuf,
    /// Refetch both artifacts even when they are fresh.
    #[arg(long)]
    pub force: bool,
    /// Number of ranked names kept in the top-names artifact and chart.
    #[arg(long, default_value_t = 100)]
    pub top: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let pmids = pmids::read_pmids(&args.pmids)?;

    if settings.toggles.fetch_data {
        annotations::refresh(&settings, &pmids, args.force).await?;
        citations::refresh(&settings, &pmids, args.force).await?;
    } else {
        info!("fetch_data disabled, reusing persisted artifacts");
    }

    let ranked = report::build_report(&settings, args.top)?;

    if settings.toggles.plot_data {
        report::plot::render_bar_chart(&ranked, &settings.plot_artifact())?;
    } else {
        info!("plot_data disabled, skipping chart");
    }

    Ok(())
}
