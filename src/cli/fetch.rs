//! CLI entry-point for fetching annotation and citation artifacts.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    cli::FetchStage,
    config::Settings,
    data::{annotations, citations, pmids},
};

/// Args for the `fetch` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Path to the PMID list, one identifier per line.
    #[arg(long, default_value = "pmids.txt")]
    pub pmids: PathBuf,
    /// Which fetch stages to run.
    #[arg(long, default_value = "all", value_enum)]
    pub only: FetchStage,
    /// Refetch even when the artifact is fresh.
    #[arg(long)]
    pub force: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let pmids = pmids::read_pmids(&args.pmids)?;

    if args.only.includes_annotations() {
        annotations::refresh(&settings, &pmids, args.force).await?;
    }
    if args.only.includes_citations() {
        citations::refresh(&settings, &pmids, args.force).await?;
    }

    Ok(())
}
