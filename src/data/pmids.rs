//! Source reader for the PMID input list.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Read the ordered PMID list: one identifier per line, trimmed, blank
/// lines dropped. Tokens are not validated; whatever appears on a line is
/// later sent as-is to both Europe PMC services.
pub fn read_pmids(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading PMID list {}", path.display()))?;

    let pmids: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    info!(path = %path.display(), count = pmids.len(), "loaded PMID list");
    Ok(pmids)
}
