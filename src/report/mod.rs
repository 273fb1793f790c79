//! Aggregation of persisted fetch artifacts into the citation-weight report.

pub mod plot;

use std::{collections::HashSet, path::Path};

use anyhow::Result;
use indexmap::IndexMap;
use tracing::info;

use crate::{config::Settings, data::artifacts};

/// Observability counters for one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Lines skipped while parsing the names artifact.
    pub malformed_name_lines: usize,
    /// Lines skipped while parsing the counts artifact.
    pub malformed_count_lines: usize,
    /// PMIDs with names but no citation count; they contribute nothing.
    pub pmids_without_counts: usize,
    /// PMIDs that contributed weight to the report.
    pub pmids_joined: usize,
}

/// Name → cumulative citation weight, plus how the join went.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub weights: IndexMap<String, u64>,
    pub stats: JoinStats,
}

/// Join names against citation counts: every occurrence of a name adds the
/// citation count of the PMID it was tagged on. Result order follows the
/// first-seen traversal of the names map; PMIDs present on only one side
/// contribute nothing.
pub fn aggregate(
    names: &IndexMap<String, Vec<String>>,
    counts: &IndexMap<String, u64>,
) -> Aggregation {
    let mut weights: IndexMap<String, u64> = IndexMap::new();
    let mut stats = JoinStats::default();

    for (pmid, tag_names) in names {
        let Some(count) = counts.get(pmid) else {
            stats.pmids_without_counts += 1;
            continue;
        };
        stats.pmids_joined += 1;
        for name in tag_names {
            *weights.entry(name.clone()).or_insert(0) += *count;
        }
    }

    Aggregation { weights, stats }
}

/// Artifact-level aggregation: parse both files tolerantly and join them.
/// Always recomputed from what is on disk, never from in-memory leftovers.
pub fn aggregate_files(names_path: &Path, counts_path: &Path) -> Result<Aggregation> {
    let names = artifacts::read_names(names_path)?;
    let counts = artifacts::read_counts(counts_path)?;

    let mut aggregation = aggregate(&names.entries, &counts.entries);
    aggregation.stats.malformed_name_lines = names.skipped;
    aggregation.stats.malformed_count_lines = counts.skipped;

    info!(
        names = names.entries.len(),
        counts = counts.entries.len(),
        joined = aggregation.stats.pmids_joined,
        unjoined = aggregation.stats.pmids_without_counts,
        skipped_lines = names.skipped + counts.skipped,
        "aggregated citation weights"
    );
    Ok(aggregation)
}

/// Distinct names across every record.
pub fn unique_name_count(records: &IndexMap<String, Vec<String>>) -> usize {
    let mut seen = HashSet::new();
    for name in records.values().flatten() {
        seen.insert(name.as_str());
    }
    seen.len()
}

/// Ranked top-N view: descending weight, ties keep first-seen order.
pub fn top_names(weights: &IndexMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> =
        weights.iter().map(|(name, w)| (name.clone(), *w)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

/// Aggregate the persisted artifacts, write the report and ranked-names
/// files, and hand back the ranked view used by the chart.
pub fn build_report(settings: &Settings, top: usize) -> Result<Vec<(String, u64)>> {
    let aggregation = aggregate_files(&settings.names_artifact(), &settings.counts_artifact())?;
    artifacts::write_counts(&settings.report_artifact(), &aggregation.weights)?;

    let ranked = top_names(&aggregation.weights, top);
    artifacts::write_ranked_names(&settings.top_names_artifact(), &ranked)?;
    Ok(ranked)
}
