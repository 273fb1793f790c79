//! Line-oriented `key: value` artifact persistence and the staleness gate.
//!
//! Every persisted mapping uses one `key: value` line per entry; the value
//! is either a comma-joined name list or a decimal count. Parsers are
//! tolerant: a line that does not fit the shape is warned about, counted
//! and skipped, never fatal.

use std::{fs::File, io::Write, path::Path, time::Duration};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{info, warn};

/// Parsed artifact plus the number of malformed lines skipped.
#[derive(Debug)]
pub struct Parsed<T> {
    pub entries: IndexMap<String, T>,
    pub skipped: usize,
}

/// True while the artifact exists and its age is under the window. Missing
/// files and unreadable metadata always count as stale.
pub fn is_fresh(path: &Path, window: Duration) -> bool {
    match artifact_age(path) {
        Some(age) => age < window,
        None => false,
    }
}

/// Last-modified instant of the artifact, if it exists.
pub fn last_modified(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(modified.into())
}

fn artifact_age(path: &Path) -> Option<Duration> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    // A clock skewed into the future reads as age zero.
    Some(modified.elapsed().unwrap_or_default())
}

/// Write PMID → names, one `pmid: name1, name2` line per record.
pub fn write_names(path: &Path, records: &IndexMap<String, Vec<String>>) -> Result<()> {
    let mut file = create_artifact(path)?;
    for (pmid, names) in records {
        writeln!(file, "{pmid}: {}", names.join(", "))?;
    }
    info!(path = %path.display(), entries = records.len(), "wrote names artifact");
    Ok(())
}

/// Parse PMID → names, skipping lines without a `:` separator.
pub fn read_names(path: &Path) -> Result<Parsed<Vec<String>>> {
    parse_lines(path, |value| {
        Some(
            value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    })
}

/// Write key → count, one `key: 42` line per entry. Shared by the per-PMID
/// citation counts and the final name → weight report.
pub fn write_counts(path: &Path, counts: &IndexMap<String, u64>) -> Result<()> {
    let mut file = create_artifact(path)?;
    for (key, count) in counts {
        writeln!(file, "{key}: {count}")?;
    }
    info!(path = %path.display(), entries = counts.len(), "wrote counts artifact");
    Ok(())
}

/// Parse key → count, skipping separator-less lines and lines whose value
/// is not a non-negative integer.
pub fn read_counts(path: &Path) -> Result<Parsed<u64>> {
    parse_lines(path, |value| value.parse().ok())
}

/// Write the single-line unique-name summary.
pub fn write_unique_names_count(path: &Path, count: usize) -> Result<()> {
    let mut file = create_artifact(path)?;
    writeln!(file, "Number of unique names: {count}")?;
    info!(path = %path.display(), count, "wrote unique-name summary");
    Ok(())
}

/// Write the ranked names, one name per line, weights omitted.
pub fn write_ranked_names(path: &Path, ranked: &[(String, u64)]) -> Result<()> {
    let mut file = create_artifact(path)?;
    for (name, _) in ranked {
        writeln!(file, "{name}")?;
    }
    info!(path = %path.display(), entries = ranked.len(), "wrote ranked names");
    Ok(())
}

fn create_artifact(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    File::create(path).with_context(|| format!("create {}", path.display()))
}

fn parse_lines<T>(path: &Path, parse_value: impl Fn(&str) -> Option<T>) -> Result<Parsed<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading artifact {}", path.display()))?;

    let mut entries = IndexMap::new();
    let mut skipped = 0usize;
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            warn!(path = %path.display(), line, "skipping line without separator");
            skipped += 1;
            continue;
        };
        let Some(value) = parse_value(value.trim()) else {
            warn!(path = %path.display(), line, "skipping line with malformed value");
            skipped += 1;
            continue;
        };
        entries.insert(key.trim().to_string(), value);
    }

    Ok(Parsed { entries, skipped })
}
