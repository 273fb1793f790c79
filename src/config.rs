//! Runtime configuration utilities for citemap.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

/// Stage toggles recognised in the optional `config.json` file.
///
/// Absent fields and an absent file both fall back to `true`, so the file
/// only needs to name the stages it turns off.
#[derive(Debug, Clone, Deserialize)]
pub struct RunToggles {
    /// Run the fetch stages (when `false`, persisted artifacts are reused).
    #[serde(default = "default_true")]
    pub fetch_data: bool,
    /// Render the chart at the end of a run.
    #[serde(default = "default_true")]
    pub plot_data: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RunToggles {
    fn default() -> Self {
        Self {
            fetch_data: true,
            plot_data: true,
        }
    }
}

impl RunToggles {
    /// Parse the toggle file; a missing file means everything stays on.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Application configuration resolved from `.env`, the environment and the
/// optional `config.json`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Contact email advertised in the request user-agent.
    pub contact_email: String,
    /// Europe PMC Annotations API base URL.
    pub annotations_base: String,
    /// Europe PMC article REST base URL (citations endpoint).
    pub rest_base: String,
    /// Bound on in-flight requests per fetch stage.
    pub concurrency: usize,
    /// Total attempts per PMID, first try included.
    pub retry_attempts: usize,
    /// Delay before the first retry.
    pub retry_base: Duration,
    /// Ceiling applied to every retry delay.
    pub retry_max: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Artifact age below which a fetch stage is skipped.
    pub freshness_window: Duration,
    /// Root folder for persisted data artifacts.
    pub data_dir: PathBuf,
    /// Root folder for rendered outputs.
    pub outputs_dir: PathBuf,
    /// Stage toggles from `config.json`.
    pub toggles: RunToggles,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let contact_email =
            env::var("CITEMAP_EMAIL").unwrap_or_else(|_| "research@example.com".to_string());
        let annotations_base = env::var("CITEMAP_ANNOTATIONS_URL")
            .unwrap_or_else(|_| "https://www.ebi.ac.uk/europepmc/annotations_api".to_string());
        let rest_base = env::var("CITEMAP_REST_URL")
            .unwrap_or_else(|_| "https://www.ebi.ac.uk/europepmc/webservices/rest".to_string());
        let concurrency = env_parse("CITEMAP_CONCURRENCY", 16);
        let retry_attempts = env_parse("CITEMAP_RETRY_ATTEMPTS", 5);
        let retry_base = Duration::from_millis(env_parse("CITEMAP_RETRY_BASE_MS", 4_000));
        let retry_max = Duration::from_millis(env_parse("CITEMAP_RETRY_MAX_MS", 10_000));
        let request_timeout = Duration::from_secs(env_parse("CITEMAP_TIMEOUT_SECS", 30));
        let freshness_days: u64 = env_parse("CITEMAP_FRESHNESS_DAYS", 7);
        let data_dir = env::var("CITEMAP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let outputs_dir = env::var("CITEMAP_OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let config_path = env::var("CITEMAP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.json"));
        let toggles = RunToggles::from_file(&config_path)?;

        std::fs::create_dir_all(&data_dir).context("creating data dir")?;
        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            contact_email,
            annotations_base,
            rest_base,
            concurrency: concurrency.max(1),
            retry_attempts: retry_attempts.max(1),
            retry_base,
            retry_max,
            request_timeout,
            freshness_window: Duration::from_secs(freshness_days * 24 * 60 * 60),
            data_dir,
            outputs_dir,
            toggles,
        })
    }

    /// Convenience helper for derived data path segments.
    pub fn join_data<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.data_dir.join(path)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }

    /// PMID → annotation names artifact.
    pub fn names_artifact(&self) -> PathBuf {
        self.join_data("pmids_with_names.txt")
    }

    /// Single-line unique-name summary.
    pub fn unique_names_artifact(&self) -> PathBuf {
        self.join_data("unique_names_count.txt")
    }

    /// PMID → citation count artifact.
    pub fn counts_artifact(&self) -> PathBuf {
        self.join_data("pmid_citation_counts.txt")
    }

    /// Name → cumulative citation weight report.
    pub fn report_artifact(&self) -> PathBuf {
        self.join_data("names_with_citation_counts.txt")
    }

    /// Ranked top names, one per line.
    pub fn top_names_artifact(&self) -> PathBuf {
        self.join_data("citation_top_100_names.txt")
    }

    /// Rendered bar chart.
    pub fn plot_artifact(&self) -> PathBuf {
        self.join_output("names_with_citation_counts_plot.png")
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
