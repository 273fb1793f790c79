//! Citation counts from the Europe PMC REST citations endpoint.

use anyhow::Result;
use indexmap::IndexMap;
use reqwest::{header::ACCEPT, Client};
use serde::Deserialize;
use tracing::info;
use urlencoding::encode;

use crate::{
    config::Settings,
    data::{
        artifacts, fetch_text, http_client, retry::RetryPolicy, settle_stage, FetchOutcome,
        StageStats,
    },
    error::FetchError,
};

/// Client for the Europe PMC article REST service.
#[derive(Debug, Clone)]
pub struct CitationClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CitationClient {
    pub fn new(client: Client, base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            http_client(settings)?,
            settings.rest_base.clone(),
            RetryPolicy::from_settings(settings),
        ))
    }

    /// Fetch the citing-article count for one PMID.
    pub async fn fetch_count(&self, pmid: &str) -> Result<FetchOutcome<u64>, FetchError> {
        let url = format!("{}/MED/{}/citations", self.base_url, encode(pmid));

        let outcome = fetch_text(
            || {
                self.client
                    .get(&url)
                    .query(&[("page", "1"), ("pageSize", "25"), ("format", "xml")])
                    .header(ACCEPT, "application/xml")
            },
            &self.retry,
            pmid,
        )
        .await?;

        let body = match outcome {
            FetchOutcome::Fetched(body) => body,
            FetchOutcome::Missing(status) => return Ok(FetchOutcome::Missing(status)),
        };

        let wrapper: ResponseWrapper =
            quick_xml::de::from_str(&body).map_err(|err| FetchError::MalformedPayload {
                pmid: pmid.to_string(),
                detail: err.to_string(),
            })?;
        Ok(FetchOutcome::Fetched(wrapper.hit_count))
    }
}

/// Fetch citation counts for every PMID with bounded fan-out.
pub async fn fetch_all(
    client: &CitationClient,
    pmids: &[String],
    concurrency: usize,
) -> (IndexMap<String, u64>, StageStats) {
    settle_stage("citations", pmids, concurrency, |pmid| async move {
        client.fetch_count(&pmid).await
    })
    .await
}

/// Staleness-gated citation stage: reuse a fresh artifact, otherwise fetch
/// everything and persist the counts file. Returns the stage tally, or
/// `None` when the artifact was reused.
pub async fn refresh(
    settings: &Settings,
    pmids: &[String],
    force: bool,
) -> Result<Option<StageStats>> {
    let path = settings.counts_artifact();
    if !force && artifacts::is_fresh(&path, settings.freshness_window) {
        let modified = artifacts::last_modified(&path)
            .map(|m| m.to_rfc3339())
            .unwrap_or_default();
        info!(path = %path.display(), %modified, "counts artifact fresh, skipping citation fetch");
        return Ok(None);
    }

    let client = CitationClient::from_settings(settings)?;
    let (records, stats) = fetch_all(&client, pmids, settings.concurrency).await;
    artifacts::write_counts(&path, &records)?;
    Ok(Some(stats))
}

/// Typed envelope of the citations response; only the hit count is read,
/// the embedded citation page is skipped. Deserializing the document makes
/// a missing or non-numeric count a parse error instead of a silent zero.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseWrapper {
    hit_count: u64,
}
