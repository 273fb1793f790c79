//! Annotation names from the Europe PMC Annotations API.

use anyhow::Result;
use indexmap::IndexMap;
use reqwest::{header::ACCEPT, Client};
use serde::Deserialize;
use tracing::info;

use crate::{
    config::Settings,
    data::{
        artifacts, fetch_text, http_client, retry::RetryPolicy, settle_stage, FetchOutcome,
        StageStats,
    },
    error::FetchError,
    report,
};

/// Client for the Europe PMC Annotations API.
#[derive(Debug, Clone)]
pub struct AnnotationClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl AnnotationClient {
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
            settings.annotations_base.clone(),
            RetryPolicy::from_settings(settings),
        ))
    }

    /// Fetch every accession-number name tagged on one article.
    ///
    /// Duplicates across tags are kept, in document order; the aggregation
    /// step counts each occurrence.
    pub async fn fetch_names(&self, pmid: &str) -> Result<FetchOutcome<Vec<String>>, FetchError> {
        let url = format!("{}/annotationsByArticleIds", self.base_url);
        let article_id = format!("MED:{pmid}");

        let outcome = fetch_text(
            || {
                self.client
                    .get(&url)
                    .query(&[
                        ("articleIds", article_id.as_str()),
                        ("type", "Accession Numbers"),
                        ("subType", "bioproject"),
                        ("format", "JSON"),
                    ])
                    .header(ACCEPT, "application/json")
            },
            &self.retry,
            pmid,
        )
        .await?;

        let body = match outcome {
            FetchOutcome::Fetched(body) => body,
            FetchOutcome::Missing(status) => return Ok(FetchOutcome::Missing(status)),
        };

        let articles: Vec<AnnotatedArticle> =
            serde_json::from_str(&body).map_err(|err| FetchError::MalformedPayload {
                pmid: pmid.to_string(),
                detail: err.to_string(),
            })?;
        Ok(FetchOutcome::Fetched(flatten_names(&articles)))
    }
}

/// Fetch names for every PMID with bounded fan-out; the stage settles every
/// request and never aborts on a single failure.
pub async fn fetch_all(
    client: &AnnotationClient,
    pmids: &[String],
    concurrency: usize,
) -> (IndexMap<String, Vec<String>>, StageStats) {
    settle_stage("annotations", pmids, concurrency, |pmid| async move {
        client.fetch_names(&pmid).await
    })
    .await
}

/// Staleness-gated annotation stage: reuse a fresh artifact, otherwise
/// fetch everything and persist the names and unique-count files. Returns
/// the stage tally, or `None` when the artifact was reused.
pub async fn refresh(
    settings: &Settings,
    pmids: &[String],
    force: bool,
) -> Result<Option<StageStats>> {
    let path = settings.names_artifact();
    if !force && artifacts::is_fresh(&path, settings.freshness_window) {
        let modified = artifacts::last_modified(&path)
            .map(|m| m.to_rfc3339())
            .unwrap_or_default();
        info!(path = %path.display(), %modified, "names artifact fresh, skipping annotation fetch");
        return Ok(None);
    }

    let client = AnnotationClient::from_settings(settings)?;
    let (records, stats) = fetch_all(&client, pmids, settings.concurrency).await;
    artifacts::write_names(&path, &records)?;

    let unique = report::unique_name_count(&records);
    artifacts::write_unique_names_count(&settings.unique_names_artifact(), unique)?;
    info!(unique, "annotation stage persisted");
    Ok(Some(stats))
}

#[derive(Debug, Deserialize)]
struct AnnotatedArticle {
    #[serde(default)]
    annotations: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
struct Annotation {
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

fn flatten_names(articles: &[AnnotatedArticle]) -> Vec<String> {
    articles
        .iter()
        .flat_map(|article| &article.annotations)
        .flat_map(|annotation| &annotation.tags)
        .map(|tag| tag.name.clone())
        .collect()
}
