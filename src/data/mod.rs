//! Data acquisition and artifact persistence layer.

pub mod annotations;
pub mod artifacts;
pub mod citations;
pub mod pmids;
pub mod retry;

use std::future::Future;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{info, warn};

use crate::{config::Settings, error::FetchError};

use self::retry::{with_retry, RetryPolicy};

/// Build the HTTP session shared by every branch of a fetch stage. The
/// user-agent carries a contact address, as Europe PMC asks of clients.
pub fn http_client(settings: &Settings) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(format!("citemap/0.1 (+{})", settings.contact_email))
        .timeout(settings.request_timeout)
        .gzip(true)
        .brotli(true)
        .build()?)
}

/// Per-PMID result of one logical fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// The service answered successfully and the payload parsed.
    Fetched(T),
    /// The service answered with a non-success status: no data for this
    /// PMID. Not an error and not retried.
    Missing(StatusCode),
}

/// Settled tally of one fetch stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    /// PMIDs whose payload was fetched and parsed.
    pub fetched: usize,
    /// PMIDs the service answered with a non-success status.
    pub missing: usize,
    /// PMIDs dropped after retry exhaustion or a malformed payload.
    pub failed: usize,
}

/// Issue one GET with transport-level retries. A success status yields the
/// body text; any other status yields `Missing` without re-entering the
/// retry loop. `request` rebuilds the request for each attempt.
pub(crate) async fn fetch_text(
    request: impl Fn() -> RequestBuilder,
    retry: &RetryPolicy,
    pmid: &str,
) -> Result<FetchOutcome<String>, FetchError> {
    let attempt = with_retry(retry, || async {
        let response = request().send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(Err(status));
        }
        response.text().await.map(Ok)
    })
    .await;

    match attempt {
        Ok(Ok(body)) => Ok(FetchOutcome::Fetched(body)),
        Ok(Err(status)) => Ok(FetchOutcome::Missing(status)),
        Err(source) => Err(FetchError::RetryExhausted {
            pmid: pmid.to_string(),
            attempts: retry.attempts,
            source,
        }),
    }
}

/// Dispatch one fetch per PMID with bounded fan-out and wait for every
/// branch to settle. `buffered` keeps completion order aligned with the
/// input list, so artifact insertion order is deterministic. Per-PMID
/// failures are logged and tallied, never fatal to the stage.
pub(crate) async fn settle_stage<T, F, Fut>(
    stage: &str,
    pmids: &[String],
    concurrency: usize,
    fetch: F,
) -> (IndexMap<String, T>, StageStats)
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<FetchOutcome<T>, FetchError>>,
{
    let outcomes = stream::iter(pmids.iter().cloned())
        .map(|pmid| {
            let fut = fetch(pmid.clone());
            async move { (pmid, fut.await) }
        })
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    let mut records = IndexMap::new();
    let mut stats = StageStats::default();
    for (pmid, outcome) in outcomes {
        match outcome {
            Ok(FetchOutcome::Fetched(value)) => {
                stats.fetched += 1;
                records.insert(pmid, value);
            }
            Ok(FetchOutcome::Missing(status)) => {
                stats.missing += 1;
                warn!(%pmid, %status, stage, "service returned no data");
            }
            Err(err) => {
                stats.failed += 1;
                warn!(%pmid, error = %err, stage, "dropping PMID after fetch failure");
            }
        }
    }

    info!(
        stage,
        fetched = stats.fetched,
        missing = stats.missing,
        failed = stats.failed,
        "fetch stage settled"
    );
    (records, stats)
}
