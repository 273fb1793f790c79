//! Error taxonomy for the fetch layer.

use thiserror::Error;

/// Failures a fetch stage can surface for a single PMID.
///
/// Non-success HTTP statuses are not represented here: they mean the
/// service has no data for that PMID and the stage records it as missing.
/// Transport failures are retried internally, so only their terminal form
/// appears.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport retries exhausted without a usable response.
    #[error("retries exhausted for PMID {pmid} after {attempts} attempts: {source}")]
    RetryExhausted {
        pmid: String,
        attempts: usize,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered successfully but the payload did not match its
    /// schema. Never retried; the same bytes would fail again.
    #[error("malformed payload for PMID {pmid}: {detail}")]
    MalformedPayload { pmid: String, detail: String },
}

impl FetchError {
    /// PMID the failure belongs to.
    pub fn pmid(&self) -> &str {
        match self {
            Self::RetryExhausted { pmid, .. } => pmid,
            Self::MalformedPayload { pmid, .. } => pmid,
        }
    }
}
