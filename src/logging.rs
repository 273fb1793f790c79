//! Tracing bootstrap shared by the binary and the integration tests.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the process-wide subscriber: `RUST_LOG`-style filtering with an
/// `info` default and RFC 3339 UTC timestamps.
///
/// Repeated calls are no-ops, so tests may call this freely.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(filter),
        )
        .init();
    Ok(())
}
