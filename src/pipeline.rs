//! Fetch → parse → render, once per request.
use thiserror::Error;

use crate::feed::{parse_feed, FeedFetcher, FetchError, ParseError, ParseResult, Sleeper};
use crate::placefile;

/// Failures that abort placefile generation. Per-entry problems never do.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch alert feed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Failed to parse alert feed: {0}")]
    Parse(#[from] ParseError),
}

/// Produces a fresh placefile from the upstream feed.
///
/// # Errors
///
/// - `PipelineError::Fetch` if the feed could not be retrieved after all
///   attempts
/// - `PipelineError::Parse` if the body is not a well-formed document
///
/// Entries that cannot be decoded or rendered are skipped and never fail
/// the call.
pub async fn generate<S: Sleeper>(fetcher: &FeedFetcher<S>) -> Result<String, PipelineError> {
    let doc = fetcher.fetch().await?;
    let ParseResult { entries, skipped } = parse_feed(&doc.bytes)?;

    tracing::info!(
        alerts = entries.len(),
        skipped = skipped,
        bytes = doc.bytes.len(),
        "Generated placefile"
    );

    Ok(placefile::render(&entries))
}
