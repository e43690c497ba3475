use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use super::types::RawFeedDocument;
use crate::config::Config;

/// Media type requested from the upstream feed.
pub const ACCEPT_ATOM: &str = "application/atom+xml";

/// Errors that can occur while fetching the alert feed.
///
/// Only the last attempt's error is reported once retries run out.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, truncated body, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Upstream answered with a 5xx status on the final attempt
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Attempt exceeded the per-attempt timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Header values from config could not be used
    #[error("Invalid request header: {0}")]
    InvalidHeader(String),
}

impl FetchError {
    /// Returns true if another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Network(_) => true,
            FetchError::HttpStatus(status) => *status >= 500,
            FetchError::ResponseTooLarge(_) | FetchError::InvalidHeader(_) => false,
        }
    }
}

/// Waits between fetch attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Retry and transport settings for [`FeedFetcher`].
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub max_body_bytes: usize,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

impl From<&Config> for FetchPolicy {
    fn from(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.request_timeout_secs),
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            ..Self::default()
        }
    }
}

/// Fetches the alert feed document with a bounded, fixed-delay retry loop.
#[derive(Debug, Clone)]
pub struct FeedFetcher<S = TokioSleeper> {
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
    policy: FetchPolicy,
    sleeper: S,
}

impl FeedFetcher<TokioSleeper> {
    /// Builds a fetcher for the configured feed URL and identifying headers.
    pub fn from_config(client: reqwest::Client, config: &Config) -> Result<Self, FetchError> {
        Self::new(
            client,
            &config.feed_url,
            &config.user_agent,
            FetchPolicy::from(config),
        )
    }

    pub fn new(
        client: reqwest::Client,
        url: &str,
        user_agent: &str,
        policy: FetchPolicy,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| FetchError::InvalidHeader(e.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_ATOM));

        Ok(Self {
            client,
            url: url.to_string(),
            headers,
            policy,
            sleeper: TokioSleeper,
        })
    }
}

impl<S: Sleeper> FeedFetcher<S> {
    /// Replaces the sleeper used between attempts.
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> FeedFetcher<T> {
        FeedFetcher {
            client: self.client,
            url: self.url,
            headers: self.headers,
            policy: self.policy,
            sleeper,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Retrieves the feed document.
    ///
    /// Transport errors, timeouts and 5xx responses are retried up to
    /// `max_attempts` in total with a fixed delay in between. Any other
    /// response, 4xx included, is returned as-is without retrying.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt once attempts run out:
    /// - `FetchError::Network` if the request could not be sent or read
    /// - `FetchError::Timeout` if an attempt exceeded the per-attempt timeout
    /// - `FetchError::HttpStatus` if the upstream kept answering with a 5xx
    ///
    /// `FetchError::ResponseTooLarge` is returned immediately, without retry.
    pub async fn fetch(&self) -> Result<RawFeedDocument, FetchError> {
        let mut attempt: u32 = 1;

        loop {
            match self.attempt().await {
                Ok(doc) => {
                    if !(200..300).contains(&doc.status) {
                        tracing::warn!(
                            url = %self.url,
                            status = doc.status,
                            "Feed returned non-success status, passing body through"
                        );
                    }
                    return Ok(doc);
                }
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    tracing::warn!(
                        url = %self.url,
                        error = %e,
                        attempt = attempt,
                        delay_secs = self.policy.retry_delay.as_secs(),
                        "Feed fetch failed, retrying after delay"
                    );
                    self.sleeper.sleep(self.policy.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        url = %self.url,
                        error = %e,
                        attempts = attempt,
                        "Feed fetch failed"
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(&self) -> Result<RawFeedDocument, FetchError> {
        tokio::time::timeout(self.policy.timeout, self.send_and_read())
            .await
            .map_err(|_| FetchError::Timeout)?
    }

    async fn send_and_read(&self) -> Result<RawFeedDocument, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, self.policy.max_body_bytes).await?;
        Ok(RawFeedDocument::new(bytes, status.as_u16()))
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
