//! Summarizer trait and implementations for hosted chat-completion services.

pub mod mock;
pub mod openai;
pub mod relay;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub use openai::ChatCompletionClient;
pub use relay::RelayClient;

/// Maximum number of characters of extracted text sent for summarization.
pub const MAX_INPUT_CHARS: usize = 3000;

/// System instruction sent with every summarization request.
pub const SYSTEM_PROMPT: &str = "Summarize this document in under 150 words.";

/// Returned when the service answers without any message content.
pub const EMPTY_SUMMARY_FALLBACK: &str = "No summary generated.";

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate limited (429)")]
    RateLimited,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("{0}")]
    Upstream(String),
}

/// A service that turns extracted document text into a short summary.
pub trait Summarizer: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Summarize `text`. Implementations send at most [`MAX_INPUT_CHARS`]
    /// characters of it.
    fn summarize<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummaryError>> + Send + 'a>>;
}

/// Return the prefix of `text` holding its first `max_chars` characters.
///
/// Cuts on character boundaries, so the result is always a byte-for-byte
/// prefix of the input.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Map a non-success HTTP response to a [`SummaryError`].
pub(crate) async fn error_for_status(resp: reqwest::Response) -> SummaryError {
    let status = resp.status();
    if status.as_u16() == 429 {
        return SummaryError::RateLimited;
    }
    let body = resp.text().await.unwrap_or_default();
    SummaryError::Status {
        status: status.as_u16(),
        body,
    }
}
