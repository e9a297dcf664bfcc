use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{MAX_INPUT_CHARS, SummaryError, Summarizer, truncate_chars};

/// Body of `POST /api/summarize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: String,
}

/// Success body of `POST /api/summarize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Error body returned by the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Summarizer that forwards text to a `pdfsum-relay` instance.
///
/// The relay owns the model credential, so this client never sees it.
pub struct RelayClient {
    client: reqwest::Client,
    relay_url: String,
    timeout: Duration,
}

impl RelayClient {
    pub fn new(client: reqwest::Client, relay_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            relay_url: relay_url.into(),
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/summarize", self.relay_url.trim_end_matches('/'))
    }
}

impl Summarizer for RelayClient {
    fn name(&self) -> &str {
        "relay"
    }

    fn summarize<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummaryError>> + Send + 'a>> {
        Box::pin(async move {
            let body = SummarizeRequest {
                text: truncate_chars(text, MAX_INPUT_CHARS).to_string(),
            };

            tracing::info!(
                relay = %self.relay_url,
                chars = body.text.chars().count(),
                "sending document text to summary relay"
            );

            let resp = self
                .client
                .post(self.endpoint())
                .timeout(self.timeout)
                .json(&body)
                .send()
                .await?;

            let status = resp.status();
            if status.as_u16() == 429 {
                return Err(SummaryError::RateLimited);
            }
            if !status.is_success() {
                let message = resp
                    .json::<ErrorResponse>()
                    .await
                    .map(|e| e.error)
                    .unwrap_or_else(|_| format!("HTTP {}", status));
                return Err(SummaryError::Upstream(message));
            }

            let data: SummarizeResponse = resp
                .json()
                .await
                .map_err(|e| SummaryError::Decode(e.to_string()))?;
            Ok(data.summary)
        })
    }
}
