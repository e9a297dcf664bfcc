use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{
    EMPTY_SUMMARY_FALLBACK, MAX_INPUT_CHARS, SYSTEM_PROMPT, SummaryError, Summarizer,
    error_for_status, truncate_chars,
};

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Holds the bearer credential. Anything constructed with an API key should
/// run in a trusted process such as the relay, not in an end-user client.
pub struct ChatCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Build the two-message prompt for `text`.
pub(crate) fn build_request<'a>(model: &'a str, text: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: truncate_chars(text, MAX_INPUT_CHARS),
            },
        ],
    }
}

/// First choice's message content, or the fallback when there is none.
pub(crate) fn first_choice_content(resp: ChatResponse) -> String {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| EMPTY_SUMMARY_FALLBACK.to_string())
}

impl Summarizer for ChatCompletionClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    fn summarize<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummaryError>> + Send + 'a>> {
        Box::pin(async move {
            let api_key = self.api_key.as_deref().ok_or(SummaryError::MissingApiKey)?;
            let body = build_request(&self.model, text);

            tracing::info!(
                model = %self.model,
                chars = body.messages[1].content.chars().count(),
                "sending document text to chat-completion service"
            );

            let resp = self
                .client
                .post(self.endpoint())
                .bearer_auth(api_key)
                .timeout(self.timeout)
                .json(&body)
                .send()
                .await?;

            if !resp.status().is_success() {
                return Err(error_for_status(resp).await);
            }

            let data: ChatResponse = resp
                .json()
                .await
                .map_err(|e| SummaryError::Decode(e.to_string()))?;

            Ok(first_choice_content(data))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_has_system_and_truncated_user_message() {
        let text = "x".repeat(5000);
        let req = build_request("gpt-4o-mini", &text);
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        assert_eq!(req.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(req.messages[1].role, "user");
        assert_eq!(req.messages[1].content, &text[..3000]);
    }

    #[test]
    fn request_serializes_to_chat_completion_shape() {
        let req = build_request("m", "hello");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn first_choice_content_is_returned() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"A summary."}},
                           {"message":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(resp), "A summary.");
    }

    #[test]
    fn missing_content_falls_back() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":""}}]}"#,
        ] {
            let resp: ChatResponse = serde_json::from_str(body).unwrap();
            assert_eq!(first_choice_content(resp), EMPTY_SUMMARY_FALLBACK);
        }
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = ChatCompletionClient::new(
            reqwest::Client::new(),
            "https://api.example.com/v1/",
            None,
            "m",
            Duration::from_secs(5),
        );
        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");
    }
}
