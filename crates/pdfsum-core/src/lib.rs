use std::sync::Arc;
use std::time::Duration;

pub mod backend;
pub mod config_file;
pub mod state;
pub mod summary;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use state::{
    Command, DocumentState, Event, ExtractionStatus, NO_TEXT_PLACEHOLDER, SummaryStatus,
    Transition, reduce,
};
pub use summary::{
    ChatCompletionClient, MAX_INPUT_CHARS, RelayClient, SummaryError, Summarizer,
    truncate_chars,
};

use config_file::ConfigFile;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Resolved summarization settings.
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// When set, summaries are requested through this relay and the API key
    /// is never used by this process.
    pub relay_url: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("relay_url", &self.relay_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            relay_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Resolve settings from environment > config file > defaults.
    ///
    /// `env` looks up a variable by name; binaries pass
    /// `|k| std::env::var(k).ok()`.
    pub fn resolve(file: &ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let summary = file.summary.clone().unwrap_or_default();
        let defaults = Config::default();

        let non_empty = |v: String| if v.trim().is_empty() { None } else { Some(v) };

        Self {
            api_key: env("OPENAI_API_KEY").and_then(non_empty),
            model: env("PDFSUM_MODEL")
                .and_then(non_empty)
                .or(summary.model)
                .unwrap_or(defaults.model),
            base_url: env("PDFSUM_BASE_URL")
                .and_then(non_empty)
                .or(summary.base_url)
                .unwrap_or(defaults.base_url),
            relay_url: env("PDFSUM_RELAY_URL")
                .and_then(non_empty)
                .or(summary.relay_url),
            timeout_secs: env("PDFSUM_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .or(summary.timeout_secs)
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Build the summarizer described by `config`: the relay when one is
/// configured, otherwise a direct chat-completion client.
pub fn build_summarizer(config: &Config) -> Arc<dyn Summarizer> {
    let client = reqwest::Client::new();
    match &config.relay_url {
        Some(url) => {
            tracing::info!(relay = %url, "summaries go through relay");
            Arc::new(RelayClient::new(client, url.clone(), config.timeout()))
        }
        None => {
            if config.api_key.is_some() {
                tracing::warn!(
                    "no relay configured; the API credential is held by this process"
                );
            }
            Arc::new(ChatCompletionClient::new(
                client,
                config.base_url.clone(),
                config.api_key.clone(),
                config.model.clone(),
                config.timeout(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_file::SummaryConfig;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::resolve(&ConfigFile::default(), env_from(&[]));
        assert!(config.api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.relay_url.is_none());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn env_overrides_file() {
        let file = ConfigFile {
            summary: Some(SummaryConfig {
                model: Some("file-model".into()),
                relay_url: Some("http://file-relay".into()),
                timeout_secs: Some(15),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = Config::resolve(
            &file,
            env_from(&[("PDFSUM_MODEL", "env-model"), ("OPENAI_API_KEY", "sk-test")]),
        );
        assert_eq!(config.model, "env-model");
        assert_eq!(config.relay_url.as_deref(), Some("http://file-relay"));
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let config = Config::resolve(
            &ConfigFile::default(),
            env_from(&[("OPENAI_API_KEY", "  "), ("PDFSUM_RELAY_URL", "")]),
        );
        assert!(config.api_key.is_none());
        assert!(config.relay_url.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = Config {
            api_key: Some("sk-secret".into()),
            ..Config::default()
        };
        let out = format!("{:?}", config);
        assert!(!out.contains("sk-secret"));
        assert!(out.contains("***"));
    }

    #[test]
    fn builds_relay_when_configured() {
        let config = Config {
            relay_url: Some("http://127.0.0.1:5002".into()),
            ..Config::default()
        };
        assert_eq!(build_summarizer(&config).name(), "relay");
        assert_eq!(build_summarizer(&Config::default()).name(), "chat-completions");
    }
}
