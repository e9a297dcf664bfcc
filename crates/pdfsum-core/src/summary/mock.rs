//! Mock summarizer for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{SummaryError, Summarizer, truncate_chars, MAX_INPUT_CHARS};

/// A configurable mock response for [`MockSummarizer`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Simulate a successful summary.
    Summary(String),
    /// Simulate a 429 rate-limit response.
    RateLimited,
    /// Simulate a generic upstream error.
    Error(String),
}

/// A hand-rolled mock implementing [`Summarizer`] for tests.
///
/// Supports:
/// - A fixed response (used for every call), **or**
/// - A sequence of responses (one per call, repeating the last if exhausted).
/// - Call counting via [`call_count()`](MockSummarizer::call_count).
/// - Inspection of the text of the most recent call via
///   [`last_input()`](MockSummarizer::last_input).
pub struct MockSummarizer {
    /// Pending responses, stored reversed so `pop()` yields the next one.
    responses: Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    call_count: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl MockSummarizer {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            call_count: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        let fallback = responses
            .last()
            .cloned()
            .unwrap_or_else(|| MockResponse::Error("empty mock sequence".into()));
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            fallback,
            call_count: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// How many times `summarize()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The text passed to the most recent call, after truncation.
    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().ok().and_then(|g| g.clone())
    }

    fn next_response(&self) -> MockResponse {
        match self.responses.lock() {
            Ok(mut seq) => seq.pop().unwrap_or_else(|| self.fallback.clone()),
            Err(_) => self.fallback.clone(),
        }
    }
}

impl Summarizer for MockSummarizer {
    fn name(&self) -> &str {
        "mock"
    }

    fn summarize<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SummaryError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_input.lock() {
            *last = Some(truncate_chars(text, MAX_INPUT_CHARS).to_string());
        }
        let response = self.next_response();

        Box::pin(async move {
            match response {
                MockResponse::Summary(s) => Ok(s),
                MockResponse::RateLimited => Err(SummaryError::RateLimited),
                MockResponse::Error(msg) => Err(SummaryError::Upstream(msg)),
            }
        })
    }
}
