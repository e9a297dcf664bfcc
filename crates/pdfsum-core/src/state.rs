//! Document state machine.
//!
//! All document state lives in an immutable [`DocumentState`] record. Every
//! user action and every backend completion is an [`Event`]; [`reduce`] maps
//! `(state, event)` to the next state plus at most one [`Command`] for the
//! caller to execute. The reducer performs no I/O and never logs.
//!
//! Each file selection bumps a generation counter. Commands carry the
//! generation they were issued for and completions echo it back, so a result
//! that arrives after a newer file was selected is dropped instead of being
//! attached to the wrong document.

use crate::summary::{MAX_INPUT_CHARS, truncate_chars};

/// Text displayed when extraction succeeded but the document had no text.
pub const NO_TEXT_PLACEHOLDER: &str = "No text found in PDF";

/// Extraction status of the current document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
}

/// Summarization status of the current document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummaryStatus {
    #[default]
    NotStarted,
    Summarizing,
    Done,
    Failed,
}

/// Snapshot of everything the UI knows about the current document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    pub generation: u64,
    pub file_name: Option<String>,
    pub extraction: ExtractionStatus,
    /// Raw extracted text. Empty until extraction succeeds, and also empty
    /// when the document contained no text.
    pub extracted_text: String,
    pub summary_status: SummaryStatus,
    pub summary: Option<String>,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user picked a new file.
    FileSelected { name: String },
    ExtractionSucceeded { generation: u64, text: String },
    /// `detail` is diagnostic only and never stored in the state.
    ExtractionFailed { generation: u64, detail: String },
    /// The user asked for a summary.
    SummaryRequested,
    SummarySucceeded { generation: u64, summary: String },
    SummaryFailed { generation: u64, detail: String },
}

/// Work the caller must start after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Extract text from the file selected for `generation`.
    Extract { generation: u64 },
    /// Summarize `text`, already truncated to [`MAX_INPUT_CHARS`] characters.
    Summarize { generation: u64, text: String },
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: DocumentState,
    pub command: Option<Command>,
}

impl Transition {
    fn unchanged(state: &DocumentState) -> Self {
        Self {
            state: state.clone(),
            command: None,
        }
    }
}

impl DocumentState {
    /// True exactly while extraction or summarization is in flight.
    pub fn is_busy(&self) -> bool {
        self.extraction == ExtractionStatus::Processing
            || self.summary_status == SummaryStatus::Summarizing
    }

    /// Whether a [`Event::SummaryRequested`] would start a request.
    pub fn can_summarize(&self) -> bool {
        self.extraction == ExtractionStatus::Success
            && !self.extracted_text.is_empty()
            && self.summary_status != SummaryStatus::Summarizing
    }

    /// Text to show in the extracted-text pane, if any.
    ///
    /// A successful extraction that found no text shows
    /// [`NO_TEXT_PLACEHOLDER`].
    pub fn displayed_text(&self) -> Option<&str> {
        match self.extraction {
            ExtractionStatus::Success if self.extracted_text.is_empty() => {
                Some(NO_TEXT_PLACEHOLDER)
            }
            ExtractionStatus::Success => Some(&self.extracted_text),
            _ => None,
        }
    }

    pub fn extraction_failed(&self) -> bool {
        self.extraction == ExtractionStatus::Error
    }

    pub fn summary_failed(&self) -> bool {
        self.summary_status == SummaryStatus::Failed
    }
}

/// Apply `event` to `state`.
pub fn reduce(state: &DocumentState, event: Event) -> Transition {
    match event {
        Event::FileSelected { name } => {
            let generation = state.generation.wrapping_add(1);
            Transition {
                state: DocumentState {
                    generation,
                    file_name: Some(name),
                    extraction: ExtractionStatus::Processing,
                    extracted_text: String::new(),
                    summary_status: SummaryStatus::NotStarted,
                    summary: None,
                },
                command: Some(Command::Extract { generation }),
            }
        }

        Event::ExtractionSucceeded { generation, text } => {
            if !accepts_extraction(state, generation) {
                return Transition::unchanged(state);
            }
            Transition {
                state: DocumentState {
                    extraction: ExtractionStatus::Success,
                    extracted_text: text,
                    ..state.clone()
                },
                command: None,
            }
        }

        Event::ExtractionFailed { generation, .. } => {
            if !accepts_extraction(state, generation) {
                return Transition::unchanged(state);
            }
            Transition {
                state: DocumentState {
                    extraction: ExtractionStatus::Error,
                    extracted_text: String::new(),
                    ..state.clone()
                },
                command: None,
            }
        }

        Event::SummaryRequested => {
            if !state.can_summarize() {
                return Transition::unchanged(state);
            }
            let text = truncate_chars(&state.extracted_text, MAX_INPUT_CHARS).to_string();
            Transition {
                state: DocumentState {
                    summary_status: SummaryStatus::Summarizing,
                    ..state.clone()
                },
                command: Some(Command::Summarize {
                    generation: state.generation,
                    text,
                }),
            }
        }

        Event::SummarySucceeded {
            generation,
            summary,
        } => {
            if !accepts_summary(state, generation) {
                return Transition::unchanged(state);
            }
            Transition {
                state: DocumentState {
                    summary_status: SummaryStatus::Done,
                    summary: Some(summary),
                    ..state.clone()
                },
                command: None,
            }
        }

        Event::SummaryFailed { generation, .. } => {
            if !accepts_summary(state, generation) {
                return Transition::unchanged(state);
            }
            Transition {
                state: DocumentState {
                    summary_status: SummaryStatus::Failed,
                    summary: None,
                    ..state.clone()
                },
                command: None,
            }
        }
    }
}

fn accepts_extraction(state: &DocumentState, generation: u64) -> bool {
    generation == state.generation && state.extraction == ExtractionStatus::Processing
}

fn accepts_summary(state: &DocumentState, generation: u64) -> bool {
    generation == state.generation && state.summary_status == SummaryStatus::Summarizing
}
