use pdfsum_core::Event;

use super::App;
use crate::tui_event::BackendEvent;

impl App {
    /// Process a backend event and update document state.
    ///
    /// Failure details are logged here and never shown; the view renders
    /// fixed messages from the resulting status.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        let current = self.document.generation;
        let file = self.document.file_name.clone().unwrap_or_default();

        let event = match event {
            BackendEvent::ExtractionComplete { generation, text } => {
                Event::ExtractionSucceeded { generation, text }
            }
            BackendEvent::ExtractionFailed { generation, error } => {
                if generation == current {
                    tracing::error!(file = %file, error = %error, "PDF extraction failed");
                }
                Event::ExtractionFailed {
                    generation,
                    detail: error,
                }
            }
            BackendEvent::SummaryComplete {
                generation,
                summary,
            } => Event::SummarySucceeded {
                generation,
                summary,
            },
            BackendEvent::SummaryFailed { generation, error } => {
                if generation == current {
                    tracing::error!(file = %file, error = %error, "summarization failed");
                }
                Event::SummaryFailed {
                    generation,
                    detail: error,
                }
            }
        };

        if event_generation(&event) != Some(current) {
            tracing::debug!(current, "dropping result for a superseded file");
        }
        self.dispatch(event);
    }
}

fn event_generation(event: &Event) -> Option<u64> {
    match event {
        Event::ExtractionSucceeded { generation, .. }
        | Event::ExtractionFailed { generation, .. }
        | Event::SummarySucceeded { generation, .. }
        | Event::SummaryFailed { generation, .. } => Some(*generation),
        Event::FileSelected { .. } | Event::SummaryRequested => None,
    }
}
