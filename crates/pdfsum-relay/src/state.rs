use std::sync::Arc;

use pdfsum_core::Summarizer;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub summarizer: Arc<dyn Summarizer>,
}
