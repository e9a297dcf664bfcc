use std::path::PathBuf;

/// Commands sent from the TUI to the backend.
///
/// Every command carries the document generation it was issued for, and the
/// matching result event echoes it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Read the file at `path` and extract its text.
    Extract { generation: u64, path: PathBuf },
    /// Summarize previously extracted text.
    Summarize { generation: u64, text: String },
}

/// Events flowing from the backend tasks to the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Extraction finished; `text` may be empty for image-only documents.
    ExtractionComplete { generation: u64, text: String },
    /// The file could not be read or parsed.
    ExtractionFailed { generation: u64, error: String },
    /// The summarizer returned a summary.
    SummaryComplete { generation: u64, summary: String },
    /// The summarizer failed.
    SummaryFailed { generation: u64, error: String },
}
