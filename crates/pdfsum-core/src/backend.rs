use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors load a document from its raw bytes and return the text of
/// every page in page order, one `\n`-terminated segment per page. A
/// structurally valid document without any text yields an empty string, not
/// an error.
pub trait PdfBackend: Send + Sync {
    /// Extract the full text content of an in-memory PDF document.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, BackendError>;
}
