use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use pdfsum_core::{BackendError, PdfBackend, Summarizer};

use crate::tui_event::BackendEvent;

/// Read `path` and extract its text, reporting the outcome on `tx`.
pub async fn run_extraction(
    pdf: Arc<dyn PdfBackend>,
    generation: u64,
    path: PathBuf,
    tx: mpsc::UnboundedSender<BackendEvent>,
) {
    let event = match extract_file(pdf, &path).await {
        Ok(text) => {
            tracing::info!(
                file = %path.display(),
                chars = text.chars().count(),
                "extraction complete"
            );
            BackendEvent::ExtractionComplete { generation, text }
        }
        Err(e) => BackendEvent::ExtractionFailed {
            generation,
            error: e.to_string(),
        },
    };
    let _ = tx.send(event);
}

/// Read the file and run the (blocking) extractor off the async runtime.
pub async fn extract_file(pdf: Arc<dyn PdfBackend>, path: &Path) -> Result<String, BackendError> {
    let bytes = tokio::fs::read(path).await?;
    tokio::task::spawn_blocking(move || pdf.extract_text(&bytes))
        .await
        .unwrap_or_else(|e| Err(BackendError::ExtractionError(format!("task join error: {e}"))))
}

/// Summarize `text`, reporting the outcome on `tx`.
pub async fn run_summary(
    summarizer: Arc<dyn Summarizer>,
    generation: u64,
    text: String,
    tx: mpsc::UnboundedSender<BackendEvent>,
) {
    let event = match summarizer.summarize(&text).await {
        Ok(summary) => BackendEvent::SummaryComplete {
            generation,
            summary,
        },
        Err(e) => BackendEvent::SummaryFailed {
            generation,
            error: e.to_string(),
        },
    };
    let _ = tx.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfsum_core::summary::mock::{MockResponse, MockSummarizer};

    /// Extractor that treats the file contents as UTF-8 text, or fails on
    /// anything that doesn't start with `%PDF`.
    struct FakePdf;

    impl PdfBackend for FakePdf {
        fn extract_text(&self, bytes: &[u8]) -> Result<String, BackendError> {
            match bytes.strip_prefix(b"%PDF") {
                Some(rest) => Ok(String::from_utf8_lossy(rest).into_owned()),
                None => Err(BackendError::OpenError("not a PDF".into())),
            }
        }
    }

    #[tokio::test]
    async fn extraction_reports_text_with_generation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDFHello \n").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        run_extraction(Arc::new(FakePdf), 7, path, tx).await;
        assert_eq!(
            rx.recv().await,
            Some(BackendEvent::ExtractionComplete {
                generation: 7,
                text: "Hello \n".into()
            })
        );
    }

    #[tokio::test]
    async fn extraction_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"plain text").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        run_extraction(Arc::new(FakePdf), 1, path, tx).await;
        match rx.recv().await {
            Some(BackendEvent::ExtractionFailed { generation, error }) => {
                assert_eq!(generation, 1);
                assert!(error.contains("not a PDF"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    struct PanickingPdf;

    impl PdfBackend for PanickingPdf {
        fn extract_text(&self, _bytes: &[u8]) -> Result<String, BackendError> {
            panic!("malformed xref");
        }
    }

    #[tokio::test]
    async fn extractor_panic_becomes_failure_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.5").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        run_extraction(Arc::new(PanickingPdf), 4, path, tx).await;
        match rx.recv().await {
            Some(BackendEvent::ExtractionFailed { generation, error }) => {
                assert_eq!(generation, 4);
                assert!(error.contains("task join error"), "{error}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_file(Arc::new(FakePdf), &dir.path().join("gone.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Io(_)));
    }

    #[tokio::test]
    async fn summary_outcomes_are_reported() {
        let summarizer = Arc::new(MockSummarizer::with_sequence(vec![
            MockResponse::Summary("Short.".into()),
            MockResponse::RateLimited,
        ]));
        let (tx, mut rx) = mpsc::unbounded_channel();

        run_summary(summarizer.clone(), 3, "text".into(), tx.clone()).await;
        assert_eq!(
            rx.recv().await,
            Some(BackendEvent::SummaryComplete {
                generation: 3,
                summary: "Short.".into()
            })
        );

        run_summary(summarizer.clone(), 3, "text".into(), tx).await;
        assert!(matches!(
            rx.recv().await,
            Some(BackendEvent::SummaryFailed { generation: 3, .. })
        ));
        assert_eq!(summarizer.call_count(), 2);
    }
}
