use std::io::Write;
use std::path::{Path, PathBuf};

/// Copy text to the system clipboard using the OSC 52 escape sequence.
///
/// `out` is the terminal itself, bypassing the ratatui backend buffer.
pub(super) fn osc52_copy(out: &mut dyn Write, text: &str) {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    let _ = out.write_all(format!("\x1b]52;c;{}\x07", encoded).as_bytes());
    let _ = out.flush();
}

/// File name for display, falling back to the full path.
pub(super) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Turn a dropped/pasted path into a filesystem path: strips surrounding
/// quotes, a `file://` prefix and backslash escapes of spaces.
pub(super) fn dropped_path(pasted: &str) -> PathBuf {
    let trimmed = pasted.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);
    let without_scheme = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    PathBuf::from(without_scheme.replace("\\ ", " "))
}

/// Extension check only; the bytes are not sniffed.
pub(crate) fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_sequence_carries_base64_text() {
        let mut out = Vec::new();
        osc52_copy(&mut out, "copy me");
        assert_eq!(out, b"\x1b]52;c;Y29weSBtZQ==\x07");
    }

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(is_pdf_path(Path::new("report.PDF")));
        assert!(is_pdf_path(Path::new("dir/notes.pdf")));
        assert!(!is_pdf_path(Path::new("notes.txt")));
        assert!(!is_pdf_path(Path::new("pdf")));
    }

    #[test]
    fn dropped_paths_are_cleaned() {
        assert_eq!(dropped_path("  /tmp/a.pdf\n"), PathBuf::from("/tmp/a.pdf"));
        assert_eq!(dropped_path("'/tmp/my doc.pdf'"), PathBuf::from("/tmp/my doc.pdf"));
        assert_eq!(dropped_path("\"/tmp/b.pdf\""), PathBuf::from("/tmp/b.pdf"));
        assert_eq!(dropped_path("file:///tmp/c.pdf"), PathBuf::from("/tmp/c.pdf"));
        assert_eq!(dropped_path("/tmp/my\\ doc.pdf"), PathBuf::from("/tmp/my doc.pdf"));
    }

    #[test]
    fn display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/tmp/papers/sample.pdf")), "sample.pdf");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
