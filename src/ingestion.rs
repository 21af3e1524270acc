//! Input boundary: turning a source document into ordered text lines.
//!
//! The pipeline only needs trimmed lines in document order. Anything that
//! can produce them (a PDF text extractor, an OCR pass, a plain export) can
//! feed the builder through the `LineSource` seam; the crate ships the
//! plain-text backend.

use log::info;
use std::fs;
use std::path::Path;

use crate::error::{ReportError, Result};

/// An ordered supply of trimmed document lines.
pub trait LineSource {
    fn lines(&self) -> Result<Vec<String>>;
}

/// Lines held in memory, typically from an already-extracted text blob.
#[derive(Debug, Clone)]
pub struct TextLines {
    lines: Vec<String>,
}

impl TextLines {
    /// Split a text blob into trimmed lines, preserving order. Blank lines
    /// are kept; the segmenter relies on them as soft separators.
    pub fn from_text(text: &str) -> Self {
        TextLines {
            lines: text.lines().map(|l| l.trim().to_string()).collect(),
        }
    }

    /// Read a plain-text logbook export from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReportError::InputNotFound(path.display().to_string()));
        }
        let text = fs::read_to_string(path)?;
        info!("read {} from disk", path.display());
        let source = Self::from_text(&text);
        if source.lines.iter().all(|l| l.is_empty()) {
            return Err(ReportError::EmptyDocument);
        }
        Ok(source)
    }
}

impl LineSource for TextLines {
    fn lines(&self) -> Result<Vec<String>> {
        Ok(self.lines.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_trims_and_preserves_order() {
        let source = TextLines::from_text("  Start Date : 9/18/2025 8:18 AM  \n\n- Action : lock\n");
        let lines = source.lines().unwrap();
        assert_eq!(
            lines,
            vec![
                "Start Date : 9/18/2025 8:18 AM".to_string(),
                "".to_string(),
                "- Action : lock".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_file_is_input_not_found() {
        let err = TextLines::from_file("/nonexistent/logbook.txt").unwrap_err();
        assert!(matches!(err, ReportError::InputNotFound(_)));
    }
}
