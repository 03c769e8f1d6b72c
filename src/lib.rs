//! # pdfdraft
//!
//! Turns PDF papers into draft Markdown for manual review and editing.
//!
//! Text is pulled out of the PDF by an ordered chain of extraction sources,
//! then a single pass over its lines decides what each line is (page marker,
//! table fragment, section heading, reference entry, prose) and re-emits it
//! with Markdown markup.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfdraft::{convert_file, ConvertOptions};
//!
//! fn main() -> pdfdraft::Result<()> {
//!     let outcome = convert_file("paper.pdf", ConvertOptions::new())?;
//!     println!("Markdown saved to: {}", outcome.output.display());
//!     Ok(())
//! }
//! ```
//!
//! Text that is already extracted can be structured directly:
//!
//! ```
//! let markdown = pdfdraft::structure_text("ABSTRACT\nWe study things.", "paper.pdf");
//! assert!(markdown.starts_with("# paper\n"));
//! assert!(markdown.contains("## Abstract"));
//! ```
//!
//! ## Features
//!
//! - **Fallback extraction**: lopdf with table detection, then pdf-extract
//! - **Ordered line rules**: first match wins, auditable one rule at a time
//! - **Reference handling**: numbered entries split, wrapped lines joined
//! - **Parallel batches**: Uses Rayon for directories of PDFs

pub mod convert;
pub mod detect;
pub mod error;
pub mod extract;
pub mod naming;
pub mod structure;

// Re-export commonly used types
pub use convert::{
    BatchItem, BatchReport, ConvertOptions, ConvertOutcome, Converter, ItemStatus, JsonFormat,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, PdfFormat};
pub use error::{Error, Result};
pub use extract::{
    Acquired, ExtractionChain, LayoutSource, PlainSource, TextSource, MIN_CONTENT_CHARS,
};
pub use structure::{
    structure_document, Classification, ClassificationStats, DocumentHeader, StructureResult,
};

use std::path::Path;

/// Structure already-extracted text as if it came from `source_path`.
///
/// The title and `Source:` line are derived from the path, the timestamp is
/// the local time now. Never fails.
pub fn structure_text<P: AsRef<Path>>(text: &str, source_path: P) -> String {
    structure_document(text, &DocumentHeader::for_path(source_path))
}

/// Extract a PDF's text with the default source chain.
///
/// # Example
///
/// ```no_run
/// let acquired = pdfdraft::extract_text("paper.pdf").unwrap();
/// println!("{} chars via {}", acquired.char_count(), acquired.source);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<Acquired> {
    ExtractionChain::with_defaults().acquire(path.as_ref())
}

/// Convert a PDF to Markdown without writing anything.
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let acquired = extract_text(path)?;
    Ok(structure_text(&acquired.text, path))
}

/// Convert one PDF and save the Markdown according to `options`.
pub fn convert_file<P: AsRef<Path>>(path: P, options: ConvertOptions) -> Result<ConvertOutcome> {
    Converter::with_options(options).convert_file(path)
}

/// Convert a PDF or every PDF in a directory.
pub fn convert_path<P: AsRef<Path>>(path: P, options: ConvertOptions) -> Result<BatchReport> {
    Converter::with_options(options).convert_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_text_uses_path_names() {
        let markdown = structure_text("Intro text.", "dir/My Paper.pdf");
        assert!(markdown.starts_with("# My Paper\n\n**Source:** My Paper.pdf\n**Converted:** "));
        assert!(markdown.ends_with("Intro text. \n\n"));
    }

    #[test]
    fn test_structure_text_empty() {
        let markdown = structure_text("", "empty.pdf");
        assert!(markdown.starts_with("# empty\n"));
        assert!(markdown.ends_with("---\n\n\n"));
    }

    #[test]
    fn test_to_markdown_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, "<!DOCTYPE html>").unwrap();
        match to_markdown(&path) {
            Err(Error::NoText { reasons, .. }) => assert_eq!(reasons.len(), 2),
            other => panic!("expected NoText, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_path_missing() {
        let result = convert_path("/nonexistent/input", ConvertOptions::new());
        assert!(matches!(result, Err(Error::InputNotFound(_))));
    }
}
