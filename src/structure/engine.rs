//! Single-pass line classifier and Markdown emitter.

use serde::{Deserialize, Serialize};

use super::header::DocumentHeader;
use super::rules::{classify, title_case, Classification, EngineState};
use super::stats::ClassificationStats;

/// Structure extracted text into a Markdown document.
///
/// This never fails: text without recognisable structure comes back as one
/// long prose paragraph under the header.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use pdfdraft::structure::{structure_document, DocumentHeader};
///
/// let when = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap();
/// let header = DocumentHeader::new("paper", "paper.pdf", when);
/// let markdown = structure_document("ABSTRACT\nShort.", &header);
/// assert!(markdown.contains("\n## Abstract\n\n"));
/// ```
pub fn structure_document(text: &str, header: &DocumentHeader) -> String {
    let mut engine = StructureEngine::new(header);
    engine.push_text(text);
    engine.finish()
}

/// Structure extracted text and collect per-tag statistics.
pub fn structure_document_with_stats(text: &str, header: &DocumentHeader) -> StructureResult {
    let mut engine = StructureEngine::new(header);
    engine.push_text(text);
    engine.finish_with_stats()
}

/// Markdown produced for one document together with its statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureResult {
    /// The complete Markdown document
    pub content: String,

    /// Line categories seen while structuring
    pub stats: ClassificationStats,
}

/// Incremental structuring engine for one document.
///
/// The output buffer is append-only: each line contributes exactly one
/// fragment and earlier fragments are never revisited.
#[derive(Debug)]
pub struct StructureEngine {
    output: String,
    state: EngineState,
    stats: ClassificationStats,
}

impl StructureEngine {
    /// Start a document by writing its header.
    pub fn new(header: &DocumentHeader) -> Self {
        let mut output = String::new();
        header.write_to(&mut output);
        Self {
            output,
            state: EngineState::new(),
            stats: ClassificationStats::new(),
        }
    }

    /// Feed a whole text blob, split on newlines.
    pub fn push_text(&mut self, text: &str) {
        for line in text.split('\n') {
            self.push_line(line);
        }
    }

    /// Classify and emit a single raw line, returning its tag.
    pub fn push_line(&mut self, raw: &str) -> Classification {
        let line = raw.trim();
        let tag = classify(line, &self.state);
        log::trace!("{:<24} {:?}", tag.as_str(), line);

        emit(tag, line, &mut self.output);
        self.state.observe(tag, line);
        self.stats.record(tag, line);
        tag
    }

    /// Current cross-line state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Markdown emitted so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Statistics collected so far.
    pub fn stats(&self) -> &ClassificationStats {
        &self.stats
    }

    /// Finish the document and return the Markdown.
    pub fn finish(self) -> String {
        self.output
    }

    /// Finish the document and return the Markdown with statistics.
    pub fn finish_with_stats(self) -> StructureResult {
        log::debug!(
            "Structured {} lines ({} headings, {} references, {} table rows)",
            self.stats.total_lines(),
            self.stats.heading_count(),
            self.stats.reference_entries,
            self.stats.table_rows
        );
        StructureResult {
            content: self.output,
            stats: self.stats,
        }
    }
}

/// Append the Markdown fragment for a trimmed line of the given category.
pub fn emit(tag: Classification, line: &str, output: &mut String) {
    match tag {
        Classification::Blank => output.push('\n'),
        Classification::PageMarker => {
            output.push('\n');
            output.push_str(line);
            output.push_str("\n\n");
        }
        Classification::TableSectionHeader | Classification::TableRow => {
            output.push_str(line);
            output.push('\n');
        }
        Classification::TableMarker | Classification::ReferenceEntry => {
            output.push('\n');
            output.push_str(line);
            output.push('\n');
        }
        Classification::SectionHeading => {
            output.push_str("\n## ");
            output.push_str(&title_case(line));
            output.push_str("\n\n");
        }
        Classification::SubsectionHeading => {
            output.push_str("\n### ");
            output.push_str(line);
            output.push_str("\n\n");
        }
        Classification::ReferenceContinuation => {
            output.push_str(line);
            output.push(' ');
        }
        Classification::Prose => {
            output.push_str(line);
            output.push(' ');
            // A period at line end is taken as a paragraph boundary.
            if line.ends_with('.') {
                output.push_str("\n\n");
            }
        }
    }
}
