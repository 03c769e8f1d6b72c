//! Per-document classification statistics.

use serde::{Deserialize, Serialize};

use super::rules::Classification;

/// Counts of each line category seen while structuring one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    /// Lines that were empty after trimming
    pub blank_lines: u32,

    /// Page boundary markers
    pub page_count: u32,

    /// Per-page table block headers
    pub table_sections: u32,

    /// Individual table labels
    pub table_count: u32,

    /// Pipe-table rows passed through
    pub table_rows: u32,

    /// Level-2 section headings
    pub section_headings: u32,

    /// Level-3 subsection headings
    pub subsection_headings: u32,

    /// Numbered reference entries
    pub reference_entries: u32,

    /// Reference continuation lines
    pub reference_continuations: u32,

    /// Prose lines
    pub prose_lines: u32,

    /// Approximate word count of all non-blank lines
    pub word_count: u32,
}

impl ClassificationStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one classified line.
    pub fn record(&mut self, tag: Classification, line: &str) {
        let counter = match tag {
            Classification::Blank => &mut self.blank_lines,
            Classification::PageMarker => &mut self.page_count,
            Classification::TableSectionHeader => &mut self.table_sections,
            Classification::TableMarker => &mut self.table_count,
            Classification::TableRow => &mut self.table_rows,
            Classification::SectionHeading => &mut self.section_headings,
            Classification::SubsectionHeading => &mut self.subsection_headings,
            Classification::ReferenceEntry => &mut self.reference_entries,
            Classification::ReferenceContinuation => &mut self.reference_continuations,
            Classification::Prose => &mut self.prose_lines,
        };
        *counter += 1;
        self.word_count += line.split_whitespace().count() as u32;
    }

    /// Number of lines recorded.
    pub fn total_lines(&self) -> u32 {
        self.blank_lines
            + self.page_count
            + self.table_sections
            + self.table_count
            + self.table_rows
            + self.section_headings
            + self.subsection_headings
            + self.reference_entries
            + self.reference_continuations
            + self.prose_lines
    }

    /// Number of headings of either level.
    pub fn heading_count(&self) -> u32 {
        self.section_headings + self.subsection_headings
    }
}
