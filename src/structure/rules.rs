//! Ordered line classification rules.
//!
//! Each trimmed line is matched against [`RULES`] from top to bottom and the
//! first matching rule decides its [`Classification`]. Several rules overlap
//! (a table row is also a short capitalised line, a section name is also a
//! subsection candidate), so the order of the list is part of the behavior.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Section names rendered as level-2 headings, compared against the upper-cased line.
pub const SECTION_NAMES: [&str; 8] = [
    "ABSTRACT",
    "INTRODUCTION",
    "METHODS",
    "RESULTS",
    "DISCUSSION",
    "CONCLUSION",
    "REFERENCES",
    "ACKNOWLEDGMENTS",
];

/// Section name that switches the engine into reference formatting.
pub const REFERENCES_SECTION: &str = "REFERENCES";

/// Prefix of the page boundary sentinel (`--- Page N ---`).
pub const PAGE_MARKER_PREFIX: &str = "--- Page";

/// Prefix of the per-page table block header (`### Tables on Page N:`).
pub const TABLE_SECTION_PREFIX: &str = "### Tables";

/// Prefix of a single table label (`**Table K:**`).
pub const TABLE_MARKER_PREFIX: &str = "**Table";

/// Number of leading characters searched for a digit in reference lines.
const REFERENCE_DIGIT_WINDOW: usize = 10;

/// Subsection candidates must be shorter than this many characters.
const SUBSECTION_MAX_CHARS: usize = 100;

/// Subsection candidates may have at most this many words.
const SUBSECTION_MAX_WORDS: usize = 8;

/// The category assigned to one line of extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Empty after trimming
    Blank,
    /// `--- Page N ---` boundary
    PageMarker,
    /// `### Tables on Page N:` block header
    TableSectionHeader,
    /// `**Table K:**` label
    TableMarker,
    /// Pre-rendered `| a | b |` row
    TableRow,
    /// One of the fixed [`SECTION_NAMES`]
    SectionHeading,
    /// Short capitalised line outside the references
    SubsectionHeading,
    /// Start of a numbered reference
    ReferenceEntry,
    /// Wrapped tail of the previous reference
    ReferenceContinuation,
    /// Ordinary paragraph text
    Prose,
}

impl Classification {
    /// Stable lowercase name, used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Blank => "blank",
            Classification::PageMarker => "page_marker",
            Classification::TableSectionHeader => "table_section_header",
            Classification::TableMarker => "table_marker",
            Classification::TableRow => "table_row",
            Classification::SectionHeading => "section_heading",
            Classification::SubsectionHeading => "subsection_heading",
            Classification::ReferenceEntry => "reference_entry",
            Classification::ReferenceContinuation => "reference_continuation",
            Classification::Prose => "prose",
        }
    }

    /// Whether this tag is rendered as a Markdown heading.
    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            Classification::SectionHeading | Classification::SubsectionHeading
        )
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State carried from one line to the next within a single document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineState {
    /// Set once a `References` heading has been seen; never cleared.
    pub in_references: bool,
}

impl EngineState {
    /// Create the state for a fresh document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the state after `line` has been classified as `tag`.
    pub fn observe(&mut self, tag: Classification, line: &str) {
        if tag == Classification::SectionHeading && line.to_uppercase() == REFERENCES_SECTION {
            self.in_references = true;
        }
    }
}

/// A single entry of the classification cascade.
pub struct Rule {
    tag: Classification,
    matcher: fn(&str, &EngineState) -> bool,
}

impl Rule {
    /// The tag assigned when this rule matches.
    pub fn tag(&self) -> Classification {
        self.tag
    }

    /// Test a trimmed line against this rule.
    pub fn matches(&self, line: &str, state: &EngineState) -> bool {
        (self.matcher)(line, state)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("tag", &self.tag).finish()
    }
}

/// The classification cascade in precedence order. The last rule always matches.
pub static RULES: [Rule; 10] = [
    Rule {
        tag: Classification::Blank,
        matcher: is_blank,
    },
    Rule {
        tag: Classification::PageMarker,
        matcher: is_page_marker,
    },
    Rule {
        tag: Classification::TableSectionHeader,
        matcher: is_table_section_header,
    },
    Rule {
        tag: Classification::TableMarker,
        matcher: is_table_marker,
    },
    Rule {
        tag: Classification::TableRow,
        matcher: is_table_row,
    },
    Rule {
        tag: Classification::SectionHeading,
        matcher: is_section_heading,
    },
    Rule {
        tag: Classification::ReferenceEntry,
        matcher: is_reference_entry,
    },
    Rule {
        tag: Classification::ReferenceContinuation,
        matcher: is_reference_continuation,
    },
    Rule {
        tag: Classification::SubsectionHeading,
        matcher: is_subsection_heading,
    },
    Rule {
        tag: Classification::Prose,
        matcher: is_prose,
    },
];

/// Classify an already-trimmed line.
pub fn classify(line: &str, state: &EngineState) -> Classification {
    RULES
        .iter()
        .find(|rule| rule.matches(line, state))
        .map(Rule::tag)
        .unwrap_or(Classification::Prose)
}

/// Return the canonical section name a line spells, ignoring case.
pub fn section_name(line: &str) -> Option<&'static str> {
    let upper = line.to_uppercase();
    SECTION_NAMES.iter().copied().find(|name| *name == upper)
}

/// Title-case a line: the first letter of every alphabetic run is upper-cased,
/// the remaining letters lower-cased.
pub fn title_case(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut at_word_start = true;
    for c in line.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }
    result
}

fn is_blank(line: &str, _state: &EngineState) -> bool {
    line.is_empty()
}

fn is_page_marker(line: &str, _state: &EngineState) -> bool {
    line.starts_with(PAGE_MARKER_PREFIX)
}

fn is_table_section_header(line: &str, _state: &EngineState) -> bool {
    line.starts_with(TABLE_SECTION_PREFIX)
}

fn is_table_marker(line: &str, _state: &EngineState) -> bool {
    line.starts_with(TABLE_MARKER_PREFIX)
}

fn is_table_row(line: &str, _state: &EngineState) -> bool {
    line.starts_with("| ") && line.ends_with(" |")
}

fn is_section_heading(line: &str, _state: &EngineState) -> bool {
    section_name(line).is_some()
}

fn is_reference_entry(line: &str, state: &EngineState) -> bool {
    state.in_references
        && line
            .chars()
            .take(REFERENCE_DIGIT_WINDOW)
            .any(|c| c.is_ascii_digit())
}

fn is_reference_continuation(_line: &str, state: &EngineState) -> bool {
    state.in_references
}

fn is_subsection_heading(line: &str, state: &EngineState) -> bool {
    if state.in_references {
        return false;
    }
    if line.chars().count() >= SUBSECTION_MAX_CHARS || line.ends_with('.') || line.ends_with(',')
    {
        return false;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    words.len() <= SUBSECTION_MAX_WORDS
        && words
            .iter()
            .any(|word| word.chars().next().is_some_and(char::is_uppercase))
}

fn is_prose(_line: &str, _state: &EngineState) -> bool {
    true
}
