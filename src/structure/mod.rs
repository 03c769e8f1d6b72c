//! Markdown structuring of extracted document text.
//!
//! The engine walks the text line by line, classifies each trimmed line with
//! an ordered rule list and appends the matching Markdown fragment. The only
//! state carried between lines is whether the references section has begun.

mod engine;
mod header;
mod rules;
mod stats;

pub use engine::{
    emit, structure_document, structure_document_with_stats, StructureEngine, StructureResult,
};
pub use header::{DocumentHeader, TIMESTAMP_FORMAT};
pub use rules::{
    classify, section_name, title_case, Classification, EngineState, Rule, PAGE_MARKER_PREFIX,
    REFERENCES_SECTION, RULES, SECTION_NAMES, TABLE_MARKER_PREFIX, TABLE_SECTION_PREFIX,
};
pub use stats::ClassificationStats;
