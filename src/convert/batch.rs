//! Batch outcomes and JSON reports.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConvertOutcome;
use crate::error::{Error, Result};

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// How one document in a batch turned out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Markdown was written
    Converted(ConvertOutcome),
    /// Acquisition or persistence failed
    Failed {
        /// Human-readable reason
        message: String,
    },
}

impl ItemStatus {
    /// Whether the document was converted.
    pub fn is_converted(&self) -> bool {
        matches!(self, ItemStatus::Converted(_))
    }
}

impl From<Result<ConvertOutcome>> for ItemStatus {
    fn from(result: Result<ConvertOutcome>) -> Self {
        match result {
            Ok(outcome) => ItemStatus::Converted(outcome),
            Err(e) => {
                log::error!("{}", e);
                ItemStatus::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}

/// One document of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Source document
    pub input: PathBuf,

    /// Outcome for this document
    #[serde(flatten)]
    pub status: ItemStatus,
}

impl BatchItem {
    /// Create a batch item.
    pub fn new(input: impl AsRef<Path>, status: ItemStatus) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            status,
        }
    }
}

/// Per-document results of a conversion run, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per document
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    /// Create a report from items.
    pub fn from_items(items: Vec<BatchItem>) -> Self {
        Self { items }
    }

    /// Number of documents converted.
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.status.is_converted()).count()
    }

    /// Number of documents that failed.
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Number of documents attempted.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// True when at least one document was converted.
    pub fn is_success(&self) -> bool {
        self.succeeded() > 0
    }

    /// Converted outcomes, in input order.
    pub fn outcomes(&self) -> impl Iterator<Item = &ConvertOutcome> {
        self.items.iter().filter_map(|item| match &item.status {
            ItemStatus::Converted(outcome) => Some(outcome),
            ItemStatus::Failed { .. } => None,
        })
    }

    /// Serialize the report.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let result = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
            JsonFormat::Compact => serde_json::to_string(self),
        };

        result.map_err(|e| Error::Report(format!("JSON serialization error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::ClassificationStats;

    fn converted(name: &str) -> BatchItem {
        BatchItem::new(
            name,
            ItemStatus::Converted(ConvertOutcome {
                output: PathBuf::from(name).with_extension("md"),
                source: "layout".into(),
                chars_extracted: 1200,
                confident: true,
                stats: ClassificationStats::default(),
            }),
        )
    }

    fn failed(name: &str) -> BatchItem {
        BatchItem::new(
            name,
            ItemStatus::Failed {
                message: "Document is encrypted".into(),
            },
        )
    }

    #[test]
    fn test_tally() {
        let report = BatchReport::from_items(vec![converted("a.pdf"), failed("b.pdf")]);
        assert_eq!(report.total(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(report.is_success());
        assert_eq!(report.outcomes().count(), 1);
    }

    #[test]
    fn test_all_failed_is_not_success() {
        let report = BatchReport::from_items(vec![failed("a.pdf"), failed("b.pdf")]);
        assert!(!report.is_success());
        assert!(!BatchReport::default().is_success());
    }

    #[test]
    fn test_status_from_result() {
        let status: ItemStatus = Err(Error::Encrypted).into();
        match status {
            ItemStatus::Failed { message } => assert_eq!(message, "Document is encrypted"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_to_json_tags_status() {
        let report = BatchReport::from_items(vec![converted("a.pdf"), failed("b.pdf")]);
        let json = report.to_json(JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["items"][0]["status"], "converted");
        assert_eq!(value["items"][0]["source"], "layout");
        assert_eq!(value["items"][1]["status"], "failed");
        assert_eq!(value["items"][1]["input"], "b.pdf");

        let pretty = report.to_json(JsonFormat::Pretty).unwrap();
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_json_reads_back() {
        let report = BatchReport::from_items(vec![converted("a.pdf"), failed("b.pdf")]);
        let json = report.to_json(JsonFormat::Compact).unwrap();
        assert_eq!(json.matches("\"input\"").count(), 2);

        let parsed: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total(), 2);
        assert_eq!(parsed.succeeded(), 1);
        assert_eq!(parsed.items[0].input, PathBuf::from("a.pdf"));
        let outcome = parsed.outcomes().next().unwrap();
        assert_eq!(outcome.output, PathBuf::from("a.md"));
        assert_eq!(outcome.source, "layout");
    }
}
