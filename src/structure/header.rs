//! Document preamble written before the converted body.

use chrono::{Local, NaiveDateTime};
use std::path::Path;

use crate::naming::{display_name, source_name};

/// Timestamp layout used for the `Converted:` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fields of the fixed Markdown preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Level-1 title, normally the source file stem
    pub title: String,
    /// Source file name including its extension
    pub source_name: String,
    /// Time of conversion
    pub converted_at: NaiveDateTime,
}

impl DocumentHeader {
    /// Create a header with explicit values.
    pub fn new(
        title: impl Into<String>,
        source_name: impl Into<String>,
        converted_at: NaiveDateTime,
    ) -> Self {
        Self {
            title: title.into(),
            source_name: source_name.into(),
            converted_at,
        }
    }

    /// Derive the header for a source document, stamped with the local time.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::new(
            display_name(path),
            source_name(path),
            Local::now().naive_local(),
        )
    }

    /// Append the preamble to `output`.
    pub fn write_to(&self, output: &mut String) {
        output.push_str("# ");
        output.push_str(&self.title);
        output.push_str("\n\n**Source:** ");
        output.push_str(&self.source_name);
        output.push_str("\n**Converted:** ");
        output.push_str(&self.converted_at.format(TIMESTAMP_FORMAT).to_string());
        output.push_str("\n\n---\n\n");
    }

    /// Render the preamble as a standalone string.
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.write_to(&mut output);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap()
    }

    #[test]
    fn test_render_exact_shape() {
        let header = DocumentHeader::new("paper", "paper.pdf", fixed_time());
        assert_eq!(
            header.render(),
            "# paper\n\n**Source:** paper.pdf\n**Converted:** 2024-03-07 09:05:01\n\n---\n\n"
        );
    }

    #[test]
    fn test_for_path_uses_stem_and_file_name() {
        let header = DocumentHeader::for_path("/data/articles/Deep Learning.v2.pdf");
        assert_eq!(header.title, "Deep Learning.v2");
        assert_eq!(header.source_name, "Deep Learning.v2.pdf");
    }
}
