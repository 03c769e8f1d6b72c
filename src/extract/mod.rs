//! Text acquisition from PDF files.
//!
//! A [`TextSource`] turns a document into one linear text blob with
//! `--- Page N ---` markers and optional pre-rendered table blocks.
//! [`ExtractionChain`] tries sources in order until one returns enough text.

mod layout;
mod plain;
mod table;

pub use layout::{LayoutSource, TextSpan};
pub use plain::PlainSource;
pub use table::{DetectedTable, TableDetector, TableDetectorConfig};

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Minimum trimmed character count for a source's output to be accepted
/// without trying the next source.
pub const MIN_CONTENT_CHARS: usize = 500;

/// Rows of cell strings for one table.
pub type TableGrid = Vec<Vec<String>>;

/// Presentation-form ligatures and their plain-letter equivalents.
const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// A strategy able to pull text out of a document.
///
/// Implementations may fail, or succeed with too little text to be useful;
/// [`ExtractionChain`] decides what to do in either case.
pub trait TextSource: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Extract the document at `path` into a text blob.
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Text obtained for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
    /// Trimmed text blob
    pub text: String,
    /// Name of the source that produced it
    pub source: String,
    /// Whether the text reached the minimum-content threshold
    pub confident: bool,
}

impl Acquired {
    /// Character count of the text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Ordered list of extraction sources with a minimum-content threshold.
pub struct ExtractionChain {
    sources: Vec<Box<dyn TextSource>>,
    min_content_chars: usize,
    normalize: bool,
}

impl ExtractionChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            min_content_chars: MIN_CONTENT_CHARS,
            normalize: true,
        }
    }

    /// Layout-aware lopdf extraction first, pdf-extract as fallback.
    pub fn with_defaults() -> Self {
        Self::new()
            .with_source(LayoutSource::new())
            .with_source(PlainSource::new())
    }

    /// Append a source; earlier sources take priority.
    pub fn with_source(mut self, source: impl TextSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Set the minimum trimmed character count.
    pub fn with_min_content_chars(mut self, chars: usize) -> Self {
        self.min_content_chars = chars;
        self
    }

    /// Enable or disable Unicode normalization of extracted text.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Names of the configured sources, in priority order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Configured threshold.
    pub fn min_content_chars(&self) -> usize {
        self.min_content_chars
    }

    /// Acquire text for a document.
    ///
    /// The first source whose trimmed output reaches the threshold wins.
    /// When none does, the last non-empty output is returned with
    /// `confident == false`. When every source fails or returns nothing,
    /// [`Error::NoText`] lists each source's failure.
    ///
    /// Keeping short text when a later source fails or comes back empty is
    /// a deliberate widening: such documents are converted with
    /// `confident == false` instead of being skipped.
    pub fn acquire(&self, path: &Path) -> Result<Acquired> {
        let mut reasons = Vec::new();
        let mut best_effort: Option<Acquired> = None;

        for source in &self.sources {
            let raw = match source.extract(path) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("{} failed on {}: {}", source.name(), path.display(), e);
                    reasons.push(format!("{}: {}", source.name(), e));
                    continue;
                }
            };

            let text = if self.normalize {
                normalize_text(&raw)
            } else {
                raw
            };
            let trimmed = text.trim();
            let chars = trimmed.chars().count();
            log::debug!("{} extracted {} characters", source.name(), chars);

            if chars == 0 {
                reasons.push(format!("{}: no text", source.name()));
                continue;
            }

            let acquired = Acquired {
                text: trimmed.to_string(),
                source: source.name().to_string(),
                confident: chars >= self.min_content_chars,
            };
            if acquired.confident {
                return Ok(acquired);
            }

            log::warn!(
                "{} returned only {} characters (< {}), trying next source",
                source.name(),
                chars,
                self.min_content_chars
            );
            reasons.push(format!("{}: only {} characters", source.name(), chars));
            best_effort = Some(acquired);
        }

        match best_effort {
            Some(acquired) => {
                log::warn!(
                    "Using low-content text from {} for {}",
                    acquired.source,
                    path.display()
                );
                Ok(acquired)
            }
            None => Err(Error::NoText {
                path: PathBuf::from(path),
                reasons,
            }),
        }
    }
}

impl Default for ExtractionChain {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ExtractionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionChain")
            .field("sources", &self.source_names())
            .field("min_content_chars", &self.min_content_chars)
            .field("normalize", &self.normalize)
            .finish()
    }
}

/// NFC-normalize text and expand presentation-form ligatures.
pub fn normalize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.nfc() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, plain)) => result.push_str(plain),
            None => result.push(c),
        }
    }
    result
}

/// Builds the sentinel-delimited text blob that the structuring engine reads.
#[derive(Debug, Default)]
pub struct BlobWriter {
    buf: String,
    pages: usize,
}

impl BlobWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page's text under a `--- Page N ---` marker. Empty pages are skipped.
    pub fn push_page(&mut self, number: u32, text: &str) {
        if text.is_empty() {
            return;
        }
        let _ = write!(self.buf, "\n\n--- Page {} ---\n", number);
        self.buf.push_str(text);
        self.buf.push('\n');
        self.pages += 1;
    }

    /// Append a page's tables as Markdown pipe rows. Empty rows are skipped.
    pub fn push_tables(&mut self, number: u32, tables: &[TableGrid]) {
        if tables.is_empty() {
            return;
        }
        let _ = write!(self.buf, "\n### Tables on Page {}:\n", number);
        for (index, table) in tables.iter().enumerate() {
            let _ = write!(self.buf, "\n**Table {}:**\n", index + 1);
            for row in table.iter().filter(|row| !row.is_empty()) {
                self.buf.push_str("| ");
                self.buf.push_str(&row.join(" | "));
                self.buf.push_str(" |\n");
            }
            self.buf.push('\n');
        }
    }

    /// Number of pages that contributed text.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Current blob contents.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Finish and return the blob.
    pub fn finish(self) -> String {
        self.buf
    }
}

/// Read a whole file after confirming it looks like a PDF.
pub(crate) fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    let data = std::fs::read(path)?;
    crate::detect::detect_format_from_bytes(&data)?;
    Ok(data)
}
