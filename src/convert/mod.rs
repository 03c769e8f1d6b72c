//! Per-document conversion pipeline: acquire text, structure it, save it.
//!
//! # Example
//!
//! ```no_run
//! use pdfdraft::convert::{ConvertOptions, Converter};
//!
//! fn main() -> pdfdraft::Result<()> {
//!     let converter = Converter::with_options(ConvertOptions::new().with_output_dir("drafts"));
//!     let outcome = converter.convert_file("paper.pdf")?;
//!     println!("wrote {}", outcome.output.display());
//!     Ok(())
//! }
//! ```

mod batch;

pub use batch::{BatchItem, BatchReport, ItemStatus, JsonFormat};

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::detect::has_document_extension;
use crate::error::{Error, Result};
use crate::extract::{ExtractionChain, MIN_CONTENT_CHARS};
use crate::naming::{output_file_name, unique_output_names};
use crate::structure::{structure_document_with_stats, ClassificationStats, DocumentHeader};

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Directory that receives the Markdown files
    pub output_dir: PathBuf,

    /// Output file name for single-file conversion (ignored for directories)
    pub output_name: Option<String>,

    /// Convert directory entries in parallel
    pub parallel: bool,

    /// Minimum trimmed characters before falling back to the next source
    pub min_content_chars: usize,

    /// NFC-normalize extracted text and expand ligatures
    pub normalize_unicode: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            output_name: None,
            parallel: true,
            min_content_chars: MIN_CONTENT_CHARS,
            normalize_unicode: true,
        }
    }
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the output file name.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Enable or disable parallel batch conversion.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the minimum-content threshold.
    pub fn with_min_content_chars(mut self, chars: usize) -> Self {
        self.min_content_chars = chars;
        self
    }

    /// Enable or disable Unicode normalization.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }
}

/// Result of converting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOutcome {
    /// Markdown file written
    pub output: PathBuf,

    /// Extraction source that produced the text
    pub source: String,

    /// Characters of text handed to the structuring engine
    pub chars_extracted: usize,

    /// False when no source reached the minimum-content threshold
    pub confident: bool,

    /// Line categories seen while structuring
    pub stats: ClassificationStats,
}

/// Converts PDF files into draft Markdown files.
#[derive(Debug)]
pub struct Converter {
    chain: ExtractionChain,
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with default options and extraction sources.
    pub fn new() -> Self {
        Self::with_options(ConvertOptions::default())
    }

    /// Create a converter with the default extraction sources.
    pub fn with_options(options: ConvertOptions) -> Self {
        Self {
            chain: Self::configure(ExtractionChain::with_defaults(), &options),
            options,
        }
    }

    /// Replace the extraction sources.
    ///
    /// The chain's threshold and normalization are taken from the options.
    pub fn with_chain(mut self, chain: ExtractionChain) -> Self {
        self.chain = Self::configure(chain, &self.options);
        self
    }

    fn configure(chain: ExtractionChain, options: &ConvertOptions) -> ExtractionChain {
        chain
            .with_min_content_chars(options.min_content_chars)
            .with_normalization(options.normalize_unicode)
    }

    /// Conversion options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Extraction chain in use.
    pub fn chain(&self) -> &ExtractionChain {
        &self.chain
    }

    /// Convert a file or every PDF in a directory.
    pub fn convert_path<P: AsRef<Path>>(&self, path: P) -> Result<BatchReport> {
        let path = path.as_ref();
        if path.is_file() {
            let status = self.convert_file(path).into();
            Ok(BatchReport::from_items(vec![BatchItem::new(path, status)]))
        } else if path.is_dir() {
            self.convert_dir(path)
        } else {
            Err(Error::InputNotFound(path.to_path_buf()))
        }
    }

    /// Convert one PDF and write its Markdown next to the others in `output_dir`.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<ConvertOutcome> {
        let path = path.as_ref();
        let name = self
            .options
            .output_name
            .clone()
            .unwrap_or_else(|| output_file_name(path));
        self.convert_to(path, &name)
    }

    /// Convert every PDF directly inside `dir`.
    ///
    /// Each document succeeds or fails on its own; a failure never stops the
    /// batch. The output name override does not apply here.
    pub fn convert_dir<P: AsRef<Path>>(&self, dir: P) -> Result<BatchReport> {
        self.convert_dir_with(dir, |_| {})
    }

    /// Like [`convert_dir`](Self::convert_dir), calling `on_item` as each
    /// document finishes. Calls may come from several threads.
    pub fn convert_dir_with<P, F>(&self, dir: P, on_item: F) -> Result<BatchReport>
    where
        P: AsRef<Path>,
        F: Fn(&BatchItem) + Sync + Send,
    {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::InputNotFound(dir.to_path_buf()));
        }

        let documents = list_documents(dir)?;
        if documents.is_empty() {
            return Err(Error::NoDocuments(dir.to_path_buf()));
        }
        log::info!("Found {} PDF files in {}", documents.len(), dir.display());

        // Names are fixed up front so no two documents share an output file.
        let jobs: Vec<(&PathBuf, String)> = documents
            .iter()
            .zip(unique_output_names(&documents))
            .collect();

        let convert = |(path, name): &(&PathBuf, String)| {
            let status = self.convert_to(path, name).into();
            let item = BatchItem::new(path, status);
            on_item(&item);
            item
        };

        let items = if self.options.parallel {
            jobs.par_iter().map(convert).collect()
        } else {
            jobs.iter().map(convert).collect()
        };

        Ok(BatchReport::from_items(items))
    }

    fn convert_to(&self, path: &Path, file_name: &str) -> Result<ConvertOutcome> {
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        log::info!("Converting {}", path.display());

        let acquired = self.chain.acquire(path)?;
        let header = DocumentHeader::for_path(path);
        let structured = structure_document_with_stats(&acquired.text, &header);

        let output = self.options.output_dir.join(file_name);
        save(&output, &structured.content)?;
        log::info!("Markdown saved to {}", output.display());

        Ok(ConvertOutcome {
            output,
            chars_extracted: acquired.char_count(),
            source: acquired.source,
            confident: acquired.confident,
            stats: structured.stats,
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// PDF files directly inside `dir`, sorted by path.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_document_extension(&path) {
            documents.push(path);
        }
    }
    documents.sort();
    Ok(documents)
}

fn save(output: &Path, content: &str) -> Result<()> {
    let persist = |source: std::io::Error| Error::Persist {
        path: output.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(persist)?;
    }
    fs::write(output, content).map_err(persist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::TextSource;

    struct Canned(&'static str);

    impl TextSource for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn extract(&self, _path: &Path) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn converter(out: &Path) -> Converter {
        Converter::with_options(ConvertOptions::new().with_output_dir(out))
            .with_chain(ExtractionChain::new().with_source(Canned("ABSTRACT\nShort text.")))
    }

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_output_dir("out")
            .with_output_name("draft.md")
            .with_parallel(false)
            .with_min_content_chars(100)
            .with_normalization(false);

        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert_eq!(options.output_name.as_deref(), Some("draft.md"));
        assert!(!options.parallel);
        assert_eq!(options.min_content_chars, 100);
        assert!(!options.normalize_unicode);
    }

    #[test]
    fn test_options_configure_chain() {
        let converter = Converter::with_options(ConvertOptions::new().with_min_content_chars(42));
        assert_eq!(converter.chain().min_content_chars(), 42);
        assert_eq!(converter.chain().source_names(), vec!["layout", "plain"]);
    }

    #[test]
    fn test_convert_file_writes_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("paper.pdf");
        fs::write(&input, b"%PDF-1.4\n").unwrap();

        let outcome = converter(dir.path()).convert_file(&input).unwrap();
        assert_eq!(outcome.output, dir.path().join("paper.md"));
        assert_eq!(outcome.source, "canned");
        assert!(!outcome.confident);
        assert_eq!(outcome.stats.section_headings, 1);

        let markdown = fs::read_to_string(&outcome.output).unwrap();
        assert!(markdown.starts_with("# paper\n\n**Source:** paper.pdf\n"));
        assert!(markdown.contains("\n## Abstract\n\n"));
    }

    #[test]
    fn test_output_name_override() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("paper.pdf");
        fs::write(&input, b"%PDF-1.4\n").unwrap();

        let converter = Converter::with_options(
            ConvertOptions::new()
                .with_output_dir(dir.path().join("nested"))
                .with_output_name("custom.md"),
        )
        .with_chain(ExtractionChain::new().with_source(Canned("text")));
        let outcome = converter.convert_file(&input).unwrap();
        assert_eq!(outcome.output, dir.path().join("nested").join("custom.md"));
        assert!(outcome.output.is_file());
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pdf");
        assert!(matches!(
            converter(dir.path()).convert_file(&missing),
            Err(Error::InputNotFound(_))
        ));
        assert!(matches!(
            converter(dir.path()).convert_path(&missing),
            Err(Error::InputNotFound(_))
        ));
    }

    #[test]
    fn test_list_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let names: Vec<String> = list_documents(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_persist_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let result = save(&blocker.join("out.md"), "content");
        assert!(matches!(result, Err(Error::Persist { .. })));
    }
}
