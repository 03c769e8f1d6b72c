//! Fallback extraction source backed by pdf-extract.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::error::{Error, Result};

use super::{read_pdf, BlobWriter, TextSource};

/// Plain page-by-page text via pdf-extract. No table detection.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainSource;

impl PlainSource {
    /// Create a new source.
    pub fn new() -> Self {
        Self
    }

    /// Build the text blob from in-memory PDF bytes.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed fonts instead of returning an error.
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }))
        .map_err(|payload| Error::TextExtract(panic_message(payload.as_ref())))??;

        let mut writer = BlobWriter::new();
        for (index, text) in pages.iter().enumerate() {
            writer.push_page(index as u32 + 1, text);
        }
        log::debug!("plain: {} pages with text", writer.page_count());
        Ok(writer.finish())
    }
}

impl TextSource for PlainSource {
    fn name(&self) -> &str {
        "plain"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let data = read_pdf(path)?;
        self.extract_bytes(&data)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("pdf-extract panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("pdf-extract panicked: {}", s)
    } else {
        "pdf-extract panicked".to_string()
    }
}
