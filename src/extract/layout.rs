//! Primary extraction source backed by lopdf.
//!
//! Page text comes from lopdf's own text extraction. Tables are found by
//! replaying each page's content stream to recover positioned text spans
//! and running them through [`TableDetector`].

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

use super::table::TableDetector;
use super::{read_pdf, BlobWriter, TableGrid, TextSource};

/// Leading used by `T*` when no `TL` operator has set one.
const DEFAULT_LEADING: f32 = 12.0;

/// TJ adjustments beyond this (in thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A run of text at a known position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Decoded text
    pub text: String,
    /// X position of the span start
    pub x: f32,
    /// Baseline Y position
    pub y: f32,
    /// Effective font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size,
        }
    }
}

/// lopdf-based source producing page text plus detected tables.
#[derive(Debug, Default)]
pub struct LayoutSource {
    detector: TableDetector,
    detect_tables: bool,
}

impl LayoutSource {
    /// Create a source with table detection enabled.
    pub fn new() -> Self {
        Self {
            detector: TableDetector::new(),
            detect_tables: true,
        }
    }

    /// Use a custom table detector.
    pub fn with_detector(mut self, detector: TableDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Enable or disable table detection.
    pub fn with_tables(mut self, detect: bool) -> Self {
        self.detect_tables = detect;
        self
    }

    /// Build the text blob for an already loaded document.
    pub fn extract_document(&self, doc: &LopdfDocument) -> Result<String> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let mut writer = BlobWriter::new();
        for (page_num, page_id) in doc.get_pages() {
            match doc.extract_text(&[page_num]) {
                Ok(text) => writer.push_page(page_num, &text),
                Err(e) => log::warn!("Failed to extract text from page {}: {}", page_num, e),
            }

            if self.detect_tables {
                let tables = self.page_tables(doc, page_id, page_num);
                writer.push_tables(page_num, &tables);
            }
        }

        log::debug!("layout: {} pages with text", writer.page_count());
        Ok(writer.finish())
    }

    fn page_tables(&self, doc: &LopdfDocument, page_id: ObjectId, page_num: u32) -> Vec<TableGrid> {
        match page_spans(doc, page_id) {
            Ok(spans) => self
                .detector
                .detect(&spans)
                .into_iter()
                .map(|table| table.rows)
                .collect(),
            Err(e) => {
                log::debug!("No spans for page {}: {}", page_num, e);
                Vec::new()
            }
        }
    }
}

impl TextSource for LayoutSource {
    fn name(&self) -> &str {
        "layout"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let data = read_pdf(path)?;
        let doc = LopdfDocument::load_mem(&data)?;
        self.extract_document(&doc)
    }
}

/// Decode a page's content stream into positioned text spans.
pub fn page_spans(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<TextSpan>> {
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    let content = doc
        .get_page_content(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    let content = Content::decode(&content).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut collector = SpanCollector::new(doc, fonts);
    for op in &content.operations {
        collector.apply(&op.operator, &op.operands);
    }
    Ok(collector.spans)
}

/// Replays text operators, tracking the text matrix and current font.
struct SpanCollector<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    font: Option<&'a Dictionary>,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
    in_text: bool,
    spans: Vec<TextSpan>,
}

impl<'a> SpanCollector<'a> {
    fn new(doc: &'a LopdfDocument, fonts: BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            font: None,
            font_size: 12.0,
            leading: DEFAULT_LEADING,
            matrix: TextMatrix::default(),
            in_text: false,
            spans: Vec::new(),
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "BT" => {
                self.in_text = true;
                self.matrix = TextMatrix::default();
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let [Object::Name(name), size, ..] = operands {
                    self.font = self.fonts.get(name).copied();
                    self.font_size = number(size).unwrap_or(12.0);
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    self.leading = leading;
                }
            }
            "Td" => {
                if let [tx, ty, ..] = operands {
                    self.matrix
                        .translate(number(tx).unwrap_or(0.0), number(ty).unwrap_or(0.0));
                }
            }
            "TD" => {
                if let [tx, ty, ..] = operands {
                    let ty = number(ty).unwrap_or(0.0);
                    self.leading = -ty;
                    self.matrix.translate(number(tx).unwrap_or(0.0), ty);
                }
            }
            "Tm" => {
                if operands.len() >= 6 {
                    let v: Vec<f32> = operands
                        .iter()
                        .take(6)
                        .map(|o| number(o).unwrap_or(0.0))
                        .collect();
                    self.matrix.set(v[0], v[1], v[2], v[3], v[4], v[5]);
                }
            }
            "T*" => self.matrix.next_line(self.leading),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = self.decode(bytes);
                    self.push_span(text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = self.decode_array(items);
                    self.push_span(text);
                }
            }
            "'" => {
                self.matrix.next_line(self.leading);
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = self.decode(bytes);
                    self.push_span(text);
                }
            }
            "\"" => {
                self.matrix.next_line(self.leading);
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    let text = self.decode(bytes);
                    self.push_span(text);
                }
            }
            _ => {}
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self
            .font
            .and_then(|font| font.get_font_encoding(self.doc).ok());
        match encoding {
            Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    fn decode_array(&self, items: &[Object]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(bytes)),
                other => {
                    // Negative adjustments move right; large ones separate words.
                    let gap = -number(other).unwrap_or(0.0);
                    if gap > TJ_SPACE_THRESHOLD && !combined.is_empty() && !combined.ends_with(' ')
                    {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn push_span(&mut self, text: String) {
        if !self.in_text || text.trim().is_empty() {
            return;
        }
        let (x, y) = self.matrix.position();
        let size = self.font_size * self.matrix.scale();
        self.spans.push(TextSpan::new(text.trim(), x, y, size));
    }
}

#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self { a, b, c, d, e, f };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self, leading: f32) {
        self.translate(0.0, -leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decode string bytes when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
