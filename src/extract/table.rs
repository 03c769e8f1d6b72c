//! Table detection from text alignment.
//!
//! Tables are inferred without ruling lines: spans are grouped into rows by
//! baseline, column anchors are taken from left edges that recur across many
//! rows, and runs of consecutive rows touching several anchors become tables.

use super::layout::TextSpan;
use super::TableGrid;

/// A table found on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    /// Baseline of the first row
    pub top_y: f32,
    /// Baseline of the last row
    pub bottom_y: f32,
    /// Column anchor X positions, left to right
    pub columns: Vec<f32>,
    /// Cell text, one inner vector per row; missing cells are empty strings
    pub rows: TableGrid,
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Fraction of multi-span rows that must share an anchor
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
    /// Left edges closer than this (points) share an anchor
    pub x_tolerance: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
            x_tolerance: 4.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Row<'a> {
    y: f32,
    spans: Vec<&'a TextSpan>,
}

/// Detects tables in a page's text spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables, top of page first.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<DetectedTable> {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            return Vec::new();
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < self.config.min_rows {
            return Vec::new();
        }

        let columns = self.detect_columns(&rows);
        log::debug!("TableDetector: {} rows, anchors {:?}", rows.len(), columns);
        if columns.is_empty() || columns.len() < self.config.min_columns {
            return Vec::new();
        }

        self.find_table_regions(&rows, &columns)
            .into_iter()
            .filter_map(|(start, end)| {
                let region = &rows[start..=end];
                if self.is_list_pattern(region) {
                    log::debug!("TableDetector: rows {}..={} look like a list", start, end);
                    return None;
                }
                Some(self.build_table(region, &columns))
            })
            .collect()
    }

    /// Group spans sharing a baseline, top to bottom, each row sorted by X.
    fn group_into_rows<'a>(&self, spans: &'a [TextSpan]) -> Vec<Row<'a>> {
        let mut sorted: Vec<&TextSpan> = spans.iter().collect();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut rows: Vec<Row> = Vec::new();
        for span in sorted {
            let tolerance = span.font_size.max(1.0) * self.config.y_tolerance_factor;
            match rows.last_mut() {
                Some(row) if (row.y - span.y).abs() <= tolerance => row.spans.push(span),
                Some(_) | None => rows.push(Row {
                    y: span.y,
                    spans: vec![span],
                }),
            }
        }

        for row in &mut rows {
            row.spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
        rows
    }

    /// Left edges that recur in enough multi-span rows, merged and capped.
    fn detect_columns(&self, rows: &[Row]) -> Vec<f32> {
        let multi: Vec<&Row> = rows.iter().filter(|r| r.spans.len() >= 2).collect();
        if multi.len() < self.config.min_rows {
            return Vec::new();
        }

        // (anchor x, rows supporting it)
        let mut clusters: Vec<(f32, usize)> = Vec::new();
        for row in &multi {
            let mut seen: Vec<usize> = Vec::new();
            for span in &row.spans {
                let hit = clusters
                    .iter()
                    .position(|(x, _)| (x - span.x).abs() <= self.config.x_tolerance);
                match hit {
                    Some(i) if !seen.contains(&i) => {
                        clusters[i].1 += 1;
                        seen.push(i);
                    }
                    Some(_) => {}
                    None => {
                        clusters.push((span.x, 1));
                        seen.push(clusters.len() - 1);
                    }
                }
            }
        }

        let needed = ((multi.len() as f32 * self.config.min_alignment_ratio).ceil() as usize)
            .max(self.config.min_rows);
        let mut anchors: Vec<f32> = clusters
            .into_iter()
            .filter(|(_, support)| *support >= needed)
            .map(|(x, _)| x)
            .collect();
        anchors.sort_by(f32::total_cmp);

        let mut merged: Vec<f32> = Vec::new();
        for x in anchors {
            match merged.last() {
                Some(last) if x - last < self.config.min_column_gap => {}
                _ => merged.push(x),
            }
        }

        if merged.len() > self.config.max_columns {
            log::debug!(
                "TableDetector: {} anchors exceed max {}, ignoring",
                merged.len(),
                self.config.max_columns
            );
            return Vec::new();
        }
        merged
    }

    /// Runs of consecutive rows that touch at least `min_columns` anchors.
    fn find_table_regions(&self, rows: &[Row], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if self.anchored_columns(row, columns) >= self.config.min_columns {
                start.get_or_insert(i);
                continue;
            }
            if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }
        regions
    }

    fn anchored_columns(&self, row: &Row, columns: &[f32]) -> usize {
        columns
            .iter()
            .filter(|col| {
                row.spans
                    .iter()
                    .any(|s| (s.x - **col).abs() <= self.config.x_tolerance)
            })
            .count()
    }

    fn build_table(&self, region: &[Row], columns: &[f32]) -> DetectedTable {
        let rows = region
            .iter()
            .map(|row| {
                let mut cells = vec![String::new(); columns.len()];
                for span in &row.spans {
                    let cell = &mut cells[self.column_for(span.x, columns)];
                    if !cell.is_empty() {
                        cell.push(' ');
                    }
                    cell.push_str(span.text.trim());
                }
                cells
            })
            .collect();

        DetectedTable {
            top_y: region.first().map(|r| r.y).unwrap_or_default(),
            bottom_y: region.last().map(|r| r.y).unwrap_or_default(),
            columns: columns.to_vec(),
            rows,
        }
    }

    /// Rightmost anchor at or left of `x`, first column otherwise.
    fn column_for(&self, x: f32, columns: &[f32]) -> usize {
        columns
            .iter()
            .rposition(|col| *col <= x + self.config.x_tolerance)
            .unwrap_or(0)
    }

    /// Numbered or bulleted lists align like two-column tables.
    fn is_list_pattern(&self, region: &[Row]) -> bool {
        let markers = region
            .iter()
            .filter(|row| row.spans.first().is_some_and(|s| is_list_marker(&s.text)))
            .count();
        markers * 2 > region.len()
    }
}

fn is_list_marker(text: &str) -> bool {
    let text = text.trim();
    if matches!(text, "•" | "●" | "○" | "■" | "□" | "▪" | "-" | "*" | "–") {
        return true;
    }
    let body = text
        .strip_prefix('(')
        .unwrap_or(text)
        .trim_end_matches(['.', ')']);
    text.len() > body.len()
        && !body.is_empty()
        && body.len() <= 3
        && body.chars().all(|c| c.is_ascii_alphanumeric())
}
