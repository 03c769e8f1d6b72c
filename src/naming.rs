//! Display names and output file names derived from source paths.

use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// Extension given to converted documents.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Longest file name, in bytes, accepted by common filesystems.
const MAX_FILE_NAME_BYTES: usize = 255;

/// Used when sanitizing leaves nothing behind.
const FALLBACK_NAME: &str = "document";

/// Device names reserved on Windows regardless of extension.
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

fn invalid_chars() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| {
        Regex::new(r#"[<>:"/\\|?*\x00-\x1F\x7F]"#).expect("invalid-character pattern compiles")
    })
}

/// Document title: the file name without its extension.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name of the source, including its extension.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Make a string safe to use as a file name on Windows, macOS and Linux.
///
/// Reserved characters are removed, trailing dots and spaces trimmed,
/// reserved device names suffixed with `_`, and the result capped at
/// 255 bytes.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = invalid_chars().replace_all(name, "");
    let mut cleaned = cleaned.trim_end_matches(['.', ' ']).to_string();

    if cleaned.len() > MAX_FILE_NAME_BYTES {
        let mut end = MAX_FILE_NAME_BYTES;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
        cleaned = cleaned.trim_end_matches(['.', ' ']).to_string();
    }

    if cleaned.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    let device = cleaned.split('.').next().unwrap_or_default().to_uppercase();
    if RESERVED_NAMES.contains(&device.as_str()) {
        cleaned.push('_');
    }

    cleaned
}

/// Default Markdown file name for a source document.
pub fn output_file_name(path: &Path) -> String {
    format!(
        "{}.{}",
        sanitize_file_name(&display_name(path)),
        MARKDOWN_EXTENSION
    )
}

/// Output file names for a batch, in the order of `paths`.
///
/// Names are compared case-insensitively. A name already taken gets `-2`,
/// `-3` and so on before the extension.
pub fn unique_output_names<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    let mut taken = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let stem = sanitize_file_name(&display_name(path.as_ref()));
            let mut name = format!("{}.{}", stem, MARKDOWN_EXTENSION);
            let mut n = 2;
            while !taken.insert(name.to_lowercase()) {
                name = format!("{}-{}.{}", stem, n, MARKDOWN_EXTENSION);
                n += 1;
            }
            if n > 2 {
                log::warn!("{} written as {}", path.as_ref().display(), name);
            }
            name
        })
        .collect()
}
