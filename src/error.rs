//! Error types for pdfdraft.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfdraft operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while acquiring, structuring, or saving a document.
///
/// The structuring engine itself never fails; every variant here comes from
/// the extraction sources, the filesystem, or input validation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version header is malformed.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Every extraction source failed or returned no text.
    #[error("Could not extract text from {}: {}", .path.display(), .reasons.join("; "))]
    NoText {
        /// Document that was being extracted
        path: PathBuf,
        /// One message per source that was attempted
        reasons: Vec<String>,
    },

    /// The input path is neither an existing file nor a directory.
    #[error("{} is not a valid file or directory", .0.display())]
    InputNotFound(PathBuf),

    /// A directory contained no convertible documents.
    #[error("No PDF files found in {}", .0.display())]
    NoDocuments(PathBuf),

    /// The Markdown output could not be written.
    #[error("Error saving markdown to {}: {source}", .path.display())]
    Persist {
        /// Destination that failed
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Report serialization failed.
    #[error("Report serialization error: {0}")]
    Report(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error means the document could not be acquired as text.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            Error::NoText { .. }
                | Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::PdfParse(_)
                | Error::Encrypted
                | Error::TextExtract(_)
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<pdf_extract::OutputError> for Error {
    fn from(err: pdf_extract::OutputError) -> Self {
        Error::TextExtract(err.to_string())
    }
}
