//! Text extraction from uploaded or polled files.
//!
//! Dispatch is on the filename extension only, never on content sniffing.
//! - `.txt`: encoding fallback (UTF-8, UTF-16, Latin-1, Windows-1252)
//! - `.pdf`: per-page extraction via lopdf; unreadable pages are skipped
//! - `.docx`: top-level paragraphs via docx-rs

mod docx;
pub mod pdf;
mod text;

use std::path::Path;

use crate::domain::api::SupportedFormat;
use crate::domain::error::AppError;
use crate::domain::types::{ExtractedDocument, SourceFormat};

pub use text::TextEncoding;

/// Reason a single format extractor gave up
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExtractFailure {
    /// Zero-byte input
    Empty,
    /// PDF without pages
    NoPages,
    /// Parsed fine, but nothing readable came out
    NoText,
    /// None of the candidate text encodings fit
    Undecodable,
    /// Parser library error
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {extension}. Supported types: .txt, .pdf, .docx")]
    UnsupportedFormat { filename: String, extension: String },
    #[error("{} file is empty: {filename}", format_label(.format))]
    EmptyFile { filename: String, format: SourceFormat },
    #[error("{} file has no pages: {filename}", format_label(.format))]
    NoPages { filename: String, format: SourceFormat },
    #[error("No text content found in {} file: {filename}", format_label(.format))]
    NoText { filename: String, format: SourceFormat },
    #[error("Could not decode text file with supported encodings: {filename}")]
    Undecodable { filename: String },
    #[error("Failed to process {} file {filename}: {message}", format_label(.format))]
    Parse {
        filename: String,
        format: SourceFormat,
        message: String,
    },
    #[error("Failed to read {filename}: {message}")]
    Io { filename: String, message: String },
    #[error("Extraction task for {filename} failed: {message}")]
    Worker { filename: String, message: String },
}

fn format_label(format: &SourceFormat) -> &'static str {
    match format {
        SourceFormat::Txt => "Text",
        SourceFormat::Pdf => "PDF",
        SourceFormat::Docx => "DOCX",
    }
}

impl ExtractError {
    pub fn filename(&self) -> &str {
        match self {
            ExtractError::UnsupportedFormat { filename, .. }
            | ExtractError::EmptyFile { filename, .. }
            | ExtractError::NoPages { filename, .. }
            | ExtractError::NoText { filename, .. }
            | ExtractError::Undecodable { filename }
            | ExtractError::Parse { filename, .. }
            | ExtractError::Io { filename, .. }
            | ExtractError::Worker { filename, .. } => filename,
        }
    }

    /// Format the failure happened in, if the extension was recognized.
    pub fn format(&self) -> Option<SourceFormat> {
        match self {
            ExtractError::EmptyFile { format, .. }
            | ExtractError::NoPages { format, .. }
            | ExtractError::NoText { format, .. }
            | ExtractError::Parse { format, .. } => Some(*format),
            ExtractError::Undecodable { .. } => Some(SourceFormat::Txt),
            ExtractError::UnsupportedFormat { .. }
            | ExtractError::Io { .. }
            | ExtractError::Worker { .. } => None,
        }
    }

    fn from_failure(failure: ExtractFailure, filename: &str, format: SourceFormat) -> Self {
        let filename = filename.to_string();
        match failure {
            ExtractFailure::Empty => ExtractError::EmptyFile { filename, format },
            ExtractFailure::NoPages => ExtractError::NoPages { filename, format },
            ExtractFailure::NoText => ExtractError::NoText { filename, format },
            ExtractFailure::Undecodable => ExtractError::Undecodable { filename },
            ExtractFailure::Parse(message) => ExtractError::Parse {
                filename,
                format,
                message,
            },
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedFormat { .. } => AppError::unsupported_format(err.to_string()),
            ExtractError::Io { .. } => AppError::storage(err.to_string()),
            ExtractError::Worker { .. } => AppError::internal(err.to_string()),
            _ => AppError::empty_or_unreadable(err.to_string()),
        }
    }
}

pub(crate) fn unsupported(filename: &str) -> ExtractError {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    ExtractError::UnsupportedFormat {
        filename: filename.to_string(),
        extension,
    }
}

pub fn is_supported(filename: &str) -> bool {
    SourceFormat::from_filename(filename).is_some()
}

/// Listing of accepted formats with the given upload limit.
pub fn supported_formats(max_size_bytes: u64) -> Vec<SupportedFormat> {
    SourceFormat::ALL
        .iter()
        .map(|f| SupportedFormat::new(*f, max_size_bytes))
        .collect()
}

/// Converts raw bytes into normalized text, dispatching on `filename`'s extension.
pub fn extract(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractError> {
    let format = SourceFormat::from_filename(filename).ok_or_else(|| unsupported(filename))?;

    log::info!("Processing file: {filename} (type: {})", format.extension());

    let result = match format {
        SourceFormat::Txt => text::extract(bytes),
        SourceFormat::Pdf => pdf::extract(bytes),
        SourceFormat::Docx => docx::extract(bytes),
    };

    match result {
        Ok(text) => {
            log::debug!(
                "Extracted {} chars, {} words from {filename}",
                text.len(),
                text.split_whitespace().count()
            );
            Ok(ExtractedDocument {
                filename: filename.to_string(),
                text,
                size_bytes: bytes.len() as u64,
                source_format: format,
            })
        }
        Err(failure) => {
            let err = ExtractError::from_failure(failure, filename, format);
            log::error!("Failed to extract text from {filename}: {err}");
            Err(err)
        }
    }
}

/// Reads `path` and extracts its text.
pub async fn extract_path(path: &Path) -> Result<ExtractedDocument, ExtractError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if !is_supported(&filename) {
        return Err(unsupported(&filename));
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| ExtractError::Io {
        filename: filename.clone(),
        message: e.to_string(),
    })?;

    extract_blocking(bytes, filename).await
}

/// [`extract`] on the blocking pool; PDF and DOCX parsing is CPU-bound.
pub async fn extract_blocking(
    bytes: Vec<u8>,
    filename: String,
) -> Result<ExtractedDocument, ExtractError> {
    let name = filename.clone();
    tokio::task::spawn_blocking(move || extract(&bytes, &filename))
        .await
        .map_err(|e| ExtractError::Worker {
            filename: name,
            message: e.to_string(),
        })?
}
