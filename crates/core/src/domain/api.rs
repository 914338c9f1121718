//! Request/response payloads of the inbound surface.
//! A web layer only has to (de)serialize these.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ingest::BatchReport;
use super::types::SourceFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

/// Metadata attached to every rewrite-style response
#[derive(Debug, Clone, Serialize)]
pub struct RewriteMetadata {
    pub timestamp: String,
    pub processing_time: f64,
    pub tokens_used: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub model_used: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

/// Rewrite operation response
#[derive(Debug, Clone, Serialize)]
pub struct RewriteResponse {
    pub status: Status,
    pub rewritten_email: String,
    pub saved_to: Option<String>,
    pub metadata: RewriteMetadata,
}

/// Multipart-equivalent upload request
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub target_audience: String,
    pub tone: Option<String>,
    /// Comma-separated
    pub focus_areas: Option<String>,
    pub additional_instructions: Option<String>,
}

impl UploadRequest {
    /// Splits the comma-separated focus areas, dropping blanks.
    pub fn focus_area_list(&self) -> Option<Vec<String>> {
        let raw = self.focus_areas.as_deref()?;
        let areas: Vec<String> = raw
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if areas.is_empty() {
            None
        } else {
            Some(areas)
        }
    }
}

/// Upload operation response
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub status: Status,
    pub rewritten_email: String,
    pub original_filename: String,
    pub source_format: SourceFormat,
    pub target_audience: String,
    pub tone: String,
    pub processing_time: f64,
    pub model_used: String,
    pub tokens_used: u64,
    pub cost_usd: f64,
    pub correlation_id: String,
    pub timestamp: String,
}

/// Health of an external dependency
#[derive(Debug, Clone, Serialize)]
pub struct Dependencies {
    pub openai: String,
    pub file_system: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime: f64,
    pub message: Option<String>,
    pub dependencies: Dependencies,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportedFormat {
    pub extension: &'static str,
    pub mime_type: &'static str,
    pub description: &'static str,
    pub max_size_mb: u64,
}

impl SupportedFormat {
    pub fn new(format: SourceFormat, max_size_bytes: u64) -> Self {
        Self {
            extension: format.extension(),
            mime_type: format.mime_type(),
            description: format.description(),
            max_size_mb: max_size_bytes / (1024 * 1024),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportedFormatsResponse {
    pub supported_formats: Vec<SupportedFormat>,
    pub input_folder: String,
    pub output_folder: String,
}

/// Snapshot of a folder's contents
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderStats {
    pub path: String,
    pub exists: bool,
    pub total_files: usize,
    pub total_directories: usize,
    pub file_types: BTreeMap<String, usize>,
    pub total_size_mb: f64,
    pub supported_files: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderStatsResponse {
    pub status: Status,
    pub input_folder: FolderStats,
    pub output_folder: FolderStats,
    pub timestamp: String,
}

/// On-demand folder pass response
#[derive(Debug, Clone, Serialize)]
pub struct ProcessFolderResponse {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub input_folder: String,
    pub request_id: String,
    #[serde(flatten)]
    pub report: BatchReport,
}

/// One row of the pricing listing
#[derive(Debug, Clone, Serialize)]
pub struct ModelPricing {
    pub model: &'static str,
    pub input_per_1k: f64,
    pub output_per_1k: f64,
    pub description: &'static str,
}
