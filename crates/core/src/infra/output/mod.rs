mod file;

pub use file::FileOutput;
pub(crate) use file::timestamp;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::error::AppError;

/// Destination for generated text
#[async_trait]
pub trait OutputTarget: Send + Sync {
    /// Stores `content` under a name derived from `prefix`; returns where it went.
    async fn save(&self, content: &str, prefix: &str) -> Result<PathBuf, AppError>;

    fn name(&self) -> &str;
}

/// Prefix for files saved from the rewrite operations
pub const API_OUTPUT_PREFIX: &str = "rewritten_email";

/// Prefix for files produced by folder ingestion, derived from the input file stem
pub fn ingestion_prefix(stem: &str) -> String {
    format!("processed_{stem}")
}
