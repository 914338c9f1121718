use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Rewrite tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Academic,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Professional, Tone::Casual, Tone::Academic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Academic => "academic",
        }
    }
}

impl FromStr for Tone {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "professional" => Ok(Tone::Professional),
            "casual" => Ok(Tone::Casual),
            "academic" => Ok(Tone::Academic),
            other => Err(ValidationError::UnknownTone(other.to_string())),
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional hard limits rendered into the prompt's constraints block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_include: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub avoid: Vec<String>,
}

impl RewriteConstraints {
    pub fn is_empty(&self) -> bool {
        self.max_length.is_none() && self.must_include.is_empty() && self.avoid.is_empty()
    }
}

/// Inbound rewrite request (JSON body of the rewrite operation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub email_text: String,
    pub target_audience: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub focus_areas: Option<Vec<String>>,
    #[serde(default)]
    pub additional_instructions: Option<String>,
    #[serde(default)]
    pub constraints: Option<RewriteConstraints>,
    #[serde(default = "default_save_output")]
    pub save_output: bool,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

fn default_save_output() -> bool {
    true
}

impl RewriteRequest {
    pub fn new(email_text: impl Into<String>, target_audience: impl Into<String>) -> Self {
        Self {
            email_text: email_text.into(),
            target_audience: target_audience.into(),
            tone: Tone::default(),
            focus_areas: None,
            additional_instructions: None,
            constraints: None,
            save_output: true,
            correlation_id: None,
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_focus_areas(mut self, areas: Vec<String>) -> Self {
        self.focus_areas = Some(areas);
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.additional_instructions = Some(instructions.into());
        self
    }
}

/// Job application rewrite request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplicationRequest {
    pub email_text: String,
    pub job_description: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub key_qualifications: Option<Vec<String>>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// Follow-up email request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub email_text: String,
    pub context: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// Summary request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub email_text: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// Token counters reported by the completion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// Normalized outcome of one completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteResult {
    pub content: String,
    pub usage: TokenUsage,
    pub cost_usd: f64,
    pub model: String,
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Txt,
    Pdf,
    Docx,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 3] = [SourceFormat::Txt, SourceFormat::Pdf, SourceFormat::Docx];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Txt => "txt",
            SourceFormat::Pdf => "pdf",
            SourceFormat::Docx => "docx",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Txt => ".txt",
            SourceFormat::Pdf => ".pdf",
            SourceFormat::Docx => ".docx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SourceFormat::Txt => "text/plain",
            SourceFormat::Pdf => "application/pdf",
            SourceFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SourceFormat::Txt => "Plain text files",
            SourceFormat::Pdf => "PDF documents",
            SourceFormat::Docx => "Microsoft Word documents",
        }
    }

    /// Resolves the format from the filename extension only (case-insensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())?;

        match ext.as_str() {
            "txt" => Some(SourceFormat::Txt),
            "pdf" => Some(SourceFormat::Pdf),
            "docx" => Some(SourceFormat::Docx),
            _ => None,
        }
    }
}

/// Text pulled out of an uploaded or polled file
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub filename: String,
    pub text: String,
    pub size_bytes: u64,
    pub source_format: SourceFormat,
}
