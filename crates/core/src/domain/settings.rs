use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Completion model identifier
    pub model: String,
    /// Output token ceiling per completion call
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// OpenAI API key (never serialized)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL of the chat-completions API
    pub api_base_url: String,
    /// Transport timeout for the outbound call
    pub request_timeout_secs: u64,
    /// Polled input folder
    pub input_dir: PathBuf,
    /// Folder receiving generated files
    pub output_dir: PathBuf,
    /// Folder polling interval
    pub poll_interval_secs: u64,
    /// Files whose extracted text is shorter than this are skipped
    pub min_content_chars: usize,
    /// Upload size limit
    pub max_upload_bytes: u64,
    /// Audience used by folder ingestion
    pub default_audience: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            api_key: None,
            api_base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: 60,
            input_dir: PathBuf::from("data").join("input"),
            output_dir: PathBuf::from("data").join("output"),
            poll_interval_secs: 30,
            min_content_chars: 100,
            max_upload_bytes: 10 * 1024 * 1024,
            default_audience: "professional audience".to_string(),
        }
    }
}

impl AppSettings {
    /// Defaults overlaid with process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns. Unparsable values are
    /// logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("MODEL_NAME") {
            s.model = v;
        }
        if let Some(v) = parse_var(&get, "MAX_TOKENS") {
            s.max_tokens = v;
        }
        if let Some(v) = parse_var(&get, "TEMPERATURE") {
            s.temperature = v;
        }
        s.api_key = get("OPENAI_API_KEY");
        if let Some(v) = get("OPENAI_BASE_URL") {
            s.api_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = parse_var(&get, "REQUEST_TIMEOUT_SECS") {
            s.request_timeout_secs = v;
        }
        if let Some(v) = get("ER_INPUT_DIR") {
            s.input_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ER_OUTPUT_DIR") {
            s.output_dir = PathBuf::from(v);
        }
        if let Some(v) = parse_var(&get, "POLL_INTERVAL_SECS") {
            s.poll_interval_secs = v;
        }
        if let Some(v) = parse_var(&get, "MIN_CONTENT_CHARS") {
            s.min_content_chars = v;
        }
        if let Some(mb) = parse_var::<u64, _>(&get, "MAX_UPLOAD_MB") {
            match mb.checked_mul(1024 * 1024) {
                Some(bytes) => s.max_upload_bytes = bytes,
                None => log::warn!("Ignoring out-of-range value for MAX_UPLOAD_MB: {mb}"),
            }
        }
        if let Some(v) = get("DEFAULT_AUDIENCE") {
            s.default_audience = v;
        }

        s
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Option<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring invalid value for {key}: {raw:?}");
            None
        }
    }
}
