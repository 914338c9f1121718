use serde::Serialize;

/// Machine-readable error codes shared by every inbound operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "E_VALIDATION")]
    Validation,
    #[serde(rename = "E_UNSUPPORTED_FORMAT")]
    UnsupportedFormat,
    #[serde(rename = "E_EMPTY_OR_UNREADABLE")]
    EmptyOrUnreadable,
    #[serde(rename = "E_CONFIGURATION")]
    Configuration,
    #[serde(rename = "E_UPSTREAM")]
    Upstream,
    #[serde(rename = "E_EMPTY_RESPONSE")]
    EmptyResponse,
    #[serde(rename = "E_STORAGE")]
    Storage,
    #[serde(rename = "E_INTERNAL")]
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Validation => "E_VALIDATION",
            ErrorCode::UnsupportedFormat => "E_UNSUPPORTED_FORMAT",
            ErrorCode::EmptyOrUnreadable => "E_EMPTY_OR_UNREADABLE",
            ErrorCode::Configuration => "E_CONFIGURATION",
            ErrorCode::Upstream => "E_UPSTREAM",
            ErrorCode::EmptyResponse => "E_EMPTY_RESPONSE",
            ErrorCode::Storage => "E_STORAGE",
            ErrorCode::Internal => "E_INTERNAL",
        }
    }

    /// Status a web layer should answer with.
    /// 4xx means "fix your input", 5xx means "try again later" or "operator problem".
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::Validation | ErrorCode::EmptyOrUnreadable => 422,
            ErrorCode::UnsupportedFormat => 415,
            ErrorCode::Configuration => 503,
            ErrorCode::Upstream | ErrorCode::EmptyResponse => 502,
            ErrorCode::Storage | ErrorCode::Internal => 500,
        }
    }
}

/// User-visible error (also the JSON error body)
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub recoverable: bool,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Validation,
            message: msg.into(),
            suggestion: None,
            recoverable: true,
        }
    }

    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::UnsupportedFormat,
            message: msg.into(),
            suggestion: Some("Please upload .txt, .pdf, or .docx files only".to_string()),
            recoverable: true,
        }
    }

    pub fn empty_or_unreadable(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::EmptyOrUnreadable,
            message: msg.into(),
            suggestion: Some("Please ensure the file contains readable text content".to_string()),
            recoverable: true,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Configuration,
            message: msg.into(),
            suggestion: Some("Set OPENAI_API_KEY in the environment or .env file".to_string()),
            recoverable: false,
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Upstream,
            message: msg.into(),
            suggestion: Some("Check your API key and quota, then try again later".to_string()),
            recoverable: true,
        }
    }

    pub fn empty_response(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::EmptyResponse,
            message: msg.into(),
            suggestion: Some("Try again later".to_string()),
            recoverable: true,
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Storage,
            message: msg.into(),
            suggestion: Some("Check folder permissions".to_string()),
            recoverable: false,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Internal,
            message: msg.into(),
            suggestion: None,
            recoverable: false,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_client_side() {
        assert_eq!(ErrorCode::Validation.http_status(), 422);
        assert_eq!(ErrorCode::UnsupportedFormat.http_status(), 415);
        assert_eq!(ErrorCode::EmptyOrUnreadable.http_status(), 422);
    }

    #[test]
    fn test_service_errors_are_server_side() {
        assert_eq!(ErrorCode::Configuration.http_status(), 503);
        assert_eq!(ErrorCode::Upstream.http_status(), 502);
        assert_eq!(ErrorCode::EmptyResponse.http_status(), 502);
        assert_eq!(ErrorCode::Internal.http_status(), 500);
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::validation("Text must contain at least 10 words");
        assert_eq!(
            err.to_string(),
            "[E_VALIDATION] Text must contain at least 10 words"
        );
    }

    #[test]
    fn test_with_suggestion_overrides() {
        let err = AppError::validation("too short").with_suggestion("write more");
        assert_eq!(err.suggestion.as_deref(), Some("write more"));
        assert!(err.recoverable);
    }
}
