use super::error::AppError;

/// Minimum word count for the email body
pub const MIN_EMAIL_WORDS: usize = 10;
/// Minimum word count for audience / job description / context
pub const MIN_CONTEXT_WORDS: usize = 2;
/// Character limit for the email body of JSON requests
pub const MAX_EMAIL_CHARS: usize = 5000;
/// Character limit for the target audience of JSON requests
pub const MAX_AUDIENCE_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must contain at least {minimum} words (got {actual})")]
    TooFewWords {
        field: &'static str,
        actual: usize,
        minimum: usize,
    },
    #[error("{field} must be at most {maximum} characters (got {actual})")]
    TooLong {
        field: &'static str,
        actual: usize,
        maximum: usize,
    },
    #[error("Unknown tone: '{0}' (expected professional, casual, or academic)")]
    UnknownTone(String),
    #[error("File size {size} bytes exceeds maximum allowed size ({limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("No filename provided")]
    MissingFilename,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let suggestion = match &err {
            ValidationError::Empty { .. } | ValidationError::TooFewWords { .. } => {
                "Provide more complete text content"
            }
            ValidationError::TooLong { .. } => "Shorten the text or upload it as a file",
            ValidationError::UnknownTone(_) => "Use one of: professional, casual, academic",
            ValidationError::FileTooLarge { .. } => "Please upload a smaller file",
            ValidationError::MissingFilename => "Please upload a file with a valid name",
        };
        AppError::validation(err.to_string()).with_suggestion(suggestion)
    }
}

/// Removes control characters. Newlines and tabs survive since they carry
/// the email's paragraph structure; `\r\n` and a lone `\r` become `\n`.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    out.push('\n');
                }
            }
            '\n' | '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Sanitizes `text` and checks it has at least `minimum` words.
/// Returns the sanitized text.
pub fn require_words(
    field: &'static str,
    text: &str,
    minimum: usize,
) -> Result<String, ValidationError> {
    let cleaned = sanitize(text);
    if cleaned.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }

    let actual = count_words(&cleaned);
    if actual < minimum {
        return Err(ValidationError::TooFewWords {
            field,
            actual,
            minimum,
        });
    }

    Ok(cleaned)
}

/// Checks `text` is at most `maximum` characters.
pub fn require_max_chars(
    field: &'static str,
    text: &str,
    maximum: usize,
) -> Result<(), ValidationError> {
    let actual = text.chars().count();
    if actual > maximum {
        return Err(ValidationError::TooLong {
            field,
            actual,
            maximum,
        });
    }
    Ok(())
}
