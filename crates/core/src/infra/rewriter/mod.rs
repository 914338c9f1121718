pub mod prompts;

use std::sync::Arc;

use crate::domain::error::AppError;
use crate::domain::settings::AppSettings;
use crate::domain::types::{
    FollowUpRequest, JobApplicationRequest, RewriteRequest, RewriteResult, SummaryRequest,
};
use crate::domain::validation::{require_words, ValidationError, MIN_CONTEXT_WORDS, MIN_EMAIL_WORDS};
use crate::infra::completion::{CompletionClient, CompletionError, CompletionRequest};
use crate::infra::pricing;

use prompts::{JobApplicationPromptParams, RewritePromptParams};

/// Rewrite failure, classified for the caller
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RewriteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Configuration(String),
    #[error("AI service error: {0}")]
    Upstream(CompletionError),
    #[error("{0}")]
    EmptyResponse(String),
}

impl From<CompletionError> for RewriteError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::MissingCredential => RewriteError::Configuration(err.to_string()),
            other => RewriteError::Upstream(other),
        }
    }
}

impl From<RewriteError> for AppError {
    fn from(err: RewriteError) -> Self {
        match err {
            RewriteError::Validation(e) => e.into(),
            RewriteError::Configuration(msg) => AppError::configuration(msg),
            RewriteError::Upstream(ref cause) => {
                let app = AppError::upstream(err.to_string());
                match cause {
                    CompletionError::Unauthorized(_) => {
                        app.with_suggestion("Check that OPENAI_API_KEY is valid")
                    }
                    CompletionError::RateLimited(_) => {
                        app.with_suggestion("Rate limit hit; wait a moment and try again")
                    }
                    CompletionError::QuotaExceeded(_) => {
                        app.with_suggestion("Check your OpenAI plan and billing details")
                    }
                    _ => app,
                }
            }
            RewriteError::EmptyResponse(msg) => AppError::empty_response(msg),
        }
    }
}

/// Model parameters for every completion call
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&AppSettings> for RewriteOptions {
    fn from(settings: &AppSettings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Validates requests, builds prompts, calls the completion service and
/// prices the result.
pub struct EmailRewriter {
    client: Arc<dyn CompletionClient>,
    options: RewriteOptions,
}

impl EmailRewriter {
    pub fn new(client: Arc<dyn CompletionClient>, options: RewriteOptions) -> Self {
        Self { client, options }
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    pub async fn rewrite(&self, request: &RewriteRequest) -> Result<RewriteResult, RewriteError> {
        let email = require_words("email_text", &request.email_text, MIN_EMAIL_WORDS)?;
        let audience = require_words("target_audience", &request.target_audience, MIN_CONTEXT_WORDS)?;

        let focus_areas = request.focus_areas.as_deref().unwrap_or_default();
        let user_prompt = prompts::rewrite_prompt(&RewritePromptParams {
            email_text: email.trim(),
            target_audience: audience.trim(),
            tone: request.tone.as_str(),
            focus_areas,
            constraints: request.constraints.as_ref(),
            additional_instructions: request.additional_instructions.as_deref(),
        });

        self.run("rewrite", user_prompt).await
    }

    pub async fn rewrite_job_application(
        &self,
        request: &JobApplicationRequest,
    ) -> Result<RewriteResult, RewriteError> {
        let email = require_words("email_text", &request.email_text, MIN_EMAIL_WORDS)?;
        let job = require_words("job_description", &request.job_description, MIN_CONTEXT_WORDS)?;

        let user_prompt = prompts::job_application_prompt(&JobApplicationPromptParams {
            email_text: email.trim(),
            job_description: job.trim(),
            company_name: request.company_name.as_deref(),
            key_qualifications: request.key_qualifications.as_deref().unwrap_or_default(),
        });

        self.run("job_application", user_prompt).await
    }

    pub async fn follow_up(&self, request: &FollowUpRequest) -> Result<RewriteResult, RewriteError> {
        let email = require_words("email_text", &request.email_text, MIN_EMAIL_WORDS)?;
        let context = require_words("context", &request.context, MIN_CONTEXT_WORDS)?;

        let user_prompt = prompts::follow_up_prompt(email.trim(), context.trim(), request.tone.as_str());
        self.run("follow_up", user_prompt).await
    }

    pub async fn summarize(&self, request: &SummaryRequest) -> Result<RewriteResult, RewriteError> {
        let email = require_words("email_text", &request.email_text, MIN_EMAIL_WORDS)?;

        let user_prompt = prompts::summary_prompt(email.trim());
        self.run("summary", user_prompt).await
    }

    async fn run(&self, kind: &str, user_prompt: String) -> Result<RewriteResult, RewriteError> {
        let request = CompletionRequest {
            model: self.options.model.clone(),
            system_prompt: prompts::system_prompt().to_string(),
            user_prompt,
            temperature: self.options.temperature,
            max_output_tokens: self.options.max_tokens,
        };

        log::debug!(
            "Calling {} for {kind} (model: {}, prompt: {} chars)",
            self.client.name(),
            request.model,
            request.user_prompt.len()
        );

        let completion = self.client.complete(request).await.map_err(|e| {
            log::error!("Completion call for {kind} failed: {e}");
            RewriteError::from(e)
        })?;

        let content = completion
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RewriteError::EmptyResponse("Empty response from AI service".to_string()))?;

        let usage = completion.usage.ok_or_else(|| {
            RewriteError::EmptyResponse("AI service response did not include token usage".to_string())
        })?;

        let cost_usd = pricing::cost(usage.input_tokens, usage.output_tokens, &self.options.model);

        log::info!(
            "{kind} complete: {} tokens ({} in / {} out), ${cost_usd:.6}",
            usage.total_tokens,
            usage.input_tokens,
            usage.output_tokens
        );

        Ok(RewriteResult {
            content,
            usage,
            cost_usd,
            model: self.options.model.clone(),
        })
    }
}
