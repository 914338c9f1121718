use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::api::{
    Dependencies, FolderStatsResponse, HealthResponse, ModelPricing, ProcessFolderResponse,
    RewriteMetadata, RewriteResponse, Status, SupportedFormatsResponse, UploadRequest,
    UploadResponse,
};
use crate::domain::error::AppError;
use crate::domain::settings::AppSettings;
use crate::domain::types::{
    FollowUpRequest, JobApplicationRequest, RewriteRequest, RewriteResult, SourceFormat,
    SummaryRequest, Tone,
};
use crate::domain::validation::{
    require_max_chars, ValidationError, MAX_AUDIENCE_CHARS, MAX_EMAIL_CHARS,
};
use crate::infra::completion::CompletionClient;
use crate::infra::extractor;
use crate::infra::folder;
use crate::infra::metrics::{Metrics, MetricsSummary};
use crate::infra::output::{FileOutput, OutputTarget, API_OUTPUT_PREFIX};
use crate::infra::pricing;
use crate::infra::rewriter::{EmailRewriter, RewriteError, RewriteOptions};
use crate::usecase::folder_monitor::{FolderMonitor, MonitorConfig};

/// Uploaded files must yield at least this many characters of text
const MIN_UPLOAD_TEXT_CHARS: usize = 10;

/// Long-lived application state behind every inbound operation
pub struct AppService {
    settings: AppSettings,
    rewriter: Arc<EmailRewriter>,
    output: Arc<dyn OutputTarget>,
    metrics: Arc<Metrics>,
    monitor: Arc<FolderMonitor>,
    started_at: Instant,
}

/// Per-call context carried into the response metadata
struct CallContext {
    correlation_id: String,
    started: Instant,
    target_audience: Option<String>,
    tone: Option<String>,
}

impl CallContext {
    fn new(correlation_id: Option<&str>) -> Self {
        let correlation_id = correlation_id
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self {
            correlation_id,
            started: Instant::now(),
            target_audience: None,
            tone: None,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl AppService {
    /// Writes generated files into `settings.output_dir`.
    pub fn new(settings: AppSettings, client: Arc<dyn CompletionClient>) -> Self {
        let output: Arc<dyn OutputTarget> = Arc::new(FileOutput::new(settings.output_dir.clone()));
        Self::with_output(settings, client, output)
    }

    pub fn with_output(
        settings: AppSettings,
        client: Arc<dyn CompletionClient>,
        output: Arc<dyn OutputTarget>,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let rewriter = Arc::new(EmailRewriter::new(client, RewriteOptions::from(&settings)));
        let monitor = Arc::new(FolderMonitor::new(
            MonitorConfig::from(&settings),
            rewriter.clone(),
            output.clone(),
            metrics.clone(),
        ));

        log::info!(
            "AppService ready (model: {}, client: {}, input: {}, output: {})",
            settings.model,
            rewriter.client_name(),
            settings.input_dir.display(),
            settings.output_dir.display()
        );

        Self {
            settings,
            rewriter,
            output,
            metrics,
            monitor,
            started_at: Instant::now(),
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Folder monitor shared with the periodic loop
    pub fn monitor(&self) -> Arc<FolderMonitor> {
        self.monitor.clone()
    }

    // ==================== Rewrite ====================

    pub async fn rewrite_email(&self, request: RewriteRequest) -> Result<RewriteResponse, AppError> {
        let mut ctx = CallContext::new(request.correlation_id.as_deref());
        ctx.target_audience = Some(request.target_audience.clone());
        ctx.tone = Some(request.tone.to_string());
        log::info!("[{}] Processing email rewrite", ctx.correlation_id);

        require_max_chars("email_text", &request.email_text, MAX_EMAIL_CHARS)
            .and_then(|_| {
                require_max_chars("target_audience", &request.target_audience, MAX_AUDIENCE_CHARS)
            })
            .map_err(|e| self.fail(&ctx, e.into()))?;

        let outcome = self.rewriter.rewrite(&request).await;
        let result = self.settle(&ctx, outcome)?;

        let saved_to = if request.save_output {
            self.save(&ctx, &result.content).await
        } else {
            None
        };

        self.metrics.inc_requests_succeeded();
        self.metrics
            .record_latency("rewrite", ctx.elapsed().as_millis() as u64);
        Ok(self.response(&ctx, result, saved_to))
    }

    pub async fn rewrite_upload(&self, upload: UploadRequest) -> Result<UploadResponse, AppError> {
        let ctx = CallContext::new(None);
        log::info!("[{}] Processing upload: {}", ctx.correlation_id, upload.filename);

        let prepared = self.prepare_upload(&upload).await;
        let (request, source_format) = prepared.map_err(|e| self.fail(&ctx, e))?;

        let outcome = self.rewriter.rewrite(&request).await;
        let result = self.settle(&ctx, outcome)?;

        self.metrics.inc_uploads_succeeded();
        self.metrics
            .record_latency("upload", ctx.elapsed().as_millis() as u64);

        log::info!(
            "[{}] File rewritten: {} | {:.2}s | {} tokens | ${:.4}",
            ctx.correlation_id,
            upload.filename,
            ctx.elapsed().as_secs_f64(),
            result.usage.total_tokens,
            result.cost_usd
        );

        Ok(UploadResponse {
            status: Status::Success,
            rewritten_email: result.content,
            original_filename: upload.filename,
            source_format,
            target_audience: request.target_audience,
            tone: request.tone.to_string(),
            processing_time: ctx.elapsed().as_secs_f64(),
            model_used: result.model,
            tokens_used: result.usage.total_tokens,
            cost_usd: result.cost_usd,
            correlation_id: ctx.correlation_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Upload checks in order: filename, format, size, tone, extracted text.
    async fn prepare_upload(
        &self,
        upload: &UploadRequest,
    ) -> Result<(RewriteRequest, SourceFormat), AppError> {
        if upload.filename.trim().is_empty() {
            return Err(ValidationError::MissingFilename.into());
        }
        if !extractor::is_supported(&upload.filename) {
            return Err(extractor::unsupported(&upload.filename).into());
        }

        let size = upload.bytes.len() as u64;
        if size > self.settings.max_upload_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                limit: self.settings.max_upload_bytes,
            }
            .into());
        }

        let tone = match upload.tone.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(raw) => raw.parse::<Tone>()?,
            None => Tone::default(),
        };

        let doc = extractor::extract_blocking(upload.bytes.clone(), upload.filename.clone()).await?;

        if doc.text.trim().chars().count() < MIN_UPLOAD_TEXT_CHARS {
            return Err(AppError::empty_or_unreadable(
                "Extracted text is too short or empty",
            ));
        }

        let mut request = RewriteRequest::new(doc.text, upload.target_audience.clone());
        request.tone = tone;
        request.focus_areas = upload.focus_area_list();
        request.additional_instructions = upload
            .additional_instructions
            .clone()
            .filter(|s| !s.trim().is_empty());
        request.save_output = false;

        Ok((request, doc.source_format))
    }

    pub async fn rewrite_job_application(
        &self,
        request: JobApplicationRequest,
    ) -> Result<RewriteResponse, AppError> {
        let ctx = CallContext::new(request.correlation_id.as_deref());
        log::info!("[{}] Processing job application rewrite", ctx.correlation_id);

        self.check_email_length(&ctx, &request.email_text)?;

        let outcome = self.rewriter.rewrite_job_application(&request).await;
        let result = self.settle(&ctx, outcome)?;

        self.metrics.inc_requests_succeeded();
        self.metrics
            .record_latency("rewrite", ctx.elapsed().as_millis() as u64);
        Ok(self.response(&ctx, result, None))
    }

    pub async fn follow_up(&self, request: FollowUpRequest) -> Result<RewriteResponse, AppError> {
        let mut ctx = CallContext::new(request.correlation_id.as_deref());
        ctx.tone = Some(request.tone.to_string());
        log::info!("[{}] Processing follow-up email", ctx.correlation_id);

        self.check_email_length(&ctx, &request.email_text)?;

        let outcome = self.rewriter.follow_up(&request).await;
        let result = self.settle(&ctx, outcome)?;

        self.metrics.inc_requests_succeeded();
        self.metrics
            .record_latency("rewrite", ctx.elapsed().as_millis() as u64);
        Ok(self.response(&ctx, result, None))
    }

    pub async fn summarize(&self, request: SummaryRequest) -> Result<RewriteResponse, AppError> {
        let ctx = CallContext::new(request.correlation_id.as_deref());
        log::info!("[{}] Summarizing email", ctx.correlation_id);

        self.check_email_length(&ctx, &request.email_text)?;

        let outcome = self.rewriter.summarize(&request).await;
        let result = self.settle(&ctx, outcome)?;

        self.metrics.inc_requests_succeeded();
        self.metrics
            .record_latency("rewrite", ctx.elapsed().as_millis() as u64);
        Ok(self.response(&ctx, result, None))
    }

    /// JSON bodies cap the email text; uploads and folder files do not.
    fn check_email_length(&self, ctx: &CallContext, email_text: &str) -> Result<(), AppError> {
        require_max_chars("email_text", email_text, MAX_EMAIL_CHARS)
            .map_err(|e| self.fail(ctx, e.into()))
    }

    /// Records usage for a finished call, or logs and counts its failure.
    fn settle(
        &self,
        ctx: &CallContext,
        outcome: Result<RewriteResult, RewriteError>,
    ) -> Result<RewriteResult, AppError> {
        match outcome {
            Ok(result) => {
                self.metrics.record_usage(&result.usage, result.cost_usd);
                log::info!(
                    "[{}] Completed in {:.2}s | {} tokens | ${:.4}",
                    ctx.correlation_id,
                    ctx.elapsed().as_secs_f64(),
                    result.usage.total_tokens,
                    result.cost_usd
                );
                Ok(result)
            }
            Err(e) => Err(self.fail(ctx, e.into())),
        }
    }

    fn fail(&self, ctx: &CallContext, err: AppError) -> AppError {
        log::error!("[{}] {err}", ctx.correlation_id);
        self.metrics.inc_error(err.code);
        err
    }

    /// Best-effort save; a write failure is logged, not returned.
    async fn save(&self, ctx: &CallContext, content: &str) -> Option<String> {
        match self.output.save(content, API_OUTPUT_PREFIX).await {
            Ok(path) => Some(path.display().to_string()),
            Err(e) => {
                log::warn!("[{}] Could not save output: {e}", ctx.correlation_id);
                self.metrics.inc_error(e.code);
                None
            }
        }
    }

    fn response(&self, ctx: &CallContext, result: RewriteResult, saved_to: Option<String>) -> RewriteResponse {
        RewriteResponse {
            status: Status::Success,
            rewritten_email: result.content,
            saved_to,
            metadata: RewriteMetadata {
                timestamp: chrono::Utc::now().to_rfc3339(),
                processing_time: ctx.elapsed().as_secs_f64(),
                tokens_used: result.usage.total_tokens,
                input_tokens: result.usage.input_tokens,
                output_tokens: result.usage.output_tokens,
                cost_usd: result.cost_usd,
                model_used: result.model,
                correlation_id: ctx.correlation_id.clone(),
                target_audience: ctx.target_audience.clone(),
                tone: ctx.tone.clone(),
            },
        }
    }

    // ==================== Folders ====================

    pub async fn process_input_folder(
        &self,
        target_audience: Option<&str>,
    ) -> Result<ProcessFolderResponse, AppError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        log::info!("[{request_id}] Processing input folder on demand");

        let report = self.monitor.process_pass(target_audience).await.map_err(|e| {
            log::error!("[{request_id}] Failed to process input folder: {e}");
            self.metrics.inc_error(e.code);
            e
        })?;

        let message = report
            .is_empty()
            .then(|| "No files found in input folder".to_string());

        Ok(ProcessFolderResponse {
            status: Status::Success,
            message,
            input_folder: self.settings.input_dir.display().to_string(),
            request_id,
            report,
        })
    }

    pub async fn folder_stats(&self) -> FolderStatsResponse {
        FolderStatsResponse {
            status: Status::Success,
            input_folder: folder::folder_stats(&self.settings.input_dir).await,
            output_folder: folder::folder_stats(&self.settings.output_dir).await,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn supported_formats(&self) -> SupportedFormatsResponse {
        SupportedFormatsResponse {
            supported_formats: extractor::supported_formats(self.settings.max_upload_bytes),
            input_folder: self.settings.input_dir.display().to_string(),
            output_folder: self.settings.output_dir.display().to_string(),
        }
    }

    // ==================== Status ====================

    /// Reports configuration health without calling the completion service.
    pub async fn health(&self) -> HealthResponse {
        let has_key = self.settings.has_api_key();
        let fs_ok = tokio::fs::create_dir_all(&self.settings.output_dir).await.is_ok()
            && tokio::fs::create_dir_all(&self.settings.input_dir).await.is_ok();

        let status = if has_key && fs_ok { "healthy" } else { "degraded" };

        HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime: self.started_at.elapsed().as_secs_f64(),
            message: Some(format!("Service is {status}")),
            dependencies: Dependencies {
                openai: if has_key { "configured" } else { "missing_api_key" }.to_string(),
                file_system: if fs_ok { "ok" } else { "error" }.to_string(),
            },
        }
    }

    pub fn pricing(&self) -> Vec<ModelPricing> {
        pricing::entries()
            .iter()
            .map(|e| ModelPricing {
                model: e.model,
                input_per_1k: e.price.input_per_1k,
                output_per_1k: e.price.output_per_1k,
                description: e.description,
            })
            .collect()
    }

    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }
}
