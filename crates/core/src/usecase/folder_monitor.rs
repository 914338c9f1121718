use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, Mutex};

use crate::domain::error::AppError;
use crate::domain::ingest::{BatchReport, FileReport};
use crate::domain::settings::AppSettings;
use crate::domain::types::RewriteRequest;
use crate::infra::extractor;
use crate::infra::folder;
use crate::infra::metrics::Metrics;
use crate::infra::output::{ingestion_prefix, OutputTarget};
use crate::infra::rewriter::EmailRewriter;

/// Folder ingestion parameters
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub input_dir: PathBuf,
    pub interval: Duration,
    pub min_content_chars: usize,
    pub default_audience: String,
}

impl From<&AppSettings> for MonitorConfig {
    fn from(settings: &AppSettings) -> Self {
        Self {
            input_dir: settings.input_dir.clone(),
            interval: Duration::from_secs(settings.poll_interval_secs.max(1)),
            min_content_chars: settings.min_content_chars,
            default_audience: settings.default_audience.clone(),
        }
    }
}

/// Polls the input folder and rewrites every supported file it finds.
///
/// Successful files move to `processed/`, failed ones to `errors/`; files
/// with too little text stay where they are. Passes are serialized through
/// the processed-set lock, so the periodic loop and an on-demand pass never
/// work on the same folder at once.
pub struct FolderMonitor {
    config: MonitorConfig,
    rewriter: Arc<EmailRewriter>,
    output: Arc<dyn OutputTarget>,
    metrics: Arc<Metrics>,
    processed: Mutex<HashSet<PathBuf>>,
}

impl FolderMonitor {
    pub fn new(
        config: MonitorConfig,
        rewriter: Arc<EmailRewriter>,
        output: Arc<dyn OutputTarget>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            config,
            rewriter,
            output,
            metrics,
            processed: Mutex::new(HashSet::new()),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.config.input_dir
    }

    /// Paths handled during this process lifetime
    pub async fn processed_count(&self) -> usize {
        self.processed.lock().await.len()
    }

    /// One scan over the input folder. `audience` overrides the default.
    /// Per-file failures land in the report; only a failing scan is an error.
    pub async fn process_pass(&self, audience: Option<&str>) -> Result<BatchReport, AppError> {
        let started = Instant::now();
        let audience = audience
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(self.config.default_audience.as_str());

        let mut processed = self.processed.lock().await;

        let files: Vec<PathBuf> = folder::scan_input_folder(&self.config.input_dir)
            .await?
            .into_iter()
            .filter(|p| !processed.contains(p))
            .collect();

        if files.is_empty() {
            log::debug!("No new files in {}", self.config.input_dir.display());
            return Ok(BatchReport::from_results(Vec::new()));
        }

        log::info!("Found {} new files to process", files.len());

        let mut results = Vec::with_capacity(files.len());
        for path in files {
            let report = self.process_file(&path, audience, &mut processed).await;
            results.push(report);
        }

        let report = BatchReport::from_results(results);
        self.metrics.record_batch(&report);
        self.metrics
            .record_latency("folder_pass", started.elapsed().as_millis() as u64);

        log::info!(
            "Folder pass done: {} processed, {} failed, {} skipped",
            report.processed,
            report.failed,
            report.skipped
        );
        Ok(report)
    }

    async fn process_file(
        &self,
        path: &Path,
        audience: &str,
        processed: &mut HashSet<PathBuf>,
    ) -> FileReport {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let correlation_id = uuid::Uuid::new_v4().to_string();

        log::info!("[{correlation_id}] Processing file: {name}");

        let doc = match extractor::extract_path(path).await {
            Ok(doc) => doc,
            Err(e) => return self.fail(path, &name, &AppError::from(e)).await,
        };

        let chars = doc.text.chars().count();
        if chars < self.config.min_content_chars {
            log::info!("[{correlation_id}] Skipping {name}: {chars} chars");
            return FileReport::skipped(
                name,
                format!(
                    "File too short (minimum {} characters)",
                    self.config.min_content_chars
                ),
            );
        }

        let mut request = RewriteRequest::new(doc.text, audience);
        request.correlation_id = Some(correlation_id.clone());

        let result = match self.rewriter.rewrite(&request).await {
            Ok(result) => result,
            Err(e) => return self.fail(path, &name, &AppError::from(e)).await,
        };
        self.metrics.record_usage(&result.usage, result.cost_usd);

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| name.clone());
        let output = match self.output.save(&result.content, &ingestion_prefix(&stem)).await {
            Ok(p) => p,
            Err(e) => return self.fail(path, &name, &e).await,
        };

        processed.insert(path.to_path_buf());

        let moved_to = match folder::move_to_processed(&self.config.input_dir, path).await {
            Ok(p) => Some(p.display().to_string()),
            Err(e) => {
                log::warn!("[{correlation_id}] {name} processed but not moved: {e}");
                None
            }
        };

        log::info!(
            "[{correlation_id}] Successfully processed {name} -> {}",
            output.display()
        );

        FileReport::success(name, output.display().to_string(), moved_to, correlation_id)
    }

    async fn fail(&self, path: &Path, name: &str, err: &AppError) -> FileReport {
        log::error!("Failed to process {name}: {err}");
        self.metrics.inc_error(err.code);

        let moved_to = match folder::move_to_errors(&self.config.input_dir, path).await {
            Ok(p) => Some(p.display().to_string()),
            Err(move_err) => {
                log::warn!("Could not move {name} to errors folder: {move_err}");
                None
            }
        };

        FileReport::error(name.to_string(), err.message.clone(), moved_to)
    }

    /// Runs a pass every `interval` until `shutdown` fires (or its sender is
    /// dropped). A pass in progress is finished before the loop exits.
    pub async fn run(&self, mut shutdown: oneshot::Receiver<()>) {
        log::info!(
            "Starting input folder monitoring: {} (every {:?})",
            self.config.input_dir.display(),
            self.config.interval
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Folder monitoring stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.process_pass(None).await {
                        log::error!("Error in monitoring loop: {e}");
                    }
                }
            }
        }
    }
}
