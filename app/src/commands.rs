use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::sync::oneshot;

use er_core::domain::api::UploadRequest;
use er_core::domain::error::AppError;
use er_core::domain::types::{
    FollowUpRequest, JobApplicationRequest, RewriteRequest, SummaryRequest,
};
use er_core::usecase::app_service::AppService;

use crate::cli::{Command, RequestKind};

/// Failure of a CLI command
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    App(#[from] AppError),
    #[error("Failed to read {source_name}: {source}")]
    Read {
        source_name: String,
        source: std::io::Error,
    },
    #[error("Invalid JSON request body: {0}")]
    Body(serde_json::Error),
    #[error("Failed to serialize response: {0}")]
    Output(serde_json::Error),
}

impl CommandError {
    /// User-facing error in the same shape the service returns.
    pub fn into_app_error(self) -> AppError {
        match self {
            CommandError::App(err) => err,
            CommandError::Read { .. } => AppError::validation(self.to_string())
                .with_suggestion("Check that the path exists and is readable"),
            CommandError::Body(_) => AppError::validation(self.to_string())
                .with_suggestion("Send a JSON object matching the request schema"),
            CommandError::Output(_) => AppError::internal(self.to_string()),
        }
    }
}

type CmdResult<T> = Result<T, CommandError>;

/// Runs one subcommand and returns its pretty-printed JSON output.
pub async fn run(service: &AppService, command: Command) -> CmdResult<String> {
    match command {
        Command::Rewrite {
            text,
            audience,
            tone,
            focus_areas,
            instructions,
            no_save,
        } => {
            let mut request = RewriteRequest::new(read_text(text).await?, audience).with_tone(tone);
            if !focus_areas.is_empty() {
                request = request.with_focus_areas(focus_areas);
            }
            if let Some(extra) = instructions {
                request = request.with_instructions(extra);
            }
            request.save_output = !no_save;
            to_json(&service.rewrite_email(request).await?)
        }
        Command::Request { kind, body } => run_request(service, kind, body.as_deref()).await,
        Command::Upload {
            file,
            audience,
            tone,
            focus_areas,
            instructions,
        } => {
            let bytes = tokio::fs::read(&file).await.map_err(|e| CommandError::Read {
                source_name: file.display().to_string(),
                source: e,
            })?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let upload = UploadRequest {
                filename,
                bytes,
                target_audience: audience,
                tone,
                focus_areas,
                additional_instructions: instructions,
            };
            to_json(&service.rewrite_upload(upload).await?)
        }
        Command::JobApplication {
            text,
            job_description,
            company,
            qualifications,
        } => {
            let request = JobApplicationRequest {
                email_text: read_text(text).await?,
                job_description,
                company_name: company,
                key_qualifications: (!qualifications.is_empty()).then_some(qualifications),
                correlation_id: None,
            };
            to_json(&service.rewrite_job_application(request).await?)
        }
        Command::FollowUp { text, context, tone } => {
            let request = FollowUpRequest {
                email_text: read_text(text).await?,
                context,
                tone,
                correlation_id: None,
            };
            to_json(&service.follow_up(request).await?)
        }
        Command::Summarize { text } => {
            let request = SummaryRequest {
                email_text: read_text(text).await?,
                correlation_id: None,
            };
            to_json(&service.summarize(request).await?)
        }
        Command::ProcessFolder { audience } => {
            to_json(&service.process_input_folder(audience.as_deref()).await?)
        }
        Command::Watch => watch(service).await,
        Command::Stats => to_json(&service.folder_stats().await),
        Command::Formats => to_json(&service.supported_formats()),
        Command::Health => to_json(&service.health().await),
        Command::Pricing => to_json(&service.pricing()),
        Command::Metrics => to_json(&service.metrics()),
    }
}

async fn run_request(
    service: &AppService,
    kind: RequestKind,
    body: Option<&Path>,
) -> CmdResult<String> {
    let raw = match body {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CommandError::Read {
                source_name: path.display().to_string(),
                source: e,
            })?,
        None => read_stdin().await?,
    };

    match kind {
        RequestKind::Rewrite => {
            let request: RewriteRequest = parse_body(&raw)?;
            to_json(&service.rewrite_email(request).await?)
        }
        RequestKind::JobApplication => {
            let request: JobApplicationRequest = parse_body(&raw)?;
            to_json(&service.rewrite_job_application(request).await?)
        }
        RequestKind::FollowUp => {
            let request: FollowUpRequest = parse_body(&raw)?;
            to_json(&service.follow_up(request).await?)
        }
        RequestKind::Summary => {
            let request: SummaryRequest = parse_body(&raw)?;
            to_json(&service.summarize(request).await?)
        }
    }
}

/// Polls the input folder until Ctrl-C, then prints the session's metrics.
async fn watch(service: &AppService) -> CmdResult<String> {
    let monitor = service.monitor();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move { monitor.run(shutdown_rx).await });

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    tracing::info!("Shutdown requested, finishing current pass");
    let _ = shutdown_tx.send(());

    if let Err(e) = handle.await {
        return Err(AppError::internal(format!("Folder monitor task failed: {e}")).into());
    }

    to_json(&service.metrics())
}

fn parse_body<T: DeserializeOwned>(raw: &str) -> CmdResult<T> {
    serde_json::from_str(raw).map_err(CommandError::Body)
}

/// Text from the argument, or stdin when absent or `-`.
async fn read_text(text: Option<String>) -> CmdResult<String> {
    match text {
        Some(t) if t != "-" => Ok(t),
        _ => read_stdin().await,
    }
}

async fn read_stdin() -> CmdResult<String> {
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .map_err(|e| CommandError::Read {
            source_name: "stdin".to_string(),
            source: e,
        })?;
    Ok(buf)
}

fn to_json<T: Serialize>(value: &T) -> CmdResult<String> {
    serde_json::to_string_pretty(value).map_err(CommandError::Output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use er_core::domain::error::ErrorCode;
    use er_core::domain::settings::AppSettings;
    use er_core::domain::types::Tone;
    use er_core::infra::completion::StubCompletionClient;

    const EMAIL: &str = "hi team the quarterly numbers are in and they look better than we expected overall";

    fn service(dir: &tempfile::TempDir, stub: Arc<StubCompletionClient>) -> AppService {
        let settings = AppSettings {
            api_key: Some("sk-test".into()),
            input_dir: dir.path().join("input"),
            output_dir: dir.path().join("output"),
            ..AppSettings::default()
        };
        AppService::new(settings, stub)
    }

    #[tokio::test]
    async fn test_rewrite_command_prints_response() {
        let dir = tempfile::tempdir().unwrap();
        let stub = Arc::new(StubCompletionClient::replying("Team, Q3 beat forecast.", 40, 8));
        let svc = service(&dir, stub.clone());

        let out = run(
            &svc,
            Command::Rewrite {
                text: Some(EMAIL.into()),
                audience: "finance leadership team".into(),
                tone: Tone::Academic,
                focus_areas: vec!["numbers".into()],
                instructions: None,
                no_save: true,
            },
        )
        .await
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["rewritten_email"], "Team, Q3 beat forecast.");
        assert!(json["saved_to"].is_null());
        assert_eq!(json["metadata"]["tone"], "academic");
        assert!(stub.requests()[0].user_prompt.contains("- Emphasize numbers"));
    }

    #[tokio::test]
    async fn test_request_body_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let body = dir.path().join("summary.json");
        std::fs::write(&body, format!(r#"{{"email_text": "{EMAIL}"}}"#)).unwrap();

        let svc = service(&dir, Arc::new(StubCompletionClient::replying("- numbers are up", 5, 5)));
        let out = run(
            &svc,
            Command::Request {
                kind: RequestKind::Summary,
                body: Some(body),
            },
        )
        .await
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["rewritten_email"], "- numbers are up");
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let body = dir.path().join("bad.json");
        std::fs::write(&body, r#"{"target_audience": "x"}"#).unwrap();

        let svc = service(&dir, Arc::new(StubCompletionClient::replying("unused", 1, 1)));
        let err = run(
            &svc,
            Command::Request {
                kind: RequestKind::Rewrite,
                body: Some(body),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CommandError::Body(_)));
        assert_eq!(err.into_app_error().code, ErrorCode::Validation);
    }

    #[test]
    fn test_output_serialization_failure_is_internal() {
        // Non-string map keys cannot be written as JSON
        let unserializable = std::collections::BTreeMap::from([((1u8, 2u8), "x")]);
        let err = to_json(&unserializable).unwrap_err();
        assert!(matches!(err, CommandError::Output(_)));

        let app = err.into_app_error();
        assert_eq!(app.code, ErrorCode::Internal);
        assert!(app.message.starts_with("Failed to serialize response"));
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir, Arc::new(StubCompletionClient::replying("unused", 1, 1)));

        let err = run(
            &svc,
            Command::Upload {
                file: dir.path().join("nope.txt"),
                audience: "hiring managers".into(),
                tone: None,
                focus_areas: None,
                instructions: None,
            },
        )
        .await
        .unwrap_err();

        let app = err.into_app_error();
        assert_eq!(app.code, ErrorCode::Validation);
        assert!(app.message.contains("nope.txt"));
    }

    #[tokio::test]
    async fn test_upload_reads_file_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("draft.txt");
        std::fs::write(&file, EMAIL).unwrap();

        let stub = Arc::new(StubCompletionClient::replying("Rewritten", 3, 3));
        let svc = service(&dir, stub.clone());
        let out = run(
            &svc,
            Command::Upload {
                file,
                audience: "finance leadership team".into(),
                tone: Some("casual".into()),
                focus_areas: Some("clarity, tone".into()),
                instructions: None,
            },
        )
        .await
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["original_filename"], "draft.txt");
        assert_eq!(json["tone"], "casual");
        assert!(stub.requests()[0].user_prompt.contains("- Emphasize tone"));
    }

    #[tokio::test]
    async fn test_pricing_lists_models() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir, Arc::new(StubCompletionClient::replying("unused", 1, 1)));

        let out = run(&svc, Command::Pricing).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 5);
    }
}
