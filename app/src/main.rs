//! Email Rewriter - CLI entry point

mod cli;
mod commands;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use er_core::infra::completion::OpenAiClient;
use er_core::usecase::app_service::AppService;

use crate::cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // .env in the working directory, if any; real environment wins
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = cli::resolve_settings(&args.global, |key| std::env::var(key).ok());
    info!(
        model = %settings.model,
        input_dir = %settings.input_dir.display(),
        output_dir = %settings.output_dir.display(),
        "Configuration loaded"
    );
    if !settings.has_api_key() {
        warn!("OPENAI_API_KEY is not set; rewrite operations will fail");
    }

    let client = Arc::new(OpenAiClient::new(
        settings.api_key.clone(),
        settings.api_base_url.clone(),
        Duration::from_secs(settings.request_timeout_secs),
    ));
    let service = AppService::new(settings, client);

    match commands::run(&service, args.command).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let err = err.into_app_error();
            match serde_json::to_string_pretty(&err) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{err}"),
            }
            if err.recoverable {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
