use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use er_core::domain::settings::AppSettings;
use er_core::domain::types::Tone;

/// Rewrites emails for a target audience and tone
#[derive(Parser, Debug)]
#[command(name = "email-rewriter")]
#[command(version)]
#[command(about = "Rewrite emails for a target audience and tone using an LLM")]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings overrides; take precedence over environment and `.env`
#[derive(ClapArgs, Debug, Default, Clone, PartialEq)]
pub struct GlobalOpts {
    /// Folder polled for .txt/.pdf/.docx files
    #[arg(long, global = true)]
    pub input_dir: Option<PathBuf>,

    /// Folder rewritten emails are written to
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Completion model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Output token limit per completion
    #[arg(long, global = true)]
    pub max_tokens: Option<u32>,

    /// Seconds between folder passes in `watch`
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: Option<u64>,

    /// Audience used for folder ingestion
    #[arg(long, global = true)]
    pub default_audience: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Rewrite email text (argument, or stdin when omitted or "-")
    Rewrite {
        text: Option<String>,
        #[arg(short, long)]
        audience: String,
        #[arg(short, long, default_value = "professional", value_parser = parse_tone)]
        tone: Tone,
        /// Aspect to emphasize; repeat or comma-separate
        #[arg(long = "focus", value_delimiter = ',')]
        focus_areas: Vec<String>,
        #[arg(long)]
        instructions: Option<String>,
        /// Do not write the result to the output folder
        #[arg(long)]
        no_save: bool,
    },
    /// Run an operation from a JSON body (file, or stdin when omitted)
    Request {
        #[arg(value_enum)]
        kind: RequestKind,
        #[arg(long)]
        body: Option<PathBuf>,
    },
    /// Extract text from a .txt/.pdf/.docx file and rewrite it
    Upload {
        file: PathBuf,
        #[arg(short, long)]
        audience: String,
        #[arg(short, long)]
        tone: Option<String>,
        /// Comma-separated focus areas
        #[arg(long = "focus")]
        focus_areas: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Tailor an application email to a job description
    JobApplication {
        text: Option<String>,
        #[arg(long)]
        job_description: String,
        #[arg(long)]
        company: Option<String>,
        /// Qualification to highlight; repeat or comma-separate
        #[arg(long = "qualification", value_delimiter = ',')]
        qualifications: Vec<String>,
    },
    /// Write a follow-up to a previous email
    FollowUp {
        text: Option<String>,
        #[arg(long)]
        context: String,
        #[arg(short, long, default_value = "professional", value_parser = parse_tone)]
        tone: Tone,
    },
    /// Summarize an email
    Summarize { text: Option<String> },
    /// Run one ingestion pass over the input folder
    ProcessFolder {
        #[arg(short, long)]
        audience: Option<String>,
    },
    /// Poll the input folder until Ctrl-C
    Watch,
    /// File counts and sizes of the input and output folders
    Stats,
    /// Accepted upload formats
    Formats,
    /// Configuration health
    Health,
    /// Model price list
    Pricing,
    /// Counters for this process (mostly useful after `watch`)
    Metrics,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Rewrite,
    JobApplication,
    FollowUp,
    Summary,
}

fn parse_tone(raw: &str) -> Result<Tone, String> {
    raw.parse::<Tone>().map_err(|e| e.to_string())
}

/// Settings in precedence order: defaults, data dirs, environment, CLI flags.
///
/// Input/output folders default to the platform data directory unless the
/// environment or a flag names them.
pub fn resolve_settings<F>(opts: &GlobalOpts, lookup: F) -> AppSettings
where
    F: Fn(&str) -> Option<String>,
{
    let is_set = |key: &str| lookup(key).is_some_and(|v| !v.trim().is_empty());
    let input_from_env = is_set("ER_INPUT_DIR");
    let output_from_env = is_set("ER_OUTPUT_DIR");

    let mut settings = AppSettings::from_lookup(&lookup);

    if let Some(base) = data_dir() {
        if !input_from_env {
            settings.input_dir = base.join("input");
        }
        if !output_from_env {
            settings.output_dir = base.join("output");
        }
    }

    if let Some(dir) = &opts.input_dir {
        settings.input_dir = dir.clone();
    }
    if let Some(dir) = &opts.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(model) = &opts.model {
        settings.model = model.clone();
    }
    if let Some(t) = opts.temperature {
        settings.temperature = t;
    }
    if let Some(n) = opts.max_tokens {
        settings.max_tokens = n;
    }
    if let Some(secs) = opts.poll_interval {
        settings.poll_interval_secs = secs;
    }
    if let Some(audience) = &opts.default_audience {
        settings.default_audience = audience.clone();
    }

    settings
}

fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("email-rewriter"))
}
