use anyhow::{Context, Result};
use clap::Parser;
use gemini_video_analyzer::ai::gemini::video::DEFAULT_IDLE_TIMEOUT;
use gemini_video_analyzer::app::{App, OutputSettings};
use gemini_video_analyzer::models::{
    AnalysisRequest, Config, Modality, DEFAULT_FILE_PREFIX, DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_MODEL, DEFAULT_VIDEO_MIME_TYPE, DEFAULT_VIDEO_URI,
};
use gemini_video_analyzer::{prompts, Error};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-video-analyzer")]
#[command(about = "Stream a Gemini analysis of a remote video")]
struct CliArgs {
    /// Gemini model ID.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Remote video reference (YouTube URL or Files API URI).
    #[arg(long, default_value = DEFAULT_VIDEO_URI)]
    video_uri: String,

    /// Declared media type of the video.
    #[arg(long, default_value = DEFAULT_VIDEO_MIME_TYPE, value_parser = parse_mime_type_arg)]
    video_mime_type: String,

    /// Instruction sent alongside the video.
    #[arg(long, conflicts_with = "prompt_file")]
    prompt: Option<String>,

    /// Read the instruction from a file instead.
    #[arg(long, value_name = "PATH")]
    prompt_file: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    max_output_tokens: u32,

    /// Output modality to request; repeat for several.
    #[arg(long = "modality", value_enum, default_values_t = [Modality::Text])]
    modalities: Vec<Modality>,

    /// Directory for files built from streamed binary data.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_FILE_PREFIX)]
    file_prefix: String,

    /// Give up when no data arrives for this many seconds.
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT.as_secs())]
    idle_timeout_secs: u64,
}

fn parse_mime_type_arg(input: &str) -> std::result::Result<String, String> {
    match input.split_once('/') {
        Some((kind, sub)) if !kind.is_empty() && !sub.is_empty() => Ok(input.to_string()),
        _ => Err(format!(
            "Invalid media type '{}'. Expected format: type/subtype",
            input
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_video_analyzer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(Error::MissingApiKey) => {
            println!("Error: {}", Error::MissingApiKey);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let request = AnalysisRequest {
        video_uri: args.video_uri,
        video_mime_type: args.video_mime_type,
        prompt: prompts::resolve(args.prompt, args.prompt_file.as_deref())
            .context("Failed to load prompt")?,
        response_modalities: args.modalities,
        max_output_tokens: args.max_output_tokens,
    };

    let app = App::new(
        &config,
        &args.model,
        Duration::from_secs(args.idle_timeout_secs),
        OutputSettings {
            output_dir: args.output_dir,
            file_prefix: args.file_prefix,
        },
    )
    .context("Failed to build Gemini client")?;

    info!("Starting video analysis");
    let summary = app
        .run(&request)
        .await
        .context("Video analysis stream failed")?;
    info!("Analysis complete ({} files saved)", summary.saved.len());

    Ok(())
}
