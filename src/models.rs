use crate::{prompts, Error};

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_VIDEO_URI: &str = "https://www.youtube.com/watch?v=OgMZTA19TEI";
pub const DEFAULT_VIDEO_MIME_TYPE: &str = "video/*";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 200_000;
pub const DEFAULT_FILE_PREFIX: &str = "gemini_output";

/// Output category requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Modality {
    Text,
    Image,
    Audio,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "TEXT",
            Modality::Image => "IMAGE",
            Modality::Audio => "AUDIO",
        }
    }
}

/// Everything needed to describe the one request sent per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub video_uri: String,
    pub video_mime_type: String,
    pub prompt: String,
    pub response_modalities: Vec<Modality>,
    pub max_output_tokens: u32,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            video_uri: DEFAULT_VIDEO_URI.to_string(),
            video_mime_type: DEFAULT_VIDEO_MIME_TYPE.to_string(),
            prompt: prompts::VIDEO_ANALYSIS.trim().to_string(),
            response_modalities: vec![Modality::Text],
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: Option<String>,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// An empty `GEMINI_API_KEY` is treated the same as a missing one.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::MissingApiKey)?;

        let gemini_base_url = match lookup("GEMINI_BASE_URL").filter(|url| !url.is_empty()) {
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                return Err(Error::Config(format!(
                    "GEMINI_BASE_URL must start with http:// or https://, got '{}'",
                    url
                )));
            }
            other => other.map(|url| url.trim_end_matches('/').to_string()),
        };

        Ok(Config {
            gemini_api_key,
            gemini_base_url,
        })
    }
}
