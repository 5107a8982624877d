//! Application orchestration for a single streamed video analysis.

use crate::ai::{ContentStreamService, GeminiVideoClient};
use crate::dispatch::{DispatchSummary, ResponseDispatcher};
use crate::models::{AnalysisRequest, Config};
use crate::Result;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Where and how streamed binary output is written.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

/// Sends the analysis request and drives the response dispatcher.
pub struct App {
    service: Box<dyn ContentStreamService>,
    output: OutputSettings,
}

impl App {
    /// Build an app around any streaming service.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_service(service: Box<dyn ContentStreamService>, output: OutputSettings) -> Self {
        Self { service, output }
    }

    /// Construct an app backed by Gemini from an already loaded [`Config`].
    ///
    /// `idle_timeout` bounds the gap between received data, not the length of
    /// the whole stream.
    pub fn new(
        config: &Config,
        model: &str,
        idle_timeout: Duration,
        output: OutputSettings,
    ) -> Result<Self> {
        let mut client = GeminiVideoClient::new(
            config.gemini_api_key.clone(),
            model.to_string(),
            idle_timeout,
        )?;
        if let Some(base_url) = &config.gemini_base_url {
            info!("Using Gemini base URL override: {}", base_url);
            client = client.with_base_url(base_url.clone());
        }
        info!("Analysis provider: Gemini (model: {})", client.model());

        Ok(Self::with_service(Box::new(client), output))
    }

    /// Stream the analysis, printing text to stdout.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<DispatchSummary> {
        self.run_with_writer(request, std::io::stdout()).await
    }

    /// Stream the analysis, printing text to `out`.
    pub async fn run_with_writer<W: Write>(
        &self,
        request: &AnalysisRequest,
        out: W,
    ) -> Result<DispatchSummary> {
        fs::create_dir_all(&self.output.output_dir)?;

        let stream = self.service.stream_content(request).await?;

        let mut dispatcher = ResponseDispatcher::new(
            self.output.output_dir.clone(),
            self.output.file_prefix.clone(),
            out,
        );
        let summary = dispatcher.run(stream).await?;

        info!(
            "Stream finished: {} chunks ({} printed, {} skipped, {} files saved)",
            summary.chunks,
            summary.printed,
            summary.skipped,
            summary.saved.len()
        );
        Ok(summary)
    }
}
