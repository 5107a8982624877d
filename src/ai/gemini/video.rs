use super::client::GeminiHttpClient;
use super::types::{Content, FileData, GenerateContentRequest, GenerationConfig, Part};
use crate::ai::{ChunkStream, ContentStreamService};
use crate::models::AnalysisRequest;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// How long the stream may go without receiving any data.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Streams a Gemini analysis of a remote video.
pub struct GeminiVideoClient {
    http: GeminiHttpClient,
}

impl GeminiVideoClient {
    pub fn new(api_key: String, model: String, idle_timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: GeminiHttpClient::new(api_key, model, idle_timeout)?,
        })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    fn build_request(request: &AnalysisRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::FileData {
                        file_data: FileData {
                            file_uri: request.video_uri.clone(),
                            mime_type: request.video_mime_type.clone(),
                        },
                    },
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: request
                    .response_modalities
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
                max_output_tokens: Some(request.max_output_tokens),
            },
        }
    }
}

#[async_trait]
impl ContentStreamService for GeminiVideoClient {
    async fn stream_content(&self, request: &AnalysisRequest) -> Result<ChunkStream> {
        tracing::info!(
            "Requesting analysis of {} ({}) from {}",
            request.video_uri,
            request.video_mime_type,
            self.model()
        );

        let payload = Self::build_request(request);
        self.http.stream_generate_content(&payload).await
    }
}
