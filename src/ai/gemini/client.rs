use super::types::{GenerateContentResponse, StreamErrorEnvelope};
use crate::ai::ChunkStream;
use crate::{Error, Result};
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures_util::{future, StreamExt};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an HTTP client suited to long-lived streams.
///
/// Only connecting and each individual read are bounded; a stream that keeps
/// delivering data runs for as long as the server keeps it open.
pub fn streaming_http_client(idle_timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(idle_timeout))
        .read_timeout(idle_timeout)
        .build()
        .map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::Http(e)
        })
}

/// Lightweight Gemini REST client for streamed `generateContent` calls.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiHttpClient {
    /// Construct a Gemini client whose connection fails only after
    /// `idle_timeout` passes without any data arriving.
    ///
    /// `model` should be the bare model ID (for example `gemini-2.5-pro`),
    /// not a `models/...`-prefixed path segment.
    pub fn new(api_key: String, model: String, idle_timeout: Duration) -> Result<Self> {
        Ok(Self::new_with_client(
            api_key,
            model,
            streaming_http_client(idle_timeout)?,
        ))
    }

    pub fn new_with_client(api_key: String, model: String, client: Client) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Calls Gemini's `streamGenerateContent` endpoint in SSE mode and returns
    /// the decoded chunks as they arrive.
    pub async fn stream_generate_content<Req: Serialize>(
        &self,
        request: &Req,
    ) -> Result<ChunkStream> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        tracing::debug!("Gemini stream opened for model {}", self.model);

        let chunks = response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| future::ready(decode_event(event)));

        Ok(Box::pin(chunks))
    }
}

/// Turn one SSE event into a chunk. Blank keep-alive events are dropped.
fn decode_event(
    event: std::result::Result<Event, EventStreamError<reqwest::Error>>,
) -> Option<Result<GenerateContentResponse>> {
    let event = match event {
        Ok(event) => event,
        Err(EventStreamError::Transport(e)) if e.is_timeout() => {
            tracing::error!("Gemini stream stalled: {}", e);
            return Some(Err(Error::Stream(format!(
                "no data received within the idle timeout: {}",
                e
            ))));
        }
        Err(e) => {
            tracing::error!("Gemini stream interrupted: {}", e);
            return Some(Err(Error::Stream(e.to_string())));
        }
    };

    if event.data.trim().is_empty() {
        return None;
    }

    Some(parse_chunk(&event.data))
}

pub(crate) fn parse_chunk(data: &str) -> Result<GenerateContentResponse> {
    if let Ok(envelope) = serde_json::from_str::<StreamErrorEnvelope>(data) {
        let error = envelope.error;
        return Err(Error::AiProvider(format!(
            "Gemini stream error (code {}, status {}): {}",
            error.code.map(|c| c.to_string()).unwrap_or_else(|| "?".into()),
            error.status.as_deref().unwrap_or("UNKNOWN"),
            error.message.as_deref().unwrap_or("no message"),
        )));
    }

    serde_json::from_str(data).map_err(|e| {
        tracing::error!("Failed to parse Gemini chunk: {}\nData: {}", e, data);
        Error::AiProvider(format!("Failed to parse Gemini chunk: {}", e))
    })
}
