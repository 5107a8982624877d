use super::gemini::types::{
    Blob, Candidate, GenerateContentResponse, ResponseContent, ResponsePart,
};
use super::{ChunkStream, ContentStreamService};
use crate::models::AnalysisRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Replays a scripted chunk sequence instead of calling the network.
pub struct MockStreamClient {
    chunks: Arc<Mutex<Vec<GenerateContentResponse>>>,
    fail_after: Option<usize>,
    requests: Arc<Mutex<Vec<AnalysisRequest>>>,
}

impl MockStreamClient {
    pub fn new() -> Self {
        Self {
            chunks: Arc::new(Mutex::new(Vec::new())),
            fail_after: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_chunk(self, chunk: GenerateContentResponse) -> Self {
        self.chunks.lock().unwrap().push(chunk);
        self
    }

    pub fn with_text_chunk(self, text: &str) -> Self {
        self.with_chunk(Self::text_chunk(text))
    }

    pub fn with_inline_chunk(self, mime_type: &str, base64_data: &str) -> Self {
        self.with_chunk(Self::inline_chunk(mime_type, base64_data))
    }

    /// Emit a stream error after `count` chunks have been delivered.
    pub fn with_failure_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<AnalysisRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn text_chunk(text: &str) -> GenerateContentResponse {
        Self::single_part_chunk(ResponsePart {
            text: Some(text.to_string()),
            ..ResponsePart::default()
        })
    }

    pub fn inline_chunk(mime_type: &str, base64_data: &str) -> GenerateContentResponse {
        Self::single_part_chunk(ResponsePart {
            inline_data: Some(Blob {
                mime_type: Some(mime_type.to_string()),
                data: Some(base64_data.to_string()),
            }),
            ..ResponsePart::default()
        })
    }

    fn single_part_chunk(part: ResponsePart) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: Some(vec![Candidate {
                content: Some(ResponseContent {
                    role: Some("model".to_string()),
                    parts: Some(vec![part]),
                }),
                finish_reason: None,
            }]),
            model_version: None,
        }
    }
}

impl Default for MockStreamClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStreamService for MockStreamClient {
    async fn stream_content(&self, request: &AnalysisRequest) -> Result<ChunkStream> {
        self.requests.lock().unwrap().push(request.clone());

        let mut items: Vec<Result<GenerateContentResponse>> = self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(Ok)
            .collect();

        if let Some(count) = self.fail_after {
            items.truncate(count);
            items.push(Err(Error::Stream("mock stream failure".to_string())));
        }

        Ok(Box::pin(futures_util::stream::iter(items)))
    }
}
