//! AI service integration for streamed video analysis
//!
//! Provides the streaming interface to Gemini's `streamGenerateContent` API
//! plus a scripted mock used by tests and local harnesses.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiVideoClient;
pub use mock::MockStreamClient;

use crate::ai::gemini::types::GenerateContentResponse;
use crate::models::AnalysisRequest;
use crate::Result;
use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

/// Lazy, finite, non-restartable sequence of response chunks, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

#[async_trait]
pub trait ContentStreamService: Send + Sync {
    async fn stream_content(&self, request: &AnalysisRequest) -> Result<ChunkStream>;
}
