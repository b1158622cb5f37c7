//! Generative AI service integration
//!
//! Defines the capability traits the studio panels depend on and their
//! Gemini REST implementations. Mocks live alongside for tests and
//! offline harnesses.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiContentClient, GeminiImageClient, GeminiSpeechClient, GeminiVideoClient};
pub use mock::{MockContentClient, MockImageClient, MockSpeechClient, MockVideoClient};

use crate::models::{
    GeneratedImage, GenerationRequest, GroundedText, Location, Operation, ReferenceMedia,
};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(&self, request: &GenerationRequest) -> Result<GeneratedImage>;
}

/// Long-running video synthesis, split into its three remote steps.
#[async_trait]
pub trait VideoGenerationService: Send + Sync {
    async fn submit_video(&self, request: &GenerationRequest) -> Result<Operation>;
    async fn refresh_operation(&self, operation: &Operation) -> Result<Operation>;
    async fn download_video(&self, uri: &str) -> Result<Vec<u8>>;
}

/// Which configured text model a plain generation should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextModel {
    Script,
    Live,
}

#[async_trait]
pub trait ContentService: Send + Sync {
    async fn generate_text(&self, prompt: &str, model: TextModel) -> Result<String>;
    async fn generate_with_search(&self, prompt: &str) -> Result<GroundedText>;
    async fn generate_with_maps(&self, prompt: &str, location: Location) -> Result<GroundedText>;
    async fn analyze_video(&self, video: &ReferenceMedia, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Returns base64-encoded 16-bit little-endian PCM.
    async fn synthesize_speech(&self, text: &str) -> Result<String>;
}
