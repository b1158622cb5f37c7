use super::{
    ContentService, ImageGenerationService, SpeechService, TextModel, VideoGenerationService,
};
use crate::models::{
    GeneratedImage, GenerationRequest, GroundedText, Location, Operation, ReferenceMedia,
};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

fn provider_error(message: &Option<String>) -> Result<()> {
    match message {
        Some(message) => Err(Error::AiProvider(message.clone())),
        None => Ok(()),
    }
}

#[derive(Clone)]
pub struct MockImageClient {
    image: Arc<Mutex<GeneratedImage>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<GenerationRequest>>>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self {
            image: Arc::new(Mutex::new(GeneratedImage {
                mime_type: "image/jpeg".to_string(),
                bytes: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46],
            })),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_image_response(self, bytes: Vec<u8>) -> Self {
        self.image.lock().unwrap().bytes = bytes;
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Default for MockImageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageClient {
    async fn generate_image(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        *self.call_count.lock().unwrap() += 1;
        *self.last_request.lock().unwrap() = Some(request.clone());
        provider_error(&self.failure.lock().unwrap())?;
        Ok(self.image.lock().unwrap().clone())
    }
}

/// Scripted video backend.
///
/// `submit_video` returns the submit response; each `refresh_operation`
/// pops the next scripted snapshot, repeating the last one once exhausted.
#[derive(Clone)]
pub struct MockVideoClient {
    submit_response: Arc<Mutex<Operation>>,
    refresh_responses: Arc<Mutex<VecDeque<Operation>>>,
    video_bytes: Arc<Mutex<Vec<u8>>>,
    submit_failure: Arc<Mutex<Option<String>>>,
    refresh_failure: Arc<Mutex<Option<String>>>,
    download_failure: Arc<Mutex<Option<String>>>,
    submit_count: Arc<Mutex<usize>>,
    refresh_count: Arc<Mutex<usize>>,
    download_count: Arc<Mutex<usize>>,
    downloaded_uris: Arc<Mutex<Vec<String>>>,
}

pub const MOCK_OPERATION_NAME: &str = "models/mock-veo/operations/mock-op";

impl MockVideoClient {
    pub fn new() -> Self {
        Self {
            submit_response: Arc::new(Mutex::new(Operation::pending(MOCK_OPERATION_NAME))),
            refresh_responses: Arc::new(Mutex::new(VecDeque::new())),
            video_bytes: Arc::new(Mutex::new(vec![0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70])),
            submit_failure: Arc::new(Mutex::new(None)),
            refresh_failure: Arc::new(Mutex::new(None)),
            download_failure: Arc::new(Mutex::new(None)),
            submit_count: Arc::new(Mutex::new(0)),
            refresh_count: Arc::new(Mutex::new(0)),
            download_count: Arc::new(Mutex::new(0)),
            downloaded_uris: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_submit_response(self, operation: Operation) -> Self {
        *self.submit_response.lock().unwrap() = operation;
        self
    }

    pub fn with_refresh_response(self, operation: Operation) -> Self {
        self.refresh_responses.lock().unwrap().push_back(operation);
        self
    }

    pub fn with_video_bytes(self, bytes: Vec<u8>) -> Self {
        *self.video_bytes.lock().unwrap() = bytes;
        self
    }

    pub fn with_submit_failure(self, message: &str) -> Self {
        *self.submit_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn with_refresh_failure(self, message: &str) -> Self {
        *self.refresh_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn with_download_failure(self, message: &str) -> Self {
        *self.download_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_submit_count(&self) -> usize {
        *self.submit_count.lock().unwrap()
    }

    pub fn get_refresh_count(&self) -> usize {
        *self.refresh_count.lock().unwrap()
    }

    pub fn get_download_count(&self) -> usize {
        *self.download_count.lock().unwrap()
    }

    /// Submit and refresh calls; downloads are counted separately.
    pub fn get_call_count(&self) -> usize {
        self.get_submit_count() + self.get_refresh_count()
    }

    pub fn downloaded_uris(&self) -> Vec<String> {
        self.downloaded_uris.lock().unwrap().clone()
    }
}

impl Default for MockVideoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoGenerationService for MockVideoClient {
    async fn submit_video(&self, _request: &GenerationRequest) -> Result<Operation> {
        *self.submit_count.lock().unwrap() += 1;
        provider_error(&self.submit_failure.lock().unwrap())?;
        Ok(self.submit_response.lock().unwrap().clone())
    }

    async fn refresh_operation(&self, operation: &Operation) -> Result<Operation> {
        *self.refresh_count.lock().unwrap() += 1;
        provider_error(&self.refresh_failure.lock().unwrap())?;

        let mut responses = self.refresh_responses.lock().unwrap();
        let next = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        Ok(next.unwrap_or_else(|| Operation::completed(operation.name.clone(), None)))
    }

    async fn download_video(&self, uri: &str) -> Result<Vec<u8>> {
        *self.download_count.lock().unwrap() += 1;
        self.downloaded_uris.lock().unwrap().push(uri.to_string());
        provider_error(&self.download_failure.lock().unwrap())?;
        Ok(self.video_bytes.lock().unwrap().clone())
    }
}

#[derive(Clone)]
pub struct MockContentClient {
    text_responses: Arc<Mutex<Vec<String>>>,
    grounded_response: Arc<Mutex<GroundedText>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
    models: Arc<Mutex<Vec<TextModel>>>,
    locations: Arc<Mutex<Vec<Location>>>,
}

impl MockContentClient {
    pub fn new() -> Self {
        Self {
            text_responses: Arc::new(Mutex::new(Vec::new())),
            grounded_response: Arc::new(Mutex::new(GroundedText::default())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            models: Arc::new(Mutex::new(Vec::new())),
            locations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text_response(self, response: &str) -> Self {
        self.text_responses
            .lock()
            .unwrap()
            .push(response.to_string());
        self
    }

    pub fn with_grounded_response(self, response: GroundedText) -> Self {
        *self.grounded_response.lock().unwrap() = response;
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn models(&self) -> Vec<TextModel> {
        self.models.lock().unwrap().clone()
    }

    pub fn locations(&self) -> Vec<Location> {
        self.locations.lock().unwrap().clone()
    }

    fn record(&self, prompt: &str) -> Result<usize> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        self.prompts.lock().unwrap().push(prompt.to_string());
        provider_error(&self.failure.lock().unwrap())?;
        Ok(count)
    }

    fn next_text(&self, count: usize) -> String {
        let responses = self.text_responses.lock().unwrap();
        if responses.is_empty() {
            "Mock response".to_string()
        } else {
            responses[(count - 1) % responses.len()].clone()
        }
    }
}

impl Default for MockContentClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentService for MockContentClient {
    async fn generate_text(&self, prompt: &str, model: TextModel) -> Result<String> {
        self.models.lock().unwrap().push(model);
        let count = self.record(prompt)?;
        Ok(self.next_text(count))
    }

    async fn generate_with_search(&self, prompt: &str) -> Result<GroundedText> {
        self.record(prompt)?;
        Ok(self.grounded_response.lock().unwrap().clone())
    }

    async fn generate_with_maps(&self, prompt: &str, location: Location) -> Result<GroundedText> {
        self.locations.lock().unwrap().push(location);
        self.record(prompt)?;
        Ok(self.grounded_response.lock().unwrap().clone())
    }

    async fn analyze_video(&self, _video: &ReferenceMedia, prompt: &str) -> Result<String> {
        let count = self.record(prompt)?;
        Ok(self.next_text(count))
    }
}

#[derive(Clone)]
pub struct MockSpeechClient {
    audio_base64: Arc<Mutex<String>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockSpeechClient {
    pub fn new() -> Self {
        Self {
            // Two mono frames: 0 and i16::MAX.
            audio_base64: Arc::new(Mutex::new("AAD/fw==".to_string())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_audio_response(self, audio_base64: &str) -> Self {
        *self.audio_base64.lock().unwrap() = audio_base64.to_string();
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockSpeechClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechService for MockSpeechClient {
    async fn synthesize_speech(&self, _text: &str) -> Result<String> {
        *self.call_count.lock().unwrap() += 1;
        provider_error(&self.failure.lock().unwrap())?;
        Ok(self.audio_base64.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_video_client_replays_refresh_script() {
        let client = MockVideoClient::new()
            .with_refresh_response(Operation::pending(MOCK_OPERATION_NAME))
            .with_refresh_response(Operation::completed(
                MOCK_OPERATION_NAME,
                Some("https://files.example/v".to_string()),
            ));

        let op = client
            .submit_video(&GenerationRequest::new("x"))
            .await
            .unwrap();
        assert!(!op.done);

        let first = client.refresh_operation(&op).await.unwrap();
        assert!(!first.done);
        let second = client.refresh_operation(&first).await.unwrap();
        assert!(second.done);
        // Last scripted snapshot repeats.
        let third = client.refresh_operation(&second).await.unwrap();
        assert_eq!(third, second);

        assert_eq!(client.get_submit_count(), 1);
        assert_eq!(client.get_refresh_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_content_client_cycles_responses() {
        let client = MockContentClient::new()
            .with_text_response("first")
            .with_text_response("second");

        assert_eq!(
            client.generate_text("a", TextModel::Live).await.unwrap(),
            "first"
        );
        assert_eq!(
            client.generate_text("b", TextModel::Live).await.unwrap(),
            "second"
        );
        assert_eq!(
            client.generate_text("c", TextModel::Live).await.unwrap(),
            "first"
        );
        assert_eq!(client.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_failures_still_count_calls() {
        let client = MockSpeechClient::new().with_failure("boom");
        let err = client.synthesize_speech("hi").await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(client.get_call_count(), 1);
    }
}
