//! Veo video generation over Gemini long-running operations.

use super::client::GeminiHttpClient;
use crate::ai::VideoGenerationService;
use crate::models::{GenerationRequest, Operation};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
struct VideoRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<InlineImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: String,
    resolution: String,
    sample_count: u32,
}

#[derive(Debug, Deserialize)]
struct OperationEnvelope {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationError>,
    #[serde(default)]
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    #[serde(default)]
    uri: Option<String>,
}

impl From<OperationEnvelope> for Operation {
    fn from(envelope: OperationEnvelope) -> Self {
        let result_uri = envelope
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri)
            .filter(|uri| !uri.is_empty());

        let error = envelope.error.map(|e| match e.code {
            Some(code) => format!("{} (code {})", e.message, code),
            None => e.message,
        });

        Operation {
            name: envelope.name,
            // An error body means the job is over even if `done` was omitted.
            done: envelope.done || error.is_some(),
            result_uri,
            error,
        }
    }
}

pub struct GeminiVideoClient {
    http: GeminiHttpClient,
}

impl GeminiVideoClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(60),
                client,
            ),
        }
    }
}

super::impl_with_gemini_base_url!(GeminiVideoClient);

#[async_trait]
impl VideoGenerationService for GeminiVideoClient {
    async fn submit_video(&self, request: &GenerationRequest) -> Result<Operation> {
        let config = &request.output_config;
        if !config.aspect_ratio.supports_video() {
            return Err(Error::Validation(format!(
                "Video generation supports 16:9 or 9:16, not {}",
                config.aspect_ratio
            )));
        }

        let body = VideoRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image: request.reference_media.as_ref().map(|media| InlineImage {
                    bytes_base64_encoded: media.to_base64(),
                    mime_type: media.mime_type.clone(),
                }),
            }],
            parameters: VideoParameters {
                aspect_ratio: config.aspect_ratio.to_string(),
                resolution: config.resolution.as_str().to_string(),
                sample_count: config.count.max(1),
            },
        };

        let envelope: OperationEnvelope = self.http.predict_long_running(&body).await?;
        tracing::info!(
            "Submitted video job {} to {}",
            envelope.name,
            self.http.model()
        );
        Ok(envelope.into())
    }

    async fn refresh_operation(&self, operation: &Operation) -> Result<Operation> {
        let envelope: OperationEnvelope = self.http.get_operation(&operation.name).await?;
        Ok(envelope.into())
    }

    async fn download_video(&self, uri: &str) -> Result<Vec<u8>> {
        self.http.download(uri, DOWNLOAD_TIMEOUT).await
    }
}
