use super::client::GeminiHttpClient;
use crate::ai::ImageGenerationService;
use crate::models::{GeneratedImage, GenerationRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OUTPUT_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PromptInstance>,
    parameters: ImageParameters,
}

#[derive(Debug, Serialize)]
struct PromptInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters {
    sample_count: u32,
    output_mime_type: String,
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

/// Imagen client using the synchronous `predict` endpoint.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }
}

super::impl_with_gemini_base_url!(GeminiImageClient);

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let body = PredictRequest {
            instances: vec![PromptInstance {
                prompt: request.prompt.clone(),
            }],
            parameters: ImageParameters {
                sample_count: request.output_config.count.max(1),
                output_mime_type: OUTPUT_MIME_TYPE.to_string(),
                aspect_ratio: request.output_config.aspect_ratio.to_string(),
            },
        };

        let response: PredictResponse = self.http.predict(&body).await?;

        let prediction = response
            .predictions
            .into_iter()
            .find(|p| p.bytes_base64_encoded.is_some())
            .ok_or_else(|| Error::AiProvider("No image data in Imagen response".to_string()))?;

        let mime_type = prediction
            .mime_type
            .unwrap_or_else(|| OUTPUT_MIME_TYPE.to_string());
        tracing::debug!("Imagen returned image with mime_type: {}", mime_type);

        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(prediction.bytes_base64_encoded.unwrap_or_default())
            .map_err(|e| Error::AiProvider(format!("Failed to decode Imagen base64 image: {}", e)))?;

        Ok(GeneratedImage { mime_type, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use wiremock::matchers::body_string_contains;
    use wiremock::{MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "imagen-4.0-generate-001";

    fn make_client(server: &MockServer) -> GeminiImageClient {
        GeminiImageClient::new("key".to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_image_decodes_prediction() {
        let server = MockServer::start().await;

        use base64::Engine as _;
        let fake_image = vec![0xFF, 0xD8, 0xFF, 0xE0];
        let b64 = base64::engine::general_purpose::STANDARD.encode(&fake_image);

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .and(body_string_contains("\"aspectRatio\":\"16:9\""))
            .and(body_string_contains("\"outputMimeType\":\"image/jpeg\""))
            .and(body_string_contains("\"sampleCount\":1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [{ "bytesBase64Encoded": b64, "mimeType": "image/jpeg" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let image = client
            .generate_image(&GenerationRequest::new("a brave hero"))
            .await
            .unwrap();

        assert_eq!(image.bytes, fake_image);
        assert_eq!(image.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client
            .generate_image(&GenerationRequest::new("a python at dusk"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_returns_serialization_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>upstream proxy</html>"))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client
            .generate_image(&GenerationRequest::new("a python at dusk"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[tokio::test]
    async fn test_empty_predictions_rejected() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client
            .generate_image(&GenerationRequest::new("a python at dusk"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No image data"));
    }

    #[tokio::test]
    async fn test_invalid_base64_rejected() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::PREDICT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [{ "bytesBase64Encoded": "!!!invalid-base64!!!" }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client
            .generate_image(&GenerationRequest::new("a python at dusk"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }
}
