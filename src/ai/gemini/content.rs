//! Gemini text generation: plain, search/maps grounded, and video analysis.

use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, InlineData, Part};
use crate::ai::{ContentService, TextModel};
use crate::models::{GroundedText, Location, ReferenceMedia};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<serde_json::Value>,
}

impl ContentRequest {
    fn plain(contents: Vec<Content>) -> Self {
        Self {
            contents,
            tools: Vec::new(),
            tool_config: None,
        }
    }
}

/// Model IDs used for each kind of text request.
#[derive(Debug, Clone)]
pub struct ContentModels {
    pub script: String,
    pub search: String,
    pub live: String,
    pub analysis: String,
}

impl Default for ContentModels {
    fn default() -> Self {
        Self {
            script: "gemini-2.5-flash".to_string(),
            search: "gemini-2.5-flash".to_string(),
            live: "gemini-2.5-flash-lite".to_string(),
            analysis: "gemini-2.5-pro".to_string(),
        }
    }
}

pub struct GeminiContentClient {
    script: GeminiHttpClient,
    search: GeminiHttpClient,
    live: GeminiHttpClient,
    analysis: GeminiHttpClient,
}

impl GeminiContentClient {
    pub fn new(api_key: String, models: ContentModels) -> Self {
        Self::new_with_client(api_key, models, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, models: ContentModels, client: reqwest::Client) -> Self {
        let build = |model: String, timeout: Duration| {
            GeminiHttpClient::new_with_client(api_key.clone(), model, timeout, client.clone())
        };

        Self {
            script: build(models.script, Duration::from_secs(60)),
            search: build(models.search, Duration::from_secs(60)),
            live: build(models.live, Duration::from_secs(30)),
            // Inline video uploads can be large.
            analysis: build(models.analysis, Duration::from_secs(300)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.script = self.script.with_base_url(base_url.clone());
        self.search = self.search.with_base_url(base_url.clone());
        self.live = self.live.with_base_url(base_url.clone());
        self.analysis = self.analysis.with_base_url(base_url);
        self
    }

    fn require_text(response: &GenerateContentResponse, what: &str) -> Result<String> {
        response
            .text()
            .ok_or_else(|| Error::AiProvider(format!("No text in Gemini {} response", what)))
    }

    async fn grounded(
        &self,
        prompt: &str,
        tool: serde_json::Value,
        tool_config: Option<serde_json::Value>,
    ) -> Result<GroundedText> {
        let request = ContentRequest {
            contents: vec![Content::user_text(prompt)],
            tools: vec![tool],
            tool_config,
        };

        let response: GenerateContentResponse = self.search.generate_content(&request).await?;
        let sources = response.sources();
        tracing::debug!("Grounded response carried {} sources", sources.len());

        Ok(GroundedText {
            text: Self::require_text(&response, "grounded")?,
            sources,
        })
    }
}

#[async_trait]
impl ContentService for GeminiContentClient {
    async fn generate_text(&self, prompt: &str, model: TextModel) -> Result<String> {
        let http = match model {
            TextModel::Script => &self.script,
            TextModel::Live => &self.live,
        };
        tracing::debug!("Generating text with {}", http.model());

        let request = ContentRequest::plain(vec![Content::user_text(prompt)]);
        let response: GenerateContentResponse = http.generate_content(&request).await?;
        Self::require_text(&response, "text")
    }

    async fn generate_with_search(&self, prompt: &str) -> Result<GroundedText> {
        self.grounded(prompt, json!({ "googleSearch": {} }), None)
            .await
    }

    async fn generate_with_maps(&self, prompt: &str, location: Location) -> Result<GroundedText> {
        self.grounded(
            prompt,
            json!({ "googleMaps": {} }),
            Some(json!({
                "retrievalConfig": {
                    "latLng": {
                        "latitude": location.latitude,
                        "longitude": location.longitude
                    }
                }
            })),
        )
        .await
    }

    async fn analyze_video(&self, video: &ReferenceMedia, prompt: &str) -> Result<String> {
        tracing::info!(
            "Analyzing video ({} bytes, {}) with {}",
            video.bytes.len(),
            video.mime_type,
            self.analysis.model()
        );

        let request = ContentRequest::plain(vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part::Text {
                    text: prompt.to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: video.mime_type.clone(),
                        data: video.to_base64(),
                    },
                },
            ],
        }]);

        let response: GenerateContentResponse = self.analysis.generate_content(&request).await?;
        Self::require_text(&response, "video analysis")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> GeminiContentClient {
        GeminiContentClient::new("test-key".to_string(), ContentModels::default())
            .with_base_url(server.uri())
    }

    fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    #[tokio::test]
    async fn test_generate_text_uses_live_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash-lite:generateContent"))
            .respond_with(text_response("breaking news"))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let text = client
            .generate_text("any updates?", TextModel::Live)
            .await
            .unwrap();
        assert_eq!(text, "breaking news");
    }

    #[tokio::test]
    async fn test_search_sends_tool_and_parses_sources() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"googleSearch\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Reticulated pythons are the longest." }] },
                    "groundingMetadata": {
                        "groundingChunks": [
                            { "web": { "uri": "https://snakes.example", "title": "Snakes" } }
                        ]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let result = client
            .generate_with_search("largest python?")
            .await
            .unwrap();

        assert_eq!(result.text, "Reticulated pythons are the longest.");
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].uri(), "https://snakes.example");
    }

    #[tokio::test]
    async fn test_maps_sends_location_and_parses_review_snippets() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"googleMaps\""))
            .and(body_string_contains("\"latLng\""))
            .and(body_string_contains("51.5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Try the rescue centre." }] },
                    "groundingMetadata": {
                        "groundingChunks": [{
                            "maps": {
                                "uri": "https://maps.example/p/1",
                                "title": "Rescue Centre",
                                "placeAnswerSources": {
                                    "reviewSnippets": [{
                                        "uri": "https://maps.example/r/1",
                                        "title": "Review",
                                        "text": "Kind volunteers"
                                    }]
                                }
                            }
                        }]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let result = client
            .generate_with_maps(
                "wildlife rescue nearby",
                Location {
                    latitude: 51.5,
                    longitude: -0.12,
                },
            )
            .await
            .unwrap();

        match &result.sources[0] {
            crate::models::GroundingSource::Maps {
                review_snippets, ..
            } => assert_eq!(review_snippets[0].text, "Kind volunteers"),
            other => panic!("expected maps source, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_analyze_video_sends_inline_data_to_analysis_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .and(body_string_contains("\"inlineData\""))
            .and(body_string_contains("\"mimeType\":\"video/mp4\""))
            .respond_with(text_response("A cow grazes calmly."))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let video = ReferenceMedia::new(vec![0, 1, 2, 3], "video/mp4");
        let text = client
            .analyze_video(&video, "Describe this video in detail.")
            .await
            .unwrap();
        assert_eq!(text, "A cow grazes calmly.");
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client
            .generate_text("x", TextModel::Script)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_empty_candidates_rejected() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client
            .generate_text("x", TextModel::Script)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }
}
