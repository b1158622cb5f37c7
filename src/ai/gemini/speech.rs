use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::SpeechService;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SpeechRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: SpeechGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechGenerationConfig {
    response_modalities: Vec<String>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

pub struct GeminiSpeechClient {
    http: GeminiHttpClient,
    voice: String,
}

impl GeminiSpeechClient {
    pub fn new(api_key: String, model: String, voice: String) -> Self {
        Self::new_with_client(api_key, model, voice, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        voice: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
            voice,
        }
    }
}

super::impl_with_gemini_base_url!(GeminiSpeechClient);

#[async_trait]
impl SpeechService for GeminiSpeechClient {
    async fn synthesize_speech(&self, text: &str) -> Result<String> {
        let request = SpeechRequest {
            contents: vec![Content {
                role: None,
                parts: vec![super::types::Part::Text {
                    text: prompts::render(prompts::NARRATION, &[("text", text)]),
                }],
            }],
            generation_config: SpeechGenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.voice.clone(),
                        },
                    },
                },
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let audio = response
            .first_inline_data()
            .filter(|d| !d.data.is_empty())
            .ok_or_else(|| Error::AiProvider("Audio generation failed.".to_string()))?;

        tracing::debug!(
            "Speech model returned {} base64 chars ({})",
            audio.data.len(),
            audio.mime_type
        );
        Ok(audio.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use wiremock::matchers::body_string_contains;
    use wiremock::{MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> GeminiSpeechClient {
        GeminiSpeechClient::new(
            "key".to_string(),
            "gemini-2.5-flash-preview-tts".to_string(),
            "Kore".to_string(),
        )
        .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_synthesize_requests_audio_with_voice() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"responseModalities\":[\"AUDIO\"]"))
            .and(body_string_contains("\"voiceName\":\"Kore\""))
            .and(body_string_contains("professional news anchor voice: Hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{
                            "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAD/fw==" }
                        }]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let audio = client.synthesize_speech("Hello").await.unwrap();
        assert_eq!(audio, "AAD/fw==");
    }

    #[tokio::test]
    async fn test_missing_audio_is_an_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "no audio" }] } }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client.synthesize_speech("Hello").await.unwrap_err();
        assert_eq!(err.to_string(), "Audio generation failed.");
    }
}
