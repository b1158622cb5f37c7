//! Command-line orchestration: drive the studio panels and persist artifacts.

use crate::ai::gemini::content::ContentModels;
use crate::ai::{GeminiContentClient, GeminiImageClient, GeminiSpeechClient, GeminiVideoClient};
use crate::audio;
use crate::credentials::EnvCredentialStore;
use crate::location::FixedLocationProvider;
use crate::media::MediaStore;
use crate::models::{AspectRatio, Config, ReferenceMedia};
use crate::studio::{ContentMode, CredentialGate, PanelState, Studio, StudioServices, Tab};
use crate::{Error, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Owns the studio and the directory artifacts are written to.
pub struct App {
    studio: Studio,
    output_dir: PathBuf,
}

/// Turn a settled panel state into the value or the message it displays.
fn settled<'a, T>(state: &'a PanelState<T>, what: &str) -> Result<&'a T> {
    match state {
        PanelState::Success(value) => Ok(value),
        PanelState::Failed(message) => Err(Error::AiProvider(message.clone())),
        PanelState::Editing {
            warning: Some(warning),
        } => Err(Error::Validation(warning.clone())),
        other => Err(Error::AiProvider(format!(
            "{} did not finish (state: {})",
            what,
            other.label()
        ))),
    }
}

fn missing_panel(tab: Tab) -> Error {
    Error::Validation(format!("The {} tab is not mounted", tab))
}

impl App {
    /// Build an app from concrete services.
    ///
    /// Integration tests and local harnesses use this to inject mocks.
    pub async fn with_services(services: StudioServices, output_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            studio: Studio::new(services).await,
            output_dir,
        })
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub async fn new() -> Result<Self> {
        Self::from_config(Config::from_env()?).await
    }

    pub async fn from_config(config: Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let date = Local::now().format("%Y-%m-%d").to_string();
        let session_id = Uuid::new_v4();
        let output_dir = PathBuf::from(&config.output_dir).join(format!("{}_{}", date, session_id));
        info!("Output directory: {}", output_dir.display());

        // One connection pool for every Gemini client.
        let http_client = reqwest::Client::new();

        let mut image = GeminiImageClient::new_with_client(
            api_key.clone(),
            config.image_model.clone(),
            http_client.clone(),
        );
        let mut video = GeminiVideoClient::new_with_client(
            api_key.clone(),
            config.video_model.clone(),
            http_client.clone(),
        );
        let mut content = GeminiContentClient::new_with_client(
            api_key.clone(),
            ContentModels {
                script: config.script_model.clone(),
                search: config.search_model.clone(),
                live: config.live_model.clone(),
                analysis: config.analysis_model.clone(),
            },
            http_client.clone(),
        );
        let mut speech = GeminiSpeechClient::new_with_client(
            api_key.clone(),
            config.speech_model.clone(),
            config.speech_voice.clone(),
            http_client,
        );

        if let Some(base_url) = &config.base_url {
            info!("Using Gemini base URL {}", base_url);
            image = image.with_base_url(base_url.clone());
            video = video.with_base_url(base_url.clone());
            content = content.with_base_url(base_url.clone());
            speech = speech.with_base_url(base_url.clone());
        }

        info!(
            "Models: image={}, video={}, script={}, live={}, speech={}",
            config.image_model,
            config.video_model,
            config.script_model,
            config.live_model,
            config.speech_model
        );

        Self::with_services(
            StudioServices {
                image: Box::new(image),
                video: Box::new(video),
                content: Box::new(content),
                speech: Box::new(speech),
                location: Box::new(FixedLocationProvider::new(config.location)),
                credentials: Box::new(EnvCredentialStore::new(Some(api_key))),
                media: MediaStore::new(),
                video_poll_interval: config.video_poll_interval,
            },
            output_dir,
        )
        .await
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn studio(&self) -> &Studio {
        &self.studio
    }

    /// Cancels whatever the studio is running, now or later.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.studio.shutdown_token()
    }

    pub fn render(&self) -> Vec<String> {
        self.studio.render()
    }

    async fn ensure_tab(&mut self, tab: Tab) {
        if self.studio.active_tab() != tab {
            self.studio.switch_tab(tab).await;
        }
    }

    fn write_artifact(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        fs::write(&path, bytes)?;
        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Generate a scene video and save it as `scene.mp4`.
    pub async fn generate_video(
        &mut self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        image: Option<&Path>,
    ) -> Result<PathBuf> {
        self.ensure_tab(Tab::Video).await;

        let needs_key = self
            .studio
            .video_mut()
            .map(|panel| panel.gate() != CredentialGate::Selected)
            .ok_or_else(|| missing_panel(Tab::Video))?;
        if needs_key {
            self.studio.select_credential().await?;
        }

        let panel = self
            .studio
            .video_mut()
            .ok_or_else(|| missing_panel(Tab::Video))?;
        panel.set_prompt(prompt);
        panel.set_aspect_ratio(aspect_ratio)?;
        if let Some(path) = image {
            panel.set_reference_image(ReferenceMedia::from_file(path)?)?;
            info!("Starting image: {}", path.display());
        }

        self.studio.generate().await;

        let panel = self
            .studio
            .video_mut()
            .ok_or_else(|| missing_panel(Tab::Video))?;
        let url = settled(panel.state(), "Video generation")?.clone();
        let blob = self.studio.services().media.get(&url).ok_or_else(|| {
            Error::MissingResult(format!("video {} was released before it was saved", url))
        })?;
        self.write_artifact("scene.mp4", &blob.bytes)
    }

    /// Generate a storyboard still and save it as `storyboard.jpg`.
    pub async fn generate_image(&mut self, prompt: &str) -> Result<PathBuf> {
        self.ensure_tab(Tab::Image).await;
        self.studio
            .image_mut()
            .ok_or_else(|| missing_panel(Tab::Image))?
            .set_prompt(prompt);

        self.studio.generate().await;

        let panel = self
            .studio
            .image_mut()
            .ok_or_else(|| missing_panel(Tab::Image))?;
        let image = settled(panel.state(), "Image generation")?.clone();
        self.write_artifact("storyboard.jpg", &image.bytes)
    }

    /// Run one content request and save the rendered text with its sources.
    pub async fn generate_content(
        &mut self,
        mode: ContentMode,
        prompt: &str,
        video: Option<&Path>,
    ) -> Result<PathBuf> {
        self.ensure_tab(Tab::Content).await;
        self.studio.set_content_mode(mode).await?;

        let panel = self
            .studio
            .content_mut()
            .ok_or_else(|| missing_panel(Tab::Content))?;
        if let PanelState::Failed(message) = panel.state() {
            // Location lookup failed while entering maps mode.
            return Err(Error::Location(message.clone()));
        }
        panel.set_prompt(prompt);
        if let Some(path) = video {
            panel.set_video_file(ReferenceMedia::from_file(path)?)?;
        }

        self.studio.generate().await;

        let panel = self
            .studio
            .content_mut()
            .ok_or_else(|| missing_panel(Tab::Content))?;
        settled(panel.state(), "Content generation")?;
        let report = panel.render().join("\n");
        self.write_artifact(&format!("{}.md", mode), report.as_bytes())
    }

    /// Synthesize narration and save it as `narration.wav`.
    pub async fn narrate(&mut self, text: &str) -> Result<PathBuf> {
        self.ensure_tab(Tab::Narration).await;
        self.studio
            .narration_mut()
            .ok_or_else(|| missing_panel(Tab::Narration))?
            .set_text(text);

        self.studio.generate().await;

        let panel = self
            .studio
            .narration_mut()
            .ok_or_else(|| missing_panel(Tab::Narration))?;
        let buffer = settled(panel.state(), "Narration")?;
        let path = self.output_dir.join("narration.wav");
        audio::write_wav(buffer, &path)?;
        info!(
            "Saved {} ({:.2}s of audio)",
            path.display(),
            buffer.duration_secs()
        );
        Ok(path)
    }

    /// Send one live-report message; returns the desk's reply.
    ///
    /// A failed request still returns the apology appended to the transcript.
    pub async fn live_send(&mut self, message: &str) -> Result<Option<String>> {
        self.ensure_tab(Tab::Live).await;
        let panel = self
            .studio
            .live_mut()
            .ok_or_else(|| missing_panel(Tab::Live))?;
        let before = panel.messages().len();
        panel.set_input(message);

        self.studio.generate().await;

        let panel = self
            .studio
            .live_mut()
            .ok_or_else(|| missing_panel(Tab::Live))?;
        if panel.messages().len() == before {
            return Ok(None);
        }
        if let Some(error) = panel.state().error() {
            warn!("Live report: {}", error);
        }
        Ok(panel.messages().last().map(|m| m.text.clone()))
    }

    /// Persist the live transcript as `live_report.txt`.
    pub fn save_transcript(&mut self) -> Result<PathBuf> {
        let transcript = self
            .studio
            .live_mut()
            .ok_or_else(|| missing_panel(Tab::Live))?
            .render()
            .join("\n");
        self.write_artifact("live_report.txt", transcript.as_bytes())
    }
}
