use super::panel::PanelState;
use super::StudioServices;
use crate::credentials::CredentialStore;
use crate::jobs;
use crate::media::{MediaStore, ObjectUrl};
use crate::models::{AspectRatio, GenerationRequest, OutputConfig, ReferenceMedia};
use crate::{Error, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const DEFAULT_VIDEO_PROMPT: &str =
    "Brave heroes save a mother cow from a giant python, cinematic, 4k";

pub const WAITING_MESSAGES: [&str; 6] = [
    "Summoning digital actors...",
    "Calibrating the cinematic universe...",
    "Rendering pixels into a moving picture...",
    "Adjusting lighting and camera angles...",
    "The director is reviewing the dailies...",
    "This can take a few minutes, please be patient.",
];

const WAITING_MESSAGE_PERIOD: Duration = Duration::from_secs(4);
const KEY_NOT_FOUND_MARKER: &str = "Requested entity was not found";

/// Waiting message shown after `elapsed` time in the submitting state.
pub fn waiting_message(elapsed: Duration) -> &'static str {
    let step = (elapsed.as_secs() / WAITING_MESSAGE_PERIOD.as_secs()) as usize;
    WAITING_MESSAGES[step % WAITING_MESSAGES.len()]
}

/// Whether video controls are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialGate {
    Unknown,
    Missing,
    Selected,
}

/// Scene generation panel driving the long-running video job.
#[derive(Debug)]
pub struct VideoPanel {
    prompt: String,
    aspect_ratio: AspectRatio,
    reference_image: Option<ReferenceMedia>,
    gate: CredentialGate,
    state: PanelState<ObjectUrl>,
}

impl Default for VideoPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoPanel {
    pub fn new() -> Self {
        Self {
            prompt: DEFAULT_VIDEO_PROMPT.to_string(),
            aspect_ratio: AspectRatio::Landscape,
            reference_image: None,
            gate: CredentialGate::Unknown,
            state: PanelState::Idle,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn reference_image(&self) -> Option<&ReferenceMedia> {
        self.reference_image.as_ref()
    }

    pub fn gate(&self) -> CredentialGate {
        self.gate
    }

    pub fn state(&self) -> &PanelState<ObjectUrl> {
        &self.state
    }

    /// Query the credential store once when the panel is shown.
    pub async fn mount(&mut self, credentials: &dyn CredentialStore) {
        self.gate = match credentials.has_selected_key().await {
            Ok(true) => CredentialGate::Selected,
            Ok(false) => CredentialGate::Missing,
            Err(e) => {
                tracing::warn!("Credential check failed: {}", e);
                CredentialGate::Missing
            }
        };
    }

    /// Open the key picker, then re-verify; the gate only opens on a confirmed key.
    pub async fn select_credential(&mut self, credentials: &dyn CredentialStore) -> Result<()> {
        credentials.open_select_key().await?;
        self.gate = if credentials.has_selected_key().await? {
            CredentialGate::Selected
        } else {
            CredentialGate::Missing
        };
        if self.gate == CredentialGate::Selected {
            Ok(())
        } else {
            Err(Error::Credential(
                "No API key was selected; video generation stays disabled".to_string(),
            ))
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.state.edit();
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) -> Result<()> {
        if !aspect_ratio.supports_video() {
            return Err(Error::Validation(format!(
                "Video supports Landscape (16:9) or Portrait (9:16), not {}",
                aspect_ratio
            )));
        }
        self.aspect_ratio = aspect_ratio;
        self.state.edit();
        Ok(())
    }

    pub fn set_reference_image(&mut self, image: ReferenceMedia) -> Result<()> {
        if !image.is_image() {
            return Err(Error::Validation(format!(
                "Starting image must be an image file, got {}",
                image.mime_type
            )));
        }
        self.reference_image = Some(image);
        self.state.edit();
        Ok(())
    }

    pub fn clear_reference_image(&mut self) {
        self.reference_image = None;
        self.state.edit();
    }

    fn build_request(&self) -> GenerationRequest {
        let request = GenerationRequest::new(self.prompt.clone()).with_output_config(OutputConfig {
            aspect_ratio: self.aspect_ratio,
            ..OutputConfig::default()
        });
        match &self.reference_image {
            Some(image) => request.with_reference_media(image.clone()),
            None => request,
        }
    }

    pub async fn generate(&mut self, services: &StudioServices, cancel: &CancellationToken) {
        if self.gate != CredentialGate::Selected {
            self.state
                .reject("Video generation with Veo requires you to select an API key.");
            return;
        }
        if self.prompt.trim().is_empty() {
            self.state.reject("Please enter a prompt.");
            return;
        }

        self.release(&services.media);
        let request = self.build_request();
        let interval = services.video_poll_interval;

        self.state.begin();
        info!("{}", WAITING_MESSAGES[0]);
        let result = jobs::generate_video(
            services.video.as_ref(),
            &services.media,
            &request,
            interval,
            cancel,
            |poll| info!("{}", waiting_message(interval * poll)),
        )
        .await;

        match result {
            Err(e) if e.to_string().contains(KEY_NOT_FOUND_MARKER) => {
                tracing::error!("Video generation rejected the API key: {}", e);
                self.gate = CredentialGate::Missing;
                self.state
                    .fail("API Key error. Please re-select your API key.");
            }
            result => self.state.finish(result, "Failed to generate video"),
        }
    }

    /// Revoke the current result's object URL, if any.
    pub fn release(&mut self, media: &MediaStore) {
        if let PanelState::Success(url) = &self.state {
            media.revoke(url);
            self.state = PanelState::Idle;
        }
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.gate != CredentialGate::Selected {
            lines.push("Welcome to the Video Studio".to_string());
            lines.push("Video generation with Veo requires you to select an API key.".to_string());
            if let Some(error) = self.state.error() {
                lines.push(format!("Error: {}", error));
            }
            return lines;
        }

        lines.push("Scene Generation Studio".to_string());
        lines.push(format!("Aspect ratio: {}", self.aspect_ratio));
        match &self.state {
            PanelState::Submitting => lines.push(WAITING_MESSAGES[0].to_string()),
            PanelState::Success(url) => lines.push(format!("Video ready: {}", url)),
            state => {
                if let Some(error) = state.error() {
                    lines.push(format!("Error: {}", error));
                }
                lines.push("Your generated video will appear here.".to_string());
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waiting_message_rotates_every_four_seconds() {
        assert_eq!(waiting_message(Duration::from_secs(0)), WAITING_MESSAGES[0]);
        assert_eq!(waiting_message(Duration::from_secs(3)), WAITING_MESSAGES[0]);
        assert_eq!(waiting_message(Duration::from_secs(4)), WAITING_MESSAGES[1]);
        assert_eq!(waiting_message(Duration::from_secs(24)), WAITING_MESSAGES[0]);
    }

    #[test]
    fn test_square_aspect_ratio_rejected() {
        let mut panel = VideoPanel::new();
        assert!(panel.set_aspect_ratio(AspectRatio::Square).is_err());
        assert_eq!(panel.aspect_ratio(), AspectRatio::Landscape);
        assert!(panel.set_aspect_ratio(AspectRatio::Portrait).is_ok());
    }

    #[test]
    fn test_reference_must_be_image() {
        let mut panel = VideoPanel::new();
        let err = panel
            .set_reference_image(ReferenceMedia::new(vec![0], "video/mp4"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(panel.reference_image().is_none());
    }

    #[test]
    fn test_avif_file_accepted_as_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("first_frame.avif");
        std::fs::write(
            &path,
            [0x00, 0x00, 0x00, 0x1C, 0x66, 0x74, 0x79, 0x70, 0x61, 0x76, 0x69, 0x66],
        )
        .unwrap();

        let mut panel = VideoPanel::new();
        let media = ReferenceMedia::from_file(&path).unwrap();
        assert_eq!(media.mime_type, "image/avif");
        panel.set_reference_image(media).unwrap();
        assert!(panel.reference_image().is_some());
    }

    #[test]
    fn test_request_carries_reference_image_and_ratio() {
        let mut panel = VideoPanel::new();
        panel.set_aspect_ratio(AspectRatio::Portrait).unwrap();
        panel
            .set_reference_image(ReferenceMedia::new(vec![0x89, 0x50], "image/png"))
            .unwrap();

        let request = panel.build_request();
        assert_eq!(request.output_config.aspect_ratio, AspectRatio::Portrait);
        assert_eq!(
            request.reference_media.map(|m| m.mime_type),
            Some("image/png".to_string())
        );
    }
}
