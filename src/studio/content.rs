use super::panel::PanelState;
use super::StudioServices;
use crate::ai::TextModel;
use crate::location::LocationProvider;
use crate::models::{GroundedText, Location, ReferenceMedia};
use crate::{prompts, Error, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentMode {
    #[default]
    Script,
    Search,
    Maps,
    Video,
}

impl ContentMode {
    pub const ALL: [ContentMode; 4] = [
        ContentMode::Script,
        ContentMode::Search,
        ContentMode::Maps,
        ContentMode::Video,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ContentMode::Script => "Script Writer",
            ContentMode::Search => "Fact-Checker (Search)",
            ContentMode::Maps => "Location Scout (Maps)",
            ContentMode::Video => "Video Analyzer",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            ContentMode::Script => "e.g., The hero confronts the python.",
            ContentMode::Search => "e.g., What is the largest species of python?",
            ContentMode::Maps => "e.g., Find nearby wildlife rescue centers.",
            ContentMode::Video => "e.g., What is the cow feeling in this video?",
        }
    }
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentMode::Script => "script",
            ContentMode::Search => "search",
            ContentMode::Maps => "maps",
            ContentMode::Video => "video",
        })
    }
}

impl FromStr for ContentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ContentMode::ALL
            .into_iter()
            .find(|mode| mode.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("Unknown content mode '{}'", s)))
    }
}

/// Script writing, grounded research and video analysis.
#[derive(Debug)]
pub struct ContentPanel {
    mode: ContentMode,
    prompt: String,
    video_file: Option<ReferenceMedia>,
    location: Option<Location>,
    state: PanelState<GroundedText>,
}

impl Default for ContentPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentPanel {
    pub fn new() -> Self {
        Self {
            mode: ContentMode::Script,
            prompt: String::new(),
            video_file: None,
            location: None,
            state: PanelState::Idle,
        }
    }

    pub fn mode(&self) -> ContentMode {
        self.mode
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn video_file(&self) -> Option<&ReferenceMedia> {
        self.video_file.as_ref()
    }

    pub fn state(&self) -> &PanelState<GroundedText> {
        &self.state
    }

    /// Switch mode, clearing prompt, result, error and uploaded video.
    ///
    /// Entering maps mode without a known location asks the provider for one.
    pub async fn set_mode(&mut self, mode: ContentMode, locator: &dyn LocationProvider) {
        self.mode = mode;
        self.prompt.clear();
        self.video_file = None;
        self.state = PanelState::Idle;

        if mode == ContentMode::Maps && self.location.is_none() {
            match locator.current_position().await {
                Ok(location) => {
                    tracing::debug!(
                        "Using location {:.4}, {:.4}",
                        location.latitude,
                        location.longitude
                    );
                    self.location = Some(location);
                }
                Err(e) => {
                    tracing::warn!("Location unavailable: {}", e);
                    self.state.fail(e.to_string());
                }
            }
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.state.edit();
    }

    pub fn set_video_file(&mut self, video: ReferenceMedia) -> Result<()> {
        if !video.is_video() {
            return Err(Error::Validation(format!(
                "Expected a video file, got {}",
                video.mime_type
            )));
        }
        self.video_file = Some(video);
        self.state.edit();
        Ok(())
    }

    pub async fn generate(&mut self, services: &StudioServices) {
        let prompt = self.prompt.trim().to_string();

        match self.mode {
            ContentMode::Video => {
                let Some(video) = self.video_file.clone() else {
                    self.state.reject("Please upload a video file.");
                    return;
                };
                if prompt.is_empty() {
                    self.state.reject("Please enter a prompt.");
                    return;
                }

                self.state.begin();
                let result = services
                    .content
                    .analyze_video(&video, &prompt)
                    .await
                    .map(|text| GroundedText {
                        text,
                        sources: Vec::new(),
                    });
                self.state.finish(result, "An error occurred");
            }
            mode => {
                if prompt.is_empty() {
                    self.state.reject("Please enter a prompt.");
                    return;
                }
                if mode == ContentMode::Maps && self.location.is_none() {
                    self.state.reject("Location is required for Maps search.");
                    return;
                }

                self.state.begin();
                let result = match (mode, self.location) {
                    (ContentMode::Search, _) => services.content.generate_with_search(&prompt).await,
                    (ContentMode::Maps, Some(location)) => {
                        services.content.generate_with_maps(&prompt, location).await
                    }
                    _ => services
                        .content
                        .generate_text(
                            &prompts::render(prompts::SCRIPT, &[("topic", &prompt)]),
                            TextModel::Script,
                        )
                        .await
                        .map(|text| GroundedText {
                            text,
                            sources: Vec::new(),
                        }),
                };
                self.state.finish(result, "An error occurred");
            }
        }
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![
            "Content Studio".to_string(),
            format!("Mode: {}", self.mode.title()),
        ];
        if let Some(error) = self.state.error() {
            lines.push(format!("Error: {}", error));
        }
        match &self.state {
            PanelState::Submitting => lines.push("Working...".to_string()),
            PanelState::Success(result) => {
                lines.push(result.text.clone());
                if !result.sources.is_empty() {
                    lines.push(String::new());
                    lines.push("Sources:".to_string());
                    lines.extend(result.sources.iter().flat_map(|s| s.render()));
                }
            }
            _ => lines.push("Your result will appear here.".to_string()),
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing_is_case_insensitive() {
        assert_eq!("Maps".parse::<ContentMode>().unwrap(), ContentMode::Maps);
        assert_eq!("video".parse::<ContentMode>().unwrap(), ContentMode::Video);
        assert!("podcast".parse::<ContentMode>().is_err());
    }

    #[test]
    fn test_video_file_must_be_video() {
        let mut panel = ContentPanel::new();
        assert!(panel
            .set_video_file(ReferenceMedia::new(vec![0xFF, 0xD8], "image/jpeg"))
            .is_err());
        assert!(panel.video_file().is_none());
    }
}
