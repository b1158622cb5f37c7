use super::panel::PanelState;
use super::StudioServices;
use crate::models::{AspectRatio, GeneratedImage, GenerationRequest, OutputConfig};

pub const DEFAULT_IMAGE_PROMPT: &str =
    "A brave hero protecting a mother cow from a giant python, dramatic cinematic lighting.";

/// Storyboard panel: one still image per prompt.
#[derive(Debug)]
pub struct ImagePanel {
    prompt: String,
    state: PanelState<GeneratedImage>,
}

impl Default for ImagePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagePanel {
    pub fn new() -> Self {
        Self {
            prompt: DEFAULT_IMAGE_PROMPT.to_string(),
            state: PanelState::Idle,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn state(&self) -> &PanelState<GeneratedImage> {
        &self.state
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.state.edit();
    }

    pub async fn generate(&mut self, services: &StudioServices) {
        if self.prompt.trim().is_empty() {
            self.state.reject("Please enter a prompt.");
            return;
        }

        let request = GenerationRequest::new(self.prompt.clone()).with_output_config(OutputConfig {
            aspect_ratio: AspectRatio::Landscape,
            ..OutputConfig::default()
        });

        self.state.begin();
        let result = services.image.generate_image(&request).await;
        self.state.finish(result, "Failed to generate image");
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec!["Storyboard Studio".to_string()];
        match &self.state {
            PanelState::Submitting => lines.push("Generating your masterpiece...".to_string()),
            PanelState::Success(image) => lines.push(format!(
                "Generated {} image ({} bytes)",
                image.mime_type,
                image.bytes.len()
            )),
            state => {
                if let Some(error) = state.error() {
                    lines.push(format!("Error: {}", error));
                }
                lines.push("Your generated image will appear here.".to_string());
            }
        }
        lines
    }
}
