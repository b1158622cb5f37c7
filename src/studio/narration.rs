use super::panel::PanelState;
use super::StudioServices;
use crate::audio::{self, AudioBuffer};

pub const DEFAULT_NARRATION_TEXT: &str = "In a dramatic turn of events, local heroes today rescued a mother cow from the clutches of a giant python. The community is hailing them as saviors.";

/// Text-to-speech panel.
#[derive(Debug)]
pub struct NarrationPanel {
    text: String,
    state: PanelState<AudioBuffer>,
}

impl Default for NarrationPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrationPanel {
    pub fn new() -> Self {
        Self {
            text: DEFAULT_NARRATION_TEXT.to_string(),
            state: PanelState::Idle,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> &PanelState<AudioBuffer> {
        &self.state
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.state.edit();
    }

    /// Synthesize the text and decode it into a playable buffer.
    pub async fn generate(&mut self, services: &StudioServices) {
        if self.text.trim().is_empty() {
            self.state
                .reject("Please enter some text to generate narration.");
            return;
        }

        self.state.begin();
        let result = match services.speech.synthesize_speech(&self.text).await {
            Ok(encoded) => audio::decode_base64_pcm(&encoded),
            Err(e) => Err(e),
        };
        if let Ok(buffer) = &result {
            tracing::info!(
                "Decoded {} frames ({:.2}s) of narration",
                buffer.frame_count(),
                buffer.duration_secs()
            );
        }
        self.state.finish(result, "Failed to generate narration");
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec!["Narration Studio".to_string()];
        match &self.state {
            PanelState::Submitting => lines.push("Generating...".to_string()),
            PanelState::Success(buffer) => lines.push(format!(
                "Audio ready: {} frames, {:.2}s at {} Hz",
                buffer.frame_count(),
                buffer.duration_secs(),
                buffer.sample_rate
            )),
            state => {
                if let Some(error) = state.error() {
                    lines.push(format!("Error: {}", error));
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_panel_has_sample_text() {
        let panel = NarrationPanel::new();
        assert_eq!(panel.text(), DEFAULT_NARRATION_TEXT);
        assert!(panel.state().is_idle());
    }

    #[test]
    fn test_set_text_moves_to_editing() {
        let mut panel = NarrationPanel::new();
        panel.set_text("Breaking news");
        assert_eq!(panel.state().label(), "editing");
        assert_eq!(panel.render(), vec!["Narration Studio".to_string()]);
    }
}
