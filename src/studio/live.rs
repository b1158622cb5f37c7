use super::panel::PanelState;
use super::StudioServices;
use crate::ai::TextModel;
use crate::models::{ChatMessage, Sender};
use crate::prompts;

pub const LIVE_FALLBACK_REPLY: &str = "Sorry, I'm having trouble connecting to the news desk.";

/// Chat transcript with the fast text model.
///
/// The transcript is append-only; failures append an apology rather than
/// removing the user's message.
#[derive(Debug)]
pub struct LivePanel {
    messages: Vec<ChatMessage>,
    input: String,
    state: PanelState<String>,
}

impl Default for LivePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl LivePanel {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(prompts::LIVE_WELCOME.trim())],
            input: String::new(),
            state: PanelState::Idle,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &PanelState<String> {
        &self.state
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
        self.state.edit();
    }

    pub async fn send(&mut self, services: &StudioServices) {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            self.state = PanelState::Editing { warning: None };
            return;
        }

        self.messages.push(ChatMessage::user(text.clone()));
        self.input.clear();
        self.state.begin();

        match services.content.generate_text(&text, TextModel::Live).await {
            Ok(reply) => {
                self.messages.push(ChatMessage::assistant(reply.clone()));
                self.state = PanelState::Success(reply);
            }
            Err(e) => {
                tracing::error!("Live report request failed: {}", e);
                self.messages
                    .push(ChatMessage::assistant(LIVE_FALLBACK_REPLY));
                self.state.fail(LIVE_FALLBACK_REPLY);
            }
        }
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec!["Live Report".to_string()];
        lines.extend(self.messages.iter().map(|m| match m.sender {
            Sender::User => format!("You: {}", m.text),
            Sender::Assistant => format!("Desk: {}", m.text),
        }));
        if self.state.is_submitting() {
            lines.push("Desk is typing...".to_string());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_starts_with_welcome() {
        let panel = LivePanel::new();
        assert_eq!(panel.messages().len(), 1);
        assert_eq!(panel.messages()[0].sender, Sender::Assistant);
        assert!(panel.messages()[0].text.starts_with("Welcome to the Live Report desk!"));
    }

    #[test]
    fn test_render_labels_speakers() {
        let panel = LivePanel::new();
        let lines = panel.render();
        assert!(lines[1].starts_with("Desk: Welcome"));
    }
}
