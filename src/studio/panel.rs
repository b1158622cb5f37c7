use crate::Result;

/// Lifecycle shared by every capability panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T> {
    Idle,
    /// Input changed since the last result. `warning` holds a rejected
    /// generate attempt's validation message.
    Editing { warning: Option<String> },
    Submitting,
    Success(T),
    Failed(String),
}

impl<T> PanelState<T> {
    /// User input arrived. Ignored while a request is in flight.
    pub fn edit(&mut self) {
        if !self.is_submitting() {
            *self = PanelState::Editing { warning: None };
        }
    }

    /// Generate was rejected before any remote call.
    pub fn reject(&mut self, warning: impl Into<String>) {
        *self = PanelState::Editing {
            warning: Some(warning.into()),
        };
    }

    pub fn begin(&mut self) {
        *self = PanelState::Submitting;
    }

    /// Settle a submission; errors become `"<prefix>: <error>"`.
    pub fn finish(&mut self, result: Result<T>, prefix: &str) {
        *self = match result {
            Ok(value) => PanelState::Success(value),
            Err(e) => {
                tracing::error!("{}: {}", prefix, e);
                PanelState::Failed(format!("{}: {}", prefix, e))
            }
        };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        *self = PanelState::Failed(message.into());
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PanelState::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, PanelState::Submitting)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            PanelState::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Failure or validation text to show next to the generate control.
    pub fn error(&self) -> Option<&str> {
        match self {
            PanelState::Failed(message) => Some(message),
            PanelState::Editing {
                warning: Some(warning),
            } => Some(warning),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PanelState::Idle => "idle",
            PanelState::Editing { .. } => "editing",
            PanelState::Submitting => "submitting",
            PanelState::Success(_) => "success",
            PanelState::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_edit_moves_terminal_states_to_editing() {
        let mut state: PanelState<u8> = PanelState::Success(1);
        state.edit();
        assert_eq!(state, PanelState::Editing { warning: None });

        let mut state: PanelState<u8> = PanelState::Failed("x".to_string());
        state.edit();
        assert_eq!(state, PanelState::Editing { warning: None });
    }

    #[test]
    fn test_edit_ignored_while_submitting() {
        let mut state: PanelState<u8> = PanelState::Submitting;
        state.edit();
        assert!(state.is_submitting());
    }

    #[test]
    fn test_finish_prefixes_errors() {
        let mut state: PanelState<u8> = PanelState::Submitting;
        state.finish(Err(Error::AiProvider("quota".to_string())), "Failed to generate image");
        assert_eq!(state.error(), Some("Failed to generate image: quota"));
        assert_eq!(state.label(), "failed");
    }

    #[test]
    fn test_reject_keeps_editing_with_warning() {
        let mut state: PanelState<u8> = PanelState::Idle;
        state.reject("Please enter a prompt.");
        assert_eq!(state.label(), "editing");
        assert_eq!(state.error(), Some("Please enter a prompt."));
        assert!(state.result().is_none());
    }
}
