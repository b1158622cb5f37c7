//! Capability panels and the tabbed shell that owns them.
//!
//! Exactly one panel is mounted at a time. Switching tabs unmounts the
//! current panel (cancelling its in-flight work and releasing its media) and
//! mounts a freshly constructed one, so no state carries across tabs.

pub mod content;
pub mod image;
pub mod live;
pub mod narration;
pub mod panel;
pub mod video;

pub use content::{ContentMode, ContentPanel};
pub use image::ImagePanel;
pub use live::LivePanel;
pub use narration::NarrationPanel;
pub use panel::PanelState;
pub use video::{CredentialGate, VideoPanel};

use crate::ai::{ContentService, ImageGenerationService, SpeechService, VideoGenerationService};
use crate::credentials::CredentialStore;
use crate::location::LocationProvider;
use crate::media::MediaStore;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Remote capabilities and local resources shared by every panel.
pub struct StudioServices {
    pub image: Box<dyn ImageGenerationService>,
    pub video: Box<dyn VideoGenerationService>,
    pub content: Box<dyn ContentService>,
    pub speech: Box<dyn SpeechService>,
    pub location: Box<dyn LocationProvider>,
    pub credentials: Box<dyn CredentialStore>,
    pub media: MediaStore,
    pub video_poll_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Video,
    Image,
    Content,
    Narration,
    Live,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Video, Tab::Image, Tab::Content, Tab::Narration, Tab::Live];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Video => "Scene Generation",
            Tab::Image => "Storyboard",
            Tab::Content => "Script & Analysis",
            Tab::Narration => "Narration",
            Tab::Live => "Live Report",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Tab::Video => "video",
            Tab::Image => "image",
            Tab::Content => "content",
            Tab::Narration => "narration",
            Tab::Live => "live",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Tab::ALL
            .into_iter()
            .find(|tab| tab.key().eq_ignore_ascii_case(s) || tab.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Validation(format!("Unknown tab '{}'", s)))
    }
}

/// The mounted panel.
#[derive(Debug)]
pub enum Panel {
    Video(VideoPanel),
    Image(ImagePanel),
    Content(ContentPanel),
    Narration(NarrationPanel),
    Live(LivePanel),
}

impl Panel {
    fn fresh(tab: Tab) -> Self {
        match tab {
            Tab::Video => Panel::Video(VideoPanel::new()),
            Tab::Image => Panel::Image(ImagePanel::new()),
            Tab::Content => Panel::Content(ContentPanel::new()),
            Tab::Narration => Panel::Narration(NarrationPanel::new()),
            Tab::Live => Panel::Live(LivePanel::new()),
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            Panel::Video(_) => Tab::Video,
            Panel::Image(_) => Tab::Image,
            Panel::Content(_) => Tab::Content,
            Panel::Narration(_) => Tab::Narration,
            Panel::Live(_) => Tab::Live,
        }
    }

    pub fn render(&self) -> Vec<String> {
        match self {
            Panel::Video(panel) => panel.render(),
            Panel::Image(panel) => panel.render(),
            Panel::Content(panel) => panel.render(),
            Panel::Narration(panel) => panel.render(),
            Panel::Live(panel) => panel.render(),
        }
    }
}

pub struct Studio {
    services: StudioServices,
    active: Panel,
    /// Parent of every panel token; cancelling it stops whatever is mounted.
    shutdown: CancellationToken,
    cancel: CancellationToken,
}

impl Studio {
    /// Start on the default tab.
    pub async fn new(services: StudioServices) -> Self {
        let shutdown = CancellationToken::new();
        let mut studio = Self {
            services,
            active: Panel::fresh(Tab::default()),
            cancel: shutdown.child_token(),
            shutdown,
        };
        studio.mount().await;
        studio
    }

    async fn mount(&mut self) {
        if let Panel::Video(panel) = &mut self.active {
            panel.mount(self.services.credentials.as_ref()).await;
        }
    }

    fn unmount(&mut self) {
        self.cancel.cancel();
        if let Panel::Video(panel) = &mut self.active {
            panel.release(&self.services.media);
        }
    }

    /// Replace the mounted panel with a fresh one for `tab`.
    ///
    /// Always rebuilds, even when `tab` is already active.
    pub async fn switch_tab(&mut self, tab: Tab) {
        debug!("Switching from {} to {}", self.active.tab(), tab);
        self.unmount();
        self.cancel = self.shutdown.child_token();
        self.active = Panel::fresh(tab);
        self.mount().await;
        info!("Active tab: {}", tab);
    }

    pub fn active_tab(&self) -> Tab {
        self.active.tab()
    }

    pub fn active(&self) -> &Panel {
        &self.active
    }

    pub fn video_mut(&mut self) -> Option<&mut VideoPanel> {
        match &mut self.active {
            Panel::Video(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn image_mut(&mut self) -> Option<&mut ImagePanel> {
        match &mut self.active {
            Panel::Image(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut ContentPanel> {
        match &mut self.active {
            Panel::Content(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn narration_mut(&mut self) -> Option<&mut NarrationPanel> {
        match &mut self.active {
            Panel::Narration(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn live_mut(&mut self) -> Option<&mut LivePanel> {
        match &mut self.active {
            Panel::Live(panel) => Some(panel),
            _ => None,
        }
    }

    /// Run the mounted panel's generate (or send) action.
    pub async fn generate(&mut self) {
        let services = &self.services;
        match &mut self.active {
            Panel::Video(panel) => panel.generate(services, &self.cancel).await,
            Panel::Image(panel) => panel.generate(services).await,
            Panel::Content(panel) => panel.generate(services).await,
            Panel::Narration(panel) => panel.generate(services).await,
            Panel::Live(panel) => panel.send(services).await,
        }
    }

    /// Change the content panel's mode; fails if another tab is mounted.
    pub async fn set_content_mode(&mut self, mode: ContentMode) -> Result<()> {
        let locator = self.services.location.as_ref();
        match &mut self.active {
            Panel::Content(panel) => {
                panel.set_mode(mode, locator).await;
                Ok(())
            }
            other => Err(Error::Validation(format!(
                "Content mode can only be set on the {} tab, not {}",
                Tab::Content,
                other.tab()
            ))),
        }
    }

    pub async fn select_credential(&mut self) -> Result<()> {
        let credentials = self.services.credentials.as_ref();
        match &mut self.active {
            Panel::Video(panel) => panel.select_credential(credentials).await,
            other => Err(Error::Validation(format!(
                "API key selection is only available on the {} tab, not {}",
                Tab::Video,
                other.tab()
            ))),
        }
    }

    /// Token cancelled when the current panel is unmounted.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Token that cancels the mounted panel and every later one.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn services(&self) -> &StudioServices {
        &self.services
    }

    pub fn render(&self) -> Vec<String> {
        let tabs = Tab::ALL
            .iter()
            .map(|tab| {
                if *tab == self.active.tab() {
                    format!("[{}]", tab.label())
                } else {
                    tab.label().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ");
        let mut lines = vec![tabs];
        lines.extend(self.active.render());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockContentClient, MockImageClient, MockSpeechClient, MockVideoClient};
    use crate::credentials::MockCredentialStore;
    use crate::location::MockLocationProvider;
    use crate::models::Location;
    use pretty_assertions::assert_eq;

    fn services(content: MockContentClient, location: Option<Location>) -> StudioServices {
        StudioServices {
            image: Box::new(MockImageClient::new()),
            video: Box::new(MockVideoClient::new()),
            content: Box::new(content),
            speech: Box::new(MockSpeechClient::new()),
            location: Box::new(MockLocationProvider::new(location)),
            credentials: Box::new(MockCredentialStore::new(true)),
            media: MediaStore::new(),
            video_poll_interval: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_tab_parsing_accepts_key_and_label() {
        assert_eq!("content".parse::<Tab>().unwrap(), Tab::Content);
        assert_eq!("Live Report".parse::<Tab>().unwrap(), Tab::Live);
        assert!("settings".parse::<Tab>().is_err());
    }

    #[tokio::test]
    async fn test_starts_on_video_with_gate_checked() {
        let studio = Studio::new(services(MockContentClient::new(), None)).await;
        assert_eq!(studio.active_tab(), Tab::Video);
        match studio.active() {
            Panel::Video(panel) => assert_eq!(panel.gate(), CredentialGate::Selected),
            other => panic!("unexpected panel {:?}", other.tab()),
        }
    }

    #[tokio::test]
    async fn test_switch_tab_cancels_previous_token() {
        let mut studio = Studio::new(services(MockContentClient::new(), None)).await;
        let token = studio.cancellation_token();
        studio.switch_tab(Tab::Image).await;
        assert!(token.is_cancelled());
        assert!(!studio.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_shutdown_reaches_panels_mounted_later() {
        let mut studio = Studio::new(services(MockContentClient::new(), None)).await;
        let shutdown = studio.shutdown_token();
        studio.switch_tab(Tab::Live).await;
        shutdown.cancel();
        assert!(studio.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_content_mode_requires_content_tab() {
        let mut studio = Studio::new(services(MockContentClient::new(), None)).await;
        assert!(studio.set_content_mode(ContentMode::Search).await.is_err());

        studio.switch_tab(Tab::Content).await;
        studio.set_content_mode(ContentMode::Search).await.unwrap();
        assert_eq!(studio.content_mut().unwrap().mode(), ContentMode::Search);
    }

    #[tokio::test]
    async fn test_render_marks_active_tab() {
        let mut studio = Studio::new(services(MockContentClient::new(), None)).await;
        studio.switch_tab(Tab::Narration).await;
        let lines = studio.render();
        assert_eq!(
            lines[0],
            "Scene Generation | Storyboard | Script & Analysis | [Narration] | Live Report"
        );
        assert_eq!(lines[1], "Narration Studio");
    }
}
