//! Data models and structures
//!
//! Defines generation requests, long-running operations, grounding sources,
//! chat transcripts and the environment-driven configuration.

use crate::ai::mime;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    Tall,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Standard => "4:3",
            AspectRatio::Tall => "3:4",
        }
    }

    /// Video generation only accepts the two widescreen orientations.
    pub fn supports_video(&self) -> bool {
        matches!(self, AspectRatio::Landscape | AspectRatio::Portrait)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "16:9" => Ok(AspectRatio::Landscape),
            "9:16" => Ok(AspectRatio::Portrait),
            "1:1" => Ok(AspectRatio::Square),
            "4:3" => Ok(AspectRatio::Standard),
            "3:4" => Ok(AspectRatio::Tall),
            other => Err(Error::Validation(format!(
                "Unsupported aspect ratio '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    #[serde(rename = "720p")]
    Hd,
    #[serde(rename = "1080p")]
    FullHd,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hd => "720p",
            Resolution::FullHd => "1080p",
        }
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "720p" => Ok(Resolution::Hd),
            "1080p" => Ok(Resolution::FullHd),
            other => Err(Error::Validation(format!(
                "Unsupported resolution '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub count: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::Landscape,
            resolution: Resolution::Hd,
            count: 1,
        }
    }
}

/// Uploaded media embedded inline in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMedia {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ReferenceMedia {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Read a file from disk, sniffing its MIME type from content and extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime_type = mime::detect_media_mime(&bytes, path);
        tracing::debug!(
            "Loaded {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            mime_type
        );
        Ok(Self::new(bytes, mime_type))
    }

    pub fn to_base64(&self) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Everything needed to submit one generation job.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub reference_media: Option<ReferenceMedia>,
    pub output_config: OutputConfig,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_media: None,
            output_config: OutputConfig::default(),
        }
    }

    pub fn with_reference_media(mut self, media: ReferenceMedia) -> Self {
        self.reference_media = Some(media);
        self
    }

    pub fn with_output_config(mut self, output_config: OutputConfig) -> Self {
        self.output_config = output_config;
        self
    }
}

/// Snapshot of a remote long-running job.
///
/// A fresh snapshot always replaces the previous one; fields are never
/// patched individually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub done: bool,
    pub result_uri: Option<String>,
    pub error: Option<String>,
}

impl Operation {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            result_uri: None,
            error: None,
        }
    }

    pub fn completed(name: impl Into<String>, result_uri: Option<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            result_uri,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            result_uri: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewSnippet {
    pub uri: String,
    pub title: String,
    pub text: String,
}

/// Citation returned alongside grounded text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GroundingSource {
    Web {
        uri: String,
        title: String,
    },
    Maps {
        uri: String,
        title: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        review_snippets: Vec<ReviewSnippet>,
    },
}

impl GroundingSource {
    pub fn uri(&self) -> &str {
        match self {
            GroundingSource::Web { uri, .. } | GroundingSource::Maps { uri, .. } => uri,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            GroundingSource::Web { title, .. } | GroundingSource::Maps { title, .. } => title,
        }
    }

    pub fn label_prefix(&self) -> &'static str {
        match self {
            GroundingSource::Web { .. } => "[Web]",
            GroundingSource::Maps { .. } => "[Map]",
        }
    }

    /// Display lines for this source; map review snippets are indented below.
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} {} ({})",
            self.label_prefix(),
            self.title(),
            self.uri()
        )];
        if let GroundingSource::Maps {
            review_snippets, ..
        } = self
        {
            for snippet in review_snippets {
                lines.push(format!("    \"{}\" ({})", snippet.text, snippet.uri));
            }
        }
        lines
    }
}

/// Generated text plus the citations that grounded it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroundedText {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl GeneratedImage {
    pub fn data_url(&self) -> String {
        use base64::Engine as _;
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub image_model: String,
    pub video_model: String,
    pub script_model: String,
    pub search_model: String,
    pub live_model: String,
    pub analysis_model: String,
    pub speech_model: String,
    pub speech_voice: String,
    pub video_poll_interval: Duration,
    pub location: Option<Location>,
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            image_model: "imagen-4.0-generate-001".to_string(),
            video_model: "veo-3.1-fast-generate-preview".to_string(),
            script_model: "gemini-2.5-flash".to_string(),
            search_model: "gemini-2.5-flash".to_string(),
            live_model: "gemini-2.5-flash-lite".to_string(),
            analysis_model: "gemini-2.5-pro".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            speech_voice: "Kore".to_string(),
            video_poll_interval: Duration::from_secs(10),
            location: None,
            output_dir: "output".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::load_dotenv()?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load `.env` if present; a missing file is fine, a malformed one is not.
    fn load_dotenv() -> Result<()> {
        Self::check_dotenv(dotenvy::dotenv().map(|_| ()))
    }

    fn check_dotenv(loaded: std::result::Result<(), dotenvy::Error>) -> Result<()> {
        match loaded {
            Ok(()) => Ok(()),
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Build a config from an arbitrary key lookup (environment, test maps).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: String| non_empty(key).unwrap_or(default);

        let video_poll_interval = match non_empty("VIDEO_POLL_INTERVAL_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!(
                    "VIDEO_POLL_INTERVAL_SECS must be a whole number of seconds (got '{}')",
                    raw
                ))
            })?),
            None => defaults.video_poll_interval,
        };

        let location = match (non_empty("STUDIO_LATITUDE"), non_empty("STUDIO_LONGITUDE")) {
            (Some(lat), Some(lng)) => Some(Location {
                latitude: parse_coordinate("STUDIO_LATITUDE", &lat, 90.0)?,
                longitude: parse_coordinate("STUDIO_LONGITUDE", &lng, 180.0)?,
            }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "STUDIO_LATITUDE and STUDIO_LONGITUDE must be set together".to_string(),
                ))
            }
        };

        Ok(Self {
            api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")),
            base_url: non_empty("GEMINI_BASE_URL"),
            image_model: or_default("IMAGE_MODEL", defaults.image_model),
            video_model: or_default("VIDEO_MODEL", defaults.video_model),
            script_model: or_default("SCRIPT_MODEL", defaults.script_model),
            search_model: or_default("SEARCH_MODEL", defaults.search_model),
            live_model: or_default("LIVE_MODEL", defaults.live_model),
            analysis_model: or_default("ANALYSIS_MODEL", defaults.analysis_model),
            speech_model: or_default("SPEECH_MODEL", defaults.speech_model),
            speech_voice: or_default("SPEECH_VOICE", defaults.speech_voice),
            video_poll_interval,
            location,
            output_dir: or_default("OUTPUT_DIR", defaults.output_dir),
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::Config("GEMINI_API_KEY (or API_KEY) not set".to_string())
        })
    }
}

fn parse_coordinate(key: &str, raw: &str, limit: f64) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number (got '{}')", key, raw)))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(Error::Config(format!(
            "{} must be within ±{} (got {})",
            key, limit, value
        )));
    }
    Ok(value)
}
