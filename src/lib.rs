//! Story studio: AI-assisted production of a short news story.
//!
//! Five capability panels (scene video, storyboard stills, script and
//! research, narration, live report) share one set of Gemini-backed
//! services. The video panel drives a long-running submit/poll/fetch job.

pub mod ai;
pub mod app;
pub mod audio;
pub mod credentials;
pub mod error;
pub mod jobs;
pub mod location;
pub mod media;
pub mod models;
pub mod prompts;
pub mod studio;

pub use error::{Error, Result};
