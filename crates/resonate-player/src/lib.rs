//! # resonate-player
//!
//! Playback side of Resonate: tracks which stream the user asked for,
//! resolves it through [`resonate_sources::StreamResolver`], and reports
//! failures to the UI only while the request is still current.

pub mod service;
pub mod state;
pub mod ui;

pub use service::PlaybackService;
pub use state::{NowPlaying, PlaybackStatus, PlayerState};
pub use ui::{LogUi, PlayerUi, RESOLUTION_FAILED_MESSAGE};
