//! Core domain types for Resonate.

pub mod common;
pub mod media;
pub mod stream;

pub use common::Duration;
pub use media::{MediaMetadata, MediaStreamInfo, RelatedStreamInfo, SubtitleInfo};
pub use stream::{AudioFormat, AudioStreamVariant};
