//! Lookup service adapters.
//!
//! Each adapter knows how to ask one kind of service for an identifier and
//! how to pull audio variants out of that service's answer. The resolver
//! only sees the [`SourceAdapter`] trait, so adding a service means adding
//! an implementation here and a variant in [`crate::config::SourceConfig`].

mod fixed_bitrate;
mod link_list;
mod piped;
mod stream_ready;
mod url_list;

use std::fmt::Debug;

use resonate_core::{AudioStreamVariant, MediaMetadata, Result};

use crate::client::{FetchRequest, FetchResponse};

pub use fixed_bitrate::FixedBitrateSource;
pub use link_list::LinkListSource;
pub use piped::PipedSource;
pub use stream_ready::StreamReadySource;
pub use url_list::UrlListSource;

/// Prefix turning a content identifier into a watch page URL.
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// What a source extracted from one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub metadata: MediaMetadata,
    pub audio_streams: Vec<AudioStreamVariant>,
}

impl Extraction {
    pub fn new(metadata: MediaMetadata, audio_streams: Vec<AudioStreamVariant>) -> Self {
        Self {
            metadata,
            audio_streams,
        }
    }
}

/// A third-party service that can resolve identifiers to audio streams.
pub trait SourceAdapter: Send + Sync + Debug {
    /// Name used in logs and recorded on the resolved record.
    fn name(&self) -> &str;

    /// Build the request for `id`.
    fn request(&self, id: &str) -> Result<FetchRequest>;

    /// Extract metadata and audio variants from a successful response.
    ///
    /// An empty `audio_streams` list is allowed here; the resolver treats it
    /// as a validation failure.
    fn extract(&self, response: &FetchResponse) -> Result<Extraction>;
}

/// Watch page URL for an identifier.
pub fn watch_url(id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{}", encode_component(id))
}

/// Percent-encode `value` for use in a path segment or query value.
pub(crate) fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Expand `{id}` and `{watch_url}` placeholders.
pub(crate) fn fill_template(template: &str, id: &str) -> String {
    template
        .replace("{watch_url}", &watch_url(id))
        .replace("{id}", &encode_component(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(
            watch_url("a b&c"),
            "https://www.youtube.com/watch?v=a+b%26c"
        );
    }

    #[test]
    fn test_fill_template() {
        assert_eq!(
            fill_template("https://api.example/json?id={id}", "abc"),
            "https://api.example/json?id=abc"
        );
        assert_eq!(
            fill_template("https://proxy.example/raw?url={watch_url} --get-url", "abc"),
            "https://proxy.example/raw?url=https://www.youtube.com/watch?v=abc --get-url"
        );
    }
}
