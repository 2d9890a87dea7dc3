//! Raw response shapes returned by lookup services.

use resonate_core::{
    lenient,
    types::media::parse_upload_date,
    AudioStreamVariant, MediaMetadata, RelatedStreamInfo, SubtitleInfo,
};
use serde::Deserialize;

/// Metadata fields commonly found on non-Piped payloads, under either of
/// the names services use for them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub uploader: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub uploader_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub author_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub duration: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub length_seconds: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub live_stream: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub live_now: Option<bool>,
    #[serde(default)]
    pub related_streams: Option<Vec<RelatedStreamInfo>>,
    #[serde(default)]
    pub subtitles: Option<Vec<SubtitleInfo>>,
}

impl RawMetadata {
    pub fn into_metadata(self) -> MediaMetadata {
        MediaMetadata {
            title: self.title,
            description: self.description,
            uploader: self.uploader.or(self.author),
            uploader_url: self.uploader_url.or(self.author_url),
            thumbnail_url: self.thumbnail,
            duration: self.duration.or(self.length_seconds),
            category: self.category.or(self.genre),
            live_stream: self.live_stream.or(self.live_now),
            related_streams: self.related_streams.unwrap_or_default(),
            subtitles: self.subtitles.unwrap_or_default(),
            ..MediaMetadata::default()
        }
    }
}

/// Piped `/streams/{id}` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPipedStreams {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub upload_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub uploader: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub uploader_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub uploader_avatar: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hls: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub dash: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub duration: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub views: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub dislikes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub livestream: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub live_stream: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub live_now: Option<bool>,
    #[serde(default)]
    pub audio_streams: Option<Vec<AudioStreamVariant>>,
    #[serde(default)]
    pub related_streams: Option<Vec<RelatedStreamInfo>>,
    #[serde(default)]
    pub subtitles: Option<Vec<SubtitleInfo>>,
    /// Set instead of the fields above when the instance reports a failure.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub error: Option<String>,
}

impl RawPipedStreams {
    /// Split into normalized metadata and the verbatim audio stream list.
    pub fn into_parts(self) -> (MediaMetadata, Vec<AudioStreamVariant>) {
        let metadata = MediaMetadata {
            title: self.title,
            description: self.description,
            uploader: self.uploader,
            uploader_url: self.uploader_url,
            uploader_avatar: self.uploader_avatar,
            thumbnail_url: self.thumbnail_url,
            duration: self.duration,
            upload_date: self.upload_date.as_deref().and_then(parse_upload_date),
            views: self.views,
            likes: self.likes,
            dislikes: self.dislikes,
            category: self.category,
            live_stream: self.livestream.or(self.live_stream).or(self.live_now),
            related_streams: self.related_streams.unwrap_or_default(),
            subtitles: self.subtitles.unwrap_or_default(),
            hls: self.hls,
            dash: self.dash,
        };
        (metadata, self.audio_streams.unwrap_or_default())
    }
}

/// Link-list response: `links` may be a flat array or nested arrays of links.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLinkList {
    #[serde(default)]
    pub links: serde_json::Value,
    #[serde(flatten)]
    pub metadata: RawMetadata,
}

/// One entry of a link list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLink {
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ext: String,
}

/// Response of a service that answers with a single ready-to-play URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStreamReady {
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub metadata: RawMetadata,
}

/// Response of a conversion service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConversion {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub audio: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub metadata: RawMetadata,
}
