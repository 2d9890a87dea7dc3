//! Audio stream variants and format detection.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// MIME type used when nothing better can be inferred.
pub const UNKNOWN_MIME: &str = "audio/unknown";

/// One playable encoding of a media item.
///
/// Only `url` is mandatory. The remaining fields default to `0` / `""` and
/// `mime_type` is inferred from the URL during [`normalized`](Self::normalized).
/// Field names follow the Piped `audioStreams` shape so those payloads
/// deserialize verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct AudioStreamVariant {
    /// The stream URL. Entries without one deserialize as unplayable.
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    /// Bitrate in bits per second, 0 when unknown.
    #[serde(default, deserialize_with = "lenient::number")]
    pub bitrate: u64,
    /// Codec name (e.g. "opus"), empty when unknown.
    #[serde(default, deserialize_with = "lenient::string")]
    pub codec: String,
    /// MIME type.
    #[serde(default, deserialize_with = "lenient::string")]
    pub mime_type: String,
    /// Human readable quality label (e.g. "160 kbps").
    #[serde(default, deserialize_with = "lenient::string")]
    pub quality: String,
    /// Content length in bytes, 0 when unknown.
    #[serde(default, deserialize_with = "lenient::number")]
    pub content_length: u64,
}

impl AudioStreamVariant {
    /// A variant with only a URL; every quality field is unknown.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bitrate: 0,
            codec: String::new(),
            mime_type: String::new(),
            quality: String::new(),
            content_length: 0,
        }
    }

    pub const fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = bitrate;
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    /// Whether this variant carries a URL that can be handed to a player.
    pub fn is_playable(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Best guess at the audio format, from the MIME type first and the URL second.
    pub fn format(&self) -> AudioFormat {
        match AudioFormat::from_mime(&self.mime_type) {
            AudioFormat::Unknown => AudioFormat::from_url(&self.url),
            format => format,
        }
    }

    /// Quality score for sorting (higher is better).
    pub fn quality_score(&self) -> u64 {
        u64::from(self.format().quality_score()) * 1_000_000 + self.bitrate.min(999_999)
    }

    /// Fill defaults for any field the source left empty.
    pub fn normalized(mut self) -> Self {
        let trimmed = self.url.trim();
        if trimmed.len() != self.url.len() {
            self.url = trimmed.to_string();
        }
        if self.mime_type.trim().is_empty() {
            self.mime_type = AudioFormat::from_url(&self.url)
                .mime_type()
                .to_string();
        }
        self
    }
}

/// Audio codec/container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Opus codec (best quality/size ratio).
    Opus,
    /// AAC codec.
    Aac,
    /// MP3 codec.
    Mp3,
    /// FLAC codec (lossless).
    Flac,
    /// Vorbis codec.
    Vorbis,
    /// `WebM` container with audio.
    WebM,
    /// MP4/M4A container.
    M4a,
    /// Unknown format.
    #[default]
    Unknown,
}

impl AudioFormat {
    /// Parse from MIME type or format string.
    pub fn from_mime(mime: &str) -> Self {
        let mime_lower = mime.to_lowercase();

        if mime_lower.contains("opus") {
            Self::Opus
        } else if mime_lower.contains("aac") || mime_lower.contains("mp4a") {
            Self::Aac
        } else if mime_lower.contains("mp3") || mime_lower.contains("mpeg") {
            Self::Mp3
        } else if mime_lower.contains("flac") {
            Self::Flac
        } else if mime_lower.contains("vorbis") || mime_lower.contains("ogg") {
            Self::Vorbis
        } else if mime_lower.contains("webm") {
            Self::WebM
        } else if mime_lower.contains("m4a") || mime_lower.contains("mp4") {
            Self::M4a
        } else {
            Self::Unknown
        }
    }

    /// Parse from a file extension or container tag such as `weba`.
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "opus" => Self::Opus,
            "aac" => Self::Aac,
            "mp3" => Self::Mp3,
            "flac" => Self::Flac,
            "ogg" | "oga" => Self::Vorbis,
            "weba" | "webm" => Self::WebM,
            "m4a" | "mp4" => Self::M4a,
            _ => Self::Unknown,
        }
    }

    /// Infer from the last path segment of a URL.
    pub fn from_url(raw: &str) -> Self {
        let Ok(parsed) = url::Url::parse(raw) else {
            return Self::Unknown;
        };
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|name| name.rsplit_once('.'))
            .map_or(Self::Unknown, |(_, ext)| Self::from_extension(ext))
    }

    /// MIME type reported for this format.
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Opus => "audio/opus",
            Self::Aac => "audio/aac",
            Self::Mp3 => "audio/mpeg",
            Self::Flac => "audio/flac",
            Self::Vorbis => "audio/ogg",
            Self::WebM => "audio/webm",
            Self::M4a => "audio/mp4",
            Self::Unknown => UNKNOWN_MIME,
        }
    }

    /// Quality score for sorting (higher = better codec efficiency).
    pub const fn quality_score(&self) -> u32 {
        match self {
            Self::Opus => 100,
            Self::Flac => 95,
            Self::Aac | Self::M4a => 80,
            Self::Vorbis => 75,
            Self::Mp3 => 70,
            Self::WebM => 60,
            Self::Unknown => 0,
        }
    }
}
