//! Normalized media records.
//!
//! Every lookup service returns a different shape. Sources extract what they
//! can into a [`MediaMetadata`] and a list of [`AudioStreamVariant`]s, and
//! [`MediaStreamInfo::from_parts`] turns those into a record where every
//! field is populated.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{AudioStreamVariant, Duration};
use crate::{lenient, Error, Result};

pub const DEFAULT_TITLE: &str = "Unknown Title";
pub const DEFAULT_UPLOADER: &str = "Unknown Uploader";
pub const DEFAULT_CATEGORY: &str = "Unknown";

/// Metadata a source managed to extract. `None` means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub uploader: Option<String>,
    pub uploader_url: Option<String>,
    pub uploader_avatar: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<u64>,
    pub upload_date: Option<DateTime<Utc>>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub dislikes: Option<u64>,
    pub category: Option<String>,
    pub live_stream: Option<bool>,
    pub related_streams: Vec<RelatedStreamInfo>,
    pub subtitles: Vec<SubtitleInfo>,
    pub hls: Option<String>,
    pub dash: Option<String>,
}

/// A stream suggested alongside the resolved one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct RelatedStreamInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub uploader_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub uploader_url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "lenient::duration")]
    pub duration: Duration,
    /// Item kind as reported by the source (e.g. "stream", "playlist").
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub stream_type: String,
}

/// A subtitle track offered for the stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub mime_type: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Language code, e.g. "en".
    #[serde(default, deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub auto_generated: bool,
}

/// Normalized description of a playable media item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaStreamInfo {
    pub title: String,
    pub description: String,
    pub uploader: String,
    pub uploader_url: String,
    pub uploader_avatar: String,
    pub thumbnail_url: String,
    pub duration: Duration,
    pub upload_date: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub category: String,
    pub live_stream: bool,
    /// Playable variants, never empty.
    pub audio_streams: Vec<AudioStreamVariant>,
    pub related_streams: Vec<RelatedStreamInfo>,
    pub subtitles: Vec<SubtitleInfo>,
    /// HLS manifest URL.
    pub hls: Option<String>,
    /// DASH manifest URL.
    pub dash: Option<String>,
    /// Name of the source that produced this record.
    pub source: String,
}

impl MediaStreamInfo {
    /// Assemble a record from a source's extraction output.
    ///
    /// Fails with [`Error::Validation`] when no playable variant remains;
    /// other missing metadata never fails. `now` stands in for an unknown
    /// upload date.
    pub fn from_parts(
        source: impl Into<String>,
        metadata: MediaMetadata,
        audio_streams: Vec<AudioStreamVariant>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let source = source.into();
        let audio_streams: Vec<_> = audio_streams
            .into_iter()
            .filter(AudioStreamVariant::is_playable)
            .collect();

        if audio_streams.is_empty() {
            return Err(Error::Validation(format!(
                "{source} returned no audio streams"
            )));
        }

        let info = Self {
            title: metadata.title.unwrap_or_default(),
            description: metadata.description.unwrap_or_default(),
            uploader: metadata.uploader.unwrap_or_default(),
            uploader_url: metadata.uploader_url.unwrap_or_default(),
            uploader_avatar: metadata.uploader_avatar.unwrap_or_default(),
            thumbnail_url: metadata.thumbnail_url.unwrap_or_default(),
            duration: Duration::from_seconds(metadata.duration.unwrap_or(0)),
            upload_date: metadata.upload_date.unwrap_or(now),
            views: metadata.views.unwrap_or(0),
            likes: metadata.likes.unwrap_or(0),
            dislikes: metadata.dislikes.unwrap_or(0),
            category: metadata.category.unwrap_or_default(),
            live_stream: metadata.live_stream.unwrap_or(false),
            audio_streams,
            related_streams: metadata.related_streams,
            subtitles: metadata.subtitles,
            hls: metadata.hls,
            dash: metadata.dash,
            source,
        };

        Ok(info.normalized())
    }

    /// Replace every empty field with its documented default.
    ///
    /// Idempotent: normalizing an already normalized record is a no-op.
    pub fn normalized(mut self) -> Self {
        fill(&mut self.title, DEFAULT_TITLE);
        fill(&mut self.uploader, DEFAULT_UPLOADER);
        fill(&mut self.category, DEFAULT_CATEGORY);

        self.audio_streams = self
            .audio_streams
            .into_iter()
            .filter(AudioStreamVariant::is_playable)
            .map(AudioStreamVariant::normalized)
            .collect();
        self.related_streams.retain(|r| !r.url.trim().is_empty());
        self.subtitles.retain(|s| !s.url.trim().is_empty());

        self.hls = self.hls.filter(|s| !s.trim().is_empty());
        self.dash = self.dash.filter(|s| !s.trim().is_empty());
        self
    }

    /// The variant a player should try first.
    pub fn best_audio(&self) -> Option<&AudioStreamVariant> {
        self.audio_streams
            .iter()
            .max_by_key(|s| s.quality_score())
    }
}

fn fill(field: &mut String, default: &str) {
    if field.trim().is_empty() {
        *field = default.to_string();
    }
}

/// Parse the date formats lookup services use: RFC 3339, plain `YYYY-MM-DD`,
/// and Unix timestamps in seconds or milliseconds.
pub fn parse_upload_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
    }

    let stamp: i64 = raw.parse().ok()?;
    // Anything past year 5138 in seconds is really milliseconds.
    if stamp > 100_000_000_000 {
        Utc.timestamp_millis_opt(stamp).single()
    } else {
        Utc.timestamp_opt(stamp, 0).single()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_metadata() {
        let info = MediaStreamInfo::from_parts(
            "Cobalt",
            MediaMetadata::default(),
            vec![AudioStreamVariant::new("https://x/a.mp3")],
            now(),
        )
        .unwrap();

        assert_eq!(info.title, DEFAULT_TITLE);
        assert_eq!(info.uploader, DEFAULT_UPLOADER);
        assert_eq!(info.category, DEFAULT_CATEGORY);
        assert_eq!(info.upload_date, now());
        assert_eq!(info.views, 0);
        assert!(info.hls.is_none());
        assert_eq!(info.audio_streams[0].mime_type, "audio/mpeg");
        assert_eq!(info.source, "Cobalt");
    }

    #[test]
    fn test_no_playable_variant_is_invalid() {
        let metadata = MediaMetadata {
            title: Some("Has a title".into()),
            duration: Some(200),
            ..MediaMetadata::default()
        };

        let err = MediaStreamInfo::from_parts(
            "Piped",
            metadata,
            vec![AudioStreamVariant::new("   ")],
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err =
            MediaStreamInfo::from_parts("Piped", MediaMetadata::default(), vec![], now())
                .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_empty_manifests_become_none() {
        let metadata = MediaMetadata {
            hls: Some(String::new()),
            dash: Some("https://x/manifest.mpd".into()),
            ..MediaMetadata::default()
        };
        let info = MediaStreamInfo::from_parts(
            "Piped",
            metadata,
            vec![AudioStreamVariant::new("https://x/a.webm")],
            now(),
        )
        .unwrap();
        assert_eq!(info.hls, None);
        assert_eq!(info.dash.as_deref(), Some("https://x/manifest.mpd"));
    }

    #[test]
    fn test_subtitles_pass_through_and_drop_empty_urls() {
        let subtitles: Vec<SubtitleInfo> = serde_json::from_str(
            r#"[
                {"url": "https://x/en.vtt", "mimeType": "text/vtt", "name": "English",
                 "code": "en", "autoGenerated": true},
                {"url": null, "code": "de"}
            ]"#,
        )
        .unwrap();
        let metadata = MediaMetadata {
            subtitles,
            ..MediaMetadata::default()
        };

        let info = MediaStreamInfo::from_parts(
            "Piped",
            metadata,
            vec![AudioStreamVariant::new("https://x/a.webm")],
            now(),
        )
        .unwrap();
        assert_eq!(info.subtitles.len(), 1);
        assert_eq!(info.subtitles[0].code, "en");
        assert!(info.subtitles[0].auto_generated);

        let empty = MediaStreamInfo::from_parts(
            "Piped",
            MediaMetadata::default(),
            vec![AudioStreamVariant::new("https://x/a.webm")],
            now(),
        )
        .unwrap();
        assert!(empty.subtitles.is_empty());
    }

    #[test]
    fn test_best_audio() {
        let info = MediaStreamInfo::from_parts(
            "Piped",
            MediaMetadata::default(),
            vec![
                AudioStreamVariant::new("https://x/low.m4a").with_bitrate(48_000),
                AudioStreamVariant::new("https://x/high.opus").with_bitrate(160_000),
                AudioStreamVariant::new("https://x/mid.m4a").with_bitrate(128_000),
            ],
            now(),
        )
        .unwrap();
        assert_eq!(info.best_audio().unwrap().url, "https://x/high.opus");
    }

    #[test]
    fn test_parse_upload_date() {
        let expected = Utc.with_ymd_and_hms(2009, 10, 25, 6, 57, 33).unwrap();
        assert_eq!(
            parse_upload_date("2009-10-24T23:57:33-07:00"),
            Some(expected)
        );
        assert_eq!(
            parse_upload_date("2009-10-25"),
            Some(Utc.with_ymd_and_hms(2009, 10, 25, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_upload_date("1256453853"), Some(expected));
        assert_eq!(parse_upload_date("1256453853000"), Some(expected));
        assert_eq!(parse_upload_date("yesterday"), None);
        assert_eq!(parse_upload_date(""), None);
    }

    fn arb_metadata() -> impl Strategy<Value = MediaMetadata> {
        (
            proptest::option::of(".{0,12}"),
            proptest::option::of(" {0,2}[a-z]{0,8}"),
            proptest::option::of(any::<u64>()),
            proptest::option::of(any::<bool>()),
            proptest::option::of("[ a-z:/.]{0,16}"),
        )
            .prop_map(|(title, uploader, views, live, hls)| MediaMetadata {
                title,
                uploader,
                views,
                live_stream: live,
                hls,
                ..MediaMetadata::default()
            })
    }

    proptest! {
        #[test]
        fn prop_normalization_is_idempotent(
            metadata in arb_metadata(),
            urls in proptest::collection::vec("[ ]{0,1}https://x/[a-z]{1,6}(\\.mp3|\\.weba|)[ ]{0,1}", 1..4),
        ) {
            let variants = urls.into_iter().map(AudioStreamVariant::new).collect();
            let once = MediaStreamInfo::from_parts("Piped", metadata, variants, now()).unwrap();
            let twice = once.clone().normalized();
            prop_assert_eq!(once, twice);
        }
    }
}
