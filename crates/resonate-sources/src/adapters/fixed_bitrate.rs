//! Conversion services producing audio at one fixed bitrate.

use resonate_core::{AudioStreamVariant, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{watch_url, Extraction, SourceAdapter};
use crate::client::{FetchRequest, FetchResponse};
use crate::types::RawConversion;

/// Conversion API: one variant tagged with the service's fixed bitrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedBitrateSource {
    pub name: String,
    /// Endpoint receiving the JSON conversion request.
    pub endpoint: String,
    /// Requested output container (`aFormat`).
    pub audio_format: String,
    /// Bitrate requested from and reported for the service, in bits/s.
    pub bitrate: u64,
    /// Quality label reported for the variant.
    pub quality: String,
    /// MIME type reported for the variant.
    pub mime_type: String,
}

impl Default for FixedBitrateSource {
    fn default() -> Self {
        Self {
            name: String::new(),
            endpoint: String::new(),
            audio_format: "mp3".to_string(),
            bitrate: 8000,
            quality: "8 kbps".to_string(),
            mime_type: "audio/mp3".to_string(),
        }
    }
}

impl FixedBitrateSource {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

impl SourceAdapter for FixedBitrateSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, id: &str) -> Result<FetchRequest> {
        let body = json!({
            "url": watch_url(id),
            "aFormat": self.audio_format,
            "isAudioOnly": true,
            "audioBitrate": self.bitrate,
        });

        Ok(FetchRequest::post_json(self.endpoint.clone(), body)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json"))
    }

    fn extract(&self, response: &FetchResponse) -> Result<Extraction> {
        let raw: RawConversion = response.json()?;

        let audio_streams = raw
            .audio
            .or(raw.url)
            .map(|url| {
                vec![AudioStreamVariant::new(url)
                    .with_bitrate(self.bitrate)
                    .with_quality(self.quality.clone())
                    .with_mime_type(self.mime_type.clone())]
            })
            .unwrap_or_default();

        Ok(Extraction::new(raw.metadata.into_metadata(), audio_streams))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::Method;

    fn source() -> FixedBitrateSource {
        FixedBitrateSource::new("convert", "https://convert.example/api/json")
    }

    #[test]
    fn test_request_is_json_post() {
        let request = source().request("abc").unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "https://convert.example/api/json");
        assert!(request
            .headers
            .contains(&("Accept".to_string(), "application/json".to_string())));

        let body = request.body.unwrap();
        assert_eq!(body["url"], "https://www.youtube.com/watch?v=abc");
        assert_eq!(body["aFormat"], "mp3");
        assert_eq!(body["isAudioOnly"], true);
        assert_eq!(body["audioBitrate"], 8000);
    }

    #[test]
    fn test_audio_field_preferred_over_url() {
        let extraction = source()
            .extract(&FetchResponse::new(
                r#"{"audio": "https://x/a.mp3", "url": "https://x/other"}"#,
            ))
            .unwrap();
        assert_eq!(extraction.audio_streams.len(), 1);
        let variant = &extraction.audio_streams[0];
        assert_eq!(variant.url, "https://x/a.mp3");
        assert_eq!(variant.bitrate, 8000);
        assert_eq!(variant.quality, "8 kbps");
        assert_eq!(variant.mime_type, "audio/mp3");
    }

    #[test]
    fn test_generic_url_fallback() {
        let extraction = source()
            .extract(&FetchResponse::new(
                r#"{"status": "redirect", "url": "https://x/b.mp3"}"#,
            ))
            .unwrap();
        assert_eq!(extraction.audio_streams[0].url, "https://x/b.mp3");
    }

    #[test]
    fn test_no_url_yields_nothing() {
        let extraction = source()
            .extract(&FetchResponse::new(r#"{"status": "error", "text": "nope"}"#))
            .unwrap();
        assert!(extraction.audio_streams.is_empty());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let source: FixedBitrateSource = serde_json::from_str(
            r#"{"name": "c", "endpoint": "https://c.example", "bitrate": 128000, "quality": "128 kbps"}"#,
        )
        .unwrap();
        assert_eq!(source.bitrate, 128_000);
        assert_eq!(source.audio_format, "mp3");
        assert_eq!(source.mime_type, "audio/mp3");
    }
}
