//! Services answering with a list of downloadable links of mixed containers.

use resonate_core::{AudioFormat, AudioStreamVariant, Result, TransportError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{watch_url, Extraction, SourceAdapter};
use crate::client::{FetchRequest, FetchResponse};
use crate::types::{RawLink, RawLinkList};

fn default_audio_extensions() -> Vec<String> {
    vec!["weba".to_string()]
}

/// Link-list API: only links whose `ext` is an audio container become variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkListSource {
    pub name: String,
    /// Endpoint receiving the watch URL as its `url` query parameter.
    pub endpoint: String,
    /// Container tags accepted as audio, compared case-insensitively.
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,
}

impl LinkListSource {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            audio_extensions: default_audio_extensions(),
        }
    }

    fn is_audio(&self, ext: &str) -> bool {
        self.audio_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(ext.trim()))
    }
}

impl SourceAdapter for LinkListSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, id: &str) -> Result<FetchRequest> {
        let watch = watch_url(id);
        let url = url::Url::parse_with_params(
            &self.endpoint,
            &[("url", watch.as_str()), ("israpid", "1"), ("ismp3", "0")],
        )
        .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", self.endpoint)))?;

        Ok(FetchRequest::get(url.to_string()))
    }

    fn extract(&self, response: &FetchResponse) -> Result<Extraction> {
        let raw: RawLinkList = response.json()?;

        let mut links = Vec::new();
        flatten_links(raw.links, &mut links);

        let audio_streams = links
            .into_iter()
            .filter(|link| self.is_audio(&link.ext))
            .map(|link| {
                let mime = AudioFormat::from_extension(&link.ext).mime_type();
                AudioStreamVariant::new(link.url).with_mime_type(mime)
            })
            .collect();

        Ok(Extraction::new(raw.metadata.into_metadata(), audio_streams))
    }
}

/// Collect link objects from arbitrarily nested arrays, in document order.
fn flatten_links(value: Value, out: &mut Vec<RawLink>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_links(item, out);
            }
        }
        Value::Object(_) => {
            if let Ok(link) = serde_json::from_value::<RawLink>(value) {
                out.push(link);
            }
        }
        _ => {}
    }
}
