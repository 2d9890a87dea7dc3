//! Services answering with a single URL once a stream is ready.

use resonate_core::{types::stream::UNKNOWN_MIME, AudioStreamVariant, Result};
use serde::{Deserialize, Serialize};

use super::{fill_template, Extraction, SourceAdapter};
use crate::client::{FetchRequest, FetchResponse};
use crate::types::RawStreamReady;

fn default_ready_status() -> String {
    "stream".to_string()
}

/// "Stream ready" API: one variant when `status` matches and a URL is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamReadySource {
    pub name: String,
    /// Request URL; `{id}` and `{watch_url}` are substituted.
    pub url_template: String,
    /// Status value signalling a playable URL.
    #[serde(default = "default_ready_status")]
    pub ready_status: String,
}

impl StreamReadySource {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            ready_status: default_ready_status(),
        }
    }
}

impl SourceAdapter for StreamReadySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, id: &str) -> Result<FetchRequest> {
        Ok(FetchRequest::get(fill_template(&self.url_template, id)))
    }

    fn extract(&self, response: &FetchResponse) -> Result<Extraction> {
        let raw: RawStreamReady = response.json()?;

        let audio_streams = match raw.url {
            Some(url) if raw.status == self.ready_status => {
                vec![AudioStreamVariant::new(url).with_mime_type(UNKNOWN_MIME)]
            }
            _ => Vec::new(),
        };

        Ok(Extraction::new(raw.metadata.into_metadata(), audio_streams))
    }
}
