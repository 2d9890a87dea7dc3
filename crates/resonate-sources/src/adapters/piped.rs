//! Piped-compatible API instances.

use resonate_core::{Error, Result};
use serde::{Deserialize, Serialize};

use super::{encode_component, Extraction, SourceAdapter};
use crate::client::{FetchRequest, FetchResponse};
use crate::types::RawPipedStreams;

/// A Piped API instance. `audioStreams` is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipedSource {
    pub name: String,
    /// Instance root, e.g. `https://pipedapi.example`.
    pub base_url: String,
}

impl PipedSource {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
        }
    }
}

impl SourceAdapter for PipedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, id: &str) -> Result<FetchRequest> {
        Ok(FetchRequest::get(format!(
            "{}/streams/{}",
            self.base_url.trim_end_matches('/'),
            encode_component(id)
        )))
    }

    fn extract(&self, response: &FetchResponse) -> Result<Extraction> {
        let raw: RawPipedStreams = response.json()?;

        if let Some(error) = &raw.error {
            return Err(Error::Validation(format!("{}: {error}", self.name)));
        }

        let (metadata, audio_streams) = raw.into_parts();
        Ok(Extraction::new(metadata, audio_streams))
    }
}
