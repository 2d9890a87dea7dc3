//! Services streaming a line-oriented list of URLs.

use resonate_core::{AudioStreamVariant, MediaMetadata, Result};
use serde::{Deserialize, Serialize};

use super::{fill_template, Extraction, SourceAdapter};
use crate::client::{FetchRequest, FetchResponse};

fn default_line_prefix() -> String {
    "data:".to_string()
}

/// URL-list scraping API: every `data:`-prefixed absolute URL line is a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlListSource {
    pub name: String,
    /// Request URL; `{id}` and `{watch_url}` are substituted.
    pub url_template: String,
    /// Marker a line must start with to carry a URL.
    #[serde(default = "default_line_prefix")]
    pub line_prefix: String,
}

impl UrlListSource {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            line_prefix: default_line_prefix(),
        }
    }

    /// URLs found in a response body, in order.
    pub fn parse_urls<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        text.lines()
            .filter_map(|line| line.trim().strip_prefix(self.line_prefix.as_str()))
            .map(str::trim)
            .filter(|candidate| is_absolute_http_url(candidate))
    }
}

fn is_absolute_http_url(candidate: &str) -> bool {
    url::Url::parse(candidate).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

impl SourceAdapter for UrlListSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn request(&self, id: &str) -> Result<FetchRequest> {
        Ok(FetchRequest::get(fill_template(&self.url_template, id)))
    }

    fn extract(&self, response: &FetchResponse) -> Result<Extraction> {
        let text = response.text();
        let audio_streams = self
            .parse_urls(&text)
            .map(AudioStreamVariant::new)
            .collect();

        Ok(Extraction::new(MediaMetadata::default(), audio_streams))
    }
}
