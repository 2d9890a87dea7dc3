//! Resolver configuration: retry policy and the ordered source catalog.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use resonate_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::{
    FixedBitrateSource, LinkListSource, PipedSource, SourceAdapter, StreamReadySource,
    UrlListSource,
};

/// One entry of the source catalog, tagged by extraction kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Piped(PipedSource),
    LinkList(LinkListSource),
    StreamReady(StreamReadySource),
    FixedBitrate(FixedBitrateSource),
    UrlList(UrlListSource),
}

impl SourceConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Piped(s) => &s.name,
            Self::LinkList(s) => &s.name,
            Self::StreamReady(s) => &s.name,
            Self::FixedBitrate(s) => &s.name,
            Self::UrlList(s) => &s.name,
        }
    }

    /// Build the adapter described by this entry.
    pub fn build(&self) -> Arc<dyn SourceAdapter> {
        match self {
            Self::Piped(s) => Arc::new(s.clone()),
            Self::LinkList(s) => Arc::new(s.clone()),
            Self::StreamReady(s) => Arc::new(s.clone()),
            Self::FixedBitrate(s) => Arc::new(s.clone()),
            Self::UrlList(s) => Arc::new(s.clone()),
        }
    }
}

/// Built-in catalog, in priority order.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::Piped(PipedSource::new(
            "piped-reallyawesome",
            "https://pipedapi.reallyaweso.me",
        )),
        SourceConfig::Piped(PipedSource::new(
            "piped-adminforge",
            "https://pipedapi.adminforge.de",
        )),
        SourceConfig::LinkList(LinkListSource::new(
            "acethinker",
            "https://www.acethinker.com/downloader/api/video_info.php",
        )),
        SourceConfig::StreamReady(StreamReadySource::new(
            "imput",
            "https://kityune.imput.net/api/json?id={id}",
        )),
        SourceConfig::FixedBitrate(FixedBitrateSource::new(
            "cobalt",
            "https://api.cobalt.tools/api/json",
        )),
        SourceConfig::UrlList(UrlListSource::new(
            "ytdlp-online",
            "https://api.allorigins.win/raw?url=https://ytdlp.online/stream?command={watch_url} --get-url",
        )),
    ]
}

const fn default_rounds() -> u32 {
    3
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_backoff_secs() -> u64 {
    1
}

const fn default_min_audio_streams() -> usize {
    1
}

/// Resolver configuration, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Full passes over the source list.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay unit between rounds; round `k` is followed by `k` units.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    /// Fewest playable variants a response needs to be accepted.
    #[serde(default = "default_min_audio_streams")]
    pub min_audio_streams: usize,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            timeout_secs: default_timeout_secs(),
            backoff_secs: default_backoff_secs(),
            min_audio_streams: default_min_audio_streams(),
            sources: default_sources(),
        }
    }
}

impl ResolverConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(Error::Config("rounds must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        if self.min_audio_streams == 0 {
            return Err(Error::Config(
                "min_audio_streams must be at least 1".to_string(),
            ));
        }
        if self.sources.is_empty() {
            return Err(Error::Config("at least one source is required".to_string()));
        }
        if let Some(source) = self.sources.iter().find(|s| s.name().trim().is_empty()) {
            return Err(Error::Config(format!("source without a name: {source:?}")));
        }
        Ok(())
    }

    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            rounds: self.rounds,
            timeout: Duration::from_secs(self.timeout_secs),
            backoff_step: Duration::from_secs(self.backoff_secs),
            min_audio_streams: self.min_audio_streams,
        }
    }

    pub fn build_sources(&self) -> Vec<Arc<dyn SourceAdapter>> {
        self.sources.iter().map(SourceConfig::build).collect()
    }
}

/// Round/timeout/backoff parameters of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub rounds: u32,
    pub timeout: Duration,
    pub backoff_step: Duration,
    pub min_audio_streams: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        ResolverConfig::default().policy()
    }
}

impl RetryPolicy {
    /// Wait after failed round `round` (1-based), or `None` after the last one.
    pub fn delay_after(&self, round: u32) -> Option<Duration> {
        (round < self.rounds).then(|| self.backoff_step * round)
    }
}
