//! Multi-source stream resolution with linear backoff.

use std::sync::Arc;

use chrono::Utc;
use resonate_core::{Error, MediaStreamInfo, Result, TransportError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapters::SourceAdapter;
use crate::client::{Fetch, HttpClient};
use crate::config::{ResolverConfig, RetryPolicy};

/// Resolves identifiers by trying each source in priority order.
///
/// Sources are tried one at a time. The first one that yields playable audio
/// wins; transport failures, timeouts and empty answers move on to the next
/// source. A failed round is followed by a linear backoff before the next.
#[derive(Clone)]
pub struct StreamResolver {
    fetcher: Arc<dyn Fetch>,
    sources: Vec<Arc<dyn SourceAdapter>>,
    policy: RetryPolicy,
}

impl StreamResolver {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        sources: Vec<Arc<dyn SourceAdapter>>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            sources,
            policy,
        }
    }

    /// Build a resolver backed by [`HttpClient`] from a validated config.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        config.validate()?;
        let policy = config.policy();
        let client = HttpClient::with_timeout(policy.timeout)?;
        Ok(Self::new(Arc::new(client), config.build_sources(), policy))
    }

    /// Build a resolver using a custom fetcher.
    pub fn with_fetcher(fetcher: Arc<dyn Fetch>, config: &ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(fetcher, config.build_sources(), config.policy()))
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Source names in priority order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve `id` to a normalized stream record.
    pub async fn resolve(&self, id: &str) -> Result<MediaStreamInfo> {
        self.resolve_until(id, &CancellationToken::new()).await
    }

    /// Resolve `id`, giving up with [`Error::Cancelled`] once `cancel` fires.
    pub async fn resolve_until(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MediaStreamInfo> {
        if id.trim().is_empty() {
            return Err(Error::InvalidArgument("empty stream id".to_string()));
        }

        for round in 1..=self.policy.rounds {
            for source in &self.sources {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }

                info!("Attempting to fetch {id} from {} (round {round})", source.name());

                match self.attempt(source.as_ref(), id, cancel).await {
                    Ok(stream) => {
                        info!(
                            "{} returned {} audio stream(s) for {id}",
                            source.name(),
                            stream.audio_streams.len()
                        );
                        return Ok(stream);
                    }
                    Err(Error::Cancelled) => return Err(Error::Cancelled),
                    Err(e @ Error::Validation(_)) => {
                        debug!("{} did not return valid data: {e}", source.name());
                    }
                    Err(e) if e.is_source_error() => {
                        warn!("Error fetching from {}: {e}", source.name());
                    }
                    Err(e) => {
                        warn!("{} could not be used: {e}", source.name());
                    }
                }
            }

            if let Some(delay) = self.policy.delay_after(round) {
                debug!("Round {round} failed for {id}, retrying in {delay:?}");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(Error::Cancelled),
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }

        warn!(
            "All {} sources failed for {id} after {} rounds",
            self.sources.len(),
            self.policy.rounds
        );
        Err(Error::ResolutionFailed {
            id: id.to_string(),
            rounds: self.policy.rounds,
        })
    }

    async fn attempt(
        &self,
        source: &dyn SourceAdapter,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MediaStreamInfo> {
        let request = source.request(id)?;

        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            result = tokio::time::timeout(self.policy.timeout, self.fetcher.fetch(request)) => result,
        };
        let response = fetched.map_err(|_| TransportError::Timeout)??;

        let extraction = source.extract(&response)?;
        let playable = extraction
            .audio_streams
            .iter()
            .filter(|s| s.is_playable())
            .count();
        if playable < self.policy.min_audio_streams {
            return Err(Error::Validation(format!(
                "{} returned {playable} playable audio stream(s), need {}",
                source.name(),
                self.policy.min_audio_streams
            )));
        }

        MediaStreamInfo::from_parts(
            source.name(),
            extraction.metadata,
            extraction.audio_streams,
            Utc::now(),
        )
    }
}
