//! Playback service connecting user requests to the stream resolver.

use std::sync::Arc;

use parking_lot::Mutex;
use resonate_core::{Error, Result};
use resonate_sources::{CancellationToken, StreamResolver};
use tracing::{debug, error, info};

use crate::state::{NowPlaying, PlayerState};
use crate::ui::{PlayerUi, RESOLUTION_FAILED_MESSAGE};

#[derive(Debug, Default)]
struct InFlight {
    generation: u64,
    cancel: Option<CancellationToken>,
}

/// Resolves the streams the user asks for and keeps player state in sync.
///
/// Starting a new request cancels the previous one. Results and failures are
/// only applied while their identifier is still the active one.
pub struct PlaybackService {
    resolver: StreamResolver,
    state: Arc<PlayerState>,
    ui: Arc<dyn PlayerUi>,
    in_flight: Mutex<InFlight>,
}

impl PlaybackService {
    pub fn new(resolver: StreamResolver, state: Arc<PlayerState>, ui: Arc<dyn PlayerUi>) -> Self {
        Self {
            resolver,
            state,
            ui,
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    pub fn state(&self) -> &Arc<PlayerState> {
        &self.state
    }

    /// Resolve and start `id`.
    ///
    /// Returns `Ok(None)` when the request was superseded before it finished.
    /// On failure the player returns to idle if `id` is still active; when
    /// every source failed the UI is also notified. The error is returned
    /// either way.
    pub async fn play(&self, id: &str) -> Result<Option<NowPlaying>> {
        info!("Playing {id}");
        if id.trim().is_empty() {
            return Err(Error::InvalidArgument("empty stream id".to_string()));
        }

        let (generation, cancel) = self.start_request();
        self.state.begin(id);

        let result = self.resolver.resolve_until(id, &cancel).await;
        self.finish_request(generation);

        match result {
            Ok(info) => {
                let Some(url) = info.best_audio().map(|v| v.url.clone()) else {
                    // from_parts guarantees at least one variant
                    return Err(Error::Validation(format!("{id} resolved without audio")));
                };
                let now_playing = NowPlaying {
                    id: id.to_string(),
                    url,
                    info,
                };

                if self.state.commit_if_active(now_playing.clone()) {
                    info!(
                        "Now playing {id} ({}) from {}",
                        now_playing.info.duration.format(),
                        now_playing.info.source
                    );
                    Ok(Some(now_playing))
                } else {
                    debug!("Discarding stale stream for {id}");
                    Ok(None)
                }
            }
            Err(Error::Cancelled) => {
                debug!("Resolution of {id} cancelled");
                Ok(None)
            }
            Err(e) => {
                error!("Failed to resolve {id}: {e}");
                if self.state.reset_if_active(id) && e.is_resolution_failed() {
                    self.ui.show_idle();
                    self.ui.notify(RESOLUTION_FAILED_MESSAGE);
                }
                Err(e)
            }
        }
    }

    /// Cancel any in-flight resolution and clear the active stream.
    pub fn stop(&self) {
        if let Some(cancel) = self.in_flight.lock().cancel.take() {
            cancel.cancel();
        }
        self.state.clear();
    }

    fn start_request(&self) -> (u64, CancellationToken) {
        let mut in_flight = self.in_flight.lock();
        if let Some(previous) = in_flight.cancel.take() {
            previous.cancel();
        }
        in_flight.generation += 1;
        let cancel = CancellationToken::new();
        in_flight.cancel = Some(cancel.clone());
        (in_flight.generation, cancel)
    }

    fn finish_request(&self, generation: u64) {
        let mut in_flight = self.in_flight.lock();
        if in_flight.generation == generation {
            in_flight.cancel = None;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use resonate_core::TransportError;
    use resonate_sources::adapters::{FixedBitrateSource, PipedSource};
    use resonate_sources::{Fetch, FetchRequest, FetchResponse, ResolverConfig, SourceConfig};
    use tokio::time::Instant;

    use super::*;
    use crate::state::PlaybackStatus;

    /// Answers conversion requests for ids in `ready` with a stream, fails
    /// Piped requests when `piped_down`, and hangs on everything else.
    struct FakeFetch {
        ready: Vec<&'static str>,
        piped_down: bool,
    }

    #[async_trait]
    impl Fetch for FakeFetch {
        async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
            let body = request.body.unwrap_or_default();
            let requested = body["url"].as_str().unwrap_or_default();

            if self.piped_down && request.url.starts_with("https://piped.test") {
                return Err(TransportError::Status {
                    status: 503,
                    message: String::new(),
                }
                .into());
            }
            let ready = self
                .ready
                .iter()
                .find(|id| !requested.is_empty() && requested.ends_with(*id));
            if let Some(id) = ready {
                let body = serde_json::json!({ "audio": format!("https://x/{id}.mp3") });
                return Ok(FetchResponse::new(body.to_string()));
            }
            std::future::pending().await
        }
    }

    #[derive(Default)]
    struct RecordingUi {
        idle: AtomicUsize,
        messages: Mutex<Vec<String>>,
    }

    impl PlayerUi for RecordingUi {
        fn show_idle(&self) {
            self.idle.fetch_add(1, Ordering::SeqCst);
        }

        fn notify(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }

    fn service(ready: Vec<&'static str>) -> (Arc<PlaybackService>, Arc<RecordingUi>) {
        service_with(FakeFetch {
            ready,
            piped_down: true,
        })
    }

    fn service_with(fetch: FakeFetch) -> (Arc<PlaybackService>, Arc<RecordingUi>) {
        let config = ResolverConfig {
            sources: vec![
                SourceConfig::Piped(PipedSource::new("piped", "https://piped.test")),
                SourceConfig::FixedBitrate(FixedBitrateSource::new(
                    "convert",
                    "https://convert.test/api/json",
                )),
            ],
            ..ResolverConfig::default()
        };
        let resolver = StreamResolver::with_fetcher(Arc::new(fetch), &config).unwrap();
        let ui = Arc::new(RecordingUi::default());
        let service = PlaybackService::new(resolver, Arc::new(PlayerState::new()), ui.clone());
        (Arc::new(service), ui)
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_updates_state() {
        let (service, ui) = service(vec!["abc"]);

        let now_playing = service.play("abc").await.unwrap().unwrap();

        assert_eq!(now_playing.url, "https://x/abc.mp3");
        assert_eq!(now_playing.info.source, "convert");
        assert_eq!(service.state().status(), PlaybackStatus::Playing);
        assert_eq!(service.state().now_playing().unwrap().id, "abc");
        assert_eq!(ui.idle.load(Ordering::SeqCst), 0);
        assert!(ui.messages.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_resets_ui_once_when_still_active() {
        let (service, ui) = service(vec![]);
        let start = Instant::now();

        let err = service.play("Z").await.unwrap_err();

        assert!(err.is_resolution_failed());
        // 3 rounds of one fast failure and one 10s timeout, plus 1s + 2s backoff.
        assert_eq!(start.elapsed(), Duration::from_secs(33));
        assert_eq!(ui.idle.load(Ordering::SeqCst), 1);
        assert_eq!(
            *ui.messages.lock(),
            vec![RESOLUTION_FAILED_MESSAGE.to_string()]
        );
        assert_eq!(service.state().status(), PlaybackStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_sources_timing_out_resets_ui_once() {
        let (service, ui) = service_with(FakeFetch {
            ready: vec![],
            piped_down: false,
        });
        let start = Instant::now();

        let err = service.play("Z").await.unwrap_err();

        assert!(matches!(err, Error::ResolutionFailed { ref id, rounds: 3 } if id == "Z"));
        // Two 10s timeouts per round, 3 rounds, plus 1s + 2s backoff.
        assert_eq!(start.elapsed(), Duration::from_secs(63));
        assert_eq!(ui.idle.load(Ordering::SeqCst), 1);
        assert_eq!(
            *ui.messages.lock(),
            vec![RESOLUTION_FAILED_MESSAGE.to_string()]
        );
        assert_eq!(service.state().status(), PlaybackStatus::Stopped);
        assert!(service.state().now_playing().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_id_is_rejected_without_touching_state() {
        let (service, ui) = service(vec![]);
        service.state().begin("current");

        let err = service.play("  ").await.unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(service.state().active_id().as_deref(), Some("current"));
        assert_eq!(service.state().status(), PlaybackStatus::Buffering);
        assert_eq!(ui.idle.load(Ordering::SeqCst), 0);
        assert!(ui.messages.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_for_inactive_id_is_silent() {
        let (service, ui) = service(vec![]);

        let task = {
            let service = service.clone();
            tokio::spawn(async move { service.play("Z").await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        // Another part of the app switched streams without cancelling.
        service.state().begin("other");

        let err = task.await.unwrap().unwrap_err();
        assert!(err.is_resolution_failed());
        assert_eq!(ui.idle.load(Ordering::SeqCst), 0);
        assert!(ui.messages.lock().is_empty());
        assert_eq!(service.state().active_id().as_deref(), Some("other"));
        assert_eq!(service.state().status(), PlaybackStatus::Buffering);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_request_supersedes_previous() {
        let (service, ui) = service(vec!["second"]);

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.play("first").await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;

        let second = service.play("second").await.unwrap().unwrap();
        assert_eq!(second.id, "second");

        assert!(first.await.unwrap().unwrap().is_none());
        assert_eq!(service.state().now_playing().unwrap().id, "second");
        assert_eq!(ui.idle.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_in_flight() {
        let (service, ui) = service(vec![]);

        let task = {
            let service = service.clone();
            tokio::spawn(async move { service.play("abc").await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        service.stop();

        assert!(task.await.unwrap().unwrap().is_none());
        assert!(service.state().active_id().is_none());
        assert!(ui.messages.lock().is_empty());
    }
}
