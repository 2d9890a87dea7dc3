//! Player state shared between the playback service and the UI.

use parking_lot::RwLock;
use resonate_core::MediaStreamInfo;
use serde::Serialize;

/// Playback state.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Serialize)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Buffering,
    Playing,
}

/// A resolved stream ready to hand to the audio output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NowPlaying {
    /// Identifier the stream was resolved for.
    pub id: String,
    /// URL of the variant chosen for playback.
    pub url: String,
    pub info: MediaStreamInfo,
}

#[derive(Debug, Default)]
struct Inner {
    active_id: Option<String>,
    status: PlaybackStatus,
    now_playing: Option<NowPlaying>,
}

/// Player state. All updates go through one lock so the "is this id still
/// active" check and the write that depends on it cannot interleave.
#[derive(Debug, Default)]
pub struct PlayerState {
    inner: RwLock<Inner>,
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier the user most recently asked for.
    pub fn active_id(&self) -> Option<String> {
        self.inner.read().active_id.clone()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.inner.read().status
    }

    pub fn now_playing(&self) -> Option<NowPlaying> {
        self.inner.read().now_playing.clone()
    }

    /// Make `id` the active identifier and show it as buffering.
    pub fn begin(&self, id: &str) {
        let mut inner = self.inner.write();
        inner.active_id = Some(id.to_string());
        inner.status = PlaybackStatus::Buffering;
    }

    /// Store a resolved stream if its id is still active.
    pub fn commit_if_active(&self, now_playing: NowPlaying) -> bool {
        let mut inner = self.inner.write();
        if inner.active_id.as_deref() != Some(now_playing.id.as_str()) {
            return false;
        }
        inner.status = PlaybackStatus::Playing;
        inner.now_playing = Some(now_playing);
        true
    }

    /// Return to the idle state if `id` is still active.
    pub fn reset_if_active(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.active_id.as_deref() != Some(id) {
            return false;
        }
        inner.status = PlaybackStatus::Stopped;
        inner.now_playing = None;
        true
    }

    /// Forget the active identifier and stop.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.active_id = None;
        inner.status = PlaybackStatus::Stopped;
        inner.now_playing = None;
    }
}
