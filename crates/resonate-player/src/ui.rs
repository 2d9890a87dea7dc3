//! UI hooks the playback service reports to.

use tracing::{info, warn};

/// Message shown when no source could provide a stream.
pub const RESOLUTION_FAILED_MESSAGE: &str =
    "Could not retrieve stream data in any way. Please try again later.";

/// Presentation layer collaborator.
///
/// Only invoked for the identifier that is still active.
pub trait PlayerUi: Send + Sync {
    /// Switch the play control back to its idle visual.
    fn show_idle(&self);

    /// Show a user-facing message.
    fn notify(&self, message: &str);
}

/// [`PlayerUi`] that reports through the log, for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogUi;

impl PlayerUi for LogUi {
    fn show_idle(&self) {
        info!("Player idle");
    }

    fn notify(&self, message: &str) {
        warn!("{message}");
    }
}
