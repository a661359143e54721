//! Global dark-mode marker consumed by the styling layer.

use tokio::sync::watch;

/// Receives theme changes from the settings store.
///
/// The host implements this to flip whatever its styling layer keys off
/// (a root CSS class, egui visuals, a GTK color scheme).
///
/// Called after the new theme is published, outside the settings store's
/// state lock: implementations may read the store. They must not change the
/// theme from inside the callback.
pub trait PresentationMarker: Send + Sync {
    fn set_dark_mode(&self, enabled: bool);
}

/// Observable dark-mode flag.
///
/// Styling code subscribes and re-renders when the flag changes.
#[derive(Debug)]
pub struct DarkModeMarker {
    tx: watch::Sender<bool>,
}

impl DarkModeMarker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn is_dark(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for DarkModeMarker {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationMarker for DarkModeMarker {
    fn set_dark_mode(&self, enabled: bool) {
        let changed = self.tx.send_if_modified(|dark| {
            if *dark == enabled {
                return false;
            }
            *dark = enabled;
            true
        });
        if changed {
            tracing::debug!(dark = enabled, "Presentation marker updated");
        }
    }
}
