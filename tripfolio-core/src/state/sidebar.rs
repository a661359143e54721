//! Navigation sidebar state. In-memory only; every launch starts closed.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sidebar {
    pub is_open: bool,
}

/// Reactive container for [`Sidebar`].
#[derive(Debug)]
pub struct SidebarStore {
    state: watch::Sender<Sidebar>,
}

impl SidebarStore {
    pub fn new() -> Self {
        let (state, _rx) = watch::channel(Sidebar::default());
        Self { state }
    }

    pub fn snapshot(&self) -> Sidebar {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Sidebar> {
        self.state.subscribe()
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open
    }

    /// Open if closed, close if open.
    pub fn toggle(&self) {
        self.state.send_modify(|sidebar| {
            sidebar.is_open = !sidebar.is_open;
            tracing::debug!(is_open = sidebar.is_open, "Sidebar toggled");
        });
    }

    /// Close the sidebar. Does nothing (and notifies nobody) if already closed.
    pub fn close(&self) {
        self.state.send_if_modified(|sidebar| {
            if !sidebar.is_open {
                return false;
            }
            sidebar.is_open = false;
            tracing::debug!("Sidebar closed");
            true
        });
    }
}

impl Default for SidebarStore {
    fn default() -> Self {
        Self::new()
    }
}
