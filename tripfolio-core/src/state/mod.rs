//! # State Module
//!
//! Reactive UI state for Tripfolio.
//!
//! Three independent stores, each owning one slice of state behind its own
//! `watch` channel. Nothing is shared between them, so a toggle on one never
//! waits on another.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           AppStores                                     │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐   │
//! │  │  SettingsStore   │  │  SidebarStore    │  │  ModalStore          │   │
//! │  │                  │  │                  │  │                      │   │
//! │  │  theme           │  │  is_open         │  │  Overlay:            │   │
//! │  │  ocr_method      │  │                  │  │   Closed             │   │
//! │  │  ocr_api_key     │  │  (memory only)   │  │   AddExpense{trip?}  │   │
//! │  │  ocr_template    │  │                  │  │   AddTrip            │   │
//! │  │                  │  │                  │  │   ReceiptViewer{url} │   │
//! │  └───┬──────────┬───┘  └──────────────────┘  └──────────────────────┘   │
//! │      │          │                                                       │
//! │      ▼          ▼                                                       │
//! │  KeyValueStore  PresentationMarker                                      │
//! │  (write-through) (dark mode flag)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every store exposes `snapshot()`, `subscribe()` and its mutators. Each
//! mutation runs under the channel's write lock (`send_if_modified`), so
//! read-compute-write is atomic even when called from several threads.

mod modal;
mod presentation;
mod settings;
mod sidebar;

use std::sync::Arc;

pub use modal::{ModalFlags, ModalStore, Overlay};
pub use presentation::{DarkModeMarker, PresentationMarker};
pub use settings::SettingsStore;
pub use sidebar::{Sidebar, SidebarStore};

use crate::storage::KeyValueStore;

/// The host application's single set of stores.
///
/// Construct once at startup and hand out references (or clone the `Arc`s)
/// to whatever needs them.
pub struct AppStores {
    pub settings: Arc<SettingsStore>,
    pub sidebar: Arc<SidebarStore>,
    pub modal: Arc<ModalStore>,
}

impl AppStores {
    /// Load preferences from `kv` and start with the sidebar and every
    /// overlay closed.
    pub fn new(kv: Arc<dyn KeyValueStore>, marker: Arc<dyn PresentationMarker>) -> Self {
        tracing::info!("Initializing application stores");
        Self {
            settings: Arc::new(SettingsStore::load(kv, marker)),
            sidebar: Arc::new(SidebarStore::new()),
            modal: Arc::new(ModalStore::new()),
        }
    }
}
