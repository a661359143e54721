//! # Settings Store
//!
//! Single source of truth for durable user preferences.
//!
//! ## Write-Through
//! Every setter writes to the key-value store first and only then updates
//! the in-memory snapshot. A failed write leaves the snapshot untouched and
//! publishes nothing, so memory and disk never disagree.
//!
//! ```text
//!   set_theme(Dark)
//!        │
//!        ├──► kv.set("theme", "dark")      (abort on error)
//!        ├──► snapshot.theme = Dark ──────► subscribers
//!        └──► marker.set_dark_mode(true)
//! ```
//!
//! The first two steps run inside the watch channel's write lock. The marker
//! is called after that lock is released, so a styling layer may read the
//! store from inside the callback and sees the new theme. Theme changes are
//! serialized by a separate mutex so marker calls arrive in the same order as
//! the published themes.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use super::presentation::PresentationMarker;
use crate::config::{
    OcrTemplate, Settings, Theme, KEY_OCR_API_KEY, KEY_OCR_METHOD, KEY_OCR_TEMPLATE, KEY_THEME,
};
use crate::storage::{KeyValueStore, StorageError};

/// Reactive container for [`Settings`].
pub struct SettingsStore {
    kv: Arc<dyn KeyValueStore>,
    marker: Arc<dyn PresentationMarker>,
    state: watch::Sender<Settings>,
    theme_lock: Mutex<()>,
}

impl SettingsStore {
    /// Build the store from whatever is currently persisted.
    ///
    /// Missing or unusable values fall back to their defaults (see
    /// [`Settings::load`]). The presentation marker is synced to the loaded
    /// theme before the store is returned.
    pub fn load(kv: Arc<dyn KeyValueStore>, marker: Arc<dyn PresentationMarker>) -> Self {
        let settings = Settings::load(kv.as_ref());
        marker.set_dark_mode(settings.theme.is_dark());

        tracing::debug!(
            theme = %settings.theme,
            ocr_method = %settings.ocr_method,
            has_api_key = settings.ocr_api_key.is_some(),
            ocr_template = %settings.ocr_template,
            "Settings loaded"
        );

        let (state, _rx) = watch::channel(settings);
        Self {
            kv,
            marker,
            state,
            theme_lock: Mutex::new(()),
        }
    }

    /// Current preferences.
    pub fn snapshot(&self) -> Settings {
        self.state.borrow().clone()
    }

    /// Receiver that is marked changed whenever a preference changes.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.state.subscribe()
    }

    pub fn theme(&self) -> Theme {
        self.state.borrow().theme
    }

    // =========================================================================
    // Theme
    // =========================================================================

    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        let _guard = self.lock_theme();
        self.update(|settings| self.write_theme(settings, theme))?;
        self.marker.set_dark_mode(theme.is_dark());
        Ok(())
    }

    /// Flip between light and dark, returning the theme now in effect.
    pub fn toggle_theme(&self) -> Result<Theme, StorageError> {
        let _guard = self.lock_theme();
        let mut next = Theme::default();
        self.update(|settings| {
            next = settings.theme.toggled();
            self.write_theme(settings, next)
        })?;
        self.marker.set_dark_mode(next.is_dark());
        Ok(next)
    }

    fn write_theme(&self, settings: &mut Settings, theme: Theme) -> Result<bool, StorageError> {
        self.kv.set(KEY_THEME, theme.as_str())?;

        let changed = settings.theme != theme;
        settings.theme = theme;
        tracing::debug!(%theme, "Theme set");
        Ok(changed)
    }

    fn lock_theme(&self) -> MutexGuard<'_, ()> {
        self.theme_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    // =========================================================================
    // OCR
    // =========================================================================

    /// Choose the OCR backend. The identifier isn't validated.
    pub fn set_ocr_method(&self, method: impl Into<String>) -> Result<(), StorageError> {
        let method = method.into();
        self.update(|settings| {
            self.kv.set(KEY_OCR_METHOD, &method)?;
            tracing::debug!(ocr_method = %method, "OCR method set");

            let changed = settings.ocr_method != method;
            settings.ocr_method = method;
            Ok(changed)
        })
    }

    /// Store or clear the OCR credential.
    ///
    /// `None` (or an empty key) deletes the stored entry instead of writing
    /// an empty string. The snapshot always holds exactly what was passed.
    pub fn set_ocr_api_key(&self, api_key: Option<String>) -> Result<(), StorageError> {
        self.update(|settings| {
            match api_key.as_deref() {
                Some(key) if !key.is_empty() => self.kv.set(KEY_OCR_API_KEY, key)?,
                _ => self.kv.delete(KEY_OCR_API_KEY)?,
            }
            tracing::debug!(has_api_key = api_key.is_some(), "OCR API key updated");

            let changed = settings.ocr_api_key != api_key;
            settings.ocr_api_key = api_key;
            Ok(changed)
        })
    }

    pub fn set_ocr_template(&self, template: OcrTemplate) -> Result<(), StorageError> {
        self.update(|settings| {
            self.kv.set(KEY_OCR_TEMPLATE, template.as_str())?;
            tracing::debug!(ocr_template = %template, "OCR template set");

            let changed = settings.ocr_template != template;
            settings.ocr_template = template;
            Ok(changed)
        })
    }

    /// Apply `f` to the snapshot under the channel lock.
    ///
    /// `f` returns whether the snapshot changed. It must finish its storage
    /// writes before touching the snapshot.
    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Settings) -> Result<bool, StorageError>,
    {
        let mut outcome = Ok(());
        self.state.send_if_modified(|settings| match f(settings) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist setting");
                outcome = Err(e);
                false
            }
        });
        outcome
    }
}

// =============================================================================
// Tests
// =============================================================================
