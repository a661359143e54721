//! User preference values for Tripfolio.
//!
//! Each preference is persisted under its own key in the durable key-value
//! store, as the literal string form of its value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::KeyValueStore;

// =============================================================================
// Storage Keys
// =============================================================================

pub const KEY_THEME: &str = "theme";
pub const KEY_OCR_METHOD: &str = "ocrMethod";
pub const KEY_OCR_API_KEY: &str = "ocrApiKey";
pub const KEY_OCR_TEMPLATE: &str = "ocrTemplate";

/// OCR backend used when none has been chosen.
pub const DEFAULT_OCR_METHOD: &str = "gemini";

/// Returned when a stored string isn't a member of a preference enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// =============================================================================
// Theme Selection
// =============================================================================

/// Display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Get all available themes.
    pub fn all() -> &'static [Theme] {
        &[Self::Light, Self::Dark]
    }

    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark)
    }

    /// The opposite theme.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "theme",
                value: s.to_string(),
            })
    }
}

// =============================================================================
// OCR Templates
// =============================================================================

/// Extraction template handed to the OCR backend.
///
/// New templates are added as variants; the stored form is the lowercase
/// variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OcrTemplate {
    #[default]
    Travel,
}

impl OcrTemplate {
    pub fn all() -> &'static [OcrTemplate] {
        &[Self::Travel]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Travel => "travel",
        }
    }
}

impl fmt::Display for OcrTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OcrTemplate {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|template| template.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "OCR template",
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Settings Snapshot
// =============================================================================

/// The full set of user preferences at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,

    /// Identifier of the OCR backend. Free-form; not validated.
    pub ocr_method: String,

    /// OCR credential. `None` means "use the host's own credential source",
    /// which is not the same as an empty key.
    pub ocr_api_key: Option<String>,

    pub ocr_template: OcrTemplate,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            ocr_method: DEFAULT_OCR_METHOD.to_string(),
            ocr_api_key: None,
            ocr_template: OcrTemplate::default(),
        }
    }
}

impl Settings {
    /// Load settings from the key-value store, using defaults for missing values.
    ///
    /// Never fails: a key that can't be read, is empty, or holds a value
    /// outside its enum falls back to the default for that field.
    pub fn load(kv: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();

        let theme = read_parsed(kv, KEY_THEME).unwrap_or(defaults.theme);
        let ocr_template = read_parsed(kv, KEY_OCR_TEMPLATE).unwrap_or(defaults.ocr_template);
        let ocr_method = read_key(kv, KEY_OCR_METHOD)
            .filter(|method| !method.is_empty())
            .unwrap_or(defaults.ocr_method);
        // Present-but-empty is kept as-is; only absence means "no key".
        let ocr_api_key = read_key(kv, KEY_OCR_API_KEY);

        Self {
            theme,
            ocr_method,
            ocr_api_key,
            ocr_template,
        }
    }
}

fn read_key(kv: &dyn KeyValueStore, key: &str) -> Option<String> {
    match kv.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read setting, using default");
            None
        }
    }
}

fn read_parsed<T>(kv: &dyn KeyValueStore, key: &str) -> Option<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw = read_key(kv, key).filter(|value| !value.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring stored value outside allowed set");
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
