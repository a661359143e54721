//! Configuration module for Tripfolio.
//!
//! Preference value types and the keys they are stored under.

mod settings;

pub use settings::{
    OcrTemplate, Settings, Theme, UnknownVariant, DEFAULT_OCR_METHOD, KEY_OCR_API_KEY,
    KEY_OCR_METHOD, KEY_OCR_TEMPLATE, KEY_THEME,
};
