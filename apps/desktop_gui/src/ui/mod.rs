//! UI layer for the desktop narrator: a single form window.

pub mod app;

pub use app::{NarratorApp, PersistedNarratorSettings, SETTINGS_STORAGE_KEY};
