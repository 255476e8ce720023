//! Observable widget collection backed by the remote settings document.

mod core;

pub use core::{
    MemoryBackend, SettingsBackend, StoreError, StoreResult, WIDGETS_KEY, WidgetStore,
};
