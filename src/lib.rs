//! Grid-based page composition engine for tenant landing pages.
//!
//! The crate covers the editing core of a drag-and-drop page builder: a
//! column-grid placement engine with collision displacement and compaction,
//! an observable widget store synchronized with a remote settings document,
//! a typed widget registry resolving renderer/editor component pairs, and
//! the orchestrator that wires user gestures to all three. Concrete widget
//! content, authentication, and the HTTP transport behind the settings
//! document stay outside; they enter only through the [`registry`] and
//! [`store::SettingsBackend`] boundaries.
//!
//! Each module exposes its surface through a `mod.rs` orchestrator while the
//! implementation lives in private submodules.

pub mod builder;
pub mod error;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod registry;
pub mod store;

pub use builder::{BuilderMode, EditorSession, PageBuilder};
pub use error::{BuilderError, Result};
pub use layout::{ContainerStyles, GridEngine, GridStyles, rects_collide};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, NullSink,
};
pub use metrics::{BuilderMetrics, MetricsSnapshot};
pub use model::{
    AnimationConfig, AnimationType, Breakpoint, BreakpointLayout, Easing, GridConfig,
    GridPosition, HoverEffect, ResponsiveLayout, Settings, WidgetConfig, WidgetId,
    WidgetLayoutConfig,
};
pub use registry::{
    EditorFactory, RegistryEntry, RegistryError, RenderedWidget, RendererFactory, WidgetEditor,
    WidgetRegistry, WidgetRenderer, render_widget,
};
pub use store::{MemoryBackend, SettingsBackend, StoreError, StoreResult, WIDGETS_KEY, WidgetStore};
