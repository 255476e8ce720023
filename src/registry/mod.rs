//! Widget type registry and the renderer/editor component contracts.

mod core;

pub use core::{
    EditorFactory, RegistryEntry, RegistryError, RenderedWidget, RendererFactory, WidgetEditor,
    WidgetRegistry, WidgetRenderer, render_widget,
};
