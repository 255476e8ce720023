//! Data model for placed widgets and their grid geometry.
//!
//! Everything here round-trips through the tenant settings document, so the
//! serialized field names stay camelCase to match what the hosting pages
//! already persist.

mod layout;
mod widget;

pub use layout::{
    AnimationConfig, AnimationType, Breakpoint, BreakpointLayout, Easing, GridConfig,
    GridPosition, HoverEffect, ResponsiveLayout, WidgetLayoutConfig,
};
pub use widget::{Settings, WidgetConfig, WidgetId};
