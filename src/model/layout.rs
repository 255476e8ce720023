use serde::{Deserialize, Serialize};

/// Grid configuration for one editing surface.
///
/// Held by the engine that owns the surface rather than as process-global
/// state; callers update it through [`crate::GridEngine::update_grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub columns: u16,
    /// Row height in pixels.
    pub row_height: u16,
    /// Gap between cells in pixels.
    pub gap: u16,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 12,
            row_height: 100,
            gap: 0,
        }
    }
}

/// 1-based cell coordinate produced by the placement scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    pub column: u16,
    pub row: u16,
}

/// Responsive breakpoints recognised by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
}

/// Per-breakpoint layout override. Once a breakpoint entry exists it carries
/// all three fields; absent fields are backfilled when the widget is selected
/// for layout editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointLayout {
    pub column_span: u16,
    pub order: i16,
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiveLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<BreakpointLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet: Option<BreakpointLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<BreakpointLayout>,
}

impl ResponsiveLayout {
    pub fn get(&self, breakpoint: Breakpoint) -> Option<BreakpointLayout> {
        match breakpoint {
            Breakpoint::Mobile => self.mobile,
            Breakpoint::Tablet => self.tablet,
            Breakpoint::Desktop => self.desktop,
        }
    }

    pub fn set(&mut self, breakpoint: Breakpoint, layout: BreakpointLayout) {
        match breakpoint {
            Breakpoint::Mobile => self.mobile = Some(layout),
            Breakpoint::Tablet => self.tablet = Some(layout),
            Breakpoint::Desktop => self.desktop = Some(layout),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationType {
    None,
    FadeIn,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    ZoomIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HoverEffect {
    None,
    Lift,
    Glow,
    Scale,
}

impl Default for HoverEffect {
    fn default() -> Self {
        Self::Lift
    }
}

/// Entrance animation attributes. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    #[serde(rename = "animationType")]
    pub kind: AnimationType,
    pub duration_ms: u32,
    pub delay_ms: u32,
    pub easing: Easing,
    pub enabled: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            kind: AnimationType::FadeIn,
            duration_ms: 600,
            delay_ms: 0,
            easing: Easing::Ease,
            enabled: true,
        }
    }
}

/// Grid geometry plus presentation attributes for one placed widget.
///
/// Geometry invariant after any placement or resize operation:
/// `column >= 1`, `row >= 1`, and `column + column_span - 1 <= grid columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetLayoutConfig {
    pub column: u16,
    pub row: u16,
    pub column_span: u16,
    pub row_span: u16,
    /// When set, `column` is pinned to 1 and `column_span` to the full grid
    /// width regardless of the stored values.
    #[serde(default)]
    pub full_width: bool,
    /// Exempts the widget from row-based collision detection; its `row` and
    /// `row_span` are not authoritative while set.
    #[serde(default)]
    pub auto_height: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<ResponsiveLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover_effect: Option<HoverEffect>,
}

impl Default for WidgetLayoutConfig {
    fn default() -> Self {
        Self {
            column: 1,
            row: 1,
            column_span: 6,
            row_span: 1,
            full_width: false,
            auto_height: true,
            responsive: None,
            padding: Some(16),
            padding_top: None,
            padding_right: None,
            padding_bottom: None,
            padding_left: None,
            margin: Some(0),
            margin_top: None,
            margin_right: None,
            margin_bottom: None,
            margin_left: None,
            background_color: None,
            border_radius: None,
            box_shadow: None,
            z_index: Some(1),
            animation: None,
            hover_effect: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn layout_round_trips_camel_case() {
        let layout = WidgetLayoutConfig {
            column: 3,
            row: 2,
            column_span: 4,
            row_span: 2,
            padding_left: Some(8),
            background_color: Some("#fafafa".into()),
            ..WidgetLayoutConfig::default()
        };

        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value["columnSpan"], json!(4));
        assert_eq!(value["paddingLeft"], json!(8));
        assert_eq!(value["backgroundColor"], json!("#fafafa"));
        assert!(value.get("borderRadius").is_none());

        let back: WidgetLayoutConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, layout);
    }

    #[test]
    fn animation_defaults_match_first_selection_contract() {
        let animation = AnimationConfig::default();
        assert_eq!(animation.kind, AnimationType::FadeIn);
        assert_eq!(animation.duration_ms, 600);
        assert_eq!(animation.delay_ms, 0);
        assert_eq!(animation.easing, Easing::Ease);
        assert!(animation.enabled);
        assert_eq!(HoverEffect::default(), HoverEffect::Lift);
    }

    #[test]
    fn animation_kind_serializes_kebab_case() {
        let value = serde_json::to_value(AnimationConfig::default()).unwrap();
        assert_eq!(value["animationType"], json!("fade-in"));
        assert_eq!(value["easing"], json!("ease"));
    }

    #[test]
    fn responsive_entries_are_independent_per_breakpoint() {
        let mut responsive = ResponsiveLayout::default();
        responsive.set(
            Breakpoint::Tablet,
            BreakpointLayout {
                column_span: 6,
                order: 1,
                hidden: false,
            },
        );
        assert!(responsive.get(Breakpoint::Mobile).is_none());
        assert_eq!(responsive.get(Breakpoint::Tablet).unwrap().column_span, 6);
    }
}
