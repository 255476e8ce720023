use crate::layout::GridEngine;
use crate::model::WidgetConfig;

/// CSS-equivalent placement and presentation values for one widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridStyles {
    pub grid_column: String,
    pub grid_row: String,
    pub padding: String,
    pub margin: String,
    pub background_color: Option<String>,
    pub border_radius: Option<String>,
    pub box_shadow: Option<String>,
    pub z_index: i16,
}

/// Grid template values for the hosting container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStyles {
    pub display: String,
    pub grid_template_columns: String,
    pub grid_auto_rows: String,
    pub gap: String,
}

impl GridEngine {
    /// Derive the widget's CSS grid values. Pure; `None` when the widget has
    /// no layout yet. Full-width spans every column and auto-height widgets
    /// flow by content rather than an explicit row span.
    pub fn grid_styles(&self, widget: &WidgetConfig) -> Option<GridStyles> {
        let layout = widget.layout.as_ref()?;

        let grid_column = if layout.full_width {
            "1 / -1".to_string()
        } else {
            format!("{} / span {}", layout.column, layout.column_span)
        };
        let grid_row = if layout.auto_height {
            "auto".to_string()
        } else {
            format!("{} / span {}", layout.row, layout.row_span)
        };

        Some(GridStyles {
            grid_column,
            grid_row,
            padding: spacing_shorthand(
                layout.padding,
                layout.padding_top,
                layout.padding_right,
                layout.padding_bottom,
                layout.padding_left,
            ),
            margin: spacing_shorthand(
                layout.margin,
                layout.margin_top,
                layout.margin_right,
                layout.margin_bottom,
                layout.margin_left,
            ),
            background_color: layout.background_color.clone(),
            border_radius: layout.border_radius.map(|radius| format!("{radius}px")),
            box_shadow: layout.box_shadow.clone(),
            z_index: layout.z_index.unwrap_or(1),
        })
    }

    /// Grid template for the parent container.
    pub fn container_grid_styles(&self) -> ContainerStyles {
        ContainerStyles {
            display: "grid".to_string(),
            grid_template_columns: format!("repeat({}, 1fr)", self.grid.columns),
            grid_auto_rows: format!("{}px", self.grid.row_height),
            gap: format!("{}px", self.grid.gap),
        }
    }
}

// Per-side values override the all-sides value when present.
fn spacing_shorthand(
    all: Option<u16>,
    top: Option<u16>,
    right: Option<u16>,
    bottom: Option<u16>,
    left: Option<u16>,
) -> String {
    let base = all.unwrap_or(0);
    let top = top.unwrap_or(base);
    let right = right.unwrap_or(base);
    let bottom = bottom.unwrap_or(base);
    let left = left.unwrap_or(base);
    if top == right && top == bottom && top == left {
        format!("{top}px")
    } else {
        format!("{top}px {right}px {bottom}px {left}px")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GridConfig, WidgetLayoutConfig};

    fn widget_with(layout: WidgetLayoutConfig) -> WidgetConfig {
        let mut widget = WidgetConfig::new("hero");
        widget.layout = Some(layout);
        widget
    }

    #[test]
    fn placed_widget_gets_explicit_spans() {
        let engine = GridEngine::default();
        let widget = widget_with(WidgetLayoutConfig {
            column: 3,
            row: 2,
            column_span: 4,
            row_span: 2,
            auto_height: false,
            ..WidgetLayoutConfig::default()
        });
        let styles = engine.grid_styles(&widget).unwrap();
        assert_eq!(styles.grid_column, "3 / span 4");
        assert_eq!(styles.grid_row, "2 / span 2");
        assert_eq!(styles.z_index, 1);
    }

    #[test]
    fn full_width_spans_every_column() {
        let engine = GridEngine::default();
        let widget = widget_with(WidgetLayoutConfig {
            column: 5,
            column_span: 3,
            full_width: true,
            ..WidgetLayoutConfig::default()
        });
        let styles = engine.grid_styles(&widget).unwrap();
        assert_eq!(styles.grid_column, "1 / -1");
    }

    #[test]
    fn auto_height_rows_flow_by_content() {
        let engine = GridEngine::default();
        let widget = widget_with(WidgetLayoutConfig {
            auto_height: true,
            ..WidgetLayoutConfig::default()
        });
        assert_eq!(engine.grid_styles(&widget).unwrap().grid_row, "auto");
    }

    #[test]
    fn per_side_spacing_overrides_the_all_sides_value() {
        let engine = GridEngine::default();
        let widget = widget_with(WidgetLayoutConfig {
            padding: Some(16),
            padding_left: Some(4),
            ..WidgetLayoutConfig::default()
        });
        let styles = engine.grid_styles(&widget).unwrap();
        assert_eq!(styles.padding, "16px 16px 16px 4px");
        assert_eq!(styles.margin, "0px");
    }

    #[test]
    fn unplaced_widget_has_no_styles() {
        let engine = GridEngine::default();
        assert!(engine.grid_styles(&WidgetConfig::new("hero")).is_none());
    }

    #[test]
    fn container_template_follows_grid_config() {
        let engine = GridEngine::new(GridConfig {
            columns: 8,
            row_height: 120,
            gap: 12,
        });
        let styles = engine.container_grid_styles();
        assert_eq!(styles.display, "grid");
        assert_eq!(styles.grid_template_columns, "repeat(8, 1fr)");
        assert_eq!(styles.grid_auto_rows, "120px");
        assert_eq!(styles.gap, "12px");
    }
}
