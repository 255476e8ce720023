use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::model::WidgetLayoutConfig;

/// Identity key for placed widgets. Generated once at creation, never reused.
pub type WidgetId = String;

/// Opaque settings payload owned by a widget's renderer/editor pair. The
/// engine and store never interpret it.
pub type Settings = Map<String, Value>;

/// One placed widget: identity, registry type, settings, and grid geometry.
///
/// `layout` is absent until the widget is first placed, after which it stays
/// populated for the widget's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<WidgetLayoutConfig>,
}

impl WidgetConfig {
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            widget_type: widget_type.into(),
            title: None,
            settings: Settings::new(),
            layout: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_widgets_get_unique_ids() {
        let a = WidgetConfig::new("hero");
        let b = WidgetConfig::new("hero");
        assert_ne!(a.id, b.id);
        assert!(a.layout.is_none());
    }

    #[test]
    fn serializes_type_field_as_camel_case_contract() {
        let widget = WidgetConfig::new("hero").with_title("Banner");
        let value = serde_json::to_value(&widget).unwrap();
        assert_eq!(value["type"], json!("hero"));
        assert_eq!(value["title"], json!("Banner"));
        assert!(value.get("layout").is_none());
    }

    #[test]
    fn settings_survive_round_trip_untouched() {
        let mut settings = Settings::new();
        settings.insert("headline".into(), json!("Welcome"));
        settings.insert("nested".into(), json!({ "cta": ["a", "b"] }));
        let widget = WidgetConfig::new("cta").with_settings(settings.clone());

        let body = serde_json::to_string(&widget).unwrap();
        let back: WidgetConfig = serde_json::from_str(&body).unwrap();
        assert_eq!(back.settings, settings);
        assert_eq!(back, widget);
    }
}
