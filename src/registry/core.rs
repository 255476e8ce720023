use std::collections::HashMap;

use thiserror::Error;

use crate::layout::{GridEngine, GridStyles};
use crate::model::{Settings, WidgetConfig};

/// Renders a placed widget's content into a markup fragment. Concrete widget
/// content stays outside the engine; this trait is the boundary.
pub trait WidgetRenderer: Send + Sync {
    fn render(&self, widget: &WidgetConfig) -> String;
}

impl<F> WidgetRenderer for F
where
    F: Fn(&WidgetConfig) -> String + Send + Sync,
{
    fn render(&self, widget: &WidgetConfig) -> String {
        self(widget)
    }
}

/// Editing surface for a widget's settings. The host seeds it through
/// [`WidgetEditor::load`], drives it however it likes, and hands the final
/// draft back to the page builder, which applies it as a full replacement.
pub trait WidgetEditor: Send {
    fn load(&mut self, widget: &WidgetConfig);
    fn draft(&self) -> Settings;
}

pub type RendererFactory = Box<dyn Fn() -> Box<dyn WidgetRenderer> + Send + Sync>;
pub type EditorFactory = Box<dyn Fn() -> Box<dyn WidgetEditor> + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("widget type name is empty")]
    EmptyName,
    #[error("widget type `{0}` already registered")]
    Duplicate(String),
    #[error("unknown widget type `{0}`")]
    UnknownType(String),
}

/// One registered widget type: its name, the settings template cloned into
/// every new instance, and the component factories.
pub struct RegistryEntry {
    name: String,
    default_settings: Settings,
    renderer: Option<RendererFactory>,
    editor: Option<EditorFactory>,
}

impl RegistryEntry {
    pub fn new(name: impl Into<String>, default_settings: Settings) -> Self {
        Self {
            name: name.into(),
            default_settings,
            renderer: None,
            editor: None,
        }
    }

    pub fn with_renderer<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn WidgetRenderer> + Send + Sync + 'static,
    {
        self.renderer = Some(Box::new(factory));
        self
    }

    pub fn with_editor<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn WidgetEditor> + Send + Sync + 'static,
    {
        self.editor = Some(Box::new(factory));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_settings(&self) -> &Settings {
        &self.default_settings
    }

    pub fn new_renderer(&self) -> Option<Box<dyn WidgetRenderer>> {
        self.renderer.as_ref().map(|factory| factory())
    }

    pub fn new_editor(&self) -> Option<Box<dyn WidgetEditor>> {
        self.editor.as_ref().map(|factory| factory())
    }

    pub fn has_editor(&self) -> bool {
        self.editor.is_some()
    }
}

/// Open table of widget types, validated at registration rather than
/// resolved ad hoc per render. Listing order follows registration order so
/// the widget picker stays stable.
#[derive(Default)]
pub struct WidgetRegistry {
    entries: HashMap<String, RegistryEntry>,
    order: Vec<String>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: RegistryEntry) -> Result<(), RegistryError> {
        if entry.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.entries.contains_key(&entry.name) {
            return Err(RegistryError::Duplicate(entry.name.clone()));
        }
        self.order.push(entry.name.clone());
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A widget ready for the host page: grid styles plus the rendered fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWidget {
    pub id: String,
    pub widget_type: String,
    pub styles: GridStyles,
    pub markup: String,
}

/// Wrapper plumbing: combine the engine's grid styles with the registered
/// renderer's output. `None` when the widget is unplaced, its type is not
/// registered, or the type has no renderer.
pub fn render_widget(
    registry: &WidgetRegistry,
    engine: &GridEngine,
    widget: &WidgetConfig,
) -> Option<RenderedWidget> {
    let styles = engine.grid_styles(widget)?;
    let renderer = registry.get(&widget.widget_type)?.new_renderer()?;
    Some(RenderedWidget {
        id: widget.id.clone(),
        widget_type: widget.widget_type.clone(),
        styles,
        markup: renderer.render(widget),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hero_entry() -> RegistryEntry {
        let mut settings = Settings::new();
        settings.insert("headline".into(), json!("Welcome"));
        RegistryEntry::new("hero", settings).with_renderer(|| {
            Box::new(|widget: &WidgetConfig| {
                format!(
                    "<section class=\"hero\">{}</section>",
                    widget.settings["headline"].as_str().unwrap_or_default()
                )
            })
        })
    }

    #[test]
    fn registration_preserves_listing_order() {
        let mut registry = WidgetRegistry::new();
        registry.register(hero_entry()).unwrap();
        registry
            .register(RegistryEntry::new("cta", Settings::new()))
            .unwrap();
        assert_eq!(registry.names(), vec!["hero", "cta"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_and_empty_names_are_rejected() {
        let mut registry = WidgetRegistry::new();
        registry.register(hero_entry()).unwrap();
        assert_eq!(
            registry.register(hero_entry()).unwrap_err(),
            RegistryError::Duplicate("hero".into())
        );
        assert_eq!(
            registry
                .register(RegistryEntry::new("", Settings::new()))
                .unwrap_err(),
            RegistryError::EmptyName
        );
    }

    #[test]
    fn render_widget_combines_styles_and_markup() {
        let mut registry = WidgetRegistry::new();
        registry.register(hero_entry()).unwrap();
        let engine = GridEngine::default();

        let entry = registry.get("hero").unwrap();
        let mut widget =
            WidgetConfig::new("hero").with_settings(entry.default_settings().clone());
        engine.initialize_widget_layout(&mut widget);

        let rendered = render_widget(&registry, &engine, &widget).unwrap();
        assert_eq!(rendered.widget_type, "hero");
        assert_eq!(rendered.styles.grid_column, "1 / span 6");
        assert!(rendered.markup.contains("Welcome"));
    }

    #[test]
    fn unregistered_or_unplaced_widgets_do_not_render() {
        let mut registry = WidgetRegistry::new();
        registry.register(hero_entry()).unwrap();
        let engine = GridEngine::default();

        let unplaced = WidgetConfig::new("hero");
        assert!(render_widget(&registry, &engine, &unplaced).is_none());

        let mut unknown = WidgetConfig::new("gallery");
        engine.initialize_widget_layout(&mut unknown);
        assert!(render_widget(&registry, &engine, &unknown).is_none());
    }

    #[test]
    fn entries_without_editor_report_it() {
        let entry = hero_entry();
        assert!(!entry.has_editor());
        assert!(entry.new_editor().is_none());
        assert!(entry.new_renderer().is_some());
    }
}
