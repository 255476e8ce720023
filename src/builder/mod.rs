//! Page builder orchestration: user gestures in, engine + store calls out.

use std::sync::{Arc, Mutex};

use crate::error::{BuilderError, Result};
use crate::layout::GridEngine;
use crate::logging::{LogEvent, LogLevel, Logger, kv};
use crate::metrics::BuilderMetrics;
use crate::model::{GridConfig, Settings, WidgetConfig, WidgetId, WidgetLayoutConfig};
use crate::registry::{RegistryError, RenderedWidget, WidgetEditor, WidgetRegistry, render_widget};
use crate::store::WidgetStore;

const LOG_TARGET: &str = "pageboard::builder";

/// Which modal surface is currently open. A single field keeps the picker,
/// the layout-settings panel, and the content editor mutually exclusive by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BuilderMode {
    #[default]
    Idle,
    WidgetPicker,
    LayoutSettings(WidgetId),
    ContentEditor(WidgetId),
}

/// A mounted editor component for the widget currently being edited.
pub struct EditorSession {
    widget_id: WidgetId,
    editor: Box<dyn WidgetEditor>,
}

impl EditorSession {
    pub fn widget_id(&self) -> &str {
        &self.widget_id
    }

    pub fn editor_mut(&mut self) -> &mut dyn WidgetEditor {
        &mut *self.editor
    }

    pub fn draft(&self) -> Settings {
        self.editor.draft()
    }
}

/// Top-level controller for one editing surface.
///
/// Translates discrete user gestures (add, select, move, resize, delete,
/// duplicate, reorder) into engine and store calls, and owns the ephemeral
/// state of which widget is selected and which editor is mounted. All
/// persistence funnels through the store and honors its auto-save flag.
pub struct PageBuilder {
    engine: GridEngine,
    registry: WidgetRegistry,
    store: WidgetStore,
    mode: BuilderMode,
    editor_session: Option<EditorSession>,
    layout_draft: Option<WidgetConfig>,
    preview_mode: bool,
    show_grid_lines: bool,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<BuilderMetrics>>>,
}

impl PageBuilder {
    pub fn new(engine: GridEngine, registry: WidgetRegistry, store: WidgetStore) -> Self {
        Self {
            engine,
            registry,
            store,
            mode: BuilderMode::Idle,
            editor_session: None,
            layout_draft: None,
            preview_mode: false,
            show_grid_lines: true,
            logger: None,
            metrics: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Mutex<BuilderMetrics>>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn mode(&self) -> &BuilderMode {
        &self.mode
    }

    pub fn engine(&self) -> &GridEngine {
        &self.engine
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn store(&self) -> &WidgetStore {
        &self.store
    }

    pub fn grid(&self) -> GridConfig {
        self.engine.grid()
    }

    pub fn update_grid(&mut self, grid: GridConfig) {
        self.engine.update_grid(grid);
    }

    /// Snapshot of the current widget list.
    pub fn widgets(&self) -> Vec<WidgetConfig> {
        self.store.widgets()
    }

    pub fn preview_mode(&self) -> bool {
        self.preview_mode
    }

    pub fn show_grid_lines(&self) -> bool {
        self.show_grid_lines
    }

    pub fn toggle_preview(&mut self) -> bool {
        self.preview_mode = !self.preview_mode;
        self.preview_mode
    }

    pub fn toggle_grid_lines(&mut self) -> bool {
        self.show_grid_lines = !self.show_grid_lines;
        self.show_grid_lines
    }

    /// Widget types offered by the picker, in registration order.
    pub fn available_widgets(&self) -> Vec<&str> {
        self.registry.names()
    }

    pub fn open_widget_picker(&mut self) -> bool {
        if self.mode != BuilderMode::Idle {
            return false;
        }
        self.mode = BuilderMode::WidgetPicker;
        true
    }

    pub fn close_widget_picker(&mut self) {
        if self.mode == BuilderMode::WidgetPicker {
            self.mode = BuilderMode::Idle;
        }
    }

    /// Create a widget of the given registered type, give it its default
    /// layout, append it, and persist. Closes the picker when one is open.
    pub async fn add_widget(&mut self, widget_type: &str) -> Result<WidgetId> {
        let entry = self
            .registry
            .get(widget_type)
            .ok_or_else(|| RegistryError::UnknownType(widget_type.to_string()))?;

        let mut widget = WidgetConfig::new(widget_type)
            .with_settings(entry.default_settings().clone());
        self.engine.initialize_widget_layout(&mut widget);
        let id = widget.id.clone();

        self.record(|metrics| metrics.record_placement());
        self.store.add_widget(widget).await?;
        self.close_widget_picker();
        self.log(
            LogEvent::new(LogLevel::Info, LOG_TARGET, "widget added")
                .with_fields([kv("type", widget_type), kv("id", id.clone())]),
        );
        Ok(id)
    }

    /// Open the layout-settings panel for a widget, backfilling any missing
    /// layout, responsive, or animation defaults first. This is the one
    /// place already-placed widgets pick up defaults.
    pub fn select_widget_for_layout(&mut self, id: &str) -> bool {
        if self.mode != BuilderMode::Idle {
            return false;
        }
        let Some(mut widget) = self.widgets().into_iter().find(|w| w.id == id) else {
            return false;
        };
        self.engine.backfill_layout_defaults(&mut widget);
        self.layout_draft = Some(widget);
        self.mode = BuilderMode::LayoutSettings(id.to_string());
        true
    }

    /// The backfilled copy the layout-settings surface binds to.
    pub fn layout_draft(&self) -> Option<&WidgetConfig> {
        self.layout_draft.as_ref()
    }

    /// Apply an edited layout to the selected widget: clamp it, move it, and
    /// displace whatever the move now overlaps, then persist the whole list.
    pub async fn apply_layout_settings(&mut self, layout: WidgetLayoutConfig) -> Result<()> {
        let BuilderMode::LayoutSettings(id) = self.mode.clone() else {
            self.log(LogEvent::new(
                LogLevel::Debug,
                LOG_TARGET,
                "layout apply ignored, no widget selected",
            ));
            return Ok(());
        };

        let mut widgets = self.store.widgets();
        let Some(idx) = widgets.iter().position(|w| w.id == id) else {
            self.mode = BuilderMode::Idle;
            self.layout_draft = None;
            return Err(BuilderError::WidgetNotFound(id));
        };

        {
            let widget = &mut widgets[idx];
            widget.layout = Some(layout.clone());
            self.engine
                .resize_widget(widget, layout.column_span, layout.row_span);
            if layout.full_width {
                self.engine.set_full_width(widget, true);
            }
            self.engine.move_widget(widget, layout.column, layout.row);
        }
        let displaced = self.engine.resolve_collisions(&mut widgets, &id);
        self.record(|metrics| {
            metrics.record_move();
            metrics.record_collisions(displaced);
        });

        self.store.replace_widgets(widgets).await?;
        self.mode = BuilderMode::Idle;
        self.layout_draft = None;
        Ok(())
    }

    pub fn dismiss_layout_settings(&mut self) {
        if matches!(self.mode, BuilderMode::LayoutSettings(_)) {
            self.mode = BuilderMode::Idle;
            self.layout_draft = None;
        }
    }

    /// Mount the registered editor for a widget's type. A type without an
    /// editor is a logged no-op, not a user-facing error.
    pub fn open_content_editor(&mut self, id: &str) -> bool {
        if self.mode != BuilderMode::Idle {
            return false;
        }
        let Some(widget) = self.widgets().into_iter().find(|w| w.id == id) else {
            return false;
        };
        let Some(entry) = self.registry.get(&widget.widget_type) else {
            self.log(
                LogEvent::new(LogLevel::Warn, LOG_TARGET, "widget type not registered")
                    .with_fields([kv("type", widget.widget_type.clone())]),
            );
            return false;
        };
        let Some(mut editor) = entry.new_editor() else {
            self.log(
                LogEvent::new(LogLevel::Warn, LOG_TARGET, "no editor registered for type")
                    .with_fields([kv("type", widget.widget_type.clone())]),
            );
            return false;
        };
        editor.load(&widget);
        self.editor_session = Some(EditorSession {
            widget_id: id.to_string(),
            editor,
        });
        self.mode = BuilderMode::ContentEditor(id.to_string());
        true
    }

    pub fn editor_session(&self) -> Option<&EditorSession> {
        self.editor_session.as_ref()
    }

    pub fn editor_session_mut(&mut self) -> Option<&mut EditorSession> {
        self.editor_session.as_mut()
    }

    /// The editor's `update` event: the payload fully replaces the widget's
    /// settings, the change persists, and the editor closes.
    pub async fn apply_editor_update(&mut self, settings: Settings) -> Result<()> {
        let Some(session) = self.editor_session.take() else {
            self.log(LogEvent::new(
                LogLevel::Debug,
                LOG_TARGET,
                "editor update ignored, no editor open",
            ));
            return Ok(());
        };
        self.mode = BuilderMode::Idle;

        let Some(mut widget) = self
            .widgets()
            .into_iter()
            .find(|w| w.id == session.widget_id)
        else {
            return Err(BuilderError::WidgetNotFound(session.widget_id));
        };
        widget.settings = settings;
        self.store.update_widget(widget).await?;
        Ok(())
    }

    /// Apply whatever the mounted editor currently drafts.
    pub async fn apply_editor_draft(&mut self) -> Result<()> {
        let Some(draft) = self.editor_session.as_ref().map(EditorSession::draft) else {
            return Ok(());
        };
        self.apply_editor_update(draft).await
    }

    /// The editor's `cancel` event: close without changes.
    pub fn cancel_editor(&mut self) {
        if matches!(self.mode, BuilderMode::ContentEditor(_)) {
            self.mode = BuilderMode::Idle;
        }
        self.editor_session = None;
    }

    /// Delete a widget. Whatever modal state referenced it is reset.
    pub async fn remove_widget(&mut self, id: &str) -> Result<()> {
        match &self.mode {
            BuilderMode::LayoutSettings(selected) if selected == id => {
                self.mode = BuilderMode::Idle;
                self.layout_draft = None;
            }
            BuilderMode::ContentEditor(selected) if selected == id => {
                self.mode = BuilderMode::Idle;
                self.editor_session = None;
            }
            _ => {}
        }
        self.store.remove_widget(id).await?;
        Ok(())
    }

    /// Deep-copy a widget into the next free slot sized to its span.
    pub async fn duplicate_widget(&mut self, id: &str) -> Result<WidgetId> {
        let widgets = self.widgets();
        let Some(widget) = widgets.iter().find(|w| w.id == id) else {
            return Err(BuilderError::WidgetNotFound(id.to_string()));
        };
        let clone = self.engine.clone_widget(widget, &widgets);
        let clone_id = clone.id.clone();
        self.record(|metrics| metrics.record_placement());
        self.store.add_widget(clone).await?;
        Ok(clone_id)
    }

    /// Swap a widget with its predecessor in list order. Geometry is
    /// untouched; list order is an independent stacking concern.
    pub async fn move_widget_up(&mut self, id: &str) -> Result<()> {
        let mut widgets = self.widgets();
        let Some(idx) = widgets.iter().position(|w| w.id == id) else {
            return Err(BuilderError::WidgetNotFound(id.to_string()));
        };
        if idx == 0 {
            return Ok(());
        }
        widgets.swap(idx - 1, idx);
        self.store.replace_widgets(widgets).await?;
        Ok(())
    }

    /// Swap a widget with its successor in list order.
    pub async fn move_widget_down(&mut self, id: &str) -> Result<()> {
        let mut widgets = self.widgets();
        let Some(idx) = widgets.iter().position(|w| w.id == id) else {
            return Err(BuilderError::WidgetNotFound(id.to_string()));
        };
        if idx + 1 >= widgets.len() {
            return Ok(());
        }
        widgets.swap(idx, idx + 1);
        self.store.replace_widgets(widgets).await?;
        Ok(())
    }

    /// Drag-reorder: move the widget at `from` so it sits at `to`. Out of
    /// range indexes are a no-op.
    pub async fn reorder_widget(&mut self, from: usize, to: usize) -> Result<()> {
        let mut widgets = self.widgets();
        if from >= widgets.len() || from == to {
            return Ok(());
        }
        let widget = widgets.remove(from);
        let to = to.min(widgets.len());
        widgets.insert(to, widget);
        self.store.replace_widgets(widgets).await?;
        Ok(())
    }

    /// Slide every widget as far up as it goes, then persist.
    pub async fn compact(&mut self) -> Result<()> {
        let mut widgets = self.widgets();
        self.engine.compact_grid(&mut widgets);
        self.record(|metrics| metrics.record_compaction());
        self.store.replace_widgets(widgets).await?;
        Ok(())
    }

    /// Render every placed widget whose type has a registered renderer.
    pub fn render_page(&self) -> Vec<RenderedWidget> {
        self.widgets()
            .iter()
            .filter_map(|widget| render_widget(&self.registry, &self.engine, widget))
            .collect()
    }

    fn record(&self, update: impl FnOnce(&mut BuilderMetrics)) {
        if let Some(metrics) = &self.metrics {
            if let Ok(mut guard) = metrics.lock() {
                update(&mut guard);
            }
        }
    }

    fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            logger.log(event);
        }
    }
}
