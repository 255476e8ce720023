use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::watch;

use crate::logging::{LogEvent, LogLevel, Logger, kv};
use crate::metrics::BuilderMetrics;
use crate::model::WidgetConfig;

/// Key inside the tenant settings document that owns the widget list. The
/// store only ever reads and writes this key; every other key round-trips
/// unchanged.
pub const WIDGETS_KEY: &str = "widgets";

const LOG_TARGET: &str = "pageboard::store";

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Remote settings-document collaborator. One JSON object per tenant; the
/// widget list is one key among unrelated settings.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Fetch the raw settings document, `None` when no document exists yet.
    async fn fetch(&self) -> StoreResult<Option<String>>;
    /// Persist the full settings document.
    async fn store(&self, body: String) -> StoreResult<()>;
}

/// In-memory backend for tests, demos, and offline editing.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(body: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(body.into())),
        }
    }

    pub fn document(&self) -> Option<String> {
        self.document.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SettingsBackend for MemoryBackend {
    async fn fetch(&self) -> StoreResult<Option<String>> {
        Ok(self.document.lock().map(|guard| guard.clone()).unwrap_or_default())
    }

    async fn store(&self, body: String) -> StoreResult<()> {
        if let Ok(mut guard) = self.document.lock() {
            *guard = Some(body);
        }
        Ok(())
    }
}

/// Single source of truth for the ordered widget list on one page.
///
/// Every state transition publishes a fresh `Vec` through a watch channel;
/// consumers never observe in-place mutation. Saves are optimistic: the
/// local list updates immediately and a failed write is surfaced to the
/// caller without rolling the local state back. [`WidgetStore::has_unsaved_changes`]
/// tracks the resulting drift via a content hash of the last persisted list.
///
/// Concurrent saves are not serialized; the last write to land wins. The
/// read-merge-write against the remote document only protects unrelated
/// settings keys, not overlapping widget edits.
pub struct WidgetStore {
    backend: Arc<dyn SettingsBackend>,
    widgets_tx: watch::Sender<Vec<WidgetConfig>>,
    auto_save: AtomicBool,
    persisted_hash: Mutex<Option<blake3::Hash>>,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<BuilderMetrics>>>,
}

impl WidgetStore {
    pub fn new(backend: Arc<dyn SettingsBackend>) -> Self {
        let (widgets_tx, _) = watch::channel(Vec::new());
        Self {
            backend,
            widgets_tx,
            auto_save: AtomicBool::new(true),
            persisted_hash: Mutex::new(None),
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

    /// Synchronous snapshot of the current list.
    pub fn widgets(&self) -> Vec<WidgetConfig> {
        self.widgets_tx.borrow().clone()
    }

    /// Observable stream of list states. Each published value is a fresh
    /// array, never a mutation of an earlier one.
    pub fn subscribe(&self) -> watch::Receiver<Vec<WidgetConfig>> {
        self.widgets_tx.subscribe()
    }

    /// When set, the mutation helpers persist after republishing; when
    /// cleared they only republish and an external owner drives persistence.
    pub fn set_auto_save(&self, enabled: bool) {
        self.auto_save.store(enabled, Ordering::SeqCst);
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save.load(Ordering::SeqCst)
    }

    /// Whether the local list has drifted from the last successfully
    /// persisted one (including after a failed save).
    pub fn has_unsaved_changes(&self) -> bool {
        let current = hash_widgets(&self.widgets());
        let persisted = self.persisted_hash.lock().map(|guard| *guard).unwrap_or(None);
        persisted != Some(current)
    }

    /// Load the widget list from the settings document. An absent document,
    /// a fetch failure, or a malformed body all degrade to an empty list;
    /// none of them surface as an error.
    pub async fn load(&self) {
        let widgets = match self.fetch_remote_widgets().await {
            Ok(widgets) => widgets,
            Err(err) => {
                self.log(
                    LogEvent::new(
                        LogLevel::Warn,
                        LOG_TARGET,
                        "settings document unavailable, starting empty",
                    )
                    .with_fields([kv("error", err.to_string())]),
                );
                Vec::new()
            }
        };
        if let Some(metrics) = &self.metrics {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_load();
            }
        }
        self.set_persisted_hash(Some(hash_widgets(&widgets)));
        self.publish(widgets);
    }

    /// Persist a widget list: republish it locally first (optimistic), then
    /// merge it into the latest remote document and write that back. A
    /// write failure is returned to the caller; the optimistic local state
    /// stays in place.
    pub async fn save(&self, widgets: &[WidgetConfig]) -> StoreResult<()> {
        let snapshot = widgets.to_vec();
        self.publish(snapshot.clone());

        let result = self.write_remote(&snapshot).await;
        match &result {
            Ok(()) => {
                self.set_persisted_hash(Some(hash_widgets(&snapshot)));
                if let Some(metrics) = &self.metrics {
                    if let Ok(mut guard) = metrics.lock() {
                        guard.record_save();
                    }
                }
                self.log(
                    LogEvent::new(LogLevel::Debug, LOG_TARGET, "widgets saved")
                        .with_fields([kv("count", snapshot.len())]),
                );
            }
            Err(err) => {
                if let Some(metrics) = &self.metrics {
                    if let Ok(mut guard) = metrics.lock() {
                        guard.record_save_failure();
                    }
                }
                self.log(
                    LogEvent::new(LogLevel::Error, LOG_TARGET, "widget save failed")
                        .with_fields([kv("error", err.to_string())]),
                );
            }
        }
        result
    }

    /// Append a widget, honoring the auto-save flag.
    pub async fn add_widget(&self, widget: WidgetConfig) -> StoreResult<()> {
        let mut widgets = self.widgets();
        widgets.push(widget);
        self.commit(widgets).await
    }

    /// Replace a widget by id, honoring the auto-save flag. Unknown ids are
    /// ignored.
    pub async fn update_widget(&self, widget: WidgetConfig) -> StoreResult<()> {
        let mut widgets = self.widgets();
        if let Some(slot) = widgets.iter_mut().find(|w| w.id == widget.id) {
            *slot = widget;
        }
        self.commit(widgets).await
    }

    /// Remove a widget by id, honoring the auto-save flag.
    pub async fn remove_widget(&self, id: &str) -> StoreResult<()> {
        let mut widgets = self.widgets();
        widgets.retain(|w| w.id != id);
        self.commit(widgets).await
    }

    /// Replace the whole list, honoring the auto-save flag. Used by callers
    /// whose edits can touch several widgets at once (collision displacement,
    /// compaction, reorder).
    pub async fn replace_widgets(&self, widgets: Vec<WidgetConfig>) -> StoreResult<()> {
        self.commit(widgets).await
    }

    /// Republish an externally supplied list without touching the backend.
    /// Used when a different persistence owner drives the layout.
    pub fn load_widgets_from_source(&self, widgets: Vec<WidgetConfig>) {
        self.publish(widgets);
    }

    async fn commit(&self, widgets: Vec<WidgetConfig>) -> StoreResult<()> {
        if self.auto_save() {
            self.save(&widgets).await
        } else {
            self.publish(widgets);
            Ok(())
        }
    }

    async fn fetch_remote_widgets(&self) -> StoreResult<Vec<WidgetConfig>> {
        let Some(body) = self.backend.fetch().await? else {
            return Ok(Vec::new());
        };
        let document: Value = serde_json::from_str(&body)?;
        let widgets = match document.get(WIDGETS_KEY) {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        Ok(widgets)
    }

    async fn write_remote(&self, widgets: &[WidgetConfig]) -> StoreResult<()> {
        // Re-fetch before writing so unrelated settings keys saved since our
        // last read survive the merge.
        let mut document = match self.backend.fetch().await? {
            Some(body) => serde_json::from_str::<Value>(&body)
                .unwrap_or_else(|_| Value::Object(Map::new())),
            None => Value::Object(Map::new()),
        };
        if !document.is_object() {
            document = Value::Object(Map::new());
        }
        if let Some(object) = document.as_object_mut() {
            object.insert(WIDGETS_KEY.to_string(), serde_json::to_value(widgets)?);
        }
        self.backend.store(serde_json::to_string(&document)?).await
    }

    fn publish(&self, widgets: Vec<WidgetConfig>) {
        self.widgets_tx.send_replace(widgets);
    }

    fn set_persisted_hash(&self, hash: Option<blake3::Hash>) {
        if let Ok(mut guard) = self.persisted_hash.lock() {
            *guard = hash;
        }
    }

    fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            logger.log(event);
        }
    }
}

fn hash_widgets(widgets: &[WidgetConfig]) -> blake3::Hash {
    let body = serde_json::to_vec(widgets).unwrap_or_default();
    blake3::hash(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use serde_json::json;

    struct FailingBackend;

    #[async_trait]
    impl SettingsBackend for FailingBackend {
        async fn fetch(&self) -> StoreResult<Option<String>> {
            Ok(None)
        }

        async fn store(&self, _body: String) -> StoreResult<()> {
            Err(StoreError::Backend("write refused".into()))
        }
    }

    fn sample_widgets() -> Vec<WidgetConfig> {
        let mut a = WidgetConfig::new("hero").with_title("Banner");
        a.settings.insert("headline".into(), json!("Hi"));
        let b = WidgetConfig::new("cta");
        vec![a, b]
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let backend = Arc::new(MemoryBackend::new());
        let store = WidgetStore::new(backend.clone());
        let widgets = sample_widgets();

        store.save(&widgets).await.unwrap();

        let reloaded = WidgetStore::new(backend);
        reloaded.load().await;
        assert_eq!(reloaded.widgets(), widgets);
    }

    #[tokio::test]
    async fn absent_document_loads_empty() {
        let store = WidgetStore::new(Arc::new(MemoryBackend::new()));
        store.load().await;
        assert!(store.widgets().is_empty());
        assert!(!store.has_unsaved_changes());
    }

    #[tokio::test]
    async fn malformed_document_loads_empty_and_logs() {
        let sink = MemorySink::new();
        let store = WidgetStore::new(Arc::new(MemoryBackend::with_document("{not json")))
            .with_logger(Logger::new(sink.clone()));
        store.load().await;
        assert!(store.widgets().is_empty());
        assert!(sink.contains_message("settings document unavailable"));
    }

    #[tokio::test]
    async fn save_preserves_unrelated_settings_keys() {
        let backend = Arc::new(MemoryBackend::with_document(
            json!({ "theme": { "primary": "#123456" }, "widgets": [] }).to_string(),
        ));
        let store = WidgetStore::new(backend.clone());
        store.load().await;

        store.save(&sample_widgets()).await.unwrap();

        let document: Value = serde_json::from_str(&backend.document().unwrap()).unwrap();
        assert_eq!(document["theme"]["primary"], json!("#123456"));
        assert_eq!(document[WIDGETS_KEY].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_save_keeps_optimistic_state_and_marks_dirty() {
        let store = WidgetStore::new(Arc::new(FailingBackend));
        store.load().await;
        let widgets = sample_widgets();

        let result = store.save(&widgets).await;
        assert!(result.is_err());
        assert_eq!(store.widgets(), widgets, "local state is not rolled back");
        assert!(store.has_unsaved_changes());
    }

    #[tokio::test]
    async fn dirty_flag_clears_after_successful_save() {
        let store = WidgetStore::new(Arc::new(MemoryBackend::new()));
        store.load().await;
        store.save(&sample_widgets()).await.unwrap();
        assert!(!store.has_unsaved_changes());
    }

    #[tokio::test]
    async fn auto_save_off_republishes_without_persisting() {
        let backend = Arc::new(MemoryBackend::new());
        let store = WidgetStore::new(backend.clone());
        store.load().await;
        store.set_auto_save(false);

        store.add_widget(WidgetConfig::new("hero")).await.unwrap();

        assert_eq!(store.widgets().len(), 1);
        let document = backend.document();
        assert!(
            document.is_none(),
            "no write should reach the backend while auto-save is off"
        );
        assert!(store.has_unsaved_changes());
    }

    #[tokio::test]
    async fn mutation_helpers_persist_when_auto_save_is_on() {
        let backend = Arc::new(MemoryBackend::new());
        let store = WidgetStore::new(backend.clone());
        store.load().await;

        let widget = WidgetConfig::new("hero");
        let id = widget.id.clone();
        store.add_widget(widget).await.unwrap();

        let mut updated = store.widgets().remove(0);
        updated.title = Some("Renamed".into());
        store.update_widget(updated).await.unwrap();

        let document: Value = serde_json::from_str(&backend.document().unwrap()).unwrap();
        assert_eq!(document[WIDGETS_KEY][0]["title"], json!("Renamed"));

        store.remove_widget(&id).await.unwrap();
        assert!(store.widgets().is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_fresh_lists() {
        let store = WidgetStore::new(Arc::new(MemoryBackend::new()));
        let mut rx = store.subscribe();
        assert!(rx.borrow().is_empty());

        store.load_widgets_from_source(sample_widgets());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 2);
    }

    #[tokio::test]
    async fn load_widgets_from_source_skips_the_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let store = WidgetStore::new(backend.clone());
        store.load_widgets_from_source(sample_widgets());
        assert_eq!(store.widgets().len(), 2);
        assert!(backend.document().is_none());
    }
}
