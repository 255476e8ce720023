//! End-to-end tour of the page builder: register widget types, compose a
//! page, push widgets around, and inspect what would be rendered.
//!
//! Run with `cargo run --example builder_walkthrough`.

use std::sync::Arc;

use serde_json::json;

use pageboard::{
    GridEngine, Logger, MemoryBackend, MemorySink, PageBuilder, RegistryEntry, Settings,
    WidgetConfig, WidgetRegistry, WidgetStore,
};

fn landing_page_registry() -> WidgetRegistry {
    let mut registry = WidgetRegistry::new();

    let mut hero_defaults = Settings::new();
    hero_defaults.insert("headline".into(), json!("Plan ahead with confidence"));
    hero_defaults.insert("subtitle".into(), json!("Cover for the whole family"));
    registry
        .register(
            RegistryEntry::new("hero", hero_defaults).with_renderer(|| {
                Box::new(|widget: &WidgetConfig| {
                    format!(
                        "<section class=\"hero\"><h1>{}</h1></section>",
                        widget.settings["headline"].as_str().unwrap_or_default()
                    )
                })
            }),
        )
        .expect("register hero");

    let mut cta_defaults = Settings::new();
    cta_defaults.insert("label".into(), json!("Get a quote"));
    registry
        .register(
            RegistryEntry::new("cta", cta_defaults).with_renderer(|| {
                Box::new(|widget: &WidgetConfig| {
                    format!(
                        "<a class=\"cta\">{}</a>",
                        widget.settings["label"].as_str().unwrap_or_default()
                    )
                })
            }),
        )
        .expect("register cta");

    registry
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> pageboard::Result<()> {
    let sink = MemorySink::new();
    let logger = Logger::new(sink.clone());

    let backend = Arc::new(MemoryBackend::new());
    let store = WidgetStore::new(backend.clone()).with_logger(logger.clone());
    store.load().await;

    let mut builder = PageBuilder::new(GridEngine::default(), landing_page_registry(), store)
        .with_logger(logger);

    let hero = builder.add_widget("hero").await?;
    let cta = builder.add_widget("cta").await?;
    let cta_copy = builder.duplicate_widget(&cta).await?;
    println!("placed widgets: hero={hero} cta={cta} copy={cta_copy}");

    // Pin the hero across the full width and let collisions sort themselves.
    builder.select_widget_for_layout(&hero);
    let mut layout = builder
        .layout_draft()
        .and_then(|draft| draft.layout.clone())
        .expect("hero layout");
    layout.full_width = true;
    layout.auto_height = false;
    builder.apply_layout_settings(layout).await?;

    builder.compact().await?;

    let container = builder.engine().container_grid_styles();
    println!(
        "container: {} / rows {} / gap {}",
        container.grid_template_columns, container.grid_auto_rows, container.gap
    );

    for rendered in builder.render_page() {
        println!(
            "[{}] column {} row {} -> {}",
            rendered.widget_type, rendered.styles.grid_column, rendered.styles.grid_row,
            rendered.markup
        );
    }

    println!(
        "persisted document: {}",
        backend.document().unwrap_or_else(|| "<none>".into())
    );
    println!("log lines captured: {}", sink.events().len());
    Ok(())
}
