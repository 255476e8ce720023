use thiserror::Error;

use crate::registry::RegistryError;
use crate::store::StoreError;

/// Unified result type for the page builder crate.
pub type Result<T> = std::result::Result<T, BuilderError>;

/// Errors surfaced by the page builder orchestrator.
///
/// Layout operations themselves never error: per the engine contract they
/// signal a missing layout with `false`/no-op and otherwise always succeed.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("widget `{0}` not found")]
    WidgetNotFound(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
