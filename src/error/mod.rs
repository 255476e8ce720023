//! Error taxonomy for the page builder crate.

mod types;

pub use types::{BuilderError, Result};
