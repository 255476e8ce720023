//! Grid placement, collision arbitration, and style derivation.
//!
//! Downstream code imports layout types from here while the implementation
//! details live in the private `engine` and `styles` modules.

mod engine;
mod styles;

pub use engine::{GridEngine, rects_collide};
pub use styles::{ContainerStyles, GridStyles};
