//! Application layer: Use cases and services.
//!
//! This module drives the domain through the prediction port:
//! the submission lifecycle and the presentation of its outcome.

mod lifecycle;
mod presenter;

pub use lifecycle::{Begin, LifecycleState, PredictionSession};
pub use presenter::{present, Presentation, Tone};
