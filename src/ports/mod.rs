//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the request lifecycle and the remote prediction service.

mod predictor;

pub use predictor::{PredictError, PredictionService, ServiceStatus};
