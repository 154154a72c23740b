//! Prediction port: trait for the remote classification service.
//!
//! This trait abstracts the transport (HTTP via reqwest) from the request
//! lifecycle so the lifecycle can be driven by stubs in tests.

use serde::Deserialize;

use crate::domain::{FailureKind, Payload, PredictionResponse};

/// Why a call to the service produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictError {
    /// Connection refused, DNS, TLS, timeout or a lost worker.
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("service answered with HTTP status {status}")]
    Status { status: u16 },

    /// Body was not the expected JSON shape.
    #[error("unparseable response: {0}")]
    Parse(String),
}

impl PredictError {
    /// Taxonomy bucket used by the lifecycle.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::Status { .. } => FailureKind::HttpStatus,
            Self::Parse(_) => FailureKind::Parse,
        }
    }
}

/// Body of the service's root endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
}

/// Trait for the remote classifier.
///
/// Implementations issue exactly one request per call and never retry.
pub trait PredictionService: Send + Sync {
    /// Submit one payload to `POST /predict`.
    ///
    /// # Errors
    /// Returns `PredictError` for transport failures, non-2xx statuses and
    /// bodies that do not parse as a [`PredictionResponse`].
    fn predict(&self, payload: &Payload) -> Result<PredictionResponse, PredictError>;

    /// Probe `GET /`.
    ///
    /// # Errors
    /// Same taxonomy as [`PredictionService::predict`].
    fn health(&self) -> Result<ServiceStatus, PredictError>;
}
