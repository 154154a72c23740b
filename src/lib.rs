//! # HeartGuard
//!
//! Terminal client for a remote heart disease risk classifier.
//!
//! The crate collects thirteen clinical parameters, submits them to the
//! classification service over HTTP, and renders the returned verdict.
//! It performs no inference of its own and keeps no history.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Field schema, form state, payload codec, outcome classifier
//! - `ports`: The prediction service trait
//! - `adapters`: reqwest transport and log sanitization
//! - `application`: Submission lifecycle and result presentation
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use application::{present, PredictionSession};
pub use config::{Config, ConfigError};
pub use domain::{ClinicalField, FormState, Outcome, Payload, RiskLabel};
pub use ports::{PredictError, PredictionService};

/// Result type for HeartGuard operations
pub type Result<T> = std::result::Result<T, HeartGuardError>;

/// Main error type for HeartGuard
#[derive(Debug, thiserror::Error)]
pub enum HeartGuardError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_setup_errors_convert() {
        let err = reqwest::blocking::Client::new()
            .get("not a url")
            .send()
            .expect_err("relative URL is rejected before any I/O");
        let err: HeartGuardError = err.into();
        assert!(err.to_string().starts_with("HTTP client error"));
    }
}
