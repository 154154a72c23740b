//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest client for the prediction service
//! - `sanitize`: redaction of clinical values in log output

pub mod http;
pub mod sanitize;

pub use http::HttpPredictionClient;
