//! HTTP adapter for the prediction service (reqwest, blocking).
//!
//! Blocking I/O is deliberate: the terminal UI runs each request on its own
//! worker thread, and the CLI has nothing else to do while waiting.

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::domain::{Payload, PredictionResponse};
use crate::ports::{PredictError, PredictionService, ServiceStatus};

/// Prediction service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    client: Client,
    predict_url: String,
    health_url: String,
}

impl HttpPredictionClient {
    /// Build a client for the configured base URL.
    ///
    /// # Errors
    /// Returns `reqwest::Error` if the TLS backend cannot be initialized.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            predict_url: config.endpoint("/predict"),
            health_url: config.endpoint("/"),
        })
    }

    #[must_use]
    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PredictError> {
        let response = request
            .send()
            .map_err(|e| PredictError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|e| PredictError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| PredictError::Parse(e.to_string()))
    }
}

impl PredictionService for HttpPredictionClient {
    fn predict(&self, payload: &Payload) -> Result<PredictionResponse, PredictError> {
        tracing::debug!(
            url = %self.predict_url,
            non_finite = payload.non_finite_count(),
            "Sending prediction request"
        );
        // `.json()` sets `Content-Type: application/json`.
        self.send(self.client.post(&self.predict_url).json(payload))
    }

    fn health(&self) -> Result<ServiceStatus, PredictError> {
        self.send(self.client.get(&self.health_url))
    }
}
