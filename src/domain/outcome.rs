//! Prediction outcomes and the response classifier.

use serde::{Deserialize, Deserializer, Serialize};

/// Message shown for every failure that carries no service message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Error occurred during prediction";

/// Wire value of `prediction` that signals a service-side failure.
pub const SENTINEL_PREDICTION: f64 = -1.0;

/// Body of a `POST /predict` response.
///
/// `prediction` is any JSON number, so `1` and `1.0` decode alike. The other
/// fields may be absent or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// 0, 1, or [`SENTINEL_PREDICTION`]
    pub prediction: f64,
    /// "Low" or "High"
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk: String,
    /// Percentage, displayed verbatim
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Risk bucket of a successful prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    /// Map the wire label. Only the exact string `"High"` is high risk.
    #[must_use]
    pub fn from_wire(label: &str) -> Self {
        if label == "High" {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Where a failed submission broke down.
///
/// Kept for logs and tests; users see one message whatever the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Service unreachable, DNS, TLS, timeout
    Transport,
    /// Non-2xx status
    HttpStatus,
    /// Body is not the expected JSON
    Parse,
    /// `prediction == -1`
    ServiceReported,
    /// Rejected locally before sending (strict validation only)
    Validation,
}

/// What the result panel shows after a submission.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing settled since the last submission started.
    #[default]
    Idle,
    Success {
        /// Class as received, e.g. `1` or `1.0`
        predicted_class: f64,
        risk: RiskLabel,
        confidence_percent: f64,
        message: String,
    },
    Error {
        message: String,
        kind: FailureKind,
    },
}

impl Outcome {
    /// Failure outcome with the generic message.
    #[must_use]
    pub fn failure(kind: FailureKind) -> Self {
        Self::Error {
            message: GENERIC_FAILURE_MESSAGE.to_string(),
            kind,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn risk(&self) -> Option<RiskLabel> {
        match self {
            Self::Success { risk, .. } => Some(*risk),
            _ => None,
        }
    }

    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Turn a parsed service response into an outcome.
#[must_use]
pub fn classify(response: &PredictionResponse) -> Outcome {
    if response.prediction == SENTINEL_PREDICTION {
        let message = if response.message.is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            response.message.clone()
        };
        return Outcome::Error {
            message,
            kind: FailureKind::ServiceReported,
        };
    }

    if response.risk != "High" && response.risk != "Low" {
        tracing::warn!(
            label = %response.risk,
            "Unexpected risk label from service; treating as low risk"
        );
    }

    Outcome::Success {
        predicted_class: response.prediction,
        risk: RiskLabel::from_wire(&response.risk),
        confidence_percent: response.confidence,
        message: response.message.clone(),
    }
}
