//! Result presenter: outcome to display content.

use crate::domain::{Outcome, RiskLabel};

const HIGH_RISK_ADVICE: &str = "This prediction suggests elevated cardiovascular risk. Please consult with a healthcare professional for proper evaluation and personalized medical advice.";
const LOW_RISK_ADVICE: &str = "While the prediction indicates lower risk, maintaining a healthy lifestyle and regular check-ups with your healthcare provider is recommended.";

/// Visual treatment of a result card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Affirming,
    Warning,
    Failure,
}

/// Everything a view needs to draw one result card.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub tone: Tone,
    pub title: &'static str,
    pub message: String,
    /// Model confidence in percent, as received
    pub confidence: Option<f64>,
    pub advice: Option<&'static str>,
}

impl Presentation {
    /// Confidence rendered verbatim, e.g. `91.2%`.
    #[must_use]
    pub fn confidence_text(&self) -> Option<String> {
        self.confidence.map(|c| format!("{c}%"))
    }

    /// Plain-text rendering for non-interactive output.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut lines = vec![self.title.to_string()];
        if !self.message.is_empty() {
            lines.push(self.message.clone());
        }
        if let Some(confidence) = self.confidence_text() {
            lines.push(format!("Model Confidence: {confidence}"));
        }
        if let Some(advice) = self.advice {
            lines.push(advice.to_string());
        }
        lines.join("\n")
    }
}

/// Map an outcome to its card. `Idle` renders nothing.
#[must_use]
pub fn present(outcome: &Outcome) -> Option<Presentation> {
    match outcome {
        Outcome::Idle => None,
        Outcome::Success {
            risk: RiskLabel::High,
            confidence_percent,
            message,
            ..
        } => Some(Presentation {
            tone: Tone::Warning,
            title: "High Risk Detected",
            message: message.clone(),
            confidence: Some(*confidence_percent),
            advice: Some(HIGH_RISK_ADVICE),
        }),
        Outcome::Success {
            risk: RiskLabel::Low,
            confidence_percent,
            message,
            ..
        } => Some(Presentation {
            tone: Tone::Affirming,
            title: "Low Risk",
            message: message.clone(),
            confidence: Some(*confidence_percent),
            advice: Some(LOW_RISK_ADVICE),
        }),
        Outcome::Error { message, .. } => Some(Presentation {
            tone: Tone::Failure,
            title: "Error",
            message: message.clone(),
            confidence: None,
            advice: None,
        }),
    }
}
