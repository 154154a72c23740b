//! Request lifecycle: one prediction submission at a time.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──response──▶ Settled(Success | Error)
//!                      ▲                            │
//!                      └──────────submit────────────┘
//! ```
//!
//! The `submitting` flag on [`FormState`] is the only concurrency guard. It is
//! raised by [`PredictionSession::begin`] and lowered exactly once per
//! accepted submission, whichever way the request ends.

use std::time::Instant;

use crate::domain::{
    classify, ClinicalField, FailureKind, FormState, Outcome, Payload, PredictionResponse,
    ValidationPolicy,
};
use crate::ports::{PredictError, PredictionService};

/// Where the session currently is in the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleState<'a> {
    Idle,
    Submitting,
    Settled(&'a Outcome),
}

/// Result of starting a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Begin {
    /// Guard raised; send this payload and hand the result to `settle`.
    Send(Payload),
    /// A request is already in flight; nothing changed.
    Suppressed,
    /// Strict validation failed; the session is already settled.
    Rejected,
}

/// Lowers the submission guard when dropped, including on unwind.
struct InFlight<'a>(&'a mut FormState);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.end_submission();
    }
}

/// State owned by one interactive session: the form and the last outcome.
#[derive(Debug, Default)]
pub struct PredictionSession {
    form: FormState,
    outcome: Outcome,
    policy: ValidationPolicy,
    started_at: Option<Instant>,
}

impl PredictionSession {
    #[must_use]
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn form(&self) -> &FormState {
        &self.form
    }

    #[must_use]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    #[must_use]
    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Record one keystroke-level edit. Allowed while submitting.
    pub fn set_field(&mut self, field: ClinicalField, raw: impl Into<String>) {
        self.form.set_field(field, raw);
    }

    pub fn push_char(&mut self, field: ClinicalField, c: char) {
        self.form.push_char(field, c);
    }

    pub fn pop_char(&mut self, field: ClinicalField) {
        self.form.pop_char(field);
    }

    /// Clear the form and the displayed outcome. Refused while submitting.
    pub fn reset(&mut self) -> bool {
        if !self.form.reset() {
            return false;
        }
        self.outcome = Outcome::Idle;
        true
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState<'_> {
        if self.form.is_submitting() {
            LifecycleState::Submitting
        } else if self.outcome.is_idle() {
            LifecycleState::Idle
        } else {
            LifecycleState::Settled(&self.outcome)
        }
    }

    /// Raise the guard, clear the previous outcome and encode the form.
    pub fn begin(&mut self) -> Begin {
        if !self.form.begin_submission() {
            tracing::debug!("Submission ignored: a request is already in flight");
            return Begin::Suppressed;
        }
        self.outcome = Outcome::Idle;
        self.started_at = Some(Instant::now());

        let payload = Payload::encode(&self.form);
        if self.policy == ValidationPolicy::Strict {
            if let Err(err) = payload.validate() {
                tracing::info!(
                    fields = err.issues.len(),
                    "Submission rejected by local validation"
                );
                self.outcome = Outcome::Error {
                    message: err.to_string(),
                    kind: FailureKind::Validation,
                };
                self.form.end_submission();
                self.started_at = None;
                return Begin::Rejected;
            }
        }

        tracing::debug!(
            non_finite = payload.non_finite_count(),
            "Submission started"
        );
        Begin::Send(payload)
    }

    /// Apply the result of the request sent after [`begin`](Self::begin) and
    /// lower the guard.
    ///
    /// A result arriving while nothing is in flight is dropped.
    pub fn settle(&mut self, result: Result<PredictionResponse, PredictError>) -> &Outcome {
        if !self.form.is_submitting() {
            tracing::warn!("Discarding prediction result: no submission in flight");
            return &self.outcome;
        }
        self.outcome = self.resolve(result);
        self.form.end_submission();
        &self.outcome
    }

    /// Run a whole submission on the calling thread.
    ///
    /// The service call is the only blocking step. The guard is lowered once
    /// on every path, even if the service panics.
    pub fn submit(&mut self, service: &dyn PredictionService) -> &Outcome {
        let payload = match self.begin() {
            Begin::Send(payload) => payload,
            Begin::Suppressed | Begin::Rejected => return &self.outcome,
        };

        let result = {
            let _in_flight = InFlight(&mut self.form);
            service.predict(&payload)
        };
        self.outcome = self.resolve(result);
        &self.outcome
    }

    fn resolve(&mut self, result: Result<PredictionResponse, PredictError>) -> Outcome {
        let elapsed_ms = self
            .started_at
            .take()
            .map(|t| u64::try_from(t.elapsed().as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();

        let outcome = match result {
            Ok(response) => classify(&response),
            Err(err) => {
                tracing::warn!(kind = ?err.kind(), error = %err, "Prediction request failed");
                Outcome::failure(err.kind())
            }
        };

        match &outcome {
            Outcome::Success { risk, .. } => {
                tracing::info!(risk = %risk, elapsed_ms, "Prediction settled");
            }
            Outcome::Error { kind, .. } => {
                tracing::info!(kind = ?kind, elapsed_ms, "Prediction settled with error");
            }
            Outcome::Idle => {}
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::filled_form;
    use crate::domain::{RiskLabel, GENERIC_FAILURE_MESSAGE};
    use crate::ports::ServiceStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Stub service returning a fixed result and recording what it was sent.
    struct StubService {
        reply: Result<PredictionResponse, PredictError>,
        calls: AtomicUsize,
        last: Mutex<Option<Payload>>,
    }

    impl StubService {
        fn replying(reply: Result<PredictionResponse, PredictError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }

        fn low(confidence: f64, message: &str) -> Self {
            Self::replying(Ok(PredictionResponse {
                prediction: 0.0,
                risk: "Low".to_string(),
                confidence,
                message: message.to_string(),
            }))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PredictionService for StubService {
        fn predict(&self, payload: &Payload) -> Result<PredictionResponse, PredictError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().expect("lock") = Some(*payload);
            self.reply.clone()
        }

        fn health(&self) -> Result<ServiceStatus, PredictError> {
            Ok(ServiceStatus {
                status: "API is running".to_string(),
            })
        }
    }

    struct PanickingService;

    impl PredictionService for PanickingService {
        fn predict(&self, _payload: &Payload) -> Result<PredictionResponse, PredictError> {
            panic!("transport blew up");
        }

        fn health(&self) -> Result<ServiceStatus, PredictError> {
            Err(PredictError::Transport("down".to_string()))
        }
    }

    fn session_with(form: FormState) -> PredictionSession {
        let mut session = PredictionSession::new(ValidationPolicy::Forward);
        for (field, raw) in form.iter() {
            session.set_field(field, raw);
        }
        session
    }

    #[test]
    fn test_fresh_session_is_idle() {
        let session = PredictionSession::new(ValidationPolicy::Forward);
        assert_eq!(session.state(), LifecycleState::Idle);
        assert!(!session.form().is_submitting());
    }

    #[test]
    fn test_low_risk_scenario() {
        let mut session = session_with(filled_form());
        let service = StubService::low(91.2, "Low risk");

        let outcome = session.submit(&service).clone();
        assert_eq!(
            outcome,
            Outcome::Success {
                predicted_class: 0.0,
                risk: RiskLabel::Low,
                confidence_percent: 91.2,
                message: "Low risk".to_string(),
            }
        );
        assert_eq!(service.calls(), 1);
        assert!(!session.form().is_submitting());
        assert_eq!(session.state(), LifecycleState::Settled(&outcome));
    }

    #[test]
    fn test_empty_age_is_still_sent() {
        let mut form = filled_form();
        form.set_field(ClinicalField::Age, "");
        let mut session = session_with(form);
        let service = StubService::low(60.0, "ok");

        session.submit(&service);
        assert_eq!(service.calls(), 1);
        let sent = service.last.lock().expect("lock").expect("payload recorded");
        assert!(sent.age.is_nan());
        assert!((sent.chol - 246.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_strict_policy_rejects_without_network_call() {
        let mut session = PredictionSession::new(ValidationPolicy::Strict);
        for (field, raw) in filled_form().iter() {
            session.set_field(field, raw);
        }
        session.set_field(ClinicalField::Age, "");
        let service = StubService::low(60.0, "ok");

        let outcome = session.submit(&service).clone();
        assert_eq!(service.calls(), 0);
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Validation));
        assert!(matches!(&outcome, Outcome::Error { message, .. } if message.contains("Age")));
        assert!(!session.form().is_submitting());
    }

    #[test]
    fn test_submit_while_in_flight_is_suppressed() {
        let mut session = session_with(filled_form());
        assert!(matches!(session.begin(), Begin::Send(_)));

        let service = StubService::low(50.0, "second");
        assert!(session.submit(&service).is_idle());
        assert_eq!(service.calls(), 0);
        // The suppressed call must not release the guard held by the first.
        assert!(session.form().is_submitting());
        assert_eq!(session.begin(), Begin::Suppressed);
    }

    #[test]
    fn test_transport_failure_yields_generic_error() {
        let mut session = session_with(filled_form());
        let service = StubService::replying(Err(PredictError::Transport(
            "connection refused".to_string(),
        )));

        let outcome = session.submit(&service).clone();
        assert_eq!(
            outcome,
            Outcome::Error {
                message: GENERIC_FAILURE_MESSAGE.to_string(),
                kind: FailureKind::Transport,
            }
        );
        assert!(!session.form().is_submitting());
    }

    #[test]
    fn test_every_failure_kind_collapses_to_same_message() {
        for err in [
            PredictError::Status { status: 500 },
            PredictError::Parse("expected value".to_string()),
        ] {
            let kind = err.kind();
            let mut session = session_with(filled_form());
            let outcome = session.submit(&StubService::replying(Err(err))).clone();
            assert_eq!(outcome, Outcome::failure(kind));
        }
    }

    #[test]
    fn test_sentinel_response_shows_service_message() {
        let mut session = session_with(filled_form());
        let service = StubService::replying(Ok(PredictionResponse {
            prediction: -1.0,
            risk: "Error".to_string(),
            confidence: 0.0,
            message: "Model unavailable".to_string(),
        }));
        let outcome = session.submit(&service).clone();
        assert_eq!(
            outcome,
            Outcome::Error {
                message: "Model unavailable".to_string(),
                kind: FailureKind::ServiceReported,
            }
        );
    }

    #[test]
    fn test_guard_released_once_per_submit() {
        let mut session = session_with(filled_form());
        let ok = StubService::low(70.0, "ok");
        let failing = StubService::replying(Err(PredictError::Status { status: 503 }));

        for round in 0..3 {
            session.submit(&ok);
            assert!(!session.form().is_submitting(), "round {round}");
            session.submit(&failing);
            assert!(!session.form().is_submitting(), "round {round}");
        }
        assert_eq!(ok.calls(), 3);
        assert_eq!(failing.calls(), 3);
    }

    #[test]
    fn test_guard_released_when_service_panics() {
        let mut session = session_with(filled_form());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            session.submit(&PanickingService);
        }));
        assert!(result.is_err());
        assert!(!session.form().is_submitting());
    }

    #[test]
    fn test_new_submission_clears_previous_outcome() {
        let mut session = session_with(filled_form());
        session.submit(&StubService::low(80.0, "first"));
        assert!(!session.outcome().is_idle());

        assert!(matches!(session.begin(), Begin::Send(_)));
        assert!(session.outcome().is_idle());
        assert_eq!(session.state(), LifecycleState::Submitting);

        let outcome = session
            .settle(Err(PredictError::Transport("worker lost".to_string())))
            .clone();
        assert_eq!(outcome, Outcome::failure(FailureKind::Transport));
        assert!(!session.form().is_submitting());
    }

    #[test]
    fn test_settle_without_submission_is_ignored() {
        let mut session = session_with(filled_form());
        let outcome = session
            .settle(Err(PredictError::Transport("late".to_string())))
            .clone();
        assert!(outcome.is_idle());
    }

    #[test]
    fn test_reset_clears_form_and_outcome() {
        let mut session = session_with(filled_form());
        session.submit(&StubService::low(80.0, "done"));
        assert!(session.reset());
        assert!(session.outcome().is_idle());
        assert_eq!(session.form().value(ClinicalField::Age), "");

        assert!(matches!(session.begin(), Begin::Send(_)));
        assert!(!session.reset());
    }

    #[test]
    fn test_guard_release_count_matches_accepted_submissions() {
        let mut session = session_with(filled_form());
        let ok = StubService::low(70.0, "ok");
        let failing = StubService::replying(Err(PredictError::Transport("reset".to_string())));

        session.submit(&ok);
        assert_eq!(session.form().guard_releases(), 1);
        session.submit(&failing);
        assert_eq!(session.form().guard_releases(), 2);

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            session.submit(&PanickingService);
        }));
        assert_eq!(session.form().guard_releases(), 3);

        // begin/settle pair, with a suppressed submit and a stray settle around it.
        assert!(matches!(session.begin(), Begin::Send(_)));
        assert!(session.submit(&ok).is_idle());
        assert_eq!(session.form().guard_releases(), 3);
        session.settle(Err(PredictError::Status { status: 502 }));
        assert_eq!(session.form().guard_releases(), 4);
        session.settle(Err(PredictError::Status { status: 502 }));
        assert_eq!(session.form().guard_releases(), 4);

        let mut strict = PredictionSession::new(ValidationPolicy::Strict);
        assert_eq!(strict.submit(&ok).failure_kind(), Some(FailureKind::Validation));
        assert_eq!(strict.form().guard_releases(), 1);
        assert_eq!(ok.calls(), 1);
    }
}
