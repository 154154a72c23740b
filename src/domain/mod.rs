//! Domain layer: the form, the payload and the outcomes.
//!
//! Plain data and pure functions; no I/O happens here.

mod field;
#[cfg(test)]
pub(crate) mod fixtures;
mod form;
mod outcome;
mod payload;

pub use field::{Choice, ClinicalField, FieldDomain, FieldKind, UnknownField};
pub use form::FormState;
pub use outcome::{
    classify, FailureKind, Outcome, PredictionResponse, RiskLabel, GENERIC_FAILURE_MESSAGE,
    SENTINEL_PREDICTION,
};
pub use payload::{coerce, FieldIssue, IssueKind, Payload, ValidationError, ValidationPolicy};
