//! Payload codec: raw form text to the numeric request body.

use serde::Serialize;
use std::fmt;

use super::field::{ClinicalField, FieldDomain, FieldKind};
use super::form::FormState;

/// Numeric request body for `POST /predict`.
///
/// Field names are the wire identifiers. Non-finite values serialize as JSON
/// `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Payload {
    pub age: f64,
    pub sex: f64,
    pub cp: f64,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: f64,
    pub restecg: f64,
    pub thalach: f64,
    pub exang: f64,
    pub oldpeak: f64,
    pub slope: f64,
    pub ca: f64,
    pub thal: f64,
}

/// Whether to check the payload locally before sending it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Send whatever the codec produced, `NaN` included.
    #[default]
    Forward,
    /// Reject non-finite or out-of-domain values before any network call.
    Strict,
}

/// Coerce one raw value: trimmed standard float parsing, `NaN` otherwise.
#[must_use]
pub fn coerce(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

impl Payload {
    /// Encode every field of `form`. Never fails.
    #[must_use]
    pub fn encode(form: &FormState) -> Self {
        let v = |field| coerce(form.value(field));
        Self {
            age: v(ClinicalField::Age),
            sex: v(ClinicalField::Sex),
            cp: v(ClinicalField::Cp),
            trestbps: v(ClinicalField::Trestbps),
            chol: v(ClinicalField::Chol),
            fbs: v(ClinicalField::Fbs),
            restecg: v(ClinicalField::Restecg),
            thalach: v(ClinicalField::Thalach),
            exang: v(ClinicalField::Exang),
            oldpeak: v(ClinicalField::Oldpeak),
            slope: v(ClinicalField::Slope),
            ca: v(ClinicalField::Ca),
            thal: v(ClinicalField::Thal),
        }
    }

    #[must_use]
    pub fn get(&self, field: ClinicalField) -> f64 {
        match field {
            ClinicalField::Age => self.age,
            ClinicalField::Sex => self.sex,
            ClinicalField::Cp => self.cp,
            ClinicalField::Trestbps => self.trestbps,
            ClinicalField::Chol => self.chol,
            ClinicalField::Fbs => self.fbs,
            ClinicalField::Restecg => self.restecg,
            ClinicalField::Thalach => self.thalach,
            ClinicalField::Exang => self.exang,
            ClinicalField::Oldpeak => self.oldpeak,
            ClinicalField::Slope => self.slope,
            ClinicalField::Ca => self.ca,
            ClinicalField::Thal => self.thal,
        }
    }

    /// Number of fields that did not coerce to a finite number.
    #[must_use]
    pub fn non_finite_count(&self) -> usize {
        ClinicalField::ALL
            .iter()
            .filter(|f| !self.get(**f).is_finite())
            .count()
    }

    /// Check every field against its schema domain.
    ///
    /// # Errors
    /// Returns every offending field, not just the first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let issues: Vec<FieldIssue> = ClinicalField::ALL
            .into_iter()
            .filter_map(|field| check_field(field, self.get(field)))
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn check_field(field: ClinicalField, value: f64) -> Option<FieldIssue> {
    if !value.is_finite() {
        return Some(FieldIssue::new(field, IssueKind::NotANumber));
    }
    let domain = field.domain();
    if domain.admits(value) {
        return None;
    }
    let kind = match (field.kind(), domain) {
        (FieldKind::Enum, _) => IssueKind::NotAnOption,
        (_, FieldDomain::Range { min, max, .. }) if (min..=max).contains(&value) => {
            IssueKind::NotAnInteger
        }
        (_, FieldDomain::Range { min, max, .. }) => IssueKind::OutOfRange { min, max },
        (_, FieldDomain::Choices(_)) => IssueKind::NotAnOption,
    };
    Some(FieldIssue::new(field, kind))
}

/// Why one field failed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IssueKind {
    NotANumber,
    NotAnInteger,
    OutOfRange { min: f64, max: f64 },
    NotAnOption,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldIssue {
    pub field: ClinicalField,
    pub kind: IssueKind,
}

impl FieldIssue {
    fn new(field: ClinicalField, kind: IssueKind) -> Self {
        Self { field, kind }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.field.label();
        match self.kind {
            IssueKind::NotANumber => write!(f, "{label}: Invalid number"),
            IssueKind::NotAnInteger => write!(f, "{label}: Must be a whole number"),
            IssueKind::OutOfRange { min, max } => {
                write!(f, "{label}: Value must be between {min} and {max}")
            }
            IssueKind::NotAnOption => write!(f, "{label}: Not one of the listed options"),
        }
    }
}

/// Payload rejected before submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Fields that failed, in wire order.
    pub fn fields(&self) -> impl Iterator<Item = ClinicalField> + '_ {
        self.issues.iter().map(|i| i.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::filled_form;

    #[test]
    fn test_encode_parses_every_field() {
        let form = filled_form();
        let payload = Payload::encode(&form);
        for (field, raw) in form.iter() {
            let expected: f64 = raw.parse().expect("fixture is numeric");
            assert!((payload.get(field) - expected).abs() < f64::EPSILON, "{field}");
        }
        assert_eq!(payload.non_finite_count(), 0);
    }

    #[test]
    fn test_malformed_input_becomes_nan() {
        let mut form = filled_form();
        form.set_field(ClinicalField::Age, "");
        form.set_field(ClinicalField::Chol, "two hundred");
        form.set_field(ClinicalField::Thalach, " 150 ");

        let payload = Payload::encode(&form);
        assert!(payload.age.is_nan());
        assert!(payload.chol.is_nan());
        assert!((payload.thalach - 150.0).abs() < f64::EPSILON);
        assert_eq!(payload.non_finite_count(), 2);
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let mut form = filled_form();
        form.set_field(ClinicalField::Age, "");
        let json = serde_json::to_value(Payload::encode(&form)).expect("serializable");

        let object = json.as_object().expect("object body");
        assert_eq!(object.len(), 13);
        for field in ClinicalField::ALL {
            assert!(object.contains_key(field.id()), "{field}");
        }
        assert!(object["age"].is_null());
        assert_eq!(object["oldpeak"].as_f64(), Some(1.5));
    }

    #[test]
    fn test_validate_accepts_in_range_payload() {
        assert!(Payload::encode(&filled_form()).validate().is_ok());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let mut form = filled_form();
        form.set_field(ClinicalField::Age, "");
        form.set_field(ClinicalField::Chol, "900");
        form.set_field(ClinicalField::Thal, "7");
        form.set_field(ClinicalField::Trestbps, "120.5");

        let err = Payload::encode(&form)
            .validate()
            .expect_err("payload has four bad fields");
        let kinds: Vec<(ClinicalField, IssueKind)> =
            err.issues.iter().map(|i| (i.field, i.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (ClinicalField::Age, IssueKind::NotANumber),
                (ClinicalField::Trestbps, IssueKind::NotAnInteger),
                (
                    ClinicalField::Chol,
                    IssueKind::OutOfRange {
                        min: 100.0,
                        max: 600.0
                    }
                ),
                (ClinicalField::Thal, IssueKind::NotAnOption),
            ]
        );
        assert!(err.to_string().starts_with("Age (years): Invalid number"));
    }
}
