//! Shared test fixtures.

use super::{ClinicalField, FormState};

/// Raw values of a complete, in-range patient.
pub(crate) const VALID_PATIENT: [(ClinicalField, &str); ClinicalField::COUNT] = [
    (ClinicalField::Age, "54"),
    (ClinicalField::Sex, "1"),
    (ClinicalField::Cp, "0"),
    (ClinicalField::Trestbps, "130"),
    (ClinicalField::Chol, "246"),
    (ClinicalField::Fbs, "0"),
    (ClinicalField::Restecg, "1"),
    (ClinicalField::Thalach, "150"),
    (ClinicalField::Exang, "0"),
    (ClinicalField::Oldpeak, "1.5"),
    (ClinicalField::Slope, "1"),
    (ClinicalField::Ca, "0"),
    (ClinicalField::Thal, "2"),
];

pub(crate) fn filled_form() -> FormState {
    let mut form = FormState::new();
    for (field, raw) in VALID_PATIENT {
        form.set_field(field, raw);
    }
    form
}
