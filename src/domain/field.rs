//! Clinical field schema.
//!
//! The thirteen inputs of the heart disease classifier (UCI Cleveland
//! feature set), with the domains the input widgets advertise.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the thirteen clinical attributes sent to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClinicalField {
    Age,
    Sex,
    Cp,
    Trestbps,
    Chol,
    Fbs,
    Restecg,
    Thalach,
    Exang,
    Oldpeak,
    Slope,
    Ca,
    Thal,
}

/// Semantic kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    IntegerRange,
    Enum,
    DecimalRange,
}

/// One entry of an enumerated field's closed choice set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    /// Raw form value submitted for this choice
    pub value: &'static str,
    /// Human label
    pub label: &'static str,
}

/// Valid domain of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDomain {
    /// Inclusive numeric range with the widget's step.
    Range { min: f64, max: f64, step: f64 },
    /// Closed set of choices.
    Choices(&'static [Choice]),
}

const fn choice(value: &'static str, label: &'static str) -> Choice {
    Choice { value, label }
}

const SEX: &[Choice] = &[choice("1", "Male"), choice("0", "Female")];
const CHEST_PAIN: &[Choice] = &[
    choice("0", "Typical Angina"),
    choice("1", "Atypical Angina"),
    choice("2", "Non-anginal Pain"),
    choice("3", "Asymptomatic"),
];
const FASTING_SUGAR: &[Choice] = &[choice("1", "True"), choice("0", "False")];
const REST_ECG: &[Choice] = &[
    choice("0", "Normal"),
    choice("1", "ST-T Wave Abnormality"),
    choice("2", "Left Ventricular Hypertrophy"),
];
const EXERCISE_ANGINA: &[Choice] = &[choice("1", "Yes"), choice("0", "No")];
const ST_SLOPE: &[Choice] = &[
    choice("0", "Upsloping"),
    choice("1", "Flat"),
    choice("2", "Downsloping"),
];
const VESSELS: &[Choice] = &[
    choice("0", "0"),
    choice("1", "1"),
    choice("2", "2"),
    choice("3", "3"),
];
const THALASSEMIA: &[Choice] = &[
    choice("1", "Normal"),
    choice("2", "Fixed Defect"),
    choice("3", "Reversible Defect"),
];

impl ClinicalField {
    /// All fields in wire order.
    pub const ALL: [ClinicalField; 13] = [
        Self::Age,
        Self::Sex,
        Self::Cp,
        Self::Trestbps,
        Self::Chol,
        Self::Fbs,
        Self::Restecg,
        Self::Thalach,
        Self::Exang,
        Self::Oldpeak,
        Self::Slope,
        Self::Ca,
        Self::Thal,
    ];

    /// Number of fields.
    pub const COUNT: usize = Self::ALL.len();

    /// Wire identifier.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Sex => "sex",
            Self::Cp => "cp",
            Self::Trestbps => "trestbps",
            Self::Chol => "chol",
            Self::Fbs => "fbs",
            Self::Restecg => "restecg",
            Self::Thalach => "thalach",
            Self::Exang => "exang",
            Self::Oldpeak => "oldpeak",
            Self::Slope => "slope",
            Self::Ca => "ca",
            Self::Thal => "thal",
        }
    }

    /// Position in [`ClinicalField::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look a field up by its wire identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age (years)",
            Self::Sex => "Sex",
            Self::Cp => "Chest Pain Type",
            Self::Trestbps => "Resting Blood Pressure (mm Hg)",
            Self::Chol => "Cholesterol (mg/dl)",
            Self::Fbs => "Fasting Blood Sugar > 120 mg/dl",
            Self::Restecg => "Resting ECG Results",
            Self::Thalach => "Max Heart Rate Achieved",
            Self::Exang => "Exercise Induced Angina",
            Self::Oldpeak => "ST Depression (Oldpeak)",
            Self::Slope => "ST Slope",
            Self::Ca => "Number of Major Vessels",
            Self::Thal => "Thalassemia",
        }
    }

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Age | Self::Trestbps | Self::Chol | Self::Thalach => FieldKind::IntegerRange,
            Self::Oldpeak => FieldKind::DecimalRange,
            Self::Sex
            | Self::Cp
            | Self::Fbs
            | Self::Restecg
            | Self::Exang
            | Self::Slope
            | Self::Ca
            | Self::Thal => FieldKind::Enum,
        }
    }

    #[must_use]
    pub fn domain(self) -> FieldDomain {
        let range = |min, max, step| FieldDomain::Range { min, max, step };
        match self {
            Self::Age => range(1.0, 120.0, 1.0),
            Self::Trestbps => range(80.0, 250.0, 1.0),
            Self::Chol => range(100.0, 600.0, 1.0),
            Self::Thalach => range(60.0, 250.0, 1.0),
            Self::Oldpeak => range(0.0, 10.0, 0.1),
            Self::Sex => FieldDomain::Choices(SEX),
            Self::Cp => FieldDomain::Choices(CHEST_PAIN),
            Self::Fbs => FieldDomain::Choices(FASTING_SUGAR),
            Self::Restecg => FieldDomain::Choices(REST_ECG),
            Self::Exang => FieldDomain::Choices(EXERCISE_ANGINA),
            Self::Slope => FieldDomain::Choices(ST_SLOPE),
            Self::Ca => FieldDomain::Choices(VESSELS),
            Self::Thal => FieldDomain::Choices(THALASSEMIA),
        }
    }

    /// Input hint shown while the field is empty.
    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Age => "e.g., 55",
            Self::Trestbps => "e.g., 120",
            Self::Chol => "e.g., 200",
            Self::Thalach => "e.g., 150",
            Self::Oldpeak => "e.g., 1.5",
            Self::Sex => "Select sex",
            Self::Cp => "Select chest pain type",
            Self::Restecg => "Select ECG result",
            Self::Slope => "Select slope",
            Self::Ca => "Select vessels",
            Self::Thal => "Select type",
            Self::Fbs | Self::Exang => "Select option",
        }
    }
}

impl fmt::Display for ClinicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for an identifier outside the schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown clinical field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for ClinicalField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| UnknownField(s.to_string()))
    }
}

impl FieldDomain {
    /// Whether `value` lies in this domain.
    ///
    /// Integer-step ranges reject fractional values; choice sets compare
    /// against the numeric value of each choice.
    #[must_use]
    pub fn admits(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            Self::Range { min, max, step } => {
                let in_range = (*min..=*max).contains(&value);
                if *step >= 1.0 {
                    in_range && value.fract() == 0.0
                } else {
                    in_range
                }
            }
            Self::Choices(choices) => choices
                .iter()
                .filter_map(|c| c.value.parse::<f64>().ok())
                .any(|v| v == value),
        }
    }

    /// Choice whose raw value equals `raw`, if this is a choice set.
    #[must_use]
    pub fn choice_for(&self, raw: &str) -> Option<&'static Choice> {
        match self {
            Self::Choices(choices) => choices.iter().find(|c| c.value == raw.trim()),
            Self::Range { .. } => None,
        }
    }

    /// Next (or previous) choice after `raw`, wrapping around.
    ///
    /// An unknown or empty `raw` starts from the first (or last) choice.
    #[must_use]
    pub fn cycle(&self, raw: &str, forward: bool) -> Option<&'static Choice> {
        let Self::Choices(choices) = self else {
            return None;
        };
        if choices.is_empty() {
            return None;
        }
        let len = choices.len();
        let next = match choices.iter().position(|c| c.value == raw.trim()) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        choices.get(next)
    }
}
