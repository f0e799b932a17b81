use serde_json::Value;

use crate::models::{Category, Sensitivity, MIN_CLASSIFICATION_CONFIDENCE};

#[derive(Debug, Clone, PartialEq)]
pub enum AtomAnomaly {
    NotAnObject,
    MissingDisplayText,
    UnknownCategory(String),
    UnknownSensitivity(String),
    SensitivityMismatch {
        category: Category,
        sensitivity: Sensitivity,
    },
    ConfidenceOutOfRange(f64),
    LowConfidenceClassification {
        category: Category,
        confidence: f64,
    },
}

impl AtomAnomaly {
    pub fn describe(&self) -> String {
        match self {
            Self::NotAnObject => "atom is not a JSON object".to_string(),
            Self::MissingDisplayText => "display_text is missing or empty".to_string(),
            Self::UnknownCategory(value) => format!("category {value:?} is not in the taxonomy"),
            Self::UnknownSensitivity(value) => format!("sensitivity {value:?} is not recognised"),
            Self::SensitivityMismatch {
                category,
                sensitivity,
            } => format!(
                "{} is tagged {} but the category is {}",
                category.as_slug(),
                sensitivity.as_str(),
                category.default_sensitivity().as_str()
            ),
            Self::ConfidenceOutOfRange(value) => format!("confidence {value} is outside 0.0-1.0"),
            Self::LowConfidenceClassification {
                category,
                confidence,
            } => format!(
                "confidence {confidence} is below {MIN_CLASSIFICATION_CONFIDENCE} but category is {}",
                category.as_slug()
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AtomAudit {
    pub index: usize,
    pub anomalies: Vec<AtomAnomaly>,
}

impl AtomAudit {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Checks one atom against the taxonomy rules without changing it.
pub fn audit_atom(index: usize, atom: &Value) -> AtomAudit {
    let mut anomalies = Vec::new();

    let Some(object) = atom.as_object() else {
        return AtomAudit {
            index,
            anomalies: vec![AtomAnomaly::NotAnObject],
        };
    };

    let has_text = object
        .get("display_text")
        .and_then(Value::as_str)
        .map(|text| !text.trim().is_empty())
        .unwrap_or(false);
    if !has_text {
        anomalies.push(AtomAnomaly::MissingDisplayText);
    }

    let category = match object.get("category") {
        Some(Value::String(slug)) => {
            let parsed = Category::parse(slug);
            if parsed.is_none() {
                anomalies.push(AtomAnomaly::UnknownCategory(slug.clone()));
            }
            parsed
        }
        Some(other) => {
            anomalies.push(AtomAnomaly::UnknownCategory(other.to_string()));
            None
        }
        None => {
            anomalies.push(AtomAnomaly::UnknownCategory(String::new()));
            None
        }
    };

    let sensitivity = match object.get("sensitivity") {
        Some(Value::String(value)) => {
            let parsed = Sensitivity::parse(value);
            if parsed.is_none() {
                anomalies.push(AtomAnomaly::UnknownSensitivity(value.clone()));
            }
            parsed
        }
        Some(other) => {
            anomalies.push(AtomAnomaly::UnknownSensitivity(other.to_string()));
            None
        }
        None => {
            anomalies.push(AtomAnomaly::UnknownSensitivity(String::new()));
            None
        }
    };

    if let (Some(category), Some(sensitivity)) = (category, sensitivity) {
        if category.default_sensitivity() != sensitivity {
            anomalies.push(AtomAnomaly::SensitivityMismatch {
                category,
                sensitivity,
            });
        }
    }

    if let Some(confidence) = object.get("confidence").and_then(Value::as_f64) {
        if !(0.0..=1.0).contains(&confidence) {
            anomalies.push(AtomAnomaly::ConfidenceOutOfRange(confidence));
        } else if confidence < MIN_CLASSIFICATION_CONFIDENCE {
            if let Some(category) = category.filter(|value| *value != Category::Others) {
                anomalies.push(AtomAnomaly::LowConfidenceClassification {
                    category,
                    confidence,
                });
            }
        }
    }

    AtomAudit { index, anomalies }
}

pub fn audit_atoms(atoms: &[Value]) -> Vec<AtomAudit> {
    atoms
        .iter()
        .enumerate()
        .map(|(index, atom)| audit_atom(index, atom))
        .filter(|audit| !audit.is_clean())
        .collect()
}
