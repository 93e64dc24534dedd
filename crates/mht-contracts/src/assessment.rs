//! Offline assessment input.
//!
//! Every clinical field is optional: absence is meaningful (it drives
//! validation warnings and makes comparisons false) and is never replaced
//! by a default value.

use serde::{Deserialize, Serialize};

/// Symptom severities on a 0 to 10 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Symptoms {
    pub severity: Option<f64>,
    pub vasomotor_symptoms: Option<f64>,
    pub sleep_disturbances: Option<f64>,
    pub mood_changes: Option<f64>,
    pub vaginal_dryness: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalHistory {
    pub vte: Option<bool>,
    pub breast_cancer_active: Option<bool>,
    pub breast_cancer_history: Option<bool>,
    pub cardiovascular: Option<bool>,
    pub diabetes: Option<bool>,
    pub hypertension: Option<bool>,
    pub osteoporosis: Option<bool>,
    pub surgeries: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labs {
    pub cholesterol: Option<f64>,
    pub hdl: Option<f64>,
    pub ldl: Option<f64>,
    pub triglycerides: Option<f64>,
    pub glucose: Option<f64>,
    pub hba1c: Option<f64>,
    pub creatinine: Option<f64>,
    pub egfr: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentRiskScores {
    pub ascvd: Option<f64>,
    pub framingham: Option<f64>,
    pub frax: Option<f64>,
    pub gail_tyrer: Option<f64>,
    pub wells: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContraindicationSensitivity {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub contraindication_sensitivity: Option<ContraindicationSensitivity>,
    pub locale: Option<String>,
}

/// The assessment the offline rule engine builds a plan from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientAssessment {
    pub age: Option<f64>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub bmi: Option<f64>,
    pub symptoms: Symptoms,
    pub history: MedicalHistory,
    pub current_medications: Option<Vec<String>>,
    pub allergies: Vec<String>,
    pub medicine_type: Option<String>,
    pub labs: Labs,
    pub risk_scores: AssessmentRiskScores,
    pub preferences: Preferences,
}

impl PatientAssessment {
    pub fn medications(&self) -> &[String] {
        self.current_medications.as_deref().unwrap_or(&[])
    }
}

/// Outcome of checking an assessment for required and recommended fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentValidation {
    pub is_valid: bool,
    pub missing_required: Vec<String>,
    /// At most one required field is missing.
    pub can_proceed_with_caveats: bool,
    pub warnings: Vec<String>,
}
