//! Offline condition/action rules.
//!
//! A `ClinicalRule` pairs a typed `Condition` tree with the recommendation
//! it contributes when the condition holds. Field references are a closed
//! `FieldPath` enum rather than free-form strings, so a rule that names a
//! field the assessment does not have fails at load time, not at
//! evaluation time.
//!
//! TOML shape:
//! ```toml
//! [[rules]]
//! id = "rule-hrt-vte-contraindication"
//! condition = { all = [
//!     { field = "medicine_type", op = "equals", value = "HRT" },
//!     { field = "history.vte", op = "equals", value = true },
//! ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::plan::ActionCategory;

/// An addressable field of a `PatientAssessment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldPath {
    #[serde(rename = "age")]
    Age,
    #[serde(rename = "gender")]
    Gender,
    #[serde(rename = "weight")]
    Weight,
    #[serde(rename = "height")]
    Height,
    #[serde(rename = "bmi")]
    Bmi,
    #[serde(rename = "symptoms.severity")]
    SymptomSeverity,
    #[serde(rename = "symptoms.vasomotor_symptoms")]
    VasomotorSymptoms,
    #[serde(rename = "symptoms.sleep_disturbances")]
    SleepDisturbances,
    #[serde(rename = "symptoms.mood_changes")]
    MoodChanges,
    #[serde(rename = "symptoms.vaginal_dryness")]
    VaginalDryness,
    #[serde(rename = "history.vte")]
    HistoryVte,
    #[serde(rename = "history.breast_cancer_active")]
    HistoryBreastCancerActive,
    #[serde(rename = "history.breast_cancer_history")]
    HistoryBreastCancer,
    #[serde(rename = "history.cardiovascular")]
    HistoryCardiovascular,
    #[serde(rename = "history.diabetes")]
    HistoryDiabetes,
    #[serde(rename = "history.hypertension")]
    HistoryHypertension,
    #[serde(rename = "history.osteoporosis")]
    HistoryOsteoporosis,
    #[serde(rename = "history.surgeries")]
    HistorySurgeries,
    #[serde(rename = "current_medications")]
    CurrentMedications,
    #[serde(rename = "allergies")]
    Allergies,
    #[serde(rename = "medicine_type")]
    MedicineType,
    #[serde(rename = "labs.cholesterol")]
    LabCholesterol,
    #[serde(rename = "labs.hdl")]
    LabHdl,
    #[serde(rename = "labs.ldl")]
    LabLdl,
    #[serde(rename = "labs.triglycerides")]
    LabTriglycerides,
    #[serde(rename = "labs.glucose")]
    LabGlucose,
    #[serde(rename = "labs.hba1c")]
    LabHba1c,
    #[serde(rename = "labs.creatinine")]
    LabCreatinine,
    #[serde(rename = "labs.egfr")]
    LabEgfr,
    #[serde(rename = "risk_scores.ascvd")]
    RiskAscvd,
    #[serde(rename = "risk_scores.framingham")]
    RiskFramingham,
    #[serde(rename = "risk_scores.frax")]
    RiskFrax,
    #[serde(rename = "risk_scores.gail_tyrer")]
    RiskGailTyrer,
    #[serde(rename = "risk_scores.wells")]
    RiskWells,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    GreaterThan,
    LessThan,
    Contains,
}

/// A constant on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub field: FieldPath,
    pub op: Operator,
    pub value: Literal,
}

/// A boolean expression over assessment fields.
///
/// `All` of an empty list holds; `Any` of an empty list does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    All { all: Vec<Condition> },
    Any { any: Vec<Condition> },
    Compare(Comparison),
}

/// A citation backing a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineSource {
    pub title: String,
    pub url: String,
    pub version: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Guideline,
    Study,
    Interaction,
}

/// What a matched rule contributes to the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    pub category: ActionCategory,
    pub text: String,
    pub rationale: String,
    #[serde(default)]
    pub evidence: Vec<GuidelineSource>,
    /// Lower is more important.
    pub priority: u32,
    pub confidence: f64,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub interactions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRule {
    pub id: String,
    pub condition: Condition,
    pub action: RuleAction,
}
