//! Interpreter for offline rule conditions.
//!
//! The interpreter is total: a field that is absent, or whose type does not
//! fit the operator, makes its comparison false. Nothing here can fail.

use mht_contracts::{
    assessment::PatientAssessment,
    rule::{Comparison, Condition, FieldPath, Literal, Operator},
};

/// A resolved assessment field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Bool(bool),
    Text(&'a str),
    List(&'a [String]),
}

/// Look up `field` in `assessment`. `None` when the field is not recorded.
pub fn resolve(field: FieldPath, assessment: &PatientAssessment) -> Option<FieldValue<'_>> {
    use FieldValue::{Bool, List, Number, Text};

    let a = assessment;
    match field {
        FieldPath::Age => a.age.map(Number),
        FieldPath::Gender => a.gender.as_deref().map(Text),
        FieldPath::Weight => a.weight.map(Number),
        FieldPath::Height => a.height.map(Number),
        FieldPath::Bmi => a.bmi.map(Number),
        FieldPath::SymptomSeverity => a.symptoms.severity.map(Number),
        FieldPath::VasomotorSymptoms => a.symptoms.vasomotor_symptoms.map(Number),
        FieldPath::SleepDisturbances => a.symptoms.sleep_disturbances.map(Number),
        FieldPath::MoodChanges => a.symptoms.mood_changes.map(Number),
        FieldPath::VaginalDryness => a.symptoms.vaginal_dryness.map(Number),
        FieldPath::HistoryVte => a.history.vte.map(Bool),
        FieldPath::HistoryBreastCancerActive => a.history.breast_cancer_active.map(Bool),
        FieldPath::HistoryBreastCancer => a.history.breast_cancer_history.map(Bool),
        FieldPath::HistoryCardiovascular => a.history.cardiovascular.map(Bool),
        FieldPath::HistoryDiabetes => a.history.diabetes.map(Bool),
        FieldPath::HistoryHypertension => a.history.hypertension.map(Bool),
        FieldPath::HistoryOsteoporosis => a.history.osteoporosis.map(Bool),
        FieldPath::HistorySurgeries => a.history.surgeries.as_deref().map(List),
        FieldPath::CurrentMedications => a.current_medications.as_deref().map(List),
        FieldPath::Allergies => Some(List(&a.allergies)),
        FieldPath::MedicineType => a.medicine_type.as_deref().map(Text),
        FieldPath::LabCholesterol => a.labs.cholesterol.map(Number),
        FieldPath::LabHdl => a.labs.hdl.map(Number),
        FieldPath::LabLdl => a.labs.ldl.map(Number),
        FieldPath::LabTriglycerides => a.labs.triglycerides.map(Number),
        FieldPath::LabGlucose => a.labs.glucose.map(Number),
        FieldPath::LabHba1c => a.labs.hba1c.map(Number),
        FieldPath::LabCreatinine => a.labs.creatinine.map(Number),
        FieldPath::LabEgfr => a.labs.egfr.map(Number),
        FieldPath::RiskAscvd => a.risk_scores.ascvd.map(Number),
        FieldPath::RiskFramingham => a.risk_scores.framingham.map(Number),
        FieldPath::RiskFrax => a.risk_scores.frax.map(Number),
        FieldPath::RiskGailTyrer => a.risk_scores.gail_tyrer.map(Number),
        FieldPath::RiskWells => a.risk_scores.wells.map(Number),
    }
}

/// Evaluate a condition tree against an assessment.
pub fn evaluate(condition: &Condition, assessment: &PatientAssessment) -> bool {
    match condition {
        Condition::All { all } => all.iter().all(|c| evaluate(c, assessment)),
        Condition::Any { any } => any.iter().any(|c| evaluate(c, assessment)),
        Condition::Compare(comparison) => compare(comparison, assessment),
    }
}

fn compare(comparison: &Comparison, assessment: &PatientAssessment) -> bool {
    let Some(actual) = resolve(comparison.field, assessment) else {
        return false;
    };

    // Text comparisons ignore ASCII case.
    match (comparison.op, actual, &comparison.value) {
        (Operator::Equals, FieldValue::Number(n), Literal::Number(l)) => n == *l,
        (Operator::Equals, FieldValue::Bool(b), Literal::Bool(l)) => b == *l,
        (Operator::Equals, FieldValue::Text(t), Literal::Text(l)) => t.eq_ignore_ascii_case(l),
        (Operator::GreaterThan, FieldValue::Number(n), Literal::Number(l)) => n > *l,
        (Operator::LessThan, FieldValue::Number(n), Literal::Number(l)) => n < *l,
        (Operator::Contains, FieldValue::List(items), Literal::Text(l)) => {
            items.iter().any(|item| item.eq_ignore_ascii_case(l))
        }
        (Operator::Contains, FieldValue::Text(t), Literal::Text(l)) => {
            t.to_ascii_lowercase().contains(&l.to_ascii_lowercase())
        }
        _ => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
