//! Patient snapshot consumed by the decision engine and the risk resolver.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::risk::{Provenance, Race, ScoreKind, Sex};

/// A risk score supplied by the caller together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProvidedScore {
    pub value: f64,
    #[serde(default)]
    pub source: Provenance,
}

impl ProvidedScore {
    pub fn external(value: f64) -> Self {
        Self { value, source: Provenance::External }
    }

    pub fn computed(value: f64) -> Self {
        Self { value, source: Provenance::Computed }
    }
}

/// Caller-supplied risk scores, one optional slot per `ScoreKind`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskScores {
    #[serde(rename = "ASCVD", skip_serializing_if = "Option::is_none")]
    pub ascvd: Option<ProvidedScore>,
    #[serde(rename = "Framingham", skip_serializing_if = "Option::is_none")]
    pub framingham: Option<ProvidedScore>,
    #[serde(rename = "FRAX_major", skip_serializing_if = "Option::is_none")]
    pub frax_major: Option<ProvidedScore>,
    #[serde(rename = "FRAX_hip", skip_serializing_if = "Option::is_none")]
    pub frax_hip: Option<ProvidedScore>,
    #[serde(rename = "GAIL_5yr", skip_serializing_if = "Option::is_none")]
    pub gail_5yr: Option<ProvidedScore>,
    #[serde(rename = "Wells", skip_serializing_if = "Option::is_none")]
    pub wells: Option<ProvidedScore>,
}

impl RiskScores {
    pub fn get(&self, kind: ScoreKind) -> Option<ProvidedScore> {
        match kind {
            ScoreKind::Ascvd => self.ascvd,
            ScoreKind::Framingham => self.framingham,
            ScoreKind::FraxMajor => self.frax_major,
            ScoreKind::FraxHip => self.frax_hip,
            ScoreKind::Gail5yr => self.gail_5yr,
            ScoreKind::Wells => self.wells,
        }
    }

    pub fn set(&mut self, kind: ScoreKind, score: Option<ProvidedScore>) {
        let slot = match kind {
            ScoreKind::Ascvd => &mut self.ascvd,
            ScoreKind::Framingham => &mut self.framingham,
            ScoreKind::FraxMajor => &mut self.frax_major,
            ScoreKind::FraxHip => &mut self.frax_hip,
            ScoreKind::Gail5yr => &mut self.gail_5yr,
            ScoreKind::Wells => &mut self.wells,
        };
        *slot = score;
    }
}

/// Fracture risk factors used by FRAX. Absent means "not present".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractureFactors {
    pub previous_fracture: Option<bool>,
    pub parental_hip_fracture: Option<bool>,
    pub glucocorticoids: Option<bool>,
    pub rheumatoid_arthritis: Option<bool>,
    pub secondary_osteoporosis: Option<bool>,
    pub alcohol_3_units: Option<bool>,
}

/// Wells VTE findings. Each slot distinguishes "absent" from "not recorded".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellsFindings {
    pub active_cancer: Option<bool>,
    pub paralysis_paresis: Option<bool>,
    pub recently_bedridden: Option<bool>,
    pub major_surgery: Option<bool>,
    pub localized_tenderness: Option<bool>,
    pub entire_leg_swollen: Option<bool>,
    pub calf_swelling: Option<bool>,
    pub pitting_edema: Option<bool>,
    pub collateral_veins: Option<bool>,
    pub alternative_diagnosis: Option<bool>,
}

/// Reproductive and family history used by the Gail model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreastHistory {
    pub age_menarche: Option<f64>,
    /// Age at first live birth; `0` means nulliparous.
    pub age_first_birth: Option<f64>,
    pub num_relatives: Option<u32>,
    pub num_biopsies: Option<u32>,
    pub atypical_hyperplasia: Option<bool>,
}

/// Raw clinical measurements the calculators draw from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalFactors {
    pub race: Option<Race>,
    pub smoking_status: Option<bool>,
    pub systolic_bp: Option<f64>,
    pub total_cholesterol: Option<f64>,
    pub hdl_cholesterol: Option<f64>,
    pub diabetes: Option<bool>,
    pub hypertension_treatment: Option<bool>,
    pub family_history_mi: Option<bool>,
    pub fracture: FractureFactors,
    pub wells: WellsFindings,
    pub breast: BreastHistory,
}

/// Everything a calculator may need, detached from treatment selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskInputs {
    pub age: Option<f64>,
    pub sex: Option<Sex>,
    #[serde(flatten)]
    pub clinical: ClinicalFactors,
}

/// A patient snapshot for one `evaluate` call.
///
/// `current_medications` order carries no meaning. `conditions` holds
/// identifiers such as `pregnancy` or `uncontrolled_hypertension`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentInputs {
    pub age: Option<f64>,
    pub sex: Option<Sex>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub risk_scores: RiskScores,
    pub clinical: ClinicalFactors,
    pub selected_medicine: String,
    pub current_medications: Vec<String>,
    pub conditions: BTreeSet<String>,
}

impl TreatmentInputs {
    /// Project the fields the risk calculators read.
    pub fn risk_inputs(&self) -> RiskInputs {
        RiskInputs {
            age: self.age,
            sex: self.sex,
            clinical: self.clinical.clone(),
        }
    }

    pub fn has_selected_treatment(&self) -> bool {
        !self.selected_medicine.trim().is_empty()
    }
}
