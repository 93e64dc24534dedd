//! The Knowledge Store: every rule collection the engines consult.
//!
//! A `KnowledgeStore` is built once (by a `KnowledgeLoader`) and shared
//! read-only for the life of the process. Nothing in it is mutated by
//! evaluation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rule::{ClinicalRule, GuidelineSource};

/// One stage of the decision pipeline, as named in the precedence list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AbsoluteContraindications,
    InteractionsHigh,
    RiskHigh,
    RiskModerate,
    #[serde(alias = "symptom_guided")]
    PreferenceGuided,
}

impl Stage {
    pub const DEFAULT_PRECEDENCE: [Stage; 5] = [
        Stage::AbsoluteContraindications,
        Stage::InteractionsHigh,
        Stage::RiskHigh,
        Stage::RiskModerate,
        Stage::PreferenceGuided,
    ];
}

/// Fallback texts used when no rule produced a headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDefaults {
    pub insufficient_data: String,
    pub preference_guided: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContraindicationKind {
    Absolute,
    Relative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contraindication {
    pub id: String,
    /// Condition identifier matched against `TreatmentInputs::conditions`.
    pub condition: String,
    #[serde(rename = "type")]
    pub kind: ContraindicationKind,
    pub message: String,
    /// Treatments the rule applies to. Empty means every treatment.
    #[serde(default)]
    pub treatments: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionSeverity {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionAction {
    Avoid,
    Monitor,
    Counsel,
}

/// An undirected drug-drug interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub drug_a: String,
    pub drug_b: String,
    pub severity: InteractionSeverity,
    pub action: InteractionAction,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighLowCutoffs {
    pub high: f64,
    pub low: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighCutoff {
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevatedCutoff {
    pub elevated_5yr: f64,
}

/// Cutoffs the risk-threshold stages compare resolved scores against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    #[serde(rename = "ASCVD")]
    pub ascvd: HighLowCutoffs,
    #[serde(rename = "FRAX_major")]
    pub frax_major: HighCutoff,
    #[serde(rename = "GAIL_5yr")]
    pub gail_5yr: ElevatedCutoff,
    #[serde(rename = "WELLS_VTE")]
    pub wells: HighCutoff,
}

/// Alternatives and monitoring attached to a threshold crossing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdAction {
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub monitoring: Vec<String>,
}

impl ThresholdAction {
    /// Headline text for the crossing: the alternatives joined with `"; "`.
    pub fn message(&self) -> String {
        self.alternatives.join("; ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlatSeverity {
    Major,
    Moderate,
    Minor,
}

impl FlatSeverity {
    pub fn as_upper(&self) -> &'static str {
        match self {
            FlatSeverity::Major => "MAJOR",
            FlatSeverity::Moderate => "MODERATE",
            FlatSeverity::Minor => "MINOR",
        }
    }
}

/// Entry of the flat interaction table scanned by the offline engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatInteraction {
    pub drug1: String,
    pub drug2: String,
    pub severity: FlatSeverity,
    pub description: String,
}

/// Rule data for the offline plan generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfflinePack {
    pub version: String,
    pub sources: Vec<GuidelineSource>,
    pub rules: Vec<ClinicalRule>,
    pub interactions: Vec<FlatInteraction>,
}

/// All knowledge collections, loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeStore {
    pub version: String,
    pub precedence: Vec<Stage>,
    pub defaults: KnowledgeDefaults,
    pub contraindications: Vec<Contraindication>,
    pub interactions: Vec<Interaction>,
    pub risk_thresholds: RiskThresholds,
    /// Keyed by action id, e.g. `ASCVD_high`.
    pub threshold_actions: BTreeMap<String, ThresholdAction>,
    pub pack: OfflinePack,
}

impl KnowledgeStore {
    pub fn threshold_action(&self, id: &str) -> Option<&ThresholdAction> {
        self.threshold_actions.get(id)
    }
}
