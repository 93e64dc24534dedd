//! Decision-engine output types.
//!
//! A `TreatmentRecommendation` is built once per `evaluate` call and never
//! mutated afterwards. Its `fired_rules` sequence is the audit trace: every
//! rule that matched, in the order the pipeline reached it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{inputs::TreatmentInputs, risk::ScoreKind};

/// The knowledge document a fired rule originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeCollection {
    Contraindications,
    Interactions,
    Thresholds,
}

impl KnowledgeCollection {
    /// File name of the bundled document backing this collection.
    pub fn file_name(&self) -> &'static str {
        match self {
            KnowledgeCollection::Contraindications => "contraindications.toml",
            KnowledgeCollection::Interactions => "interactions.toml",
            KnowledgeCollection::Thresholds => "thresholds.toml",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Contraindication,
    Interaction,
    RiskThreshold,
    Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Absolute,
    Relative,
    High,
    Moderate,
    Low,
}

/// Immutable record of a rule that matched during one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredRule {
    pub id: String,
    pub description: String,
    pub collection: KnowledgeCollection,
    pub category: RuleCategory,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    Strong,
    Conditional,
    #[serde(rename = "Not recommended")]
    NotRecommended,
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Strong => f.write_str("Strong"),
            Strength::Conditional => f.write_str("Conditional"),
            Strength::NotRecommended => f.write_str("Not recommended"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryRecommendation {
    pub text: String,
    pub strength: Strength,
}

/// A disagreement between an external and a locally computed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreConflict {
    pub score: ScoreKind,
    pub external: f64,
    pub computed: f64,
    /// Relative difference in percent, rounded to one decimal.
    pub difference: f64,
}

/// The single result object returned by `DecisionEngine::evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentRecommendation {
    /// Echo of the inputs the recommendation was computed from.
    pub summary_inputs: TreatmentInputs,
    pub fired_rules: Vec<FiredRule>,
    pub primary_recommendation: PrimaryRecommendation,
    /// Insertion-ordered, duplicate-free.
    pub alternatives: Vec<String>,
    /// Insertion-ordered, duplicate-free.
    pub monitoring: Vec<String>,
    pub clinician_review_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_score_conflicts: Vec<ScoreConflict>,
}

impl TreatmentRecommendation {
    /// True if a rule with `id` appears in the fired trace.
    pub fn fired(&self, id: &str) -> bool {
        self.fired_rules.iter().any(|r| r.id == id)
    }
}
