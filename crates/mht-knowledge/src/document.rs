//! On-disk shapes of the four knowledge documents.
//!
//! These mirror the TOML files one to one. The loader converts them into a
//! `KnowledgeStore`, resolving evidence references and rejecting documents
//! that are inconsistent with each other.
//!
//! Example (`offline_pack.toml`):
//! ```toml
//! version = "1.0.0"
//!
//! [[sources]]
//! id = "nams-2022"
//! title = "NAMS 2022 Hormone Therapy Position Statement"
//! url = "https://www.menopause.org/"
//! version = "2022"
//! date = "2022-01-01"
//! type = "guideline"
//!
//! [[rules]]
//! id = "rule-hrt-vte-contraindication"
//!
//! [rules.condition]
//! all = [
//!     { field = "medicine_type", op = "equals", value = "HRT" },
//!     { field = "history.vte", op = "equals", value = true },
//! ]
//!
//! [rules.action]
//! category = "Urgent"
//! text = "HRT is contraindicated due to prior VTE."
//! rationale = "VTE history increases thrombosis risk."
//! evidence = ["nams-2022"]
//! priority = 1
//! confidence = 0.95
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use mht_contracts::{
    knowledge::{
        Contraindication, FlatInteraction, Interaction, KnowledgeDefaults, RiskThresholds, Stage,
        ThresholdAction,
    },
    plan::ActionCategory,
    rule::{Condition, GuidelineSource},
};

/// `contraindications.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContraindicationsDocument {
    #[serde(default)]
    pub contraindications: Vec<Contraindication>,
}

/// `interactions.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InteractionsDocument {
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// `thresholds.toml`: cutoffs, their actions, and the pipeline settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsDocument {
    /// Version of the whole knowledge set.
    pub version: String,
    #[serde(default = "default_precedence")]
    pub precedence: Vec<Stage>,
    pub defaults: KnowledgeDefaults,
    pub risk_thresholds: RiskThresholds,
    /// Keyed by action id, e.g. `ASCVD_high`.
    #[serde(default)]
    pub actions: BTreeMap<String, ThresholdAction>,
}

fn default_precedence() -> Vec<Stage> {
    Stage::DEFAULT_PRECEDENCE.to_vec()
}

/// `offline_pack.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OfflinePackDocument {
    pub version: String,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
    #[serde(default)]
    pub interactions: Vec<FlatInteraction>,
}

/// A citable source with the id rules use to reference it.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub id: String,
    #[serde(flatten)]
    pub source: GuidelineSource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    pub id: String,
    pub condition: Condition,
    pub action: RuleActionEntry,
}

/// Like `RuleAction`, but evidence is a list of source ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleActionEntry {
    pub category: ActionCategory,
    pub text: String,
    pub rationale: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    pub priority: u32,
    pub confidence: f64,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub interactions: Vec<String>,
}
