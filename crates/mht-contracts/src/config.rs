//! Tunable engine parameters.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Relative difference, in percent, above which an external and a
    /// computed score are reported as conflicting.
    pub conflict_threshold_pct: f64,

    /// Compute absent risk scores locally before the threshold stages.
    pub compute_missing_scores: bool,

    /// Multiplier applied to rule confidence when the assessment is missing
    /// required fields.
    pub incomplete_data_confidence_factor: f64,

    /// Maximum number of pharmacological / non-pharmacological options
    /// listed in a plan.
    pub specific_options_limit: usize,

    /// Number of most recent plans kept by the plan repository.
    pub max_saved_plans: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conflict_threshold_pct: 5.0,
            compute_missing_scores: false,
            incomplete_data_confidence_factor: 0.7,
            specific_options_limit: 5,
            max_saved_plans: 50,
        }
    }
}
