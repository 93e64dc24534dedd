//! Reconciliation of locally computed scores with externally supplied ones.
//!
//! Resolution rules, applied per score:
//!
//! 1. No external value → the computed score is returned unchanged.
//! 2. Computed score unavailable, external present → the external value,
//!    keeping the calculator's missing-field list for context.
//! 3. Both present → the external value always wins. If the relative
//!    difference `|e - c| / max(e, c)` exceeds the threshold, the result is a
//!    `Conflict` carrying both values and confidence drops to `medium`.

use tracing::{debug, warn};

use mht_contracts::{
    inputs::{ProvidedScore, RiskInputs, RiskScores},
    risk::{Confidence, Provenance, Resolution, RiskScore, RiskScoreWithConflict, ScoreKind},
};

use crate::{ascvd, category, framingham, frax, gail, round_to, wells};

/// Default relative difference, in percent, that counts as a conflict.
pub const DEFAULT_CONFLICT_THRESHOLD_PCT: f64 = 5.0;

/// Computes and reconciles risk scores.
#[derive(Debug, Clone, Copy)]
pub struct RiskResolver {
    conflict_threshold_pct: f64,
}

impl Default for RiskResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CONFLICT_THRESHOLD_PCT)
    }
}

impl RiskResolver {
    pub fn new(conflict_threshold_pct: f64) -> Self {
        Self { conflict_threshold_pct }
    }

    pub fn conflict_threshold_pct(&self) -> f64 {
        self.conflict_threshold_pct
    }

    /// Run the calculator for `kind` against `inputs`.
    pub fn compute(&self, kind: ScoreKind, inputs: &RiskInputs) -> RiskScore {
        match kind {
            ScoreKind::Ascvd => ascvd::compute(inputs),
            ScoreKind::Framingham => framingham::compute(inputs),
            ScoreKind::FraxMajor => frax::compute_major(inputs),
            ScoreKind::FraxHip => frax::compute_hip(inputs),
            ScoreKind::Gail5yr => gail::compute(inputs),
            ScoreKind::Wells => wells::compute(inputs),
        }
    }

    /// Compute `kind` locally and reconcile it with `external`, if any.
    pub fn resolve(
        &self,
        kind: ScoreKind,
        inputs: &RiskInputs,
        external: Option<f64>,
    ) -> RiskScoreWithConflict {
        self.reconcile(kind, self.compute(kind, inputs), external)
    }

    /// Resolve a caller-supplied score according to its provenance.
    ///
    /// `external` scores are checked against a local computation. `computed`
    /// scores are trusted as given. An absent score is computed locally.
    pub fn resolve_provided(
        &self,
        kind: ScoreKind,
        inputs: &RiskInputs,
        provided: Option<ProvidedScore>,
    ) -> RiskScoreWithConflict {
        match provided {
            Some(ProvidedScore { value, source: Provenance::External }) => {
                self.resolve(kind, inputs, Some(value))
            }
            Some(ProvidedScore { value, source: Provenance::Computed }) => RiskScoreWithConflict {
                kind,
                resolution: Resolution::Computed { value },
                confidence: Confidence::High,
                missing_fields: Vec::new(),
                category: Some(category(kind, value).to_string()),
            },
            None => self.resolve(kind, inputs, None),
        }
    }

    /// Resolve every score kind, in `ScoreKind::ALL` order.
    pub fn resolve_panel(
        &self,
        inputs: &RiskInputs,
        provided: &RiskScores,
    ) -> Vec<RiskScoreWithConflict> {
        ScoreKind::ALL
            .iter()
            .map(|&kind| self.resolve_provided(kind, inputs, provided.get(kind)))
            .collect()
    }

    /// Reconcile an already computed score with an optional external value.
    pub fn reconcile(
        &self,
        kind: ScoreKind,
        computed: RiskScore,
        external: Option<f64>,
    ) -> RiskScoreWithConflict {
        let Some(external) = external else {
            let resolution = if computed.is_available() {
                Resolution::Computed { value: computed.value }
            } else {
                Resolution::Unavailable
            };
            return RiskScoreWithConflict {
                kind,
                resolution,
                confidence: computed.confidence,
                missing_fields: computed.missing_fields,
                category: computed.category,
            };
        };

        if !computed.is_available() {
            debug!(score = %kind, external, "no local value; using external score");
            return RiskScoreWithConflict {
                kind,
                resolution: Resolution::External {
                    value: external,
                    computed_value: None,
                },
                confidence: computed.confidence,
                missing_fields: computed.missing_fields,
                category: computed.category,
            };
        }

        let difference = (external - computed.value).abs();
        let denominator = external.max(computed.value);
        let percentage = if denominator > 0.0 {
            difference / denominator * 100.0
        } else {
            0.0
        };

        if percentage > self.conflict_threshold_pct {
            let conflict_percentage = round_to(percentage, 1);
            warn!(
                score = %kind,
                external,
                computed = computed.value,
                conflict_percentage,
                "external and computed risk scores disagree"
            );
            RiskScoreWithConflict {
                kind,
                resolution: Resolution::Conflict {
                    value: external,
                    computed_value: computed.value,
                    external_value: external,
                    conflict_percentage,
                },
                confidence: Confidence::Medium,
                missing_fields: computed.missing_fields,
                category: computed.category,
            }
        } else {
            RiskScoreWithConflict {
                kind,
                resolution: Resolution::External {
                    value: external,
                    computed_value: Some(computed.value),
                },
                confidence: computed.confidence,
                missing_fields: computed.missing_fields,
                category: computed.category,
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
