//! Plan verifier for the offline rule engine.
//!
//! `SchemaPlanVerifier` implements the `PlanVerifier` trait from `mht-core`.
//! Verification runs in two phases:
//!
//! 1. **Structural**: the serialized plan is validated against
//!    [`plan_schema`](crate::schema::plan_schema) using the `jsonschema` crate.
//! 2. **Business rules**: checks on the typed plan that a schema cannot
//!    express. All failures are collected before returning.
//!
//! Recommendations flagged `requires_more_data` are exempt from the urgent
//! confidence floor: their confidence has already been scaled down for the
//! incomplete assessment.

use tracing::{debug, warn};

use mht_contracts::{
    error::{MhtError, MhtResult},
    plan::{ActionCategory, PlanRecommendation, TreatmentPlan},
    verify::{VerificationFailure, VerificationReport},
};
use mht_core::traits::PlanVerifier;

use crate::schema::plan_schema;

pub use mht_contracts::plan::URGENT_CONFIDENCE_FLOOR;

/// Default cap on `specific_options`.
pub const DEFAULT_MAX_SPECIFIC_OPTIONS: usize = 5;

pub struct SchemaPlanVerifier {
    schema: serde_json::Value,
    max_specific_options: usize,
}

impl SchemaPlanVerifier {
    pub fn new() -> Self {
        Self {
            schema: plan_schema(),
            max_specific_options: DEFAULT_MAX_SPECIFIC_OPTIONS,
        }
    }

    /// Use a different cap on specific options, typically
    /// `EngineConfig::specific_options_limit`.
    pub fn with_max_specific_options(mut self, max: usize) -> Self {
        self.max_specific_options = max;
        self
    }

    /// Replace the structural schema. A `Null` schema skips phase 1.
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = schema;
        self
    }

    // ── Phase 1 ───────────────────────────────────────────────────────────────

    fn check_structure(&self, payload: &serde_json::Value, failures: &mut Vec<VerificationFailure>) {
        if self.schema.is_null() {
            return;
        }

        match jsonschema::validator_for(&self.schema) {
            Ok(validator) => {
                for error in validator.iter_errors(payload) {
                    let message = format!(
                        "JSON Schema violation at {}: {}",
                        error.instance_path, error
                    );
                    warn!(%message, "structural validation failure");
                    failures.push(failure("json-schema", message));
                }
            }
            Err(e) => {
                let message = format!("invalid JSON Schema document: {e}");
                warn!(%message, "schema compilation failure");
                failures.push(failure("json-schema", message));
            }
        }
    }

    // ── Phase 2 ───────────────────────────────────────────────────────────────

    fn check_rules(&self, plan: &TreatmentPlan, failures: &mut Vec<VerificationFailure>) {
        for (idx, line) in plan.general_plan.iter().enumerate() {
            if line.trim().is_empty() {
                failures.push(failure(
                    "general-plan-lines",
                    format!("general plan line {} is empty", idx + 1),
                ));
            }
        }

        let all = plan
            .recommendations
            .iter()
            .map(|r| ("recommendations", r))
            .chain(plan.specific_options.iter().map(|r| ("specific_options", r)));
        for (list, rec) in all {
            if !(0.0..=1.0).contains(&rec.confidence) {
                failures.push(failure(
                    "confidence-range",
                    format!(
                        "{list} entry '{}' has confidence {} outside [0, 1]",
                        rec.text, rec.confidence
                    ),
                ));
            }
        }

        for rec in plan.recommendations.iter().filter(|r| below_urgent_floor(r)) {
            failures.push(failure(
                "urgent-confidence-floor",
                format!(
                    "urgent recommendation '{}' has confidence {} below {}",
                    rec.text, rec.confidence, URGENT_CONFIDENCE_FLOOR
                ),
            ));
        }

        let has_urgent = plan
            .recommendations
            .iter()
            .any(|r| r.category == ActionCategory::Urgent);
        if plan.flags.urgent != has_urgent {
            failures.push(failure(
                "urgent-flag",
                format!(
                    "flags.urgent is {} but the plan {} an urgent recommendation",
                    plan.flags.urgent,
                    if has_urgent { "contains" } else { "has no" }
                ),
            ));
        }

        if plan.specific_options.len() > self.max_specific_options {
            failures.push(failure(
                "specific-options-limit",
                format!(
                    "{} specific options exceed the limit of {}",
                    plan.specific_options.len(),
                    self.max_specific_options
                ),
            ));
        }

        for rec in plan
            .specific_options
            .iter()
            .filter(|r| !r.category.is_specific_option())
        {
            failures.push(failure(
                "specific-options-category",
                format!(
                    "specific option '{}' has category {:?}, expected NonPharm or Pharm",
                    rec.text, rec.category
                ),
            ));
        }
    }
}

impl Default for SchemaPlanVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanVerifier for SchemaPlanVerifier {
    /// Verify `plan`, accumulating every failure into one report.
    ///
    /// `Err` only when the plan cannot be serialized for the structural check.
    fn verify(&self, plan: &TreatmentPlan) -> MhtResult<VerificationReport> {
        let payload = serde_json::to_value(plan).map_err(|e| MhtError::Serialization {
            reason: format!("plan could not be serialized for verification: {}", e),
        })?;

        let mut failures = Vec::new();
        self.check_structure(&payload, &mut failures);
        self.check_rules(plan, &mut failures);

        for f in &failures {
            warn!(plan_id = %plan.plan_id, rule_id = %f.rule_id, message = %f.message, "plan check failed");
        }

        let report = VerificationReport::from_failures(failures);
        debug!(
            plan_id = %plan.plan_id,
            passed = report.passed,
            failure_count = report.failures.len(),
            "verification complete"
        );
        Ok(report)
    }
}

fn below_urgent_floor(rec: &PlanRecommendation) -> bool {
    rec.category == ActionCategory::Urgent
        && !rec.requires_more_data
        && rec.confidence < URGENT_CONFIDENCE_FLOOR
}

fn failure(rule_id: &str, message: String) -> VerificationFailure {
    VerificationFailure {
        rule_id: rule_id.to_string(),
        message,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
