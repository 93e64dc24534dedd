//! Content fingerprint of a treatment plan.
//!
//! Two plans generated from the same assessment and knowledge differ in
//! `plan_id`, `timestamp` and `evaluation_time_ms`. The fingerprint covers
//! everything else that a clinician would read, so equal fingerprints mean
//! equal advice.

use serde::Serialize;
use sha2::{Digest, Sha256};

use mht_contracts::{
    error::{MhtError, MhtResult},
    plan::{PlanFlags, PlanRecommendation, TreatmentPlan},
    rule::GuidelineSource,
};

#[derive(Serialize)]
struct PlanContent<'a> {
    recommendations: &'a [PlanRecommendation],
    summary: &'a str,
    flags: &'a PlanFlags,
    general_plan: &'a [String; 3],
    specific_options: &'a [PlanRecommendation],
    rules_matched: &'a [String],
    evidence_used: &'a [GuidelineSource],
    knowledge_version: &'a str,
}

/// SHA-256 (lowercase hex) over the deterministic content of `plan`.
pub fn fingerprint_plan(plan: &TreatmentPlan) -> MhtResult<String> {
    let content = PlanContent {
        recommendations: &plan.recommendations,
        summary: &plan.summary,
        flags: &plan.flags,
        general_plan: &plan.general_plan,
        specific_options: &plan.specific_options,
        rules_matched: &plan.audit_trail.rules_matched,
        evidence_used: &plan.audit_trail.evidence_used,
        knowledge_version: &plan.audit_trail.knowledge_version,
    };
    let bytes = serde_json::to_vec(&content).map_err(|e| MhtError::Serialization {
        reason: format!("plan content could not be serialized: {}", e),
    })?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
