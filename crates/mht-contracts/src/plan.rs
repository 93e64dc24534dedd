//! Offline treatment plan output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{assessment::PatientAssessment, rule::GuidelineSource};

/// Lowest confidence an `Urgent` recommendation may carry, unless it was
/// scaled down for an incomplete assessment.
pub const URGENT_CONFIDENCE_FLOOR: f64 = 0.9;

/// Recommendation category. The derived ordering is the display ordering:
/// `Urgent` sorts first, `Lifestyle` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionCategory {
    Urgent,
    Refer,
    Pharm,
    NonPharm,
    Lifestyle,
}

impl ActionCategory {
    /// True for the categories listed as specific treatment options.
    pub fn is_specific_option(&self) -> bool {
        matches!(self, ActionCategory::Pharm | ActionCategory::NonPharm)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecommendation {
    #[serde(rename = "type")]
    pub category: ActionCategory,
    pub priority: u32,
    pub text: String,
    pub rationale: String,
    pub evidence: Vec<GuidelineSource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contraindications: Vec<String>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interactions: Vec<String>,
    #[serde(default)]
    pub requires_more_data: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFlags {
    pub urgent: bool,
    pub contraindicated: Vec<String>,
    pub missing_data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    pub rules_matched: Vec<String>,
    /// Deduplicated by (title, version); first occurrence kept.
    pub evidence_used: Vec<GuidelineSource>,
    pub evaluation_time_ms: u64,
    pub knowledge_version: String,
}

/// A complete offline plan.
///
/// `general_plan` always holds exactly three lines: lifestyle, an
/// urgency-dependent action, and follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    pub plan_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub input_snapshot: PatientAssessment,
    pub recommendations: Vec<PlanRecommendation>,
    pub summary: String,
    pub flags: PlanFlags,
    pub general_plan: [String; 3],
    pub specific_options: Vec<PlanRecommendation>,
    pub audit_trail: AuditTrail,
}
