//! Offline plan generator.
//!
//! Evaluates the generic condition/action rules of the Knowledge Store's
//! offline pack against a `PatientAssessment`, scans the flat interaction
//! table, and assembles a ranked `TreatmentPlan` with its audit trail.
//!
//! The engine must be initialized (knowledge loaded) before it can produce
//! a plan. When a `PlanVerifier` is attached, every plan is checked before
//! it is returned; a failing plan is an error, never a partial result.

use std::{collections::HashSet, sync::Arc, time::Instant};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use mht_contracts::{
    assessment::{AssessmentValidation, PatientAssessment},
    config::EngineConfig,
    error::{MhtError, MhtResult},
    knowledge::{FlatInteraction, FlatSeverity, KnowledgeStore},
    plan::{ActionCategory, AuditTrail, PlanFlags, PlanRecommendation, TreatmentPlan},
    rule::{ClinicalRule, GuidelineSource, SourceKind},
};

use crate::{
    condition,
    traits::{KnowledgeLoader, PlanVerifier},
};

const INCOMPLETE_DATA_NOTE: &str = " (Requires complete assessment data for full evaluation)";

const PLAN_LIFESTYLE: &str = "Consider lifestyle modifications including regular exercise, balanced diet, and stress management techniques.";
const PLAN_URGENT: &str =
    "Urgent clinical evaluation required, contact healthcare provider immediately.";
const PLAN_REFER: &str =
    "Specialist consultation recommended for comprehensive evaluation and treatment planning.";
const PLAN_TREATMENT: &str =
    "Consider evidence-based treatment options appropriate for individual risk profile.";
const PLAN_MONITOR: &str =
    "Regular monitoring and follow-up with healthcare provider for symptom assessment.";
const PLAN_FOLLOW_UP: &str = "Schedule regular follow-up appointments to monitor treatment response and adjust plan as needed.";

/// Offline condition/action rule engine.
pub struct OfflineRuleEngine {
    loader: Option<Box<dyn KnowledgeLoader>>,
    verifier: Option<Box<dyn PlanVerifier>>,
    config: EngineConfig,
    knowledge: Option<Arc<KnowledgeStore>>,
}

impl OfflineRuleEngine {
    /// An engine that loads its knowledge through `loader` on `initialize`.
    pub fn new(loader: Box<dyn KnowledgeLoader>, config: EngineConfig) -> Self {
        Self {
            loader: Some(loader),
            verifier: None,
            config,
            knowledge: None,
        }
    }

    /// An engine over an already loaded store. No `initialize` call needed.
    pub fn with_knowledge(knowledge: Arc<KnowledgeStore>, config: EngineConfig) -> Self {
        Self {
            loader: None,
            verifier: None,
            config,
            knowledge: Some(knowledge),
        }
    }

    /// Attach a verifier run against every generated plan.
    pub fn with_verifier(mut self, verifier: Box<dyn PlanVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Load the Knowledge Store through the configured loader.
    ///
    /// Idempotent: a second call reloads and replaces the store. A load
    /// failure leaves any previously loaded store in place.
    pub fn initialize(&mut self) -> MhtResult<()> {
        let Some(loader) = &self.loader else {
            return match self.knowledge {
                Some(_) => Ok(()),
                None => Err(MhtError::KnowledgeUnavailable {
                    reason: "no knowledge loader configured".to_string(),
                }),
            };
        };

        let store = loader.load()?;
        info!(
            version = %store.version,
            rules = store.pack.rules.len(),
            "offline rule engine initialized"
        );
        self.knowledge = Some(Arc::new(store));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.knowledge.is_some()
    }

    /// Version of the loaded offline pack, if any.
    pub fn knowledge_version(&self) -> Option<&str> {
        self.knowledge.as_deref().map(|k| k.pack.version.as_str())
    }

    /// Check required and recommended fields.
    pub fn validate_assessment(&self, assessment: &PatientAssessment) -> AssessmentValidation {
        let mut missing = Vec::new();
        if assessment.age.is_none() {
            missing.push("age".to_string());
        }
        if assessment.gender.as_deref().map_or(true, str::is_empty) {
            missing.push("gender".to_string());
        }

        let recommended = [
            ("symptoms.severity", assessment.symptoms.severity.is_some()),
            ("history.vte", assessment.history.vte.is_some()),
            (
                "history.breast_cancer_active",
                assessment.history.breast_cancer_active.is_some(),
            ),
            ("current_medications", assessment.current_medications.is_some()),
        ];
        let warnings = recommended
            .iter()
            .filter(|(_, present)| !present)
            .map(|(field, _)| format!("Missing recommended field: {field}"))
            .collect();

        AssessmentValidation {
            is_valid: missing.is_empty(),
            can_proceed_with_caveats: missing.len() <= 1,
            missing_required: missing,
            warnings,
        }
    }

    /// Build a ranked treatment plan for `assessment`.
    ///
    /// # Errors
    ///
    /// - `KnowledgeUnavailable` if the engine has not been initialized.
    /// - `VerificationFailed` if an attached verifier rejects the plan.
    pub fn generate_plan(&self, assessment: &PatientAssessment) -> MhtResult<TreatmentPlan> {
        let started = Instant::now();
        let knowledge = self.knowledge.as_deref().ok_or_else(|| MhtError::KnowledgeUnavailable {
            reason: "initialize the offline rule engine before generating plans".to_string(),
        })?;

        let validation = self.validate_assessment(assessment);
        if !validation.is_valid {
            warn!(missing = ?validation.missing_required, "assessment incomplete; confidence reduced");
        }

        let mut recommendations = Vec::new();
        let mut rules_matched = Vec::new();
        let mut evidence_used = Vec::new();

        for rule in &knowledge.pack.rules {
            if !condition::evaluate(&rule.condition, assessment) {
                continue;
            }
            debug!(rule_id = %rule.id, category = ?rule.action.category, "offline rule matched");
            recommendations.push(self.recommend(rule, &validation));
            rules_matched.push(rule.id.clone());
            evidence_used.extend(rule.action.evidence.iter().cloned());
        }

        recommendations.extend(interaction_recommendations(assessment, &knowledge.pack.interactions));

        // Stable sort keeps rule order among equal keys.
        recommendations.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then(a.priority.cmp(&b.priority))
                .then(b.confidence.total_cmp(&a.confidence))
        });

        let general_plan = general_plan(&recommendations);
        let specific_options = recommendations
            .iter()
            .filter(|r| r.category.is_specific_option())
            .take(self.config.specific_options_limit)
            .cloned()
            .collect();
        let summary = summary(assessment, &recommendations);
        let flags = PlanFlags {
            urgent: recommendations.iter().any(|r| r.category == ActionCategory::Urgent),
            contraindicated: recommendations
                .iter()
                .flat_map(|r| r.contraindications.iter().cloned())
                .collect(),
            missing_data: validation.missing_required,
        };

        let plan = TreatmentPlan {
            plan_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            input_snapshot: assessment.clone(),
            recommendations,
            summary,
            flags,
            general_plan,
            specific_options,
            audit_trail: AuditTrail {
                rules_matched,
                evidence_used: dedup_evidence(evidence_used),
                evaluation_time_ms: u64::try_from(started.elapsed().as_millis())
                    .unwrap_or(u64::MAX),
                knowledge_version: knowledge.pack.version.clone(),
            },
        };

        if let Some(verifier) = &self.verifier {
            let report = verifier.verify(&plan)?;
            if !report.passed {
                warn!(plan_id = %plan.plan_id, failures = report.failures.len(), "plan failed verification");
                return Err(MhtError::VerificationFailed {
                    reason: report.summary(),
                });
            }
        }

        info!(
            plan_id = %plan.plan_id,
            recommendations = plan.recommendations.len(),
            urgent = plan.flags.urgent,
            elapsed_ms = plan.audit_trail.evaluation_time_ms,
            "treatment plan generated"
        );
        Ok(plan)
    }

    fn recommend(&self, rule: &ClinicalRule, validation: &AssessmentValidation) -> PlanRecommendation {
        let action = &rule.action;
        let mut recommendation = PlanRecommendation {
            category: action.category,
            priority: action.priority,
            text: action.text.clone(),
            rationale: action.rationale.clone(),
            evidence: action.evidence.clone(),
            contraindications: action.contraindications.clone(),
            confidence: action.confidence,
            interactions: action.interactions.clone(),
            requires_more_data: false,
        };

        if !validation.is_valid {
            recommendation.requires_more_data = true;
            recommendation.confidence *= self.config.incomplete_data_confidence_factor;
            recommendation.text.push_str(INCOMPLETE_DATA_NOTE);
        }

        recommendation
    }
}

// ── Interaction scan ──────────────────────────────────────────────────────────

/// Lowercase alphanumerics only, so "Herbal_Supplements" and "herbal supplements" agree.
fn drug_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Substring match in either direction. Empty names never match.
fn names_overlap(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

fn interaction_recommendations(
    assessment: &PatientAssessment,
    table: &[FlatInteraction],
) -> Vec<PlanRecommendation> {
    let medications: Vec<String> = assessment.medications().iter().map(|m| drug_key(m)).collect();
    let proposed = assessment.medicine_type.as_deref().map(drug_key).unwrap_or_default();
    if medications.is_empty() || proposed.is_empty() {
        return Vec::new();
    }

    let taking = |drug: &str| medications.iter().any(|m| names_overlap(m, drug));

    table
        .iter()
        .filter(|entry| {
            let (d1, d2) = (drug_key(&entry.drug1), drug_key(&entry.drug2));
            (taking(&d1) && names_overlap(&proposed, &d2))
                || (taking(&d2) && names_overlap(&proposed, &d1))
        })
        .map(|entry| {
            debug!(drug1 = %entry.drug1, drug2 = %entry.drug2, severity = ?entry.severity, "flat interaction matched");
            let (category, priority, confidence) = match entry.severity {
                FlatSeverity::Major => (ActionCategory::Urgent, 1, 0.95),
                FlatSeverity::Moderate | FlatSeverity::Minor => (ActionCategory::Refer, 3, 0.80),
            };
            PlanRecommendation {
                category,
                priority,
                text: format!(
                    "{} drug interaction detected between {} and {}, discuss with clinician.",
                    entry.severity.as_upper(),
                    entry.drug1,
                    entry.drug2
                ),
                rationale: entry.description.clone(),
                evidence: vec![interaction_source()],
                contraindications: Vec::new(),
                confidence,
                interactions: vec![format!("{}-{}", entry.drug1, entry.drug2)],
                requires_more_data: false,
            }
        })
        .collect()
}

fn interaction_source() -> GuidelineSource {
    GuidelineSource {
        title: "Drug Interaction Database".to_string(),
        url: "https://reference.medscape.com/drug-interactionchecker".to_string(),
        version: "2024".to_string(),
        date: "2024-01-01".to_string(),
        kind: SourceKind::Interaction,
    }
}

// ── Plan assembly ─────────────────────────────────────────────────────────────

fn general_plan(sorted: &[PlanRecommendation]) -> [String; 3] {
    let second = match sorted.first().map(|r| r.category) {
        Some(ActionCategory::Urgent) => PLAN_URGENT,
        Some(ActionCategory::Refer) => PLAN_REFER,
        Some(_) => PLAN_TREATMENT,
        None => PLAN_MONITOR,
    };
    [
        PLAN_LIFESTYLE.to_string(),
        second.to_string(),
        PLAN_FOLLOW_UP.to_string(),
    ]
}

fn summary(assessment: &PatientAssessment, sorted: &[PlanRecommendation]) -> String {
    let age = assessment
        .age
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unknown age".to_string());
    let urgent = sorted.iter().filter(|r| r.category == ActionCategory::Urgent).count();

    let mut text = format!("Treatment plan generated for {age}-year-old patient. ");
    if urgent > 0 {
        text.push_str(&format!(
            "{urgent} urgent recommendation(s) requiring immediate attention. "
        ));
    }
    text.push_str(&format!(
        "{} evidence-based recommendations provided. ",
        sorted.len()
    ));
    text.push_str(
        "All recommendations are advisory and require healthcare provider discussion before implementation.",
    );
    text
}

/// First occurrence of each (title, version) pair wins.
fn dedup_evidence(evidence: Vec<GuidelineSource>) -> Vec<GuidelineSource> {
    let mut seen = HashSet::new();
    evidence
        .into_iter()
        .filter(|source| seen.insert((source.title.clone(), source.version.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mht_contracts::{
        assessment::PatientAssessment,
        config::EngineConfig,
        error::{MhtError, MhtResult},
        knowledge::KnowledgeStore,
        plan::{ActionCategory, TreatmentPlan},
        verify::{VerificationFailure, VerificationReport},
    };

    use super::{OfflineRuleEngine, PLAN_FOLLOW_UP, PLAN_LIFESTYLE, PLAN_MONITOR, PLAN_URGENT};
    use crate::{
        fixtures::knowledge,
        traits::{KnowledgeLoader, PlanVerifier},
    };

    struct FixtureLoader;

    impl KnowledgeLoader for FixtureLoader {
        fn load(&self) -> MhtResult<KnowledgeStore> {
            Ok(knowledge())
        }
    }

    struct FailingLoader;

    impl KnowledgeLoader for FailingLoader {
        fn load(&self) -> MhtResult<KnowledgeStore> {
            Err(MhtError::KnowledgeUnavailable {
                reason: "offline".to_string(),
            })
        }
    }

    struct RejectAll;

    impl PlanVerifier for RejectAll {
        fn verify(&self, _plan: &TreatmentPlan) -> MhtResult<VerificationReport> {
            Ok(VerificationReport::from_failures(vec![VerificationFailure {
                rule_id: "always".to_string(),
                message: "rejected".to_string(),
            }]))
        }
    }

    fn engine() -> OfflineRuleEngine {
        OfflineRuleEngine::with_knowledge(Arc::new(knowledge()), EngineConfig::default())
    }

    fn complete(age: f64) -> PatientAssessment {
        let mut a = PatientAssessment {
            age: Some(age),
            gender: Some("female".to_string()),
            current_medications: Some(Vec::new()),
            ..PatientAssessment::default()
        };
        a.symptoms.severity = Some(5.0);
        a.history.vte = Some(false);
        a.history.breast_cancer_active = Some(false);
        a
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    #[test]
    fn generate_before_initialize_fails() {
        let engine = OfflineRuleEngine::new(Box::new(FixtureLoader), EngineConfig::default());
        assert!(!engine.is_initialized());
        let err = engine.generate_plan(&complete(50.0)).unwrap_err();
        assert!(matches!(err, MhtError::KnowledgeUnavailable { .. }));
        assert!(err.to_string().contains("knowledge pack not available"));
    }

    #[test]
    fn initialize_loads_pack() {
        let mut engine = OfflineRuleEngine::new(Box::new(FixtureLoader), EngineConfig::default());
        engine.initialize().unwrap();
        assert_eq!(engine.knowledge_version(), Some("1.0.0"));
        assert!(engine.generate_plan(&complete(50.0)).is_ok());
    }

    #[test]
    fn failed_load_propagates() {
        let mut engine = OfflineRuleEngine::new(Box::new(FailingLoader), EngineConfig::default());
        assert!(matches!(
            engine.initialize(),
            Err(MhtError::KnowledgeUnavailable { .. })
        ));
        assert!(!engine.is_initialized());
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn validation_reports_required_and_recommended() {
        let assessment = PatientAssessment {
            age: Some(52.0),
            gender: Some(String::new()),
            ..PatientAssessment::default()
        };
        let v = engine().validate_assessment(&assessment);
        assert!(!v.is_valid);
        assert_eq!(v.missing_required, vec!["gender"]);
        assert!(v.can_proceed_with_caveats);
        assert_eq!(v.warnings.len(), 4);
        assert!(v.warnings.contains(&"Missing recommended field: history.vte".to_string()));

        let v = engine().validate_assessment(&PatientAssessment::default());
        assert_eq!(v.missing_required, vec!["age", "gender"]);
        assert!(!v.can_proceed_with_caveats);

        assert!(engine().validate_assessment(&complete(50.0)).is_valid);
    }

    // ── Rules and ordering ────────────────────────────────────────────────────

    #[test]
    fn recommendations_are_ranked() {
        let mut a = complete(56.0);
        a.medicine_type = Some("HRT".to_string());
        a.history.vte = Some(true);
        a.risk_scores.ascvd = Some(12.0);
        a.symptoms.sleep_disturbances = Some(8.0);
        a.symptoms.vasomotor_symptoms = Some(9.0);
        a.current_medications = Some(vec!["Warfarin".to_string()]);

        let plan = engine().generate_plan(&a).unwrap();
        let order: Vec<ActionCategory> = plan.recommendations.iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![
                ActionCategory::Urgent,
                ActionCategory::Refer,
                ActionCategory::Refer,
                ActionCategory::Pharm,
                ActionCategory::NonPharm,
            ]
        );
        // Cardiology referral (priority 3, 0.85) before the interaction (priority 3, 0.80).
        assert!(plan.recommendations[1].text.starts_with("Consider cardiology"));
        assert!(plan.recommendations[2].text.starts_with("MODERATE drug interaction"));
        assert_eq!(plan.recommendations[2].interactions, vec!["HRT-warfarin"]);

        assert!(plan.flags.urgent);
        assert_eq!(plan.flags.contraindicated, vec!["VTE history"]);
        assert_eq!(plan.general_plan[1], PLAN_URGENT);
        assert_eq!(plan.specific_options.len(), 2);
        assert_eq!(plan.specific_options[0].category, ActionCategory::Pharm);
        assert!(plan.summary.contains("1 urgent recommendation(s)"));
        assert!(plan.summary.contains("5 evidence-based recommendations"));
    }

    #[test]
    fn interaction_matching_ignores_case_and_punctuation() {
        let mut a = complete(60.0);
        a.medicine_type = Some("Herbal Supplements".to_string());
        a.current_medications = Some(vec!["WARFARIN sodium".to_string()]);
        let plan = engine().generate_plan(&a).unwrap();
        let urgent = &plan.recommendations[0];
        assert_eq!(urgent.category, ActionCategory::Urgent);
        assert_eq!(urgent.priority, 1);
        assert_eq!(urgent.confidence, 0.95);
        assert!(urgent.text.starts_with("MAJOR drug interaction detected"));
        // Interaction evidence is attached but not part of the audit trail.
        assert!(plan.audit_trail.evidence_used.is_empty());
    }

    #[test]
    fn no_medications_means_no_interaction_scan() {
        let mut a = complete(60.0);
        a.medicine_type = Some("HRT".to_string());
        a.current_medications = None;
        let plan = engine().generate_plan(&a).unwrap();
        assert!(plan.recommendations.iter().all(|r| r.interactions.is_empty()));
    }

    // ── Plan assembly ─────────────────────────────────────────────────────────

    #[test]
    fn empty_plan_still_has_three_lines() {
        let plan = engine().generate_plan(&complete(50.0)).unwrap();
        assert!(plan.recommendations.is_empty());
        assert_eq!(plan.general_plan, [PLAN_LIFESTYLE, PLAN_MONITOR, PLAN_FOLLOW_UP]);
        assert!(!plan.flags.urgent);
        assert!(plan.summary.starts_with("Treatment plan generated for 50-year-old patient."));
        assert!(!plan.summary.contains("urgent"));
        assert_eq!(plan.audit_trail.knowledge_version, "1.0.0");
    }

    #[test]
    fn evidence_is_deduplicated() {
        let mut a = complete(50.0);
        a.symptoms.sleep_disturbances = Some(8.0);
        a.symptoms.vasomotor_symptoms = Some(9.0);
        a.risk_scores.ascvd = Some(3.0);
        let plan = engine().generate_plan(&a).unwrap();
        assert_eq!(plan.audit_trail.rules_matched.len(), 3);
        assert_eq!(plan.audit_trail.evidence_used.len(), 1);
        assert_eq!(plan.audit_trail.evidence_used[0].version, "2022");
    }

    #[test]
    fn incomplete_assessment_reduces_confidence() {
        let mut a = complete(50.0);
        a.gender = None;
        a.symptoms.vasomotor_symptoms = Some(9.0);
        let plan = engine().generate_plan(&a).unwrap();
        let rec = &plan.recommendations[0];
        assert!(rec.requires_more_data);
        assert!((rec.confidence - 0.9 * 0.7).abs() < 1e-9);
        assert!(rec.text.ends_with("(Requires complete assessment data for full evaluation)"));
        assert_eq!(plan.flags.missing_data, vec!["gender"]);
    }

    #[test]
    fn specific_options_respect_limit() {
        let config = EngineConfig {
            specific_options_limit: 1,
            ..EngineConfig::default()
        };
        let engine = OfflineRuleEngine::with_knowledge(Arc::new(knowledge()), config);
        let mut a = complete(50.0);
        a.symptoms.sleep_disturbances = Some(8.0);
        a.symptoms.vasomotor_symptoms = Some(9.0);
        let plan = engine.generate_plan(&a).unwrap();
        assert_eq!(plan.specific_options.len(), 1);
    }

    #[test]
    fn rejected_plan_is_an_error() {
        let engine = engine().with_verifier(Box::new(RejectAll));
        let err = engine.generate_plan(&complete(50.0)).unwrap_err();
        match err {
            MhtError::VerificationFailed { reason } => assert_eq!(reason, "[always] rejected"),
            other => panic!("expected VerificationFailed, got {other:?}"),
        }
    }
}
