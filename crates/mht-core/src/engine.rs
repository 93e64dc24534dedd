//! The decision engine: ordered precedence pipeline over the Knowledge Store.
//!
//! `DecisionEngine::evaluate` runs the stages named by
//! `KnowledgeStore::precedence` in order:
//!
//!   absolute contraindications → interactions → risk (high) → risk (moderate) → preference
//!
//! Each stage is a pure function of the accumulated `EvaluationState` that
//! either continues with an updated state or breaks with a decided one.
//! The fold stops at the first break, so a decision made early is never
//! revisited, while every stage that did run keeps its contribution to the
//! fired-rule trace, alternatives and monitoring ("accumulate always,
//! decide once").
//!
//! Headline rule: the first stage to produce a non-empty message owns the
//! headline text. Blocking stages (absolute contraindication, high-severity
//! interaction) replace it with their own reason because they decide the
//! outcome.

use std::{collections::BTreeMap, ops::ControlFlow, sync::Arc};

use tracing::{debug, info, warn};

use mht_contracts::{
    config::EngineConfig,
    inputs::TreatmentInputs,
    knowledge::{
        Contraindication, ContraindicationKind, Interaction, InteractionAction,
        InteractionSeverity, KnowledgeStore, Stage, ThresholdAction,
    },
    recommendation::{
        FiredRule, KnowledgeCollection, PrimaryRecommendation, RuleCategory, ScoreConflict,
        Severity, Strength, TreatmentRecommendation,
    },
    risk::ScoreKind,
};
use mht_risk::RiskResolver;

const ALT_NON_HORMONAL: &str = "Seek alternative non-hormonal therapy";
const ALT_CAREFUL_MONITORING: &str = "Consider careful monitoring or alternative approach";
const ALT_NO_INTERACTION: &str = "Select alternative medication without interaction";
const MONITOR_ENHANCED: &str = "Enhanced monitoring required";
const MONITOR_COUNSEL: &str = "Counsel patient on risks";
const INSUFFICIENT_DATA_ALTERNATIVES: [&str; 2] =
    ["Gather additional clinical data", "Comprehensive patient assessment"];

/// Mutable accumulator threaded through the stages of one evaluation.
#[derive(Debug, Clone)]
struct EvaluationState {
    fired: Vec<FiredRule>,
    headline: Option<String>,
    strength: Strength,
    alternatives: Vec<String>,
    monitoring: Vec<String>,
    review_required: bool,
    risk_high_evaluated: bool,
}

impl EvaluationState {
    fn new() -> Self {
        Self {
            fired: Vec::new(),
            headline: None,
            strength: Strength::Conditional,
            alternatives: Vec::new(),
            monitoring: Vec::new(),
            review_required: false,
            risk_high_evaluated: false,
        }
    }

    fn claim_headline(&mut self, text: &str) -> bool {
        if self.headline.is_none() && !text.is_empty() {
            self.headline = Some(text.to_string());
            true
        } else {
            false
        }
    }

    fn add_alternative(&mut self, text: &str) {
        push_unique(&mut self.alternatives, text);
    }

    fn add_monitoring(&mut self, text: &str) {
        push_unique(&mut self.monitoring, text);
    }

    /// Close the evaluation with a blocking outcome.
    fn decide(mut self, reason: &str) -> StageFlow {
        self.headline = Some(reason.to_string());
        self.strength = Strength::NotRecommended;
        self.review_required = true;
        ControlFlow::Break(self)
    }
}

/// `Break` carries a decided state; `Continue` hands the state to the next stage.
type StageFlow = ControlFlow<EvaluationState, EvaluationState>;

/// Resolved risk values used by the threshold stages. A kind that is absent
/// from the map is unavailable and never compared against a cutoff.
#[derive(Debug, Default)]
struct RiskView {
    values: BTreeMap<ScoreKind, f64>,
    conflicts: Vec<ScoreConflict>,
}

impl RiskView {
    fn get(&self, kind: ScoreKind) -> Option<f64> {
        self.values.get(&kind).copied()
    }
}

/// Where a rule looked up by id lives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleLookup<'a> {
    Contraindication(&'a Contraindication),
    Interaction(&'a Interaction),
    ThresholdAction { id: &'a str, action: &'a ThresholdAction },
}

impl RuleLookup<'_> {
    pub fn collection(&self) -> KnowledgeCollection {
        match self {
            RuleLookup::Contraindication(_) => KnowledgeCollection::Contraindications,
            RuleLookup::Interaction(_) => KnowledgeCollection::Interactions,
            RuleLookup::ThresholdAction { .. } => KnowledgeCollection::Thresholds,
        }
    }
}

/// Deterministic treatment evaluator.
///
/// Holds a shared, read-only `KnowledgeStore`; `evaluate` takes `&self`
/// and touches no other state, so one engine may serve many threads.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    knowledge: Arc<KnowledgeStore>,
    resolver: RiskResolver,
    config: EngineConfig,
}

impl DecisionEngine {
    pub fn new(knowledge: Arc<KnowledgeStore>) -> Self {
        Self::with_config(knowledge, EngineConfig::default())
    }

    pub fn with_config(knowledge: Arc<KnowledgeStore>, config: EngineConfig) -> Self {
        Self {
            resolver: RiskResolver::new(config.conflict_threshold_pct),
            knowledge,
            config,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    /// Evaluate `inputs` and return the single recommendation for them.
    ///
    /// Never fails: missing data yields an insufficient-data recommendation
    /// with clinician review required.
    pub fn evaluate(&self, inputs: &TreatmentInputs) -> TreatmentRecommendation {
        if !inputs.has_selected_treatment() {
            debug!("no treatment selected; returning insufficient-data recommendation");
            return self.insufficient_data(inputs);
        }

        let risk = self.resolve_risk(inputs);

        debug!(
            treatment = %inputs.selected_medicine,
            conditions = inputs.conditions.len(),
            medications = inputs.current_medications.len(),
            resolved_scores = risk.values.len(),
            "evaluating treatment"
        );

        let flow = self
            .knowledge
            .precedence
            .iter()
            .try_fold(EvaluationState::new(), |state, stage| {
                debug!(?stage, fired = state.fired.len(), "running stage");
                self.run_stage(*stage, state, inputs, &risk)
            });

        let mut state = match flow {
            ControlFlow::Break(decided) => decided,
            ControlFlow::Continue(state) => state,
        };

        if state.headline.is_none() {
            state.headline = Some(self.knowledge.defaults.insufficient_data.clone());
            state.strength = Strength::Conditional;
            state.review_required = true;
        }

        info!(
            treatment = %inputs.selected_medicine,
            strength = %state.strength,
            fired = state.fired.len(),
            review_required = state.review_required,
            "treatment evaluated"
        );

        TreatmentRecommendation {
            summary_inputs: inputs.clone(),
            fired_rules: state.fired,
            primary_recommendation: PrimaryRecommendation {
                text: state.headline.unwrap_or_default(),
                strength: state.strength,
            },
            alternatives: state.alternatives,
            monitoring: state.monitoring,
            clinician_review_required: state.review_required,
            risk_score_conflicts: risk.conflicts,
        }
    }

    /// Find a rule by id across contraindications, interactions and
    /// threshold actions, in that order.
    pub fn rule_by_id(&self, id: &str) -> Option<RuleLookup<'_>> {
        let k = &self.knowledge;
        if let Some(c) = k.contraindications.iter().find(|c| c.id == id) {
            return Some(RuleLookup::Contraindication(c));
        }
        if let Some(i) = k.interactions.iter().find(|i| i.id == id) {
            return Some(RuleLookup::Interaction(i));
        }
        k.threshold_actions
            .get_key_value(id)
            .map(|(id, action)| RuleLookup::ThresholdAction { id: id.as_str(), action })
    }

    fn insufficient_data(&self, inputs: &TreatmentInputs) -> TreatmentRecommendation {
        TreatmentRecommendation {
            summary_inputs: inputs.clone(),
            fired_rules: Vec::new(),
            primary_recommendation: PrimaryRecommendation {
                text: self.knowledge.defaults.insufficient_data.clone(),
                strength: Strength::Conditional,
            },
            alternatives: INSUFFICIENT_DATA_ALTERNATIVES.iter().map(|s| s.to_string()).collect(),
            monitoring: Vec::new(),
            clinician_review_required: true,
            risk_score_conflicts: Vec::new(),
        }
    }

    // ── Risk resolution ───────────────────────────────────────────────────────

    /// Resolve supplied scores (and, when configured, absent ones) before the
    /// threshold stages run.
    fn resolve_risk(&self, inputs: &TreatmentInputs) -> RiskView {
        let risk_inputs = inputs.risk_inputs();
        let mut view = RiskView::default();

        for kind in ScoreKind::ALL {
            let provided = inputs.risk_scores.get(kind);
            if provided.is_none() && !self.config.compute_missing_scores {
                continue;
            }

            let resolved = self.resolver.resolve_provided(kind, &risk_inputs, provided);
            if let (true, Some(external), Some(computed), Some(difference)) = (
                resolved.has_conflict(),
                resolved.external_value(),
                resolved.computed_value(),
                resolved.conflict_percentage(),
            ) {
                view.conflicts.push(ScoreConflict {
                    score: kind,
                    external,
                    computed,
                    difference,
                });
            }
            if let Some(value) = resolved.available_value() {
                view.values.insert(kind, value);
            }
        }

        view
    }

    // ── Stages ────────────────────────────────────────────────────────────────

    fn run_stage(
        &self,
        stage: Stage,
        state: EvaluationState,
        inputs: &TreatmentInputs,
        risk: &RiskView,
    ) -> StageFlow {
        match stage {
            Stage::AbsoluteContraindications => self.contraindication_stage(state, inputs),
            Stage::InteractionsHigh => self.interaction_stage(state, inputs),
            Stage::RiskHigh => {
                let mut state = state;
                state.risk_high_evaluated = true;
                self.risk_stage(state, risk, true, false)
            }
            Stage::RiskModerate => {
                // When the high tier has not run yet, this pass covers it too.
                let include_high = !state.risk_high_evaluated;
                self.risk_stage(state, risk, include_high, true)
            }
            Stage::PreferenceGuided => self.preference_stage(state),
        }
    }

    fn contraindication_stage(
        &self,
        mut state: EvaluationState,
        inputs: &TreatmentInputs,
    ) -> StageFlow {
        let treatment = normalize_drug(&inputs.selected_medicine);
        let mut absolute_reason: Option<&str> = None;

        for contra in &self.knowledge.contraindications {
            if !inputs.conditions.contains(&contra.condition) || !applies_to(contra, &treatment) {
                continue;
            }

            debug!(rule_id = %contra.id, condition = %contra.condition, "contraindication matched");
            let severity = match contra.kind {
                ContraindicationKind::Absolute => Severity::Absolute,
                ContraindicationKind::Relative => Severity::Relative,
            };
            state.fired.push(FiredRule {
                id: contra.id.clone(),
                description: contra.message.clone(),
                collection: KnowledgeCollection::Contraindications,
                category: RuleCategory::Contraindication,
                severity,
            });

            match contra.kind {
                ContraindicationKind::Absolute => {
                    // First match in knowledge order is the headline.
                    absolute_reason.get_or_insert(contra.message.as_str());
                    state.add_alternative(ALT_NON_HORMONAL);
                }
                ContraindicationKind::Relative => {
                    state.review_required = true;
                    state.claim_headline(&contra.message);
                    state.strength = Strength::Conditional;
                    state.add_alternative(ALT_CAREFUL_MONITORING);
                }
            }
        }

        match absolute_reason {
            Some(reason) => {
                warn!(treatment = %inputs.selected_medicine, reason, "absolute contraindication");
                state.decide(reason)
            }
            None => ControlFlow::Continue(state),
        }
    }

    fn interaction_stage(&self, mut state: EvaluationState, inputs: &TreatmentInputs) -> StageFlow {
        let treatment = normalize_drug(&inputs.selected_medicine);
        let medications: Vec<String> =
            inputs.current_medications.iter().map(|m| normalize_drug(m)).collect();
        let mut blocking_reason: Option<&str> = None;

        for interaction in &self.knowledge.interactions {
            if !interacts(interaction, &treatment, &medications) {
                continue;
            }

            debug!(rule_id = %interaction.id, severity = ?interaction.severity, "interaction matched");
            let severity = match interaction.severity {
                InteractionSeverity::High => Severity::High,
                InteractionSeverity::Moderate => Severity::Moderate,
                InteractionSeverity::Low => Severity::Low,
            };
            state.fired.push(FiredRule {
                id: interaction.id.clone(),
                description: interaction.message.clone(),
                collection: KnowledgeCollection::Interactions,
                category: RuleCategory::Interaction,
                severity,
            });

            match interaction.severity {
                InteractionSeverity::High => {
                    // First match in knowledge order is the headline.
                    blocking_reason.get_or_insert(interaction.message.as_str());
                    state.add_alternative(ALT_NO_INTERACTION);
                }
                InteractionSeverity::Moderate => {
                    state.claim_headline(&interaction.message);
                    state.strength = Strength::Conditional;
                    state.add_monitoring(match interaction.action {
                        InteractionAction::Monitor => MONITOR_ENHANCED,
                        InteractionAction::Avoid | InteractionAction::Counsel => MONITOR_COUNSEL,
                    });
                }
                InteractionSeverity::Low => {}
            }
        }

        match blocking_reason {
            Some(reason) => {
                warn!(treatment = %inputs.selected_medicine, reason, "high-severity interaction");
                state.decide(reason)
            }
            None => ControlFlow::Continue(state),
        }
    }

    /// Compare resolved scores against their cutoffs.
    ///
    /// `include_high` covers ASCVD-high, FRAX-high, Gail-elevated and
    /// Wells-high; `include_moderate` covers the intermediate ASCVD band.
    /// Metrics are visited in a fixed order and the first non-empty action
    /// message becomes the stage's headline candidate.
    fn risk_stage(
        &self,
        mut state: EvaluationState,
        risk: &RiskView,
        include_high: bool,
        include_moderate: bool,
    ) -> StageFlow {
        let cutoffs = &self.knowledge.risk_thresholds;
        let mut crossings: Vec<(String, String, Severity)> = Vec::new();
        let mut blocks = false;

        if let Some(ascvd) = risk.get(ScoreKind::Ascvd) {
            if ascvd >= cutoffs.ascvd.high {
                if include_high {
                    crossings.push((
                        "ASCVD_high".to_string(),
                        format!("High ASCVD risk ({ascvd}% ≥ {}%)", cutoffs.ascvd.high),
                        Severity::High,
                    ));
                    blocks = true;
                }
            } else if include_moderate && ascvd >= cutoffs.ascvd.low {
                crossings.push((
                    "ASCVD_intermediate".to_string(),
                    format!("Intermediate ASCVD risk ({ascvd}% ≥ {}%)", cutoffs.ascvd.low),
                    Severity::Moderate,
                ));
            }
        }

        if include_high {
            if let Some(frax) = risk.get(ScoreKind::FraxMajor) {
                if frax >= cutoffs.frax_major.high {
                    crossings.push((
                        "FRAX_high".to_string(),
                        format!(
                            "High fracture risk (FRAX major {frax}% ≥ {}%)",
                            cutoffs.frax_major.high
                        ),
                        Severity::High,
                    ));
                }
            }

            if let Some(gail) = risk.get(ScoreKind::Gail5yr) {
                if gail >= cutoffs.gail_5yr.elevated_5yr {
                    crossings.push((
                        "GAIL_elevated".to_string(),
                        format!(
                            "Elevated breast cancer risk (GAIL 5-year {gail}% ≥ {}%)",
                            cutoffs.gail_5yr.elevated_5yr
                        ),
                        Severity::Moderate,
                    ));
                }
            }

            if let Some(wells) = risk.get(ScoreKind::Wells) {
                if wells >= cutoffs.wells.high {
                    crossings.push((
                        "WELLS_high".to_string(),
                        format!("High VTE risk (Wells score {wells} ≥ {})", cutoffs.wells.high),
                        Severity::High,
                    ));
                    blocks = true;
                }
            }
        }

        if crossings.is_empty() {
            return ControlFlow::Continue(state);
        }

        let empty = ThresholdAction::default();
        let mut message: Option<String> = None;
        for (id, description, severity) in crossings {
            debug!(rule_id = %id, %description, "risk threshold crossed");
            let action = self.knowledge.threshold_action(&id).unwrap_or(&empty);
            let text = action.message();
            if message.is_none() && !text.is_empty() {
                message = Some(text);
            }
            for alternative in &action.alternatives {
                state.add_alternative(alternative);
            }
            for monitor in &action.monitoring {
                state.add_monitoring(monitor);
            }
            state.fired.push(FiredRule {
                id,
                description,
                collection: KnowledgeCollection::Thresholds,
                category: RuleCategory::RiskThreshold,
                severity,
            });
        }

        state.review_required = true;
        let won_headline = message.as_deref().is_some_and(|m| state.claim_headline(m));
        if won_headline {
            if blocks {
                warn!(headline = ?state.headline, "risk threshold blocks treatment");
                state.strength = Strength::NotRecommended;
                return ControlFlow::Break(state);
            }
            state.strength = Strength::Conditional;
        }

        ControlFlow::Continue(state)
    }

    fn preference_stage(&self, mut state: EvaluationState) -> StageFlow {
        if state.headline.is_none() && state.fired.is_empty() {
            state.claim_headline(&self.knowledge.defaults.preference_guided);
            state.strength = Strength::Conditional;
        }
        ControlFlow::Continue(state)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Lowercase, trim, and drop parentheses: "Estrogen (systemic)" → "estrogen systemic".
pub fn normalize_drug(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '(' && *c != ')')
        .collect::<String>()
        .to_lowercase()
}

fn applies_to(contra: &Contraindication, normalized_treatment: &str) -> bool {
    contra.treatments.is_empty()
        || contra
            .treatments
            .iter()
            .any(|t| normalized_treatment.contains(&normalize_drug(t)))
}

/// Interactions are undirected: either drug may be the selected treatment.
fn interacts(interaction: &Interaction, treatment: &str, medications: &[String]) -> bool {
    let a = normalize_drug(&interaction.drug_a);
    let b = normalize_drug(&interaction.drug_b);
    (a == treatment && medications.contains(&b)) || (b == treatment && medications.contains(&a))
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mht_contracts::{
        config::EngineConfig,
        inputs::{ProvidedScore, TreatmentInputs},
        knowledge::Stage,
        recommendation::{KnowledgeCollection, RuleCategory, Severity, Strength},
        risk::{Race, ScoreKind, Sex},
    };
    use proptest::prelude::*;

    use super::{normalize_drug, DecisionEngine, RuleLookup};
    use crate::fixtures::knowledge;

    fn engine() -> DecisionEngine {
        DecisionEngine::new(Arc::new(knowledge()))
    }

    fn inputs(treatment: &str) -> TreatmentInputs {
        TreatmentInputs {
            age: Some(54.0),
            sex: Some(Sex::Female),
            selected_medicine: treatment.to_string(),
            ..TreatmentInputs::default()
        }
    }

    fn with_conditions(mut i: TreatmentInputs, conditions: &[&str]) -> TreatmentInputs {
        i.conditions = conditions.iter().map(|c| c.to_string()).collect();
        i
    }

    fn with_meds(mut i: TreatmentInputs, meds: &[&str]) -> TreatmentInputs {
        i.current_medications = meds.iter().map(|m| m.to_string()).collect();
        i
    }

    fn ids(rec: &mht_contracts::recommendation::TreatmentRecommendation) -> Vec<&str> {
        rec.fired_rules.iter().map(|r| r.id.as_str()).collect()
    }

    // ── Insufficient data ─────────────────────────────────────────────────────

    #[test]
    fn missing_treatment_returns_insufficient_data() {
        let rec = engine().evaluate(&with_conditions(inputs(""), &["pregnancy"]));
        assert!(rec.primary_recommendation.text.contains("Insufficient data"));
        assert_eq!(rec.primary_recommendation.strength, Strength::Conditional);
        assert!(rec.clinician_review_required);
        assert!(rec.fired_rules.is_empty(), "no stage may run without a treatment");
        assert_eq!(
            rec.alternatives,
            vec!["Gather additional clinical data", "Comprehensive patient assessment"]
        );
    }

    // ── Contraindications ─────────────────────────────────────────────────────

    #[test]
    fn absolute_contraindication_blocks_and_skips_interactions() {
        let i = with_meds(
            with_conditions(inputs("Estrogen (systemic)"), &["pregnancy"]),
            &["Warfarin"],
        );
        let rec = engine().evaluate(&i);

        assert_eq!(rec.primary_recommendation.strength, Strength::NotRecommended);
        assert!(rec.primary_recommendation.text.to_lowercase().contains("pregnancy"));
        assert!(rec.clinician_review_required);
        assert_eq!(ids(&rec), vec!["C_ABS_PREGNANCY"]);
        assert!(rec.alternatives.contains(&"Seek alternative non-hormonal therapy".to_string()));
    }

    #[test]
    fn first_absolute_contraindication_in_knowledge_order_is_the_headline() {
        let i = with_conditions(inputs("Estrogen (systemic)"), &["vte_history", "pregnancy"]);
        let rec = engine().evaluate(&i);

        assert_eq!(ids(&rec), vec!["C_ABS_PREGNANCY", "C_ABS_VTE"]);
        assert_eq!(
            rec.primary_recommendation.text,
            "Pregnancy is an absolute contraindication to hormone therapy"
        );
        assert_eq!(rec.primary_recommendation.strength, Strength::NotRecommended);
    }

    #[test]
    fn relative_contraindication_continues_with_review() {
        let mut i = with_conditions(inputs("Estrogen (systemic)"), &["uncontrolled_hypertension"]);
        i.risk_scores.ascvd = Some(ProvidedScore::computed(8.0));
        let rec = engine().evaluate(&i);

        assert_eq!(rec.primary_recommendation.strength, Strength::Conditional);
        assert!(rec.clinician_review_required);
        assert_eq!(ids(&rec), vec!["C_REL_HTN", "ASCVD_intermediate"]);
        // The relative contraindication claimed the headline first.
        assert!(rec.primary_recommendation.text.contains("hypertension"));
        assert!(rec
            .alternatives
            .contains(&"Consider careful monitoring or alternative approach".to_string()));
    }

    #[test]
    fn treatment_scoped_contraindication_ignores_other_treatments() {
        let i = with_conditions(inputs("Gabapentin"), &["uncontrolled_hypertension"]);
        let rec = engine().evaluate(&i);
        assert!(ids(&rec).is_empty());
    }

    // ── Interactions ──────────────────────────────────────────────────────────

    #[test]
    fn high_interaction_blocks() {
        let i = with_meds(inputs("Estrogen (systemic)"), &["Warfarin"]);
        let rec = engine().evaluate(&i);
        assert!(rec.fired("I_HI_EST_WARF"));
        assert_eq!(rec.primary_recommendation.strength, Strength::NotRecommended);
        assert!(rec.clinician_review_required);
        assert!(rec
            .alternatives
            .contains(&"Select alternative medication without interaction".to_string()));
    }

    #[test]
    fn interaction_matching_is_undirected_and_normalized() {
        let i = with_meds(inputs("warfarin"), &["  ESTROGEN (SYSTEMIC) "]);
        let rec = engine().evaluate(&i);
        assert!(rec.fired("I_HI_EST_WARF"));
    }

    #[test]
    fn moderate_interaction_adds_monitoring() {
        let i = with_meds(
            inputs("Combined oral contraceptive"),
            &["Herbal supplement (St John's Wort)"],
        );
        let rec = engine().evaluate(&i);
        assert!(rec.fired("I_MOD_STJ_COC"));
        assert_eq!(rec.primary_recommendation.strength, Strength::Conditional);
        assert_eq!(rec.monitoring, vec!["Enhanced monitoring required"]);
        assert!(!rec.clinician_review_required);
    }

    #[test]
    fn low_interaction_is_trace_only() {
        let i = with_meds(inputs("Gabapentin"), &["Antacid"]);
        let rec = engine().evaluate(&i);
        let rule = &rec.fired_rules[0];
        assert_eq!(rule.id, "I_LOW_GABA_ANTACID");
        assert_eq!(rule.severity, Severity::Low);
        assert!(rec.monitoring.is_empty());
        // Something fired, so the preference default does not apply.
        assert!(rec.primary_recommendation.text.contains("Insufficient data"));
        assert!(rec.clinician_review_required);
    }

    // ── Risk thresholds ───────────────────────────────────────────────────────

    #[test]
    fn high_ascvd_blocks_with_avoid_estrogen_alternative() {
        let mut i = inputs("Estrogen (systemic)");
        i.risk_scores.ascvd = Some(ProvidedScore::computed(25.0));
        let rec = engine().evaluate(&i);

        assert!(rec.fired("ASCVD_high"));
        assert!(rec.alternatives.contains(&"Avoid estrogen-based HRT".to_string()));
        assert_eq!(rec.primary_recommendation.strength, Strength::NotRecommended);
        let rule = rec.fired_rules.iter().find(|r| r.id == "ASCVD_high").unwrap();
        assert_eq!(rule.description, "High ASCVD risk (25% ≥ 20%)");
        assert_eq!(rule.collection, KnowledgeCollection::Thresholds);
        assert_eq!(rule.category, RuleCategory::RiskThreshold);
    }

    #[test]
    fn high_wells_blocks() {
        let mut i = inputs("Estrogen (systemic)");
        i.risk_scores.wells = Some(ProvidedScore::computed(3.0));
        let rec = engine().evaluate(&i);
        assert!(rec.fired("WELLS_high"));
        assert_eq!(rec.primary_recommendation.strength, Strength::NotRecommended);
    }

    #[test]
    fn frax_and_gail_add_actions_without_blocking() {
        let mut i = inputs("Estrogen (systemic)");
        i.risk_scores.frax_major = Some(ProvidedScore::computed(22.0));
        i.risk_scores.gail_5yr = Some(ProvidedScore::computed(2.0));
        let rec = engine().evaluate(&i);

        assert_eq!(ids(&rec), vec!["FRAX_high", "GAIL_elevated"]);
        assert_eq!(rec.primary_recommendation.strength, Strength::Conditional);
        assert!(rec.clinician_review_required);
        assert!(rec.monitoring.contains(&"Annual mammography".to_string()));
        // FRAX is visited first, so it owns the headline.
        assert!(rec.primary_recommendation.text.starts_with("Consider bone-protective"));
    }

    #[test]
    fn first_metric_wins_headline_all_contribute() {
        let mut i = inputs("Estrogen (systemic)");
        i.risk_scores.ascvd = Some(ProvidedScore::computed(25.0));
        i.risk_scores.wells = Some(ProvidedScore::computed(4.0));
        let rec = engine().evaluate(&i);

        assert_eq!(ids(&rec), vec!["ASCVD_high", "WELLS_high"]);
        assert!(rec.primary_recommendation.text.starts_with("Avoid estrogen-based HRT"));
        assert!(rec.alternatives.contains(&"Consider non-oral (transdermal) route".to_string()));
    }

    #[test]
    fn risk_block_does_not_override_earlier_headline() {
        let mut i = with_conditions(inputs("Estrogen (systemic)"), &["uncontrolled_hypertension"]);
        i.risk_scores.ascvd = Some(ProvidedScore::computed(25.0));
        let rec = engine().evaluate(&i);

        assert!(rec.fired("ASCVD_high"));
        assert_eq!(rec.primary_recommendation.strength, Strength::Conditional);
        assert!(rec.primary_recommendation.text.contains("hypertension"));
        assert!(rec.alternatives.contains(&"Avoid estrogen-based HRT".to_string()));
    }

    #[test]
    fn high_ascvd_is_not_also_reported_as_intermediate() {
        let mut i = inputs("Estrogen (systemic)");
        i.risk_scores.ascvd = Some(ProvidedScore::computed(25.0));
        i.risk_scores.frax_major = Some(ProvidedScore::computed(22.0));
        let mut knowledge = knowledge();
        // Put the moderate pass first so the high pass is not stopped early.
        knowledge.precedence = vec![Stage::RiskModerate, Stage::RiskHigh];
        let rec = DecisionEngine::new(Arc::new(knowledge)).evaluate(&i);
        assert_eq!(ids(&rec), vec!["ASCVD_high", "FRAX_high"]);
    }

    #[test]
    fn intermediate_ascvd_is_moderate_only() {
        let mut i = inputs("Estrogen (systemic)");
        i.risk_scores.ascvd = Some(ProvidedScore::computed(10.0));
        let rec = engine().evaluate(&i);
        let rule = &rec.fired_rules[0];
        assert_eq!(rule.id, "ASCVD_intermediate");
        assert_eq!(rule.severity, Severity::Moderate);
        assert_eq!(rec.primary_recommendation.strength, Strength::Conditional);
    }

    #[test]
    fn unavailable_scores_are_absent_not_zero() {
        let engine = DecisionEngine::with_config(
            Arc::new(knowledge()),
            EngineConfig {
                compute_missing_scores: true,
                ..EngineConfig::default()
            },
        );
        // No clinical inputs at all: every calculator is unavailable, so no
        // threshold fires and the preference default applies.
        let i = TreatmentInputs {
            selected_medicine: "Estrogen (systemic)".to_string(),
            ..TreatmentInputs::default()
        };
        let rec = engine.evaluate(&i);
        assert!(rec.fired_rules.is_empty());
        assert_eq!(
            rec.primary_recommendation.text,
            engine.knowledge().defaults.preference_guided
        );
        assert!(!rec.clinician_review_required);
    }

    #[test]
    fn missing_scores_computed_when_enabled() {
        let computing = DecisionEngine::with_config(
            Arc::new(knowledge()),
            EngineConfig {
                compute_missing_scores: true,
                ..EngineConfig::default()
            },
        );
        // 60 * 0.3 * 1.5 = 27% FRAX major, computed from age and sex alone.
        let mut i = inputs("Estrogen (systemic)");
        i.age = Some(60.0);
        let rec = computing.evaluate(&i);
        assert!(rec.fired("FRAX_high"));
        // Without the flag, absent scores stay absent.
        assert!(!engine().evaluate(&i).fired("FRAX_high"));
    }

    #[test]
    fn external_score_conflict_is_reported() {
        let mut i = inputs("Estrogen (systemic)");
        i.clinical.race = Some(Race::White);
        i.clinical.smoking_status = Some(false);
        i.clinical.systolic_bp = Some(120.0);
        i.clinical.total_cholesterol = Some(213.0);
        i.clinical.hdl_cholesterol = Some(50.0);
        i.clinical.diabetes = Some(false);
        i.age = Some(55.0);
        i.risk_scores.ascvd = Some(ProvidedScore::external(25.0));

        let rec = engine().evaluate(&i);
        assert_eq!(rec.risk_score_conflicts.len(), 1);
        let conflict = &rec.risk_score_conflicts[0];
        assert_eq!(conflict.score, ScoreKind::Ascvd);
        assert_eq!(conflict.external, 25.0);
        assert!(conflict.computed < 5.0);
        // The external value is what the threshold stage sees.
        assert!(rec.fired("ASCVD_high"));
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn clean_inputs_get_preference_default() {
        let rec = engine().evaluate(&inputs("Estrogen (systemic)"));
        assert_eq!(rec.primary_recommendation.strength, Strength::Conditional);
        assert_eq!(
            rec.primary_recommendation.text,
            engine().knowledge().defaults.preference_guided
        );
        assert!(!rec.clinician_review_required);
    }

    #[test]
    fn precedence_without_default_stage_falls_back_to_insufficient_data() {
        let mut knowledge = knowledge();
        knowledge.precedence = vec![Stage::AbsoluteContraindications];
        let rec = DecisionEngine::new(Arc::new(knowledge)).evaluate(&inputs("Estrogen (systemic)"));
        assert!(rec.primary_recommendation.text.contains("Insufficient data"));
        assert!(rec.clinician_review_required);
    }

    // ── Lookup and helpers ────────────────────────────────────────────────────

    #[test]
    fn rule_lookup_reports_collection() {
        let engine = engine();
        assert_eq!(
            engine.rule_by_id("C_ABS_PREGNANCY").map(|r| r.collection()),
            Some(KnowledgeCollection::Contraindications)
        );
        assert_eq!(
            engine.rule_by_id("I_HI_EST_WARF").map(|r| r.collection()),
            Some(KnowledgeCollection::Interactions)
        );
        match engine.rule_by_id("ASCVD_high") {
            Some(RuleLookup::ThresholdAction { id, action }) => {
                assert_eq!(id, "ASCVD_high");
                assert!(!action.alternatives.is_empty());
            }
            other => panic!("expected threshold action, got {other:?}"),
        }
        assert!(engine.rule_by_id("NOPE").is_none());
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_drug(" Estrogen (Systemic) "), "estrogen systemic");
    }

    // ── Determinism ───────────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn evaluation_is_deterministic(
            ascvd in proptest::option::of(0.0f64..40.0),
            wells in proptest::option::of(0.0f64..6.0),
            pregnant in any::<bool>(),
            warfarin in any::<bool>(),
        ) {
            let mut i = inputs("Estrogen (systemic)");
            i.risk_scores.ascvd = ascvd.map(ProvidedScore::computed);
            i.risk_scores.wells = wells.map(ProvidedScore::computed);
            if pregnant {
                i.conditions.insert("pregnancy".to_string());
            }
            if warfarin {
                i.current_medications.push("Warfarin".to_string());
            }

            let engine = engine();
            let first = engine.evaluate(&i);
            let second = engine.evaluate(&i);
            prop_assert_eq!(&first, &second);

            if pregnant {
                prop_assert_eq!(first.primary_recommendation.strength, Strength::NotRecommended);
                prop_assert!(first.clinician_review_required);
                prop_assert!(!first.fired("I_HI_EST_WARF"));
            }
        }
    }
}
