//! # mht-contracts
//!
//! Shared types, knowledge model, and error contracts for the MHT decision
//! engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, small accessors, and error types.

pub mod assessment;
pub mod config;
pub mod error;
pub mod inputs;
pub mod knowledge;
pub mod plan;
pub mod recommendation;
pub mod risk;
pub mod rule;
pub mod verify;

#[cfg(test)]
mod tests {
    use super::*;
    use inputs::{ProvidedScore, RiskScores, TreatmentInputs};
    use plan::ActionCategory;
    use recommendation::Strength;
    use risk::{
        Confidence, Provenance, Resolution, RiskScore, RiskScoreWithConflict, ScoreKind,
        ScoreSource,
    };
    use rule::{Comparison, Condition, FieldPath, Literal, Operator};

    // ── Provenance ───────────────────────────────────────────────────────────

    #[test]
    fn untagged_provided_score_defaults_to_computed() {
        let score: ProvidedScore = serde_json::from_str(r#"{ "value": 12.5 }"#).unwrap();
        assert_eq!(score.source, Provenance::Computed);
        assert_eq!(score.value, 12.5);
    }

    #[test]
    fn risk_scores_use_clinical_names() {
        let scores: RiskScores = serde_json::from_str(
            r#"{ "ASCVD": { "value": 25, "source": "external" }, "Wells": { "value": 3 } }"#,
        )
        .unwrap();
        assert_eq!(scores.get(ScoreKind::Ascvd), Some(ProvidedScore::external(25.0)));
        assert_eq!(scores.get(ScoreKind::Wells), Some(ProvidedScore::computed(3.0)));
        assert_eq!(scores.get(ScoreKind::FraxMajor), None);
    }

    #[test]
    fn treatment_inputs_tolerate_missing_fields() {
        let inputs: TreatmentInputs = serde_json::from_str("{}").unwrap();
        assert!(!inputs.has_selected_treatment());
        assert!(inputs.conditions.is_empty());

        let blank: TreatmentInputs =
            serde_json::from_str(r#"{ "selected_medicine": "   " }"#).unwrap();
        assert!(!blank.has_selected_treatment());
    }

    // ── RiskScore invariants ─────────────────────────────────────────────────

    #[test]
    fn unavailable_score_is_zero_with_missing_fields() {
        let score = RiskScore::unavailable(["age", "sex"]);
        assert_eq!(score.value, 0.0);
        assert_eq!(score.source, ScoreSource::Unavailable);
        assert_eq!(score.missing_fields, vec!["age", "sex"]);
        assert!(!score.is_available());
    }

    #[test]
    fn unavailable_score_never_has_empty_missing_list() {
        let score = RiskScore::unavailable(Vec::<String>::new());
        assert!(!score.missing_fields.is_empty());
    }

    #[test]
    fn conflict_accessors_report_both_values() {
        let resolved = RiskScoreWithConflict {
            kind: ScoreKind::Ascvd,
            resolution: Resolution::Conflict {
                value: 16.0,
                computed_value: 10.0,
                external_value: 16.0,
                conflict_percentage: 37.5,
            },
            confidence: Confidence::Medium,
            missing_fields: vec![],
            category: None,
        };
        assert_eq!(resolved.value(), 16.0);
        assert_eq!(resolved.source(), ScoreSource::External);
        assert_eq!(resolved.computed_value(), Some(10.0));
        assert_eq!(resolved.external_value(), Some(16.0));
        assert!(resolved.has_conflict());
        assert_eq!(resolved.conflict_percentage(), Some(37.5));
    }

    #[test]
    fn unavailable_resolution_has_no_value() {
        let resolved = RiskScoreWithConflict {
            kind: ScoreKind::Gail5yr,
            resolution: Resolution::Unavailable,
            confidence: Confidence::Low,
            missing_fields: vec!["female_sex_required".to_string()],
            category: None,
        };
        assert_eq!(resolved.available_value(), None);
        assert_eq!(resolved.value(), 0.0);
        assert_eq!(resolved.source(), ScoreSource::Unavailable);
        assert!(!resolved.has_conflict());
    }

    #[test]
    fn resolution_serializes_with_tag() {
        let resolved = RiskScoreWithConflict {
            kind: ScoreKind::Wells,
            resolution: Resolution::Computed { value: 2.0 },
            confidence: Confidence::High,
            missing_fields: vec![],
            category: Some("Moderate probability (1-2)".to_string()),
        };
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["kind"], "Wells");
        assert_eq!(json["resolution"], "computed");
        assert_eq!(json["value"], 2.0);
    }

    // ── Recommendation enums ─────────────────────────────────────────────────

    #[test]
    fn not_recommended_strength_uses_display_name() {
        let json = serde_json::to_string(&Strength::NotRecommended).unwrap();
        assert_eq!(json, r#""Not recommended""#);
        assert_eq!(Strength::NotRecommended.to_string(), "Not recommended");
    }

    #[test]
    fn action_categories_order_urgent_first() {
        let mut cats = vec![
            ActionCategory::Lifestyle,
            ActionCategory::Pharm,
            ActionCategory::Urgent,
            ActionCategory::NonPharm,
            ActionCategory::Refer,
        ];
        cats.sort();
        assert_eq!(
            cats,
            vec![
                ActionCategory::Urgent,
                ActionCategory::Refer,
                ActionCategory::Pharm,
                ActionCategory::NonPharm,
                ActionCategory::Lifestyle,
            ]
        );
    }

    // ── Condition tree ───────────────────────────────────────────────────────

    #[test]
    fn condition_tree_parses_dotted_fields() {
        let json = r#"{
            "all": [
                { "field": "medicine_type", "op": "equals", "value": "HRT" },
                { "any": [
                    { "field": "history.vte", "op": "equals", "value": true },
                    { "field": "risk_scores.ascvd", "op": "greater_than", "value": 10 }
                ] }
            ]
        }"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        let Condition::All { all } = condition else {
            panic!("expected an all-node");
        };
        assert_eq!(
            all[0],
            Condition::Compare(Comparison {
                field: FieldPath::MedicineType,
                op: Operator::Equals,
                value: Literal::Text("HRT".to_string()),
            })
        );
        let Condition::Any { any } = &all[1] else {
            panic!("expected an any-node");
        };
        assert_eq!(
            any[1],
            Condition::Compare(Comparison {
                field: FieldPath::RiskAscvd,
                op: Operator::GreaterThan,
                value: Literal::Number(10.0),
            })
        );
    }

    #[test]
    fn unknown_field_path_is_rejected() {
        let json = r#"{ "field": "history.unknown", "op": "equals", "value": true }"#;
        assert!(serde_json::from_str::<Condition>(json).is_err());
    }

    // ── Config ───────────────────────────────────────────────────────────────

    #[test]
    fn engine_config_defaults() {
        let config = config::EngineConfig::default();
        assert_eq!(config.conflict_threshold_pct, 5.0);
        assert!(!config.compute_missing_scores);
        assert_eq!(config.max_saved_plans, 50);
        assert_eq!(config.specific_options_limit, 5);
    }

    // ── MhtError display ─────────────────────────────────────────────────────

    #[test]
    fn knowledge_unavailable_display() {
        let err = error::MhtError::KnowledgeUnavailable {
            reason: "loader not initialized".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "knowledge pack not available: loader not initialized"
        );
    }
}
