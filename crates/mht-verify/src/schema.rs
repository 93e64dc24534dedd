//! JSON Schema for a serialized `TreatmentPlan`.

use serde_json::{json, Value};

/// Structural contract of a plan as it leaves the offline engine.
///
/// Only shape is checked here. Value constraints that depend on other fields
/// (urgent confidence, option categories) are business rules in the engine.
pub fn plan_schema() -> Value {
    let recommendation = json!({
        "type": "object",
        "required": ["type", "priority", "text", "rationale", "evidence", "confidence"],
        "properties": {
            "type": { "enum": ["Urgent", "Refer", "Pharm", "NonPharm", "Lifestyle"] },
            "priority": { "type": "integer", "minimum": 0 },
            "text": { "type": "string", "minLength": 1 },
            "rationale": { "type": "string" },
            "evidence": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["title", "version"],
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "version": { "type": "string" }
                    }
                }
            },
            "confidence": { "type": "number" },
            "requires_more_data": { "type": "boolean" }
        }
    });

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "TreatmentPlan",
        "type": "object",
        "required": [
            "plan_id", "timestamp", "input_snapshot", "recommendations", "summary",
            "flags", "general_plan", "specific_options", "audit_trail"
        ],
        "properties": {
            "plan_id": { "type": "string" },
            "timestamp": { "type": "string" },
            "input_snapshot": { "type": "object" },
            "recommendations": { "type": "array", "items": recommendation.clone() },
            "summary": { "type": "string", "minLength": 1 },
            "flags": {
                "type": "object",
                "required": ["urgent", "contraindicated", "missing_data"],
                "properties": {
                    "urgent": { "type": "boolean" },
                    "contraindicated": { "type": "array", "items": { "type": "string" } },
                    "missing_data": { "type": "array", "items": { "type": "string" } }
                }
            },
            "general_plan": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 3,
                "maxItems": 3
            },
            "specific_options": { "type": "array", "items": recommendation },
            "audit_trail": {
                "type": "object",
                "required": ["rules_matched", "evidence_used", "evaluation_time_ms", "knowledge_version"],
                "properties": {
                    "rules_matched": { "type": "array", "items": { "type": "string" } },
                    "evidence_used": { "type": "array" },
                    "evaluation_time_ms": { "type": "integer", "minimum": 0 },
                    "knowledge_version": { "type": "string", "minLength": 1 }
                }
            }
        }
    })
}
