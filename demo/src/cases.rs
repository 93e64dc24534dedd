//! Built-in clinical cases for the `cases` subcommand.
//!
//! Each case pairs a decision-engine request with the offline assessment of
//! the same patient, so both engines can be compared side by side.

pub struct DemoCase {
    pub name: &'static str,
    pub description: &'static str,
    pub inputs: &'static str,
    pub assessment: &'static str,
}

pub const CASES: [DemoCase; 5] = [
    DemoCase {
        name: "pregnancy-warfarin",
        description: "Absolute contraindication outranks a high-severity interaction",
        inputs: r#"{
            "age": 34, "sex": "female",
            "selected_medicine": "Estrogen (systemic)",
            "current_medications": ["Warfarin"],
            "conditions": ["pregnancy"]
        }"#,
        assessment: r#"{
            "age": 34, "gender": "female", "medicine_type": "HRT",
            "symptoms": { "severity": 4 },
            "history": { "vte": false, "breast_cancer_active": false },
            "current_medications": ["Warfarin"]
        }"#,
    },
    DemoCase {
        name: "high-ascvd",
        description: "Externally supplied ASCVD above the high cutoff",
        inputs: r#"{
            "age": 62, "sex": "female",
            "selected_medicine": "Estrogen (systemic)",
            "risk_scores": { "ASCVD": { "value": 25, "source": "external" } },
            "clinical": { "total_cholesterol": 240, "hdl_cholesterol": 45,
                          "systolic_bp": 150, "hypertension_treatment": true }
        }"#,
        assessment: r#"{
            "age": 62, "gender": "female", "medicine_type": "HRT",
            "symptoms": { "severity": 7 },
            "history": { "vte": false, "breast_cancer_active": false },
            "current_medications": [],
            "risk_scores": { "ascvd": 25 }
        }"#,
    },
    DemoCase {
        name: "vte-history",
        description: "Prior VTE on HRT with anticoagulation",
        inputs: r#"{
            "age": 57, "sex": "female",
            "selected_medicine": "Estrogen (systemic)",
            "current_medications": ["Warfarin"],
            "conditions": ["vte_history"]
        }"#,
        assessment: r#"{
            "age": 57, "gender": "female", "medicine_type": "HRT",
            "symptoms": { "severity": 7 },
            "history": { "vte": true, "breast_cancer_active": false },
            "current_medications": ["Warfarin"],
            "risk_scores": { "ascvd": 12.5 }
        }"#,
    },
    DemoCase {
        name: "low-risk-mild",
        description: "Low cardiovascular risk with mild symptoms",
        inputs: r#"{
            "age": 51, "sex": "female",
            "selected_medicine": "Estradiol patch",
            "risk_scores": { "ASCVD": { "value": 3.1 } }
        }"#,
        assessment: r#"{
            "age": 51, "gender": "female", "medicine_type": "HRT",
            "symptoms": { "severity": 3 },
            "history": { "vte": false, "breast_cancer_active": false },
            "current_medications": [],
            "risk_scores": { "ascvd": 3.1 }
        }"#,
    },
    DemoCase {
        name: "incomplete",
        description: "Missing demographics",
        inputs: "{}",
        assessment: r#"{ "medicine_type": "HRT", "history": { "vte": true } }"#,
    },
];
