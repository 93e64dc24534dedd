//! Small in-code Knowledge Store shared by the unit tests.

use serde_json::json;

use mht_contracts::knowledge::KnowledgeStore;

pub(crate) fn knowledge() -> KnowledgeStore {
    let nams = json!({
        "title": "NAMS 2022 Hormone Therapy Position Statement",
        "url": "https://www.menopause.org/docs/default-source/professional/namspositionstatement2022.pdf",
        "version": "2022",
        "date": "2022-01-01",
        "type": "guideline"
    });
    let aha = json!({
        "title": "AHA/ACC Cardiovascular Risk Guidelines",
        "url": "https://www.acc.org/guidelines",
        "version": "2019",
        "date": "2019-01-01",
        "type": "guideline"
    });

    serde_json::from_value(json!({
        "version": "test-1",
        "precedence": [
            "absolute_contraindications",
            "interactions_high",
            "risk_high",
            "risk_moderate",
            "preference_guided"
        ],
        "defaults": {
            "insufficient_data": "Insufficient data to make a treatment recommendation",
            "preference_guided": "Treatment may be considered based on symptom burden and patient preference"
        },
        "contraindications": [
            {
                "id": "C_ABS_PREGNANCY",
                "condition": "pregnancy",
                "type": "absolute",
                "message": "Pregnancy is an absolute contraindication to hormone therapy"
            },
            {
                "id": "C_ABS_VTE",
                "condition": "vte_history",
                "type": "absolute",
                "message": "Prior VTE contraindicates systemic estrogen",
                "treatments": ["Estrogen"]
            },
            {
                "id": "C_REL_HTN",
                "condition": "uncontrolled_hypertension",
                "type": "relative",
                "message": "Control hypertension before starting estrogen",
                "treatments": ["Estrogen"]
            }
        ],
        "interactions": [
            {
                "id": "I_HI_EST_WARF",
                "drug_a": "Estrogen (systemic)",
                "drug_b": "Warfarin",
                "severity": "high",
                "action": "avoid",
                "message": "Estrogen alters warfarin response and raises thrombotic risk"
            },
            {
                "id": "I_MOD_STJ_COC",
                "drug_a": "Herbal supplement (St John's Wort)",
                "drug_b": "Combined oral contraceptive",
                "severity": "moderate",
                "action": "monitor",
                "message": "St John's Wort may reduce contraceptive effectiveness"
            },
            {
                "id": "I_LOW_GABA_ANTACID",
                "drug_a": "Gabapentin",
                "drug_b": "Antacid",
                "severity": "low",
                "action": "counsel",
                "message": "Separate gabapentin and antacid doses by two hours"
            }
        ],
        "risk_thresholds": {
            "ASCVD": { "high": 20.0, "low": 7.5 },
            "FRAX_major": { "high": 20.0 },
            "GAIL_5yr": { "elevated_5yr": 1.67 },
            "WELLS_VTE": { "high": 2.0 }
        },
        "threshold_actions": {
            "ASCVD_high": {
                "alternatives": ["Avoid estrogen-based HRT", "Consider non-hormonal options"],
                "monitoring": ["Cardiology review"]
            },
            "ASCVD_intermediate": {
                "alternatives": ["Prefer transdermal estradiol at the lowest effective dose"],
                "monitoring": ["Reassess cardiovascular risk annually"]
            },
            "FRAX_high": {
                "alternatives": ["Consider bone-protective therapy"],
                "monitoring": ["DXA scan"]
            },
            "GAIL_elevated": {
                "alternatives": ["Discuss breast cancer risk before combined therapy"],
                "monitoring": ["Annual mammography"]
            },
            "WELLS_high": {
                "alternatives": ["Avoid oral estrogen until VTE is excluded", "Consider non-oral (transdermal) route"],
                "monitoring": ["Compression ultrasound"]
            }
        },
        "pack": {
            "version": "1.0.0",
            "sources": [nams, aha],
            "rules": [
                {
                    "id": "rule-hrt-vte-contraindication",
                    "condition": { "all": [
                        { "field": "medicine_type", "op": "equals", "value": "HRT" },
                        { "field": "history.vte", "op": "equals", "value": true }
                    ] },
                    "action": {
                        "category": "Urgent",
                        "text": "HRT is contraindicated due to prior VTE, refer for risk stratification.",
                        "rationale": "VTE history increases thrombosis risk on estrogen-containing therapy.",
                        "evidence": [nams],
                        "priority": 1,
                        "confidence": 0.95,
                        "contraindications": ["VTE history"]
                    }
                },
                {
                    "id": "rule-lifestyle-first-low-risk",
                    "condition": { "all": [
                        { "field": "risk_scores.ascvd", "op": "less_than", "value": 7.5 },
                        { "field": "symptoms.severity", "op": "less_than", "value": 6 }
                    ] },
                    "action": {
                        "category": "Lifestyle",
                        "text": "Consider lifestyle modifications first.",
                        "rationale": "Mild symptoms with low cardiovascular risk.",
                        "evidence": [nams],
                        "priority": 5,
                        "confidence": 0.75
                    }
                },
                {
                    "id": "rule-cardiology-consult-high-ascvd",
                    "condition": { "all": [
                        { "field": "medicine_type", "op": "equals", "value": "HRT" },
                        { "field": "risk_scores.ascvd", "op": "greater_than", "value": 10 }
                    ] },
                    "action": {
                        "category": "Refer",
                        "text": "Consider cardiology consultation before HRT initiation.",
                        "rationale": "Elevated ASCVD score.",
                        "evidence": [aha],
                        "priority": 3,
                        "confidence": 0.85
                    }
                },
                {
                    "id": "rule-nonpharm-sleep",
                    "condition": { "field": "symptoms.sleep_disturbances", "op": "greater_than", "value": 5 },
                    "action": {
                        "category": "NonPharm",
                        "text": "Cognitive behavioural therapy for insomnia.",
                        "rationale": "Effective for menopausal sleep disturbance.",
                        "evidence": [nams],
                        "priority": 4,
                        "confidence": 0.8
                    }
                },
                {
                    "id": "rule-pharm-vasomotor",
                    "condition": { "field": "symptoms.vasomotor_symptoms", "op": "greater_than", "value": 6 },
                    "action": {
                        "category": "Pharm",
                        "text": "Consider systemic hormone therapy for vasomotor symptoms.",
                        "rationale": "Most effective treatment for hot flushes.",
                        "evidence": [nams],
                        "priority": 2,
                        "confidence": 0.9
                    }
                }
            ],
            "interactions": [
                {
                    "drug1": "warfarin",
                    "drug2": "herbal_supplements",
                    "severity": "major",
                    "description": "Herbal supplements may affect warfarin metabolism"
                },
                {
                    "drug1": "HRT",
                    "drug2": "warfarin",
                    "severity": "moderate",
                    "description": "Estrogen may affect warfarin effectiveness"
                }
            ]
        }
    }))
    .expect("fixture knowledge is well formed")
}
