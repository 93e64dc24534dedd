//! Wells score for venous thromboembolism probability.
//!
//! Unlike the other calculators, Wells tolerates partial input: unrecorded
//! findings are treated as absent and listed in `missing_fields`, with
//! confidence lowered as the gap grows. Only when more than half of the
//! findings are unrecorded does the score become unavailable.

use mht_contracts::{
    inputs::RiskInputs,
    risk::{Confidence, RiskScore},
};

/// More unrecorded findings than this makes the score unavailable.
const MAX_MISSING: usize = 5;

pub fn category(score: f64) -> &'static str {
    if score <= 0.0 {
        "Low probability (≤0)"
    } else if score <= 2.0 {
        "Moderate probability (1-2)"
    } else {
        "High probability (≥3)"
    }
}

pub fn compute(inputs: &RiskInputs) -> RiskScore {
    let w = &inputs.clinical.wells;
    let one_point = [
        ("active_cancer", w.active_cancer),
        ("paralysis_paresis", w.paralysis_paresis),
        ("recently_bedridden", w.recently_bedridden),
        ("major_surgery", w.major_surgery),
        ("localized_tenderness", w.localized_tenderness),
        ("entire_leg_swollen", w.entire_leg_swollen),
        ("calf_swelling", w.calf_swelling),
        ("pitting_edema", w.pitting_edema),
        ("collateral_veins", w.collateral_veins),
    ];

    let mut score = 0.0;
    let mut missing: Vec<String> = Vec::new();
    for (name, finding) in one_point {
        match finding {
            Some(true) => score += 1.0,
            Some(false) => {}
            None => missing.push(name.to_string()),
        }
    }
    match w.alternative_diagnosis {
        Some(true) => score -= 2.0,
        Some(false) => {}
        None => missing.push("alternative_diagnosis".to_string()),
    }

    if missing.len() > MAX_MISSING {
        return RiskScore::unavailable(missing);
    }

    let confidence = match missing.len() {
        0 => Confidence::High,
        1..=3 => Confidence::Medium,
        _ => Confidence::Low,
    };
    let score = f64::max(0.0, score);
    RiskScore::computed(score, confidence, category(score)).with_missing_fields(missing)
}
