//! Simplified FRAX 10-year fracture probability.
//!
//! Without bone-density data the model is multiplicative: an age-driven
//! baseline scaled by each recorded clinical risk factor.

use mht_contracts::{
    inputs::RiskInputs,
    risk::{Confidence, RiskScore, Sex},
};

use crate::round_to;

pub fn major_category(risk: f64) -> &'static str {
    if risk < 10.0 {
        "Low (<10%)"
    } else if risk < 20.0 {
        "Moderate (10-20%)"
    } else {
        "High (≥20%)"
    }
}

pub fn hip_category(risk: f64) -> &'static str {
    if risk < 3.0 {
        "Low (<3%)"
    } else {
        "High (≥3%)"
    }
}

/// Major osteoporotic fracture probability in percent, capped at 50.
///
/// Requires age and sex.
pub fn compute_major(inputs: &RiskInputs) -> RiskScore {
    let (Some(age), Some(sex)) = (inputs.age, inputs.sex) else {
        let mut missing = Vec::new();
        if inputs.age.is_none() {
            missing.push("age");
        }
        if inputs.sex.is_none() {
            missing.push("sex");
        }
        return RiskScore::unavailable(missing);
    };

    let c = &inputs.clinical;
    let f = &c.fracture;
    let factors = [
        (sex == Sex::Female, 1.5),
        (f.previous_fracture == Some(true), 1.8),
        (f.parental_hip_fracture == Some(true), 1.7),
        (c.smoking_status == Some(true), 1.4),
        (f.glucocorticoids == Some(true), 2.3),
        (f.rheumatoid_arthritis == Some(true), 1.4),
        (f.secondary_osteoporosis == Some(true), 1.6),
        (f.alcohol_3_units == Some(true), 1.7),
    ];
    let risk = factors
        .iter()
        .filter(|(present, _)| *present)
        .fold(age * 0.3, |acc, (_, multiplier)| acc * multiplier)
        .clamp(0.0, 50.0);

    RiskScore::computed(round_to(risk, 1), Confidence::Medium, major_category(risk))
}

/// Hip fracture probability: a quarter of the major-fracture probability.
pub fn compute_hip(inputs: &RiskInputs) -> RiskScore {
    let major = compute_major(inputs);
    if !major.is_available() {
        return major;
    }
    let hip = major.value * 0.25;
    RiskScore::computed(round_to(hip, 1), Confidence::Medium, hip_category(hip))
}
