//! Gail model 5-year invasive breast cancer risk.

use mht_contracts::{
    inputs::RiskInputs,
    risk::{Confidence, RiskScore, Sex},
};

use crate::round_to;

/// SEER-derived 5-year baseline incidence (percent) by age band.
fn baseline(age: f64) -> f64 {
    if age < 50.0 {
        0.49
    } else if age < 60.0 {
        1.07
    } else if age < 70.0 {
        1.86
    } else {
        2.48
    }
}

pub fn category(risk: f64) -> &'static str {
    if risk < 1.7 {
        "Average risk (<1.7%)"
    } else {
        "High risk (≥1.7%)"
    }
}

/// Compute the 5-year risk for a female patient.
///
/// Any sex other than a recorded female makes the score unavailable with
/// the single marker `female_sex_required`.
pub fn compute(inputs: &RiskInputs) -> RiskScore {
    if inputs.sex != Some(Sex::Female) {
        return RiskScore::unavailable(["female_sex_required"]);
    }

    let b = &inputs.clinical.breast;
    let mut missing = Vec::new();
    if inputs.age.is_none() {
        missing.push("age");
    }
    if b.age_menarche.is_none() {
        missing.push("age_menarche");
    }
    if b.age_first_birth.is_none() {
        missing.push("age_first_birth");
    }
    if b.num_relatives.is_none() {
        missing.push("num_relatives");
    }
    if b.num_biopsies.is_none() {
        missing.push("num_biopsies");
    }

    let (Some(age), Some(menarche), Some(first_birth), Some(relatives), Some(biopsies)) = (
        inputs.age,
        b.age_menarche,
        b.age_first_birth,
        b.num_relatives,
        b.num_biopsies,
    ) else {
        return RiskScore::unavailable(missing);
    };

    let mut relative_risk = 1.0;

    if menarche < 12.0 {
        relative_risk *= 1.21;
    } else if menarche >= 14.0 {
        relative_risk *= 0.93;
    }

    if first_birth == 0.0 {
        relative_risk *= if age < 30.0 { 1.93 } else { 1.53 };
    } else if first_birth >= 30.0 {
        relative_risk *= 1.27;
    } else if first_birth < 20.0 {
        relative_risk *= 0.76;
    }

    relative_risk *= match relatives {
        0 => 1.0,
        1 => 1.61,
        _ => 2.76,
    };

    let atypia = b.atypical_hyperplasia == Some(true);
    relative_risk *= match (biopsies, atypia) {
        (0, _) => 1.0,
        (1, true) => 1.82,
        (1, false) => 1.27,
        (_, true) => 2.19,
        (_, false) => 1.62,
    };

    let risk = baseline(age) * relative_risk;
    RiskScore::computed(round_to(risk, 2), Confidence::High, category(risk))
}
