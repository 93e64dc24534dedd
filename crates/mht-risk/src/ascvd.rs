//! ASCVD 10-year risk via the Pooled Cohort Equations.

use mht_contracts::{
    inputs::RiskInputs,
    risk::{Confidence, Race, RiskScore, Sex},
};

use crate::round_to;

/// Coefficients for one sex × race cohort.
struct Cohort {
    ln_age: f64,
    ln_age_sq: f64,
    ln_tc: f64,
    ln_age_ln_tc: f64,
    ln_hdl: f64,
    ln_age_ln_hdl: f64,
    ln_sbp: f64,
    ln_age_ln_sbp: f64,
    ln_sbp_treated: f64,
    ln_age_ln_sbp_treated: f64,
    ln_sbp_untreated: f64,
    smoker: f64,
    ln_age_smoker: f64,
    diabetes: f64,
    mean: f64,
    baseline_survival: f64,
}

const ZERO: Cohort = Cohort {
    ln_age: 0.0,
    ln_age_sq: 0.0,
    ln_tc: 0.0,
    ln_age_ln_tc: 0.0,
    ln_hdl: 0.0,
    ln_age_ln_hdl: 0.0,
    ln_sbp: 0.0,
    ln_age_ln_sbp: 0.0,
    ln_sbp_treated: 0.0,
    ln_age_ln_sbp_treated: 0.0,
    ln_sbp_untreated: 0.0,
    smoker: 0.0,
    ln_age_smoker: 0.0,
    diabetes: 0.0,
    mean: 0.0,
    baseline_survival: 1.0,
};

const AFRICAN_AMERICAN_FEMALE: Cohort = Cohort {
    ln_age: 17.1141,
    ln_tc: 0.9396,
    ln_hdl: -18.9196,
    ln_age_ln_hdl: 4.4748,
    ln_sbp: 29.2907,
    ln_age_ln_sbp: -6.4321,
    ln_sbp_treated: 27.8197,
    ln_age_ln_sbp_treated: -6.0873,
    smoker: 0.6908,
    diabetes: 0.8738,
    mean: 86.6081,
    baseline_survival: 0.9533,
    ..ZERO
};

const WHITE_FEMALE: Cohort = Cohort {
    ln_age: -29.799,
    ln_age_sq: 4.884,
    ln_tc: 13.540,
    ln_age_ln_tc: -3.114,
    ln_hdl: -13.578,
    ln_age_ln_hdl: 3.149,
    ln_sbp_treated: 2.019,
    ln_sbp_untreated: 1.957,
    smoker: 7.574,
    ln_age_smoker: -1.665,
    diabetes: 0.661,
    mean: -29.18,
    baseline_survival: 0.9665,
    ..ZERO
};

const AFRICAN_AMERICAN_MALE: Cohort = Cohort {
    ln_age: 2.469,
    ln_tc: 0.302,
    ln_hdl: -0.307,
    ln_sbp_treated: 1.916,
    ln_sbp_untreated: 1.809,
    smoker: 0.549,
    diabetes: 0.645,
    mean: 19.54,
    baseline_survival: 0.8954,
    ..ZERO
};

const WHITE_MALE: Cohort = Cohort {
    ln_age: 12.344,
    ln_tc: 11.853,
    ln_age_ln_tc: -2.664,
    ln_hdl: -7.990,
    ln_age_ln_hdl: 1.769,
    ln_sbp_treated: 1.797,
    ln_sbp_untreated: 1.764,
    smoker: 7.837,
    ln_age_smoker: -1.795,
    diabetes: 0.658,
    mean: 61.18,
    baseline_survival: 0.9144,
    ..ZERO
};

fn cohort(sex: Sex, race: Option<Race>) -> &'static Cohort {
    let african_american = race == Some(Race::AfricanAmerican);
    match (sex, african_american) {
        (Sex::Female, true) => &AFRICAN_AMERICAN_FEMALE,
        (Sex::Female, false) => &WHITE_FEMALE,
        (Sex::Male, true) => &AFRICAN_AMERICAN_MALE,
        (Sex::Male, false) => &WHITE_MALE,
    }
}

pub fn category(risk: f64) -> &'static str {
    if risk < 5.0 {
        "Low (<5%)"
    } else if risk < 7.5 {
        "Borderline (5-7.5%)"
    } else if risk < 20.0 {
        "Intermediate (7.5-20%)"
    } else {
        "High (≥20%)"
    }
}

/// Compute the 10-year ASCVD risk in percent.
///
/// Requires age, sex, total and HDL cholesterol, systolic BP, diabetes and
/// smoking status. Age is clamped to the 40–79 validity range of the
/// equations.
pub fn compute(inputs: &RiskInputs) -> RiskScore {
    let c = &inputs.clinical;
    let mut missing = Vec::new();
    if inputs.age.is_none() {
        missing.push("age");
    }
    if inputs.sex.is_none() {
        missing.push("sex");
    }
    if c.total_cholesterol.is_none() {
        missing.push("total_cholesterol");
    }
    if c.hdl_cholesterol.is_none() {
        missing.push("hdl_cholesterol");
    }
    if c.systolic_bp.is_none() {
        missing.push("systolic_bp");
    }
    if c.diabetes.is_none() {
        missing.push("diabetes");
    }
    if c.smoking_status.is_none() {
        missing.push("smoking_status");
    }

    let (Some(age), Some(sex), Some(tc), Some(hdl), Some(sbp), Some(diabetes), Some(smoker)) = (
        inputs.age,
        inputs.sex,
        c.total_cholesterol,
        c.hdl_cholesterol,
        c.systolic_bp,
        c.diabetes,
        c.smoking_status,
    ) else {
        return RiskScore::unavailable(missing);
    };

    // The equations take logs of these; a non-positive reading is unusable.
    let readings = [
        ("total_cholesterol", tc),
        ("hdl_cholesterol", hdl),
        ("systolic_bp", sbp),
    ];
    let unusable: Vec<&str> = readings
        .into_iter()
        .filter(|(_, v)| v.is_nan() || *v <= 0.0)
        .map(|(field, _)| field)
        .collect();
    if !unusable.is_empty() {
        return RiskScore::unavailable(unusable);
    }

    let ln_age = age.clamp(40.0, 79.0).ln();
    let ln_tc = tc.ln();
    let ln_hdl = hdl.ln();
    let ln_sbp = sbp.ln();
    let smoker = f64::from(u8::from(smoker));
    let diabetes = f64::from(u8::from(diabetes));
    let treated = f64::from(u8::from(c.hypertension_treatment.unwrap_or(false)));

    let k = cohort(sex, c.race);
    let sum = k.ln_age * ln_age
        + k.ln_age_sq * ln_age * ln_age
        + k.ln_tc * ln_tc
        + k.ln_age_ln_tc * ln_age * ln_tc
        + k.ln_hdl * ln_hdl
        + k.ln_age_ln_hdl * ln_age * ln_hdl
        + k.ln_sbp * ln_sbp
        + k.ln_age_ln_sbp * ln_age * ln_sbp
        + k.ln_sbp_treated * ln_sbp * treated
        + k.ln_age_ln_sbp_treated * ln_age * ln_sbp * treated
        + k.ln_sbp_untreated * ln_sbp * (1.0 - treated)
        + k.smoker * smoker
        + k.ln_age_smoker * ln_age * smoker
        + k.diabetes * diabetes;

    let risk = 1.0 - k.baseline_survival.powf((sum - k.mean).exp());
    let percent = (risk * 100.0).clamp(0.0, 100.0);

    RiskScore::computed(round_to(percent, 1), Confidence::High, category(percent))
}
