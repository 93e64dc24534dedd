//! Framingham 10-year general cardiovascular risk, point-table form.

use mht_contracts::{
    inputs::RiskInputs,
    risk::{Confidence, RiskScore, Sex},
};

/// Points for age. Below 20 the table has no band and scores nothing; the
/// 75-79 band also covers older patients.
fn age_points(age: f64, sex: Sex) -> i32 {
    if age < 20.0 {
        return 0;
    }
    // (upper bound exclusive, female, male)
    const BANDS: [(f64, i32, i32); 9] = [
        (35.0, -7, -9),
        (40.0, -3, -4),
        (45.0, 0, 0),
        (50.0, 3, 3),
        (55.0, 6, 6),
        (60.0, 8, 8),
        (65.0, 10, 10),
        (70.0, 12, 11),
        (75.0, 14, 12),
    ];
    let (female, male) = BANDS
        .iter()
        .find(|(upper, _, _)| age < *upper)
        .map(|(_, f, m)| (*f, *m))
        .unwrap_or((16, 13));
    match sex {
        Sex::Female => female,
        Sex::Male => male,
    }
}

fn cholesterol_points(total_cholesterol: f64, sex: Sex) -> i32 {
    let female = sex == Sex::Female;
    if total_cholesterol < 160.0 {
        0
    } else if total_cholesterol < 200.0 {
        4
    } else if total_cholesterol < 240.0 {
        if female { 8 } else { 7 }
    } else if total_cholesterol < 280.0 {
        if female { 11 } else { 9 }
    } else if female {
        13
    } else {
        11
    }
}

fn hdl_points(hdl: f64) -> i32 {
    if hdl >= 60.0 {
        -1
    } else if hdl >= 50.0 {
        0
    } else if hdl >= 40.0 {
        1
    } else {
        2
    }
}

fn blood_pressure_points(sbp: f64, treated: bool, sex: Sex) -> i32 {
    let female = sex == Sex::Female;
    let pick = |f: i32, m: i32| if female { f } else { m };
    if treated {
        if sbp < 120.0 {
            0
        } else if sbp < 130.0 {
            pick(3, 1)
        } else if sbp < 140.0 {
            pick(4, 2)
        } else if sbp < 160.0 {
            pick(5, 2)
        } else {
            pick(6, 3)
        }
    } else if sbp < 130.0 {
        0
    } else if sbp < 140.0 {
        1
    } else if sbp < 160.0 {
        pick(2, 1)
    } else {
        pick(3, 2)
    }
}

fn points_to_risk(points: i32) -> f64 {
    match points {
        p if p < 0 => 1.0,
        p if p < 5 => 2.0,
        p if p < 10 => 6.0,
        p if p < 15 => 11.0,
        p if p < 20 => 20.0,
        _ => 30.0,
    }
}

pub fn category(risk: f64) -> &'static str {
    if risk < 10.0 {
        "Low (<10%)"
    } else if risk < 20.0 {
        "Intermediate (10-20%)"
    } else {
        "High (≥20%)"
    }
}

/// Sum the Framingham points and map the total onto a risk band.
///
/// Requires age, sex, total and HDL cholesterol, systolic BP and smoking
/// status. Diabetes and hypertension treatment count only when recorded
/// as present.
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
    if c.smoking_status.is_none() {
        missing.push("smoking_status");
    }

    let (Some(age), Some(sex), Some(tc), Some(hdl), Some(sbp), Some(smoker)) = (
        inputs.age,
        inputs.sex,
        c.total_cholesterol,
        c.hdl_cholesterol,
        c.systolic_bp,
        c.smoking_status,
    ) else {
        return RiskScore::unavailable(missing);
    };

    let mut points = age_points(age, sex)
        + cholesterol_points(tc, sex)
        + hdl_points(hdl)
        + blood_pressure_points(sbp, c.hypertension_treatment.unwrap_or(false), sex);
    if smoker {
        points += if sex == Sex::Female { 9 } else { 8 };
    }
    if c.diabetes.unwrap_or(false) {
        points += 6;
    }

    let risk = points_to_risk(points);
    RiskScore::computed(risk, Confidence::High, category(risk))
}
