//! Risk-score types shared by the resolver and the decision engine.
//!
//! A `RiskScore` is what a single calculator produces. A
//! `RiskScoreWithConflict` is what the resolver hands back after reconciling
//! that computed value with an optionally supplied external value. The
//! reconciliation outcome is a tagged `Resolution`, so a value can never be
//! paired with the wrong provenance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Biological sex as used by the risk equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

/// Race grouping for the Pooled Cohort Equations.
///
/// Only `AfricanAmerican` selects a distinct coefficient set; `White` and
/// `Other` share the white coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    White,
    AfricanAmerican,
    Other,
}

/// The clinical risk scores the resolver knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoreKind {
    #[serde(rename = "ASCVD")]
    Ascvd,
    #[serde(rename = "Framingham")]
    Framingham,
    #[serde(rename = "FRAX_major")]
    FraxMajor,
    #[serde(rename = "FRAX_hip")]
    FraxHip,
    #[serde(rename = "GAIL_5yr")]
    Gail5yr,
    #[serde(rename = "Wells")]
    Wells,
}

impl ScoreKind {
    /// Every score kind, in resolution order.
    pub const ALL: [ScoreKind; 6] = [
        ScoreKind::Ascvd,
        ScoreKind::Framingham,
        ScoreKind::FraxMajor,
        ScoreKind::FraxHip,
        ScoreKind::Gail5yr,
        ScoreKind::Wells,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreKind::Ascvd => "ASCVD",
            ScoreKind::Framingham => "Framingham",
            ScoreKind::FraxMajor => "FRAX_major",
            ScoreKind::FraxHip => "FRAX_hip",
            ScoreKind::Gail5yr => "GAIL_5yr",
            ScoreKind::Wells => "Wells",
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a supplied risk score came from.
///
/// An untagged score is treated as `Computed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    External,
    #[default]
    Computed,
}

/// Provenance of a resolved value, including the "could not compute" case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    External,
    Computed,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// The output of a single calculator.
///
/// Build with `RiskScore::computed` or `RiskScore::unavailable`; the latter
/// guarantees `value == 0.0` and a non-empty `missing_fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub value: f64,
    pub source: ScoreSource,
    pub confidence: Confidence,
    /// Inputs that were absent. May be non-empty for a computed score when
    /// the calculator tolerates partial input (Wells).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    /// Display-only qualitative band. Never used for branching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl RiskScore {
    pub fn computed(value: f64, confidence: Confidence, category: impl Into<String>) -> Self {
        Self {
            value,
            source: ScoreSource::Computed,
            confidence,
            missing_fields: Vec::new(),
            category: Some(category.into()),
        }
    }

    /// A score that could not be computed because `missing_fields` were absent.
    pub fn unavailable<I, S>(missing_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut missing: Vec<String> = missing_fields.into_iter().map(Into::into).collect();
        if missing.is_empty() {
            missing.push("unspecified".to_string());
        }
        Self {
            value: 0.0,
            source: ScoreSource::Unavailable,
            confidence: Confidence::Low,
            missing_fields: missing,
            category: None,
        }
    }

    pub fn with_missing_fields(mut self, missing_fields: Vec<String>) -> Self {
        self.missing_fields = missing_fields;
        self
    }

    pub fn is_available(&self) -> bool {
        self.source != ScoreSource::Unavailable
    }
}

/// How the resolver reconciled computed and external values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum Resolution {
    /// No external value, and the calculator lacked inputs.
    Unavailable,
    /// Only the locally computed value exists.
    Computed { value: f64 },
    /// The external value is used. `computed_value` is present when a local
    /// value existed and agreed within the threshold.
    External {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        computed_value: Option<f64>,
    },
    /// Both values exist and differ by more than the threshold. `value` is
    /// always the external value.
    Conflict {
        value: f64,
        computed_value: f64,
        external_value: f64,
        conflict_percentage: f64,
    },
}

/// A resolved score, as consumed by the decision engine and the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScoreWithConflict {
    pub kind: ScoreKind,
    #[serde(flatten)]
    pub resolution: Resolution,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl RiskScoreWithConflict {
    /// The value to display and to compare against thresholds. Zero when
    /// unavailable; use `available_value` when absence matters.
    pub fn value(&self) -> f64 {
        self.available_value().unwrap_or(0.0)
    }

    pub fn available_value(&self) -> Option<f64> {
        match &self.resolution {
            Resolution::Unavailable => None,
            Resolution::Computed { value }
            | Resolution::External { value, .. }
            | Resolution::Conflict { value, .. } => Some(*value),
        }
    }

    pub fn source(&self) -> ScoreSource {
        match &self.resolution {
            Resolution::Unavailable => ScoreSource::Unavailable,
            Resolution::Computed { .. } => ScoreSource::Computed,
            Resolution::External { .. } | Resolution::Conflict { .. } => ScoreSource::External,
        }
    }

    pub fn external_value(&self) -> Option<f64> {
        match &self.resolution {
            Resolution::External { value, .. } => Some(*value),
            Resolution::Conflict { external_value, .. } => Some(*external_value),
            _ => None,
        }
    }

    pub fn computed_value(&self) -> Option<f64> {
        match &self.resolution {
            Resolution::Computed { value } => Some(*value),
            Resolution::External { computed_value, .. } => *computed_value,
            Resolution::Conflict { computed_value, .. } => Some(*computed_value),
            Resolution::Unavailable => None,
        }
    }

    pub fn has_conflict(&self) -> bool {
        matches!(self.resolution, Resolution::Conflict { .. })
    }

    pub fn conflict_percentage(&self) -> Option<f64> {
        match &self.resolution {
            Resolution::Conflict { conflict_percentage, .. } => Some(*conflict_percentage),
            _ => None,
        }
    }
}
