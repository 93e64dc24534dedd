//! # mht-risk
//!
//! Local implementations of the clinical risk scores the decision engine
//! consults, and the resolver that reconciles them with externally supplied
//! values.
//!
//! Every calculator checks its required inputs first and returns an
//! unavailable `RiskScore` listing exactly what was missing. No clinical
//! value is ever defaulted to make a calculation possible.
//!
//! ```rust,ignore
//! use mht_risk::RiskResolver;
//!
//! let resolved = RiskResolver::default().resolve(ScoreKind::Ascvd, &inputs, Some(16.0));
//! if resolved.has_conflict() { /* surface both values */ }
//! ```

pub mod ascvd;
pub mod framingham;
pub mod frax;
pub mod gail;
pub mod resolver;
pub mod wells;

pub use resolver::{RiskResolver, DEFAULT_CONFLICT_THRESHOLD_PCT};

use mht_contracts::risk::ScoreKind;

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Display category for a score value. Never used for branching.
pub fn category(kind: ScoreKind, value: f64) -> &'static str {
    match kind {
        ScoreKind::Ascvd => ascvd::category(value),
        ScoreKind::Framingham => framingham::category(value),
        ScoreKind::FraxMajor => frax::major_category(value),
        ScoreKind::FraxHip => frax::hip_category(value),
        ScoreKind::Gail5yr => gail::category(value),
        ScoreKind::Wells => wells::category(value),
    }
}
