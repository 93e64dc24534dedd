//! Collaborator traits at the edges of the decision pipeline.
//!
//! - `KnowledgeLoader` supplies the versioned rule collections
//! - `KeyValueStore`   persists generated plans (fallible, never fatal)
//! - `PlanVerifier`    checks a plan against its output contract
//!
//! The engines themselves are pure; everything that touches storage or
//! external documents sits behind one of these traits.

use mht_contracts::{
    error::MhtResult, knowledge::KnowledgeStore, plan::TreatmentPlan,
    verify::VerificationReport,
};

/// Source of the Knowledge Store.
///
/// Called once at startup. A failure here is fatal for plan generation.
pub trait KnowledgeLoader: Send + Sync {
    fn load(&self) -> MhtResult<KnowledgeStore>;
}

/// String key/value persistence used to cache generated plans.
///
/// Implementations may fail freely; callers treat every error as
/// "computation succeeded, persistence skipped".
pub trait KeyValueStore: Send + Sync {
    /// Return the value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> MhtResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> MhtResult<()>;
}

/// Output-contract check applied to a plan before it is returned.
pub trait PlanVerifier: Send + Sync {
    /// Return a report with `passed = false` and populated `failures` when
    /// any check fails. `Err` is reserved for a verifier that cannot run.
    fn verify(&self, plan: &TreatmentPlan) -> MhtResult<VerificationReport>;
}
