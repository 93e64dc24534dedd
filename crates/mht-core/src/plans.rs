//! Best-effort persistence of generated plans.
//!
//! Plans are kept as one JSON array under a single key of a
//! `KeyValueStore`. Storage is a convenience, not part of the computation:
//! every failure is logged and swallowed so the caller's plan is unaffected.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use mht_contracts::{
    error::{MhtError, MhtResult},
    plan::TreatmentPlan,
};

use crate::traits::KeyValueStore;

/// Storage key holding the saved-plan list.
pub const PLANS_KEY: &str = "offline_treatment_plans";

/// What happened to a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceOutcome {
    Saved { retained: usize },
    Skipped { reason: String },
}

/// Saved-plan list over a key/value store, capped at the most recent N.
#[derive(Clone)]
pub struct PlanRepository {
    store: Arc<dyn KeyValueStore>,
    max_saved: usize,
}

impl PlanRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, max_saved: usize) -> Self {
        Self { store, max_saved }
    }

    /// Append `plan`, dropping the oldest entries beyond the cap.
    pub fn save_plan(&self, plan: &TreatmentPlan) -> PersistenceOutcome {
        match self.try_save(plan) {
            Ok(retained) => {
                info!(plan_id = %plan.plan_id, retained, "treatment plan saved");
                PersistenceOutcome::Saved { retained }
            }
            Err(e) => {
                warn!(plan_id = %plan.plan_id, error = %e, "treatment plan not saved");
                PersistenceOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// All saved plans, oldest first. Empty when nothing is stored or the
    /// stored value cannot be read.
    pub fn saved_plans(&self) -> Vec<TreatmentPlan> {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "saved plans unavailable");
            Vec::new()
        })
    }

    pub fn plan_by_id(&self, plan_id: Uuid) -> Option<TreatmentPlan> {
        self.saved_plans().into_iter().find(|p| p.plan_id == plan_id)
    }

    fn load(&self) -> MhtResult<Vec<TreatmentPlan>> {
        match self.store.get(PLANS_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| MhtError::Serialization {
                reason: format!("stored plan list is not valid: {e}"),
            }),
            None => Ok(Vec::new()),
        }
    }

    fn try_save(&self, plan: &TreatmentPlan) -> MhtResult<usize> {
        let mut plans = self.load()?;
        plans.push(plan.clone());
        if plans.len() > self.max_saved {
            let excess = plans.len() - self.max_saved;
            debug!(excess, "dropping oldest saved plans");
            plans.drain(..excess);
        }

        let raw = serde_json::to_string(&plans).map_err(|e| MhtError::Serialization {
            reason: e.to_string(),
        })?;
        self.store.set(PLANS_KEY, &raw)?;
        Ok(plans.len())
    }
}
