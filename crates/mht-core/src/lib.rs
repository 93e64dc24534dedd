//! # mht-core
//!
//! The deterministic decision pipeline for menopausal hormone therapy
//! treatment selection.
//!
//! This crate provides:
//! - The collaborator traits (`KnowledgeLoader`, `KeyValueStore`, `PlanVerifier`)
//! - `DecisionEngine`, the precedence pipeline over a shared Knowledge Store
//! - `OfflineRuleEngine`, the condition/action plan generator
//! - `PlanRepository`, best-effort persistence of generated plans
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mht_core::{DecisionEngine, OfflineRuleEngine, traits::KnowledgeLoader};
//! ```

pub mod condition;
pub mod engine;
pub mod offline;
pub mod plans;
pub mod traits;

#[cfg(test)]
mod fixtures;

pub use engine::{DecisionEngine, RuleLookup};
pub use offline::OfflineRuleEngine;
pub use plans::{PersistenceOutcome, PlanRepository, PLANS_KEY};
