//! # mht-verify
//!
//! Output-contract verification for generated treatment plans.
//!
//! This crate provides [`SchemaPlanVerifier`], which implements the
//! [`PlanVerifier`](mht_core::traits::PlanVerifier) trait. It checks plans
//! in two phases:
//!
//! 1. **Structural**: JSON Schema validation of the serialized plan.
//! 2. **Business rules**: general-plan lines, confidence bounds, the urgent
//!    confidence floor, and the specific-options cap and categories.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use mht_verify::SchemaPlanVerifier;
//!
//! let engine = OfflineRuleEngine::new(loader, config)
//!     .with_verifier(Box::new(SchemaPlanVerifier::new()));
//! ```

pub mod engine;
pub mod schema;

pub use engine::{SchemaPlanVerifier, DEFAULT_MAX_SPECIFIC_OPTIONS, URGENT_CONFIDENCE_FLOOR};
pub use schema::plan_schema;
