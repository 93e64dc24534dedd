//! # mht-audit
//!
//! Tamper-evident storage for generated treatment plans.
//!
//! ## Overview
//!
//! [`InMemoryPlanStore`] implements
//! [`KeyValueStore`](mht_core::traits::KeyValueStore). Every `set` is
//! appended to a SHA-256 hash chain, so any edit to the ledger or to a
//! stored value is detected by `verify_integrity`.
//!
//! [`fingerprint_plan`] hashes the deterministic content of a plan, letting
//! two runs over the same assessment be compared without their ids and
//! timestamps.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mht_audit::InMemoryPlanStore;
//! use mht_core::PlanRepository;
//!
//! let store = InMemoryPlanStore::new("clinic-laptop");
//! let plans = PlanRepository::new(Arc::new(store.clone()), 50);
//! plans.save_plan(&plan);
//! assert!(store.verify_integrity());
//! ```

pub mod chain;
pub mod event;
pub mod fingerprint;
pub mod store;

pub use chain::{digest_value, hash_event, verify_chain};
pub use event::{WriteEvent, WriteLog};
pub use fingerprint::fingerprint_plan;
pub use store::InMemoryPlanStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
