//! In-memory `KeyValueStore` with a hash-chained write ledger.
//!
//! `InMemoryPlanStore` keeps the current value of every key in a map and
//! appends a `WriteEvent` for every `set`. `verify_integrity` checks both
//! the chain itself and that each stored value still matches the digest of
//! its most recent write, so editing a value in place is detected as well
//! as editing the ledger.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::Utc;
use tracing::{debug, warn};

use mht_contracts::error::{MhtError, MhtResult};
use mht_core::traits::KeyValueStore;

use crate::{
    chain::{digest_value, hash_event, verify_chain},
    event::{WriteEvent, WriteLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct StoreState {
    /// Current value per key.
    pub(crate) values: HashMap<String, String>,

    /// Every write so far, in append order.
    pub(crate) events: Vec<WriteEvent>,

    /// Next sequence number to assign.
    pub(crate) sequence: u64,

    /// `this_hash` of the last event, or `GENESIS_HASH`.
    pub(crate) last_hash: String,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An in-memory key/value store whose writes form a SHA-256 hash chain.
///
/// Cloning shares the underlying state.
#[derive(Clone)]
pub struct InMemoryPlanStore {
    store_id: String,
    pub(crate) state: Arc<Mutex<StoreState>>,
}

impl InMemoryPlanStore {
    pub fn new(store_id: impl Into<String>) -> Self {
        let state = StoreState {
            values: HashMap::new(),
            events: Vec::new(),
            sequence: 0,
            last_hash: WriteEvent::GENESIS_HASH.to_string(),
        };
        Self {
            store_id: store_id.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    fn lock(&self) -> MhtResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|e| MhtError::PersistenceFailed {
            reason: format!("plan store lock poisoned: {}", e),
        })
    }

    /// Snapshot of the write ledger.
    pub fn export_log(&self) -> MhtResult<WriteLog> {
        let state = self.lock()?;
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        Ok(WriteLog {
            store_id: self.store_id.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        })
    }

    /// True when the ledger is intact and every stored value matches the
    /// digest of its last recorded write.
    pub fn verify_integrity(&self) -> bool {
        let Ok(state) = self.lock() else {
            return false;
        };

        if !verify_chain(&state.events) {
            warn!(store_id = %self.store_id, "write ledger failed chain verification");
            return false;
        }

        let mut latest: HashMap<&str, &str> = HashMap::new();
        for event in &state.events {
            latest.insert(event.key.as_str(), event.value_digest.as_str());
        }

        let consistent = latest.len() == state.values.len()
            && state.values.iter().all(|(key, value)| {
                latest
                    .get(key.as_str())
                    .is_some_and(|digest| *digest == digest_value(value))
            });
        if !consistent {
            warn!(store_id = %self.store_id, "stored values diverge from the write ledger");
        }
        consistent
    }
}

// ── KeyValueStore impl ────────────────────────────────────────────────────────

impl KeyValueStore for InMemoryPlanStore {
    fn get(&self, key: &str) -> MhtResult<Option<String>> {
        Ok(self.lock()?.values.get(key).cloned())
    }

    /// Store `value` and append a ledger event committing to it.
    fn set(&self, key: &str, value: &str) -> MhtResult<()> {
        let mut state = self.lock()?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let value_digest = digest_value(value);
        let written_at = Utc::now();
        let this_hash = hash_event(
            &self.store_id,
            sequence,
            key,
            &value_digest,
            &written_at,
            &prev_hash,
        );

        state.events.push(WriteEvent {
            sequence,
            store_id: self.store_id.clone(),
            key: key.to_string(),
            value_digest,
            written_at,
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.values.insert(key.to_string(), value.to_string());
        state.sequence += 1;
        state.last_hash = this_hash;

        debug!(store_id = %self.store_id, key, sequence, bytes = value.len(), "value written");
        Ok(())
    }
}
