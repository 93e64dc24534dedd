//! Write-ledger event and log types.
//!
//! `WriteEvent` records one `set` on the plan store. It carries the SHA-256
//! digest of the stored value rather than the value itself, so the ledger
//! stays small while still committing to every byte written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry in the write ledger of one store.
///
/// Modifying any field invalidates `this_hash` and every later `prev_hash`,
/// which `verify_chain` detects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// The store this event belongs to.
    pub store_id: String,

    /// Key that was written.
    pub key: String,

    /// SHA-256 (hex) of the value written under `key`.
    pub value_digest: String,

    /// When the write happened.
    pub written_at: DateTime<Utc>,

    /// `this_hash` of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// SHA-256 (hex) over (store_id, sequence, key, value_digest,
    /// written_at, prev_hash).
    pub this_hash: String,
}

impl WriteEvent {
    /// The `prev_hash` of the first event in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// Snapshot of a store's ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteLog {
    pub store_id: String,

    /// All events in chain order.
    pub events: Vec<WriteEvent>,

    pub exported_at: DateTime<Utc>,

    /// `this_hash` of the last event. Empty if nothing was written.
    pub terminal_hash: String,
}
