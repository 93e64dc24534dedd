//! Hash-chain primitives.
//!
//! Hash input layout (bytes, in order):
//!   1. store_id as UTF-8
//!   2. sequence as 8-byte little-endian
//!   3. key as UTF-8
//!   4. value_digest as UTF-8 (64 hex chars)
//!   5. written_at as RFC 3339 with nanoseconds
//!   6. prev_hash as UTF-8 (64 hex chars)
//!
//! Variable-length fields are each followed by a 0 byte so that
//! ("ab", "c") and ("a", "bc") hash differently.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::event::WriteEvent;

/// SHA-256 of `value`, lowercase hex.
pub fn digest_value(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Compute `this_hash` for an event with the given fields.
pub fn hash_event(
    store_id: &str,
    sequence: u64,
    key: &str,
    value_digest: &str,
    written_at: &DateTime<Utc>,
    prev_hash: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(store_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(sequence.to_le_bytes());
    hasher.update(key.as_bytes());
    hasher.update([0u8]);
    hasher.update(value_digest.as_bytes());
    hasher.update(
        written_at
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
            .as_bytes(),
    );
    hasher.update(prev_hash.as_bytes());

    hex::encode(hasher.finalize())
}

/// True when every event links to its predecessor and its stored hash
/// matches the recomputed one. An empty chain is valid.
pub fn verify_chain(events: &[WriteEvent]) -> bool {
    let mut expected_prev = WriteEvent::GENESIS_HASH.to_string();

    for (position, event) in events.iter().enumerate() {
        if event.sequence != position as u64 || event.prev_hash != expected_prev {
            return false;
        }

        let recomputed = hash_event(
            &event.store_id,
            event.sequence,
            &event.key,
            &event.value_digest,
            &event.written_at,
            &event.prev_hash,
        );
        if event.this_hash != recomputed {
            return false;
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
