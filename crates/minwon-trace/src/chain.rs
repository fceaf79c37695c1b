//! Hashing and chain verification.
//!
//! Hash input, in order:
//!   1. run id as its hyphenated UUID string
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 (64 hex chars)
//!   4. compact JSON of the step record

use sha2::{Digest, Sha256};

use minwon_contracts::{
    error::{MinwonError, MinwonResult},
    execution::StepRecord,
    state::RunId,
};

use crate::event::TraceEvent;

/// Hex SHA-256 of one trace event's content.
pub fn hash_event(
    run_id: &RunId,
    sequence: u64,
    record: &StepRecord,
    prev_hash: &str,
) -> MinwonResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| MinwonError::TraceWriteFailed {
        reason: format!("step record for '{}' did not serialize: {}", record.step, e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(run_id.0.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// True when every event links to its predecessor and its stored hash
/// matches its content. An empty chain is valid.
pub fn verify_chain(events: &[TraceEvent]) -> bool {
    let mut expected_prev = TraceEvent::GENESIS_HASH;

    for (position, event) in events.iter().enumerate() {
        if event.sequence != position as u64 || event.prev_hash != expected_prev {
            return false;
        }
        match hash_event(&event.run_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }
        expected_prev = event.this_hash.as_str();
    }

    true
}
