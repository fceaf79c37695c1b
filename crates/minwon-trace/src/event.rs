//! Trace event and exported trace types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use minwon_contracts::{execution::StepRecord, state::RunId, step::Terminal};

/// One link in a run's hash chain: a step record plus its position and hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,
    pub run_id: RunId,
    pub record: StepRecord,
    /// `this_hash` of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,
    /// Hex SHA-256 over (run_id, sequence, prev_hash, record JSON).
    pub this_hash: String,
}

impl TraceEvent {
    /// `prev_hash` of the first event in every chain: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A snapshot of everything a writer has recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTrace {
    pub events: Vec<TraceEvent>,
    /// Runs that reached a terminal, in finalize order.
    pub finalized_runs: Vec<RunId>,
    pub exported_at: DateTime<Utc>,
    /// `this_hash` of the last event, or empty when nothing was recorded.
    pub terminal_hash: String,
}

impl RunTrace {
    /// Events belonging to `run_id`, in order.
    pub fn events_for<'a>(&'a self, run_id: &'a RunId) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| &e.run_id == run_id)
    }

    /// How the last recorded step ended, if it was a terminal.
    pub fn terminal(&self) -> Option<Terminal> {
        self.events.last().and_then(|e| e.record.terminal)
    }
}
