//! In-memory `TraceWriter`.
//!
//! `InMemoryTraceWriter` keeps events in a `Vec` behind a `Mutex`, so a
//! single writer can be shared by runs on several threads; events from
//! different runs interleave in one chain and are told apart by `run_id`.

use std::sync::Mutex;

use chrono::Utc;
use tracing::info;

use minwon_contracts::{
    error::{MinwonError, MinwonResult},
    execution::StepRecord,
    state::RunId,
};
use minwon_core::traits::TraceWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{RunTrace, TraceEvent},
};

pub(crate) struct ChainState {
    pub(crate) events: Vec<TraceEvent>,
    pub(crate) finalized_runs: Vec<RunId>,
    /// `this_hash` of the last event, or `GENESIS_HASH` before the first.
    pub(crate) last_hash: String,
}

/// An append-only, hash-chained trace of run states.
pub struct InMemoryTraceWriter {
    pub(crate) state: Mutex<ChainState>,
}

impl InMemoryTraceWriter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChainState {
                events: Vec::new(),
                finalized_runs: Vec::new(),
                last_hash: TraceEvent::GENESIS_HASH.to_string(),
            }),
        }
    }

    /// Copy out everything recorded so far.
    pub fn export_trace(&self) -> MinwonResult<RunTrace> {
        let state = self.lock()?;
        Ok(RunTrace {
            events: state.events.clone(),
            finalized_runs: state.finalized_runs.clone(),
            exported_at: Utc::now(),
            terminal_hash: state.events.last().map(|e| e.this_hash.clone()).unwrap_or_default(),
        })
    }

    /// Re-verify the stored chain.
    pub fn verify_integrity(&self) -> bool {
        match self.state.lock() {
            Ok(state) => verify_chain(&state.events),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MinwonResult<std::sync::MutexGuard<'_, ChainState>> {
        self.state.lock().map_err(|e| MinwonError::TraceWriteFailed {
            reason: format!("trace state lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryTraceWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceWriter for InMemoryTraceWriter {
    fn record(&self, run_id: &RunId, record: &StepRecord) -> MinwonResult<()> {
        let mut state = self.lock()?;

        let sequence = state.events.len() as u64;
        let prev_hash = state.last_hash.clone();
        let this_hash = hash_event(run_id, sequence, record, &prev_hash)?;

        state.events.push(TraceEvent {
            sequence,
            run_id: run_id.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.last_hash = this_hash;
        Ok(())
    }

    fn finalize(&self, run_id: &RunId) -> MinwonResult<()> {
        let mut state = self.lock()?;
        state.finalized_runs.push(run_id.clone());

        info!(
            run_id = %run_id.0,
            event_count = state.events.len(),
            terminal_hash = %state.last_hash,
            "run trace sealed"
        );
        Ok(())
    }
}
