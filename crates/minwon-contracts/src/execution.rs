//! Run results and per-step trace records.
//!
//! `RunOutcome` is what the engine hands back when a run reaches a terminal.
//! `StepRecord` is what gets written to the run trace, one per step invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{AgentState, RunId},
    step::{StepId, Terminal},
};

/// How a finished run ended.
///
/// A failed run is an `Err` from the engine, never an outcome; there is no
/// partial success.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The run stopped at `request_clarification` and needs another turn.
    Clarification {
        run_id: RunId,
        /// The question put to the citizen.
        message: String,
        final_state: AgentState,
        /// Number of step invocations the run took.
        steps: usize,
    },

    /// The run produced a report.
    Completed {
        run_id: RunId,
        /// The report text (same as `final_state.answer`).
        report: String,
        final_state: AgentState,
        steps: usize,
    },
}

impl RunOutcome {
    /// The text a caller shows the citizen.
    pub fn text(&self) -> &str {
        match self {
            RunOutcome::Clarification { message, .. } => message,
            RunOutcome::Completed { report, .. } => report,
        }
    }

    pub fn final_state(&self) -> &AgentState {
        match self {
            RunOutcome::Clarification { final_state, .. }
            | RunOutcome::Completed { final_state, .. } => final_state,
        }
    }

    pub fn into_final_state(self) -> AgentState {
        match self {
            RunOutcome::Clarification { final_state, .. }
            | RunOutcome::Completed { final_state, .. } => final_state,
        }
    }

    pub fn run_id(&self) -> &RunId {
        match self {
            RunOutcome::Clarification { run_id, .. } | RunOutcome::Completed { run_id, .. } => {
                run_id
            }
        }
    }

    pub fn steps(&self) -> usize {
        match self {
            RunOutcome::Clarification { steps, .. } | RunOutcome::Completed { steps, .. } => *steps,
        }
    }

    pub fn terminal(&self) -> Terminal {
        match self {
            RunOutcome::Clarification { .. } => Terminal::EarlyExit,
            RunOutcome::Completed { .. } => Terminal::Completion,
        }
    }
}

/// An immutable record of one step invocation, written to the run trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// The step that ran.
    pub step: StepId,
    /// The step chosen next, or `None` when the run ended here.
    pub next: Option<StepId>,
    /// Set when `next` is `None`.
    pub terminal: Option<Terminal>,
    /// State after merging this step's update and any router retry changes.
    pub state: AgentState,
    pub timestamp: DateTime<Utc>,
}
