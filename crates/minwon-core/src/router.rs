//! The two conditional routers.
//!
//! Routers are pure functions of state. They return a `Route`: the next step
//! plus the retry counters the engine must store. Each gate has a fixed retry
//! budget; once a gate has looped back `max_retries` times, the next failing
//! verdict is forced forward instead of looping again. This bounds every run
//! to a fixed number of collaborator calls.

use tracing::{info, warn};

use minwon_contracts::{
    state::{AgentState, Assessment, RetryCounters},
    step::{Gate, StepId},
};

/// Default loop-back budget per gate.
pub const MAX_RETRIES: u32 = 1;

/// How many times each gate may loop back before it is forced forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Upper bound on step invocations in one run: the question gate, up to
    /// `max_retries + 1` retrieve/quality pairs, then generate, sanitize, and
    /// report.
    pub fn step_budget(&self) -> usize {
        1 + 2 * (self.max_retries as usize + 1) + 3
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES)
    }
}

/// A router's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub next: StepId,
    /// Counters to store before the next step runs.
    pub retries: RetryCounters,
    /// True when the gate failed but its budget was exhausted.
    pub forced: bool,
}

/// After `assess_question`: retrieve when the complaint is specific enough,
/// otherwise ask for clarification (or retrieve anyway once the budget is spent).
pub fn route_after_question_assessment(state: &AgentState, policy: &RetryPolicy) -> Route {
    route_gate(
        Gate::Question,
        state,
        policy,
        StepId::RetrieveDocuments,
        StepId::RequestClarification,
    )
}

/// After `assess_answer_quality`: answer when the passages are good enough,
/// otherwise retrieve again (or answer anyway once the budget is spent).
pub fn route_after_quality_assessment(state: &AgentState, policy: &RetryPolicy) -> Route {
    route_gate(
        Gate::Quality,
        state,
        policy,
        StepId::GenerateAnswer,
        StepId::RetrieveDocuments,
    )
}

fn route_gate(
    gate: Gate,
    state: &AgentState,
    policy: &RetryPolicy,
    advance: StepId,
    loop_back: StepId,
) -> Route {
    let retries = state.retries.get(gate);

    // A gate that has not produced a verdict counts as failing.
    if state.assessment_result == Some(Assessment::Sufficient) {
        info!(gate = %gate, next = %advance, "gate passed");
        return Route {
            next: advance,
            retries: state.retries.reset(gate),
            forced: false,
        };
    }

    if retries >= policy.max_retries {
        warn!(
            gate = %gate,
            retries,
            max_retries = policy.max_retries,
            next = %advance,
            "retry budget exhausted; forcing forward progress"
        );
        return Route {
            next: advance,
            retries: state.retries.reset(gate),
            forced: true,
        };
    }

    info!(
        gate = %gate,
        attempt = retries + 1,
        max_retries = policy.max_retries,
        next = %loop_back,
        "gate failed; looping back"
    );
    Route {
        next: loop_back,
        retries: state.retries.incremented(gate),
        forced: false,
    }
}
