//! Demo scenarios.
//!
//! Each scenario runs the real engine with the reference collaborators,
//! records a hash-chained trace, and prints the path the run took.

pub mod vague_complaint;
pub mod weak_context;
pub mod well_specified;

use minwon_config::Settings;
use minwon_contracts::{
    error::{MinwonError, MinwonResult},
    execution::RunOutcome,
    state::AgentState,
    step::StepId,
};
use minwon_trace::{InMemoryTraceWriter, RunTrace};

use crate::collaborators::reference_engine;

/// Run `state` on a reference engine configured by `settings` and return the
/// outcome with its verified trace.
pub fn execute(settings: &Settings, state: AgentState) -> MinwonResult<(RunOutcome, RunTrace)> {
    let engine = reference_engine(settings)?;
    let trace = InMemoryTraceWriter::new();
    let outcome = engine.run_traced(state, &trace)?;

    if !trace.verify_integrity() {
        return Err(MinwonError::TraceWriteFailed {
            reason: "run trace failed its integrity check".to_string(),
        });
    }
    Ok((outcome, trace.export_trace()?))
}

/// Steps in the order the run visited them.
pub fn visited(trace: &RunTrace) -> Vec<StepId> {
    trace.events.iter().map(|e| e.record.step).collect()
}

pub(crate) fn print_run(outcome: &RunOutcome, trace: &RunTrace) {
    let path = visited(trace)
        .iter()
        .map(StepId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ");

    println!("  Path:                   {}", path);
    println!("  Step invocations:       {}", outcome.steps());
    println!("  Terminal:               {:?}", outcome.terminal());
    println!(
        "  Trace integrity:        VERIFIED ({} event(s), terminal hash {}...)",
        trace.events.len(),
        &trace.terminal_hash[..trace.terminal_hash.len().min(12)]
    );
    println!();
    for line in outcome.text().lines() {
        println!("    | {}", line);
    }
    println!();
}
