//! Scenario C: a specific complaint the statute corpus does not cover.
//!
//! Retrieval finds nothing, the quality gate fails, the run retrieves once
//! more, fails again, and is forced on to answer with what it has.

use minwon_config::Settings;
use minwon_contracts::{error::MinwonResult, execution::RunOutcome, state::AgentState};
use minwon_trace::RunTrace;

use super::{execute, print_run};

pub const QUESTION: &str = "A drone flies low over my garden at 14 Birch Close at dawn, \
                            filming my family.";

pub fn run(settings: &Settings) -> MinwonResult<(RunOutcome, RunTrace)> {
    execute(settings, AgentState::new(QUESTION))
}

pub fn run_scenario(settings: &Settings) -> MinwonResult<()> {
    println!("=== Scenario C: Complaint outside the statute corpus ===");
    println!();
    println!("  Complaint: {}", QUESTION);
    println!();

    let (outcome, trace) = run(settings)?;
    print_run(&outcome, &trace);

    println!("  Scenario C complete.");
    println!();
    Ok(())
}
