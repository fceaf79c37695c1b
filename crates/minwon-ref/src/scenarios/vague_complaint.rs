//! Scenario B: a one-word complaint.
//!
//! The question gate fails on the first turn, so the run ends at the
//! clarification exit without retrieving anything. The demo then seeds a
//! follow-up turn with the citizen's reply, which completes.

use minwon_config::Settings;
use minwon_contracts::{error::MinwonResult, execution::RunOutcome, state::AgentState};
use minwon_trace::RunTrace;

use super::{execute, print_run};

pub const QUESTION: &str = "noise";

pub const REPLY: &str = "Loud music from apartment 3F above me, every night after 11pm since March.";

/// First turn only.
pub fn run(settings: &Settings) -> MinwonResult<(RunOutcome, RunTrace)> {
    execute(settings, AgentState::new(QUESTION))
}

/// Second turn, seeded from the first turn's final state.
pub fn run_follow_up(settings: &Settings, first: &RunOutcome) -> MinwonResult<(RunOutcome, RunTrace)> {
    execute(settings, AgentState::follow_up(first.final_state(), REPLY))
}

pub fn run_scenario(settings: &Settings) -> MinwonResult<()> {
    println!("=== Scenario B: Vague complaint ===");
    println!();
    println!("  Turn 1 complaint: {}", QUESTION);
    println!();

    let (first, trace) = run(settings)?;
    print_run(&first, &trace);

    println!("  Turn 2 reply: {}", REPLY);
    println!();

    let (second, trace) = run_follow_up(settings, &first)?;
    print_run(&second, &trace);

    println!("  Scenario B complete.");
    println!();
    Ok(())
}
