//! Scenario A: a well-specified complaint.
//!
//! The complaint names the problem, the place, and the time, and the statute
//! corpus covers it, so the run goes straight through:
//!
//!   assess_question -> retrieve_documents -> assess_answer_quality
//!   -> generate_answer -> filter_and_sanitize -> create_final_report

use minwon_config::Settings;
use minwon_contracts::{error::MinwonResult, execution::RunOutcome, state::AgentState};
use minwon_trace::RunTrace;

use super::{execute, print_run};

pub const QUESTION: &str = "The streetlight in front of 12 Elm Street has been broken since \
                            last Monday and the road is completely dark at night.";

pub fn run(settings: &Settings) -> MinwonResult<(RunOutcome, RunTrace)> {
    execute(settings, AgentState::new(QUESTION))
}

pub fn run_scenario(settings: &Settings) -> MinwonResult<()> {
    println!("=== Scenario A: Well-specified complaint ===");
    println!();
    println!("  Complaint: {}", QUESTION);
    println!();

    let (outcome, trace) = run(settings)?;
    print_run(&outcome, &trace);

    println!("  Scenario A complete.");
    println!();
    Ok(())
}
