//! minwon: civil-complaint workflow CLI
//!
//! Runs complaints through the workflow using the reference collaborators
//! (keyword retrieval over the fictional statute corpus and a rule-based
//! language model).
//!
//! Usage:
//!   cargo run -p minwon-cli -- ask "The streetlight at 12 Elm St is out"
//!   cargo run -p minwon-cli -- chat
//!   cargo run -p minwon-cli -- run-all
//!   cargo run -p minwon-cli -- --config config/minwon.toml weak-context

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use minwon_config::Settings;
use minwon_contracts::{
    error::{MinwonError, MinwonResult},
    execution::RunOutcome,
    state::AgentState,
};
use minwon_ref::{
    reference_engine,
    scenarios::{vague_complaint, weak_context, well_specified},
};
use minwon_trace::InMemoryTraceWriter;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Answer civil complaints with bounded clarification and retrieval loops.
#[derive(Parser)]
#[command(
    name = "minwon",
    about = "Civil-complaint workflow runner",
    long_about = "Routes a complaint through assessment, retrieval, quality gate,\n\
                  answer generation, and reporting, asking for clarification when\n\
                  the complaint is under-specified."
)]
struct Cli {
    /// Settings file (TOML). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one complaint and print the report or the clarification question.
    Ask {
        /// The complaint text.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        /// Also print every intermediate state as JSON.
        #[arg(long)]
        trace: bool,
    },
    /// Interactive session: answer clarification questions until a report is produced.
    Chat,
    /// Run all three demo scenarios in sequence.
    RunAll,
    /// Scenario A: well-specified complaint, straight through.
    WellSpecified,
    /// Scenario B: vague complaint, early exit then follow-up.
    VagueComplaint,
    /// Scenario C: complaint outside the corpus, one loop-back then forced answer.
    WeakContext,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("minwon: {}", e);
            std::process::exit(2);
        }
    };

    // RUST_LOG wins over the settings file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .with_target(false)
        .compact()
        .init();

    let result = match cli.command {
        Command::Ask { question, trace } => ask(&settings, &question.join(" "), trace),
        Command::Chat => chat(&settings),
        Command::RunAll => run_all(&settings),
        Command::WellSpecified => well_specified::run_scenario(&settings),
        Command::VagueComplaint => vague_complaint::run_scenario(&settings),
        Command::WeakContext => weak_context::run_scenario(&settings),
    };

    if let Err(e) = result {
        eprintln!("minwon: {}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn ask(settings: &Settings, question: &str, show_trace: bool) -> MinwonResult<()> {
    let engine = reference_engine(settings)?;

    if !show_trace {
        println!("{}", engine.run_question(question)?);
        return Ok(());
    }

    let trace = InMemoryTraceWriter::new();
    let outcome = engine.run_traced(AgentState::new(question), &trace)?;
    println!("{}", outcome.text());
    println!();

    let exported = trace.export_trace()?;
    let json = serde_json::to_string_pretty(&exported).map_err(|e| MinwonError::TraceWriteFailed {
        reason: format!("failed to serialize trace: {}", e),
    })?;
    println!("{}", json);
    Ok(())
}

fn chat(settings: &Settings) -> MinwonResult<()> {
    let engine = reference_engine(settings)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Describe your complaint. Type 'exit' or 'quit' to leave.");

    let Some(first) = prompt(&mut lines)? else {
        return Ok(());
    };
    let mut state = AgentState::new(first);

    loop {
        let outcome = engine.run(state)?;
        println!();
        println!("minwon> {}", outcome.text());

        match outcome {
            RunOutcome::Completed { run_id, steps, .. } => {
                info!(run_id = %run_id.0, steps, "chat session completed");
                return Ok(());
            }
            RunOutcome::Clarification { final_state, .. } => {
                let Some(reply) = prompt(&mut lines)? else {
                    return Ok(());
                };
                state = AgentState::follow_up(&final_state, &reply);
            }
        }
    }
}

/// Read the next non-empty line. `None` on end of input or an exit command.
fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>) -> MinwonResult<Option<String>> {
    loop {
        print!("\nyou> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(None);
        };
        let line = line?;
        let line = line.trim();

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        if !line.is_empty() {
            return Ok(Some(line.to_string()));
        }
    }
}

fn run_all(settings: &Settings) -> MinwonResult<()> {
    well_specified::run_scenario(settings)?;
    vague_complaint::run_scenario(settings)?;
    weak_context::run_scenario(settings)?;
    Ok(())
}
