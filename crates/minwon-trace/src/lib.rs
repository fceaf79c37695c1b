//! # minwon-trace
//!
//! Append-only, SHA-256 hash-chained trace of every intermediate state of a
//! complaint run.
//!
//! Each `StepRecord` the engine emits is wrapped in a `TraceEvent` linked to
//! the previous event by hash, so an edited snapshot is detected by
//! `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use minwon_trace::InMemoryTraceWriter;
//!
//! let trace = InMemoryTraceWriter::new();
//! let outcome = engine.run_traced(AgentState::new(question), &trace)?;
//! assert!(trace.verify_integrity());
//! let exported = trace.export_trace()?;
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{RunTrace, TraceEvent};
pub use memory::InMemoryTraceWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use minwon_contracts::{
        error::CollaboratorError,
        execution::StepRecord,
        state::{AgentState, RunId},
        step::{StepId, Terminal},
    };
    use minwon_core::{
        traits::{DocumentRetriever, LanguageModel, PromptVars, TraceWriter},
        Collaborators, PromptTemplate, RetryPolicy, WorkflowEngine,
    };

    use super::{verify_chain, InMemoryTraceWriter, TraceEvent};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_record(step: StepId, question: &str) -> StepRecord {
        StepRecord {
            step,
            next: None,
            terminal: None,
            state: AgentState::new(question),
            timestamp: Utc::now(),
        }
    }

    /// Answers every gate with `sufficient` and everything else with a fixed line.
    struct AgreeableModel;

    impl LanguageModel for AgreeableModel {
        fn infer(&self, template: PromptTemplate, _vars: &PromptVars) -> Result<String, CollaboratorError> {
            Ok(match template {
                PromptTemplate::AssessQuestion | PromptTemplate::AssessAnswerQuality => "sufficient",
                _ => "■ noted",
            }
            .to_string())
        }
    }

    struct OnePassage;

    impl DocumentRetriever for OnePassage {
        fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<String>, CollaboratorError> {
            Ok(vec!["Waste Management Act art. 8".to_string()])
        }
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_hash_chain_integrity() {
        let writer = InMemoryTraceWriter::new();
        let run = RunId::new();
        writer.record(&run, &make_record(StepId::AssessQuestion, "a")).unwrap();
        writer.record(&run, &make_record(StepId::RetrieveDocuments, "a")).unwrap();
        writer.record(&run, &make_record(StepId::AssessAnswerQuality, "a")).unwrap();

        assert!(writer.verify_integrity());
        assert_eq!(writer.len(), 3);
    }

    #[test]
    fn test_tampered_snapshot_is_detected() {
        let writer = InMemoryTraceWriter::new();
        let run = RunId::new();
        writer.record(&run, &make_record(StepId::AssessQuestion, "original")).unwrap();
        writer.record(&run, &make_record(StepId::RequestClarification, "original")).unwrap();

        {
            let mut state = writer.state.lock().unwrap();
            state.events[0].record.state.answer = "rewritten after the fact".to_string();
        }

        assert!(!writer.verify_integrity());
    }

    #[test]
    fn test_reordered_events_are_detected() {
        let writer = InMemoryTraceWriter::new();
        let run = RunId::new();
        writer.record(&run, &make_record(StepId::AssessQuestion, "q")).unwrap();
        writer.record(&run, &make_record(StepId::RetrieveDocuments, "q")).unwrap();

        let mut events = writer.export_trace().unwrap().events;
        events.swap(0, 1);
        assert!(!verify_chain(&events));
    }

    #[test]
    fn test_genesis_and_terminal_hash() {
        let writer = InMemoryTraceWriter::new();
        writer.record(&RunId::new(), &make_record(StepId::AssessQuestion, "q")).unwrap();

        let trace = writer.export_trace().unwrap();
        assert_eq!(trace.events[0].prev_hash, TraceEvent::GENESIS_HASH);
        assert_eq!(trace.terminal_hash, trace.events[0].this_hash);
    }

    #[test]
    fn test_empty_trace_is_valid() {
        let writer = InMemoryTraceWriter::new();
        assert!(writer.is_empty());
        assert!(writer.verify_integrity());
        assert!(verify_chain(&[]));
        assert!(writer.export_trace().unwrap().terminal_hash.is_empty());
    }

    /// A full engine run leaves one event per step and seals the run.
    #[test]
    fn test_engine_run_is_fully_traced() {
        let engine = WorkflowEngine::new(
            Collaborators::new(Arc::new(AgreeableModel), Arc::new(OnePassage)),
            RetryPolicy::default(),
        )
        .unwrap();
        let writer = InMemoryTraceWriter::new();

        let outcome = engine.run_traced(AgentState::new("Bins not collected on Pine Ave"), &writer).unwrap();

        let trace = writer.export_trace().unwrap();
        assert_eq!(trace.events.len(), outcome.steps());
        assert_eq!(trace.finalized_runs, vec![outcome.run_id().clone()]);
        assert_eq!(trace.terminal(), Some(Terminal::Completion));
        assert_eq!(trace.events_for(outcome.run_id()).count(), 6);
        assert_eq!(trace.events.last().unwrap().record.state.answer, outcome.text());
        assert!(writer.verify_integrity());
    }
}
