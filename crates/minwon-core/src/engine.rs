//! The workflow engine: runs the graph from an initial state to a terminal.
//!
//! Each iteration follows the same order:
//!
//!   Step → Merge → (Router) → Trace → Advance or Stop
//!
//! The engine is single-threaded per run: a step never starts before the
//! previous step's update has been merged. It holds no per-run state, so one
//! engine can drive independent runs on several threads at once.

use chrono::Utc;
use tracing::{debug, info, warn};

use minwon_contracts::{
    error::{MinwonError, MinwonResult},
    execution::{RunOutcome, StepRecord},
    state::{AgentState, RunId},
    step::{StepId, Terminal},
};

use crate::{
    graph::{Transition, WorkflowGraph},
    router::RetryPolicy,
    steps::{self, Collaborators},
    traits::{NullTraceWriter, TraceWriter},
};

/// Where the engine goes after a step.
enum Advance {
    To(StepId),
    Stop(Terminal),
}

/// Drives complaint runs over a validated `WorkflowGraph`.
pub struct WorkflowEngine {
    graph: WorkflowGraph,
    collaborators: Collaborators,
    policy: RetryPolicy,
}

impl WorkflowEngine {
    /// Build an engine over the standard complaint workflow.
    pub fn new(collaborators: Collaborators, policy: RetryPolicy) -> MinwonResult<Self> {
        Self::with_graph(WorkflowGraph::complaint_workflow()?, collaborators, policy)
    }

    /// Build an engine over a caller-supplied graph. The graph is validated here.
    pub fn with_graph(
        graph: WorkflowGraph,
        collaborators: Collaborators,
        policy: RetryPolicy,
    ) -> MinwonResult<Self> {
        graph.validate()?;
        Ok(Self { graph, collaborators, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `question` as a first turn and return the text to show the citizen:
    /// the report on completion, or the clarification question on early exit.
    pub fn run_question(&self, question: &str) -> MinwonResult<String> {
        let outcome = self.run(AgentState::new(question))?;
        Ok(outcome.text().to_string())
    }

    /// Run from `initial` to a terminal without keeping a trace.
    pub fn run(&self, initial: AgentState) -> MinwonResult<RunOutcome> {
        self.run_traced(initial, &NullTraceWriter)
    }

    /// Run from `initial` to a terminal, recording every intermediate state.
    ///
    /// # Errors
    ///
    /// - `CollaboratorFailure` from any step aborts the run; the error names
    ///   the failing step. Nothing is retried.
    /// - `StateMachineError` if a router selects a step outside its declared
    ///   targets, the step budget is exceeded, or a terminal is reached
    ///   without the output it requires.
    /// - `TraceWriteFailed` from the trace writer.
    pub fn run_traced(&self, initial: AgentState, trace: &dyn TraceWriter) -> MinwonResult<RunOutcome> {
        let run_id = RunId::new();
        let budget = self.policy.step_budget();
        let mut state = initial;
        let mut current = self.graph.entry();
        let mut steps_taken = 0usize;

        info!(run_id = %run_id.0, entry = %current, "run starting");

        loop {
            if steps_taken >= budget {
                return Err(MinwonError::StateMachineError {
                    reason: format!("step budget of {} exhausted before a terminal", budget),
                });
            }
            steps_taken += 1;

            debug!(
                run_id = %run_id.0,
                step = %current,
                invocation = steps_taken,
                retries_question = state.retries.question,
                retries_quality = state.retries.quality,
                "step starting"
            );

            // ── Step ─────────────────────────────────────────────────────────
            let update = steps::run_step(current, &self.collaborators, &state).map_err(|e| {
                warn!(run_id = %run_id.0, step = %current, error = %e, "step failed; aborting run");
                e
            })?;

            // ── Merge ────────────────────────────────────────────────────────
            state.apply(update);

            // ── Route ────────────────────────────────────────────────────────
            let advance = match self.graph.transition(current)? {
                Transition::Next(next) => Advance::To(next),
                Transition::Branch(router) => {
                    let route = router.route(&state, &self.policy);
                    if !router.targets().contains(&route.next) {
                        return Err(MinwonError::StateMachineError {
                            reason: format!(
                                "router {:?} selected '{}', which is not one of its targets",
                                router, route.next
                            ),
                        });
                    }
                    state.retries = route.retries;
                    Advance::To(route.next)
                }
                Transition::End(terminal) => Advance::Stop(terminal),
            };

            // ── Trace ────────────────────────────────────────────────────────
            let (next, terminal) = match advance {
                Advance::To(next) => (Some(next), None),
                Advance::Stop(terminal) => (None, Some(terminal)),
            };
            trace.record(
                &run_id,
                &StepRecord {
                    step: current,
                    next,
                    terminal,
                    state: state.clone(),
                    timestamp: Utc::now(),
                },
            )?;

            match advance {
                Advance::To(next) => current = next,
                Advance::Stop(terminal) => {
                    trace.finalize(&run_id)?;
                    return self.finish(run_id, terminal, state, steps_taken);
                }
            }
        }
    }

    fn finish(
        &self,
        run_id: RunId,
        terminal: Terminal,
        final_state: AgentState,
        steps: usize,
    ) -> MinwonResult<RunOutcome> {
        match terminal {
            Terminal::EarlyExit => {
                let message = final_state
                    .last_assistant_message()
                    .map(str::to_string)
                    .ok_or_else(|| MinwonError::StateMachineError {
                        reason: "early exit reached without a clarification message".to_string(),
                    })?;

                info!(run_id = %run_id.0, steps, "run ended awaiting clarification");
                Ok(RunOutcome::Clarification { run_id, message, final_state, steps })
            }
            Terminal::Completion => {
                if final_state.answer.is_empty() {
                    return Err(MinwonError::StateMachineError {
                        reason: "completion reached with an empty answer".to_string(),
                    });
                }

                info!(run_id = %run_id.0, steps, "run completed with report");
                Ok(RunOutcome::Completed {
                    run_id,
                    report: final_state.answer.clone(),
                    final_state,
                    steps,
                })
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use minwon_contracts::{
        error::MinwonError,
        execution::RunOutcome,
        state::{AgentState, Assessment, RetryCounters, REPORT_MARKER},
        step::{StepId, Terminal},
    };

    use crate::{
        graph::{Router, WorkflowGraph},
        prompts::PromptTemplate,
        router::{RetryPolicy, MAX_RETRIES},
        steps::Collaborators,
        testing::{RecordingTrace, ScriptedModel, StaticRetriever},
    };

    use super::WorkflowEngine;

    // ── Helpers ──────────────────────────────────────────────────────────────

    struct Harness {
        engine: WorkflowEngine,
        model: Arc<ScriptedModel>,
        retriever: Arc<StaticRetriever>,
    }

    fn harness(model: ScriptedModel) -> Harness {
        let model = Arc::new(model);
        let retriever = Arc::new(StaticRetriever::new(vec![
            "Road Act art. 31: the district office repairs public lighting.",
            "Civil Petitions Act art. 14: petitions are answered within 7 days.",
        ]));
        let engine = WorkflowEngine::new(
            Collaborators::new(model.clone(), retriever.clone()),
            RetryPolicy::default(),
        )
        .unwrap();
        Harness { engine, model, retriever }
    }

    fn path(trace: &RecordingTrace) -> Vec<StepId> {
        trace.records.lock().unwrap().iter().map(|r| r.step).collect()
    }

    // ── Scenarios ────────────────────────────────────────────────────────────

    /// A well-specified complaint goes straight through to a report.
    #[test]
    fn test_straight_through_completion() {
        let h = harness(ScriptedModel::straight_through("sufficient", "sufficient"));
        let trace = RecordingTrace::default();

        let outcome = h
            .engine
            .run_traced(AgentState::new("The streetlight at 12 Elm St has been out since Monday."), &trace)
            .unwrap();

        assert_eq!(
            path(&trace),
            vec![
                StepId::AssessQuestion,
                StepId::RetrieveDocuments,
                StepId::AssessAnswerQuality,
                StepId::GenerateAnswer,
                StepId::FilterAndSanitize,
                StepId::CreateFinalReport,
            ]
        );

        match outcome {
            RunOutcome::Completed { report, final_state, steps, .. } => {
                assert!(!report.is_empty());
                assert!(report.contains(REPORT_MARKER));
                assert_eq!(final_state.answer, report);
                assert_eq!(final_state.retries, RetryCounters::default());
                assert_eq!(final_state.documents.len(), 2);
                assert!(!final_state.final_report.is_empty());
                assert_eq!(steps, 6);
            }
            other => panic!("expected Completed, got {:?}", other),
        }
        assert_eq!(trace.finalized.lock().unwrap().len(), 1);
    }

    /// A vague complaint ends at the clarification exit without retrieving.
    #[test]
    fn test_vague_question_exits_early() {
        let h = harness(ScriptedModel::straight_through("insufficient", "sufficient"));
        let trace = RecordingTrace::default();

        let outcome = h.engine.run_traced(AgentState::new("noise"), &trace).unwrap();

        assert_eq!(path(&trace), vec![StepId::AssessQuestion, StepId::RequestClarification]);
        assert_eq!(h.retriever.calls(), 0, "no retrieval on early exit");
        assert_eq!(outcome.terminal(), Terminal::EarlyExit);
        assert_eq!(outcome.text(), "Where and when did this happen?");

        let state = outcome.final_state();
        assert_eq!(state.retries.question, 1);
        assert!(state.answer.is_empty(), "answer stays unset on early exit");
        assert_eq!(state.messages().len(), 2);
    }

    /// Two weak retrievals in a row: one loop-back, then forced generation.
    #[test]
    fn test_weak_context_loops_once_then_forces_answer() {
        let h = harness(ScriptedModel::straight_through("sufficient", "insufficient"));
        let trace = RecordingTrace::default();

        let outcome = h
            .engine
            .run_traced(AgentState::new("Illegal dumping behind 4 Oak Rd every weekend."), &trace)
            .unwrap();

        assert_eq!(
            path(&trace),
            vec![
                StepId::AssessQuestion,
                StepId::RetrieveDocuments,
                StepId::AssessAnswerQuality,
                StepId::RetrieveDocuments,
                StepId::AssessAnswerQuality,
                StepId::GenerateAnswer,
                StepId::FilterAndSanitize,
                StepId::CreateFinalReport,
            ]
        );
        assert_eq!(h.retriever.calls(), 2);
        assert_eq!(h.model.calls(PromptTemplate::AssessAnswerQuality), 2);

        let records = trace.records.lock().unwrap();
        assert_eq!(records[2].state.retries.quality, 1, "first failure loops back");
        assert_eq!(records[4].state.retries.quality, 0, "forced progress resets the gate");
        assert_eq!(records[4].next, Some(StepId::GenerateAnswer));

        assert_eq!(outcome.terminal(), Terminal::Completion);
        assert_eq!(outcome.steps(), RetryPolicy::default().step_budget());
    }

    /// A follow-up turn that is still vague is forced on to retrieval.
    #[test]
    fn test_follow_up_forces_retrieval_after_one_clarification() {
        let h = harness(ScriptedModel::straight_through("insufficient", "sufficient"));

        let first = h.engine.run(AgentState::new("noise")).unwrap();
        assert_eq!(first.terminal(), Terminal::EarlyExit);

        let second = h
            .engine
            .run(AgentState::follow_up(first.final_state(), "upstairs"))
            .unwrap();

        assert_eq!(second.terminal(), Terminal::Completion);
        assert_eq!(h.retriever.calls(), 1);
        assert_eq!(second.final_state().retries.question, 0);
        assert!(second.final_state().question.contains("Assistant: Where and when"));
    }

    // ── Invariants ───────────────────────────────────────────────────────────

    #[test]
    fn test_transcript_never_shrinks() {
        let h = harness(ScriptedModel::straight_through("sufficient", "insufficient"));
        let trace = RecordingTrace::default();
        h.engine.run_traced(AgentState::new("q"), &trace).unwrap();

        let lengths: Vec<usize> =
            trace.records.lock().unwrap().iter().map(|r| r.state.messages().len()).collect();
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]), "lengths: {:?}", lengths);
        // User question, then the report.
        assert_eq!(lengths.last(), Some(&2));
    }

    #[test]
    fn test_step_count_is_bounded_for_every_verdict_mix() {
        let verdicts = ["sufficient", "insufficient", "maybe"];
        for question in verdicts {
            for quality in verdicts {
                let h = harness(ScriptedModel::straight_through(question, quality));
                let outcome = h.engine.run(AgentState::new("q")).unwrap();
                assert!(outcome.steps() <= h.engine.policy().step_budget());
            }
        }
    }

    #[test]
    fn test_malformed_question_verdict_fails_closed() {
        let h = harness(ScriptedModel::straight_through("It looks fine", "sufficient"));
        let outcome = h.engine.run(AgentState::new("q")).unwrap();
        assert_eq!(outcome.terminal(), Terminal::EarlyExit);
        assert_eq!(outcome.final_state().assessment_result, Some(Assessment::Insufficient));
    }

    #[test]
    fn test_larger_budget_allows_more_loops() {
        let model = Arc::new(ScriptedModel::straight_through("sufficient", "insufficient"));
        let retriever = Arc::new(StaticRetriever::new(vec!["p"]));
        let engine = WorkflowEngine::new(
            Collaborators::new(model, retriever.clone()),
            RetryPolicy::new(MAX_RETRIES + 2),
        )
        .unwrap();

        engine.run(AgentState::new("q")).unwrap();
        assert_eq!(retriever.calls(), 4);
    }

    // ── Failures ─────────────────────────────────────────────────────────────

    #[test]
    fn test_collaborator_failure_aborts_and_names_step() {
        let model = ScriptedModel::new()
            .reply(PromptTemplate::AssessQuestion, "sufficient")
            .reply(PromptTemplate::AssessAnswerQuality, "sufficient")
            .reply(PromptTemplate::GenerateAnswer, "draft")
            .fail(PromptTemplate::SanitizeComplaint, "rate limited")
            .reply(PromptTemplate::ComposeReport, "■ report");
        let h = harness(model);
        let trace = RecordingTrace::default();

        let err = h.engine.run_traced(AgentState::new("q"), &trace).unwrap_err();

        match err {
            MinwonError::CollaboratorFailure { step, reason } => {
                assert_eq!(step, StepId::FilterAndSanitize);
                assert!(reason.contains("rate limited"));
            }
            other => panic!("expected CollaboratorFailure, got {:?}", other),
        }
        assert_eq!(h.model.calls(PromptTemplate::SanitizeComplaint), 1, "faults are not retried");
        assert_eq!(h.model.calls(PromptTemplate::ComposeReport), 0);
        assert!(trace.finalized.lock().unwrap().is_empty());
    }

    #[test]
    fn test_run_question_returns_text() {
        let h = harness(ScriptedModel::straight_through("insufficient", "sufficient"));
        let text = h.engine.run_question("noise").unwrap();
        assert_eq!(text, "Where and when did this happen?");
    }

    #[test]
    fn test_custom_graph_must_validate() {
        let graph = WorkflowGraph::new(StepId::AssessQuestion);
        let h = harness(ScriptedModel::new());
        let collaborators = Collaborators::new(h.model.clone(), h.retriever.clone());
        assert!(WorkflowEngine::with_graph(graph, collaborators, RetryPolicy::default()).is_err());
    }

    /// A graph that validates but cycles back to retrieval after generating
    /// never reaches a terminal; the budget stops it.
    #[test]
    fn test_cyclic_graph_exhausts_step_budget() {
        let mut graph = WorkflowGraph::new(StepId::AssessQuestion);
        graph.add_branch(StepId::AssessQuestion, Router::AfterQuestionAssessment).unwrap();
        graph.add_edge(StepId::RequestClarification, StepId::FilterAndSanitize).unwrap();
        graph.add_edge(StepId::RetrieveDocuments, StepId::AssessAnswerQuality).unwrap();
        graph.add_branch(StepId::AssessAnswerQuality, Router::AfterQualityAssessment).unwrap();
        graph.add_edge(StepId::GenerateAnswer, StepId::RetrieveDocuments).unwrap();
        graph.add_edge(StepId::FilterAndSanitize, StepId::CreateFinalReport).unwrap();
        graph.add_end(StepId::CreateFinalReport, Terminal::Completion).unwrap();

        let h = harness(ScriptedModel::straight_through("sufficient", "insufficient"));
        let engine = WorkflowEngine::with_graph(
            graph,
            Collaborators::new(h.model.clone(), h.retriever.clone()),
            RetryPolicy::default(),
        )
        .unwrap();
        let trace = RecordingTrace::default();

        let err = engine.run_traced(AgentState::new("q"), &trace).unwrap_err();

        match err {
            MinwonError::StateMachineError { reason } => {
                assert!(reason.contains("step budget of 8"), "reason: {}", reason);
            }
            other => panic!("expected StateMachineError, got {:?}", other),
        }
        assert_eq!(trace.records.lock().unwrap().len(), RetryPolicy::default().step_budget());
        assert!(trace.finalized.lock().unwrap().is_empty(), "an aborted run is never sealed");
    }

    // ── Concurrency ──────────────────────────────────────────────────────────

    #[test]
    fn test_independent_runs_share_one_engine() {
        let h = harness(ScriptedModel::straight_through("sufficient", "sufficient"));

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let engine = &h.engine;
                    scope.spawn(move || engine.run(AgentState::new(format!("complaint {}", i))))
                })
                .collect();

            for handle in handles {
                let outcome = handle.join().unwrap().unwrap();
                assert_eq!(outcome.terminal(), Terminal::Completion);
            }
        });
        assert_eq!(h.retriever.calls(), 4);
    }
}
