//! The static workflow graph.
//!
//! Every step has exactly one outgoing `Transition`: a fixed successor, a
//! router, or a terminal. Routers declare the steps they may select, and the
//! graph is validated once at construction so an incomplete or inconsistent
//! table fails before any run starts.
//!
//! ```text
//! assess_question ──▶ {request_clarification ──▶ END(early exit),
//!                      retrieve_documents}
//! retrieve_documents ──▶ assess_answer_quality
//! assess_answer_quality ──▶ {retrieve_documents, generate_answer}
//! generate_answer ──▶ filter_and_sanitize ──▶ create_final_report ──▶ END(completion)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use minwon_contracts::{
    error::{MinwonError, MinwonResult},
    state::AgentState,
    step::{StepId, Terminal},
};

use crate::router::{
    route_after_quality_assessment, route_after_question_assessment, Route, RetryPolicy,
};

/// A decision point in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Router {
    AfterQuestionAssessment,
    AfterQualityAssessment,
}

impl Router {
    pub fn route(&self, state: &AgentState, policy: &RetryPolicy) -> Route {
        match self {
            Router::AfterQuestionAssessment => route_after_question_assessment(state, policy),
            Router::AfterQualityAssessment => route_after_quality_assessment(state, policy),
        }
    }

    /// Every step this router may select.
    pub fn targets(&self) -> &'static [StepId] {
        match self {
            Router::AfterQuestionAssessment => {
                &[StepId::RequestClarification, StepId::RetrieveDocuments]
            }
            Router::AfterQualityAssessment => &[StepId::RetrieveDocuments, StepId::GenerateAnswer],
        }
    }
}

/// What happens after a step's update has been merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next(StepId),
    Branch(Router),
    End(Terminal),
}

/// Step → transition table with a single entry step.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    entry: StepId,
    edges: BTreeMap<StepId, Transition>,
}

impl WorkflowGraph {
    /// An empty graph starting at `entry`.
    pub fn new(entry: StepId) -> Self {
        Self {
            entry,
            edges: BTreeMap::new(),
        }
    }

    /// The complaint workflow.
    pub fn complaint_workflow() -> MinwonResult<Self> {
        let mut graph = Self::new(StepId::AssessQuestion);
        graph.add_branch(StepId::AssessQuestion, Router::AfterQuestionAssessment)?;
        graph.add_end(StepId::RequestClarification, Terminal::EarlyExit)?;
        graph.add_edge(StepId::RetrieveDocuments, StepId::AssessAnswerQuality)?;
        graph.add_branch(StepId::AssessAnswerQuality, Router::AfterQualityAssessment)?;
        graph.add_edge(StepId::GenerateAnswer, StepId::FilterAndSanitize)?;
        graph.add_edge(StepId::FilterAndSanitize, StepId::CreateFinalReport)?;
        graph.add_end(StepId::CreateFinalReport, Terminal::Completion)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn add_edge(&mut self, from: StepId, to: StepId) -> MinwonResult<()> {
        self.insert(from, Transition::Next(to))
    }

    pub fn add_branch(&mut self, from: StepId, router: Router) -> MinwonResult<()> {
        self.insert(from, Transition::Branch(router))
    }

    pub fn add_end(&mut self, from: StepId, terminal: Terminal) -> MinwonResult<()> {
        self.insert(from, Transition::End(terminal))
    }

    pub fn entry(&self) -> StepId {
        self.entry
    }

    pub fn transition(&self, step: StepId) -> MinwonResult<Transition> {
        self.edges
            .get(&step)
            .copied()
            .ok_or_else(|| MinwonError::StateMachineError {
                reason: format!("step '{}' has no outgoing transition", step),
            })
    }

    /// Check that every step reachable from the entry has a transition and
    /// that a completion terminal is reachable.
    pub fn validate(&self) -> MinwonResult<()> {
        let mut seen = BTreeSet::new();
        let mut pending = vec![self.entry];
        let mut completes = false;

        while let Some(step) = pending.pop() {
            if !seen.insert(step) {
                continue;
            }
            match self.transition(step)? {
                Transition::Next(to) => pending.push(to),
                Transition::Branch(router) => pending.extend(router.targets()),
                Transition::End(Terminal::Completion) => completes = true,
                Transition::End(Terminal::EarlyExit) => {}
            }
        }

        if !completes {
            return Err(MinwonError::StateMachineError {
                reason: format!("no completion terminal is reachable from '{}'", self.entry),
            });
        }
        Ok(())
    }

    fn insert(&mut self, from: StepId, transition: Transition) -> MinwonResult<()> {
        if let Some(existing) = self.edges.get(&from) {
            return Err(MinwonError::StateMachineError {
                reason: format!(
                    "step '{}' already transitions via {:?}; refusing {:?}",
                    from, existing, transition
                ),
            });
        }
        self.edges.insert(from, transition);
        Ok(())
    }
}
