//! Step and gate identifiers.
//!
//! The workflow graph is keyed by `StepId`, a closed enumeration. Routers
//! return a `StepId` rather than a free-form name, so a mis-spelled target
//! cannot silently mis-route a run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the seven processing steps in the complaint workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    AssessQuestion,
    RequestClarification,
    RetrieveDocuments,
    AssessAnswerQuality,
    GenerateAnswer,
    FilterAndSanitize,
    CreateFinalReport,
}

impl StepId {
    /// Every step, in the order a straight-through run visits them
    /// (with `RequestClarification` in its branch position).
    pub const ALL: [StepId; 7] = [
        StepId::AssessQuestion,
        StepId::RequestClarification,
        StepId::RetrieveDocuments,
        StepId::AssessAnswerQuality,
        StepId::GenerateAnswer,
        StepId::FilterAndSanitize,
        StepId::CreateFinalReport,
    ];

    /// Stable snake_case name used in logs and trace records.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::AssessQuestion => "assess_question",
            StepId::RequestClarification => "request_clarification",
            StepId::RetrieveDocuments => "retrieve_documents",
            StepId::AssessAnswerQuality => "assess_answer_quality",
            StepId::GenerateAnswer => "generate_answer",
            StepId::FilterAndSanitize => "filter_and_sanitize",
            StepId::CreateFinalReport => "create_final_report",
        }
    }

    /// The gate this step feeds, if its output is a sufficiency verdict.
    pub fn gate(&self) -> Option<Gate> {
        match self {
            StepId::AssessQuestion => Some(Gate::Question),
            StepId::AssessAnswerQuality => Some(Gate::Quality),
            _ => None,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A step whose verdict feeds a router, and which owns its own retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// Is the complaint specific enough to act on?
    Question,
    /// Are the retrieved passages good enough to answer from?
    Quality,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Question => f.write_str("question"),
            Gate::Quality => f.write_str("quality"),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    /// The run stopped to ask the citizen for more detail.
    EarlyExit,
    /// The run produced a finished report.
    Completion,
}
