//! Error types for the complaint workflow.
//!
//! Every fallible operation in the workspace returns `MinwonResult<T>`.
//! Collaborator adapters report `CollaboratorError`, which a step tags with
//! its own `StepId` so the caller learns where the run failed.

use thiserror::Error;

use crate::step::StepId;

/// The unified error type for a workflow run.
#[derive(Debug, Error)]
pub enum MinwonError {
    /// A language-inference or retrieval call failed, or inference returned
    /// nothing. Not retried: the graph's loop-backs are a quality policy.
    #[error("collaborator failed during step '{step}': {reason}")]
    CollaboratorFailure { step: StepId, reason: String },

    /// Classifier output did not normalize to a known verdict.
    #[error("malformed assessment: {raw:?}")]
    MalformedAssessment { raw: String },

    /// The graph, a router, or the engine hit an illegal transition or state.
    #[error("state machine error: {reason}")]
    StateMachineError { reason: String },

    /// A settings value is missing, unreadable, or out of range.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The run trace could not record a step.
    #[error("trace write failed: {reason}")]
    TraceWriteFailed { reason: String },

    /// Reading input or writing output outside the workflow failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MinwonError {
    /// The step that failed, for collaborator failures.
    pub fn failed_step(&self) -> Option<StepId> {
        match self {
            MinwonError::CollaboratorFailure { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the minwon crates.
pub type MinwonResult<T> = Result<T, MinwonError>;

/// A failure reported by an external collaborator, before a step claims it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{collaborator}: {reason}")]
pub struct CollaboratorError {
    /// Which collaborator failed (e.g. "language-model", "retriever").
    pub collaborator: String,
    pub reason: String,
}

impl CollaboratorError {
    pub fn new(collaborator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            collaborator: collaborator.into(),
            reason: reason.into(),
        }
    }

    /// Attribute this failure to `step`.
    pub fn at(self, step: StepId) -> MinwonError {
        MinwonError::CollaboratorFailure {
            step,
            reason: self.to_string(),
        }
    }
}
