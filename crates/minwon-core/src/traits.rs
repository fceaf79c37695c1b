//! Collaborator trait definitions.
//!
//! The workflow calls out to two external services and one observability
//! sink:
//!
//! - `LanguageModel`: classifies, drafts, redacts, and composes text
//! - `DocumentRetriever`: returns the top-k passages for a query
//! - `TraceWriter`: records every intermediate state of a run
//!
//! All three are injected into the engine; nothing in this crate holds a
//! process-wide client. Implementations must be `Send + Sync` so one engine
//! can serve independent runs on several threads.

use std::collections::BTreeMap;

use minwon_contracts::{
    error::{CollaboratorError, MinwonResult},
    execution::StepRecord,
    state::RunId,
};

use crate::prompts::PromptTemplate;

/// Named values substituted into a prompt template.
pub type PromptVars = BTreeMap<&'static str, String>;

/// The language-inference service.
pub trait LanguageModel: Send + Sync {
    /// Fill `template` with `vars` and return the model's free-form reply.
    ///
    /// Returning an empty string is treated by the caller as a failure.
    fn infer(&self, template: PromptTemplate, vars: &PromptVars) -> Result<String, CollaboratorError>;
}

/// The document retrieval service.
pub trait DocumentRetriever: Send + Sync {
    /// Return at most `k` passages relevant to `query`, best first.
    ///
    /// Must return an empty vector, not an error, when nothing matches.
    fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>, CollaboratorError>;
}

/// Sink for per-step run records.
///
/// Writers observe state; they never alter the run. A failed write aborts
/// the run with `MinwonError::TraceWriteFailed`.
pub trait TraceWriter: Send + Sync {
    /// Append one step record for `run_id`.
    fn record(&self, run_id: &RunId, record: &StepRecord) -> MinwonResult<()>;

    /// Called once when the run reaches a terminal.
    fn finalize(&self, run_id: &RunId) -> MinwonResult<()>;
}

/// A `TraceWriter` that keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTraceWriter;

impl TraceWriter for NullTraceWriter {
    fn record(&self, _run_id: &RunId, _record: &StepRecord) -> MinwonResult<()> {
        Ok(())
    }

    fn finalize(&self, _run_id: &RunId) -> MinwonResult<()> {
        Ok(())
    }
}
