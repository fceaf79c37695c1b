//! Deterministic collaborator stubs shared by this crate's unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use minwon_contracts::{
    error::{CollaboratorError, MinwonResult},
    execution::StepRecord,
    state::RunId,
};

use crate::{
    prompts::PromptTemplate,
    traits::{DocumentRetriever, LanguageModel, PromptVars, TraceWriter},
};

/// A model that replays scripted replies per template.
///
/// Replies are consumed in order; the last one repeats forever.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<HashMap<PromptTemplate, VecDeque<Result<String, String>>>>,
    calls: Mutex<HashMap<PromptTemplate, usize>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, template: PromptTemplate, text: &str) -> Self {
        self.push(template, Ok(text.to_string()))
    }

    pub fn fail(self, template: PromptTemplate, reason: &str) -> Self {
        self.push(template, Err(reason.to_string()))
    }

    /// Script every template with a plausible reply and the given verdicts.
    pub fn straight_through(question: &str, quality: &str) -> Self {
        Self::new()
            .reply(PromptTemplate::AssessQuestion, question)
            .reply(PromptTemplate::RequestClarification, "Where and when did this happen?")
            .reply(PromptTemplate::AssessAnswerQuality, quality)
            .reply(PromptTemplate::GenerateAnswer, "The district office will inspect within 7 days.")
            .reply(PromptTemplate::SanitizeComplaint, "Broken streetlight reported on Elm St.")
            .reply(
                PromptTemplate::ComposeReport,
                "■ Answer to the citizen\nInspection within 7 days.\n■ Notes for the handling officer\nElm St.",
            )
    }

    pub fn calls(&self, template: PromptTemplate) -> usize {
        self.calls.lock().unwrap().get(&template).copied().unwrap_or(0)
    }

    fn push(self, template: PromptTemplate, reply: Result<String, String>) -> Self {
        self.replies.lock().unwrap().entry(template).or_default().push_back(reply);
        self
    }
}

impl LanguageModel for ScriptedModel {
    fn infer(&self, template: PromptTemplate, _vars: &PromptVars) -> Result<String, CollaboratorError> {
        *self.calls.lock().unwrap().entry(template).or_insert(0) += 1;

        let mut replies = self.replies.lock().unwrap();
        let queue = replies.entry(template).or_default();
        let reply = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };

        match reply {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(CollaboratorError::new("language-model", reason)),
            None => Err(CollaboratorError::new(
                "language-model",
                format!("no scripted reply for '{}'", template),
            )),
        }
    }
}

/// A retriever that returns the first `k` of a fixed passage list.
pub struct StaticRetriever {
    passages: Vec<String>,
    calls: AtomicUsize,
}

impl StaticRetriever {
    pub fn new(passages: Vec<&str>) -> Self {
        Self {
            passages: passages.into_iter().map(str::to_string).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentRetriever for StaticRetriever {
    fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<String>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.passages.iter().take(k).cloned().collect())
    }
}

pub struct FailingRetriever;

impl DocumentRetriever for FailingRetriever {
    fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<String>, CollaboratorError> {
        Err(CollaboratorError::new("retriever", "vector index not loaded"))
    }
}

/// A trace writer that keeps every record for inspection.
#[derive(Default)]
pub struct RecordingTrace {
    pub records: Mutex<Vec<StepRecord>>,
    pub finalized: Mutex<Vec<RunId>>,
}

impl TraceWriter for RecordingTrace {
    fn record(&self, _run_id: &RunId, record: &StepRecord) -> MinwonResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn finalize(&self, run_id: &RunId) -> MinwonResult<()> {
        self.finalized.lock().unwrap().push(run_id.clone());
        Ok(())
    }
}
