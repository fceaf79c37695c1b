//! The seven step functions.
//!
//! Every step reads a slice of `AgentState`, makes exactly one collaborator
//! call, and returns a `StateUpdate`. Steps never choose the next step; that
//! belongs to the graph and its routers.

use std::sync::Arc;

use serde_json::{json, Map};
use tracing::{debug, warn};

use minwon_contracts::{
    error::{CollaboratorError, MinwonResult},
    state::{AgentState, Assessment, Message, StateUpdate, REPORT_MARKER},
    step::StepId,
};

use crate::{
    prompts::PromptTemplate,
    traits::{DocumentRetriever, LanguageModel, PromptVars},
};

/// Passages requested per retrieval unless configured otherwise.
pub const DEFAULT_RETRIEVAL_K: usize = 5;

/// Joins retrieved passages into one prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// The external services a run calls, injected once per engine.
#[derive(Clone)]
pub struct Collaborators {
    pub llm: Arc<dyn LanguageModel>,
    pub retriever: Arc<dyn DocumentRetriever>,
    /// `k` passed to every retrieval.
    pub retrieval_k: usize,
}

impl Collaborators {
    pub fn new(llm: Arc<dyn LanguageModel>, retriever: Arc<dyn DocumentRetriever>) -> Self {
        Self {
            llm,
            retriever,
            retrieval_k: DEFAULT_RETRIEVAL_K,
        }
    }

    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k;
        self
    }
}

/// Invoke the step function for `step`.
pub fn run_step(step: StepId, ctx: &Collaborators, state: &AgentState) -> MinwonResult<StateUpdate> {
    match step {
        StepId::AssessQuestion => assess_question(ctx, state),
        StepId::RequestClarification => request_clarification(ctx, state),
        StepId::RetrieveDocuments => retrieve_documents(ctx, state),
        StepId::AssessAnswerQuality => assess_answer_quality(ctx, state),
        StepId::GenerateAnswer => generate_answer(ctx, state),
        StepId::FilterAndSanitize => filter_and_sanitize(ctx, state),
        StepId::CreateFinalReport => create_final_report(ctx, state),
    }
}

/// Classify whether the complaint is specific enough, and record it in the
/// transcript.
pub fn assess_question(ctx: &Collaborators, state: &AgentState) -> MinwonResult<StateUpdate> {
    let vars = vars([("question", state.question.clone())]);
    let verdict = classify(ctx, StepId::AssessQuestion, PromptTemplate::AssessQuestion, &vars)?;

    Ok(StateUpdate::assessment(verdict).with_message(Message::user(state.question.clone())))
}

/// Ask the citizen for the details the complaint is missing.
pub fn request_clarification(ctx: &Collaborators, state: &AgentState) -> MinwonResult<StateUpdate> {
    let vars = vars([("question", state.question.clone())]);
    let clarification = infer(
        ctx,
        StepId::RequestClarification,
        PromptTemplate::RequestClarification,
        &vars,
    )?;

    Ok(StateUpdate::default().with_message(Message::assistant(clarification)))
}

/// Fetch the top-k passages. Replaces any previously retrieved set.
pub fn retrieve_documents(ctx: &Collaborators, state: &AgentState) -> MinwonResult<StateUpdate> {
    let documents = ctx
        .retriever
        .retrieve(&state.question, ctx.retrieval_k)
        .map_err(|e| e.at(StepId::RetrieveDocuments))?;

    debug!(count = documents.len(), k = ctx.retrieval_k, "documents retrieved");
    Ok(StateUpdate::documents(documents))
}

/// Classify whether the retrieved passages can support an answer.
///
/// An empty passage set is still sent for classification.
pub fn assess_answer_quality(ctx: &Collaborators, state: &AgentState) -> MinwonResult<StateUpdate> {
    let vars = vars([
        ("question", state.question.clone()),
        ("context", state.documents.join(CONTEXT_SEPARATOR)),
    ]);
    let verdict = classify(
        ctx,
        StepId::AssessAnswerQuality,
        PromptTemplate::AssessAnswerQuality,
        &vars,
    )?;

    Ok(StateUpdate::assessment(verdict))
}

/// Draft an answer from the retrieved passages.
pub fn generate_answer(ctx: &Collaborators, state: &AgentState) -> MinwonResult<StateUpdate> {
    let vars = vars([
        ("question", state.question.clone()),
        ("context", state.documents.join(CONTEXT_SEPARATOR)),
    ]);
    let draft = infer(ctx, StepId::GenerateAnswer, PromptTemplate::GenerateAnswer, &vars)?;

    Ok(StateUpdate {
        assistant_answer: Some(draft),
        ..StateUpdate::default()
    })
}

/// Produce an operator-facing copy of the complaint with abuse and personal
/// identifiers removed.
pub fn filter_and_sanitize(ctx: &Collaborators, state: &AgentState) -> MinwonResult<StateUpdate> {
    let vars = vars([("question", state.question.clone())]);
    let cleaned = infer(
        ctx,
        StepId::FilterAndSanitize,
        PromptTemplate::SanitizeComplaint,
        &vars,
    )?;

    Ok(StateUpdate {
        cleaned_question: Some(cleaned),
        ..StateUpdate::default()
    })
}

/// Compose the final report and publish it in `answer`.
pub fn create_final_report(ctx: &Collaborators, state: &AgentState) -> MinwonResult<StateUpdate> {
    let vars = vars([
        ("question", state.question.clone()),
        ("assistant_answer", state.assistant_answer.clone()),
        ("cleaned_question", state.cleaned_question.clone()),
    ]);
    let composed = infer(ctx, StepId::CreateFinalReport, PromptTemplate::ComposeReport, &vars)?;

    let report = if composed.contains(REPORT_MARKER) {
        composed
    } else {
        format!("{} Complaint report\n{}", REPORT_MARKER, composed)
    };

    let mut final_report = Map::new();
    final_report.insert("question".to_string(), json!(state.question));
    final_report.insert("citizen_answer".to_string(), json!(state.assistant_answer));
    final_report.insert("operator_brief".to_string(), json!(state.cleaned_question));
    final_report.insert("report".to_string(), json!(report));
    final_report.insert("source_count".to_string(), json!(state.documents.len()));

    Ok(StateUpdate {
        answer: Some(report.clone()),
        final_report: Some(final_report),
        ..StateUpdate::default()
    }
    .with_message(Message::assistant(report)))
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn vars<const N: usize>(pairs: [(&'static str, String); N]) -> PromptVars {
    pairs.into_iter().collect()
}

/// Call the model and reject empty replies.
fn infer(
    ctx: &Collaborators,
    step: StepId,
    template: PromptTemplate,
    vars: &PromptVars,
) -> MinwonResult<String> {
    let text = ctx.llm.infer(template, vars).map_err(|e| e.at(step))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(CollaboratorError::new(
            "language-model",
            format!("empty reply to template '{}'", template),
        )
        .at(step));
    }
    Ok(text.to_string())
}

/// Call the model for a verdict. Unrecognized replies fail closed.
fn classify(
    ctx: &Collaborators,
    step: StepId,
    template: PromptTemplate,
    vars: &PromptVars,
) -> MinwonResult<Assessment> {
    let raw = infer(ctx, step, template, vars)?;
    match Assessment::parse(&raw) {
        Ok(verdict) => Ok(verdict),
        Err(e) => {
            warn!(step = %step, error = %e, "treating unrecognized verdict as insufficient");
            Ok(Assessment::Insufficient)
        }
    }
}
