//! Deterministic collaborators for demos and tests.
//!
//! `KeywordRetriever` ranks corpus passages by keyword overlap with the query.
//! `RuleBasedModel` answers each prompt template with simple text heuristics
//! in place of a hosted language model. Both are reproducible run to run.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use minwon_config::Settings;
use minwon_contracts::error::{CollaboratorError, MinwonResult};
use minwon_core::{
    steps::CONTEXT_SEPARATOR,
    traits::{DocumentRetriever, LanguageModel, PromptVars},
    Collaborators, PromptTemplate, WorkflowEngine,
};

use crate::mock_data::statute_passages;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "has", "have", "had", "been", "with", "from",
    "that", "this", "there", "their", "they", "them", "into", "over", "every", "day", "days",
    "since", "last", "our", "your", "you", "not", "any", "all", "but", "who", "what", "when",
    "where", "which", "will", "shall", "may", "within", "after", "before", "then", "also", "its",
    "out", "one", "two", "per", "user", "assistant",
];

const LOCATION_WORDS: &[&str] = &[
    "street", "road", "avenue", "ave", "lane", "close", "apartment", "building", "park", "school",
    "station", "block", "crossing", "floor",
];

const TIME_WORDS: &[&str] = &[
    "morning", "afternoon", "evening", "night", "daily", "weekly", "weekend", "monday", "tuesday",
    "wednesday", "thursday", "friday", "saturday", "sunday", "since", "every", "yesterday", "today",
];

const ABUSIVE_WORDS: &[&str] = &["idiot", "idiots", "stupid", "useless", "moron", "morons", "damn"];

/// The citizen's own words from a question that may be a follow-up
/// transcript. `Assistant:` lines are dropped and `User: ` prefixes stripped;
/// a plain first-turn question is returned as is.
pub fn citizen_text(question: &str) -> String {
    if !question.starts_with("User: ") {
        return question.to_string();
    }
    question
        .lines()
        .filter_map(|line| line.strip_prefix("User: "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lowercased content words of `text`, with a crude plural strip.
pub fn keywords(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .map(|w| {
            if w.len() > 4 && w.ends_with('s') && !w.ends_with("ss") {
                w[..w.len() - 1].to_string()
            } else {
                w
            }
        })
        .collect()
}

// ── Retriever ────────────────────────────────────────────────────────────────

/// Ranks an in-memory corpus by the number of query keywords each passage
/// contains. Passages with no overlap are never returned.
pub struct KeywordRetriever {
    corpus: Vec<(String, BTreeSet<String>)>,
}

impl KeywordRetriever {
    pub fn new(passages: Vec<String>) -> Self {
        let corpus = passages
            .into_iter()
            .map(|p| {
                let words = keywords(&p);
                (p, words)
            })
            .collect();
        Self { corpus }
    }

    /// A retriever over the fictional statute corpus.
    pub fn statutes() -> Self {
        Self::new(statute_passages())
    }
}

impl DocumentRetriever for KeywordRetriever {
    fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>, CollaboratorError> {
        let query_words = keywords(query);

        let mut scored: Vec<(usize, usize)> = self
            .corpus
            .iter()
            .enumerate()
            .map(|(idx, (_, words))| (idx, words.intersection(&query_words).count()))
            .filter(|(_, score)| *score > 0)
            .collect();

        // Highest score first; corpus order breaks ties.
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(idx, _)| self.corpus[idx].0.clone())
            .collect())
    }
}

// ── Language model ───────────────────────────────────────────────────────────

/// Heuristic stand-in for a hosted language model.
///
/// - A complaint is sufficient when it has at least six words and names a
///   place (a number or a location word).
/// - Passages are sufficient when they share at least two keywords with
///   the complaint.
///
/// Only the citizen's lines of a follow-up transcript are judged, so wording
/// in an earlier clarification never counts toward the complaint.
pub struct RuleBasedModel {
    name: String,
}

impl RuleBasedModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn question_is_sufficient(question: &str) -> bool {
        question.split_whitespace().count() >= 6 && Self::names_place(question)
    }

    fn names_place(question: &str) -> bool {
        question.chars().any(|c| c.is_ascii_digit())
            || keywords(question).iter().any(|w| LOCATION_WORDS.contains(&w.as_str()))
    }

    fn names_time(question: &str) -> bool {
        let lowered = question.to_lowercase();
        TIME_WORDS.iter().any(|w| lowered.contains(w))
    }

    fn context_is_sufficient(question: &str, context: &str) -> bool {
        keywords(question).intersection(&keywords(context)).count() >= 2
    }

    fn clarification(question: &str) -> String {
        let mut missing = Vec::new();
        if question.split_whitespace().count() < 6 {
            missing.push("what exactly is happening");
        }
        if !Self::names_place(question) {
            missing.push("where it happens (street address or building)");
        }
        if !Self::names_time(question) {
            missing.push("when it started and how often it happens");
        }
        if missing.is_empty() {
            missing.push("any further detail that would help the handling office");
        }
        format!(
            "Thank you for contacting us. To process your complaint we need a little more \
             detail: {}. Please reply with these details.",
            missing.join("; ")
        )
    }

    fn draft_answer(context: &str) -> String {
        let first = context.split(CONTEXT_SEPARATOR).map(str::trim).find(|p| !p.is_empty());
        match first.and_then(|p| p.split_once(": ")) {
            Some((citation, text)) => format!(
                "Under {}: {} Your complaint has been forwarded to the responsible division.",
                citation, text
            ),
            None => "No provision in the statute index directly covers this complaint. It has \
                     been forwarded to the general civil affairs division, which will reply \
                     within seven working days."
                .to_string(),
        }
    }

    fn sanitize(question: &str) -> String {
        question
            .split_whitespace()
            .map(|token| {
                let bare = token
                    .trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase();
                if token.chars().filter(|c| c.is_ascii_digit()).count() >= 7 {
                    "[phone number removed]"
                } else if ABUSIVE_WORDS.contains(&bare.as_str()) {
                    "[removed]"
                } else {
                    token
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl LanguageModel for RuleBasedModel {
    fn infer(&self, template: PromptTemplate, vars: &PromptVars) -> Result<String, CollaboratorError> {
        let missing = template.missing_variables(vars);
        if !missing.is_empty() {
            return Err(CollaboratorError::new(
                "language-model",
                format!("template '{}' is missing {}", template, missing.join(", ")),
            ));
        }

        let prompt = template.render(vars);
        debug!(model = %self.name, template = %template, prompt_chars = prompt.len(), "rule-based inference");

        let var = |name: &str| vars.get(name).map(String::as_str).unwrap_or("");

        let verdict = |ok: bool| (if ok { "sufficient" } else { "insufficient" }).to_string();

        Ok(match template {
            PromptTemplate::AssessQuestion => {
                verdict(Self::question_is_sufficient(&citizen_text(var("question"))))
            }
            PromptTemplate::RequestClarification => Self::clarification(&citizen_text(var("question"))),
            PromptTemplate::AssessAnswerQuality => verdict(Self::context_is_sufficient(
                &citizen_text(var("question")),
                var("context"),
            )),
            PromptTemplate::GenerateAnswer => Self::draft_answer(var("context")),
            PromptTemplate::SanitizeComplaint => Self::sanitize(var("question")),
            PromptTemplate::ComposeReport => format!(
                "■ Answer to the citizen\n{}\n\n■ Notes for the handling officer\n{}",
                var("assistant_answer"),
                var("cleaned_question")
            ),
        })
    }
}

/// An engine wired to the reference collaborators and `settings`.
pub fn reference_engine(settings: &Settings) -> MinwonResult<WorkflowEngine> {
    let collaborators = Collaborators::new(
        Arc::new(RuleBasedModel::new(settings.model.name.clone())),
        Arc::new(KeywordRetriever::statutes()),
    )
    .with_retrieval_k(settings.workflow.retrieval_k);

    WorkflowEngine::new(collaborators, settings.retry_policy())
}
