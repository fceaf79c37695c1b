//! Prompt templates sent to the language model.
//!
//! Each step uses exactly one template. Templates are plain text with
//! `{name}` placeholders; `PromptTemplate::render` fills them from a
//! `PromptVars` map. Adapters that talk to a hosted model render the prompt
//! themselves; stubs usually just match on the template.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::PromptVars;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    AssessQuestion,
    RequestClarification,
    AssessAnswerQuality,
    GenerateAnswer,
    SanitizeComplaint,
    ComposeReport,
}

const ASSESS_QUESTION: &str = "\
You triage civil complaints submitted to a local government office.
Decide whether the complaint below contains enough information to act on:
what the problem is, where it happens, and when or how often it happens.

Complaint:
{question}

Reply with exactly one word: sufficient or insufficient.";

const REQUEST_CLARIFICATION: &str = "\
You are a courteous civil-service assistant. The complaint below is missing
details needed to process it. Ask the citizen, in one short paragraph, for
the specific missing details (location, time, frequency, parties involved).
Do not answer the complaint yet.

Complaint:
{question}";

const ASSESS_ANSWER_QUALITY: &str = "\
Decide whether the statute passages below are relevant and sufficient to
answer the complaint.

Complaint:
{question}

Passages:
{context}

Reply with exactly one word: sufficient or insufficient.";

const GENERATE_ANSWER: &str = "\
Answer the citizen's complaint using only the statute passages provided.
Cite the relevant provisions, state which office handles the matter, and
describe the next steps the citizen can expect.

Passages:
{context}

Complaint:
{question}";

const SANITIZE_COMPLAINT: &str = "\
Rewrite the complaint below for the handling officer. Remove insults,
threats, and personal identifiers (names, phone numbers, addresses of
private persons). Keep every fact needed to process the complaint.
Return only the rewritten complaint.

Complaint:
{question}";

const COMPOSE_REPORT: &str = "\
Compose the final complaint report with two sections, each starting with
the ■ character:

■ Answer to the citizen
■ Notes for the handling officer

Use the draft answer for the first section and the sanitized complaint for
the second.

Original complaint:
{question}

Draft answer:
{assistant_answer}

Sanitized complaint:
{cleaned_question}";

impl PromptTemplate {
    /// Stable identifier for adapters and logs.
    pub fn id(&self) -> &'static str {
        match self {
            PromptTemplate::AssessQuestion => "assess_question",
            PromptTemplate::RequestClarification => "request_clarification",
            PromptTemplate::AssessAnswerQuality => "assess_answer_quality",
            PromptTemplate::GenerateAnswer => "generate_answer",
            PromptTemplate::SanitizeComplaint => "sanitize_complaint",
            PromptTemplate::ComposeReport => "compose_report",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            PromptTemplate::AssessQuestion => ASSESS_QUESTION,
            PromptTemplate::RequestClarification => REQUEST_CLARIFICATION,
            PromptTemplate::AssessAnswerQuality => ASSESS_ANSWER_QUALITY,
            PromptTemplate::GenerateAnswer => GENERATE_ANSWER,
            PromptTemplate::SanitizeComplaint => SANITIZE_COMPLAINT,
            PromptTemplate::ComposeReport => COMPOSE_REPORT,
        }
    }

    /// The variable names this template expects.
    pub fn variables(&self) -> &'static [&'static str] {
        match self {
            PromptTemplate::AssessQuestion
            | PromptTemplate::RequestClarification
            | PromptTemplate::SanitizeComplaint => &["question"],
            PromptTemplate::AssessAnswerQuality | PromptTemplate::GenerateAnswer => {
                &["question", "context"]
            }
            PromptTemplate::ComposeReport => &["question", "assistant_answer", "cleaned_question"],
        }
    }

    /// Substitute every `{name}` placeholder present in `vars` in one
    /// left-to-right pass. Substituted values are never scanned again, so a
    /// value that itself contains `{question}` is inserted literally.
    ///
    /// Placeholders without a value are left untouched.
    pub fn render(&self, vars: &PromptVars) -> String {
        let text = self.text();
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let Some(close) = tail.find('}') else {
                rest = tail;
                break;
            };
            match vars.get(&tail[1..close]) {
                Some(value) => out.push_str(value),
                None => out.push_str(&tail[..=close]),
            }
            rest = &tail[close + 1..];
        }
        out.push_str(rest);
        out
    }

    /// Declared variables that `vars` does not supply.
    pub fn missing_variables(&self, vars: &PromptVars) -> Vec<&'static str> {
        self.variables()
            .iter()
            .copied()
            .filter(|name| !vars.contains_key(name))
            .collect()
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
