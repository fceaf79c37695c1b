//! The per-run state record and the partial updates steps produce.
//!
//! `AgentState` is a fixed-shape struct rather than an open mapping. Steps
//! never mutate it directly: each returns a `StateUpdate`, and the engine
//! merges it with `AgentState::apply`. Every field except `messages` is
//! overwritten when present in the update; `messages` is only ever appended.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::MinwonError, step::Gate};

/// Marker every finished report carries, so callers of the text-only entry
/// point can tell a report from a clarification question.
pub const REPORT_MARKER: &str = "■";

/// Unique identifier for one workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A gate's sufficiency verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    Sufficient,
    Insufficient,
}

impl Assessment {
    /// Parse classifier output into a verdict.
    ///
    /// The text is trimmed, lowercased, and stripped of surrounding quotes
    /// and trailing punctuation before comparison. Anything that is not
    /// exactly `sufficient` or `insufficient` afterwards is
    /// `MalformedAssessment`; callers are expected to fail closed with
    /// `Assessment::Insufficient`.
    pub fn parse(raw: &str) -> Result<Self, MinwonError> {
        let normalized = raw.trim().to_lowercase();
        let normalized = normalized
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.' | '!' | '*'))
            .trim();

        match normalized {
            "sufficient" => Ok(Assessment::Sufficient),
            "insufficient" => Ok(Assessment::Insufficient),
            _ => Err(MinwonError::MalformedAssessment { raw: raw.to_string() }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Assessment::Sufficient => "sufficient",
            Assessment::Insufficient => "insufficient",
        }
    }
}

/// Loop-back counts, one per gate.
///
/// Each gate's count is reset when that gate is left forward (passed or
/// forced) and incremented only when that gate loops back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryCounters {
    pub question: u32,
    pub quality: u32,
}

impl RetryCounters {
    pub fn get(&self, gate: Gate) -> u32 {
        match gate {
            Gate::Question => self.question,
            Gate::Quality => self.quality,
        }
    }

    /// Return a copy with `gate`'s count incremented by one.
    pub fn incremented(self, gate: Gate) -> Self {
        self.with(gate, self.get(gate) + 1)
    }

    /// Return a copy with `gate`'s count reset to zero.
    pub fn reset(self, gate: Gate) -> Self {
        self.with(gate, 0)
    }

    fn with(mut self, gate: Gate, value: u32) -> Self {
        match gate {
            Gate::Question => self.question = value,
            Gate::Quality => self.quality = value,
        }
        self
    }
}

/// The mutable record threaded through every step of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Original user input, possibly a concatenated multi-turn transcript.
    pub question: String,
    /// Complaint text after redaction, for the operator.
    pub cleaned_question: String,
    /// Passages from the most recent retrieval. Replaced wholesale.
    pub documents: Vec<String>,
    /// Draft answer before the report is composed.
    pub assistant_answer: String,
    /// The report text once the run completes. Empty on early exit.
    pub answer: String,
    /// Verdict of the most recent gate. `None` until a gate has run.
    pub assessment_result: Option<Assessment>,
    /// Structured report for both the citizen and the operator.
    pub final_report: Map<String, Value>,
    pub retries: RetryCounters,
    messages: Vec<Message>,
}

impl AgentState {
    /// Fresh state for a first-turn question. Every field is at its empty value.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    /// Seed the next turn after a run ended asking for clarification.
    ///
    /// The new question is the previous question, the clarification that was
    /// asked, and the citizen's `reply`, one line each. The transcript and the
    /// question gate's retry count carry over; everything else starts empty.
    pub fn follow_up(previous: &AgentState, reply: &str) -> Self {
        let mut question = if previous.question.starts_with("User: ") {
            previous.question.clone()
        } else {
            format!("User: {}", previous.question)
        };

        if let Some(asked) = previous.last_assistant_message() {
            question.push_str("\nAssistant: ");
            question.push_str(asked);
        }
        question.push_str("\nUser: ");
        question.push_str(reply);

        Self {
            question,
            retries: RetryCounters {
                question: previous.retries.question,
                quality: 0,
            },
            messages: previous.messages.clone(),
            ..Self::default()
        }
    }

    /// The full transcript, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_assistant_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Merge a step's partial update into this state.
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            cleaned_question,
            documents,
            assistant_answer,
            answer,
            assessment_result,
            final_report,
            messages,
        } = update;

        if let Some(v) = cleaned_question {
            self.cleaned_question = v;
        }
        if let Some(v) = documents {
            self.documents = v;
        }
        if let Some(v) = assistant_answer {
            self.assistant_answer = v;
        }
        if let Some(v) = answer {
            self.answer = v;
        }
        if let Some(v) = assessment_result {
            self.assessment_result = Some(v);
        }
        if let Some(v) = final_report {
            self.final_report = v;
        }
        self.messages.extend(messages);
    }
}

/// The fields one step wants to change.
///
/// `None` leaves the field alone. `messages` are appended to the transcript.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub cleaned_question: Option<String>,
    pub documents: Option<Vec<String>>,
    pub assistant_answer: Option<String>,
    pub answer: Option<String>,
    pub assessment_result: Option<Assessment>,
    pub final_report: Option<Map<String, Value>>,
    pub messages: Vec<Message>,
}

impl StateUpdate {
    pub fn assessment(verdict: Assessment) -> Self {
        Self {
            assessment_result: Some(verdict),
            ..Self::default()
        }
    }

    pub fn documents(documents: Vec<String>) -> Self {
        Self {
            documents: Some(documents),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}
