//! # minwon-ref
//!
//! Reference runtime for the minwon civil-complaint workflow.
//!
//! Wires the real engine to deterministic collaborators and demonstrates three
//! runs:
//!
//! 1. **Well-specified complaint**: straight through to a report.
//! 2. **Vague complaint**: early exit asking for clarification, then a
//!    follow-up turn that completes.
//! 3. **Complaint outside the corpus**: one retrieval loop-back, then forced
//!    generation.
//!
//! The statute corpus is fictional. No external services are contacted.

pub mod collaborators;
pub mod mock_data;
pub mod scenarios;

pub use collaborators::{reference_engine, KeywordRetriever, RuleBasedModel};

// ── Tests ─────────────────────────────────────────────────────────────────────
