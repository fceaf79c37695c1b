//! # minwon-core
//!
//! The workflow controller for civil-complaint handling.
//!
//! This crate provides:
//! - The collaborator traits (`LanguageModel`, `DocumentRetriever`, `TraceWriter`)
//! - The seven step functions and their prompt templates
//! - The two gate routers and their retry policy
//! - The `WorkflowGraph` and the `WorkflowEngine` that runs it
//!
//! ## Usage
//!
//! ```rust,ignore
//! use minwon_core::{Collaborators, RetryPolicy, WorkflowEngine};
//!
//! let engine = WorkflowEngine::new(Collaborators::new(llm, retriever), RetryPolicy::default())?;
//! let text = engine.run_question("The streetlight outside 12 Elm St has been out for a week")?;
//! ```

pub mod engine;
pub mod graph;
pub mod prompts;
pub mod router;
pub mod steps;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::WorkflowEngine;
pub use graph::{Router, Transition, WorkflowGraph};
pub use prompts::PromptTemplate;
pub use router::{RetryPolicy, Route, MAX_RETRIES};
pub use steps::{Collaborators, DEFAULT_RETRIEVAL_K};
