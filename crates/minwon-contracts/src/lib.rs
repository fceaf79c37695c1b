//! # minwon-contracts
//!
//! Shared state, step identifiers, and error types for the minwon complaint
//! workflow.
//!
//! All crates in the workspace import from here. The only logic in this crate
//! is the state merge rule and verdict normalization.

pub mod error;
pub mod execution;
pub mod state;
pub mod step;
