//! # aigrade
//!
//! Grades free-text student answers against a fixed three-part rubric:
//! relevance to a reference answer, grammar and spelling, and adherence to a
//! word-count range.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Environment-driven configuration shared across the crate
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// External engines the grader consumes: embeddings and grammar checking
pub mod engines;
/// For all things related to grading
pub mod grade;
/// Validation of raw grading requests coming from the CLI or the web form
pub mod request;
/// HTTP front-end for the grader
pub mod server;
/// Text normalization and word counting
pub mod text;
/// Utility functions for convenience
pub mod util;

pub use grade::{CriterionScore, Evaluator, GradingInput, GradingOutput, WordCountRange};
