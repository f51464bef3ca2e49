#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Orchestration of all criteria into one result.
pub mod evaluator;
/// Grammar and spelling criterion.
pub mod grammar;
/// Grading request types.
pub mod input;
/// Semantic relevance criterion.
pub mod relevance;
/// Criterion and overall result types.
pub mod results;
/// Word-count criterion.
pub mod word_count;

pub use evaluator::Evaluator;
pub use grammar::{GrammarScorer, bucket_score};
pub use input::{EvaluationCriterion, GradingInput, WordCountRange};
pub use relevance::RelevanceScorer;
pub use results::{Assessment, CriterionScore, GradingOutput};
pub use word_count::score_word_count;
