#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use itertools::Itertools;

use super::results::{Assessment, CriterionScore};
use crate::{
    constants::{CRITERION_MAX_SCORE, GRAMMAR_AND_SPELLING, GRAMMAR_BUCKETS, GRAMMAR_ISSUES_QUOTED},
    engines::{GrammarCheck, GrammarChecker},
};

/// Maps a number of grammar/spelling issues onto the 0-5 scale.
pub fn bucket_score(issue_count: usize) -> f64 {
    GRAMMAR_BUCKETS
        .iter()
        .find(|(max_issues, _)| issue_count <= *max_issues)
        .map_or(0.0, |(_, score)| *score)
}

/// Scores grammar and spelling from the findings of a [`GrammarChecker`].
pub struct GrammarScorer<'a> {
    /// Grammar engine.
    checker: &'a dyn GrammarChecker,
}

impl<'a> GrammarScorer<'a> {
    /// Creates a scorer backed by `checker`.
    pub fn new(checker: &'a dyn GrammarChecker) -> Self {
        Self { checker }
    }

    /// Scores `student_answer`.
    ///
    /// Checker failures of either kind score zero and are flagged; an empty
    /// answer scores zero without being flagged.
    pub fn score(&self, student_answer: &str) -> Assessment {
        if student_answer.trim().is_empty() {
            return Assessment::ok(grammar(
                0.0,
                "Student answer is empty. Grammar and spelling could not be assessed.",
            ));
        }

        match self.checker.check(student_answer) {
            Ok(GrammarCheck::Completed { issues, count }) => {
                let score = bucket_score(count);
                tracing::debug!(count, score, "grammar scored");
                Assessment::ok(grammar(score, describe(&issues, count)))
            }
            Ok(GrammarCheck::ToolFailed { reason }) => {
                tracing::error!("Grammar tool failed: {reason}");
                Assessment::flagged(grammar(0.0, reason))
            }
            Err(e) => {
                tracing::error!("Grammar checker could not run: {e:#}");
                Assessment::flagged(grammar(
                    0.0,
                    format!("Could not perform grammar/spelling check: {e:#}"),
                ))
            }
        }
    }
}

/// Feedback for a completed check.
fn describe(issues: &[String], count: usize) -> String {
    if count == 0 {
        return String::from("No grammar or spelling issues found.");
    }

    let mut feedback = format!("Found {count} grammar/spelling issue(s).");
    if !issues.is_empty() {
        let quoted = issues.iter().take(GRAMMAR_ISSUES_QUOTED).join("; ");
        feedback.push_str(&format!(" First few issues: {quoted}"));
    }
    feedback
}

/// Builds a grammar criterion score.
fn grammar(score: f64, feedback: impl Into<String>) -> CriterionScore {
    CriterionScore::new(GRAMMAR_AND_SPELLING, score, CRITERION_MAX_SCORE, feedback)
}
