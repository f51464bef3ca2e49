#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use super::{
    grammar::GrammarScorer,
    input::GradingInput,
    relevance::RelevanceScorer,
    results::{Assessment, CriterionScore, GradingOutput},
    word_count::score_word_count,
};
use crate::{
    config::ConfigHandle,
    constants::{
        CRITERION_MAX_SCORE, FALLBACK_FEEDBACK, GRAMMAR_AND_SPELLING, GRAMMAR_LABEL, RELEVANCE,
        RELEVANCE_LABEL, WORD_COUNT_ADHERENCE, WORD_COUNT_LABEL,
    },
    engines::{Embedder, GrammarChecker, OpenAiEmbedder},
    util::{self, panic_message},
};

/// Grades answers by running every criterion and combining the results.
///
/// Cloning is cheap; the engines are shared.
#[derive(Clone)]
pub struct Evaluator {
    /// Embedding engine for relevance.
    embedder: Arc<dyn Embedder>,
    /// Grammar engine.
    grammar:  Arc<dyn GrammarChecker>,
}

impl Evaluator {
    /// Creates an evaluator over the given engines.
    pub fn new(embedder: Arc<dyn Embedder>, grammar: Arc<dyn GrammarChecker>) -> Self {
        Self { embedder, grammar }
    }

    /// Creates an evaluator wired to the configured embedding endpoint and the
    /// process-wide LanguageTool handle.
    pub fn from_config(config: &ConfigHandle) -> Self {
        let embedder = OpenAiEmbedder::new(config.embedding(), config.http_client());
        tracing::info!(
            model = embedder.model(),
            languagetool = config.languagetool_url(),
            "Evaluator configured"
        );
        Self::new(Arc::new(embedder), config.language_tool())
    }

    /// Grades `input`. Never fails: each criterion is isolated, and a
    /// criterion that faults is replaced by a zero-score placeholder and
    /// flagged for review.
    pub fn evaluate(&self, input: &GradingInput) -> GradingOutput {
        let processed = input.normalized();
        let mut tally = Tally::default();

        match guarded(|| {
            RelevanceScorer::new(self.embedder.as_ref())
                .score(&processed.student_answer, processed.reference_answer.as_deref())
        }) {
            Ok(assessment) => tally.record(RELEVANCE_LABEL, assessment),
            Err(msg) => tally.record_fault(
                format!("Critical error in relevance scoring: {msg}"),
                Some(RELEVANCE),
            ),
        }

        match guarded(|| GrammarScorer::new(self.grammar.as_ref()).score(&processed.student_answer)) {
            Ok(assessment) => tally.record(GRAMMAR_LABEL, assessment),
            Err(msg) => tally.record_fault(
                format!("Critical error in grammar/spelling scoring: {msg}"),
                Some(GRAMMAR_AND_SPELLING),
            ),
        }

        match guarded(|| {
            score_word_count(
                Some(processed.student_answer.as_str()),
                processed.word_count_requirement.as_ref(),
            )
        }) {
            Ok(Some(assessment)) => tally.record(WORD_COUNT_LABEL, assessment),
            Ok(None) => {}
            Err(msg) => tally.record_fault(
                format!("Critical error in word count checking: {msg}"),
                input
                    .word_count_requirement
                    .is_some()
                    .then_some(WORD_COUNT_ADHERENCE),
            ),
        }

        let output = tally.finish();
        tracing::info!(
            total = output.total_score,
            review = output.needs_teacher_review,
            answer = %util::snippet(&processed.student_answer, 50),
            "Evaluation complete"
        );
        output
    }
}

/// Runs one criterion, turning a panic into its message.
fn guarded<T>(criterion: impl FnOnce() -> T) -> Result<T, String> {
    catch_unwind(AssertUnwindSafe(criterion)).map_err(|payload| panic_message(payload.as_ref()))
}

/// Running aggregate of criterion results.
#[derive(Default)]
struct Tally {
    /// Scores in presentation order.
    sub_scores: Vec<CriterionScore>,
    /// Labelled feedback lines.
    feedback:   Vec<String>,
    /// Conditions that force review.
    errors:     Vec<String>,
    /// Points awarded so far.
    achieved:   f64,
    /// Points available so far.
    possible:   f64,
}

impl Tally {
    /// Adds a criterion result.
    fn record(&mut self, label: &str, assessment: Assessment) {
        let Assessment { criterion, flagged } = assessment;

        self.achieved += criterion.score;
        self.possible += criterion.max_score;
        if let Some(feedback) = criterion.feedback.as_deref() {
            self.feedback.push(format!("{label}: {feedback}"));
            if flagged {
                tracing::warn!(criterion = %criterion.criterion_name, "Flagged for review: {feedback}");
                self.errors.push(feedback.to_string());
            }
        }
        self.sub_scores.push(criterion);
    }

    /// Records a criterion that faulted, with a placeholder score under
    /// `placeholder` if the criterion should still appear.
    fn record_fault(&mut self, message: String, placeholder: Option<&str>) {
        tracing::error!("{message}");
        if let Some(name) = placeholder {
            self.sub_scores
                .push(CriterionScore::new(name, 0.0, CRITERION_MAX_SCORE, message.clone()));
            self.possible += CRITERION_MAX_SCORE;
        }
        self.feedback.push(message.clone());
        self.errors.push(message);
    }

    /// Assembles the final output.
    fn finish(self) -> GradingOutput {
        tracing::debug!(achieved = self.achieved, possible = self.possible, "aggregated scores");

        let automated_feedback = if self.feedback.is_empty() {
            FALLBACK_FEEDBACK.to_string()
        } else {
            self.feedback.join("\n")
        };
        let needs_teacher_review = !self.errors.is_empty();

        GradingOutput {
            total_score: self.achieved,
            sub_scores: self.sub_scores,
            automated_feedback,
            needs_teacher_review,
            errors: needs_teacher_review.then_some(self.errors),
        }
    }
}
