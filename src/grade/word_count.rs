#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use super::{
    input::WordCountRange,
    results::{Assessment, CriterionScore},
};
use crate::{
    constants::{CRITERION_MAX_SCORE, WORD_COUNT_ADHERENCE, WORD_COUNT_PENALTY_SCORE},
    text::count_words,
};

/// Scores `student_answer` against an optional word-count requirement.
///
/// Returns `None` when there is no requirement, so the criterion takes no
/// part in the total. An inconsistent range scores zero and is flagged.
pub fn score_word_count(
    student_answer: Option<&str>,
    requirement: Option<&WordCountRange>,
) -> Option<Assessment> {
    let range = requirement?;

    if !range.is_valid() {
        return Some(Assessment::flagged(word_count(
            0.0,
            format!(
                "Invalid word count requirement provided (minimum {} exceeds maximum {}).",
                range.min_words,
                range.max_words.map_or_else(|| "unbounded".to_string(), |m| m.to_string())
            ),
        )));
    }

    let count = count_words(student_answer);
    let (score, mut feedback) = if range.contains(count) {
        (
            CRITERION_MAX_SCORE,
            format!("Word count ({count}) is within the required range ({range} words)."),
        )
    } else if count < range.min_words {
        (
            WORD_COUNT_PENALTY_SCORE,
            format!(
                "Word count ({count}) is below minimum: at least {} words required.",
                range.min_words
            ),
        )
    } else {
        (
            WORD_COUNT_PENALTY_SCORE,
            format!(
                "Word count ({count}) exceeds maximum: at most {} words allowed.",
                range.max_words.unwrap_or(count)
            ),
        )
    };

    if count == 0 && range.min_words > 0 {
        feedback.push_str(" The answer is empty.");
    }

    tracing::debug!(count, %range, score, "word count scored");
    Some(Assessment::ok(word_count(score, feedback)))
}

/// Builds a word-count criterion score.
fn word_count(score: f64, feedback: impl Into<String>) -> CriterionScore {
    CriterionScore::new(WORD_COUNT_ADHERENCE, score, CRITERION_MAX_SCORE, feedback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn no_requirement_means_no_criterion() {
        assert_eq!(score_word_count(Some("anything at all"), None), None);
    }

    #[test]
    fn within_range_scores_full_marks() {
        let range = WordCountRange::new(5, 10);
        let result = score_word_count(Some(&words(7)), Some(&range)).expect("scored");

        assert_eq!(result.criterion.criterion_name, "Word Count Adherence");
        assert_eq!(result.criterion.score, 5.0);
        assert_eq!(
            result.criterion.feedback(),
            "Word count (7) is within the required range (5-10 words)."
        );
        assert!(!result.flagged);
    }

    #[test]
    fn bounds_are_inclusive() {
        let range = WordCountRange::new(5, 10);
        for n in [5, 10] {
            let result = score_word_count(Some(&words(n)), Some(&range)).expect("scored");
            assert_eq!(result.criterion.score, 5.0, "count {n}");
        }
    }

    #[test]
    fn short_answer_is_penalised() {
        let range = WordCountRange::new(5, 10);
        let result = score_word_count(Some(&words(2)), Some(&range)).expect("scored");

        assert_eq!(result.criterion.score, 2.5);
        assert!(result.criterion.feedback().contains("below minimum"));
        assert!(!result.criterion.feedback().contains("empty"));
        assert!(!result.flagged);
    }

    #[test]
    fn long_answer_is_penalised() {
        let range = WordCountRange::new(5, 10);
        let result = score_word_count(Some(&words(11)), Some(&range)).expect("scored");

        assert_eq!(result.criterion.score, 2.5);
        assert!(result.criterion.feedback().contains("exceeds maximum"));
        assert!(result.criterion.feedback().contains("at most 10 words"));
        assert!(!result.flagged);
    }

    #[test]
    fn unbounded_maximum_never_exceeded() {
        let range = WordCountRange::at_least(3);
        let result = score_word_count(Some(&words(5_000)), Some(&range)).expect("scored");

        assert_eq!(result.criterion.score, 5.0);
        assert!(result.criterion.feedback().contains("(3+ words)"));
    }

    #[test]
    fn inverted_range_is_flagged() {
        let range = WordCountRange::new(10, 5);
        let result = score_word_count(Some(&words(7)), Some(&range)).expect("scored");

        assert_eq!(result.criterion.score, 0.0);
        assert!(result.criterion.feedback().starts_with("Invalid word count requirement"));
        assert!(result.flagged);
    }

    #[test]
    fn empty_answer_notes_emptiness() {
        let range = WordCountRange::new(5, 10);
        for answer in [None, Some(""), Some("   ")] {
            let result = score_word_count(answer, Some(&range)).expect("scored");
            assert_eq!(result.criterion.score, 2.5);
            assert!(result.criterion.feedback().ends_with(" The answer is empty."));
        }
    }

    #[test]
    fn empty_answer_with_zero_minimum_is_compliant() {
        let range = WordCountRange::new(0, 10);
        let result = score_word_count(Some(""), Some(&range)).expect("scored");

        assert_eq!(result.criterion.score, 5.0);
        assert!(!result.criterion.feedback().contains("empty"));
    }
}
