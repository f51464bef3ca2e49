#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::Result;

use super::results::{Assessment, CriterionScore};
use crate::{
    constants::{CRITERION_MAX_SCORE, RELEVANCE},
    engines::Embedder,
};

/// Scores how close a student answer is to the reference answer in meaning.
pub struct RelevanceScorer<'a> {
    /// Embedding engine.
    embedder: &'a dyn Embedder,
}

impl<'a> RelevanceScorer<'a> {
    /// Creates a scorer backed by `embedder`.
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder }
    }

    /// Scores normalized `student_answer` against normalized
    /// `reference_answer`.
    ///
    /// A missing or empty reference is flagged for review. An empty student
    /// answer scores zero but is not flagged.
    pub fn score(&self, student_answer: &str, reference_answer: Option<&str>) -> Assessment {
        let Some(reference) = reference_answer.filter(|r| !r.is_empty()) else {
            return Assessment::flagged(relevance(
                0.0,
                "Reference answer not provided. Relevance could not be calculated.",
            ));
        };

        if student_answer.is_empty() {
            return Assessment::ok(relevance(
                0.0,
                "Student answer is empty. Relevance could not be calculated.",
            ));
        }

        match self.similarity(student_answer, reference) {
            Ok(similarity) => {
                let score = round2(f64::from(similarity) * CRITERION_MAX_SCORE);
                tracing::debug!(similarity, score, "relevance scored");
                Assessment::ok(relevance(
                    score,
                    format!("Relevance score based on semantic similarity ({similarity:.2})."),
                ))
            }
            Err(e) => {
                tracing::error!("Relevance scoring failed: {e:#}");
                Assessment::flagged(relevance(0.0, format!("Error calculating relevance: {e:#}")))
            }
        }
    }

    /// Embeds both texts and compares them.
    fn similarity(&self, student_answer: &str, reference: &str) -> Result<f32> {
        let student = self.embedder.embed(student_answer)?;
        let reference = self.embedder.embed(reference)?;
        self.embedder.similarity(&student, &reference)
    }
}

/// Rounds to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builds a relevance criterion score.
fn relevance(score: f64, feedback: impl Into<String>) -> CriterionScore {
    CriterionScore::new(RELEVANCE, score, CRITERION_MAX_SCORE, feedback)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::anyhow;

    use super::*;

    /// Returns vectors from a fixed script and counts calls.
    struct ScriptedEmbedder {
        vectors: Vec<Vec<f32>>,
        calls:   AtomicUsize,
    }

    impl ScriptedEmbedder {
        fn new(vectors: Vec<Vec<f32>>) -> Self {
            Self {
                vectors,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Embedder for ScriptedEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.vectors[idx % self.vectors.len()].clone())
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(anyhow!("Embedding failed"))
        }
    }

    #[test]
    fn identical_meaning_scores_full_marks() {
        let embedder = ScriptedEmbedder::new(vec![vec![1.0, 0.0], vec![1.0, 0.0]]);
        let result = RelevanceScorer::new(&embedder).score("plants make food", Some("plants make food"));

        assert!(!result.flagged);
        assert_eq!(result.criterion.criterion_name, "Relevance");
        assert_eq!(result.criterion.score, 5.0);
        assert_eq!(result.criterion.max_score, 5.0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn partial_similarity_is_scaled_and_rounded() {
        let embedder = ScriptedEmbedder::new(vec![vec![0.7, 0.3], vec![0.3, 0.7]]);
        let result = RelevanceScorer::new(&embedder).score("a", Some("b"));

        // cosine ~0.7241 -> 3.62
        assert_eq!(result.criterion.score, 3.62);
    }

    #[test]
    fn negative_similarity_is_not_clamped() {
        let embedder = ScriptedEmbedder::new(vec![vec![1.0, 0.0], vec![-1.0, 0.0]]);
        let result = RelevanceScorer::new(&embedder).score("yes", Some("no"));

        assert_eq!(result.criterion.score, -5.0);
        assert!(!result.flagged);
    }

    #[test]
    fn missing_reference_is_flagged_without_embedding() {
        let embedder = ScriptedEmbedder::new(vec![vec![1.0]]);
        let result = RelevanceScorer::new(&embedder).score("ans", None);

        assert_eq!(result.criterion.score, 0.0);
        assert!(result.flagged);
        assert!(result.criterion.feedback().contains("Reference answer not provided"));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn blank_reference_counts_as_missing() {
        let embedder = ScriptedEmbedder::new(vec![vec![1.0]]);
        let result = RelevanceScorer::new(&embedder).score("ans", Some(""));

        assert!(result.flagged);
        assert!(result.criterion.feedback().contains("Reference answer not provided"));
    }

    #[test]
    fn empty_student_answer_is_not_flagged() {
        let embedder = ScriptedEmbedder::new(vec![vec![1.0]]);
        let result = RelevanceScorer::new(&embedder).score("", Some("ref"));

        assert_eq!(result.criterion.score, 0.0);
        assert!(!result.flagged);
        assert!(result.criterion.feedback().contains("Student answer is empty"));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn engine_failure_is_flagged_with_reason() {
        let result = RelevanceScorer::new(&FailingEmbedder).score("ans", Some("ref"));

        assert_eq!(result.criterion.score, 0.0);
        assert!(result.flagged);
        assert_eq!(result.criterion.feedback(), "Error calculating relevance: Embedding failed");
    }

    #[test]
    fn mismatched_embedding_dimensions_are_flagged() {
        let embedder = ScriptedEmbedder::new(vec![vec![1.0, 0.0, 0.0], vec![1.0, 0.0]]);
        let result = RelevanceScorer::new(&embedder).score("ans", Some("ref"));

        assert_eq!(result.criterion.score, 0.0);
        assert!(result.flagged);
        assert_eq!(
            result.criterion.feedback(),
            "Error calculating relevance: Embedding dimensions differ (3 vs 2)"
        );
    }

    #[test]
    fn empty_embedding_is_flagged() {
        let embedder = ScriptedEmbedder::new(vec![Vec::new()]);
        let result = RelevanceScorer::new(&embedder).score("ans", Some("ref"));

        assert_eq!(result.criterion.score, 0.0);
        assert!(result.flagged);
        assert!(result.criterion.feedback().starts_with("Error calculating relevance:"));
    }

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(4.999), 5.0);
        assert_eq!(round2(-1.234), -1.23);
    }
}
