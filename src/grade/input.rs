#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::text::normalize;

/// Acceptable word-count range for an answer, inclusive on both ends.
///
/// `max_words: None` means there is no upper limit. `min_words <= max_words`
/// is not enforced here; the word-count criterion reports invalid ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCountRange {
    /// Fewest words accepted.
    pub min_words: usize,
    /// Most words accepted, or `None` for no limit.
    pub max_words: Option<usize>,
}

impl WordCountRange {
    /// A range with both bounds.
    pub fn new(min_words: usize, max_words: usize) -> Self {
        Self {
            min_words,
            max_words: Some(max_words),
        }
    }

    /// A range with only a lower bound.
    pub fn at_least(min_words: usize) -> Self {
        Self {
            min_words,
            max_words: None,
        }
    }

    /// Whether the bounds are consistent.
    pub fn is_valid(&self) -> bool {
        self.max_words.is_none_or(|max| self.min_words <= max)
    }

    /// Whether `count` lies inside the range.
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min_words && self.max_words.is_none_or(|max| count <= max)
    }
}

impl Display for WordCountRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max_words {
            Some(max) => write!(f, "{}-{}", self.min_words, max),
            None => write!(f, "{}+", self.min_words),
        }
    }
}

/// A rubric criterion with custom weighting. Reserved: the grader always
/// uses its fixed three criteria and never reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    /// Criterion name.
    pub name:      String,
    /// Points available.
    pub max_score: f64,
    /// Relative weight.
    #[serde(default = "default_weight")]
    pub weight:    f64,
}

/// Weight of a criterion when none is given.
fn default_weight() -> f64 {
    1.0
}

/// One grading request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct GradingInput {
    /// The question the student answered.
    #[builder(setter(into))]
    pub question_text:          String,
    /// The student's answer.
    #[builder(setter(into))]
    pub student_answer:         String,
    /// Model answer to compare against, if the teacher supplied one.
    #[builder(default, setter(into, strip_option))]
    pub reference_answer:       Option<String>,
    /// Required word-count range, if any.
    #[builder(default, setter(strip_option))]
    pub word_count_requirement: Option<WordCountRange>,
    /// Reserved for custom rubrics; always `None`.
    #[builder(default, setter(skip))]
    #[serde(default)]
    pub evaluation_criteria:    Option<Vec<EvaluationCriterion>>,
    /// Reserved for caller metadata; always `None`.
    #[builder(default, setter(skip))]
    #[serde(default)]
    pub additional_metadata:    Option<serde_json::Value>,
}

impl GradingInput {
    /// Returns a copy with the question, answer, and reference answer
    /// normalized. Other fields are carried over as they are.
    pub fn normalized(&self) -> GradingInput {
        GradingInput {
            question_text:          normalize(Some(&self.question_text)).unwrap_or_default(),
            student_answer:         normalize(Some(&self.student_answer)).unwrap_or_default(),
            reference_answer:       normalize(self.reference_answer.as_deref()),
            word_count_requirement: self.word_count_requirement,
            evaluation_criteria:    self.evaluation_criteria.clone(),
            additional_metadata:    self.additional_metadata.clone(),
        }
    }
}
