#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::Deserialize;

use crate::grade::{GradingInput, WordCountRange};

/// Reasons a raw grading request is rejected before any grading happens.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The student answer is missing or blank.
    #[error("Student answer is required.")]
    MissingStudentAnswer,
    /// The question is missing or blank.
    #[error("Question text is required.")]
    MissingQuestion,
    /// A word count could not be parsed as an integer.
    #[error("Word counts must be valid integers.")]
    InvalidWordCount,
    /// The minimum word count is negative.
    #[error("Minimum words cannot be negative.")]
    NegativeMinimum,
    /// The maximum word count is negative.
    #[error("Maximum words cannot be negative.")]
    NegativeMaximum,
    /// A non-zero maximum is below the minimum.
    #[error(
        "Maximum words ({max}) must be greater than or equal to minimum words ({min})."
    )]
    MaximumBelowMinimum {
        /// Requested minimum.
        min: i64,
        /// Requested maximum.
        max: i64,
    },
}

/// A grading request as submitted by the web form or the CLI: every field is
/// optional free text until validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRequest {
    /// The question.
    #[serde(default)]
    pub question_text:    Option<String>,
    /// The student's answer.
    #[serde(default)]
    pub student_answer:   Option<String>,
    /// Optional reference answer; blank means none.
    #[serde(default)]
    pub reference_answer: Option<String>,
    /// Minimum word count; blank or missing means 0.
    #[serde(default)]
    pub min_words:        Option<String>,
    /// Maximum word count; blank, missing, or 0 means no maximum.
    #[serde(default)]
    pub max_words:        Option<String>,
}

impl RawRequest {
    /// Validates the request and builds the grading input.
    ///
    /// A word-count requirement is attached only when either bound is
    /// positive; a zero maximum means no upper limit.
    pub fn into_grading_input(self) -> Result<GradingInput, RequestError> {
        let student_answer = non_blank(self.student_answer).ok_or(RequestError::MissingStudentAnswer)?;
        let question_text = non_blank(self.question_text).ok_or(RequestError::MissingQuestion)?;

        let min_words = parse_count(self.min_words.as_deref())?;
        let max_words = parse_count(self.max_words.as_deref())?;

        if min_words < 0 {
            return Err(RequestError::NegativeMinimum);
        }
        if max_words < 0 {
            return Err(RequestError::NegativeMaximum);
        }
        if max_words != 0 && max_words < min_words {
            return Err(RequestError::MaximumBelowMinimum {
                min: min_words,
                max: max_words,
            });
        }

        let requirement = (min_words > 0 || max_words > 0).then(|| {
            let min_words = usize::try_from(min_words).unwrap_or_default();
            match usize::try_from(max_words) {
                Ok(0) | Err(_) => WordCountRange::at_least(min_words),
                Ok(max) => WordCountRange::new(min_words, max),
            }
        });

        Ok(GradingInput {
            question_text,
            student_answer,
            reference_answer: non_blank(self.reference_answer),
            word_count_requirement: requirement,
            evaluation_criteria: None,
            additional_metadata: None,
        })
    }
}

/// Drops missing or whitespace-only values. The kept value is not trimmed.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses a word count; blank or missing is 0.
fn parse_count(value: Option<&str>) -> Result<i64, RequestError> {
    match value.map(str::trim) {
        None | Some("") => Ok(0),
        Some(v) => v.parse::<i64>().map_err(|_| RequestError::InvalidWordCount),
    }
}
