#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

/// Score awarded for one rubric criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    /// Name of the criterion, e.g. `Relevance`.
    pub criterion_name: String,
    /// Points awarded. Not clamped to `max_score`.
    pub score:          f64,
    /// Points available.
    pub max_score:      f64,
    /// Explanation of the score.
    pub feedback:       Option<String>,
}

impl CriterionScore {
    /// Creates a criterion score with feedback.
    pub fn new(
        criterion_name: impl Into<String>,
        score: f64,
        max_score: f64,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            criterion_name: criterion_name.into(),
            score,
            max_score,
            feedback: Some(feedback.into()),
        }
    }

    /// Returns the feedback text, or an empty string.
    pub fn feedback(&self) -> &str {
        self.feedback.as_deref().unwrap_or_default()
    }
}

/// A criterion score together with whether it must be surfaced to a teacher.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    /// The score itself.
    pub criterion: CriterionScore,
    /// Whether the condition behind the score is an evaluator-level error.
    pub flagged:   bool,
}

impl Assessment {
    /// A score that needs no review.
    pub fn ok(criterion: CriterionScore) -> Self {
        Self {
            criterion,
            flagged: false,
        }
    }

    /// A score whose feedback must be copied into the output's errors.
    pub fn flagged(criterion: CriterionScore) -> Self {
        Self {
            criterion,
            flagged: true,
        }
    }
}

/// The graded result of one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingOutput {
    /// Sum of all criterion scores.
    pub total_score:          f64,
    /// Per-criterion scores: relevance, grammar, then word count when a
    /// requirement was given.
    pub sub_scores:           Vec<CriterionScore>,
    /// One labelled line per criterion, newline-separated.
    pub automated_feedback:   String,
    /// Set whenever `errors` is non-empty.
    pub needs_teacher_review: bool,
    /// Conditions a teacher should look at; `None` when there are none.
    pub errors:               Option<Vec<String>>,
}

impl GradingOutput {
    /// Points available across the criteria that were scored.
    pub fn max_score(&self) -> f64 {
        self.sub_scores.iter().map(|s| s.max_score).sum()
    }

    /// `total_score` as a percentage of [`GradingOutput::max_score`], or
    /// `None` if nothing was scored.
    pub fn percentage(&self) -> Option<f64> {
        let max = self.max_score();
        (max > 0.0).then(|| self.total_score / max * 100.0)
    }

    /// Renders the score breakdown as a terminal table.
    pub fn to_table(&self) -> String {
        let rows: Vec<CriterionRow> = self.sub_scores.iter().map(CriterionRow::from).collect();
        let mut footer = format!("Total: {:.2}/{:.2}", self.total_score, self.max_score());
        if self.needs_teacher_review {
            footer.push_str(" (needs teacher review)");
        }

        Table::new(&rows)
            .with(Panel::header("Grading Overview"))
            .with(Panel::footer(footer))
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(48).keep_words(true)))
            .with(
                Modify::new(Rows::first())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(
                Modify::new(Rows::last())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(Style::modern())
            .to_string()
    }
}

/// Table row for one criterion.
#[derive(Tabled)]
struct CriterionRow {
    /// Criterion name.
    #[tabled(rename = "Criterion")]
    criterion: String,
    /// `score/max`.
    #[tabled(rename = "Score")]
    score:     String,
    /// Feedback text.
    #[tabled(rename = "Feedback")]
    feedback:  String,
}

impl From<&CriterionScore> for CriterionRow {
    fn from(score: &CriterionScore) -> Self {
        Self {
            criterion: score.criterion_name.clone(),
            score:     format!("{:.2}/{:.2}", score.score, score.max_score),
            feedback:  score.feedback().to_string(),
        }
    }
}
