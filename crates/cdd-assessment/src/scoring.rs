//! # Scoring
//!
//! `(totalScore, maxScore, riskLevel)` from the current answers and the
//! question catalog.
//!
//! - `total_score` is the sum of the stored `score` of every answer in the
//!   draft. Unanswered questions contribute nothing.
//! - `max_score` is the sum over questions of the best option score,
//!   floored at 0 per question. Questions without options contribute 0.
//! - `risk_level` classifies `total_score` with the standard thresholds.
//!
//! Nothing here can fail: missing data degrades to zero contributions.

use serde::Serialize;

use cdd_core::{Answer, Question, QuestionId, RiskLevel, RiskThresholds};

use crate::draft::Draft;

/// Result of scoring a draft against a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total_score: i64,
    pub max_score: i64,
    pub risk_level: RiskLevel,
    /// Scorable questions that have an answer.
    pub answered: usize,
    /// Questions with at least one option.
    pub scorable: usize,
}

impl ScoreSummary {
    /// `total / max * 100`, or 0 when nothing can be scored.
    pub fn progress_percent(&self) -> f64 {
        if self.max_score > 0 {
            self.total_score as f64 / self.max_score as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Per-question view used for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionScore<'a> {
    pub question: QuestionId,
    /// `None` when the question has not been answered.
    pub answer: Option<&'a Answer>,
    pub max_score: i64,
}

/// Score with the standard thresholds.
pub fn score(draft: &Draft, questions: &[Question]) -> ScoreSummary {
    score_with(draft, questions, RiskThresholds::default())
}

/// Score with explicit thresholds.
pub fn score_with(
    draft: &Draft,
    questions: &[Question],
    thresholds: RiskThresholds,
) -> ScoreSummary {
    let total_score = total_score(draft.answers());
    let scorable: Vec<&Question> = questions.iter().filter(|q| q.is_scorable()).collect();
    let answered = scorable
        .iter()
        .filter(|q| draft.answer(q.id).is_some())
        .count();

    ScoreSummary {
        total_score,
        max_score: max_score(questions),
        risk_level: thresholds.classify(total_score),
        answered,
        scorable: scorable.len(),
    }
}

/// Sum of the stored scores, saturating at the `i64` bounds.
pub fn total_score<'a>(answers: impl IntoIterator<Item = &'a Answer>) -> i64 {
    answers
        .into_iter()
        .map(|a| a.score)
        .fold(0, i64::saturating_add)
}

/// Best achievable score over the whole catalog, saturating.
pub fn max_score(questions: &[Question]) -> i64 {
    questions
        .iter()
        .map(Question::max_score)
        .fold(0, i64::saturating_add)
}

/// One entry per question, in catalog order.
///
/// A question with no options is always reported unanswered, even if a
/// stale answer for it is still present in the draft.
pub fn breakdown<'a>(draft: &'a Draft, questions: &[Question]) -> Vec<QuestionScore<'a>> {
    questions
        .iter()
        .map(|q| QuestionScore {
            question: q.id,
            answer: if q.is_scorable() { draft.answer(q.id) } else { None },
            max_score: q.max_score(),
        })
        .collect()
}
