//! # Answers
//!
//! An [`Answer`] records which option the user picked for a question and
//! the score that option was worth at the moment it was picked.

use serde::{Deserialize, Serialize};

use crate::identity::QuestionId;

/// A selected option for one question.
///
/// `score` is a snapshot. It is never recomputed from the live catalog, so a
/// later change to an option's `score_value` does not alter answers that
/// were already given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: QuestionId,
    pub selected_text: String,
    pub score: i64,
}

impl Answer {
    pub fn new(question: QuestionId, selected_text: impl Into<String>, score: i64) -> Self {
        Self {
            question,
            selected_text: selected_text.into(),
            score,
        }
    }
}
