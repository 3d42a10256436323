//! # Drafts
//!
//! A [`Draft`] is the set of answers a user has given so far for one
//! client's assessment. It never stores a total; the total is always the
//! sum of the answers it holds.
//!
//! ## Stored Form
//!
//! ```json
//! {
//!   "responses": { "12": { "answer": "Yes", "score": 30 } },
//!   "totalScore": 30
//! }
//! ```
//!
//! `totalScore` is written for readers that want it without summing. On
//! load it is ignored in favour of the recomputed sum.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cdd_core::{Answer, QuestionId};

/// Answers given so far, keyed by question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    responses: BTreeMap<QuestionId, Answer>,
}

impl Draft {
    /// An empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// The answer for `question`, or `None` if it has not been answered.
    pub fn answer(&self, question: QuestionId) -> Option<&Answer> {
        self.responses.get(&question)
    }

    /// Insert or replace the answer for `answer.question`.
    pub fn set(&mut self, answer: Answer) -> Option<Answer> {
        self.responses.insert(answer.question, answer)
    }

    /// Remove the answer for `question`.
    pub fn clear(&mut self, question: QuestionId) -> Option<Answer> {
        self.responses.remove(&question)
    }

    /// All answers, ordered by question id.
    pub fn answers(&self) -> impl Iterator<Item = &Answer> {
        self.responses.values()
    }

    /// Sum of the stored answer scores.
    pub fn total_score(&self) -> i64 {
        crate::scoring::total_score(self.answers())
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// The stored form of this draft.
    pub fn to_payload(&self) -> DraftPayload {
        DraftPayload {
            responses: self
                .responses
                .iter()
                .map(|(q, a)| {
                    (
                        *q,
                        StoredResponse {
                            answer: a.selected_text.clone(),
                            score: Some(a.score),
                        },
                    )
                })
                .collect(),
            total_score: self.total_score(),
        }
    }

    /// Rebuild a draft from its stored responses.
    pub fn from_responses(responses: BTreeMap<QuestionId, StoredResponse>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(q, r)| (q, Answer::new(q, r.answer, r.score.unwrap_or(0))))
                .collect(),
        }
    }
}

/// One stored answer. Missing fields default to an empty text and a zero
/// score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub score: Option<i64>,
}

/// The `{responses, totalScore}` document written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPayload {
    pub responses: BTreeMap<QuestionId, StoredResponse>,
    #[serde(default)]
    pub total_score: i64,
}

impl DraftPayload {
    /// Whether the cached total disagrees with the sum of the responses.
    pub fn is_total_stale(&self) -> bool {
        self.checked_total() != Some(self.total_score)
    }

    /// Sum of the stored scores, or `None` when it does not fit in an `i64`.
    pub fn checked_total(&self) -> Option<i64> {
        checked_sum(self.responses.values())
    }

    pub fn into_draft(self) -> Draft {
        Draft::from_responses(self.responses)
    }
}

/// Parse a client-scoped value: the current document, or the older bare
/// `responses` map written before totals were stored.
pub(crate) fn parse_client_payload(raw: &str) -> Option<DraftPayload> {
    if let Ok(payload) = serde_json::from_str::<DraftPayload>(raw) {
        return Some(payload);
    }
    serde_json::from_str::<BTreeMap<QuestionId, StoredResponse>>(raw)
        .ok()
        .and_then(|responses| {
            let total_score = checked_sum(responses.values())?;
            Some(DraftPayload {
                responses,
                total_score,
            })
        })
}

fn checked_sum<'a>(mut responses: impl Iterator<Item = &'a StoredResponse>) -> Option<i64> {
    responses.try_fold(0i64, |acc, r| acc.checked_add(r.score.unwrap_or(0)))
}
