//! Request and response bodies for the assessment and answer endpoints.
//!
//! Assessment and answer records use snake_case field names on the wire.
//! Response types default every optional field so that records written by
//! older backends still decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cdd_core::{Answer, AssessmentId, ClientId, QuestionId, RiskLevel};
use cdd_state::AssessmentStatus;

/// Assessment as returned by `/api/assessments/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub client: ClientId,
    #[serde(default)]
    pub status: AssessmentStatus,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub total_score: Option<i64>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// User id of the author.
    #[serde(default)]
    pub submitted_by: Option<u64>,
    #[serde(default)]
    pub submitted_by_name: Option<String>,
}

/// Body of `POST /api/assessments/` and `PATCH /api/assessments/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentPayload {
    pub client: ClientId,
    pub status: AssessmentStatus,
    pub risk_level: RiskLevel,
    pub total_score: i64,
}

/// Body of a status-only `PATCH /api/assessments/{id}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: AssessmentStatus,
}

/// One answer in an answers-replace request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerPayload {
    pub question: QuestionId,
    pub selected_text: String,
    pub score_value: i64,
}

impl From<&Answer> for AnswerPayload {
    fn from(answer: &Answer) -> Self {
        Self {
            question: answer.question,
            selected_text: answer.selected_text.clone(),
            score_value: answer.score,
        }
    }
}

/// Body of `POST /api/answers/replace/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaceAnswersRequest {
    pub assessment: AssessmentId,
    pub answers: Vec<AnswerPayload>,
}

/// Response of `POST /api/answers/replace/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReplaceAnswersResponse {
    #[serde(default)]
    pub replaced: usize,
}

/// Response of `POST /api/assessments/{id}/push-external/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResult {
    #[serde(rename = "assessmentId", alias = "assessment_id", default)]
    pub assessment: Option<AssessmentId>,
    /// The external system accepted the assessment.
    #[serde(rename = "externalPushed", alias = "external_pushed", default)]
    pub external_pushed: bool,
}

/// An answer stored server-side, from `/api/answers/?assessment={id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SavedAnswer {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub assessment: Option<AssessmentId>,
    pub question: QuestionId,
    #[serde(default)]
    pub selected_text: String,
    #[serde(default)]
    pub score_value: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SavedAnswer {
    /// The answer as recorded, with its stored score.
    pub fn to_answer(&self) -> Answer {
        Answer::new(self.question, self.selected_text.clone(), self.score_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_result_decodes_both_spellings() {
        let camel: PushResult =
            serde_json::from_value(serde_json::json!({"assessmentId": 4, "externalPushed": true}))
                .unwrap();
        assert_eq!(camel.assessment, Some(AssessmentId(4)));
        assert!(camel.external_pushed);
        let snake: PushResult =
            serde_json::from_value(serde_json::json!({"assessment_id": 4})).unwrap();
        assert!(!snake.external_pushed);
    }

    #[test]
    fn record_decodes_backend_shape() {
        let record: AssessmentRecord = serde_json::from_value(serde_json::json!({
            "id": 12,
            "client": 3,
            "status": "submitted",
            "risk_level": "high",
            "total_score": 75,
            "submitted_at": "2025-03-01T10:00:00Z",
            "submitted_by": 2,
            "submitted_by_name": "Ana Compliance"
        }))
        .unwrap();
        assert_eq!(record.id, AssessmentId(12));
        assert_eq!(record.status, AssessmentStatus::Submitted);
        assert_eq!(record.risk_level, Some(RiskLevel::High));
        assert_eq!(record.total_score, Some(75));
    }

    #[test]
    fn record_tolerates_null_risk_level() {
        let record: AssessmentRecord = serde_json::from_value(serde_json::json!({
            "id": 1, "client": 1, "status": "pending", "risk_level": null
        }))
        .unwrap();
        assert_eq!(record.risk_level, None);
        assert_eq!(record.total_score, None);
    }

    #[test]
    fn payload_wire_shape() {
        let payload = AssessmentPayload {
            client: ClientId(3),
            status: AssessmentStatus::Pending,
            risk_level: RiskLevel::Medium,
            total_score: 45,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"client": 3, "status": "pending", "risk_level": "medium", "total_score": 45})
        );
    }

    #[test]
    fn answer_payload_copies_stored_score() {
        let answer = Answer::new(QuestionId(7), "Broker", 15);
        let body = ReplaceAnswersRequest {
            assessment: AssessmentId(2),
            answers: vec![AnswerPayload::from(&answer)],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "assessment": 2,
                "answers": [{"question": 7, "selected_text": "Broker", "score_value": 15}]
            })
        );
    }

    #[test]
    fn saved_answer_converts_back() {
        let saved: SavedAnswer = serde_json::from_value(serde_json::json!({
            "id": 90, "assessment": 2, "question": 7, "selected_text": "Broker", "score_value": 15
        }))
        .unwrap();
        assert_eq!(saved.to_answer(), Answer::new(QuestionId(7), "Broker", 15));
    }
}
