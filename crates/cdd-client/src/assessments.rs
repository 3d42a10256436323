//! Assessments and their saved answers.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/api/assessments/` | List assessments |
//! | GET | `/api/assessments/{id}/` | Get one assessment |
//! | POST | `/api/assessments/` | Create |
//! | PATCH | `/api/assessments/{id}/` | Update fields or status |
//! | POST | `/api/assessments/{id}/push-external/` | Forward to the external system |
//! | GET | `/api/answers/?assessment={id}` | Saved answers |
//! | POST | `/api/answers/replace/` | Replace all answers of an assessment |

use cdd_core::AssessmentId;
use cdd_state::AssessmentStatus;

use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{
    AssessmentPayload, AssessmentRecord, PushResult, ReplaceAnswersRequest,
    ReplaceAnswersResponse, SavedAnswer, StatusUpdate,
};

/// Assessment and answer endpoints.
#[derive(Debug, Clone)]
pub struct AssessmentsApi {
    transport: Transport,
}

impl AssessmentsApi {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET /api/assessments/`.
    pub async fn list(&self) -> Result<Vec<AssessmentRecord>, ApiError> {
        self.transport
            .get("GET /api/assessments/", "/api/assessments/")
            .await
    }

    /// Calls `GET /api/assessments/{id}/`.
    pub async fn get(&self, id: AssessmentId) -> Result<AssessmentRecord, ApiError> {
        let endpoint = format!("GET /api/assessments/{id}/");
        self.transport
            .get(&endpoint, &format!("/api/assessments/{id}/"))
            .await
    }

    /// Calls `POST /api/assessments/`.
    pub async fn create(&self, payload: &AssessmentPayload) -> Result<AssessmentRecord, ApiError> {
        self.transport
            .post("POST /api/assessments/", "/api/assessments/", payload)
            .await
    }

    /// Calls `PATCH /api/assessments/{id}/` with the full payload.
    pub async fn update(
        &self,
        id: AssessmentId,
        payload: &AssessmentPayload,
    ) -> Result<AssessmentRecord, ApiError> {
        let endpoint = format!("PATCH /api/assessments/{id}/");
        self.transport
            .patch(&endpoint, &format!("/api/assessments/{id}/"), payload)
            .await
    }

    /// Calls `PATCH /api/assessments/{id}/` with `{status}` only. No
    /// lifecycle check is made here.
    pub async fn set_status(
        &self,
        id: AssessmentId,
        status: AssessmentStatus,
    ) -> Result<AssessmentRecord, ApiError> {
        let endpoint = format!("PATCH /api/assessments/{id}/");
        self.transport
            .patch(&endpoint, &format!("/api/assessments/{id}/"), &StatusUpdate { status })
            .await
    }

    /// Calls `POST /api/assessments/{id}/push-external/` with no body. No
    /// status check is made here.
    pub async fn push_external(&self, id: AssessmentId) -> Result<PushResult, ApiError> {
        let endpoint = format!("POST /api/assessments/{id}/push-external/");
        self.transport
            .post_empty(&endpoint, &format!("/api/assessments/{id}/push-external/"))
            .await
    }

    /// Calls `GET /api/answers/?assessment={id}`.
    pub async fn answers(&self, id: AssessmentId) -> Result<Vec<SavedAnswer>, ApiError> {
        let endpoint = format!("GET /api/answers/?assessment={id}");
        self.transport
            .get(&endpoint, &format!("/api/answers/?assessment={id}"))
            .await
    }

    /// Calls `POST /api/answers/replace/`. Returns the number of answers the
    /// backend stored.
    pub async fn replace_answers(&self, req: &ReplaceAnswersRequest) -> Result<usize, ApiError> {
        let resp: ReplaceAnswersResponse = self
            .transport
            .post("POST /api/answers/replace/", "/api/answers/replace/", req)
            .await?;
        Ok(resp.replaced)
    }
}
