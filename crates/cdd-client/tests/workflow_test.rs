//! Save, submit and review workflow against a mocked backend.
//!
//! ## Endpoints Exercised
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/api/assessments/` | `draft_save_*`, `create_failure_*` |
//! | PATCH  | `/api/assessments/{id}/` | `second_save_*`, `approve_*`, `reject_*` |
//! | POST   | `/api/answers/replace/` | `draft_save_*`, `answers_failure_*` |
//! | GET    | `/api/assessments/`, `/api/clients/` | `approval_queue_*`, `listing_*` |
//! | GET    | `/api/assessments/{id}/` | `second_save_*`, `saving_over_*`, `approve_*`, `view_*` |
//! | GET    | `/api/answers/?assessment={id}` | `view_*` |
//! | POST   | `/api/assessments/{id}/push-external/` | `push_*` |

use cdd_assessment::{
    assessment_draft_key, assessment_map_key, client_draft_key, DraftCache, DraftSession,
    MemoryStore,
};
use cdd_client::{ApiConfig, ApiError, CddClient, SaveIntent, SessionContext};
use cdd_core::{AssessmentId, Catalog, CategoryId, ClientId, FieldType, Question, QuestionId, QuestionOption};
use cdd_state::AssessmentStatus;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLIENT: ClientId = ClientId(1);

fn test_client(server: &MockServer) -> CddClient {
    let config = ApiConfig::parse(&server.uri()).unwrap();
    CddClient::new(config, SessionContext::with_tokens("access", "refresh")).unwrap()
}

fn catalog() -> Catalog {
    let question = |id: u64, options: &[(&str, i64)]| Question {
        id: QuestionId(id),
        category: CategoryId(1),
        question_text: format!("Q{id}"),
        field_type: FieldType::Select,
        display_order: id as i64,
        options: options
            .iter()
            .map(|(text, score)| QuestionOption {
                id: None,
                option_text: text.to_string(),
                score_value: *score,
            })
            .collect(),
    };
    Catalog::new(
        vec![],
        vec![
            question(1, &[("No", 0), ("Yes", 30)]),
            question(2, &[("HeadOffice", 0), ("Broker", 10), ("Agent", 15)]),
        ],
    )
}

fn session_with_answers() -> DraftSession<MemoryStore> {
    let catalog = catalog();
    let mut session = DraftSession::open(DraftCache::new(MemoryStore::new()), CLIENT);
    session.select(&catalog, QuestionId(1), "Yes").unwrap();
    session.select(&catalog, QuestionId(2), "Broker").unwrap();
    session
}

fn assessment_json(id: u64, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "client": 1,
        "status": status,
        "risk_level": "medium",
        "total_score": 40,
        "submitted_at": "2025-03-01T10:00:00Z",
        "submitted_by": 2,
        "submitted_by_name": "Sam Analyst"
    })
}

// ── Save as draft ────────────────────────────────────────────────────

#[tokio::test]
async fn draft_save_creates_record_replaces_answers_and_binds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/assessments/"))
        .and(body_json(json!({
            "client": 1, "status": "pending", "risk_level": "medium", "total_score": 40
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(assessment_json(77, "pending")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/answers/replace/"))
        .and(body_json(json!({
            "assessment": 77,
            "answers": [
                {"question": 1, "selected_text": "Yes", "score_value": 30},
                {"question": 2, "selected_text": "Broker", "score_value": 10}
            ]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"replaced": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = session_with_answers();
    let outcome = client
        .save(&mut session, &catalog(), SaveIntent::Draft)
        .await
        .unwrap();

    assert_eq!(outcome.assessment, AssessmentId(77));
    assert_eq!(outcome.status, AssessmentStatus::Pending);
    assert!(outcome.created);
    assert!(outcome.answers_replaced);
    assert_eq!(outcome.summary.total_score, 40);
    assert_eq!(outcome.transition.from_state, AssessmentStatus::Pending);
    assert_eq!(outcome.transition.actor, None);

    assert_eq!(session.assessment(), Some(AssessmentId(77)));
    let store = session.cache().store();
    assert!(store.contains(&client_draft_key(CLIENT)));
    assert!(store.contains(&assessment_draft_key(AssessmentId(77))));
}

#[tokio::test]
async fn second_save_patches_the_mapped_assessment() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/assessments/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(assessment_json(77, "pending")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/77/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(77, "pending")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/assessments/77/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(77, "pending")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/answers/replace/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"replaced": 2})))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let catalog = catalog();
    let mut session = session_with_answers();
    client.save(&mut session, &catalog, SaveIntent::Draft).await.unwrap();
    session.select(&catalog, QuestionId(2), "Agent").unwrap();
    let outcome = client.save(&mut session, &catalog, SaveIntent::Draft).await.unwrap();

    assert!(!outcome.created);
    assert_eq!(outcome.summary.total_score, 45);
    assert_eq!(outcome.transition.from_state, AssessmentStatus::Pending);
    assert_eq!(outcome.transition.to_state, AssessmentStatus::Pending);
}

async fn refused_save_over(status: &str, intent: SaveIntent) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/31/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(31, status)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/assessments/31/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = session_with_answers();
    session.bind_assessment(AssessmentId(31));
    let err = client
        .save(&mut session, &catalog(), intent)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Lifecycle(_)));
    assert_eq!(err.user_message(), "This assessment can no longer be changed.");
    assert_eq!(session.draft().len(), 2);
    assert_eq!(session.assessment(), Some(AssessmentId(31)));
    let store = session.cache().store();
    assert!(store.contains(&client_draft_key(CLIENT)));
    assert!(store.contains(&assessment_draft_key(AssessmentId(31))));
}

#[tokio::test]
async fn saving_over_a_submitted_record_is_refused() {
    refused_save_over("submitted", SaveIntent::Draft).await;
}

#[tokio::test]
async fn saving_over_an_approved_record_is_refused() {
    refused_save_over("approved", SaveIntent::Draft).await;
}

#[tokio::test]
async fn resubmitting_a_rejected_record_is_refused() {
    refused_save_over("rejected", SaveIntent::Submit).await;
}

#[tokio::test]
async fn empty_draft_skips_answer_replacement() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/assessments/"))
        .and(body_json(json!({
            "client": 1, "status": "pending", "risk_level": "low", "total_score": 0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(assessment_json(5, "pending")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/answers/replace/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = DraftSession::open(DraftCache::new(MemoryStore::new()), CLIENT);
    let outcome = client
        .save(&mut session, &catalog(), SaveIntent::Draft)
        .await
        .unwrap();
    assert!(!outcome.answers_replaced);
    assert_eq!(session.assessment(), Some(AssessmentId(5)));
}

// ── Failures ─────────────────────────────────────────────────────────

#[tokio::test]
async fn answers_failure_is_reported_not_raised() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/assessments/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(assessment_json(8, "pending")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/answers/replace/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = session_with_answers();
    let outcome = client
        .save(&mut session, &catalog(), SaveIntent::Draft)
        .await
        .unwrap();
    assert!(!outcome.answers_replaced);
    assert_eq!(session.assessment(), Some(AssessmentId(8)));
}

#[tokio::test]
async fn create_failure_leaves_local_draft_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/assessments/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"client": ["required"]})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/answers/replace/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = session_with_answers();
    let err = client
        .save(&mut session, &catalog(), SaveIntent::Submit)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "Invalid assessment data.");
    assert_eq!(session.draft().len(), 2);
    assert_eq!(session.assessment(), None);
    assert!(session.cache().store().contains(&client_draft_key(CLIENT)));
}

#[tokio::test]
async fn unreachable_backend_maps_to_generic_message() {
    let config = ApiConfig::parse("http://127.0.0.1:1").unwrap();
    let client = CddClient::new(config, SessionContext::anonymous()).unwrap();
    let mut session = session_with_answers();
    let err = client
        .save(&mut session, &catalog(), SaveIntent::Draft)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Http { .. }));
    assert_eq!(err.user_message(), "Server unavailable or network error.");
}

// ── Submit ───────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_discards_every_cache_entry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/assessments/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(assessment_json(9, "pending")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/9/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(9, "pending")))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/assessments/9/"))
        .and(body_json(json!({
            "client": 1, "status": "submitted", "risk_level": "medium", "total_score": 40
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(9, "submitted")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/answers/replace/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"replaced": 2})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let catalog = catalog();
    let mut session = session_with_answers();
    client.save(&mut session, &catalog, SaveIntent::Draft).await.unwrap();
    let outcome = client
        .save(&mut session, &catalog, SaveIntent::Submit)
        .await
        .unwrap();

    assert_eq!(outcome.status, AssessmentStatus::Submitted);
    assert_eq!(outcome.transition.to_state, AssessmentStatus::Submitted);
    assert!(session.draft().is_empty());
    let store = session.cache().store();
    assert!(!store.contains(&client_draft_key(CLIENT)));
    assert!(!store.contains(&assessment_map_key(CLIENT)));
    assert!(!store.contains(&assessment_draft_key(AssessmentId(9))));
    assert!(store.is_empty());
}

// ── Approval queue ───────────────────────────────────────────────────

#[tokio::test]
async fn approval_queue_lists_submitted_with_client_names() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            assessment_json(1, "pending"),
            assessment_json(2, "submitted"),
            {"id": 3, "client": 99, "status": "submitted", "risk_level": null, "total_score": 0},
            assessment_json(4, "approved")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/clients/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "fullName": "", "corporateName": "Acme Ltd", "clientType": "corporate"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let queue = client.pending_approvals().await.unwrap();

    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0].assessment, AssessmentId(2));
    assert_eq!(queue[0].client_name, "Acme Ltd");
    assert_eq!(queue[0].submitted_by, "Sam Analyst");
    assert_eq!(queue[1].client_name, "Client #99");
    assert_eq!(queue[1].submitted_by, "N/A");
    assert_eq!(queue[1].risk_level, None);
}

#[tokio::test]
async fn listing_groups_by_status_with_cached_draft_totals() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            assessment_json(1, "pending"),
            assessment_json(2, "submitted"),
            assessment_json(3, "approved"),
            assessment_json(4, "rejected"),
            {"id": 5, "client": 2, "status": "pending", "risk_level": null, "total_score": 0}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/clients/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "fullName": "Jane Doe"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    // Client 1 has a draft bound to assessment 1; client 2 has none.
    let mut session = session_with_answers();
    session.bind_assessment(AssessmentId(1));
    let drafts = session.cache();

    let tabs = test_client(&server).assessments_by_status(drafts).await.unwrap();

    assert_eq!(tabs.drafts.len(), 2);
    assert_eq!(tabs.drafts[0].assessment, AssessmentId(1));
    assert_eq!(tabs.drafts[0].client_name, "Jane Doe");
    assert_eq!(tabs.drafts[0].total_score, Some(40));
    assert_eq!(tabs.drafts[1].client_name, "Client #2");
    assert_eq!(tabs.drafts[1].total_score, None);
    assert_eq!(tabs.submitted[0].assessment, AssessmentId(2));
    assert_eq!(tabs.approved[0].total_score, Some(40));
    assert_eq!(tabs.rejected[0].status, AssessmentStatus::Rejected);
}

// ── Decisions ────────────────────────────────────────────────────────

#[tokio::test]
async fn approve_submitted_assessment_patches_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(12, "submitted")))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/assessments/12/"))
        .and(body_json(json!({"status": "approved"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(12, "approved")))
        .expect(1)
        .mount(&server)
        .await;

    let record = test_client(&server).approve(AssessmentId(12)).await.unwrap();
    assert_eq!(record.status, AssessmentStatus::Approved);
}

#[tokio::test]
async fn reject_submitted_assessment_patches_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(12, "submitted")))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/assessments/12/"))
        .and(body_json(json!({"status": "rejected"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(12, "rejected")))
        .expect(1)
        .mount(&server)
        .await;

    let record = test_client(&server).reject(AssessmentId(12)).await.unwrap();
    assert_eq!(record.status, AssessmentStatus::Rejected);
}

#[tokio::test]
async fn approve_decided_assessment_is_refused_locally() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(12, "rejected")))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/assessments/12/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .approve(AssessmentId(12))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Lifecycle(_)));
}

#[tokio::test]
async fn approve_pending_assessment_is_refused_locally() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(3, "pending")))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/assessments/3/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server).approve(AssessmentId(3)).await.unwrap_err();
    assert!(matches!(err, ApiError::Lifecycle(_)));
}

#[tokio::test]
async fn approve_missing_assessment_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/404/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .approve(AssessmentId(404))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Not found.");
}

// ── Push ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn push_approved_assessment_reports_external_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(12, "approved")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/assessments/12/push-external/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"assessmentId": 12, "externalPushed": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server).push(AssessmentId(12)).await.unwrap();
    assert_eq!(result.assessment, Some(AssessmentId(12)));
    assert!(result.external_pushed);

    let requests = server.received_requests().await.unwrap();
    let push = requests.iter().find(|r| r.method.as_str() == "POST").unwrap();
    assert!(push.body.is_empty());
}

#[tokio::test]
async fn push_undecided_assessment_is_refused_locally() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(12, "submitted")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/assessments/12/push-external/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server).push(AssessmentId(12)).await.unwrap_err();
    assert!(matches!(err, ApiError::Lifecycle(_)));
    assert_eq!(
        err.user_message(),
        "Only approved or rejected assessments can be pushed."
    );
}

#[tokio::test]
async fn push_failure_surfaces_server_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(12, "rejected")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/assessments/12/push-external/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server).push(AssessmentId(12)).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.user_message(), "Server unavailable or network error.");
}

// ── View ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn view_joins_client_and_saved_answers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(12, "submitted")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/clients/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "fullName": "Jane Doe"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/answers/"))
        .and(query_param("assessment", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "assessment": 12, "question": 1, "selected_text": "Yes", "score_value": 30},
            {"id": 2, "assessment": 12, "question": 2, "selected_text": "Broker", "score_value": 10}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let view = test_client(&server).view(AssessmentId(12)).await.unwrap();
    assert_eq!(view.client_name(), "Jane Doe");
    assert_eq!(view.answers.len(), 2);
    assert_eq!(view.answers[0].to_answer().score, 30);
}

#[tokio::test]
async fn view_survives_missing_client_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/assessments/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_json(12, "submitted")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/clients/1/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/answers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let view = test_client(&server).view(AssessmentId(12)).await.unwrap();
    assert!(view.client.is_none());
    assert_eq!(view.client_name(), "Client #1");
}
