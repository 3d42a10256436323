//! # Assessment Workflow
//!
//! Reconciles a local [`DraftSession`] with the backend and drives the
//! review decisions.
//!
//! ## Save
//!
//! 1. Score the draft against the catalog.
//! 2. Check the change against [`AssessmentLifecycle`]. A mapped record is
//!    read first so its current status is the starting point; a new record
//!    starts as `pending`. A mapped record that was already submitted or
//!    decided is refused here and no update is sent.
//! 3. `PATCH` the mapped assessment, or `POST` a new one when the client has
//!    no mapping yet. The status is `pending` for a draft save and
//!    `submitted` for a submission.
//! 4. Replace the server-side answers with the draft's answers. This runs
//!    only after step 3 succeeded and only when there are answers. A failure
//!    here is logged and reported in [`SaveOutcome::answers_replaced`].
//! 5. Draft save: bind the returned id to the client in the cache.
//!    Submission: delete every cache entry for the client.
//!
//! If step 2 or 3 fails nothing local changes, so the user can retry.
//!
//! ## Listing
//!
//! [`CddClient::assessments_by_status`] groups every assessment into the
//! four status tabs. Pending rows show the total of the locally cached
//! draft, read with [`DraftCache::cached_total`], since the server copy
//! only changes on save.
//!
//! ## Decisions
//!
//! Approve and reject read the current status first and check it against
//! [`AssessmentLifecycle`] before sending the `PATCH`.
//!
//! ## Push
//!
//! A decided assessment can be forwarded to the external system. The
//! status is read first and anything not approved or rejected is refused
//! locally.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use cdd_assessment::{DraftCache, DraftSession, KeyValueStore, ScoreSummary};
use cdd_core::{AssessmentId, Catalog, ClientId, ClientRecord, RiskLevel};
use cdd_state::{ensure_decided, AssessmentLifecycle, AssessmentStatus, LifecycleTransitionRecord};

use crate::error::ApiError;
use crate::types::{
    AnswerPayload, AssessmentPayload, AssessmentRecord, PushResult, ReplaceAnswersRequest,
    SavedAnswer,
};
use crate::CddClient;

/// Placeholder shown when an author name is unknown.
pub const UNKNOWN_AUTHOR: &str = "N/A";

/// What a save is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveIntent {
    /// Keep editing later; the record stays `pending`.
    Draft,
    /// Hand over for review; the record becomes `submitted`.
    Submit,
}

impl SaveIntent {
    /// Status sent to the backend.
    pub fn status(self) -> AssessmentStatus {
        match self {
            Self::Draft => AssessmentStatus::Pending,
            Self::Submit => AssessmentStatus::Submitted,
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub assessment: AssessmentId,
    /// Status reported back by the backend.
    pub status: AssessmentStatus,
    /// A new record was created rather than an existing one updated.
    pub created: bool,
    /// The score that was sent.
    pub summary: ScoreSummary,
    /// The answers-replace call ran and succeeded.
    pub answers_replaced: bool,
    /// The status change that was checked before sending.
    pub transition: LifecycleTransitionRecord,
}

/// A reviewer's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(self) -> AssessmentStatus {
        match self {
            Self::Approve => AssessmentStatus::Approved,
            Self::Reject => AssessmentStatus::Rejected,
        }
    }
}

/// One assessment with its client name, as listed in the status tabs and
/// the approval queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentRow {
    pub assessment: AssessmentId,
    pub client: ClientId,
    pub client_name: String,
    pub status: AssessmentStatus,
    pub submitted_by: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub risk_level: Option<RiskLevel>,
    /// For pending rows, the cached draft total; `None` without a cache.
    pub total_score: Option<i64>,
}

/// One row of the approval queue.
pub type ApprovalItem = AssessmentRow;

/// Every assessment, grouped by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssessmentTabs {
    pub drafts: Vec<AssessmentRow>,
    pub submitted: Vec<AssessmentRow>,
    pub approved: Vec<AssessmentRow>,
    pub rejected: Vec<AssessmentRow>,
}

impl AssessmentTabs {
    /// Rows with `status`.
    pub fn tab(&self, status: AssessmentStatus) -> &[AssessmentRow] {
        match status {
            AssessmentStatus::Pending => &self.drafts,
            AssessmentStatus::Submitted => &self.submitted,
            AssessmentStatus::Approved => &self.approved,
            AssessmentStatus::Rejected => &self.rejected,
        }
    }

    fn tab_mut(&mut self, status: AssessmentStatus) -> &mut Vec<AssessmentRow> {
        match status {
            AssessmentStatus::Pending => &mut self.drafts,
            AssessmentStatus::Submitted => &mut self.submitted,
            AssessmentStatus::Approved => &mut self.approved,
            AssessmentStatus::Rejected => &mut self.rejected,
        }
    }
}

/// An assessment with its client and saved answers, for read-only display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentView {
    pub record: AssessmentRecord,
    /// `None` when the client record could not be loaded.
    pub client: Option<ClientRecord>,
    pub answers: Vec<SavedAnswer>,
}

impl AssessmentView {
    pub fn client_name(&self) -> String {
        match &self.client {
            Some(c) => c.display_name().to_string(),
            None => fallback_client_name(self.record.client),
        }
    }
}

impl CddClient {
    /// Save or submit the draft held by `session`.
    ///
    /// # Errors
    ///
    /// Fails if reading the mapped record fails, if the mapped record is no
    /// longer `pending` ([`ApiError::Lifecycle`]), or if creating or updating
    /// the record fails. The local draft is untouched in each case.
    pub async fn save<S: KeyValueStore>(
        &self,
        session: &mut DraftSession<S>,
        catalog: &Catalog,
        intent: SaveIntent,
    ) -> Result<SaveOutcome, ApiError> {
        let summary = session.summary(catalog);
        let payload = AssessmentPayload {
            client: session.client(),
            status: intent.status(),
            risk_level: summary.risk_level,
            total_score: summary.total_score,
        };

        let mapped = session.assessment();
        let mut lifecycle = match mapped {
            Some(id) => AssessmentLifecycle::from_status(self.assessments().get(id).await?.status),
            None => AssessmentLifecycle::new(),
        };
        let actor = self.session().await.claims().and_then(|c| c.email);
        let transition = match intent {
            SaveIntent::Draft => lifecycle.save_draft(actor.as_deref())?,
            SaveIntent::Submit => lifecycle.submit(actor.as_deref())?,
        };

        let record = match mapped {
            Some(id) => self.assessments().update(id, &payload).await?,
            None => self.assessments().create(&payload).await?,
        };

        let answers: Vec<AnswerPayload> = session
            .draft()
            .answers()
            .map(AnswerPayload::from)
            .collect();
        let answers_replaced = if answers.is_empty() {
            false
        } else {
            let req = ReplaceAnswersRequest {
                assessment: record.id,
                answers,
            };
            match self.assessments().replace_answers(&req).await {
                Ok(replaced) => {
                    tracing::debug!(assessment = %record.id, replaced, "answers replaced");
                    true
                }
                Err(e) => {
                    tracing::warn!(assessment = %record.id, "saving answers failed, continuing: {e}");
                    false
                }
            }
        };

        match intent {
            SaveIntent::Draft => session.bind_assessment(record.id),
            SaveIntent::Submit => session.reset(),
        }

        tracing::info!(
            client = %payload.client,
            assessment = %record.id,
            from = %transition.from_state,
            to = %transition.to_state,
            status = %record.status,
            total_score = summary.total_score,
            risk_level = %summary.risk_level,
            actor = transition.actor.as_deref().unwrap_or("unknown"),
            "assessment saved"
        );

        Ok(SaveOutcome {
            assessment: record.id,
            status: record.status,
            created: mapped.is_none(),
            summary,
            answers_replaced,
            transition,
        })
    }

    /// Submitted assessments awaiting a decision, with client names.
    pub async fn pending_approvals(&self) -> Result<Vec<ApprovalItem>, ApiError> {
        let (assessments, clients) =
            tokio::try_join!(self.assessments().list(), self.clients().list())?;
        Ok(approval_queue(&assessments, &clients))
    }

    /// Every assessment grouped by status, with draft totals taken from
    /// `drafts`.
    pub async fn assessments_by_status<S: KeyValueStore>(
        &self,
        drafts: &DraftCache<S>,
    ) -> Result<AssessmentTabs, ApiError> {
        let (assessments, clients) =
            tokio::try_join!(self.assessments().list(), self.clients().list())?;
        let tabs = group_by_status(&assessments, &clients, drafts);
        tracing::debug!(
            drafts = tabs.drafts.len(),
            submitted = tabs.submitted.len(),
            approved = tabs.approved.len(),
            rejected = tabs.rejected.len(),
            "assessments listed"
        );
        Ok(tabs)
    }

    /// Approve or reject a submitted assessment.
    ///
    /// # Errors
    ///
    /// [`ApiError::Lifecycle`] when the assessment is not `submitted`; no
    /// update is sent in that case.
    pub async fn decide(
        &self,
        id: AssessmentId,
        decision: Decision,
    ) -> Result<AssessmentRecord, ApiError> {
        let current = self.assessments().get(id).await?;
        let actor = self.session().await.claims().and_then(|c| c.email);
        let mut lifecycle = AssessmentLifecycle::from_status(current.status);
        let transition = match decision {
            Decision::Approve => lifecycle.approve(actor.as_deref())?,
            Decision::Reject => lifecycle.reject(actor.as_deref())?,
        };

        let updated = self.assessments().set_status(id, decision.status()).await?;
        tracing::info!(
            assessment = %id,
            from = %transition.from_state,
            to = %transition.to_state,
            status = %updated.status,
            at = %transition.timestamp,
            actor = transition.actor.as_deref().unwrap_or("unknown"),
            "assessment decided"
        );
        Ok(updated)
    }

    pub async fn approve(&self, id: AssessmentId) -> Result<AssessmentRecord, ApiError> {
        self.decide(id, Decision::Approve).await
    }

    pub async fn reject(&self, id: AssessmentId) -> Result<AssessmentRecord, ApiError> {
        self.decide(id, Decision::Reject).await
    }

    /// Forward an approved or rejected assessment to the external system.
    ///
    /// # Errors
    ///
    /// [`ApiError::Lifecycle`] when the assessment is not decided; nothing
    /// is pushed in that case.
    pub async fn push(&self, id: AssessmentId) -> Result<PushResult, ApiError> {
        let current = self.assessments().get(id).await?;
        ensure_decided(current.status)?;
        let result = self.assessments().push_external(id).await?;
        tracing::info!(
            assessment = %id,
            status = %current.status,
            external_pushed = result.external_pushed,
            "assessment pushed"
        );
        Ok(result)
    }

    /// Load an assessment with its client and saved answers. A missing
    /// client record degrades to a placeholder name.
    pub async fn view(&self, id: AssessmentId) -> Result<AssessmentView, ApiError> {
        let record = self.assessments().get(id).await?;
        let (client, answers) = tokio::join!(
            self.clients().get(record.client),
            self.assessments().answers(id)
        );
        let client = match client {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(client = %record.client, "client record unavailable: {e}");
                None
            }
        };
        Ok(AssessmentView {
            record,
            client,
            answers: answers?,
        })
    }
}

/// Filter `assessments` to the submitted ones and attach client names.
pub fn approval_queue(
    assessments: &[AssessmentRecord],
    clients: &[ClientRecord],
) -> Vec<ApprovalItem> {
    let names = client_names(clients);
    assessments
        .iter()
        .filter(|a| a.status == AssessmentStatus::Submitted)
        .map(|a| row(a, &names))
        .collect()
}

/// Split `assessments` into status tabs, keeping their order. Pending rows
/// carry the cached draft total instead of the server's.
pub fn group_by_status<S: KeyValueStore>(
    assessments: &[AssessmentRecord],
    clients: &[ClientRecord],
    drafts: &DraftCache<S>,
) -> AssessmentTabs {
    let names = client_names(clients);
    let mut tabs = AssessmentTabs::default();
    for a in assessments {
        let mut r = row(a, &names);
        if a.status == AssessmentStatus::Pending {
            r.total_score = drafts.cached_total(a.client, a.id);
        }
        tabs.tab_mut(a.status).push(r);
    }
    tabs
}

fn client_names(clients: &[ClientRecord]) -> HashMap<ClientId, &str> {
    clients
        .iter()
        .map(|c| (c.id, c.display_name()))
        .collect()
}

fn row(a: &AssessmentRecord, names: &HashMap<ClientId, &str>) -> AssessmentRow {
    AssessmentRow {
        assessment: a.id,
        client: a.client,
        client_name: names
            .get(&a.client)
            .map(|n| n.to_string())
            .unwrap_or_else(|| fallback_client_name(a.client)),
        status: a.status,
        submitted_by: a
            .submitted_by_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        submitted_at: a.submitted_at,
        risk_level: a.risk_level,
        total_score: a.total_score,
    }
}

fn fallback_client_name(client: ClientId) -> String {
    format!("Client #{client}")
}
