//! # Draft Cache
//!
//! Keeps a client's in-progress answers in a [`KeyValueStore`] so a
//! questionnaire can be resumed before and after the server has a record.
//!
//! ## Keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `cdd_draft_responses_client_{client}` | draft payload |
//! | `cdd_draft_map_client_{client}` | server assessment id |
//! | `cdd_draft_meta_assessment_{assessment}` | draft payload |
//!
//! ## Rules
//!
//! - **Persist**: write the client-scoped payload; if an assessment id is
//!   mapped for the client, mirror the payload under the assessment key.
//! - **Load**: the assessment-scoped payload wins when a mapping exists and
//!   it parses; otherwise the client-scoped payload; otherwise empty. A
//!   payload whose scores overflow an `i64` counts as unreadable.
//! - **Cached total**: the same precedence for a server assessment row, keyed
//!   by the row's id rather than the client's mapping.
//! - **Bind**: after the first successful server save, record the mapping
//!   and copy the payload under the assessment key.
//! - **Discard**: after submission, delete all three entries.
//!
//! Every store failure is logged and swallowed. Losing the cache means the
//! user starts the questionnaire over; it never corrupts server data.

use cdd_core::{AssessmentId, ClientId};

use crate::draft::{parse_client_payload, Draft, DraftPayload};
use crate::store::KeyValueStore;

/// Key of the client-scoped draft payload.
pub fn client_draft_key(client: ClientId) -> String {
    format!("cdd_draft_responses_client_{client}")
}

/// Key of the client → assessment mapping.
pub fn assessment_map_key(client: ClientId) -> String {
    format!("cdd_draft_map_client_{client}")
}

/// Key of the assessment-scoped draft payload.
pub fn assessment_draft_key(assessment: AssessmentId) -> String {
    format!("cdd_draft_meta_assessment_{assessment}")
}

/// Where a loaded draft came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftSource {
    Assessment(AssessmentId),
    Client,
    Empty,
}

/// A draft together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDraft {
    pub draft: Draft,
    pub source: DraftSource,
    /// The cached total disagreed with the answers and was recomputed.
    pub recomputed_total: bool,
}

/// Draft persistence rules over a store.
#[derive(Debug, Clone)]
pub struct DraftCache<S> {
    store: S,
}

impl<S: KeyValueStore> DraftCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// The server assessment id recorded for `client`, if any.
    pub fn mapped_assessment(&self, client: ClientId) -> Option<AssessmentId> {
        let raw = self.read(&assessment_map_key(client))?;
        match raw.parse::<AssessmentId>() {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(client = %client, "ignoring malformed draft mapping: {e}");
                None
            }
        }
    }

    /// Load the draft for `client`, preferring the assessment-scoped copy.
    pub fn load(&self, client: ClientId) -> LoadedDraft {
        if let Some(assessment) = self.mapped_assessment(client) {
            if let Some(payload) = self.assessment_payload(assessment) {
                return loaded(payload, DraftSource::Assessment(assessment));
            }
        }
        match self.client_payload(client) {
            Some(payload) => loaded(payload, DraftSource::Client),
            None => empty(),
        }
    }

    /// Total of the locally cached draft behind a server `assessment` row.
    ///
    /// Reads the copy stored under `assessment` first and falls back to
    /// `client`'s draft, with the same readability rules as [`Self::load`].
    /// The total is summed from the stored answers. `None` when neither copy
    /// is readable.
    pub fn cached_total(&self, client: ClientId, assessment: AssessmentId) -> Option<i64> {
        self.assessment_payload(assessment)
            .or_else(|| self.client_payload(client))
            .and_then(|payload| payload.checked_total())
    }

    fn assessment_payload(&self, assessment: AssessmentId) -> Option<DraftPayload> {
        let raw = self.read(&assessment_draft_key(assessment))?;
        match serde_json::from_str::<DraftPayload>(&raw) {
            Ok(payload) if payload.checked_total().is_some() => Some(payload),
            Ok(_) => {
                tracing::warn!(assessment = %assessment, "assessment draft total overflows, ignoring it");
                None
            }
            Err(e) => {
                tracing::warn!(assessment = %assessment, "assessment draft unreadable, ignoring it: {e}");
                None
            }
        }
    }

    fn client_payload(&self, client: ClientId) -> Option<DraftPayload> {
        let raw = self.read(&client_draft_key(client))?;
        match parse_client_payload(&raw) {
            Some(payload) if payload.checked_total().is_some() => Some(payload),
            _ => {
                tracing::warn!(client = %client, "client draft unreadable, ignoring it");
                None
            }
        }
    }

    /// Write `draft` for `client`, mirroring it under the mapped assessment.
    pub fn persist(&mut self, client: ClientId, draft: &Draft) {
        let Some(json) = encode(draft) else { return };
        self.write(&client_draft_key(client), &json);
        if let Some(assessment) = self.mapped_assessment(client) {
            self.write(&assessment_draft_key(assessment), &json);
        }
    }

    /// Record that `client`'s draft now belongs to server `assessment`.
    pub fn bind_assessment(&mut self, client: ClientId, assessment: AssessmentId, draft: &Draft) {
        self.write(&assessment_map_key(client), &assessment.to_string());
        if let Some(json) = encode(draft) {
            self.write(&assessment_draft_key(assessment), &json);
        }
        tracing::debug!(client = %client, assessment = %assessment, "draft bound to assessment");
    }

    /// Drop every cached entry for `client` once the assessment is submitted.
    pub fn discard(&mut self, client: ClientId) {
        if let Some(assessment) = self.mapped_assessment(client) {
            self.delete(&assessment_draft_key(assessment));
        }
        self.delete(&assessment_map_key(client));
        self.delete(&client_draft_key(client));
        tracing::debug!(client = %client, "draft discarded");
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "draft store read failed: {e}");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, "draft store write failed: {e}");
        }
    }

    fn delete(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(key, "draft store delete failed: {e}");
        }
    }
}

fn encode(draft: &Draft) -> Option<String> {
    match serde_json::to_string(&draft.to_payload()) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!("draft serialization failed: {e}");
            None
        }
    }
}

fn loaded(payload: DraftPayload, source: DraftSource) -> LoadedDraft {
    let recomputed_total = payload.is_total_stale();
    if recomputed_total {
        tracing::debug!(?source, cached = payload.total_score, "recomputing stale draft total");
    }
    LoadedDraft {
        draft: payload.into_draft(),
        source,
        recomputed_total,
    }
}

fn empty() -> LoadedDraft {
    LoadedDraft {
        draft: Draft::new(),
        source: DraftSource::Empty,
        recomputed_total: false,
    }
}
