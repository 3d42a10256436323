//! # Assessment Lifecycle State Machine
//!
//! The status strings match the backend (`pending`, `submitted`,
//! `approved`, `rejected`), so [`AssessmentStatus`] deserializes directly
//! from assessment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Assessment Status ───────────────────────────────────────────────

/// Review status of a server-side assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    /// Saved as a draft; still editable.
    #[default]
    Pending,
    /// Submitted for approval.
    Submitted,
    /// Approved by a reviewer (terminal).
    Approved,
    /// Rejected by a reviewer (terminal).
    Rejected,
}

impl AssessmentStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Whether the answers can still be edited.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssessmentStatus {
    type Err = LifecycleError;

    /// Accepts the wire names in any case. `draft` and `drafts` name
    /// `pending`, as the portal labels that tab.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "draft" | "drafts" => Ok(Self::Pending),
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(LifecycleError::UnknownStatus(s.to_string())),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by lifecycle transitions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LifecycleError {
    /// Attempted transition is not valid from the current status.
    #[error("invalid assessment transition: {from} -> {to}")]
    InvalidTransition {
        from: AssessmentStatus,
        to: AssessmentStatus,
    },

    /// The assessment has already been decided.
    #[error("assessment is already {state}")]
    TerminalState { state: AssessmentStatus },

    /// The operation needs a decided assessment.
    #[error("assessment is {state}, not yet decided")]
    NotDecided { state: AssessmentStatus },

    /// Not one of the four status names.
    #[error("unknown assessment status: {0:?}")]
    UnknownStatus(String),
}

/// Check that `state` is approved or rejected.
///
/// # Errors
///
/// [`LifecycleError::NotDecided`] otherwise.
pub fn ensure_decided(state: AssessmentStatus) -> Result<(), LifecycleError> {
    if state.is_terminal() {
        Ok(())
    } else {
        Err(LifecycleError::NotDecided { state })
    }
}

/// Check whether `from → to` is an allowed status change.
///
/// # Errors
///
/// [`LifecycleError::TerminalState`] when `from` is decided,
/// [`LifecycleError::InvalidTransition`] for any other disallowed pair.
pub fn validate_transition(
    from: AssessmentStatus,
    to: AssessmentStatus,
) -> Result<(), LifecycleError> {
    use AssessmentStatus::*;

    if from.is_terminal() {
        return Err(LifecycleError::TerminalState { state: from });
    }
    match (from, to) {
        (Pending, Pending) | (Pending, Submitted) => Ok(()),
        (Submitted, Approved) | (Submitted, Rejected) => Ok(()),
        _ => Err(LifecycleError::InvalidTransition { from, to }),
    }
}

// ─── Transition Records ──────────────────────────────────────────────

/// Record of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleTransitionRecord {
    pub from_state: AssessmentStatus,
    pub to_state: AssessmentStatus,
    pub timestamp: DateTime<Utc>,
    /// Who made the change, when known.
    pub actor: Option<String>,
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Current status of an assessment and the changes that led there.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentLifecycle {
    pub state: AssessmentStatus,
    pub transitions: Vec<LifecycleTransitionRecord>,
}

impl AssessmentLifecycle {
    /// A fresh draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a status reported by the server. History is not known.
    pub fn from_status(state: AssessmentStatus) -> Self {
        Self {
            state,
            transitions: Vec::new(),
        }
    }

    /// Save as draft (PENDING → PENDING).
    pub fn save_draft(
        &mut self,
        actor: Option<&str>,
    ) -> Result<LifecycleTransitionRecord, LifecycleError> {
        self.transition(AssessmentStatus::Pending, actor)
    }

    /// Submit for approval (PENDING → SUBMITTED).
    pub fn submit(
        &mut self,
        actor: Option<&str>,
    ) -> Result<LifecycleTransitionRecord, LifecycleError> {
        self.transition(AssessmentStatus::Submitted, actor)
    }

    /// Approve (SUBMITTED → APPROVED).
    pub fn approve(
        &mut self,
        actor: Option<&str>,
    ) -> Result<LifecycleTransitionRecord, LifecycleError> {
        self.transition(AssessmentStatus::Approved, actor)
    }

    /// Reject (SUBMITTED → REJECTED).
    pub fn reject(
        &mut self,
        actor: Option<&str>,
    ) -> Result<LifecycleTransitionRecord, LifecycleError> {
        self.transition(AssessmentStatus::Rejected, actor)
    }

    /// Whether the assessment has been decided.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Apply `to`, append the record and return a copy of it.
    fn transition(
        &mut self,
        to: AssessmentStatus,
        actor: Option<&str>,
    ) -> Result<LifecycleTransitionRecord, LifecycleError> {
        validate_transition(self.state, to)?;
        let record = LifecycleTransitionRecord {
            from_state: self.state,
            to_state: to,
            timestamp: Utc::now(),
            actor: actor.map(str::to_string),
        };
        self.transitions.push(record.clone());
        self.state = to;
        Ok(record)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
