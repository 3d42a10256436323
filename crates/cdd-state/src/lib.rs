//! # cdd-state — Assessment Lifecycle
//!
//! Models the review workflow an assessment moves through once it exists on
//! the server.
//!
//! ```text
//! Pending ──▶ Submitted ──▶ Approved (terminal)
//!    │ ▲           │
//!    └─┘           └──▶ Rejected (terminal)
//!  save as draft
//! ```
//!
//! `Pending → Pending` is the "save as draft" step: the record is updated
//! but stays in drafting. Decisions are only possible on submitted
//! assessments, and a decided assessment never changes status again.

pub mod lifecycle;

pub use lifecycle::{
    ensure_decided, validate_transition, AssessmentLifecycle, AssessmentStatus, LifecycleError,
    LifecycleTransitionRecord,
};
