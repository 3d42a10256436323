//! # cdd-core — Foundational Types for CDD Risk Assessment
//!
//! This crate defines the domain vocabulary shared by every other crate in
//! the workspace: server-assigned identifiers, the questionnaire catalog,
//! answers, risk levels, and client records. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for server identifiers.** `ClientId`, `QuestionId`,
//!    `CategoryId`, `AssessmentId`, `OptionId`, `CompanyId`, `ChannelId`. A
//!    question id cannot be passed where an assessment id is expected.
//!
//! 2. **Scores are copied, not looked up.** An [`Answer`] carries the score
//!    of the option that was selected at selection time. Later edits to the
//!    catalog never change an existing answer.
//!
//! 3. **One `RiskLevel` enum.** Derived from a total score by
//!    [`RiskThresholds`]; the wire form is the lowercase tier name.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cdd-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod answer;
pub mod catalog;
pub mod client_record;
pub mod error;
pub mod identity;
pub mod risk;

// Re-export primary types for ergonomic imports.
pub use answer::Answer;
pub use catalog::{Catalog, Category, FieldType, Question, QuestionOption};
pub use client_record::{ClientRecord, ClientType, DistributionChannel};
pub use error::CddError;
pub use identity::{
    AssessmentId, CategoryId, ChannelId, ClientId, CompanyId, OptionId, QuestionId,
};
pub use risk::{RiskLevel, RiskThresholds};
