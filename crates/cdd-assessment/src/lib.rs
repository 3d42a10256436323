//! # cdd-assessment — Scoring and Draft Cache
//!
//! The one piece of real logic in the assessment screen: turning answers
//! into a score and a risk tier, and keeping in-progress answers durable
//! across restarts before (and after) the server knows about the assessment.
//!
//! ## Modules
//!
//! - `scoring`: total score, maximum score, risk level, progress.
//! - `draft`: the in-memory [`Draft`] and its stored JSON payload.
//! - `store`: the [`KeyValueStore`] seam with memory and file backends.
//! - `cache`: the key scheme and the load / persist / migrate / discard
//!   rules over a store.
//! - `session`: a [`DraftSession`] tying one client's draft to the cache so
//!   that every mutation is persisted.
//!
//! ## Context
//!
//! Nothing here reads ambient state. The client id, the catalog and the
//! store are always passed in explicitly.

pub mod cache;
pub mod draft;
pub mod error;
pub mod scoring;
pub mod session;
pub mod store;

pub use cache::{
    assessment_draft_key, assessment_map_key, client_draft_key, DraftCache, DraftSource,
    LoadedDraft,
};
pub use draft::{Draft, DraftPayload, StoredResponse};
pub use error::{DraftError, StoreError};
pub use scoring::{breakdown, score, score_with, QuestionScore, ScoreSummary};
pub use session::DraftSession;
pub use store::{FileStore, KeyValueStore, MemoryStore};
