//! # Draft Session
//!
//! One client's questionnaire in progress. Opening a session loads the
//! cached draft; every mutation recomputes the score and persists the draft
//! through the [`DraftCache`] before returning.

use cdd_core::{Answer, AssessmentId, Catalog, ClientId, QuestionId};

use crate::cache::{DraftCache, DraftSource};
use crate::draft::Draft;
use crate::error::DraftError;
use crate::scoring::{self, ScoreSummary};
use crate::store::KeyValueStore;

/// A client's draft bound to its cache.
#[derive(Debug)]
pub struct DraftSession<S: KeyValueStore> {
    client: ClientId,
    draft: Draft,
    source: DraftSource,
    cache: DraftCache<S>,
}

impl<S: KeyValueStore> DraftSession<S> {
    /// Open the questionnaire for `client`, resuming any cached draft.
    pub fn open(cache: DraftCache<S>, client: ClientId) -> Self {
        let loaded = cache.load(client);
        tracing::debug!(
            client = %client,
            source = ?loaded.source,
            answers = loaded.draft.len(),
            "draft session opened"
        );
        Self {
            client,
            draft: loaded.draft,
            source: loaded.source,
            cache,
        }
    }

    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Where the draft was resumed from when the session was opened.
    pub fn source(&self) -> DraftSource {
        self.source
    }

    pub fn cache(&self) -> &DraftCache<S> {
        &self.cache
    }

    /// Server assessment this draft is bound to, if any.
    pub fn assessment(&self) -> Option<AssessmentId> {
        self.cache.mapped_assessment(self.client)
    }

    /// Select option `text` for `question` and persist.
    ///
    /// The option's current score is copied into the answer.
    ///
    /// # Errors
    ///
    /// [`DraftError::Selection`] when the question or option is not in the
    /// catalog. The draft is left unchanged.
    pub fn select(
        &mut self,
        catalog: &Catalog,
        question: QuestionId,
        text: &str,
    ) -> Result<&Answer, DraftError> {
        let answer = catalog.select(question, text)?;
        self.draft.set(answer);
        self.cache.persist(self.client, &self.draft);
        self.draft
            .answer(question)
            .ok_or_else(|| cdd_core::CddError::UnknownQuestion(question.get()).into())
    }

    /// Remove the answer for `question` and persist. Returns the removed
    /// answer, if there was one.
    pub fn clear(&mut self, question: QuestionId) -> Option<Answer> {
        let removed = self.draft.clear(question);
        if removed.is_some() {
            self.cache.persist(self.client, &self.draft);
        }
        removed
    }

    /// Score the draft against `catalog`.
    pub fn summary(&self, catalog: &Catalog) -> ScoreSummary {
        scoring::score(&self.draft, &catalog.questions)
    }

    /// Record the server id assigned by the first draft save.
    pub fn bind_assessment(&mut self, assessment: AssessmentId) {
        self.cache
            .bind_assessment(self.client, assessment, &self.draft);
    }

    /// Forget the local draft after submission. The session stays open on
    /// an empty draft.
    pub fn reset(&mut self) {
        self.cache.discard(self.client);
        self.draft = Draft::new();
        self.source = DraftSource::Empty;
    }

    /// Forget the local draft and hand back the cache.
    pub fn discard(mut self) -> DraftCache<S> {
        self.reset();
        self.cache
    }

    pub fn into_cache(self) -> DraftCache<S> {
        self.cache
    }
}
