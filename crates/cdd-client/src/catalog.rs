//! Questionnaire catalog (`/api/questions/`, `/api/categories/`).

use cdd_core::{Catalog, Category, Question};

use crate::error::ApiError;
use crate::transport::Transport;

/// Question and category endpoints.
#[derive(Debug, Clone)]
pub struct CatalogApi {
    transport: Transport,
}

impl CatalogApi {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET /api/questions/`. Options come nested in each question.
    pub async fn questions(&self) -> Result<Vec<Question>, ApiError> {
        self.transport
            .get("GET /api/questions/", "/api/questions/")
            .await
    }

    /// Calls `GET /api/categories/`.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.transport
            .get("GET /api/categories/", "/api/categories/")
            .await
    }

    /// Fetch questions and categories together and assemble a [`Catalog`].
    pub async fn load(&self) -> Result<Catalog, ApiError> {
        let (questions, categories) = tokio::try_join!(self.questions(), self.categories())?;
        tracing::debug!(
            questions = questions.len(),
            categories = categories.len(),
            "catalog loaded"
        );
        Ok(Catalog::new(categories, questions))
    }
}
