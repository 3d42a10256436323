//! # Questionnaire Catalog
//!
//! Categories, questions and their scored options, in the shape the backend
//! returns them from `/api/questions/` and `/api/categories/`.
//!
//! Fields carry `#[serde(default)]` where the backend may omit them; unknown
//! fields are ignored so that additions on the server side do not break
//! deserialization.

use serde::{Deserialize, Serialize};

use crate::answer::Answer;
use crate::error::CddError;
use crate::identity::{CategoryId, OptionId, QuestionId};

/// How a question is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Select,
    Radio,
    Text,
}

/// A grouping of questions for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One selectable answer of a question and the score it contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    #[serde(default)]
    pub id: Option<OptionId>,
    pub option_text: String,
    #[serde(default)]
    pub score_value: i64,
}

/// A scored questionnaire question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    /// The backend calls this `category`; older payloads used `category_id`.
    #[serde(alias = "category_id")]
    pub category: CategoryId,
    pub question_text: String,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Highest score any option can contribute, floored at zero.
    ///
    /// A question without options contributes 0.
    pub fn max_score(&self) -> i64 {
        self.options
            .iter()
            .map(|o| o.score_value)
            .fold(0, i64::max)
    }

    /// Whether the question can be answered at all.
    pub fn is_scorable(&self) -> bool {
        !self.options.is_empty()
    }

    /// Find an option by its display text.
    pub fn option(&self, text: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.option_text == text)
    }

    /// Build the [`Answer`] for selecting `text`, copying the option's score.
    ///
    /// # Errors
    ///
    /// Returns [`CddError::UnknownOption`] when `text` is not an option of
    /// this question, which is always the case for a question with no options.
    pub fn select(&self, text: &str) -> Result<Answer, CddError> {
        let option = self.option(text).ok_or_else(|| CddError::UnknownOption {
            question: self.id.get(),
            option: text.to_string(),
        })?;
        Ok(Answer::new(self.id, option.option_text.clone(), option.score_value))
    }
}

/// Questions together with their categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Catalog {
    /// Build a catalog, ordering questions by `display_order` then id.
    pub fn new(categories: Vec<Category>, mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(|q| (q.display_order, q.id));
        Self {
            categories,
            questions,
        }
    }

    /// Look up a question by id.
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Questions belonging to `category`, in display order.
    pub fn questions_in(&self, category: CategoryId) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.category == category)
    }

    /// Questions whose category is not listed in the catalog.
    pub fn uncategorized(&self) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |q| !self.categories.iter().any(|c| c.id == q.category))
    }

    /// Resolve a selection of `text` on question `id`.
    ///
    /// # Errors
    ///
    /// [`CddError::UnknownQuestion`] or [`CddError::UnknownOption`].
    pub fn select(&self, id: QuestionId, text: &str) -> Result<Answer, CddError> {
        self.question(id)
            .ok_or(CddError::UnknownQuestion(id.get()))?
            .select(text)
    }
}
