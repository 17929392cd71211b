use std::{collections::HashSet, path::Path, sync::Arc};

use tracing::{debug, info};

use crate::{
    common::error::QuizError,
    quiz::models::{Quiz, QuizLevel, QuizSummary},
};

/// Read-only set of quizzes. Cloning shares the underlying list.
#[derive(Debug, Clone)]
pub struct QuizCatalog {
    quizzes: Arc<Vec<Arc<Quiz>>>,
}

impl QuizCatalog {
    pub fn new(quizzes: Vec<Quiz>) -> Result<Self, QuizError> {
        let mut ids = HashSet::new();
        for quiz in &quizzes {
            if !ids.insert(quiz.id.as_str()) {
                return Err(QuizError::Catalog(format!(
                    "Quiz id {} is used more than once",
                    quiz.id
                )));
            }
            validate(quiz)?;
        }

        let quizzes = quizzes.into_iter().map(Arc::new).collect();
        Ok(Self {
            quizzes: Arc::new(quizzes),
        })
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, QuizError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let quizzes: Vec<Quiz> = serde_json::from_str(&raw)?;

        let catalog = Self::new(quizzes)?;
        info!(
            "Loaded {} quizzes from {}",
            catalog.len(),
            path.display()
        );

        Ok(catalog)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Arc<Quiz>, QuizError> {
        self.quizzes
            .iter()
            .find(|quiz| quiz.id == id)
            .cloned()
            .ok_or_else(|| QuizError::NotFound(format!("Quiz with id {} does not exist", id)))
    }

    /// Summaries in catalog order, optionally narrowed to one level.
    pub fn list(&self, level: Option<QuizLevel>) -> Vec<QuizSummary> {
        let summaries: Vec<QuizSummary> = self
            .quizzes
            .iter()
            .filter(|quiz| level.is_none_or(|level| quiz.level == level))
            .map(|quiz| QuizSummary::from(quiz.as_ref()))
            .collect();

        debug!("Listing {} quizzes for level {:?}", summaries.len(), level);
        summaries
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

fn validate(quiz: &Quiz) -> Result<(), QuizError> {
    if quiz.questions.is_empty() {
        return Err(QuizError::Catalog(format!(
            "Quiz {} has no questions",
            quiz.id
        )));
    }

    for (idx, question) in quiz.questions.iter().enumerate() {
        if question.alternatives.is_empty() {
            return Err(QuizError::Catalog(format!(
                "Question {} of quiz {} has no alternatives",
                idx + 1,
                quiz.id
            )));
        }

        if question.correct >= question.alternatives.len() {
            return Err(QuizError::Catalog(format!(
                "Question {} of quiz {} marks alternative {} as correct, but only has {}",
                idx + 1,
                quiz.id,
                question.correct,
                question.alternatives.len()
            )));
        }
    }

    Ok(())
}
