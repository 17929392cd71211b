use std::sync::Arc;

use tracing::{error, info};

use crate::{
    common::error::QuizError,
    history::{
        models::HistoryRecord,
        store::{RecordStore, StoreError},
    },
    quiz::models::Quiz,
};

pub struct HistoryService<S> {
    store: Arc<S>,
}

impl<S> Clone for HistoryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: RecordStore> HistoryService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Most recent attempt first.
    pub async fn list(&self) -> Result<Vec<HistoryRecord>, QuizError> {
        let mut records = self.store.get_all().await?;
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(records)
    }

    pub async fn remove(&self, id: &str) -> Result<(), QuizError> {
        self.store.remove(id).await.map_err(|e| match e {
            StoreError::NotFound(id) => {
                QuizError::NotFound(format!("History record {} does not exist", id))
            }
            other => QuizError::Persistence(other),
        })?;

        info!("Removed history record {}", id);
        Ok(())
    }

    /// Appends the record of a finished attempt. Failures are returned, never retried.
    pub async fn record_attempt(&self, quiz: &Quiz, score: u32) -> Result<HistoryRecord, QuizError> {
        let record = HistoryRecord::from_quiz(quiz, score);

        if let Err(e) = self.store.add(&record).await {
            error!("Failed to persist history for quiz {}: {}", quiz.id, e);
            return Err(QuizError::Persistence(e));
        }

        info!(
            "Recorded attempt {} at quiz {}: {}/{}",
            record.id, quiz.id, record.score, record.questions
        );
        Ok(record)
    }
}
