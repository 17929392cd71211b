use std::sync::Arc;

use tracing::info;

use crate::{
    common::error::QuizError,
    config::config::AppConfig,
    history::{db::SqliteRecordStore, service::HistoryService, store::RecordStore},
    quiz::catalog::QuizCatalog,
    session::{actor::SessionHandle, feedback::TimedFeedback},
};

pub struct AppState<S> {
    catalog: QuizCatalog,
    history: HistoryService<S>,
    feedback: Arc<TimedFeedback>,
}

impl AppState<SqliteRecordStore> {
    pub async fn from_config(config: &AppConfig) -> Result<Arc<Self>, QuizError> {
        let catalog = QuizCatalog::from_path(&config.catalog_path).await?;
        let store =
            SqliteRecordStore::connect(&config.database_url, config.history_namespace.as_str())
                .await?;
        let feedback = TimedFeedback::from_config(&config.feedback);

        info!("Record store ready at {}", config.database_url);
        Ok(Self::new(catalog, Arc::new(store), feedback))
    }
}

impl<S: RecordStore> AppState<S> {
    pub fn new(catalog: QuizCatalog, store: Arc<S>, feedback: TimedFeedback) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            history: HistoryService::new(store),
            feedback: Arc::new(feedback),
        })
    }

    pub fn get_catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    pub fn get_history(&self) -> &HistoryService<S> {
        &self.history
    }

    /// Fails with `NotFound` before anything starts when the id is unknown.
    pub fn start_session(&self, quiz_id: &str) -> Result<SessionHandle, QuizError> {
        let quiz = self.catalog.find_by_id(quiz_id)?;
        SessionHandle::spawn(quiz, self.history.clone(), self.feedback.clone())
    }
}
