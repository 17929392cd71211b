use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quiz::models::{Quiz, QuizLevel};

/// One completed attempt at a quiz.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryRecord {
    pub id: String,
    pub title: String,
    pub level: QuizLevel,
    pub score: u32,
    pub questions: u32,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Ids are UUIDv7, so they sort by creation time.
    pub fn from_quiz(quiz: &Quiz, score: u32) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            title: quiz.title.clone(),
            level: quiz.level,
            score,
            questions: quiz.question_count(),
            created_at: Utc::now(),
        }
    }
}
