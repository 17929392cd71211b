use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Hash, Clone, Copy, PartialEq, Eq)]
pub enum QuizLevel {
    #[serde(rename = "easy")]
    Easy,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "hard")]
    Hard,
}

impl QuizLevel {
    pub fn as_str(&self) -> &str {
        match self {
            QuizLevel::Easy => "easy",
            QuizLevel::Medium => "medium",
            QuizLevel::Hard => "hard",
        }
    }

    /// Number of filled bars shown next to a quiz.
    pub fn bars(&self) -> u8 {
        match self {
            QuizLevel::Easy => 1,
            QuizLevel::Medium => 2,
            QuizLevel::Hard => 3,
        }
    }
}

impl fmt::Display for QuizLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Question {
    pub title: String,
    pub alternatives: Vec<String>,
    pub correct: usize,
}

impl Question {
    pub fn is_correct(&self, alternative: usize) -> bool {
        self.correct == alternative
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub level: QuizLevel,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn question_count(&self) -> u32 {
        self.questions.len() as u32
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub level: QuizLevel,
    pub questions: u32,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            level: quiz.level,
            questions: quiz.question_count(),
        }
    }
}
