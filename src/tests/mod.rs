mod config;

use tracing::level_filters::LevelFilter;

use crate::quiz::models::{Question, Quiz, QuizLevel};

pub(crate) fn setup_logging() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Quiz whose questions have three alternatives and the given correct indices.
pub(crate) fn quiz(id: &str, level: QuizLevel, correct: &[usize]) -> Quiz {
    let questions = correct
        .iter()
        .enumerate()
        .map(|(idx, correct)| Question {
            title: format!("Question {}", idx + 1),
            alternatives: vec!["First".into(), "Second".into(), "Third".into()],
            correct: *correct,
        })
        .collect();

    Quiz {
        id: id.into(),
        title: format!("Quiz {}", id),
        level,
        questions,
    }
}
