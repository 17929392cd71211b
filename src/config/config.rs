use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;

pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    AppConfig::load().unwrap_or_else(|e| panic!("Failed to load configuration: {}", e))
});

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub catalog_path: String,
    pub history_namespace: String,
    pub log_level: String,
    pub feedback: FeedbackConfig,
}

/// Durations of the feedback effects, in milliseconds.
#[derive(Debug, Deserialize, Clone)]
pub struct FeedbackConfig {
    pub shake_ms: u64,
    pub overlay_ms: u64,
    pub sound_ms: u64,
}

impl FeedbackConfig {
    pub fn shake(&self) -> Duration {
        Duration::from_millis(self.shake_ms)
    }

    pub fn overlay(&self) -> Duration {
        Duration::from_millis(self.overlay_ms)
    }

    pub fn sound(&self) -> Duration {
        Duration::from_millis(self.sound_ms)
    }
}

impl AppConfig {
    /// Defaults, then `quiz.toml` if present, then `QUIZ__*` environment variables.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        ::config::Config::builder()
            .set_default("database_url", "sqlite::memory:")?
            .set_default("catalog_path", "data/quizzes.json")?
            .set_default("history_namespace", "quiz:history")?
            .set_default("log_level", "debug")?
            .set_default("feedback.shake_ms", 400_i64)?
            .set_default("feedback.overlay_ms", 400_i64)?
            .set_default("feedback.sound_ms", 300_i64)?
            .add_source(::config::File::with_name("quiz").required(false))
            .add_source(
                ::config::Environment::with_prefix("QUIZ")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::DEBUG)
    }
}
