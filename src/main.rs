use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use quiz_engine::{common::app_state::AppState, config::config::CONFIG};

#[tokio::main]
async fn main() {
    // Initialize .env
    dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(CONFIG.level_filter())
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global tracing");

    // Initialize state
    let state = AppState::from_config(&CONFIG)
        .await
        .unwrap_or_else(|e| panic!("{}", e));

    for quiz in state.get_catalog().list(None) {
        info!(
            "[{}] {} ({}, {} questions)",
            quiz.id, quiz.title, quiz.level, quiz.questions
        );
    }

    match state.get_history().list().await {
        Ok(records) => {
            info!("{} attempts in history", records.len());
            for record in records {
                info!(
                    "{} {}: {}/{} on {}",
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.title,
                    record.score,
                    record.questions,
                    record.level
                );
            }
        }
        Err(e) => error!("Failed to read history: {}", e),
    }
}
