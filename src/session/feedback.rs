use core::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::config::FeedbackConfig;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeedbackStatus {
    #[default]
    None,
    Correct,
    Wrong,
}

impl FeedbackStatus {
    pub fn overlay(&self) -> OverlayTint {
        match self {
            FeedbackStatus::None => OverlayTint::Transparent,
            FeedbackStatus::Correct => OverlayTint::Brand,
            FeedbackStatus::Wrong => OverlayTint::Danger,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTint {
    Transparent,
    Brand,
    Danger,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Correct,
    Wrong,
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoundCue::Correct => write!(f, "correct"),
            SoundCue::Wrong => write!(f, "wrong"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Sound cue {0} could not be played: {1}")]
    Sound(SoundCue, String),

    #[error("Animation {0} failed: {1}")]
    Animation(&'static str, String),
}

/// Plays the sound and animation side effects of an answer. Each future
/// resolves once its effect has finished.
pub trait FeedbackDriver: Send + Sync + 'static {
    fn play_sound(&self, cue: SoundCue) -> impl Future<Output = Result<(), FeedbackError>> + Send;

    fn shake(&self) -> impl Future<Output = Result<(), FeedbackError>> + Send;

    fn flash_overlay(
        &self,
        status: FeedbackStatus,
    ) -> impl Future<Output = Result<(), FeedbackError>> + Send;
}

/// Driver that only waits out the configured effect durations.
#[derive(Debug, Clone)]
pub struct TimedFeedback {
    shake: Duration,
    overlay: Duration,
    sound: Duration,
}

impl TimedFeedback {
    pub fn new(shake: Duration, overlay: Duration, sound: Duration) -> Self {
        Self {
            shake,
            overlay,
            sound,
        }
    }

    pub fn from_config(config: &FeedbackConfig) -> Self {
        Self::new(config.shake(), config.overlay(), config.sound())
    }
}

impl FeedbackDriver for TimedFeedback {
    async fn play_sound(&self, cue: SoundCue) -> Result<(), FeedbackError> {
        debug!("Loading sound cue {} and seeking to start", cue);
        tokio::time::sleep(self.sound).await;
        debug!("Sound cue {} finished", cue);
        Ok(())
    }

    async fn shake(&self) -> Result<(), FeedbackError> {
        tokio::time::sleep(self.shake).await;
        Ok(())
    }

    async fn flash_overlay(&self, status: FeedbackStatus) -> Result<(), FeedbackError> {
        debug!("Flashing {:?} overlay", status.overlay());
        tokio::time::sleep(self.overlay).await;
        Ok(())
    }
}
