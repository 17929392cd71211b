#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::config::AppConfig;

    #[test]
    fn feedback_durations_have_defaults() {
        let config = AppConfig::load().unwrap();

        assert!(config.feedback.shake() > Duration::ZERO);
        assert!(config.feedback.sound() > Duration::ZERO);
        assert!(!config.history_namespace.is_empty());
    }
}
