/// Result alias used across the core crate.
pub type Result<T> = std::result::Result<T, SortVizError>;

/// Failures at the configuration boundary.
///
/// History generation and playback are infallible; misuse of the controller
/// is a silent no-op and never produces one of these.
#[derive(Debug, thiserror::Error)]
pub enum SortVizError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    #[test]
    fn io_failures_convert_through_question_mark() {
        let err = read("/no/such/sort-visualiser.json").unwrap_err();
        assert!(matches!(err, SortVizError::Io(_)));
        assert!(err.to_string().starts_with("failed to read configuration"));
    }

    #[test]
    fn invalid_config_names_the_problem() {
        let err = SortVizError::InvalidConfig("array.values must not be empty".into());
        assert_eq!(
            err.to_string(),
            "invalid configuration: array.values must not be empty"
        );
    }
}
