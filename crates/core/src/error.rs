/// Result alias that carries the custom [`EngineError`] type.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Numeric configuration that an engine refuses to run with. Only the
    /// session being constructed is affected.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A backend call failed and the caller asked for the error instead of
    /// degrading.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration or recording files that are not valid JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Creates a configuration error from the provided message.
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}

/// Failure reported by an audio or input-injection backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("`{program}` exited with {status}")]
    Command { program: String, status: String },
    #[error("could not parse backend output: {0}")]
    Parse(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    pub fn unavailable<T: Into<String>>(msg: T) -> Self {
        Self::Unavailable(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_carry_their_message() {
        let err = EngineError::config("history length must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration: history length must be positive"
        );
    }

    #[test]
    fn backend_errors_convert_into_engine_errors() {
        let err: EngineError = BackendError::unavailable("no mixer").into();
        assert!(matches!(err, EngineError::Backend(_)));
        assert!(err.to_string().contains("no mixer"));
    }
}
