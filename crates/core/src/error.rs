use thiserror::Error;

pub type AppEventsResult<T> = Result<T, AppEventsError>;

#[derive(Error, Debug)]
pub enum AppEventsError {
    /// A required destination setting is absent. Never retried.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// The event itself cannot be delivered (consent, identifiers, type).
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// Transport failure the delivery layer classified as transient.
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppEventsError {
    /// Whether a caller may try the same event again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppEventsError::Unavailable(_))
    }

    /// Validation failures are terminal and must never reach the network.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AppEventsError::MissingConfiguration(_) | AppEventsError::InvalidEvent(_)
        )
    }
}
