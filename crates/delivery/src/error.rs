use app_events_core::AppEventsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

impl DeliveryError {
    /// Timeouts, connection failures, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::Http(err) => err.is_timeout() || err.is_connect(),
            DeliveryError::Status { status, .. } => is_retryable_status(*status),
            DeliveryError::Endpoint(_) => false,
        }
    }
}

pub(crate) fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

impl From<DeliveryError> for AppEventsError {
    fn from(err: DeliveryError) -> Self {
        if err.is_retryable() {
            AppEventsError::Unavailable(err.to_string())
        } else {
            AppEventsError::Transport(err.to_string())
        }
    }
}
