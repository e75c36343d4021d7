pub mod config;
pub mod error;
pub mod types;

pub use config::RelayConfig;
pub use error::{AppEventsError, AppEventsResult};
pub use types::{ConsentPolicy, EventEnvelope, Settings};
