//! Outbound delivery of mapped app events.
//!
//! # Modules
//!
//! - [`transport`]: [`Transport`] trait and the `reqwest` implementation with bounded retries
//! - [`integration`]: [`FacebookAppEvents`]: one call per event category, validate → map → send

pub mod error;
pub mod integration;
pub mod transport;

pub use error::DeliveryError;
pub use integration::{DeliveryOutcome, FacebookAppEvents};
pub use transport::{HttpTransport, Transport, TransportResponse};
