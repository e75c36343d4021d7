//! Mobile app event mapping: validates inbound analytics track events and
//! translates them into the Facebook App Events `activities` payload.
//!
//! # Modules
//!
//! - [`validator`]: Delivery preconditions (settings, message type, consent)
//! - [`category`]: Semantic event categories and the per-category dispatch table
//! - [`context`]: Device/app metadata extraction
//! - [`custom_params`]: The `custom_events` entry (value, currency, items, content ids)
//! - [`event_name`]: Destination event-name resolution
//! - [`reject`]: Final pass stripping unset values
//! - [`adaptor`]: The [`DestinationAdaptor`] seam used by the delivery layer

pub mod adaptor;
pub mod category;
pub mod context;
pub mod custom_params;
pub mod event_name;
pub mod reject;
pub mod validator;

pub use adaptor::{DestinationAdaptor, FacebookAppEventsAdaptor};
pub use category::{map_event, EventCategory};
pub use event_name::resolve_event_name;
pub use validator::{check, validate, ValidationResult};
