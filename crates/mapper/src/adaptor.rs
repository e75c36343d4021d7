//! Destination adaptors: the seam the delivery layer calls through.
//!
//! An adaptor owns the destination settings, validates events against them
//! and produces the JSON payload for a category.

use app_events_core::{AppEventsResult, EventEnvelope, Settings};
use tracing::debug;

use crate::category::{map_event, EventCategory};
use crate::validator::validate;

/// Adaptor trait. Validates and transforms track events into a
/// destination-specific JSON payload.
pub trait DestinationAdaptor: Send + Sync {
    /// Destination identifier (e.g. "facebook_app_events").
    fn destination(&self) -> &str;

    /// Request path for this payload, relative to the transport endpoint.
    fn path(&self) -> String;

    /// Check delivery preconditions. Rejections are terminal.
    fn validate(&self, event: &EventEnvelope) -> AppEventsResult<()>;

    /// Transform a validated event for the given category.
    fn transform(&self, category: EventCategory, event: &EventEnvelope) -> serde_json::Value;

    /// Validate, then transform.
    fn prepare(
        &self,
        category: EventCategory,
        event: &EventEnvelope,
    ) -> AppEventsResult<serde_json::Value> {
        self.validate(event)?;
        Ok(self.transform(category, event))
    }
}

/// Facebook App Events (`/{app_id}/activities`).
pub struct FacebookAppEventsAdaptor {
    settings: Settings,
}

impl FacebookAppEventsAdaptor {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl DestinationAdaptor for FacebookAppEventsAdaptor {
    fn destination(&self) -> &str {
        "facebook_app_events"
    }

    fn path(&self) -> String {
        format!("{}/activities", self.settings.app_id().unwrap_or_default())
    }

    fn validate(&self, event: &EventEnvelope) -> AppEventsResult<()> {
        validate(&self.settings, event)
    }

    fn transform(&self, category: EventCategory, event: &EventEnvelope) -> serde_json::Value {
        let payload = map_event(category, event, &self.settings);
        debug!(
            category = %category,
            event = %event.event,
            message_id = event.message_id.as_deref().unwrap_or_default(),
            "App event transformed"
        );
        payload
    }
}
