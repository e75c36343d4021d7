//! Delivery preconditions. Fails closed: any rejection is terminal and must
//! be returned before a request is built.

use app_events_core::types::Platform;
use app_events_core::{AppEventsError, AppEventsResult, ConsentPolicy, EventEnvelope, Settings};

/// Outcome of [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Accepted,
    Rejected { reason: String },
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted)
    }
}

/// Validate settings, then the event.
///
/// - `app_id` missing or blank, or `advertiser_id` set but blank:
///   [`AppEventsError::MissingConfiguration`].
/// - Non-`track` messages: [`AppEventsError::InvalidEvent`].
/// - Under [`ConsentPolicy::RequireAdvertisingId`], iOS and Android events
///   need an advertising id and must not have opted out of ad tracking.
pub fn validate(settings: &Settings, event: &EventEnvelope) -> AppEventsResult<()> {
    if settings.app_id().is_none() {
        return Err(AppEventsError::MissingConfiguration(
            "settings.app_id".to_string(),
        ));
    }
    if let Some(advertiser_id) = &settings.advertiser_id {
        if advertiser_id.trim().is_empty() {
            return Err(AppEventsError::MissingConfiguration(
                "settings.advertiser_id".to_string(),
            ));
        }
    }

    if !event.is_track() {
        return Err(AppEventsError::InvalidEvent(format!(
            "unsupported message type '{}'",
            event.message_type
        )));
    }

    if settings.consent_policy == ConsentPolicy::RequireAdvertisingId
        && event.context.platform() != Platform::Other
    {
        if event.context.advertising_id().is_none() {
            return Err(AppEventsError::InvalidEvent(
                "missing advertising identifier".to_string(),
            ));
        }
        if event.context.ad_tracking_enabled() == Some(false) {
            return Err(AppEventsError::InvalidEvent(
                "ad tracking disabled".to_string(),
            ));
        }
    }

    Ok(())
}

/// [`validate`] folded into an accept/reject classification.
pub fn check(settings: &Settings, event: &EventEnvelope) -> ValidationResult {
    match validate(settings, event) {
        Ok(()) => ValidationResult::Accepted,
        Err(e) => ValidationResult::Rejected {
            reason: e.to_string(),
        },
    }
}
