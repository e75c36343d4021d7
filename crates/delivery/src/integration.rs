//! Facebook App Events integration with one operation per event category.
//!
//! Every operation runs validate → map → send. Validation failures return
//! before the transport is touched.

use std::sync::Arc;

use app_events_core::config::RelayConfig;
use app_events_core::{AppEventsError, AppEventsResult, EventEnvelope, Settings};
use app_events_mapper::{DestinationAdaptor, EventCategory, FacebookAppEventsAdaptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::transport::{HttpTransport, Transport};

/// Record of one delivered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub id: Uuid,
    pub destination: String,
    pub category: EventCategory,
    pub message_id: Option<String>,
    pub status: u16,
    pub attempts: usize,
    pub payload: serde_json::Value,
    pub delivered_at: DateTime<Utc>,
}

pub struct FacebookAppEvents {
    adaptor: FacebookAppEventsAdaptor,
    transport: Arc<dyn Transport>,
}

impl FacebookAppEvents {
    pub fn new(settings: Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            adaptor: FacebookAppEventsAdaptor::new(settings),
            transport,
        }
    }

    /// Build from relay configuration with the HTTP transport.
    pub fn from_config(config: &RelayConfig) -> AppEventsResult<Self> {
        let transport = HttpTransport::new(&config.delivery)?;
        Ok(Self::new(config.destination.settings(), Arc::new(transport)))
    }

    pub fn adaptor(&self) -> &FacebookAppEventsAdaptor {
        &self.adaptor
    }

    /// Classify by event name and deliver.
    pub async fn deliver(&self, event: &EventEnvelope) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::from_event_name(&event.event), event)
            .await
    }

    /// Validate, map and post `event` as `category`.
    pub async fn send(
        &self,
        category: EventCategory,
        event: &EventEnvelope,
    ) -> AppEventsResult<DeliveryOutcome> {
        let payload = self.adaptor.prepare(category, event).map_err(|e| {
            warn!(
                category = %category,
                event = %event.event,
                error = %e,
                "App event rejected"
            );
            e
        })?;

        let response = self
            .transport
            .post(&self.adaptor.path(), &payload)
            .await
            .map_err(|e| {
                error!(
                    category = %category,
                    transport = self.transport.name(),
                    error = %e,
                    "App event delivery failed"
                );
                AppEventsError::from(e)
            })?;

        info!(
            category = %category,
            status = response.status,
            attempts = response.attempts,
            "App event delivered"
        );

        Ok(DeliveryOutcome {
            id: Uuid::new_v4(),
            destination: self.adaptor.destination().to_string(),
            category,
            message_id: event.message_id.clone(),
            status: response.status,
            attempts: response.attempts,
            payload,
            delivered_at: Utc::now(),
        })
    }

    /// Generic custom event; the only category honoring settings renames.
    pub async fn track(&self, event: &EventEnvelope) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::Track, event).await
    }

    pub async fn application_installed(
        &self,
        event: &EventEnvelope,
    ) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::ApplicationInstalled, event).await
    }

    pub async fn application_opened(
        &self,
        event: &EventEnvelope,
    ) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::ApplicationOpened, event).await
    }

    pub async fn products_searched(
        &self,
        event: &EventEnvelope,
    ) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::ProductsSearched, event).await
    }

    pub async fn product_viewed(&self, event: &EventEnvelope) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::ProductViewed, event).await
    }

    pub async fn product_added_to_wishlist(
        &self,
        event: &EventEnvelope,
    ) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::ProductAddedToWishlist, event).await
    }

    pub async fn product_added(&self, event: &EventEnvelope) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::ProductAdded, event).await
    }

    pub async fn payment_info_entered(
        &self,
        event: &EventEnvelope,
    ) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::PaymentInfoEntered, event).await
    }

    pub async fn checkout_started(
        &self,
        event: &EventEnvelope,
    ) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::CheckoutStarted, event).await
    }

    pub async fn order_completed(
        &self,
        event: &EventEnvelope,
    ) -> AppEventsResult<DeliveryOutcome> {
        self.send(EventCategory::OrderCompleted, event).await
    }
}
