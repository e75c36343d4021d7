//! Integration flow against an in-memory transport.

use std::sync::{Arc, Mutex};

use app_events_core::{AppEventsError, ConsentPolicy, EventEnvelope, Settings};
use app_events_delivery::{DeliveryError, FacebookAppEvents, Transport, TransportResponse};
use app_events_mapper::EventCategory;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Records every post and answers with a fixed status.
struct RecordingTransport {
    status: u16,
    posts: Mutex<Vec<(String, Value)>>,
}

impl RecordingTransport {
    fn new(status: u16) -> Arc<Self> {
        Arc::new(Self {
            status,
            posts: Mutex::new(Vec::new()),
        })
    }

    fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<TransportResponse, DeliveryError> {
        self.posts
            .lock()
            .unwrap()
            .push((path.to_string(), payload.clone()));
        if (200..300).contains(&self.status) {
            Ok(TransportResponse {
                status: self.status,
                body: "{\"success\":true}".into(),
                attempts: 1,
            })
        } else {
            Err(DeliveryError::Status {
                status: self.status,
                body: "error".into(),
            })
        }
    }
}

fn event(name: &str) -> EventEnvelope {
    serde_json::from_value(json!({
        "type": "track",
        "event": name,
        "messageId": "msg-42",
        "timestamp": "2016-06-01T10:00:00Z",
        "properties": { "revenue": 49.99, "currency": "USD" },
        "context": {
            "app": { "namespace": "com.Segment.testApp" },
            "device": { "type": "ios" }
        }
    }))
    .unwrap()
}

fn settings() -> Settings {
    Settings::new("1553537634940964").with_advertiser_id("159358")
}

#[tokio::test]
async fn test_order_completed_is_posted_to_activities() {
    let transport = RecordingTransport::new(200);
    let integration = FacebookAppEvents::new(settings(), transport.clone());

    let outcome = integration
        .order_completed(&event("Order Completed"))
        .await
        .unwrap();
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.category, EventCategory::OrderCompleted);
    assert_eq!(outcome.destination, "facebook_app_events");
    assert_eq!(outcome.message_id.as_deref(), Some("msg-42"));

    let posts = transport.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, "1553537634940964/activities");
    let custom = &posts[0].1["custom_events"][0];
    assert_eq!(custom["_eventName"], "fb_mobile_purchase");
    assert_eq!(custom["_valueToSum"], 49.99);
    assert_eq!(custom["fb_currency"], "USD");
    assert_eq!(posts[0].1, outcome.payload);
}

#[tokio::test]
async fn test_deliver_classifies_by_name() {
    let transport = RecordingTransport::new(200);
    let integration = FacebookAppEvents::new(settings(), transport.clone());

    let outcome = integration
        .deliver(&event("Application Installed"))
        .await
        .unwrap();
    assert_eq!(outcome.category, EventCategory::ApplicationInstalled);
    assert_eq!(transport.posts()[0].1["event"], "MOBILE_APP_INSTALL");
}

#[tokio::test]
async fn test_missing_configuration_never_reaches_transport() {
    let transport = RecordingTransport::new(200);
    let integration = FacebookAppEvents::new(Settings::default(), transport.clone());

    let err = integration.track(&event("Levelled Up")).await.unwrap_err();
    assert!(matches!(err, AppEventsError::MissingConfiguration(_)));
    assert!(!err.is_retryable());
    assert!(transport.posts().is_empty());
}

#[tokio::test]
async fn test_consent_rejection_never_reaches_transport() {
    let transport = RecordingTransport::new(200);
    let strict = settings().with_consent_policy(ConsentPolicy::RequireAdvertisingId);
    let integration = FacebookAppEvents::new(strict, transport.clone());

    let err = integration
        .product_viewed(&event("Product Viewed"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppEventsError::InvalidEvent(_)));
    assert!(transport.posts().is_empty());
}

#[tokio::test]
async fn test_transport_failures_are_classified() {
    let unavailable = FacebookAppEvents::new(settings(), RecordingTransport::new(503));
    let err = unavailable
        .checkout_started(&event("Checkout Started"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppEventsError::Unavailable(_)));
    assert!(err.is_retryable());

    let rejected = FacebookAppEvents::new(settings(), RecordingTransport::new(400));
    let err = rejected
        .payment_info_entered(&event("Payment Info Entered"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppEventsError::Transport(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_every_category_operation_posts_once() {
    let transport = RecordingTransport::new(200);
    let integration = FacebookAppEvents::new(settings(), transport.clone());
    let e = event("Anything");

    integration.track(&e).await.unwrap();
    integration.application_installed(&e).await.unwrap();
    integration.application_opened(&e).await.unwrap();
    integration.products_searched(&e).await.unwrap();
    integration.product_viewed(&e).await.unwrap();
    integration.product_added_to_wishlist(&e).await.unwrap();
    integration.product_added(&e).await.unwrap();
    integration.payment_info_entered(&e).await.unwrap();
    integration.checkout_started(&e).await.unwrap();
    integration.order_completed(&e).await.unwrap();

    let posts = transport.posts();
    assert_eq!(posts.len(), EventCategory::ALL.len());
    assert_eq!(posts[0].1["custom_events"][0]["_eventName"], "Anything");
    assert_eq!(posts[7].1["custom_events"][0]["fb_success"], 1);
}
