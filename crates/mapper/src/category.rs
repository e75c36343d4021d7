//! Semantic event categories and the fixed dispatch table that decides how
//! each one is shaped for the destination.

use std::fmt;
use std::str::FromStr;

use app_events_core::{EventEnvelope, Settings};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::context::extract_context;
use crate::custom_params::{build_custom_event, ItemScope};
use crate::event_name::resolve_event_name;
use crate::reject::reject_unset;

/// Activity type for events carrying `custom_events`.
pub const CUSTOM_APP_EVENTS: &str = "CUSTOM_APP_EVENTS";
/// Activity type for installs.
pub const MOBILE_APP_INSTALL: &str = "MOBILE_APP_INSTALL";

/// Recognised event categories. Anything unrecognised is a generic [`Track`].
///
/// [`Track`]: EventCategory::Track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Track,
    ApplicationInstalled,
    ApplicationOpened,
    ProductsSearched,
    ProductViewed,
    ProductAddedToWishlist,
    ProductAdded,
    PaymentInfoEntered,
    CheckoutStarted,
    OrderCompleted,
}

/// Where the `_eventName` of the custom event comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventNameSource {
    /// The inbound event name after settings renames and sanitizing.
    Resolved,
    /// A fixed destination event name.
    Fixed(&'static str),
}

/// One row of the dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub activity: &'static str,
    /// `None` when the payload carries no `custom_events`.
    pub custom_event: Option<EventNameSource>,
    pub scope: ItemScope,
    /// Literal fields stamped onto the custom event.
    pub augment: &'static [(&'static str, i64)],
}

impl Route {
    const fn custom(name: EventNameSource, scope: ItemScope) -> Self {
        Self {
            activity: CUSTOM_APP_EVENTS,
            custom_event: Some(name),
            scope,
            augment: &[],
        }
    }
}

impl EventCategory {
    pub const ALL: [EventCategory; 10] = [
        EventCategory::Track,
        EventCategory::ApplicationInstalled,
        EventCategory::ApplicationOpened,
        EventCategory::ProductsSearched,
        EventCategory::ProductViewed,
        EventCategory::ProductAddedToWishlist,
        EventCategory::ProductAdded,
        EventCategory::PaymentInfoEntered,
        EventCategory::CheckoutStarted,
        EventCategory::OrderCompleted,
    ];

    /// Classify an inbound event name (case-insensitive).
    pub fn from_event_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "application installed" => EventCategory::ApplicationInstalled,
            "application opened" => EventCategory::ApplicationOpened,
            "products searched" => EventCategory::ProductsSearched,
            "product viewed" => EventCategory::ProductViewed,
            "product added to wishlist" => EventCategory::ProductAddedToWishlist,
            "product added" => EventCategory::ProductAdded,
            "payment info entered" => EventCategory::PaymentInfoEntered,
            "checkout started" | "order started" => EventCategory::CheckoutStarted,
            "order completed" => EventCategory::OrderCompleted,
            _ => EventCategory::Track,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Track => "track",
            EventCategory::ApplicationInstalled => "application_installed",
            EventCategory::ApplicationOpened => "application_opened",
            EventCategory::ProductsSearched => "products_searched",
            EventCategory::ProductViewed => "product_viewed",
            EventCategory::ProductAddedToWishlist => "product_added_to_wishlist",
            EventCategory::ProductAdded => "product_added",
            EventCategory::PaymentInfoEntered => "payment_info_entered",
            EventCategory::CheckoutStarted => "checkout_started",
            EventCategory::OrderCompleted => "order_completed",
        }
    }

    /// The dispatch table.
    pub fn route(&self) -> Route {
        use EventNameSource::{Fixed, Resolved};
        use ItemScope::{Aggregate, Single};

        match self {
            EventCategory::Track => Route::custom(Resolved, Aggregate),
            EventCategory::ApplicationInstalled => Route {
                activity: MOBILE_APP_INSTALL,
                custom_event: None,
                scope: Single,
                augment: &[],
            },
            EventCategory::ApplicationOpened => {
                Route::custom(Fixed("fb_mobile_activate_app"), Aggregate)
            }
            EventCategory::ProductsSearched => Route::custom(Fixed("fb_mobile_search"), Aggregate),
            EventCategory::ProductViewed => Route::custom(Fixed("fb_mobile_content_view"), Single),
            EventCategory::ProductAddedToWishlist => {
                Route::custom(Fixed("fb_mobile_add_to_wishlist"), Single)
            }
            EventCategory::ProductAdded => Route::custom(Fixed("fb_mobile_add_to_cart"), Single),
            EventCategory::PaymentInfoEntered => Route {
                augment: &[("fb_success", 1)],
                ..Route::custom(Fixed("fb_mobile_add_payment_info"), Aggregate)
            },
            EventCategory::CheckoutStarted => {
                Route::custom(Fixed("fb_mobile_initiated_checkout"), Aggregate)
            }
            EventCategory::OrderCompleted => Route::custom(Fixed("fb_mobile_purchase"), Aggregate),
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown event category '{s}'"))
    }
}

/// Map a validated event into the destination payload for `category`.
///
/// Never fails: missing optional data only removes fields.
pub fn map_event(category: EventCategory, event: &EventEnvelope, settings: &Settings) -> Value {
    let route = category.route();

    let mut payload = Map::new();
    payload.insert("event".into(), json!(route.activity));
    payload.extend(extract_context(event, settings));

    if let Some(source) = route.custom_event {
        let name = match source {
            EventNameSource::Resolved => resolve_event_name(&event.event, settings),
            EventNameSource::Fixed(name) => name.to_string(),
        };
        let mut custom = build_custom_event(event, &name, route.scope);
        for (key, value) in route.augment {
            custom.insert((*key).to_string(), json!(value));
        }
        payload.insert(
            "custom_events".into(),
            Value::Array(vec![Value::Object(custom)]),
        );
    }

    Value::Object(reject_unset(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_event_name() {
        assert_eq!(
            EventCategory::from_event_name("Order Completed"),
            EventCategory::OrderCompleted
        );
        assert_eq!(
            EventCategory::from_event_name("order started"),
            EventCategory::CheckoutStarted
        );
        assert_eq!(
            EventCategory::from_event_name("Product Added to Wishlist"),
            EventCategory::ProductAddedToWishlist
        );
        assert_eq!(
            EventCategory::from_event_name("Levelled Up"),
            EventCategory::Track
        );
    }

    #[test]
    fn test_from_str_roundtrips_every_category() {
        for category in EventCategory::ALL {
            assert_eq!(category.as_str().parse::<EventCategory>(), Ok(category));
        }
        assert!("bogus".parse::<EventCategory>().is_err());
    }

    #[test]
    fn test_every_route_sets_activity() {
        for category in EventCategory::ALL {
            let route = category.route();
            assert!(!route.activity.is_empty());
            if route.custom_event.is_some() {
                assert_eq!(route.activity, CUSTOM_APP_EVENTS);
            }
        }
        assert!(EventCategory::ApplicationInstalled
            .route()
            .custom_event
            .is_none());
    }

    #[test]
    fn test_product_centric_scopes() {
        assert_eq!(EventCategory::ProductViewed.route().scope, ItemScope::Single);
        assert_eq!(EventCategory::ProductAdded.route().scope, ItemScope::Single);
        assert_eq!(EventCategory::OrderCompleted.route().scope, ItemScope::Aggregate);
        assert_eq!(EventCategory::CheckoutStarted.route().scope, ItemScope::Aggregate);
    }

    #[test]
    fn test_payment_info_augment() {
        let route = EventCategory::PaymentInfoEntered.route();
        assert_eq!(route.augment.to_vec(), vec![("fb_success", 1_i64)]);
        assert_eq!(
            route.custom_event,
            Some(EventNameSource::Fixed("fb_mobile_add_payment_info"))
        );
    }
}
