//! Inbound event envelope and destination settings.
//!
//! The envelope mirrors the analytics "track" message: a named event, a
//! timestamp, free-form `properties` and a nested `context`. Context fields
//! are typed so the mapper never walks arbitrary JSON paths; every accessor
//! returns `None` when any intermediate object is absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Library name reported by the native Android SDK.
pub const ANDROID_NATIVE_LIBRARY: &str = "analytics-android";

/// Placeholder some settings UIs store for "no rename".
pub const NULL_RENAME_PLACEHOLDER: &str = "null";

/// An inbound analytics event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Message type; only `track` is deliverable.
    #[serde(rename = "type", default = "default_message_type")]
    pub message_type: String,
    pub event: String,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub anonymous_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub context: EventContext,
}

fn default_message_type() -> String {
    "track".to_string()
}

impl EventEnvelope {
    /// Build a `track` event with empty properties and context.
    pub fn track(event: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            message_type: default_message_type(),
            event: event.into(),
            message_id: None,
            user_id: None,
            anonymous_id: None,
            timestamp,
            properties: Map::new(),
            context: EventContext::default(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }

    pub fn is_track(&self) -> bool {
        self.message_type.eq_ignore_ascii_case("track")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(default)]
    pub app: Option<AppInfo>,
    #[serde(default)]
    pub device: Option<DeviceInfo>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub network: Option<NetworkInfo>,
    #[serde(default)]
    pub library: Option<LibraryInfo>,
    #[serde(default)]
    pub referrer: Option<ReferrerInfo>,
    #[serde(default, rename = "Facebook App Events")]
    pub destination: Option<DestinationOverrides>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    #[serde(default)]
    pub name: Option<String>,
    /// Bundle id (iOS) or package name (Android).
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub build: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Platform, e.g. "ios" or "android".
    #[serde(default, rename = "type")]
    pub platform: Option<String>,
    /// Vendor id on iOS, Android id on Android.
    #[serde(default)]
    pub id: Option<String>,
    /// Legacy iOS advertising identifier field.
    #[serde(default)]
    pub idfa: Option<String>,
    #[serde(default)]
    pub advertising_id: Option<String>,
    #[serde(default)]
    pub ad_tracking_enabled: Option<bool>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkInfo {
    #[serde(default)]
    pub carrier: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferrerInfo {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Caller-supplied overrides that win over derived values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationOverrides {
    #[serde(default)]
    pub content_id: Option<Value>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Device platform, as far as the mapper cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Other,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl EventContext {
    pub fn platform(&self) -> Platform {
        match self.device.as_ref().and_then(|d| non_empty(&d.platform)) {
            Some(p) if p.eq_ignore_ascii_case("ios") => Platform::Ios,
            Some(p) if p.eq_ignore_ascii_case("android") => Platform::Android,
            _ => Platform::Other,
        }
    }

    /// Legacy `idfa` first, then the generic `advertisingId`.
    pub fn advertising_id(&self) -> Option<&str> {
        let device = self.device.as_ref()?;
        non_empty(&device.idfa).or_else(|| non_empty(&device.advertising_id))
    }

    pub fn ad_tracking_enabled(&self) -> Option<bool> {
        self.device.as_ref().and_then(|d| d.ad_tracking_enabled)
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device.as_ref().and_then(|d| non_empty(&d.id))
    }

    pub fn app_namespace(&self) -> Option<&str> {
        self.app.as_ref().and_then(|a| non_empty(&a.namespace))
    }

    pub fn app_version(&self) -> Option<&str> {
        self.app.as_ref().and_then(|a| non_empty(&a.version))
    }

    pub fn referrer_type(&self) -> Option<&str> {
        self.referrer.as_ref().and_then(|r| non_empty(&r.kind))
    }

    pub fn library_name(&self) -> Option<&str> {
        self.library.as_ref().and_then(|l| non_empty(&l.name))
    }

    pub fn content_id_override(&self) -> Option<&Value> {
        self.destination
            .as_ref()
            .and_then(|d| d.content_id.as_ref())
            .filter(|v| !v.is_null())
    }

    pub fn content_type_override(&self) -> Option<&str> {
        self.destination
            .as_ref()
            .and_then(|d| non_empty(&d.content_type))
    }
}

/// How strictly device consent is enforced before delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentPolicy {
    /// Accept events without an advertising id; tracking flags default on.
    #[default]
    Lenient,
    /// Mobile events need an advertising id and must not have opted out.
    RequireAdvertisingId,
}

/// Destination settings. Immutable for the lifetime of a call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, alias = "appId")]
    pub app_id: Option<String>,
    /// Optional account-level id. Checked for blankness, never emitted: the
    /// payload's `advertiser_id` is the device advertising id.
    #[serde(default, alias = "advertiserId")]
    pub advertiser_id: Option<String>,
    /// Source event name -> destination event name.
    #[serde(default, alias = "appEvents")]
    pub app_events: HashMap<String, String>,
    #[serde(default, alias = "consentPolicy")]
    pub consent_policy: ConsentPolicy,
}

impl Settings {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: Some(app_id.into()),
            ..Default::default()
        }
    }

    pub fn with_advertiser_id(mut self, advertiser_id: impl Into<String>) -> Self {
        self.advertiser_id = Some(advertiser_id.into());
        self
    }

    pub fn with_event_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.app_events.insert(from.into(), to.into());
        self
    }

    pub fn with_consent_policy(mut self, policy: ConsentPolicy) -> Self {
        self.consent_policy = policy;
        self
    }

    /// Configured app id, verbatim. Blank values count as unset.
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Rename target for exactly `event`, skipping the "null" placeholder.
    pub fn rename_for(&self, event: &str) -> Option<&str> {
        self.app_events
            .get(event)
            .map(String::as_str)
            .filter(|to| !to.is_empty() && *to != NULL_RENAME_PLACEHOLDER)
    }
}
