//! Device, app and platform metadata for the top level of the payload.

use app_events_core::types::{Platform, ANDROID_NATIVE_LIBRARY};
use app_events_core::{EventEnvelope, Settings};
use serde_json::{json, Map, Value};

/// Referrer type reported for Apple Search Ads installs.
const IAD_REFERRER: &str = "iad";

fn flag(enabled: bool) -> Value {
    json!(if enabled { 1 } else { 0 })
}

fn insert_str(out: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        out.insert(key.to_string(), json!(v));
    }
}

/// Extract destination context fields from `event.context`.
///
/// Tracking flags are only ever 0 on an explicit `adTrackingEnabled: false`;
/// an opted-out device would not have produced the event otherwise.
pub fn extract_context(event: &EventEnvelope, settings: &Settings) -> Map<String, Value> {
    let ctx = &event.context;
    let tracking = ctx.ad_tracking_enabled() != Some(false);
    let advertising_id = ctx.advertising_id();

    let mut out = Map::new();
    insert_str(&mut out, "app_id", settings.app_id());
    insert_str(&mut out, "advertiser_id", advertising_id);
    out.insert("advertiser_tracking_enabled".into(), flag(tracking));
    out.insert("application_tracking_enabled".into(), flag(tracking));
    insert_str(&mut out, "bundle_id", ctx.app_namespace());
    insert_str(&mut out, "build_version", ctx.app_version());

    match ctx.platform() {
        Platform::Ios => {
            let iad = ctx.referrer_type() == Some(IAD_REFERRER);
            out.insert("iad_attribution".into(), flag(iad));
            insert_str(&mut out, "idfa", advertising_id);
            out.insert("ad_tracking_enabled".into(), flag(tracking));
            insert_str(&mut out, "idfv", ctx.device_id());
        }
        Platform::Android => {
            // Placeholder; stripped by the reject-unset pass until populated.
            out.insert("install_referrer".into(), json!(""));
            insert_str(&mut out, "gaid", advertising_id);
            if ctx.library_name() == Some(ANDROID_NATIVE_LIBRARY) {
                insert_str(&mut out, "android_id", ctx.device_id());
            }
        }
        Platform::Other => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_events_core::types::{AppInfo, DeviceInfo, EventContext, LibraryInfo, ReferrerInfo};
    use chrono::{TimeZone, Utc};

    fn event_with(context: EventContext) -> EventEnvelope {
        EventEnvelope::track("Test", Utc.with_ymd_and_hms(2016, 6, 1, 0, 0, 0).unwrap())
            .with_context(context)
    }

    fn device(platform: &str) -> DeviceInfo {
        DeviceInfo {
            platform: Some(platform.into()),
            id: Some("device-1".into()),
            advertising_id: Some("ad-1".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_tracking_enabled() {
        let out = extract_context(&event_with(EventContext::default()), &Settings::new("app"));
        assert_eq!(out["app_id"], "app");
        assert_eq!(out["advertiser_tracking_enabled"], 1);
        assert_eq!(out["application_tracking_enabled"], 1);
        assert!(!out.contains_key("advertiser_id"));
        assert!(!out.contains_key("bundle_id"));
    }

    #[test]
    fn test_explicit_opt_out() {
        let context = EventContext {
            device: Some(DeviceInfo {
                ad_tracking_enabled: Some(false),
                ..device("ios")
            }),
            ..Default::default()
        };
        let out = extract_context(&event_with(context), &Settings::new("app"));
        assert_eq!(out["advertiser_tracking_enabled"], 0);
        assert_eq!(out["application_tracking_enabled"], 0);
        assert_eq!(out["ad_tracking_enabled"], 0);
    }

    #[test]
    fn test_app_fields() {
        let context = EventContext {
            app: Some(AppInfo {
                namespace: Some("com.Segment.testApp".into()),
                version: Some("2.1".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let out = extract_context(&event_with(context), &Settings::new("app"));
        assert_eq!(out["bundle_id"], "com.Segment.testApp");
        assert_eq!(out["build_version"], "2.1");
    }

    #[test]
    fn test_ios_branch() {
        let context = EventContext {
            device: Some(DeviceInfo {
                idfa: Some("idfa-1".into()),
                ..device("ios")
            }),
            referrer: Some(ReferrerInfo {
                kind: Some("iad".into()),
                id: None,
            }),
            ..Default::default()
        };
        let out = extract_context(&event_with(context), &Settings::new("app"));
        assert_eq!(out["advertiser_id"], "idfa-1");
        assert_eq!(out["idfa"], "idfa-1");
        assert_eq!(out["iad_attribution"], 1);
        assert_eq!(out["idfv"], "device-1");
        assert!(!out.contains_key("gaid"));
    }

    #[test]
    fn test_android_native_sdk_adds_device_id() {
        let context = EventContext {
            device: Some(device("android")),
            library: Some(LibraryInfo {
                name: Some("analytics-android".into()),
                version: None,
            }),
            ..Default::default()
        };
        let out = extract_context(&event_with(context), &Settings::new("app"));
        assert_eq!(out["gaid"], "ad-1");
        assert_eq!(out["android_id"], "device-1");
        assert_eq!(out["install_referrer"], "");
        assert!(!out.contains_key("idfa"));
    }

    #[test]
    fn test_android_other_library_omits_device_id() {
        let context = EventContext {
            device: Some(device("android")),
            library: Some(LibraryInfo {
                name: Some("analytics-react-native".into()),
                version: None,
            }),
            ..Default::default()
        };
        let out = extract_context(&event_with(context), &Settings::new("app"));
        assert!(!out.contains_key("android_id"));
    }
}
