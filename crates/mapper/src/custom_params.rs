//! Builds the single `custom_events` entry: event name, value to sum, log
//! time, currency, description, search string, item count and content ids,
//! followed by the remaining scalar properties under destination keys.

use app_events_core::EventEnvelope;
use serde_json::{json, Map, Value};

use crate::reject::is_unset;

/// Source property -> destination key, applied to merged properties.
const RENAMES: &[(&str, &str)] = &[
    ("currency", "fb_currency"),
    ("name", "fb_description"),
    ("id", "fb_content_id"),
    ("category", "fb_content_type"),
    ("query", "fb_search_string"),
];

/// Properties fully consumed by the explicit fields and never merged.
const CONSUMED: &[&str] = &[
    "revenue",
    "price",
    "query",
    "quantity",
    "products",
    "description",
];

/// Where item counts and content ids come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemScope {
    /// Top-level `quantity` / `id` only (product-centric events).
    Single,
    /// Fall back to aggregating `products` when top-level values are absent.
    Aggregate,
}

fn rename(key: &str) -> &str {
    RENAMES
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
        .unwrap_or(key)
}

fn present<'a>(properties: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    properties.get(key).filter(|v| !is_unset(v))
}

/// Finite numeric view of a property; numeric strings are accepted.
fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Emit whole numbers as integers so `5` stays `5` on the wire.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        other => as_number(other).map(number_value),
    }
}

/// `revenue` when numeric, otherwise `price`.
pub fn value_to_sum(properties: &Map<String, Value>) -> Option<Value> {
    ["revenue", "price"]
        .iter()
        .find_map(|key| present(properties, key).and_then(numeric))
}

/// Top-level `quantity` verbatim; under [`ItemScope::Aggregate`] otherwise the
/// sum of `products[].quantity`. Products without a quantity do not count.
pub fn item_count(properties: &Map<String, Value>, scope: ItemScope) -> Option<Value> {
    if let Some(quantity) = present(properties, "quantity") {
        return Some(quantity.clone());
    }
    if scope == ItemScope::Single {
        return None;
    }

    let products = properties.get("products")?.as_array()?;
    let quantities: Vec<f64> = products
        .iter()
        .filter_map(|p| p.get("quantity").and_then(as_number))
        .collect();
    if quantities.is_empty() {
        return None;
    }
    Some(number_value(quantities.iter().sum()))
}

/// Ordered ids of the products that carry one; otherwise the top-level `id`.
pub fn content_ids(properties: &Map<String, Value>, scope: ItemScope) -> Option<Value> {
    if scope == ItemScope::Aggregate {
        if let Some(products) = properties.get("products").and_then(Value::as_array) {
            let ids: Vec<Value> = products
                .iter()
                .filter_map(|p| p.get("id"))
                .filter(|id| !is_unset(id))
                .cloned()
                .collect();
            if !ids.is_empty() {
                return Some(Value::Array(ids));
            }
        }
    }
    present(properties, "id").cloned()
}

fn insert_opt(out: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = value {
        out.insert(key.to_string(), v);
    }
}

/// Build the `custom_events` entry for `event` under the already resolved
/// `event_name`.
pub fn build_custom_event(
    event: &EventEnvelope,
    event_name: &str,
    scope: ItemScope,
) -> Map<String, Value> {
    let props = &event.properties;
    let mut custom = Map::new();

    custom.insert("_eventName".into(), json!(event_name));
    insert_opt(&mut custom, "_valueToSum", value_to_sum(props));
    custom.insert("_logTime".into(), json!(event.timestamp.timestamp()));
    // Never defaulted: an absent currency must stay absent.
    insert_opt(&mut custom, "fb_currency", present(props, "currency").cloned());
    insert_opt(
        &mut custom,
        "fb_description",
        present(props, "description")
            .or_else(|| present(props, "name"))
            .cloned(),
    );
    insert_opt(&mut custom, "fb_search_string", present(props, "query").cloned());
    insert_opt(&mut custom, "fb_num_items", item_count(props, scope));
    insert_opt(&mut custom, "fb_content_id", content_ids(props, scope));

    for (key, value) in props {
        if CONSUMED.contains(&key.as_str()) || value.is_array() || value.is_object() {
            continue;
        }
        custom
            .entry(rename(key).to_string())
            .or_insert_with(|| value.clone());
    }

    if let Some(content_id) = event.context.content_id_override() {
        custom.insert("fb_content_id".into(), content_id.clone());
    }
    if let Some(content_type) = event.context.content_type_override() {
        custom.insert("fb_content_type".into(), json!(content_type));
    }

    custom
}
