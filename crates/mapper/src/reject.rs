//! Reject-unset pass: the payload never carries null, empty strings or empty
//! collections.

use serde_json::{Map, Value};

/// Whether `value` counts as unset for the destination.
pub fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Recursively drop unset values. Children are pruned first, so a container
/// emptied by pruning is itself removed.
pub fn reject_unset(object: Map<String, Value>) -> Map<String, Value> {
    object
        .into_iter()
        .filter_map(|(key, value)| {
            let value = prune(value);
            (!is_unset(&value)).then_some((key, value))
        })
        .collect()
}

fn prune(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(reject_unset(fields)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(prune)
                .filter(|item| !is_unset(item))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_drops_unset_top_level() {
        let out = reject_unset(object(json!({
            "a": null,
            "b": "",
            "c": [],
            "d": {},
            "keep_zero": 0,
            "keep_false": false,
            "keep": "x"
        })));
        assert_eq!(Value::Object(out), json!({"keep_zero": 0, "keep_false": false, "keep": "x"}));
    }

    #[test]
    fn test_prunes_nested_and_collapses_emptied_containers() {
        let out = reject_unset(object(json!({
            "custom_events": [{ "_eventName": "x", "fb_currency": null }],
            "emptied": [{ "a": null }],
            "ids": ["a", "", null, "b"]
        })));
        assert_eq!(
            Value::Object(out),
            json!({
                "custom_events": [{ "_eventName": "x" }],
                "ids": ["a", "b"]
            })
        );
    }
}
