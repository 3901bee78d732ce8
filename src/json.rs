//! Conversion between [`Value`] and [`serde_json::Value`], for embedding
//! contexts that hand environment data in from a JSON payload (an HTTP
//! request body, a config blob) and want the result handed back out the
//! same way.
//!
//! The mapping is lossy in both directions: JSON has no `bytes`, `uint`,
//! `timestamp`, or `duration` kind, and CEL values have no distinction
//! between "integer that happens to be whole" and "float" the way
//! `serde_json::Number` does internally. `to_json` renders `bytes` as a
//! plain JSON string of its UTF-8-lossy content and `timestamp`/`duration`
//! as RFC3339/`Display` strings, matching how [`Value`]'s own `Display`
//! impl already renders them.

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::value::{MapKey, Value};

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Uint(u) => Json::from(*u),
        Value::Double(d) => serde_json::Number::from_f64(*d).map(Json::Number).unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(String::from_utf8_lossy(b).into_owned()),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), value_to_json(v)))
                .collect(),
        ),
        Value::Instant(t) => Json::String(t.to_rfc3339()),
        Value::Duration(_) => Json::String(value.to_string()),
    }
}

/// Parses `json` into a [`Value`]: objects become `Map`s keyed by string,
/// numbers that fit in `i64` become `Int`, everything else numeric becomes
/// `Double`. There is no way to address `uint`, `bytes`, `timestamp`, or
/// `duration` from plain JSON — callers needing those still construct them
/// directly and bind them with [`crate::Environment::set`].
pub fn value_from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n.as_i64().map(Value::Int).unwrap_or_else(|| Value::Double(n.as_f64().unwrap_or(0.0))),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(value_from_json).collect()),
        Json::Object(entries) => {
            let mut map = BTreeMap::new();
            for (k, v) in entries {
                map.insert(MapKey::String(k.clone()), value_from_json(v));
            }
            Value::Map(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_scalars_and_lists() {
        let json = serde_json::json!({"a": 1, "b": [true, "x", null]});
        let value = value_from_json(&json);
        match &value {
            Value::Map(map) => {
                assert_eq!(map.get(&MapKey::String("a".into())), Some(&Value::Int(1)));
            }
            other => panic!("expected a map, got {other:?}"),
        }
        let back = value_to_json(&value);
        assert_eq!(back["a"], serde_json::json!(1));
        assert_eq!(back["b"][0], serde_json::json!(true));
    }

    #[test]
    fn floats_without_f64_representation_become_null() {
        assert_eq!(value_to_json(&Value::Double(f64::NAN)), Json::Null);
    }
}
