//! Custom serde deserializers for the loosely typed source JSON
//!
//! All three APIs emit fields whose JSON type drifts: a repeatable field is
//! sometimes a bare value and sometimes a list, identifiers arrive as numbers
//! or strings, and nested objects show up where a list of objects was
//! expected. These deserializers absorb that drift so the raw structs can use
//! plain `#[derive(Deserialize)]` with `deserialize_with`.

use std::fmt;
use std::result;

use serde::de::{self, DeserializeOwned, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Text form of a scalar JSON value
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize an optional string field
///
/// # Behavior
///
/// * string → kept as is, including `""`
/// * number or bool → its text form
/// * `null` or missing → `None`
/// * array → its first scalar element; extra elements are dropped (logged)
/// * object → `None` (logged)
pub(crate) fn string<'de, D>(deserializer: D) -> result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringVisitor;

    impl<'de> Visitor<'de> for StringVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a scalar value")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> result::Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E: de::Error>(self, value: String) -> result::Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> result::Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> result::Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> result::Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> result::Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> result::Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(
            self,
            deserializer: D2,
        ) -> result::Result<Self::Value, D2::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> result::Result<Self::Value, A::Error> {
            let mut items = Vec::new();
            while let Some(item) = seq.next_element::<Value>()? {
                items.push(item);
            }
            if items.len() > 1 {
                warn!(len = items.len(), "Expected a single value, found a list; keeping the first");
            }
            Ok(items.first().and_then(scalar_text))
        }

        fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> result::Result<Self::Value, M::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            warn!("Expected a string, found an object; dropping field");
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringVisitor)
}

/// Deserialize a repeatable text field into an ordered list
///
/// A bare scalar becomes a one-element list; `null` or missing becomes an
/// empty list. Non-scalar list items are skipped.
pub(crate) fn string_list<'de, D>(deserializer: D) -> result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(one_or_many(value.unwrap_or(Value::Null))
        .iter()
        .filter_map(|item| {
            let text = scalar_text(item);
            if text.is_none() {
                warn!("Skipping non-scalar item in a list of strings");
            }
            text
        })
        .collect())
}

/// Deserialize a non-negative count that may arrive as a number or a numeric string
pub(crate) fn unsigned<'de, D>(deserializer: D) -> result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match &value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };
    if parsed.is_none() {
        warn!(value = ?value, "Expected a non-negative integer; dropping field");
    }
    Ok(parsed)
}

/// Deserialize a yes/no flag
///
/// Accepts JSON booleans and the strings `true`/`false`/`yes`/`no` in any case.
pub(crate) fn flag<'de, D>(deserializer: D) -> result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match &value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        Some(_) => None,
    };
    if parsed.is_none() {
        warn!(value = ?value, "Expected a boolean; dropping field");
    }
    Ok(parsed)
}

/// Deserialize a repeatable nested object into an ordered list of `T`
///
/// Each element is converted on its own; elements that are not objects, or
/// that do not fit `T`, are skipped with a warning instead of failing the
/// whole record.
pub(crate) fn element_list<'de, D, T>(deserializer: D) -> result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(one_or_many(value.unwrap_or(Value::Null))
        .into_iter()
        .filter_map(|item| {
            if !item.is_object() {
                warn!(item = %item, "Skipping nested element that is not an object");
                return None;
            }
            match serde_json::from_value(item) {
                Ok(element) => Some(element),
                Err(e) => {
                    warn!(error = %e, "Skipping nested element that could not be read");
                    None
                }
            }
        })
        .collect())
}

/// Deserialize a nested object, falling back to `T::default()` for anything else
pub(crate) fn object<'de, D, T>(deserializer: D) -> result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(item @ Value::Object(_)) => Ok(serde_json::from_value(item).unwrap_or_else(|e| {
            warn!(error = %e, "Nested object could not be read; using defaults");
            T::default()
        })),
        Some(other) => {
            warn!(item = %other, "Expected an object; using defaults");
            Ok(T::default())
        }
    }
}

/// The singleton-or-array rule: arrays stay, `null` is empty, anything else is wrapped
pub(crate) fn one_or_many(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}
