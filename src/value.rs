//! The dynamic value lattice every expression evaluates to.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use itertools::Itertools;

/// A map key. Restricted to the hashable/orderable scalar kinds a real CEL
/// map accepts as a key: bool, int, uint, or string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Bool(bool),
    Int(i64),
    Uint(u64),
    String(String),
}

impl Display for MapKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(b) => write!(f, "{b}"),
            MapKey::Int(i) => write!(f, "{i}"),
            MapKey::Uint(u) => write!(f, "{u}"),
            MapKey::String(s) => write!(f, "{s}"),
        }
    }
}

/// The dynamically-typed value every expression reduces to.
///
/// `Map` uses a `BTreeMap` rather than a hash map so that equality and
/// iteration order are deterministic, which matters for `map`/`filter`
/// comprehensions over map values and for test assertions.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<MapKey, Value>),
    Instant(DateTime<Utc>),
    Duration(ChronoDuration),
}

impl Value {
    /// The type tag used by the `type()` builtin and in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Instant(_) => "timestamp",
            Value::Duration(_) => "duration",
        }
    }

    /// Truthiness for `&&`/`||`/`!`/the conditional operator. Only `bool`
    /// itself is ever consulted this way; everything else is a type error
    /// for the caller to raise, not something this method guesses at.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map_key(&self) -> Option<MapKey> {
        match self {
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            Value::Int(i) => Some(MapKey::Int(*i)),
            Value::Uint(u) => Some(MapKey::Uint(*u)),
            Value::String(s) => Some(MapKey::String(s.clone())),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Uint(_) | Value::Double(_))
    }

    /// Best-effort widening to `f64`, used by mixed-numeric comparisons and
    /// arithmetic promotion. Not used for exact integer arithmetic, which
    /// stays in `i64`/`u64` to preserve wrapping semantics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Uint(u) => Some(*u as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }
}

fn map_key_to_value(key: &MapKey) -> Value {
    match key {
        MapKey::Bool(b) => Value::Bool(*b),
        MapKey::Int(i) => Value::Int(*i),
        MapKey::Uint(u) => Value::Uint(*u),
        MapKey::String(s) => Value::String(s.clone()),
    }
}

impl Value {
    pub fn map_entries(map: &BTreeMap<MapKey, Value>) -> impl Iterator<Item = (Value, &Value)> {
        map.iter().map(|(k, v)| (map_key_to_value(k), v))
    }
}

/// Deep structural equality across numeric kinds: `1 == 1u == 1.0`.
/// Values of incompatible non-numeric kinds are simply unequal, never an
/// error — equality never fails.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Instant(a), Instant(b)) => a == b,
            (Duration(a), Duration(b)) => a == b,
            (Int(_) | Uint(_) | Double(_), Int(_) | Uint(_) | Double(_)) => {
                numeric_cmp(self, other) == Some(Ordering::Equal)
            }
            _ => false,
        }
    }
}

/// Exact comparison between two integer-ish values without going through
/// `f64`, used when both sides are representable without precision loss.
fn numeric_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    use Value::*;
    match (a, b) {
        (Int(a), Int(b)) => Some(a.cmp(b)),
        (Uint(a), Uint(b)) => Some(a.cmp(b)),
        (Double(a), Double(b)) => a.partial_cmp(b),
        (Int(a), Uint(b)) => {
            if *a < 0 {
                Some(Ordering::Less)
            } else {
                Some((*a as u64).cmp(b))
            }
        }
        (Uint(a), Int(b)) => numeric_cmp(&Int(*b), &Uint(*a)).map(Ordering::reverse),
        (Int(a), Double(b)) => (*a as f64).partial_cmp(b),
        (Double(a), Int(b)) => a.partial_cmp(&(*b as f64)),
        (Uint(a), Double(b)) => (*a as f64).partial_cmp(b),
        (Double(a), Uint(b)) => a.partial_cmp(&(*b as f64)),
        _ => None,
    }
}

/// Ordering used by `<`/`<=`/`>`/`>=` and by sorting-sensitive stdlib
/// helpers. Numeric kinds, strings, timestamps, durations, bools (`false <
/// true`), and lists (element-wise, with a shorter prefix preceding the
/// longer sequence it's a prefix of) are ordered; maps and bytes are not.
pub fn partial_compare(a: &Value, b: &Value) -> Option<Ordering> {
    use Value::*;
    match (a, b) {
        (Int(_) | Uint(_) | Double(_), Int(_) | Uint(_) | Double(_)) => numeric_cmp(a, b),
        (String(a), String(b)) => Some(a.cmp(b)),
        (Bool(a), Bool(b)) => Some(a.cmp(b)),
        (Instant(a), Instant(b)) => Some(a.cmp(b)),
        (Duration(a), Duration(b)) => Some(a.cmp(b)),
        (List(a), List(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                match partial_compare(x, y)? {
                    Ordering::Equal => continue,
                    ord => return Some(ord),
                }
            }
            Some(a.len().cmp(&b.len()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn false_orders_before_true() {
        assert_eq!(partial_compare(&Value::Bool(false), &Value::Bool(true)), Some(Ordering::Less));
    }

    #[test]
    fn lists_order_lexicographically() {
        let a = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(partial_compare(&a, &b), Some(Ordering::Less));
    }

    #[test]
    fn a_shorter_prefix_precedes_the_longer_list() {
        let prefix = Value::List(vec![Value::Int(1)]);
        let longer = Value::List(vec![Value::Int(1), Value::Int(0)]);
        assert_eq!(partial_compare(&prefix, &longer), Some(Ordering::Less));
    }

    #[test]
    fn maps_have_no_ordering() {
        assert_eq!(partial_compare(&Value::Map(BTreeMap::new()), &Value::Map(BTreeMap::new())), None);
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}u"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "b\"{}\"", String::from_utf8_lossy(b)),
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Map(entries) => {
                write!(f, "{{{}}}", entries.iter().map(|(k, v)| format!("{k}: {v}")).join(", "))
            }
            Value::Instant(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Duration(d) => write!(f, "{}s", d.num_milliseconds() as f64 / 1000.0),
        }
    }
}
