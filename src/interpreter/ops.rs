//! Scalar arithmetic, comparison, and membership helpers shared by the
//! interpreter's `Binary`/`Unary` dispatch.
//!
//! Integer overflow wraps rather than panicking or promoting to a bigger
//! type — `Value::Int`/`Value::Uint` stay fixed-width, and wrapping keeps
//! arithmetic a total function instead of something that can panic deep
//! inside an expression tree.

use crate::error::EvalError;
use crate::value::{partial_compare, Value};

pub fn add(a: &Value, b: &Value) -> Result<Value, EvalError> {
    use Value::*;
    match (a, b) {
        (Int(x), Int(y)) => Ok(Int(x.wrapping_add(*y))),
        (Uint(x), Uint(y)) => Ok(Uint(x.wrapping_add(*y))),
        (Double(_), _) | (_, Double(_)) if a.is_numeric() && b.is_numeric() => {
            Ok(Double(a.as_f64().unwrap() + b.as_f64().unwrap()))
        }
        (String(_), _) | (_, String(_)) => Ok(String(format!("{a}{b}"))),
        (Bytes(x), Bytes(y)) => Ok(Bytes([x.as_slice(), y.as_slice()].concat())),
        (List(x), List(y)) => Ok(List([x.as_slice(), y.as_slice()].concat())),
        (Instant(t), Duration(d)) => Ok(Instant(*t + *d)),
        (Duration(d), Instant(t)) => Ok(Instant(*t + *d)),
        (Duration(x), Duration(y)) => Ok(Duration(*x + *y)),
        _ => Err(type_mismatch("+", a, b)),
    }
}

pub fn sub(a: &Value, b: &Value) -> Result<Value, EvalError> {
    use Value::*;
    match (a, b) {
        (Int(x), Int(y)) => Ok(Int(x.wrapping_sub(*y))),
        (Uint(x), Uint(y)) => Ok(Uint(x.wrapping_sub(*y))),
        (Double(_), _) | (_, Double(_)) if a.is_numeric() && b.is_numeric() => {
            Ok(Double(a.as_f64().unwrap() - b.as_f64().unwrap()))
        }
        (Instant(x), Instant(y)) => Ok(Duration(*x - *y)),
        (Instant(t), Duration(d)) => Ok(Instant(*t - *d)),
        (Duration(x), Duration(y)) => Ok(Duration(*x - *y)),
        _ => Err(type_mismatch("-", a, b)),
    }
}

pub fn mul(a: &Value, b: &Value) -> Result<Value, EvalError> {
    use Value::*;
    match (a, b) {
        (Int(x), Int(y)) => Ok(Int(x.wrapping_mul(*y))),
        (Uint(x), Uint(y)) => Ok(Uint(x.wrapping_mul(*y))),
        (Double(_), _) | (_, Double(_)) if a.is_numeric() && b.is_numeric() => {
            Ok(Double(a.as_f64().unwrap() * b.as_f64().unwrap()))
        }
        (String(s), n @ (Int(_) | Uint(_))) | (n @ (Int(_) | Uint(_)), String(s)) => repeat_string(s, n),
        (List(items), n @ (Int(_) | Uint(_))) | (n @ (Int(_) | Uint(_)), List(items)) => repeat_sequence(items, n),
        _ => Err(type_mismatch("*", a, b)),
    }
}

fn repeat_count(n: &Value) -> Result<usize, EvalError> {
    let count = match n {
        Value::Int(i) => *i,
        Value::Uint(u) => *u as i64,
        _ => unreachable!("repeat_count is only called with a numeric repeat operand"),
    };
    if count < 0 {
        return Err(EvalError::bad_argument("*", "repeat count must not be negative"));
    }
    Ok(count as usize)
}

fn repeat_string(s: &str, n: &Value) -> Result<Value, EvalError> {
    Ok(Value::String(s.repeat(repeat_count(n)?)))
}

fn repeat_sequence(items: &[Value], n: &Value) -> Result<Value, EvalError> {
    let count = repeat_count(n)?;
    let mut result = Vec::with_capacity(items.len() * count);
    for _ in 0..count {
        result.extend_from_slice(items);
    }
    Ok(Value::List(result))
}

/// Always produces a `Double` — unlike `+`/`-`/`*`, `/` never stays in
/// integer arithmetic, so integer operands widen before dividing.
pub fn div(a: &Value, b: &Value) -> Result<Value, EvalError> {
    use Value::*;
    match (a, b) {
        (Int(_), Int(0)) | (Uint(_), Uint(0)) => Err(EvalError::DivisionByZero),
        _ if a.is_numeric() && b.is_numeric() => Ok(Double(a.as_f64().unwrap() / b.as_f64().unwrap())),
        _ => Err(type_mismatch("/", a, b)),
    }
}

pub fn rem(a: &Value, b: &Value) -> Result<Value, EvalError> {
    use Value::*;
    match (a, b) {
        (Int(_), Int(0)) | (Uint(_), Uint(0)) => Err(EvalError::ModuloByZero),
        (Int(x), Int(y)) => Ok(Int(x.wrapping_rem(*y))),
        (Uint(x), Uint(y)) => Ok(Uint(x.wrapping_rem(*y))),
        _ => Err(type_mismatch("%", a, b)),
    }
}

pub fn negate(a: &Value) -> Result<Value, EvalError> {
    match a {
        Value::Int(x) => Ok(Value::Int(x.wrapping_neg())),
        Value::Double(x) => Ok(Value::Double(-x)),
        other => Err(EvalError::type_mismatch(format!(
            "cannot negate a value of type {}",
            other.type_name()
        ))),
    }
}

pub fn compare(op: &str, a: &Value, b: &Value) -> Result<Value, EvalError> {
    let ordering = partial_compare(a, b).ok_or_else(|| type_mismatch(op, a, b))?;
    let result = match op {
        "<" => ordering.is_lt(),
        "<=" => ordering.is_le(),
        ">" => ordering.is_gt(),
        ">=" => ordering.is_ge(),
        _ => unreachable!("compare is only called with relational operators"),
    };
    Ok(Value::Bool(result))
}

/// `needle in haystack`: deep equality membership against a list, substring
/// search against a string, or key presence against a map — the explicit
/// deep-equality override for sequences takes priority over any
/// reference-identity shortcut a naive implementation might reach for.
pub fn contains(needle: &Value, haystack: &Value) -> Result<Value, EvalError> {
    match haystack {
        Value::List(items) => Ok(Value::Bool(items.iter().any(|item| item == needle))),
        Value::Map(map) => match needle.as_map_key() {
            Some(key) => Ok(Value::Bool(map.contains_key(&key))),
            None => Ok(Value::Bool(false)),
        },
        Value::String(haystack) => match needle {
            Value::String(needle) => Ok(Value::Bool(haystack.contains(needle.as_str()))),
            _ => Err(EvalError::type_mismatch(format!(
                "cannot test a value of type {} for membership in a string",
                needle.type_name()
            ))),
        },
        other => Err(EvalError::type_mismatch(format!(
            "cannot test membership in a value of type {}",
            other.type_name()
        ))),
    }
}

fn type_mismatch(op: &str, a: &Value, b: &Value) -> EvalError {
    EvalError::type_mismatch(format!(
        "cannot apply '{op}' to {} and {}",
        a.type_name(),
        b.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_always_widens_to_double() {
        assert_eq!(div(&Value::Int(15), &Value::Int(3)).unwrap(), Value::Double(5.0));
        assert_eq!(div(&Value::Uint(7), &Value::Uint(2)).unwrap(), Value::Double(3.5));
    }

    #[test]
    fn division_by_zero_still_errors_before_widening() {
        assert_eq!(div(&Value::Int(1), &Value::Int(0)).unwrap_err(), EvalError::DivisionByZero);
    }

    #[test]
    fn add_concatenates_a_string_with_a_non_string_operand() {
        assert_eq!(
            add(&Value::String("id-".into()), &Value::Int(5)).unwrap(),
            Value::String("id-5".into())
        );
        assert_eq!(
            add(&Value::Int(5), &Value::String("-id".into())).unwrap(),
            Value::String("5-id".into())
        );
    }

    #[test]
    fn mul_repeats_a_string() {
        assert_eq!(mul(&Value::String("ab".into()), &Value::Int(3)).unwrap(), Value::String("ababab".into()));
        assert_eq!(mul(&Value::Int(0), &Value::String("ab".into())).unwrap(), Value::String(String::new()));
    }

    #[test]
    fn mul_repeats_a_sequence() {
        let items = vec![Value::Int(1), Value::Int(2)];
        assert_eq!(
            mul(&Value::List(items), &Value::Int(2)).unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn mul_rejects_a_negative_repeat_count() {
        assert!(mul(&Value::String("ab".into()), &Value::Int(-1)).is_err());
    }
}
