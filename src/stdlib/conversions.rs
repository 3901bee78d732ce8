//! `size`/`int`/`uint`/`double`/`string`/`bool`/`bytes` conversions.

use crate::error::EvalError;
use crate::value::Value;

pub fn size(value: &Value) -> Result<Value, EvalError> {
    let n = match value {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Bytes(b) => b.len(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => {
            return Err(EvalError::type_mismatch(format!(
                "size() is not defined for a value of type {}",
                other.type_name()
            )))
        }
    };
    Ok(Value::Int(n as i64))
}

pub fn to_int(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(if *b { 1 } else { 0 })),
        Value::Uint(u) => i64::try_from(*u)
            .map(Value::Int)
            .map_err(|_| EvalError::bad_argument("int", format!("{u} does not fit in an int"))),
        Value::Double(d) => Ok(Value::Int(*d as i64)),
        Value::String(s) => s
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| EvalError::bad_argument("int", format!("'{s}' is not a valid integer"))),
        other => Err(EvalError::bad_argument("int", format!("cannot convert {} to int", other.type_name()))),
    }
}

pub fn to_uint(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Uint(u) => Ok(Value::Uint(*u)),
        Value::Int(i) => u64::try_from(*i)
            .map(Value::Uint)
            .map_err(|_| EvalError::bad_argument("uint", format!("{i} does not fit in a uint"))),
        Value::Double(d) if *d >= 0.0 => Ok(Value::Uint(*d as u64)),
        Value::Double(d) => Err(EvalError::bad_argument("uint", format!("{d} is negative"))),
        Value::String(s) => s
            .parse::<u64>()
            .map(Value::Uint)
            .map_err(|_| EvalError::bad_argument("uint", format!("'{s}' is not a valid unsigned integer"))),
        other => Err(EvalError::bad_argument("uint", format!("cannot convert {} to uint", other.type_name()))),
    }
}

pub fn to_double(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Double(d) => Ok(Value::Double(*d)),
        Value::Int(i) => Ok(Value::Double(*i as f64)),
        Value::Uint(u) => Ok(Value::Double(*u as f64)),
        Value::String(s) => s
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| EvalError::bad_argument("double", format!("'{s}' is not a valid double"))),
        other => Err(EvalError::bad_argument("double", format!("cannot convert {} to double", other.type_name()))),
    }
}

pub fn to_string_value(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Bytes(b) => String::from_utf8(b.clone())
            .map(Value::String)
            .map_err(|_| EvalError::bad_argument("string", "bytes are not valid UTF-8")),
        other => Ok(Value::String(other.to_string())),
    }
}

/// Truthiness, not string parsing: a non-zero number, a non-empty
/// string/sequence/mapping, or `bool` itself.
pub fn to_bool(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(i) => Ok(Value::Bool(*i != 0)),
        Value::Uint(u) => Ok(Value::Bool(*u != 0)),
        Value::Double(d) => Ok(Value::Bool(*d != 0.0)),
        Value::String(s) => Ok(Value::Bool(!s.is_empty())),
        Value::Bytes(b) => Ok(Value::Bool(!b.is_empty())),
        Value::List(items) => Ok(Value::Bool(!items.is_empty())),
        Value::Map(map) => Ok(Value::Bool(!map.is_empty())),
        other => Err(EvalError::bad_argument("bool", format!("cannot convert {} to bool", other.type_name()))),
    }
}

pub fn to_bytes(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Bytes(b) => Ok(Value::Bytes(b.clone())),
        Value::String(s) => Ok(Value::Bytes(s.as_bytes().to_vec())),
        other => Err(EvalError::bad_argument("bytes", format!("cannot convert {} to bytes", other.type_name()))),
    }
}
