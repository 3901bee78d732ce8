//! The function/method registry evaluated `Call` expressions dispatch
//! through, plus the standard library implementation shipped by default.

pub mod aggregate;
pub mod conversions;
pub mod strings;
pub mod time;

use log::trace;

use crate::error::EvalError;
use crate::interpreter::ops;
use crate::value::Value;

/// Dispatches global function calls (`size(x)`) and method calls
/// (`x.size()`). Swappable via [`crate::compile_with_registry`] so a caller
/// can add domain functions without forking the interpreter.
pub trait FunctionRegistry: Send + Sync {
    fn call_function(&self, name: &str, args: Vec<Value>) -> Result<Value, EvalError>;
    fn call_method(&self, name: &str, receiver: &Value, args: Vec<Value>) -> Result<Value, EvalError>;
}

/// The registry every `Program` gets unless the caller supplies their own:
/// type conversions, string/sequence methods, timestamp/duration helpers,
/// and the `max`/`min` aggregates.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdRegistry;

impl StdRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl FunctionRegistry for StdRegistry {
    fn call_function(&self, name: &str, mut args: Vec<Value>) -> Result<Value, EvalError> {
        match name {
            "size" if args.len() == 1 => conversions::size(&args.remove(0)),
            "int" if args.len() == 1 => conversions::to_int(&args.remove(0)),
            "uint" if args.len() == 1 => conversions::to_uint(&args.remove(0)),
            "double" if args.len() == 1 => conversions::to_double(&args.remove(0)),
            "string" if args.len() == 1 => conversions::to_string_value(&args.remove(0)),
            "bool" if args.len() == 1 => conversions::to_bool(&args.remove(0)),
            "bytes" if args.len() == 1 => conversions::to_bytes(&args.remove(0)),
            "type" if args.len() == 1 => Ok(Value::String(args[0].type_name().to_string())),
            "timestamp" if args.len() == 1 => time::to_timestamp(&args.remove(0)),
            "duration" if args.len() == 1 => time::to_duration(&args.remove(0)),
            "matches" if args.len() == 2 => strings::matches(&args[0], &args[1]),
            "max" if !args.is_empty() => aggregate::max(args),
            "min" if !args.is_empty() => aggregate::min(args),
            _ => {
                trace!("unknown global function '{name}' with {} args", args.len());
                Err(EvalError::UnknownFunction { name: name.to_string() })
            }
        }
    }

    fn call_method(&self, name: &str, receiver: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
        match (name, receiver) {
            ("size", _) if args.is_empty() => conversions::size(receiver),
            ("matches", Value::String(_)) if args.len() == 1 => strings::matches(receiver, &args[0]),
            ("contains", Value::String(_)) if args.len() == 1 => strings::contains(receiver, &args[0]),
            ("contains", Value::List(_) | Value::Map(_)) if args.len() == 1 => ops::contains(&args[0], receiver),
            ("startsWith", Value::String(_)) if args.len() == 1 => strings::starts_with(receiver, &args[0]),
            ("endsWith", Value::String(_)) if args.len() == 1 => strings::ends_with(receiver, &args[0]),
            ("toLowerCase", Value::String(_)) if args.is_empty() => strings::to_lower_case(receiver),
            ("toUpperCase", Value::String(_)) if args.is_empty() => strings::to_upper_case(receiver),
            ("trim", Value::String(_)) if args.is_empty() => strings::trim(receiver),
            ("replace", Value::String(_)) if args.len() == 2 => strings::replace(receiver, &args[0], &args[1]),
            ("split", Value::String(_)) if args.len() == 1 => strings::split(receiver, &args[0]),
            ("getFullYear", Value::Instant(t)) if args.is_empty() => time::get_full_year(t),
            ("getMonth", Value::Instant(t)) if args.is_empty() => time::get_month(t),
            ("getDate", Value::Instant(t)) if args.is_empty() => time::get_date(t),
            ("getDayOfWeek", Value::Instant(t)) if args.is_empty() => time::get_day_of_week(t),
            ("getHours", Value::Instant(t)) if args.is_empty() => time::get_hours(t),
            ("getMinutes", Value::Instant(t)) if args.is_empty() => time::get_minutes(t),
            ("getSeconds", Value::Instant(t)) if args.is_empty() => time::get_seconds(t),
            ("getMilliseconds", Value::Instant(t)) if args.is_empty() => time::get_milliseconds(t),
            ("getHours", Value::Duration(d)) if args.is_empty() => time::duration_hours(d),
            ("getMinutes", Value::Duration(d)) if args.is_empty() => time::duration_minutes(d),
            ("getSeconds", Value::Duration(d)) if args.is_empty() => time::duration_seconds(d),
            ("getMilliseconds", Value::Duration(d)) if args.is_empty() => time::duration_milliseconds(d),
            _ => {
                trace!("unknown method '{name}' on {}", receiver.type_name());
                Err(EvalError::UnknownMethod {
                    name: name.to_string(),
                    receiver: receiver.type_name(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_dispatches_for_strings_and_lists() {
        let registry = StdRegistry::new();
        assert_eq!(
            registry.call_function("size", vec![Value::String("abc".into())]).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            registry
                .call_function("size", vec![Value::List(vec![Value::Int(1), Value::Int(2)])])
                .unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn unknown_function_errors() {
        let registry = StdRegistry::new();
        let err = registry.call_function("nope", vec![]).unwrap_err();
        assert_eq!(err, EvalError::UnknownFunction { name: "nope".to_string() });
    }

    #[test]
    fn string_methods_dispatch_by_receiver_type() {
        let registry = StdRegistry::new();
        let receiver = Value::String("hello world".into());
        assert_eq!(
            registry.call_method("startsWith", &receiver, vec![Value::String("hello".into())]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            registry.call_method("endsWith", &receiver, vec![Value::String("world".into())]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn contains_method_dispatches_to_deep_equality_for_lists() {
        let registry = StdRegistry::new();
        let receiver = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(registry.call_method("contains", &receiver, vec![Value::Int(2)]).unwrap(), Value::Bool(true));
        assert_eq!(registry.call_method("contains", &receiver, vec![Value::Int(9)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn size_method_delegates_to_the_size_function() {
        let registry = StdRegistry::new();
        let receiver = Value::String("abcd".into());
        assert_eq!(registry.call_method("size", &receiver, vec![]).unwrap(), Value::Int(4));
    }
}
