//! String methods: the `contains`/`startsWith`/`endsWith`/`matches`
//! predicates plus `toLowerCase`/`toUpperCase`/`trim`/`replace`/`split`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::EvalError;
use crate::value::Value;

/// Compiled-pattern cache so a `matches()` call inside a hot loop doesn't
/// recompile the same regex on every element.
static REGEX_CACHE: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn compiled(pattern: &str) -> Result<Regex, EvalError> {
    let mut cache = REGEX_CACHE.lock().expect("regex cache mutex poisoned");
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern).map_err(|e| EvalError::bad_argument("matches", format!("invalid regex: {e}")))?;
    cache.insert(pattern.to_string(), re.clone());
    Ok(re)
}

fn as_str<'a>(value: &'a Value, function: &str) -> Result<&'a str, EvalError> {
    match value {
        Value::String(s) => Ok(s.as_str()),
        other => Err(EvalError::bad_argument(function, format!("expected a string, got {}", other.type_name()))),
    }
}

pub fn matches(receiver: &Value, pattern: &Value) -> Result<Value, EvalError> {
    let text = as_str(receiver, "matches")?;
    let pattern = as_str(pattern, "matches")?;
    Ok(Value::Bool(compiled(pattern)?.is_match(text)))
}

pub fn contains(receiver: &Value, needle: &Value) -> Result<Value, EvalError> {
    let text = as_str(receiver, "contains")?;
    let needle = as_str(needle, "contains")?;
    Ok(Value::Bool(text.contains(needle)))
}

pub fn starts_with(receiver: &Value, prefix: &Value) -> Result<Value, EvalError> {
    let text = as_str(receiver, "startsWith")?;
    let prefix = as_str(prefix, "startsWith")?;
    Ok(Value::Bool(text.starts_with(prefix)))
}

pub fn ends_with(receiver: &Value, suffix: &Value) -> Result<Value, EvalError> {
    let text = as_str(receiver, "endsWith")?;
    let suffix = as_str(suffix, "endsWith")?;
    Ok(Value::Bool(text.ends_with(suffix)))
}

pub fn to_lower_case(receiver: &Value) -> Result<Value, EvalError> {
    Ok(Value::String(as_str(receiver, "toLowerCase")?.to_lowercase()))
}

pub fn to_upper_case(receiver: &Value) -> Result<Value, EvalError> {
    Ok(Value::String(as_str(receiver, "toUpperCase")?.to_uppercase()))
}

pub fn trim(receiver: &Value) -> Result<Value, EvalError> {
    Ok(Value::String(as_str(receiver, "trim")?.trim().to_string()))
}

pub fn replace(receiver: &Value, from: &Value, to: &Value) -> Result<Value, EvalError> {
    let text = as_str(receiver, "replace")?;
    let from = as_str(from, "replace")?;
    let to = as_str(to, "replace")?;
    Ok(Value::String(text.replace(from, to)))
}

/// Splits on a literal separator, never a pattern — callers reaching for
/// regex-aware splitting should pair `matches` with their own logic instead.
pub fn split(receiver: &Value, separator: &Value) -> Result<Value, EvalError> {
    let text = as_str(receiver, "split")?;
    let separator = as_str(separator, "split")?;
    if separator.is_empty() {
        return Err(EvalError::bad_argument("split", "separator must not be empty"));
    }
    Ok(Value::List(text.split(separator).map(|part| Value::String(part.to_string())).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_caches_compiled_patterns() {
        let receiver = Value::String("hello123".into());
        let pattern = Value::String(r"^[a-z]+\d+$".into());
        assert_eq!(matches(&receiver, &pattern).unwrap(), Value::Bool(true));
        assert_eq!(matches(&receiver, &pattern).unwrap(), Value::Bool(true));
    }

    #[test]
    fn invalid_pattern_errors() {
        let receiver = Value::String("x".into());
        let pattern = Value::String("(".into());
        assert!(matches(&receiver, &pattern).is_err());
    }

    #[test]
    fn case_and_trim_helpers() {
        let receiver = Value::String(" Hello ".into());
        assert_eq!(trim(&receiver).unwrap(), Value::String("Hello".into()));
        assert_eq!(to_upper_case(&receiver).unwrap(), Value::String(" HELLO ".into()));
        assert_eq!(to_lower_case(&receiver).unwrap(), Value::String(" hello ".into()));
    }

    #[test]
    fn replace_substitutes_all_occurrences() {
        let receiver = Value::String("a.b.c".into());
        let result = replace(&receiver, &Value::String(".".into()), &Value::String("-".into())).unwrap();
        assert_eq!(result, Value::String("a-b-c".into()));
    }

    #[test]
    fn split_uses_a_literal_separator() {
        let receiver = Value::String("a,b,,c".into());
        let result = split(&receiver, &Value::String(",".into())).unwrap();
        assert_eq!(
            result,
            Value::List(vec![
                Value::String("a".into()),
                Value::String("b".into()),
                Value::String("".into()),
                Value::String("c".into()),
            ])
        );
    }
}
