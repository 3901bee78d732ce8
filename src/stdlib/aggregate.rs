//! `max`/`min`, each accepting either a single list argument or two or more
//! scalar arguments.

use crate::error::EvalError;
use crate::value::{partial_compare, Value};
use std::cmp::Ordering;

fn operands(mut args: Vec<Value>) -> Vec<Value> {
    if args.len() == 1 {
        if let Value::List(items) = args.remove(0) {
            return items;
        }
        return vec![args.into_iter().next().unwrap()];
    }
    args
}

fn fold(args: Vec<Value>, function: &str, keep: impl Fn(Ordering) -> bool) -> Result<Value, EvalError> {
    let items = operands(args);
    let mut iter = items.into_iter();
    let mut best = iter
        .next()
        .ok_or_else(|| EvalError::bad_argument(function, "requires at least one value"))?;
    for item in iter {
        let ordering = partial_compare(&item, &best)
            .ok_or_else(|| EvalError::type_mismatch(format!("cannot compare {} and {}", item.type_name(), best.type_name())))?;
        if keep(ordering) {
            best = item;
        }
    }
    Ok(best)
}

pub fn max(args: Vec<Value>) -> Result<Value, EvalError> {
    fold(args, "max", Ordering::is_gt)
}

pub fn min(args: Vec<Value>) -> Result<Value, EvalError> {
    fold(args, "min", Ordering::is_lt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_over_variadic_args() {
        assert_eq!(max(vec![Value::Int(3), Value::Int(7), Value::Int(1)]).unwrap(), Value::Int(7));
    }

    #[test]
    fn min_over_a_list_argument() {
        assert_eq!(
            min(vec![Value::List(vec![Value::Int(3), Value::Int(-2), Value::Int(5)])]).unwrap(),
            Value::Int(-2)
        );
    }

    #[test]
    fn max_requires_at_least_one_value() {
        assert!(max(vec![Value::List(vec![])]).is_err());
    }
}
