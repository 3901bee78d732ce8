//! Tree-walking evaluator over [`ast::Expr`].

pub mod ops;

use std::collections::{BTreeMap, HashMap};

use crate::error::EvalError;
use crate::parser::ast::{BinaryOp, Expr, UnaryOp};
use crate::stdlib::FunctionRegistry;
use crate::value::{MapKey, Value};

/// The variable bindings an expression evaluates against. Cheap to build
/// and entirely owned by the caller — the interpreter never mutates it, so
/// the same `Environment` can be reused (or shared across threads, wrapped
/// in whatever the caller likes) for any number of evaluations.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, returning `self` so calls chain:
    /// `Environment::new().set("x", Value::Int(1)).set("y", ...)`.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Evaluates `expr` against `env` and `registry`.
pub fn evaluate(expr: &Expr, env: &Environment, registry: &dyn FunctionRegistry) -> Result<Value, EvalError> {
    let mut interpreter = Interpreter {
        env,
        registry,
        locals: Vec::new(),
    };
    interpreter.eval(expr)
}

struct Interpreter<'a> {
    env: &'a Environment,
    registry: &'a dyn FunctionRegistry,
    /// Comprehension-scoped bindings, innermost last. Kept separate from
    /// `env` so the caller's environment is never touched.
    locals: Vec<(String, Value)>,
}

impl<'a> Interpreter<'a> {
    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        for (bound_name, value) in self.locals.iter().rev() {
            if bound_name == name {
                return Ok(value.clone());
            }
        }
        self.env
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable { name: name.to_string() })
    }

    fn set_local(&mut self, name: &str, value: Value) {
        for entry in self.locals.iter_mut().rev() {
            if entry.0 == name {
                entry.1 = value;
                return;
            }
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Identifier { name, .. } => self.lookup(name),
            Expr::Select { operand, field, is_test, .. } => self.eval_select(operand.as_deref(), field, *is_test),
            Expr::Unary { op, operand, .. } => self.eval_unary(*op, operand),
            Expr::Binary { op, left, right, .. } => self.eval_binary(*op, left, right),
            Expr::Conditional { condition, then_branch, else_branch, .. } => {
                if self.eval_bool(condition)? {
                    self.eval(then_branch)
                } else {
                    self.eval(else_branch)
                }
            }
            Expr::Index { operand, index, .. } => self.eval_index(operand, index),
            Expr::List { elements, .. } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval(element)?);
                }
                Ok(Value::List(items))
            }
            Expr::Map { entries, .. } => {
                let mut map = BTreeMap::new();
                for entry in entries {
                    let key = self.eval(&entry.key)?;
                    let key = key
                        .as_map_key()
                        .ok_or_else(|| EvalError::type_mismatch(format!("invalid map key type {}", key.type_name())))?;
                    map.insert(key, self.eval(&entry.value)?);
                }
                Ok(Value::Map(map))
            }
            Expr::Struct { fields, .. } => {
                let mut map = BTreeMap::new();
                for field in fields {
                    map.insert(MapKey::String(field.name.clone()), self.eval(&field.value)?);
                }
                Ok(Value::Map(map))
            }
            Expr::Call { target, function, args, .. } => self.eval_call(target.as_deref(), function, args),
            Expr::Comprehension {
                iter_var,
                range,
                accu_var,
                init,
                condition,
                step,
                result,
                ..
            } => self.eval_comprehension(iter_var, range, accu_var, init, condition, step, result),
        }
    }

    fn eval_bool(&mut self, expr: &Expr) -> Result<bool, EvalError> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::type_mismatch(format!(
                "expected bool, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval_select(&mut self, operand: Option<&Expr>, field: &str, is_test: bool) -> Result<Value, EvalError> {
        let Some(operand) = operand else {
            return if is_test {
                Ok(Value::Bool(self.env.get(field).is_some()))
            } else {
                self.lookup(field)
            };
        };
        let value = self.eval(operand)?;
        match &value {
            Value::Null if is_test => Ok(Value::Bool(false)),
            Value::Map(map) => {
                let key = MapKey::String(field.to_string());
                if is_test {
                    Ok(Value::Bool(map.contains_key(&key)))
                } else {
                    map.get(&key).cloned().ok_or_else(|| EvalError::NoSuchField {
                        field: field.to_string(),
                        on: "map",
                    })
                }
            }
            other if is_test => Err(EvalError::type_mismatch(format!(
                "cannot test field presence on a value of type {}",
                other.type_name()
            ))),
            other => Err(EvalError::NoSuchField {
                field: field.to_string(),
                on: other.type_name(),
            }),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value, EvalError> {
        let value = self.eval(operand)?;
        match op {
            UnaryOp::Not => match value {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(EvalError::type_mismatch(format!(
                    "cannot negate a value of type {} with '!'",
                    other.type_name()
                ))),
            },
            UnaryOp::Negate => ops::negate(&value),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value, EvalError> {
        match op {
            BinaryOp::And => {
                if !self.eval_bool(left)? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval_bool(right)?))
            }
            BinaryOp::Or => {
                if self.eval_bool(left)? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval_bool(right)?))
            }
            _ => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                match op {
                    BinaryOp::Add => ops::add(&l, &r),
                    BinaryOp::Sub => ops::sub(&l, &r),
                    BinaryOp::Mul => ops::mul(&l, &r),
                    BinaryOp::Div => ops::div(&l, &r),
                    BinaryOp::Mod => ops::rem(&l, &r),
                    BinaryOp::Eq => Ok(Value::Bool(l == r)),
                    BinaryOp::Ne => Ok(Value::Bool(l != r)),
                    BinaryOp::Lt => ops::compare("<", &l, &r),
                    BinaryOp::Le => ops::compare("<=", &l, &r),
                    BinaryOp::Gt => ops::compare(">", &l, &r),
                    BinaryOp::Ge => ops::compare(">=", &l, &r),
                    BinaryOp::In => ops::contains(&l, &r),
                    BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
                }
            }
        }
    }

    fn eval_index(&mut self, operand: &Expr, index: &Expr) -> Result<Value, EvalError> {
        let operand_value = self.eval(operand)?;
        let index_value = self.eval(index)?;
        match &operand_value {
            Value::List(items) => {
                let i = match index_value {
                    Value::Int(i) => i,
                    Value::Uint(u) => u as i64,
                    other => {
                        return Err(EvalError::type_mismatch(format!(
                            "list index must be an integer, got {}",
                            other.type_name()
                        )))
                    }
                };
                if i < 0 || i as usize >= items.len() {
                    return Err(EvalError::IndexOutOfBounds { index: i, len: items.len() });
                }
                Ok(items[i as usize].clone())
            }
            Value::Map(map) => {
                let key = index_value
                    .as_map_key()
                    .ok_or_else(|| EvalError::type_mismatch(format!("invalid map key type {}", index_value.type_name())))?;
                map.get(&key).cloned().ok_or_else(|| EvalError::KeyNotFound { key: key.to_string() })
            }
            other => Err(EvalError::type_mismatch(format!("cannot index a value of type {}", other.type_name()))),
        }
    }

    fn eval_call(&mut self, target: Option<&Expr>, function: &str, args: &[Expr]) -> Result<Value, EvalError> {
        if target.is_none() && function == "has" && args.len() == 1 {
            return self.eval_has(&args[0]);
        }
        if target.is_none() && function == "__append__" && args.len() == 2 {
            let mut list = match self.eval(&args[0])? {
                Value::List(items) => items,
                other => {
                    return Err(EvalError::type_mismatch(format!(
                        "internal: expected a list accumulator, got {}",
                        other.type_name()
                    )))
                }
            };
            list.push(self.eval(&args[1])?);
            return Ok(Value::List(list));
        }

        let evaluated_args = args.iter().map(|a| self.eval(a)).collect::<Result<Vec<_>, _>>()?;
        match target {
            Some(target_expr) => {
                let receiver = self.eval(target_expr)?;
                self.registry.call_method(function, &receiver, evaluated_args)
            }
            None => self.registry.call_function(function, evaluated_args),
        }
    }

    /// `has(operand.field)`: true when the field is present, false when
    /// absent, never an error for a missing field — that's the entire
    /// point of the macro.
    fn eval_has(&mut self, arg: &Expr) -> Result<Value, EvalError> {
        match arg {
            Expr::Select { operand, field, .. } => self.eval_select(operand.as_deref(), field, true),
            other => Err(EvalError::bad_argument("has", format!("expected a field selection, got {other:?}"))),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn eval_comprehension(
        &mut self,
        iter_var: &str,
        range: &Expr,
        accu_var: &str,
        init: &Expr,
        condition: &Expr,
        step: &Expr,
        result: &Expr,
    ) -> Result<Value, EvalError> {
        let items = self.eval_iterable(range)?;
        let base_len = self.locals.len();

        let outcome = (|| {
            let accu = self.eval(init)?;
            self.locals.push((accu_var.to_string(), accu));
            for item in items {
                self.locals.push((iter_var.to_string(), item));
                let keep_going = self.eval_bool(condition);
                let step_result = match keep_going {
                    Ok(true) => self.eval(step).map(Some),
                    Ok(false) => Ok(None),
                    Err(e) => Err(e),
                };
                self.locals.pop();
                match step_result {
                    Ok(Some(next)) => self.set_local(accu_var, next),
                    Ok(None) => {}
                    Err(e) => return Err(e),
                }
            }
            self.eval(result)
        })();

        self.locals.truncate(base_len);
        outcome
    }

    fn eval_iterable(&mut self, range: &Expr) -> Result<Vec<Value>, EvalError> {
        match self.eval(range)? {
            Value::List(items) => Ok(items),
            Value::Map(map) => Ok(Value::map_entries(&map).map(|(k, _)| k).collect()),
            other => Err(EvalError::type_mismatch(format!(
                "cannot iterate over a value of type {}",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::stdlib::StdRegistry;

    fn eval_str(src: &str, env: Environment) -> Result<Value, EvalError> {
        let expr = parse(src).unwrap();
        let registry = StdRegistry::new();
        evaluate(&expr, &env, &registry)
    }

    #[test]
    fn evaluates_arithmetic() {
        assert_eq!(eval_str("1 + 2 * 3", Environment::new()).unwrap(), Value::Int(7));
    }

    #[test]
    fn short_circuits_and() {
        assert_eq!(eval_str("false && (1 / 0 == 0)", Environment::new()).unwrap(), Value::Bool(false));
    }

    #[test]
    fn short_circuits_or() {
        assert_eq!(eval_str("true || (1 / 0 == 0)", Environment::new()).unwrap(), Value::Bool(true));
    }

    #[test]
    fn looks_up_environment_variables() {
        let env = Environment::new().set("x", Value::Int(41));
        assert_eq!(eval_str("x + 1", env).unwrap(), Value::Int(42));
    }

    #[test]
    fn undefined_variable_errors() {
        let err = eval_str("y", Environment::new()).unwrap_err();
        assert_eq!(err, EvalError::UndefinedVariable { name: "y".to_string() });
    }

    #[test]
    fn exists_macro_finds_a_match() {
        assert_eq!(
            eval_str("[1, 2, 3].exists(x, x > 2)", Environment::new()).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn map_macro_transforms_elements() {
        assert_eq!(
            eval_str("[1, 2, 3].map(x, x * 2)", Environment::new()).unwrap(),
            Value::List(vec![Value::Int(2), Value::Int(4), Value::Int(6)])
        );
    }

    #[test]
    fn filter_macro_keeps_matching_elements() {
        assert_eq!(
            eval_str("[1, 2, 3, 4].filter(x, x % 2 == 0)", Environment::new()).unwrap(),
            Value::List(vec![Value::Int(2), Value::Int(4)])
        );
    }

    #[test]
    fn comprehension_scope_does_not_leak() {
        let expr = parse("[1, 2].all(x, x > 0)").unwrap();
        let env = Environment::new();
        let registry = StdRegistry::new();
        let mut interpreter = Interpreter {
            env: &env,
            registry: &registry,
            locals: Vec::new(),
        };
        interpreter.eval(&expr).unwrap();
        assert!(interpreter.locals.is_empty());
    }

    #[test]
    fn comprehension_scope_restored_after_error() {
        let expr = parse("[1, 2].all(x, x / 0 == 0)").unwrap();
        let env = Environment::new();
        let registry = StdRegistry::new();
        let mut interpreter = Interpreter {
            env: &env,
            registry: &registry,
            locals: Vec::new(),
        };
        assert!(interpreter.eval(&expr).is_err());
        assert!(interpreter.locals.is_empty());
    }

    #[test]
    fn has_macro_true_for_present_field() {
        let expr = parse("has(m.a)").unwrap();
        let env = Environment::new().set("m", Value::Map(BTreeMap::from([(MapKey::String("a".into()), Value::Int(1))])));
        let registry = StdRegistry::new();
        assert_eq!(evaluate(&expr, &env, &registry).unwrap(), Value::Bool(true));
    }

    #[test]
    fn has_macro_false_for_absent_field() {
        let expr = parse("has(m.b)").unwrap();
        let env = Environment::new().set("m", Value::Map(BTreeMap::new()));
        let registry = StdRegistry::new();
        assert_eq!(evaluate(&expr, &env, &registry).unwrap(), Value::Bool(false));
    }

    #[test]
    fn has_on_a_null_operand_is_false_not_an_error() {
        let expr = parse("has(m.a)").unwrap();
        let env = Environment::new().set("m", Value::Null);
        let registry = StdRegistry::new();
        assert_eq!(evaluate(&expr, &env, &registry).unwrap(), Value::Bool(false));
    }

    #[test]
    fn index_out_of_bounds_errors() {
        let err = eval_str("[1, 2][5]", Environment::new()).unwrap_err();
        assert_eq!(err, EvalError::IndexOutOfBounds { index: 5, len: 2 });
    }

    #[test]
    fn in_operator_uses_deep_equality() {
        assert_eq!(
            eval_str("[1, 2, 3] == [1, 2, 3]", Environment::new()).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(eval_str("2 in [1, 2, 3]", Environment::new()).unwrap(), Value::Bool(true));
    }
}
