//! The one-shot and compile-once entry points most callers reach for first.

use std::sync::Arc;

use log::debug;

use crate::error::{CelError, SyntaxError};
use crate::interpreter::Environment;
use crate::parser;
use crate::program::Program;
use crate::stdlib::{FunctionRegistry, StdRegistry};
use crate::value::Value;

/// Parses `source` into a reusable [`Program`] evaluated against the
/// default standard library.
pub fn compile(source: &str) -> Result<Program, SyntaxError> {
    compile_with_registry(source, Arc::new(StdRegistry::new()))
}

/// Parses `source` into a [`Program`] evaluated against a caller-supplied
/// [`FunctionRegistry`], for embedding domain-specific functions alongside
/// (or instead of) the standard library.
pub fn compile_with_registry(source: &str, registry: Arc<dyn FunctionRegistry>) -> Result<Program, SyntaxError> {
    debug!("compiling expression of {} bytes", source.len());
    let ast = parser::parse(source)?;
    Ok(Program::new(ast, registry))
}

/// Parses and evaluates `source` in one step, against the default standard
/// library. Prefer [`compile`] plus [`Program::evaluate`] when the same
/// expression will be evaluated more than once — this re-parses on every
/// call.
pub fn eval(source: &str, env: &Environment) -> Result<Value, CelError> {
    let program = compile(source)?;
    Ok(program.evaluate(env)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn compiles_and_evaluates_once() {
        let result = eval("1 + 2", &Environment::new()).unwrap();
        assert_eq!(result, Value::Int(3));
    }

    #[test]
    fn compile_once_evaluate_many_with_different_environments() {
        let program = compile("x * 2").unwrap();
        assert_eq!(program.evaluate(&Environment::new().set("x", Value::Int(5))).unwrap(), Value::Int(10));
        assert_eq!(program.evaluate(&Environment::new().set("x", Value::Int(21))).unwrap(), Value::Int(42));
    }

    #[test]
    fn syntax_errors_surface_before_evaluation() {
        let err = compile("1 +").unwrap_err();
        assert!(err.message.len() > 0);
    }

    #[test]
    fn eval_error_wraps_into_cel_error() {
        let err = eval("1 / 0", &Environment::new()).unwrap_err();
        assert!(matches!(err, CelError::Eval(_)));
    }

    #[test]
    fn environment_is_unchanged_after_evaluation() {
        let env = Environment::new().set("x", Value::Int(1));
        let program = compile("[1, 2].map(y, y + x)").unwrap();
        let before = format!("{env:?}");
        program.evaluate(&env).unwrap();
        assert_eq!(format!("{env:?}"), before);
    }
}
