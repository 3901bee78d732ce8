//! A compiled, reusable expression.

use std::sync::Arc;

use crate::error::EvalError;
use crate::interpreter::{self, Environment};
use crate::parser::ast::Expr;
use crate::stdlib::FunctionRegistry;

/// The result of [`crate::compile`]: a parsed AST paired with the function
/// registry it evaluates against. `Program` is `Send + Sync` — the AST is
/// immutable and the registry is required to be `Send + Sync` too — so one
/// `Program` (typically behind an `Arc`) can be evaluated concurrently by
/// any number of callers, each supplying their own [`Environment`].
#[derive(Clone)]
pub struct Program {
    ast: Arc<Expr>,
    registry: Arc<dyn FunctionRegistry>,
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program").field("ast", &self.ast).finish()
    }
}

impl Program {
    pub(crate) fn new(ast: Expr, registry: Arc<dyn FunctionRegistry>) -> Self {
        Self {
            ast: Arc::new(ast),
            registry,
        }
    }

    /// Evaluates this program's expression against `env`. Pure with respect
    /// to `env`: no binding made during evaluation (comprehension variables
    /// included) is visible to the caller afterward, and `env` itself is
    /// never mutated.
    pub fn evaluate(&self, env: &Environment) -> Result<crate::value::Value, EvalError> {
        interpreter::evaluate(&self.ast, env, self.registry.as_ref())
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }
}
