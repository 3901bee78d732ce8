//! An embeddable evaluator for a Common-Expression-Language-shaped
//! predicate and projection language: lex, parse, and tree-walk a small
//! expression grammar over a dynamically-typed value lattice.
//!
//! ```
//! use celite::{compile, Environment, Value};
//!
//! let program = compile("age >= 18 && country in allowed").unwrap();
//! let env = Environment::new()
//!     .set("age", Value::Int(21))
//!     .set("country", Value::String("NZ".into()))
//!     .set("allowed", Value::List(vec![Value::String("NZ".into())]));
//! assert_eq!(program.evaluate(&env).unwrap(), Value::Bool(true));
//! ```

pub mod error;
pub mod facade;
pub mod interpreter;
pub mod json;
pub mod lexer;
pub mod parser;
pub mod program;
pub mod span;
pub mod stdlib;
pub mod value;

pub use error::{CelError, EvalError, SyntaxError};
pub use facade::{compile, compile_with_registry, eval};
pub use interpreter::Environment;
pub use json::{value_from_json, value_to_json};
pub use program::Program;
pub use stdlib::{FunctionRegistry, StdRegistry};
pub use value::Value;
