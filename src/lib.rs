pub mod errors;
pub mod context;
pub mod engine;     // driver: build library, compile, run, evaluate
pub mod functions;  // namespace tables
pub mod library;
pub mod compiler;
pub mod value;
mod expression;
mod parser;

pub use compiler::CompiledExpression;
pub use context::Variables;
pub use engine::{build_library, compile, evaluate, run, try_evaluate};
pub use errors::{EvalError, Result};
pub use library::Library;
pub use value::{Type, Value};

/// Compile once against a library, then evaluate many input triples.
///
/// ```
/// use hello_expr::{Evaluator, Value};
///
/// let mut ev = Evaluator::new("(y + x + z)").unwrap();
/// assert_eq!(ev.eval(1, 10, 100).unwrap(), Value::Int(111));
/// ```
pub struct Evaluator {
    compiled: CompiledExpression,
    vars: Variables,
}

impl Evaluator {
    pub fn new(expression: &str) -> Result<Self> {
        Self::with_library(expression, &build_library()?)
    }

    pub fn with_library(expression: &str, library: &Library) -> Result<Self> {
        Ok(Self {
            compiled: library.compile(expression)?,
            vars: Variables::new(),
        })
    }

    pub fn eval(&mut self, x: i32, y: i32, z: i32) -> Result<Value> {
        self.vars.assign(x, y, z);
        self.compiled.invoke(&self.vars)
    }

    pub fn compiled(&self) -> &CompiledExpression {
        &self.compiled
    }
}
