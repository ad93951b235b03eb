use crate::compiler::CompiledExpression;
use crate::context::Variables;
use crate::errors::{EvalError, Result};
use crate::library::Library;
use crate::value::Value;
use tracing::{debug, error, info, warn};

/// =========================
/// Driver (log and continue)
/// =========================

/// Static namespaces visible to expressions, in lookup order.
pub const STATIC_NAMESPACES: &[&str] = &["Math", "Variables"];
/// The instance namespace whose accessors read the current inputs.
pub const DYNAMIC_NAMESPACE: &str = "Variables";

/// Build the library every demo expression compiles against, with `random`
/// marked state dependent so it is never folded.
pub fn build_library() -> Result<Library> {
    let mut library = Library::from_names(STATIC_NAMESPACES, Some(DYNAMIC_NAMESPACE))?;
    library.mark_state_dependent("random")?;
    debug!(names = library.names().len(), "library ready");
    Ok(library)
}

/// Compile once; on failure log a caret diagnostic and return `None`.
pub fn compile(expression: &str, library: &Library) -> Option<CompiledExpression> {
    info!("Compiling expression: {expression}");
    match library.compile(expression) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            error!("--- COMPILATION ERROR: {}", describe_error(expression, &e));
            None
        }
    }
}

/// Assign the inputs and invoke. Faults are logged with the inputs and
/// turned into `None`.
pub fn run(
    expression: &str,
    compiled: Option<&CompiledExpression>,
    vars: &mut Variables,
    x: i32,
    y: i32,
    z: i32,
) -> Option<Value> {
    let Some(compiled) = compiled else {
        warn!("Missing compiled expression for `{expression}` where x={x} y={y} z={z}");
        return None;
    };
    vars.assign(x, y, z);
    match compiled.invoke(vars) {
        Ok(value) => {
            debug!("Evaluated expression: {expression} where x={x} y={y} z={z} => {value}");
            Some(value)
        }
        Err(e) => {
            warn!("Fault from compiled expression `{expression}` where x={x} y={y} z={z}: {e}");
            None
        }
    }
}

/// Fresh context and library, compile, run. Up to three inputs bind to
/// `x`, `y`, `z`; missing ones are 0.
pub fn evaluate(expression: &str, inputs: &[i32]) -> Option<Value> {
    let mut vars = Variables::new();
    if let Err(e) = vars.assign_slice(inputs) {
        warn!("Cannot evaluate `{expression}` with inputs {inputs:?}: {e}");
        return None;
    }
    let library = match build_library() {
        Ok(library) => library,
        Err(e) => {
            error!("Cannot build library for `{expression}`: {e}");
            return None;
        }
    };
    let compiled = compile(expression, &library);
    let Variables { x_var, y_var, z_var } = vars;
    run(expression, compiled.as_ref(), &mut vars, x_var, y_var, z_var)
}

/// Typed counterpart of [`evaluate`]: no logging, errors are returned.
pub fn try_evaluate(expression: &str, inputs: &[i32]) -> Result<Value> {
    let mut vars = Variables::new();
    vars.assign_slice(inputs)?;
    let compiled = build_library()?.compile(expression)?;
    compiled.invoke(&vars)
}

/// Error text, then the expression with a caret under the column when there is one.
/// This is what [`compile`] logs.
pub fn describe_error(expression: &str, err: &EvalError) -> String {
    format!("{err}\n{}", err.caret(expression))
}
