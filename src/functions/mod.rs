use crate::context::Variables;
use crate::errors::{EvalError, Result};
use crate::value::{Type, Value};
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::Arc;

pub mod math;

/// Trait for functions callable from expression text.
///
/// The compiler checks arity and argument types against `params()` before a
/// call is ever made, so `call` receives `Int` where `Int` is declared and
/// `Int` or `Float` where `Float` is declared.
pub trait Function: Send + Sync {
    fn name(&self) -> &'static str;
    fn params(&self) -> &[Type];
    fn returns(&self) -> Type;
    fn call(&self, args: &[Value]) -> Result<Value>;

    fn arity(&self) -> usize {
        self.params().len()
    }
}

/// A function backed by a plain `fn` pointer.
#[derive(Clone, Copy)]
pub struct NativeFn {
    pub name: &'static str,
    pub params: &'static [Type],
    pub returns: Type,
    pub body: fn(&[Value]) -> Result<Value>,
}

impl Function for NativeFn {
    fn name(&self) -> &'static str {
        self.name
    }
    fn params(&self) -> &[Type] {
        self.params
    }
    fn returns(&self) -> Type {
        self.returns
    }
    fn call(&self, args: &[Value]) -> Result<Value> {
        (self.body)(args)
    }
}

/// A named, enumerable table of static functions.
#[derive(Clone)]
pub struct Namespace {
    name: &'static str,
    inner: Arc<HashMap<&'static str, Arc<dyn Function>>>,
}

impl Namespace {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Arc::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn register<F: Function + 'static>(&mut self, f: F) {
        let mut_map = Arc::make_mut(&mut self.inner);
        mut_map.insert(f.name(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.inner.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.inner.keys().copied().sorted().collect()
    }
}

/// A read accessor over the context provider's fields.
#[derive(Clone, Copy)]
pub struct Accessor {
    pub name: &'static str,
    pub read: fn(&Variables) -> i32,
}

/// The instance-shaped namespace: members read from the `Variables` passed
/// to each invocation rather than from compile-time state.
#[derive(Clone)]
pub struct DynamicNamespace {
    name: &'static str,
    accessors: Vec<Accessor>,
}

impl DynamicNamespace {
    pub fn new(name: &'static str, accessors: Vec<Accessor>) -> Self {
        Self { name, accessors }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, name: &str) -> Option<Accessor> {
        self.accessors.iter().find(|a| a.name == name).copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.accessors.iter().map(|a| a.name).collect()
    }
}

/// Look up a static namespace by name.
pub fn resolve_static(name: &str) -> Result<Namespace> {
    match name {
        "Math" => Ok(math::namespace()),
        "Variables" => Ok(Variables::namespace()),
        other => Err(EvalError::Namespace(format!(
            "unknown static namespace `{other}`"
        ))),
    }
}

/// Look up a dynamic namespace by name.
pub fn resolve_dynamic(name: &str) -> Result<DynamicNamespace> {
    match name {
        "Variables" => Ok(Variables::accessors()),
        other => Err(EvalError::Namespace(format!(
            "unknown dynamic namespace `{other}`"
        ))),
    }
}

pub(crate) fn int_arg(args: &[Value], i: usize) -> Result<i64> {
    args.get(i)
        .and_then(Value::as_i64)
        .ok_or_else(|| EvalError::Invocation(format!("argument {} must be an int", i + 1)))
}

pub(crate) fn float_arg(args: &[Value], i: usize) -> Result<f64> {
    args.get(i)
        .and_then(Value::as_f64)
        .ok_or_else(|| EvalError::Invocation(format!("argument {} must be a number", i + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Twice;
    impl Function for Twice {
        fn name(&self) -> &'static str {
            "twice"
        }
        fn params(&self) -> &[Type] {
            &[Type::Int]
        }
        fn returns(&self) -> Type {
            Type::Int
        }
        fn call(&self, args: &[Value]) -> Result<Value> {
            Ok(Value::Int(int_arg(args, 0)? * 2))
        }
    }

    #[test]
    fn register_and_call() {
        let mut ns = Namespace::new("Custom");
        ns.register(Twice);
        let f = ns.get("twice").unwrap();
        assert_eq!(f.arity(), 1);
        assert_eq!(f.call(&[Value::Int(21)]).unwrap(), Value::Int(42));
        assert!(ns.get("thrice").is_none());
    }

    #[test]
    fn register_does_not_touch_clones() {
        let base = Namespace::new("Custom");
        let mut extended = base.clone();
        extended.register(Twice);
        assert!(base.get("twice").is_none());
        assert_eq!(extended.names(), vec!["twice"]);
    }

    #[test]
    fn resolves_known_namespaces() {
        assert_eq!(resolve_static("Math").unwrap().name(), "Math");
        assert_eq!(resolve_static("Variables").unwrap().name(), "Variables");
        assert_eq!(resolve_dynamic("Variables").unwrap().names(), vec!["x", "y", "z"]);
    }

    #[test]
    fn unknown_namespace_is_an_error() {
        assert!(matches!(resolve_static("Strings"), Err(EvalError::Namespace(_))));
        assert!(matches!(resolve_dynamic("Math"), Err(EvalError::Namespace(_))));
    }

    #[test]
    fn arg_helpers_reject_wrong_types() {
        assert!(int_arg(&[Value::Float(1.0)], 0).is_err());
        assert!(float_arg(&[Value::Bool(true)], 0).is_err());
        assert_eq!(float_arg(&[Value::Int(3)], 0).unwrap(), 3.0);
        assert!(int_arg(&[], 0).is_err());
    }
}
