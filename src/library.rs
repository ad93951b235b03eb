use crate::compiler::{self, CompiledExpression};
use crate::errors::{EvalError, Result};
use crate::functions::{self, Accessor, DynamicNamespace, Function, Namespace};
use itertools::Itertools;
use std::collections::HashSet;
use std::sync::Arc;

/// A name resolved against a [`Library`].
#[derive(Clone)]
pub(crate) enum Member {
    Dynamic(Accessor),
    Static(Arc<dyn Function>),
}

/// Compile-time binding: which names an expression may reference.
///
/// Lookup order is the dynamic namespace first, then the static namespaces
/// in the order given. Functions marked state dependent are never folded.
#[derive(Clone)]
pub struct Library {
    statics: Vec<Namespace>,
    dynamic: Option<DynamicNamespace>,
    state_dependent: HashSet<String>,
    fold_constants: bool,
}

impl Library {
    pub fn new(statics: Vec<Namespace>, dynamic: Option<DynamicNamespace>) -> Self {
        Self {
            statics,
            dynamic,
            state_dependent: HashSet::new(),
            fold_constants: true,
        }
    }

    /// Build a library from namespace names, e.g. `(&["Math", "Variables"], Some("Variables"))`.
    pub fn from_names(statics: &[&str], dynamic: Option<&str>) -> Result<Self> {
        let statics = statics
            .iter()
            .map(|name| functions::resolve_static(name))
            .collect::<Result<Vec<_>>>()?;
        let dynamic = dynamic.map(functions::resolve_dynamic).transpose()?;
        Ok(Self::new(statics, dynamic))
    }

    pub fn with_constant_folding(mut self, on: bool) -> Self {
        self.fold_constants = on;
        self
    }

    pub fn folds_constants(&self) -> bool {
        self.fold_constants
    }

    /// Exclude a static function from constant folding.
    pub fn mark_state_dependent(&mut self, name: &str) -> Result<()> {
        if !self.statics.iter().any(|ns| ns.get(name).is_some()) {
            return Err(EvalError::Namespace(format!(
                "cannot mark `{name}` state dependent: no static function with that name"
            )));
        }
        self.state_dependent.insert(name.to_string());
        Ok(())
    }

    pub fn is_state_dependent(&self, name: &str) -> bool {
        self.state_dependent.contains(name)
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<Member> {
        if let Some(acc) = self.dynamic.as_ref().and_then(|d| d.get(name)) {
            return Some(Member::Dynamic(acc));
        }
        self.statics
            .iter()
            .find_map(|ns| ns.get(name))
            .map(Member::Static)
    }

    /// Every visible name, sorted and deduplicated.
    pub fn names(&self) -> Vec<&'static str> {
        self.dynamic
            .iter()
            .flat_map(|d| d.names())
            .chain(self.statics.iter().flat_map(|ns| ns.names()))
            .sorted()
            .dedup()
            .collect()
    }

    pub fn compile(&self, expression: &str) -> Result<CompiledExpression> {
        compiler::compile(expression, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn library() -> Library {
        Library::from_names(&["Math", "Variables"], Some("Variables")).unwrap()
    }

    #[test]
    fn unknown_namespace_fails() {
        let err = Library::from_names(&["Math", "Strings"], Some("Variables"))
            .err()
            .unwrap();
        assert!(matches!(err, EvalError::Namespace(_)));
    }

    #[test]
    fn dynamic_names_win() {
        assert!(matches!(library().resolve("x"), Some(Member::Dynamic(_))));
        assert!(matches!(library().resolve("isPrime"), Some(Member::Static(_))));
        assert!(library().resolve("nope").is_none());
    }

    #[test]
    fn mark_state_dependent_requires_known_function() {
        let mut lib = library();
        lib.mark_state_dependent("random").unwrap();
        assert!(lib.is_state_dependent("random"));
        assert!(lib.mark_state_dependent("x").is_err());
        assert!(lib.mark_state_dependent("shuffle").is_err());
    }

    #[test]
    fn names_are_enumerable() {
        let lib = Library::from_names(&["Variables"], Some("Variables")).unwrap();
        assert_eq!(
            lib.names(),
            vec![
                "isFibonacci",
                "isPerfectCube",
                "isPerfectSquare",
                "isPrime",
                "isSquarePyramidNumber",
                "x",
                "y",
                "z",
            ]
        );
    }
}
