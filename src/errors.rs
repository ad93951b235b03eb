use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The expression text is invalid against the bound namespaces.
    /// `column` is 1-based and counts characters.
    #[error("compilation error at column {column}: {message}")]
    Compilation { message: String, column: usize },

    /// The compiled expression faulted while running.
    #[error("invocation error: {0}")]
    Invocation(String),

    /// A namespace or function could not be resolved while building a library.
    #[error("namespace error: {0}")]
    Namespace(String),
}

impl EvalError {
    pub fn compilation(message: impl Into<String>, column: usize) -> Self {
        EvalError::Compilation {
            message: message.into(),
            column,
        }
    }

    pub fn column(&self) -> Option<usize> {
        match self {
            EvalError::Compilation { column, .. } => Some(*column),
            _ => None,
        }
    }

    /// Two lines: the expression, then a `^` under the offending column.
    /// Errors without a position render the expression alone.
    pub fn caret(&self, expression: &str) -> String {
        match self.column() {
            Some(column) => {
                let pad = itertools::repeat_n(' ', column.saturating_sub(1)).join("");
                format!("{expression}\n{pad}^")
            }
            None => expression.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn caret_sits_under_column() {
        let err = EvalError::compilation("unexpected `+`", 5);
        assert_eq!(err.caret("2 + + 2"), "2 + + 2\n    ^");
    }

    #[test]
    fn caret_without_column() {
        let err = EvalError::Invocation("integer remainder by zero".into());
        assert_eq!(err.caret("x % 0"), "x % 0");
        assert_eq!(err.column(), None);
    }
}
