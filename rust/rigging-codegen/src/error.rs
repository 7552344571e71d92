//! Errors raised while turning an interface into bindings.
//!
//! [`UnitError`] stops a whole unit: there is no interface to build on.
//! [`MethodError`] stops one method; its siblings still generate.

use rigging_parse::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    #[error("failed to parse interface file: {0}")]
    ParseFailure(String),

    #[error("no exported trait{} found", named(.wanted))]
    NoInterfaceFound { wanted: Option<String> },

    #[error("trait `{interface}` cannot be bound: {reason}")]
    UnsupportedInterface { interface: String, reason: String },
}

fn named(wanted: &Option<String>) -> String {
    match wanted {
        Some(name) => format!(" named `{name}`"),
        None => String::new(),
    }
}

impl From<ParseError> for UnitError {
    fn from(err: ParseError) -> Self {
        UnitError::ParseFailure(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MethodError {
    #[error("method `{method}`: `{field}` has unsupported type `{spelling}`")]
    UnsupportedType {
        method: String,
        field: String,
        spelling: String,
    },

    #[error("method `{method}`: parameter {position} has no name")]
    MissingParameterName { method: String, position: usize },

    #[error("method `{method}`: {reason}")]
    UnsupportedSignature { method: String, reason: String },

    #[error("method `{method}`: result name `{name}` is used twice")]
    DuplicateResultName { method: String, name: String },
}

impl MethodError {
    /// The method this error is about.
    pub fn method(&self) -> &str {
        match self {
            MethodError::UnsupportedType { method, .. }
            | MethodError::MissingParameterName { method, .. }
            | MethodError::UnsupportedSignature { method, .. }
            | MethodError::DuplicateResultName { method, .. } => method,
        }
    }

    pub(crate) fn signature(method: &str, reason: impl Into<String>) -> Self {
        MethodError::UnsupportedSignature {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}
