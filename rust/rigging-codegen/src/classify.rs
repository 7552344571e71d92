//! Type reference classification.
//!
//! Every parameter and result type is sorted into one of three buckets:
//!
//! - a **builtin** from a closed set (`u8`, `String`, `Failure`, ...), kept unqualified;
//! - a **local** bare name, assumed to be declared next to the interface and
//!   qualified with the unit name (`User` in unit `users` → `users::User`);
//! - an **external** path, split at its last segment and kept exactly as
//!   written (`chrono::DateTime` stays `chrono::DateTime`).
//!
//! Anything else (generics, references, tuples, slices, `impl`/`dyn`) cannot be
//! carried by the generated contracts and classifies as [`Classified::Unsupported`].
//! Paths are never resolved against `use` items.

use std::fmt;

use proc_macro2::TokenStream;
use rigging_parse::{ToTokens, Type, TypePath, parse_type, spelling};

/// Builtin type names. They need no qualifier anywhere in generated code.
pub const BUILTINS: &[&str] = &[
    "bool", "char", "f32", "f64", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32",
    "u64", "u128", "usize", "String", "Failure",
];

const RUNTIME_CRATE: &str = "rigging";

/// A classified type: a name and the module path that qualifies it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    pub name: String,
    /// Empty for builtins.
    pub qualifier: String,
}

impl TypeReference {
    pub fn new(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: qualifier.into(),
        }
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Self::new("", name)
    }

    /// Split `a::b::Type<X>` on its last `::` outside angle brackets.
    pub fn from_path(path: &str) -> Self {
        let mut depth = 0usize;
        let mut split = None;
        let bytes = path.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'<' => depth += 1,
                b'>' => depth = depth.saturating_sub(1),
                b':' if depth == 0 && i > 0 && bytes[i - 1] == b':' => split = Some(i - 1),
                _ => {}
            }
        }
        match split {
            Some(at) => Self::new(&path[..at], &path[at + 2..]),
            None => Self::builtin(path),
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.qualifier.is_empty()
    }

    fn is_runtime_qualifier(&self) -> bool {
        self.qualifier.trim_start_matches("::") == RUNTIME_CRATE
    }

    /// `rigging::Context`, the execution context. Only the qualified spelling counts.
    pub fn is_context(&self) -> bool {
        self.name == "Context" && self.is_runtime_qualifier()
    }

    /// `Failure` or `rigging::Failure`, the failure channel.
    pub fn is_failure(&self) -> bool {
        self.name == "Failure" && (self.is_builtin() || self.is_runtime_qualifier())
    }

    /// Spelling for generated code. Runtime types are written with an
    /// absolute path so they resolve from any module.
    pub fn render(&self) -> String {
        if self.is_context() || self.is_failure() {
            format!("::{RUNTIME_CRATE}::{}", self.name)
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.qualifier.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}::{}", self.qualifier, self.name)
        }
    }
}

/// Outcome of classifying one type occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Type(TypeReference),
    /// Carries the source spelling for diagnostics.
    Unsupported(String),
}

impl Classified {
    pub fn as_type(&self) -> Option<&TypeReference> {
        match self {
            Classified::Type(ty) => Some(ty),
            Classified::Unsupported(_) => None,
        }
    }

    pub fn is_context(&self) -> bool {
        self.as_type().is_some_and(TypeReference::is_context)
    }

    pub fn is_failure(&self) -> bool {
        self.as_type().is_some_and(TypeReference::is_failure)
    }

    /// The type as it would be written in source.
    pub fn spelling(&self) -> String {
        match self {
            Classified::Type(ty) => ty.to_string(),
            Classified::Unsupported(spelling) => spelling.clone(),
        }
    }
}

/// Classify a parsed type occurring in the interface of `unit`.
pub fn classify(ty: &Type, unit: &str) -> Classified {
    match ty {
        Type::Path(path) => classify_path(path, unit),
        other => Classified::Unsupported(other.spelling()),
    }
}

/// Classify raw type tokens; tokens that are not a single type are unsupported.
pub fn classify_tokens(tokens: &TokenStream, unit: &str) -> Classified {
    match parse_type(tokens) {
        Some(ty) => classify(&ty, unit),
        None => Classified::Unsupported(spelling(tokens)),
    }
}

fn classify_path(path: &TypePath, unit: &str) -> Classified {
    let segments = path.segments();
    let unresolvable = segments
        .iter()
        .any(|segment| matches!(segment.as_str(), "self" | "Self" | "super"));
    if unresolvable {
        return Classified::Unsupported(spelling(&path.to_token_stream()));
    }

    let Some((name, prefix)) = segments.split_last() else {
        return Classified::Unsupported(spelling(&path.to_token_stream()));
    };

    if prefix.is_empty() && !path.is_absolute() {
        if BUILTINS.contains(&name.as_str()) {
            return Classified::Type(TypeReference::builtin(name.as_str()));
        }
        return Classified::Type(TypeReference::new(unit, name.as_str()));
    }

    let mut qualifier = String::new();
    if path.is_absolute() {
        qualifier.push_str("::");
    }
    qualifier.push_str(&prefix.join("::"));
    Classified::Type(TypeReference::new(qualifier, name.as_str()))
}
