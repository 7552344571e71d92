//! Naming rules shared by the synthesizer and the renderers.

use heck::{ToSnakeCase, ToUpperCamelCase};

/// Strict and reserved keywords; none of these can be a plain field name.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// A plain identifier: `[A-Za-z_][A-Za-z0-9_]*`, not `_` alone. Raw
/// identifiers (`r#type`) are accepted.
pub fn is_ident(name: &str) -> bool {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name != "_"
}

/// The wire spelling of a field: first character uppercased, `r#` dropped.
///
/// `export_name("userID") == "UserID"`, `export_name("") == ""`, and applying
/// it twice changes nothing.
pub fn export_name(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `get_user` → `GetUser`, used for struct names and request paths.
pub fn upper_camel(name: &str) -> String {
    name.strip_prefix("r#")
        .unwrap_or(name)
        .to_upper_camel_case()
}

/// `HashMap` → `hash_map`.
pub fn snake(name: &str) -> String {
    name.strip_prefix("r#").unwrap_or(name).to_snake_case()
}

/// `SCREAMING_SNAKE` constant name for a method's path.
pub fn path_const(method: &str) -> String {
    format!("{}_PATH", snake(method).to_uppercase())
}

/// Make `name` usable as a field or binding: keywords get a trailing `_`.
pub fn field_ident(name: &str) -> String {
    if is_keyword(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Name for an anonymous result: the first three characters of its
/// snake-cased type name (`String` → `str`, `User` → `use_`).
pub fn result_name_for_type(type_name: &str) -> String {
    let short: String = snake(type_name).chars().take(3).collect();
    let short = short.trim_end_matches('_');
    let short = if short.is_empty() { "val" } else { short };
    field_ident(short)
}
