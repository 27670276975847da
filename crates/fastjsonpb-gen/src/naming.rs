//! Schema names to Rust names.

use heck::{ToSnakeCase, ToUpperCamelCase};

/// Words that need `r#` in identifier position.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn",
    "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Makes `name` usable as an identifier.
#[must_use]
pub fn ident(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_owned()
    }
}

/// Field and module names.
#[must_use]
pub fn snake(name: &str) -> String {
    name.to_snake_case()
}

/// Type and variant names.
#[must_use]
pub fn upper_camel(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Rust name of a schema type from its path below the package, so
/// `Outer.Inner` becomes `OuterInner`.
#[must_use]
pub fn type_name(path: &[&str]) -> String {
    path.iter().map(|part| upper_camel(part)).collect()
}

/// Field of the generated pool set that holds instances of the message type
/// `rust_name`.
#[must_use]
pub fn pool_field(rust_name: &str) -> String {
    ident(&snake(rust_name))
}

/// The JSON key protoc derives for a field without an explicit `json_name`:
/// underscores are dropped and the letter after each one is uppercased.
#[must_use]
pub fn json_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
