//! Identifier wrapping.

/// Splits `expr AS alias` (case-insensitive `AS`, any whitespace).
pub(super) fn split_alias(name: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = name.split_whitespace().collect();
    let n = parts.len();
    if n >= 3 && parts[n - 2].eq_ignore_ascii_case("as") {
        Some((parts[..n - 2].join(" "), String::from(parts[n - 1])))
    } else {
        None
    }
}

/// Returns true for expressions that must never be quoted (function calls,
/// arithmetic and the like).
pub(super) fn is_expression(name: &str) -> bool {
    name.contains('(') || name.contains(' ')
}

/// Wraps one identifier segment in backticks, doubling embedded backticks.
pub(super) fn backtick(segment: &str) -> String {
    if segment == "*" {
        return String::from("*");
    }
    format!("`{}`", segment.replace('`', "``"))
}

/// Backtick-wraps a possibly qualified identifier, segment by segment.
pub(super) fn backtick_qualified(name: &str) -> String {
    if is_expression(name) {
        return String::from(name);
    }
    name.split('.').map(backtick).collect::<Vec<_>>().join(".")
}

/// Normalizes an identifier for the unquoted dialects.
pub(super) fn plain(name: &str) -> String {
    match split_alias(name) {
        Some((expr, alias)) => format!("{expr} AS {alias}"),
        None => String::from(name.trim()),
    }
}

/// Wraps an identifier for the backtick dialect.
pub(super) fn backticked(name: &str) -> String {
    let name = name.trim();
    if name == "*" {
        return String::from("*");
    }
    match split_alias(name) {
        Some((expr, alias)) => {
            format!("{} AS {}", backtick_qualified(&expr), backtick(&alias))
        }
        None => backtick_qualified(name),
    }
}
