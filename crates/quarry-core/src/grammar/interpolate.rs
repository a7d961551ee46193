//! Rendering bound queries as inline-literal text.

use super::Grammar;
use crate::value::SqlValue;

pub(super) fn interpolate(grammar: Grammar, sql: &str, bindings: &[SqlValue]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut values = bindings.iter();
    let mut in_string = false;

    for c in sql.chars() {
        match c {
            // A doubled quote toggles twice, which keeps the state right.
            '\'' => {
                in_string = !in_string;
                out.push(c);
            }
            '?' if !in_string => match values.next() {
                Some(value) => out.push_str(&grammar.quote_value(value)),
                None => out.push('?'),
            },
            _ => out.push(c),
        }
    }
    out
}
