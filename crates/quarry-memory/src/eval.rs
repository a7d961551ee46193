//! Row-level evaluation: loose comparison, LIKE matching, condition trees.

use std::cmp::Ordering;
use std::collections::HashMap;

use quarry_core::{Row, SqlValue};
use regex::Regex;

use crate::ast::{CompareOp, Condition, Operand};

const NULL: SqlValue = SqlValue::Null;

/// Numeric reading of a value: numbers, booleans and numeric text.
///
/// Only finite numbers count, so text such as `nan` or `inf` stays text.
#[allow(clippy::cast_precision_loss)]
fn number(value: &SqlValue) -> Option<f64> {
    let n = match value {
        SqlValue::Int(n) => *n as f64,
        SqlValue::Float(f) => *f,
        SqlValue::Bool(b) => f64::from(u8::from(*b)),
        SqlValue::Text(s) => s.trim().parse().ok()?,
        SqlValue::Null | SqlValue::Blob(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// Orders two non-null values. Numbers compare numerically and sort before
/// everything else; the rest compare by their text.
fn compare_present(a: &SqlValue, b: &SqlValue) -> Ordering {
    if let (SqlValue::Int(x), SqlValue::Int(y)) = (a, b) {
        return x.cmp(y);
    }
    match (number(a), number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_string().cmp(&b.to_string()),
    }
}

/// The form a value takes once stored or compared: booleans become integers
/// and floats without a finite value become `NULL`.
#[must_use]
pub fn canonical(value: SqlValue) -> SqlValue {
    match value {
        SqlValue::Bool(b) => SqlValue::Int(i64::from(b)),
        SqlValue::Float(f) if !f.is_finite() => SqlValue::Null,
        other => other,
    }
}

/// Loose equality. `NULL` equals only `NULL`.
#[must_use]
pub fn loose_eq(a: &SqlValue, b: &SqlValue) -> bool {
    match (a, b) {
        (SqlValue::Null, SqlValue::Null) => true,
        (SqlValue::Null, _) | (_, SqlValue::Null) => false,
        _ => compare_present(a, b) == Ordering::Equal,
    }
}

/// Ordering for predicates; `None` when either side is `NULL`.
#[must_use]
pub fn loose_cmp(a: &SqlValue, b: &SqlValue) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        None
    } else {
        Some(compare_present(a, b))
    }
}

/// Ordering for ORDER BY and MIN/MAX; `NULL` sorts lowest.
#[must_use]
pub fn sort_cmp(a: &SqlValue, b: &SqlValue) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_present(a, b),
    }
}

/// Translates a LIKE pattern to an anchored, case-insensitive regex.
///
/// `%` matches any run of characters and `_` exactly one.
#[must_use]
pub fn like_regex(pattern: &str) -> String {
    let mut regex = String::from("(?is)^");
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            other => regex.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    regex.push('$');
    regex
}

/// Evaluates conditions against rows of one statement.
pub struct Evaluator<'a> {
    bindings: &'a [SqlValue],
    patterns: HashMap<String, Option<Regex>>,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator resolving placeholders against `bindings`.
    #[must_use]
    pub fn new(bindings: &'a [SqlValue]) -> Self {
        Self {
            bindings,
            patterns: HashMap::new(),
        }
    }

    /// Resolves an operand to its [`canonical`] value; a placeholder without
    /// a binding is `NULL`.
    #[must_use]
    pub fn resolve(&self, operand: &Operand) -> SqlValue {
        match operand {
            Operand::Value(v) => canonical(v.clone()),
            Operand::Placeholder(i) => self.bindings.get(*i).cloned().map_or(NULL, canonical),
        }
    }

    /// Returns whether `row` satisfies the optional condition.
    pub fn matches(&mut self, condition: Option<&Condition>, row: &Row) -> bool {
        condition.map_or(true, |c| self.eval(c, row))
    }

    fn eval(&mut self, condition: &Condition, row: &Row) -> bool {
        match condition {
            Condition::And(l, r) => self.eval(l, row) && self.eval(r, row),
            Condition::Or(l, r) => self.eval(l, row) || self.eval(r, row),
            Condition::Not(inner) => !self.eval(inner, row),
            Condition::Compare { column, op, value } => {
                let left = field(row, column);
                let right = self.resolve(value);
                match op {
                    CompareOp::Eq => loose_eq(left, &right),
                    CompareOp::NotEq => {
                        !left.is_null() && !right.is_null() && !loose_eq(left, &right)
                    }
                    CompareOp::Lt => loose_cmp(left, &right) == Some(Ordering::Less),
                    CompareOp::LtEq => {
                        matches!(loose_cmp(left, &right), Some(Ordering::Less | Ordering::Equal))
                    }
                    CompareOp::Gt => loose_cmp(left, &right) == Some(Ordering::Greater),
                    CompareOp::GtEq => matches!(
                        loose_cmp(left, &right),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                }
            }
            Condition::Like {
                column,
                pattern,
                negated,
            } => {
                let value = field(row, column);
                if value.is_null() {
                    return false;
                }
                let pattern = self.resolve(pattern).to_string();
                let text = value.to_string();
                let found = self.like(&pattern, &text);
                found != *negated
            }
            Condition::IsNull { column, negated } => field(row, column).is_null() != *negated,
            Condition::In {
                column,
                values,
                negated,
            } => {
                let value = field(row, column);
                let found = values.iter().any(|v| loose_eq(value, &self.resolve(v)));
                found != *negated
            }
            Condition::Between {
                column,
                low,
                high,
                negated,
            } => {
                let value = field(row, column);
                let low = self.resolve(low);
                let high = self.resolve(high);
                match (loose_cmp(value, &low), loose_cmp(value, &high)) {
                    (Some(lo), Some(hi)) => {
                        let inside = lo != Ordering::Less && hi != Ordering::Greater;
                        inside != *negated
                    }
                    _ => false,
                }
            }
        }
    }

    fn like(&mut self, pattern: &str, text: &str) -> bool {
        let regex = self
            .patterns
            .entry(String::from(pattern))
            .or_insert_with(|| Regex::new(&like_regex(pattern)).ok());
        regex.as_ref().is_some_and(|r| r.is_match(text))
    }
}

/// A row's value for `column`; absent columns read as `NULL`.
#[must_use]
pub fn field<'r>(row: &'r Row, column: &str) -> &'r SqlValue {
    row.get(column).unwrap_or(&NULL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::ast::Statement;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(String::from(s))
    }

    fn user(name: &str, email: &str, age: i64) -> Row {
        let mut row = Row::new();
        row.insert(String::from("name"), text(name));
        row.insert(String::from("email"), text(email));
        row.insert(String::from("age"), SqlValue::Int(age));
        row
    }

    fn filter(sql: &str) -> Condition {
        match parse(sql) {
            Ok(Statement::Select(s)) => s.filter.unwrap(),
            other => panic!("Expected SELECT, got {other:?}"),
        }
    }

    fn eval(where_clause: &str, row: &Row, bindings: &[SqlValue]) -> bool {
        let condition = filter(&format!("SELECT * FROM t WHERE {where_clause}"));
        Evaluator::new(bindings).matches(Some(&condition), row)
    }

    #[test]
    fn test_loose_equality() {
        assert!(loose_eq(&SqlValue::Int(1), &text("1")));
        assert!(loose_eq(&SqlValue::Int(1), &SqlValue::Float(1.0)));
        assert!(loose_eq(&SqlValue::Bool(true), &SqlValue::Int(1)));
        assert!(loose_eq(&SqlValue::Null, &SqlValue::Null));
        assert!(!loose_eq(&SqlValue::Null, &SqlValue::Int(0)));
        assert!(!loose_eq(&text("abc"), &text("ABC")));
    }

    #[test]
    fn test_non_finite_text_is_not_numeric() {
        assert!(!loose_eq(&text("nan"), &SqlValue::Int(5)));
        assert!(!loose_eq(&text("NaN"), &SqlValue::Float(0.0)));
        assert!(!loose_eq(&text("inf"), &text("infinity")));
        assert_eq!(number(&text("inf")), None);
        assert_eq!(number(&text(" 2.5 ")), Some(2.5));
    }

    #[test]
    fn test_numbers_sort_before_text() {
        let mut values = vec![text("1a"), text("10"), SqlValue::Int(2)];
        values.sort_by(sort_cmp);
        assert_eq!(values, vec![SqlValue::Int(2), text("10"), text("1a")]);

        // Every pair agrees with the sorted order.
        for (i, a) in values.iter().enumerate() {
            for b in &values[i + 1..] {
                assert_eq!(sort_cmp(a, b), Ordering::Less);
                assert_eq!(sort_cmp(b, a), Ordering::Greater);
            }
        }
    }

    #[test]
    fn test_canonical_values() {
        assert_eq!(canonical(SqlValue::Bool(true)), SqlValue::Int(1));
        assert_eq!(canonical(SqlValue::Bool(false)), SqlValue::Int(0));
        assert_eq!(canonical(SqlValue::Float(f64::NAN)), SqlValue::Null);
        assert_eq!(canonical(SqlValue::Float(f64::NEG_INFINITY)), SqlValue::Null);
        assert_eq!(canonical(SqlValue::Float(2.0)), SqlValue::Float(2.0));
        assert_eq!(canonical(text("true")), text("true"));
    }

    #[test]
    fn test_sort_cmp_null_lowest() {
        assert_eq!(sort_cmp(&SqlValue::Null, &SqlValue::Int(-5)), Ordering::Less);
        assert_eq!(sort_cmp(&SqlValue::Int(10), &SqlValue::Int(9)), Ordering::Greater);
        assert_eq!(sort_cmp(&text("10"), &text("9")), Ordering::Greater);
        assert_eq!(sort_cmp(&text("b"), &text("a")), Ordering::Greater);
    }

    #[test]
    fn test_like_regex() {
        let re = Regex::new(&like_regex("%yasir%")).unwrap();
        assert!(re.is_match("yasir@lonate.id"));
        assert!(re.is_match("YASIR"));

        let re = Regex::new(&like_regex("a_di")).unwrap();
        assert!(re.is_match("andi"));
        assert!(!re.is_match("aandi"));

        let re = Regex::new(&like_regex("50.0%")).unwrap();
        assert!(re.is_match("50.0% off"));
        assert!(!re.is_match("5000"));
    }

    #[test]
    fn test_comparisons() {
        let row = user("Budi", "budi@x.id", 30);
        assert!(eval("age > 18", &row, &[]));
        assert!(eval("age <= 30 AND age >= 30", &row, &[]));
        assert!(!eval("age < ?", &row, &[SqlValue::Int(30)]));
        assert!(eval("name != 'Yasir'", &row, &[]));
        assert!(eval("name <> ?", &row, &[text("Yasir")]));
        assert!(!eval("missing = 1", &row, &[]));
        assert!(!eval("missing != 1", &row, &[]));
    }

    #[test]
    fn test_or_and_not() {
        let row = user("Budi", "budi@x.id", 30);
        assert!(eval("name = 'Yasir' OR age = 30", &row, &[]));
        assert!(!eval("name = 'Yasir' OR age = 31", &row, &[]));
        assert!(eval("NOT name = 'Yasir'", &row, &[]));
        assert!(!eval("(name = 'Yasir' OR age = 30) AND email IS NULL", &row, &[]));
        assert!(eval("name = 'Yasir' OR age = 30 AND email IS NOT NULL", &row, &[]));
    }

    #[test]
    fn test_in_between_like_null() {
        let row = user("Andi", "andi@x.id", 25);
        assert!(eval("age IN (20, 25)", &row, &[]));
        assert!(!eval("age IN ()", &row, &[]));
        assert!(eval("age NOT IN ()", &row, &[]));
        assert!(eval("age BETWEEN ? AND ?", &row, &[SqlValue::Int(25), SqlValue::Int(26)]));
        assert!(!eval("age NOT BETWEEN 20 AND 30", &row, &[]));
        assert!(eval("name LIKE 'a_di'", &row, &[]));
        assert!(eval("email NOT LIKE ?", &row, &[text("%yasir%")]));
        assert!(eval("deleted_at IS NULL", &row, &[]));
        assert!(!eval("deleted_at LIKE '%'", &row, &[]));
    }

    #[test]
    fn test_placeholder_without_binding_is_null() {
        let row = user("Andi", "andi@x.id", 25);
        assert!(!eval("name = ?", &row, &[]));
    }
}
