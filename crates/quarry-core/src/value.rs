//! SQL values and parameter handling.
//!
//! Every value that reaches a query either travels out-of-band as a binding or
//! is rendered through [`SqlValue::to_sql_inline`], which is the only escaping
//! routine the inlining dialect relies on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value bound to a query or stored in a row.
///
/// Serializes untagged, so rows print as plain JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Renders the value as an inline SQL literal.
    ///
    /// Numbers are unquoted and booleans become `1`/`0`. Floats keep a
    /// fractional part or exponent so they read back as floats, and
    /// non-finite floats have no literal so they render as `NULL`. Text is
    /// single-quoted with embedded quotes doubled.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => String::from(if *b { "1" } else { "0" }),
            Self::Int(n) => n.to_string(),
            Self::Float(f) if f.is_finite() => format!("{f:?}"),
            Self::Float(_) => String::from("NULL"),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Blob(bytes) => {
                let hex: String = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    /// The positional placeholder every binding dialect emits.
    #[must_use]
    pub const fn placeholder() -> &'static str {
        "?"
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        if let Self::Int(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

/// Text prints bare; everything else prints as its inline literal.
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            other => f.write_str(&other.to_sql_inline()),
        }
    }
}

/// Conversion into a [`SqlValue`], accepted wherever the builder takes a value.
pub trait ToSqlValue {
    fn to_sql_value(self) -> SqlValue;
}

macro_rules! to_sql_value {
    ($variant:ident: $($ty:ty),+ => $convert:expr) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::$variant($convert(self))
                }
            }
        )+
    };
}

to_sql_value!(Bool: bool => std::convert::identity);
to_sql_value!(Int: i8, i16, i32, u8, u16, u32 => i64::from);
to_sql_value!(Int: i64 => std::convert::identity);
to_sql_value!(Float: f32 => f64::from);
to_sql_value!(Float: f64 => std::convert::identity);
to_sql_value!(Text: String => std::convert::identity);
to_sql_value!(Text: &str, &String => String::from);
to_sql_value!(Blob: Vec<u8> => std::convert::identity);
to_sql_value!(Blob: &[u8] => <[u8]>::to_vec);

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for &SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self.clone()
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        self.map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_scalars() {
        let rendered: Vec<_> = [
            SqlValue::Null,
            SqlValue::Bool(true),
            SqlValue::Bool(false),
            SqlValue::Int(-100),
            SqlValue::Float(2.5),
            SqlValue::Blob(vec![0x48, 0x49]),
        ]
        .iter()
        .map(SqlValue::to_sql_inline)
        .collect();
        assert_eq!(rendered, ["NULL", "1", "0", "-100", "2.5", "X'4849'"]);
    }

    #[test]
    fn test_inline_float_stays_float() {
        let inline = |f: f64| SqlValue::Float(f).to_sql_inline();
        assert_eq!(inline(2.0), "2.0");
        assert_eq!(inline(-0.5), "-0.5");
        assert_eq!(inline(100.0), "100.0");
    }

    #[test]
    fn test_inline_non_finite_float_is_null() {
        assert_eq!(SqlValue::Float(f64::NAN).to_sql_inline(), "NULL");
        assert_eq!(SqlValue::Float(f64::INFINITY).to_sql_inline(), "NULL");
        assert_eq!(SqlValue::Float(f64::NEG_INFINITY).to_sql_inline(), "NULL");
    }

    #[test]
    fn test_inline_text_doubles_quotes() {
        let quoted = |s: &str| SqlValue::Text(String::from(s)).to_sql_inline();
        assert_eq!(quoted("O'Brien"), "'O''Brien'");
        // The literal cannot be closed early.
        assert_eq!(quoted("'; DROP TABLE users; --"), "'''; DROP TABLE users; --'");
    }

    #[test]
    fn test_display_leaves_text_bare() {
        assert_eq!(SqlValue::Text(String::from("Budi")).to_string(), "Budi");
        assert_eq!(SqlValue::Null.to_string(), "NULL");
        assert_eq!(SqlValue::Int(3).to_string(), "3");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(7_u8.to_sql_value(), SqlValue::Int(7));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!("hello".to_sql_value(), SqlValue::Text(String::from("hello")));
        assert_eq!(b"hi".as_slice().to_sql_value(), SqlValue::Blob(vec![b'h', b'i']));
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(42_i32).to_sql_value(), SqlValue::Int(42));
    }

    #[test]
    fn test_json_shape() {
        let values = vec![
            SqlValue::Int(1),
            SqlValue::Text(String::from("Budi")),
            SqlValue::Null,
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[1,"Budi",null]"#);
    }
}
