//! Token types for the statement lexer.

use super::Span;

/// Keywords recognized by the interpreter.
///
/// Function names such as `COUNT` are plain identifiers so that they remain
/// usable as column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Where,
    Order,
    By,
    Group,
    Having,
    Limit,
    Offset,
    Distinct,
    As,
    Asc,
    Desc,
    Join,
    Inner,
    Left,
    Right,
    Outer,
    Cross,
    On,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Create,
    Drop,
    Table,
    If,
    Exists,
    And,
    Or,
    Not,
    In,
    Between,
    Like,
    Is,
    Null,
    True,
    False,
}

/// Upper-case spelling of every keyword.
const KEYWORDS: &[(&str, Keyword)] = &[
    ("SELECT", Keyword::Select),
    ("FROM", Keyword::From),
    ("WHERE", Keyword::Where),
    ("ORDER", Keyword::Order),
    ("BY", Keyword::By),
    ("GROUP", Keyword::Group),
    ("HAVING", Keyword::Having),
    ("LIMIT", Keyword::Limit),
    ("OFFSET", Keyword::Offset),
    ("DISTINCT", Keyword::Distinct),
    ("AS", Keyword::As),
    ("ASC", Keyword::Asc),
    ("DESC", Keyword::Desc),
    ("JOIN", Keyword::Join),
    ("INNER", Keyword::Inner),
    ("LEFT", Keyword::Left),
    ("RIGHT", Keyword::Right),
    ("OUTER", Keyword::Outer),
    ("CROSS", Keyword::Cross),
    ("ON", Keyword::On),
    ("INSERT", Keyword::Insert),
    ("INTO", Keyword::Into),
    ("VALUES", Keyword::Values),
    ("UPDATE", Keyword::Update),
    ("SET", Keyword::Set),
    ("DELETE", Keyword::Delete),
    ("CREATE", Keyword::Create),
    ("DROP", Keyword::Drop),
    ("TABLE", Keyword::Table),
    ("IF", Keyword::If),
    ("EXISTS", Keyword::Exists),
    ("AND", Keyword::And),
    ("OR", Keyword::Or),
    ("NOT", Keyword::Not),
    ("IN", Keyword::In),
    ("BETWEEN", Keyword::Between),
    ("LIKE", Keyword::Like),
    ("IS", Keyword::Is),
    ("NULL", Keyword::Null),
    ("TRUE", Keyword::True),
    ("FALSE", Keyword::False),
];

impl Keyword {
    /// Looks up a word case-insensitively.
    #[must_use]
    pub fn lookup(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(spelling, _)| spelling.eq_ignore_ascii_case(word))
            .map(|(_, keyword)| *keyword)
    }

    /// The keyword's upper-case spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| *keyword == self)
            .map_or("", |(spelling, _)| spelling)
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Integer(i64),
    /// Also produced for integer text that overflows `i64`.
    Float(f64),
    String(String),
    /// `X'..'` hex literal.
    Blob(Vec<u8>),
    /// Name with any backtick or double-quote quoting removed.
    Identifier(String),
    Keyword(Keyword),
    Minus,
    Star,
    Eq,
    /// `!=` and `<>` alike.
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Dot,
    /// `?` placeholder.
    Question,
    Eof,
    /// Lexing failure with its message.
    Error(String),
}

/// A lexed token and where it sits in the statement text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// The keyword this token spells, if any.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        if let TokenKind::Keyword(keyword) = self.kind {
            Some(keyword)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Keyword::lookup("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::lookup("between"), Some(Keyword::Between));
        assert_eq!(Keyword::lookup("count"), None);
        assert_eq!(Keyword::lookup("selects"), None);
    }

    #[test]
    fn test_keyword_round_trip() {
        for kw in [Keyword::Insert, Keyword::Exists, Keyword::Like, Keyword::Desc] {
            assert_eq!(Keyword::lookup(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_token_as_keyword() {
        let select = Token::new(TokenKind::Keyword(Keyword::Select), Span::new(0, 6));
        let star = Token::new(TokenKind::Star, Span::new(7, 8));
        assert_eq!(select.as_keyword(), Some(Keyword::Select));
        assert_eq!(star.as_keyword(), None);
        assert!(!star.is_eof());
    }
}
