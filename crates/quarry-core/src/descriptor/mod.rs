//! The dialect-independent description of a single query.
//!
//! A [`QueryDescriptor`] is plain data. Builders mutate it, grammars read it,
//! and nothing in this module performs I/O.

mod predicate;

pub use predicate::{Boolean, Operator, Predicate};

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl Direction {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parses a direction, case-insensitively. Anything but `desc` is ascending.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    /// Column to order by.
    pub column: String,
    /// Sort direction.
    pub direction: Direction,
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// INNER JOIN.
    Inner,
    /// LEFT JOIN.
    Left,
    /// RIGHT JOIN.
    Right,
    /// CROSS JOIN.
    Cross,
}

impl JoinKind {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// A JOIN clause.
///
/// For [`JoinKind::Cross`] the `left`, `operator` and `right` fields are empty
/// and never compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Joined table.
    pub table: String,
    /// Left-hand column of the ON condition.
    pub left: String,
    /// ON comparison operator.
    pub operator: String,
    /// Right-hand column of the ON condition.
    pub right: String,
    /// Join kind.
    pub kind: JoinKind,
}

impl Join {
    /// Creates a CROSS JOIN.
    #[must_use]
    pub fn cross(table: &str) -> Self {
        Self {
            table: String::from(table),
            left: String::new(),
            operator: String::new(),
            right: String::new(),
            kind: JoinKind::Cross,
        }
    }
}

/// Everything a grammar needs to compile one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    /// Target table; empty until set.
    pub table: String,
    /// Projection list; `["*"]` selects every column.
    pub columns: Vec<String>,
    /// Whether to select distinct rows.
    pub distinct: bool,
    /// WHERE predicates in insertion order.
    pub predicates: Vec<Predicate>,
    /// ORDER BY entries.
    pub orderings: Vec<Ordering>,
    /// LIMIT clause.
    pub limit: Option<u64>,
    /// OFFSET clause.
    pub offset: Option<u64>,
    /// GROUP BY columns.
    pub group_by: Vec<String>,
    /// HAVING predicates.
    pub having: Vec<Predicate>,
    /// JOIN clauses.
    pub joins: Vec<Join>,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            table: String::new(),
            columns: vec![String::from("*")],
            distinct: false,
            predicates: vec![],
            orderings: vec![],
            limit: None,
            offset: None,
            group_by: vec![],
            having: vec![],
            joins: vec![],
        }
    }
}

impl QueryDescriptor {
    /// Creates a descriptor targeting `table`.
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: String::from(table),
            ..Self::default()
        }
    }

    /// Returns true when the projection is the `*` wildcard.
    #[must_use]
    pub fn selects_all(&self) -> bool {
        self.columns.len() == 1 && self.columns[0] == "*"
    }
}
