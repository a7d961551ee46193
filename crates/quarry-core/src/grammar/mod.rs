//! Dialect compilers.
//!
//! A [`Grammar`] turns a [`QueryDescriptor`] into backend-specific SQL text plus
//! an ordered list of bindings. Compilation is pure and deterministic; the same
//! descriptor always yields the same [`CompiledQuery`].
//!
//! | Dialect   | Identifiers      | Values           |
//! |-----------|------------------|------------------|
//! | `Generic` | unquoted         | `?` placeholders |
//! | `MySql`   | backtick-quoted  | `?` placeholders |
//! | `Literal` | unquoted         | inline literals  |
//!
//! # Example
//!
//! ```rust
//! use quarry_core::descriptor::QueryDescriptor;
//! use quarry_core::grammar::{Grammar, QueryKind};
//!
//! let d = QueryDescriptor::new("users");
//! let compiled = Grammar::MySql.compile(&d, &QueryKind::Select);
//! assert_eq!(compiled.sql, "SELECT * FROM `users`");
//! ```

mod compiler;
mod interpolate;
mod wrap;

use std::fmt;
use std::str::FromStr;

use compiler::Compiler;

use crate::descriptor::{Join, Ordering, Predicate, QueryDescriptor};
use crate::error::QueryError;
use crate::value::SqlValue;

/// Compiled SQL text and its positional bindings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledQuery {
    /// The SQL text.
    pub sql: String,
    /// Values for the `?` placeholders, in text order. Empty for inlining dialects.
    pub bindings: Vec<SqlValue>,
}

/// Aggregate functions supported by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    /// COUNT
    Count,
    /// SUM
    Sum,
    /// AVG
    Avg,
    /// MIN
    Min,
    /// MAX
    Max,
}

impl AggregateFunction {
    /// Column alias of the single aggregate result column.
    pub const ALIAS: &'static str = "aggregate";

    /// Returns the SQL function name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// The statement to compile from a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
    /// SELECT with every clause of the descriptor.
    Select,
    /// INSERT of the given column/value pairs.
    Insert(Vec<(String, SqlValue)>),
    /// UPDATE of the given column/value pairs, filtered by the descriptor's WHERE.
    Update(Vec<(String, SqlValue)>),
    /// DELETE filtered by the descriptor's WHERE.
    Delete,
    /// CREATE TABLE for the descriptor's table.
    CreateTable,
    /// DROP TABLE for the descriptor's table.
    DropTable,
    /// `COUNT(*)` over the descriptor's WHERE.
    Count,
    /// Any aggregate over one column.
    Aggregate(AggregateFunction, String),
}

/// The closed set of supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grammar {
    /// Unquoted identifiers with `?` bindings; understood by the in-memory engine.
    #[default]
    Generic,
    /// Backtick-quoted identifiers with `?` bindings.
    MySql,
    /// Unquoted identifiers with every value inlined; schema-free DDL.
    Literal,
}

impl Grammar {
    /// Every supported dialect.
    pub const ALL: [Self; 3] = [Self::Generic, Self::MySql, Self::Literal];

    /// Returns the dialect name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::MySql => "mysql",
            Self::Literal => "literal",
        }
    }

    /// Returns whether values are emitted as `?` placeholders.
    #[must_use]
    pub const fn uses_bindings(&self) -> bool {
        !matches!(self, Self::Literal)
    }

    /// Wraps a table name.
    #[must_use]
    pub fn wrap_table(&self, name: &str) -> String {
        match self {
            Self::MySql => wrap::backticked(name),
            Self::Generic | Self::Literal => wrap::plain(name),
        }
    }

    /// Wraps a column name, honoring `*`, `table.column` and `expr AS alias`.
    #[must_use]
    pub fn wrap_column(&self, name: &str) -> String {
        match self {
            Self::MySql => wrap::backticked(name),
            Self::Generic | Self::Literal => wrap::plain(name),
        }
    }

    /// Renders a value as an inline literal.
    #[must_use]
    pub fn quote_value(&self, value: &SqlValue) -> String {
        value.to_sql_inline()
    }

    /// Compiles `descriptor` as the given statement kind.
    #[must_use]
    pub fn compile(&self, descriptor: &QueryDescriptor, kind: &QueryKind) -> CompiledQuery {
        match kind {
            QueryKind::Select => self.compile_select(descriptor),
            QueryKind::Insert(values) => self.compile_insert(&descriptor.table, values),
            QueryKind::Update(values) => self.compile_update(descriptor, values),
            QueryKind::Delete => self.compile_delete(descriptor),
            QueryKind::CreateTable => CompiledQuery {
                sql: self.compile_create_table(&descriptor.table),
                bindings: vec![],
            },
            QueryKind::DropTable => CompiledQuery {
                sql: self.compile_drop_table(&descriptor.table),
                bindings: vec![],
            },
            QueryKind::Count => self.compile_count(descriptor),
            QueryKind::Aggregate(function, column) => {
                self.compile_aggregate(descriptor, *function, column)
            }
        }
    }

    /// Compiles a SELECT.
    #[must_use]
    pub fn compile_select(&self, descriptor: &QueryDescriptor) -> CompiledQuery {
        let mut compiler = Compiler::new(*self);
        let sql = compiler.select(descriptor);
        compiler.finish(sql)
    }

    /// Compiles an INSERT.
    #[must_use]
    pub fn compile_insert(&self, table: &str, values: &[(String, SqlValue)]) -> CompiledQuery {
        let mut compiler = Compiler::new(*self);
        let sql = compiler.insert(table, values);
        compiler.finish(sql)
    }

    /// Compiles an UPDATE. SET bindings precede WHERE bindings.
    #[must_use]
    pub fn compile_update(
        &self,
        descriptor: &QueryDescriptor,
        values: &[(String, SqlValue)],
    ) -> CompiledQuery {
        let mut compiler = Compiler::new(*self);
        let sql = compiler.update(descriptor, values);
        compiler.finish(sql)
    }

    /// Compiles a DELETE.
    #[must_use]
    pub fn compile_delete(&self, descriptor: &QueryDescriptor) -> CompiledQuery {
        let mut compiler = Compiler::new(*self);
        let sql = compiler.delete(descriptor);
        compiler.finish(sql)
    }

    /// Compiles a WHERE clause, including its leading ` WHERE `.
    ///
    /// Returns empty text for an empty predicate list.
    #[must_use]
    pub fn compile_wheres(&self, predicates: &[Predicate]) -> CompiledQuery {
        let mut compiler = Compiler::new(*self);
        let sql = compiler.wheres(predicates);
        compiler.finish(sql)
    }

    /// Compiles a HAVING clause, including its leading ` HAVING `.
    #[must_use]
    pub fn compile_having(&self, predicates: &[Predicate]) -> CompiledQuery {
        let mut compiler = Compiler::new(*self);
        let sql = compiler.having(predicates);
        compiler.finish(sql)
    }

    /// Compiles JOIN clauses.
    #[must_use]
    pub fn compile_joins(&self, joins: &[Join]) -> String {
        Compiler::new(*self).joins(joins)
    }

    /// Compiles a GROUP BY clause.
    #[must_use]
    pub fn compile_group_by(&self, columns: &[String]) -> String {
        Compiler::new(*self).group_by(columns)
    }

    /// Compiles an ORDER BY clause.
    #[must_use]
    pub fn compile_order_by(&self, orderings: &[Ordering]) -> String {
        Compiler::new(*self).order_by(orderings)
    }

    /// Compiles LIMIT/OFFSET.
    #[must_use]
    pub fn compile_limit(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        Compiler::new(*self).limit(limit, offset)
    }

    /// Compiles a COUNT query over the descriptor's WHERE.
    #[must_use]
    pub fn compile_count(&self, descriptor: &QueryDescriptor) -> CompiledQuery {
        self.compile_aggregate(descriptor, AggregateFunction::Count, "*")
    }

    /// Compiles an aggregate-only query over the descriptor's WHERE.
    #[must_use]
    pub fn compile_aggregate(
        &self,
        descriptor: &QueryDescriptor,
        function: AggregateFunction,
        column: &str,
    ) -> CompiledQuery {
        let mut compiler = Compiler::new(*self);
        let sql = compiler.aggregate(descriptor, function, column);
        compiler.finish(sql)
    }

    /// Compiles a CREATE TABLE statement.
    #[must_use]
    pub fn compile_create_table(&self, table: &str) -> String {
        match self {
            Self::MySql => format!(
                "CREATE TABLE IF NOT EXISTS {} (`id` BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY) \
                 ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
                self.wrap_table(table)
            ),
            Self::Generic | Self::Literal => format!("CREATE TABLE {}", self.wrap_table(table)),
        }
    }

    /// Compiles a DROP TABLE statement.
    #[must_use]
    pub fn compile_drop_table(&self, table: &str) -> String {
        match self {
            Self::MySql => format!("DROP TABLE IF EXISTS {}", self.wrap_table(table)),
            Self::Generic | Self::Literal => format!("DROP TABLE {}", self.wrap_table(table)),
        }
    }

    /// Replaces `?` placeholders with inline literals rendered by [`Self::quote_value`].
    ///
    /// Placeholders inside string literals are left alone, as are placeholders
    /// with no corresponding binding.
    #[must_use]
    pub fn interpolate(&self, sql: &str, bindings: &[SqlValue]) -> String {
        interpolate::interpolate(*self, sql, bindings)
    }
}

/// Renders a bound query as inline-literal text for `grammar`.
///
/// Adapters for engines without parameter binding send the result instead of
/// the placeholder text.
#[must_use]
pub fn interpolate_bindings(sql: &str, bindings: &[SqlValue], grammar: Grammar) -> String {
    grammar.interpolate(sql, bindings)
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Grammar {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "memory" | "inmemory" => Ok(Self::Generic),
            "mysql" => Ok(Self::MySql),
            "literal" | "embedded" => Ok(Self::Literal),
            other => Err(QueryError::configuration(format!("unknown grammar '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Boolean, Direction, JoinKind, Operator};

    fn users() -> QueryDescriptor {
        QueryDescriptor::new("users")
    }

    fn eq(column: &str, value: SqlValue, boolean: Boolean) -> Predicate {
        Predicate::Basic {
            column: String::from(column),
            operator: Operator::Eq,
            value,
            boolean,
        }
    }

    #[test]
    fn test_grammar_from_str() {
        assert_eq!("MySQL".parse::<Grammar>().unwrap(), Grammar::MySql);
        assert_eq!("literal".parse::<Grammar>().unwrap(), Grammar::Literal);
        assert_eq!("inmemory".parse::<Grammar>().unwrap(), Grammar::Generic);
        assert!("oracle".parse::<Grammar>().is_err());
    }

    #[test]
    fn test_uses_bindings() {
        assert!(Grammar::Generic.uses_bindings());
        assert!(Grammar::MySql.uses_bindings());
        assert!(!Grammar::Literal.uses_bindings());
    }

    #[test]
    fn test_select_all_dialects() {
        let mut d = users();
        d.predicates.push(eq("name", SqlValue::Text(String::from("Budi")), Boolean::And));

        let generic = Grammar::Generic.compile_select(&d);
        assert_eq!(generic.sql, "SELECT * FROM users WHERE name = ?");
        assert_eq!(generic.bindings, vec![SqlValue::Text(String::from("Budi"))]);

        let mysql = Grammar::MySql.compile_select(&d);
        assert_eq!(mysql.sql, "SELECT * FROM `users` WHERE `name` = ?");

        let literal = Grammar::Literal.compile_select(&d);
        assert_eq!(literal.sql, "SELECT * FROM users WHERE name = 'Budi'");
        assert!(literal.bindings.is_empty());
    }

    #[test]
    fn test_first_boolean_suppressed() {
        let mut d = users();
        d.predicates.push(eq("a", SqlValue::Int(1), Boolean::Or));
        d.predicates.push(eq("b", SqlValue::Int(2), Boolean::Or));
        d.predicates.push(eq("c", SqlValue::Int(3), Boolean::And));

        let compiled = Grammar::Generic.compile_select(&d);
        assert_eq!(
            compiled.sql,
            "SELECT * FROM users WHERE a = ? OR b = ? AND c = ?"
        );
    }

    #[test]
    fn test_empty_in_list() {
        let mut d = users();
        d.predicates.push(Predicate::In {
            column: String::from("id"),
            values: vec![],
            boolean: Boolean::And,
        });
        assert_eq!(
            Grammar::Generic.compile_select(&d).sql,
            "SELECT * FROM users WHERE id IN ()"
        );
        assert_eq!(
            Grammar::Literal.compile_select(&d).sql,
            "SELECT * FROM users WHERE id IN ()"
        );
    }

    #[test]
    fn test_full_select_clause_order() {
        let mut d = QueryDescriptor::new("users");
        d.columns = vec![String::from("users.name"), String::from("COUNT(*) as total")];
        d.distinct = true;
        d.joins.push(Join {
            table: String::from("posts"),
            left: String::from("users.id"),
            operator: String::from("="),
            right: String::from("posts.user_id"),
            kind: JoinKind::Left,
        });
        d.predicates.push(eq("active", SqlValue::Bool(true), Boolean::And));
        d.group_by.push(String::from("users.name"));
        d.having.push(Predicate::Basic {
            column: String::from("total"),
            operator: Operator::Gt,
            value: SqlValue::Int(2),
            boolean: Boolean::And,
        });
        d.orderings.push(Ordering {
            column: String::from("total"),
            direction: Direction::Desc,
        });
        d.limit = Some(5);
        d.offset = Some(10);

        let compiled = Grammar::MySql.compile_select(&d);
        assert_eq!(
            compiled.sql,
            "SELECT DISTINCT `users`.`name`, COUNT(*) AS `total` FROM `users` \
             LEFT JOIN `posts` ON `users`.`id` = `posts`.`user_id` \
             WHERE `active` = ? GROUP BY `users`.`name` HAVING `total` > ? \
             ORDER BY `total` DESC LIMIT 5 OFFSET 10"
        );
        assert_eq!(compiled.bindings, vec![SqlValue::Bool(true), SqlValue::Int(2)]);
    }

    #[test]
    fn test_mysql_offset_without_limit() {
        let mut d = users();
        d.offset = Some(3);
        assert_eq!(
            Grammar::MySql.compile_select(&d).sql,
            format!("SELECT * FROM `users` LIMIT {} OFFSET 3", u64::MAX)
        );
        assert_eq!(
            Grammar::Generic.compile_select(&d).sql,
            "SELECT * FROM users OFFSET 3"
        );
    }

    #[test]
    fn test_insert_and_update() {
        let values = vec![
            (String::from("name"), SqlValue::Text(String::from("Yasir"))),
            (String::from("age"), SqlValue::Int(30)),
        ];
        let insert = Grammar::MySql.compile_insert("users", &values);
        assert_eq!(insert.sql, "INSERT INTO `users` (`name`, `age`) VALUES (?, ?)");
        assert_eq!(insert.bindings.len(), 2);

        let literal = Grammar::Literal.compile_insert("users", &values);
        assert_eq!(literal.sql, "INSERT INTO users (name, age) VALUES ('Yasir', 30)");

        let mut d = users();
        d.predicates.push(eq("id", SqlValue::Int(7), Boolean::And));
        let update = Grammar::Generic.compile_update(&d, &values);
        assert_eq!(update.sql, "UPDATE users SET name = ?, age = ? WHERE id = ?");
        assert_eq!(
            update.bindings,
            vec![
                SqlValue::Text(String::from("Yasir")),
                SqlValue::Int(30),
                SqlValue::Int(7)
            ]
        );
    }

    #[test]
    fn test_ddl_per_dialect() {
        assert_eq!(
            Grammar::MySql.compile_create_table("users"),
            "CREATE TABLE IF NOT EXISTS `users` (`id` BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY) \
             ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
        );
        assert_eq!(Grammar::Literal.compile_create_table("users"), "CREATE TABLE users");
        assert_eq!(Grammar::Generic.compile_create_table("users"), "CREATE TABLE users");
        assert_eq!(Grammar::MySql.compile_drop_table("users"), "DROP TABLE IF EXISTS `users`");
        assert_eq!(Grammar::Literal.compile_drop_table("users"), "DROP TABLE users");
    }

    #[test]
    fn test_count_and_aggregate() {
        let mut d = users();
        d.predicates.push(eq("active", SqlValue::Bool(true), Boolean::And));
        assert_eq!(
            Grammar::Generic.compile(&d, &QueryKind::Count).sql,
            "SELECT COUNT(*) AS aggregate FROM users WHERE active = ?"
        );
        assert_eq!(
            Grammar::MySql
                .compile(&d, &QueryKind::Aggregate(AggregateFunction::Sum, String::from("age")))
                .sql,
            "SELECT SUM(`age`) AS `aggregate` FROM `users` WHERE `active` = ?"
        );
        assert_eq!(
            Grammar::Literal.compile(&d, &QueryKind::Count).sql,
            "SELECT COUNT(*) AS aggregate FROM users WHERE active = 1"
        );
    }

    #[test]
    fn test_cross_join() {
        let joins = vec![Join::cross("tags")];
        assert_eq!(Grammar::Generic.compile_joins(&joins), " CROSS JOIN tags");
        assert_eq!(Grammar::MySql.compile_joins(&joins), " CROSS JOIN `tags`");
    }
}
