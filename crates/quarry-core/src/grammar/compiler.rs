//! Clause-by-clause compilation shared by every dialect.

use super::{AggregateFunction, CompiledQuery, Grammar};
use crate::descriptor::{Join, JoinKind, Ordering, Predicate, QueryDescriptor};
use crate::value::SqlValue;

/// Accumulates SQL text and bindings for one statement.
pub(super) struct Compiler {
    grammar: Grammar,
    bindings: Vec<SqlValue>,
}

impl Compiler {
    pub(super) const fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            bindings: Vec::new(),
        }
    }

    pub(super) fn finish(self, sql: String) -> CompiledQuery {
        CompiledQuery {
            sql,
            bindings: self.bindings,
        }
    }

    /// Emits one value position: a placeholder plus a binding, or an inline literal.
    fn parameter(&mut self, value: &SqlValue) -> String {
        if self.grammar.uses_bindings() {
            self.bindings.push(value.clone());
            String::from(SqlValue::placeholder())
        } else {
            self.grammar.quote_value(value)
        }
    }

    fn parameters(&mut self, values: &[SqlValue]) -> String {
        values
            .iter()
            .map(|v| self.parameter(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn columnize(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.grammar.wrap_column(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(super) fn select(&mut self, d: &QueryDescriptor) -> String {
        let mut sql = String::from("SELECT ");
        if d.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.columnize(&d.columns));
        sql.push_str(" FROM ");
        sql.push_str(&self.grammar.wrap_table(&d.table));
        sql.push_str(&self.joins(&d.joins));
        sql.push_str(&self.wheres(&d.predicates));
        sql.push_str(&self.group_by(&d.group_by));
        sql.push_str(&self.having(&d.having));
        sql.push_str(&self.order_by(&d.orderings));
        sql.push_str(&self.limit(d.limit, d.offset));
        sql
    }

    pub(super) fn aggregate(
        &mut self,
        d: &QueryDescriptor,
        function: AggregateFunction,
        column: &str,
    ) -> String {
        let mut sql = format!(
            "SELECT {}({}) AS {} FROM {}",
            function.as_str(),
            self.grammar.wrap_column(column),
            self.grammar.wrap_column(AggregateFunction::ALIAS),
            self.grammar.wrap_table(&d.table)
        );
        sql.push_str(&self.joins(&d.joins));
        sql.push_str(&self.wheres(&d.predicates));
        sql
    }

    pub(super) fn insert(&mut self, table: &str, values: &[(String, SqlValue)]) -> String {
        let columns: Vec<String> = values.iter().map(|(c, _)| c.clone()).collect();
        let literals: Vec<SqlValue> = values.iter().map(|(_, v)| v.clone()).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.grammar.wrap_table(table),
            self.columnize(&columns),
            self.parameters(&literals)
        )
    }

    pub(super) fn update(&mut self, d: &QueryDescriptor, values: &[(String, SqlValue)]) -> String {
        let grammar = self.grammar;
        let assignments: Vec<String> = values
            .iter()
            .map(|(column, value)| {
                format!("{} = {}", grammar.wrap_column(column), self.parameter(value))
            })
            .collect();
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.grammar.wrap_table(&d.table),
            assignments.join(", ")
        );
        sql.push_str(&self.wheres(&d.predicates));
        sql
    }

    pub(super) fn delete(&mut self, d: &QueryDescriptor) -> String {
        let mut sql = format!("DELETE FROM {}", self.grammar.wrap_table(&d.table));
        sql.push_str(&self.wheres(&d.predicates));
        sql
    }

    pub(super) fn wheres(&mut self, predicates: &[Predicate]) -> String {
        if predicates.is_empty() {
            return String::new();
        }
        format!(" WHERE {}", self.predicates(predicates))
    }

    pub(super) fn having(&mut self, predicates: &[Predicate]) -> String {
        if predicates.is_empty() {
            return String::new();
        }
        format!(" HAVING {}", self.predicates(predicates))
    }

    /// Each predicate is preceded by its own boolean; the first one's is dropped.
    fn predicates(&mut self, predicates: &[Predicate]) -> String {
        let mut sql = String::new();
        for (i, predicate) in predicates.iter().enumerate() {
            if i > 0 {
                sql.push(' ');
                sql.push_str(predicate.boolean().as_str());
                sql.push(' ');
            }
            sql.push_str(&self.predicate(predicate));
        }
        sql
    }

    fn predicate(&mut self, predicate: &Predicate) -> String {
        let column = self.grammar.wrap_column(predicate.column());
        match predicate {
            Predicate::Basic {
                operator, value, ..
            } => format!("{column} {} {}", operator.as_str(), self.parameter(value)),
            Predicate::Null { .. } => format!("{column} IS NULL"),
            Predicate::NotNull { .. } => format!("{column} IS NOT NULL"),
            Predicate::In { values, .. } => format!("{column} IN ({})", self.parameters(values)),
            Predicate::NotIn { values, .. } => {
                format!("{column} NOT IN ({})", self.parameters(values))
            }
            Predicate::Between { low, high, .. } => format!(
                "{column} BETWEEN {} AND {}",
                self.parameter(low),
                self.parameter(high)
            ),
            Predicate::NotBetween { low, high, .. } => format!(
                "{column} NOT BETWEEN {} AND {}",
                self.parameter(low),
                self.parameter(high)
            ),
        }
    }

    pub(super) fn joins(&self, joins: &[Join]) -> String {
        let mut sql = String::new();
        for join in joins {
            sql.push(' ');
            sql.push_str(join.kind.as_str());
            sql.push(' ');
            sql.push_str(&self.grammar.wrap_table(&join.table));
            if join.kind != JoinKind::Cross {
                sql.push_str(&format!(
                    " ON {} {} {}",
                    self.grammar.wrap_column(&join.left),
                    join.operator,
                    self.grammar.wrap_column(&join.right)
                ));
            }
        }
        sql
    }

    pub(super) fn group_by(&self, columns: &[String]) -> String {
        if columns.is_empty() {
            return String::new();
        }
        format!(" GROUP BY {}", self.columnize(columns))
    }

    pub(super) fn order_by(&self, orderings: &[Ordering]) -> String {
        if orderings.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = orderings
            .iter()
            .map(|o| format!("{} {}", self.grammar.wrap_column(&o.column), o.direction.as_str()))
            .collect();
        format!(" ORDER BY {}", parts.join(", "))
    }

    pub(super) fn limit(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut sql = String::new();
        match (limit, offset) {
            (Some(n), _) => sql.push_str(&format!(" LIMIT {n}")),
            // MySQL rejects OFFSET without LIMIT; its documented idiom is the max row count.
            (None, Some(_)) if self.grammar == Grammar::MySql => {
                sql.push_str(&format!(" LIMIT {}", u64::MAX));
            }
            (None, _) => {}
        }
        if let Some(n) = offset {
            sql.push_str(&format!(" OFFSET {n}"));
        }
        sql
    }
}
