//! Runs parsed statements against a [`Store`].

use std::cmp::Ordering;

use quarry_core::{AggregateFunction, InsertId, QueryResult, Row, SqlValue};

use crate::ast::{
    DeleteStatement, InsertStatement, Projection, SelectStatement, Statement, UpdateStatement,
};
use crate::eval::{field, sort_cmp, Evaluator};
use crate::store::Store;

/// Executes one statement. `Unsupported` and `Other` produce an empty result.
pub fn execute(store: &Store, statement: &Statement, bindings: &[SqlValue]) -> QueryResult {
    match statement {
        Statement::Select(select) => QueryResult::with_rows(run_select(store, select, bindings)),
        Statement::Insert(insert) => run_insert(store, insert, bindings),
        Statement::Update(update) => QueryResult::affected(run_update(store, update, bindings)),
        Statement::Delete(delete) => QueryResult::affected(run_delete(store, delete, bindings)),
        Statement::CreateTable { table } => {
            store.create_table(table);
            QueryResult::default()
        }
        Statement::DropTable { table } => {
            store.drop_table(table);
            QueryResult::default()
        }
        Statement::Unsupported { .. } | Statement::Other => QueryResult::default(),
    }
}

fn run_insert(store: &Store, insert: &InsertStatement, bindings: &[SqlValue]) -> QueryResult {
    let evaluator = Evaluator::new(bindings);
    let rows: Vec<Row> = insert
        .rows
        .iter()
        .map(|values| {
            insert
                .columns
                .iter()
                .zip(values)
                .map(|(column, value)| (column.clone(), evaluator.resolve(value)))
                .collect()
        })
        .collect();

    let count = rows.len() as u64;
    let last_id = store.with_tables(|tables| {
        rows.into_iter()
            .map(|row| tables.insert(&insert.table, row))
            .last()
    });

    QueryResult {
        rows: vec![],
        affected_rows: count,
        last_insert_id: last_id,
    }
}

fn run_select(store: &Store, select: &SelectStatement, bindings: &[SqlValue]) -> Vec<Row> {
    let mut evaluator = Evaluator::new(bindings);
    let mut rows: Vec<Row> = store.with_tables(|tables| {
        tables
            .ensure(&select.table)
            .rows
            .iter()
            .filter(|row| evaluator.matches(select.filter.as_ref(), row))
            .cloned()
            .collect()
    });

    if select
        .projection
        .iter()
        .any(|p| matches!(p, Projection::Aggregate { .. }))
    {
        return vec![aggregate_row(&select.projection, &rows)];
    }

    if !select.order_by.is_empty() {
        rows.sort_by(|a, b| {
            select
                .order_by
                .iter()
                .map(|key| {
                    let ord = sort_cmp(field(a, &key.column), field(b, &key.column));
                    if key.descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    let mut rows: Vec<Row> = rows
        .iter()
        .map(|row| project(&select.projection, row))
        .collect();

    if select.distinct {
        let mut unique: Vec<Row> = Vec::with_capacity(rows.len());
        for row in rows {
            if !unique.contains(&row) {
                unique.push(row);
            }
        }
        rows = unique;
    }

    let offset = usize::try_from(select.offset.unwrap_or(0)).unwrap_or(usize::MAX);
    let limit = select
        .limit
        .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
    rows.into_iter().skip(offset).take(limit).collect()
}

fn project(projection: &[Projection], row: &Row) -> Row {
    if projection.iter().all(|p| matches!(p, Projection::All)) {
        return row.clone();
    }
    let mut out = Row::new();
    for item in projection {
        match item {
            Projection::All => out.extend(row.iter().map(|(k, v)| (k.clone(), v.clone()))),
            Projection::Column { name, .. } => {
                out.insert(item.output_name(), field(row, name).clone());
            }
            Projection::Aggregate { .. } => {}
        }
    }
    out
}

/// Single result row of an aggregate query. Plain columns take their value
/// from the first matching row.
fn aggregate_row(projection: &[Projection], rows: &[Row]) -> Row {
    let mut out = Row::new();
    for item in projection {
        match item {
            Projection::Aggregate {
                function, argument, ..
            } => {
                let values: Vec<&SqlValue> = match argument {
                    None => vec![],
                    Some(column) => rows
                        .iter()
                        .map(|r| field(r, column))
                        .filter(|v| !v.is_null())
                        .collect(),
                };
                let value = match (function, argument) {
                    (AggregateFunction::Count, None) => count(rows.len()),
                    (AggregateFunction::Count, Some(_)) => count(values.len()),
                    (_, None) => SqlValue::Null,
                    (AggregateFunction::Sum, Some(_)) => sum(&values),
                    (AggregateFunction::Avg, Some(_)) => avg(&values),
                    (AggregateFunction::Min, Some(_)) => values
                        .iter()
                        .min_by(|a, b| sort_cmp(a, b))
                        .map_or(SqlValue::Null, |v| (*v).clone()),
                    (AggregateFunction::Max, Some(_)) => values
                        .iter()
                        .max_by(|a, b| sort_cmp(a, b))
                        .map_or(SqlValue::Null, |v| (*v).clone()),
                };
                out.insert(item.output_name(), value);
            }
            Projection::Column { name, .. } => {
                let value = rows.first().map_or(SqlValue::Null, |r| field(r, name).clone());
                out.insert(item.output_name(), value);
            }
            Projection::All => {
                if let Some(first) = rows.first() {
                    out.extend(first.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }
    }
    out
}

fn count(n: usize) -> SqlValue {
    SqlValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: &SqlValue) -> f64 {
    match value {
        SqlValue::Int(n) => *n as f64,
        SqlValue::Float(f) => *f,
        SqlValue::Bool(b) => f64::from(u8::from(*b)),
        SqlValue::Text(s) => s
            .trim()
            .parse()
            .ok()
            .filter(|f: &f64| f.is_finite())
            .unwrap_or(0.0),
        SqlValue::Null | SqlValue::Blob(_) => 0.0,
    }
}

/// SUM stays integral while every input is an integer.
fn sum(values: &[&SqlValue]) -> SqlValue {
    if values.is_empty() {
        return SqlValue::Null;
    }
    let mut int_sum: Option<i64> = Some(0);
    for value in values {
        int_sum = match (int_sum, value) {
            (Some(acc), SqlValue::Int(n)) => acc.checked_add(*n),
            _ => None,
        };
    }
    match int_sum {
        Some(n) => SqlValue::Int(n),
        None => SqlValue::Float(values.iter().map(|v| to_f64(v)).sum()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn avg(values: &[&SqlValue]) -> SqlValue {
    if values.is_empty() {
        return SqlValue::Null;
    }
    let total: f64 = values.iter().map(|v| to_f64(v)).sum();
    SqlValue::Float(total / values.len() as f64)
}

fn run_update(store: &Store, update: &UpdateStatement, bindings: &[SqlValue]) -> u64 {
    let mut evaluator = Evaluator::new(bindings);
    let assignments: Vec<(String, SqlValue)> = update
        .assignments
        .iter()
        .map(|(column, value)| (column.clone(), evaluator.resolve(value)))
        .collect();

    store.with_tables(|tables| {
        let mut affected = 0;
        for row in &mut tables.ensure(&update.table).rows {
            if evaluator.matches(update.filter.as_ref(), row) {
                for (column, value) in &assignments {
                    row.insert(column.clone(), value.clone());
                }
                affected += 1;
            }
        }
        affected
    })
}

fn run_delete(store: &Store, delete: &DeleteStatement, bindings: &[SqlValue]) -> u64 {
    let mut evaluator = Evaluator::new(bindings);
    store.with_tables(|tables| {
        let rows = &mut tables.ensure(&delete.table).rows;
        let before = rows.len();
        rows.retain(|row| !evaluator.matches(delete.filter.as_ref(), row));
        (before - rows.len()) as u64
    })
}
