#![allow(dead_code)]

use quarry_core::{
    CompiledQuery, Connection, ConnectionConfig, Grammar, InsertId, QueryResult, Result, Row,
    SqlValue,
};

/// A connection that records every statement and replies with `reply`.
#[derive(Debug, Default)]
pub struct Recording {
    pub grammar: Grammar,
    pub reply: QueryResult,
    pub statements: Vec<CompiledQuery>,
}

impl Recording {
    pub fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            ..Self::default()
        }
    }

    /// The most recent statement; panics if nothing ran.
    pub fn last(&self) -> &CompiledQuery {
        self.statements
            .last()
            .unwrap_or_else(|| panic!("no statement was executed"))
    }
}

impl Connection for Recording {
    fn connect(&mut self, config: &ConnectionConfig) -> Result<()> {
        if let Some(grammar) = &config.grammar {
            self.grammar = grammar.parse()?;
        }
        Ok(())
    }

    fn execute(&mut self, sql: &str, bindings: &[SqlValue]) -> Result<QueryResult> {
        self.statements.push(CompiledQuery {
            sql: String::from(sql),
            bindings: bindings.to_vec(),
        });
        Ok(self.reply.clone())
    }

    fn fetch_rows(&self) -> Vec<Row> {
        self.reply.rows.clone()
    }

    fn last_insert_id(&self) -> InsertId {
        self.reply.last_insert_id.clone().unwrap_or_default()
    }

    fn grammar(&self) -> Grammar {
        self.grammar
    }
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}
