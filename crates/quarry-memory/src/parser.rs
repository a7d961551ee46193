//! Recursive-descent parser for the statement subset the interpreter runs.
//!
//! Conditions follow the usual precedence: `OR` binds loosest, then `AND`,
//! then `NOT`; parentheses group. Every `?` receives its binding index when
//! parsed, so evaluation never consumes bindings statefully.

use quarry_core::{AggregateFunction, SqlValue};

use crate::ast::{
    CompareOp, Condition, DeleteStatement, InsertStatement, Operand, OrderKey, Projection,
    SelectStatement, Statement, UpdateStatement,
};
use crate::error::ParseError;
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// Splits a script on `;`, ignoring semicolons inside literals and comments.
///
/// Empty statements are dropped.
#[must_use]
pub fn split_statements(script: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut lexer = Lexer::new(script);
    let mut start = 0;

    loop {
        let token = lexer.next_token();
        let end = match token.kind {
            TokenKind::Semicolon | TokenKind::Eof => token.span.start,
            _ => continue,
        };
        let statement = Span::new(start, end).slice(script).trim();
        if !statement.is_empty() {
            statements.push(statement);
        }
        if token.is_eof() {
            break;
        }
        start = token.span.end;
    }
    statements
}

/// Statement parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// Next placeholder index.
    param_counter: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            param_counter: 0,
        }
    }

    /// Number of `?` placeholders consumed so far.
    #[must_use]
    pub const fn placeholders(&self) -> usize {
        self.param_counter
    }

    /// Parses one statement, classified by its leading keyword.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if a classified statement is malformed.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let statement = match self.current.as_keyword() {
            Some(Keyword::Select) => self.parse_select()?,
            Some(Keyword::Insert) => Statement::Insert(self.parse_insert()?),
            Some(Keyword::Update) => Statement::Update(self.parse_update()?),
            Some(Keyword::Delete) => Statement::Delete(self.parse_delete()?),
            Some(Keyword::Create) => self.parse_create()?,
            Some(Keyword::Drop) => self.parse_drop()?,
            _ => return Ok(Statement::Other),
        };
        if matches!(statement, Statement::Unsupported { .. }) {
            return Ok(statement);
        }
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
        if !self.current.is_eof() {
            return Err(self.unexpected("end of statement"));
        }
        Ok(statement)
    }

    // ===============================================================
    // Statements
    // ===============================================================

    fn parse_select(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Select)?;

        let distinct = if self.check_keyword(Keyword::Distinct) {
            self.advance();
            true
        } else {
            false
        };

        let projection = self.parse_projection()?;
        self.expect_keyword(Keyword::From)?;
        let table = self.parse_table_name()?;

        // A bare alias after the table name.
        if matches!(self.current.kind, TokenKind::Identifier(_)) {
            self.advance();
        }

        if matches!(
            self.current.as_keyword(),
            Some(Keyword::Join | Keyword::Inner | Keyword::Left | Keyword::Right | Keyword::Cross)
        ) {
            return Ok(Statement::Unsupported { clause: "JOIN" });
        }

        let filter = self.parse_optional_where()?;

        if self.check_keyword(Keyword::Group) {
            return Ok(Statement::Unsupported { clause: "GROUP BY" });
        }
        if self.check_keyword(Keyword::Having) {
            return Ok(Statement::Unsupported { clause: "HAVING" });
        }

        let order_by = if self.check_keyword(Keyword::Order) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by_list()?
        } else {
            vec![]
        };

        let limit = if self.check_keyword(Keyword::Limit) {
            self.advance();
            Some(self.parse_count()?)
        } else {
            None
        };

        let offset = if self.check_keyword(Keyword::Offset) {
            self.advance();
            Some(self.parse_count()?)
        } else {
            None
        };

        Ok(Statement::Select(SelectStatement {
            table,
            distinct,
            projection,
            filter,
            order_by,
            limit,
            offset,
        }))
    }

    fn parse_insert(&mut self) -> Result<InsertStatement, ParseError> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;
        let table = self.parse_table_name()?;

        self.expect(&TokenKind::LeftParen)?;
        let mut columns = vec![self.parse_column()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            columns.push(self.parse_column()?);
        }
        self.expect(&TokenKind::RightParen)?;

        self.expect_keyword(Keyword::Values)?;
        let mut rows = vec![];
        loop {
            let start = self.current.span;
            self.expect(&TokenKind::LeftParen)?;
            let values = self.parse_operand_list()?;
            self.expect(&TokenKind::RightParen)?;
            if values.len() != columns.len() {
                return Err(ParseError::new(
                    format!(
                        "INSERT has {} columns but {} values",
                        columns.len(),
                        values.len()
                    ),
                    start,
                ));
            }
            rows.push(values);

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(InsertStatement {
            table,
            columns,
            rows,
        })
    }

    fn parse_update(&mut self) -> Result<UpdateStatement, ParseError> {
        self.expect_keyword(Keyword::Update)?;
        let table = self.parse_table_name()?;
        self.expect_keyword(Keyword::Set)?;

        let mut assignments = vec![];
        loop {
            let column = self.parse_column()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_operand()?;
            assignments.push((column, value));

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        let filter = self.parse_optional_where()?;
        Ok(UpdateStatement {
            table,
            assignments,
            filter,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteStatement, ParseError> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;
        let table = self.parse_table_name()?;
        let filter = self.parse_optional_where()?;
        Ok(DeleteStatement { table, filter })
    }

    /// `CREATE TABLE [IF NOT EXISTS] name ...`; column definitions and table
    /// options are accepted and ignored.
    fn parse_create(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;
        if self.check_keyword(Keyword::If) {
            self.advance();
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
        }
        let table = self.parse_table_name()?;
        while !self.current.is_eof() && !self.check(&TokenKind::Semicolon) {
            self.advance();
        }
        Ok(Statement::CreateTable { table })
    }

    fn parse_drop(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Drop)?;
        self.expect_keyword(Keyword::Table)?;
        if self.check_keyword(Keyword::If) {
            self.advance();
            self.expect_keyword(Keyword::Exists)?;
        }
        let table = self.parse_table_name()?;
        Ok(Statement::DropTable { table })
    }

    // ===============================================================
    // Clauses
    // ===============================================================

    fn parse_projection(&mut self) -> Result<Vec<Projection>, ParseError> {
        let mut items = vec![];
        loop {
            items.push(self.parse_projection_item()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(items)
    }

    fn parse_projection_item(&mut self) -> Result<Projection, ParseError> {
        if self.check(&TokenKind::Star) {
            self.advance();
            return Ok(Projection::All);
        }

        let span = self.current.span;
        let name = self.expect_identifier()?;

        if self.check(&TokenKind::LeftParen) {
            let function = aggregate_function(&name)
                .ok_or_else(|| ParseError::new(format!("Unsupported function: {name}"), span))?;
            self.advance();
            let argument = if self.check(&TokenKind::Star) {
                self.advance();
                None
            } else {
                Some(self.parse_column()?)
            };
            self.expect(&TokenKind::RightParen)?;
            let alias = self.parse_optional_alias()?;
            return Ok(Projection::Aggregate {
                function,
                argument,
                alias,
            });
        }

        let mut column = name;
        if self.check(&TokenKind::Dot) {
            self.advance();
            if self.check(&TokenKind::Star) {
                self.advance();
                return Ok(Projection::All);
            }
            column = self.expect_identifier()?;
        }
        let alias = self.parse_optional_alias()?;
        Ok(Projection::Column {
            name: column,
            alias,
        })
    }

    fn parse_optional_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.check_keyword(Keyword::As) {
            self.advance();
            Ok(Some(self.expect_identifier()?))
        } else if matches!(self.current.kind, TokenKind::Identifier(_)) {
            Ok(Some(self.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    fn parse_optional_where(&mut self) -> Result<Option<Condition>, ParseError> {
        if self.check_keyword(Keyword::Where) {
            self.advance();
            Ok(Some(self.parse_or()?))
        } else {
            Ok(None)
        }
    }

    fn parse_order_by_list(&mut self) -> Result<Vec<OrderKey>, ParseError> {
        let mut keys = vec![];
        loop {
            let column = self.parse_column()?;
            let descending = if self.check_keyword(Keyword::Desc) {
                self.advance();
                true
            } else {
                if self.check_keyword(Keyword::Asc) {
                    self.advance();
                }
                false
            };
            keys.push(OrderKey { column, descending });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(keys)
    }

    /// A LIMIT/OFFSET count. Values beyond `u64` saturate.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn parse_count(&mut self) -> Result<u64, ParseError> {
        let count = match self.current.kind {
            TokenKind::Integer(n) if n >= 0 => n as u64,
            TokenKind::Float(f) if f >= 0.0 && f.fract() == 0.0 => f as u64,
            _ => return Err(self.unexpected("non-negative row count")),
        };
        self.advance();
        Ok(count)
    }

    // ===============================================================
    // Conditions
    // ===============================================================

    fn parse_or(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_and()?;
        while self.check_keyword(Keyword::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_not()?;
        while self.check_keyword(Keyword::And) {
            self.advance();
            let right = self.parse_not()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Condition, ParseError> {
        if self.check_keyword(Keyword::Not) {
            self.advance();
            return Ok(Condition::Not(Box::new(self.parse_not()?)));
        }
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            let inner = self.parse_or()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(inner);
        }
        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> Result<Condition, ParseError> {
        let column = self.parse_column()?;

        if self.check_keyword(Keyword::Is) {
            self.advance();
            let negated = self.eat_not();
            self.expect_keyword(Keyword::Null)?;
            return Ok(Condition::IsNull { column, negated });
        }

        let negated = self.eat_not();
        match self.current.as_keyword() {
            Some(Keyword::In) => {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let values = if self.check(&TokenKind::RightParen) {
                    vec![]
                } else {
                    self.parse_operand_list()?
                };
                self.expect(&TokenKind::RightParen)?;
                return Ok(Condition::In {
                    column,
                    values,
                    negated,
                });
            }
            Some(Keyword::Between) => {
                self.advance();
                let low = self.parse_operand()?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_operand()?;
                return Ok(Condition::Between {
                    column,
                    low,
                    high,
                    negated,
                });
            }
            Some(Keyword::Like) => {
                self.advance();
                let pattern = self.parse_operand()?;
                return Ok(Condition::Like {
                    column,
                    pattern,
                    negated,
                });
            }
            _ if negated => return Err(self.unexpected("IN, BETWEEN or LIKE after NOT")),
            _ => {}
        }

        let op = match self.current.kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::LtEq => CompareOp::LtEq,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::GtEq => CompareOp::GtEq,
            _ => return Err(self.unexpected("comparison operator")),
        };
        self.advance();
        let value = self.parse_operand()?;
        Ok(Condition::Compare { column, op, value })
    }

    fn eat_not(&mut self) -> bool {
        if self.check_keyword(Keyword::Not) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ===============================================================
    // Leaves
    // ===============================================================

    fn parse_operand_list(&mut self) -> Result<Vec<Operand>, ParseError> {
        let mut values = vec![self.parse_operand()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            values.push(self.parse_operand()?);
        }
        Ok(values)
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        let value = match &self.current.kind {
            TokenKind::Question => {
                let index = self.param_counter;
                self.param_counter += 1;
                self.advance();
                return Ok(Operand::Placeholder(index));
            }
            TokenKind::Minus => {
                self.advance();
                let value = match self.current.kind {
                    TokenKind::Integer(n) => SqlValue::Int(-n),
                    TokenKind::Float(f) => SqlValue::Float(-f),
                    _ => return Err(self.unexpected("number")),
                };
                self.advance();
                return Ok(Operand::Value(value));
            }
            TokenKind::Integer(n) => SqlValue::Int(*n),
            TokenKind::Float(f) => SqlValue::Float(*f),
            TokenKind::String(s) => SqlValue::Text(s.clone()),
            TokenKind::Blob(b) => SqlValue::Blob(b.clone()),
            TokenKind::Keyword(Keyword::Null) => SqlValue::Null,
            TokenKind::Keyword(Keyword::True) => SqlValue::Bool(true),
            TokenKind::Keyword(Keyword::False) => SqlValue::Bool(false),
            _ => return Err(self.unexpected("value")),
        };
        self.advance();
        Ok(Operand::Value(value))
    }

    /// A table name; any schema qualifier is dropped.
    fn parse_table_name(&mut self) -> Result<String, ParseError> {
        self.parse_column()
    }

    /// A column name; any `table.` qualifier is dropped.
    fn parse_column(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_identifier()?;
        while self.check(&TokenKind::Dot) {
            self.advance();
            name = self.expect_identifier()?;
        }
        Ok(name)
    }

    // ===============================================================
    // Token helpers
    // ===============================================================

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::unexpected(expected, &self.current.kind, self.current.span)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("{kind:?}")))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }
}

fn aggregate_function(name: &str) -> Option<AggregateFunction> {
    match name.to_ascii_uppercase().as_str() {
        "COUNT" => Some(AggregateFunction::Count),
        "SUM" => Some(AggregateFunction::Sum),
        "AVG" => Some(AggregateFunction::Avg),
        "MIN" => Some(AggregateFunction::Min),
        "MAX" => Some(AggregateFunction::Max),
        _ => None,
    }
}

/// Parses one statement.
///
/// # Errors
///
/// See [`Parser::parse_statement`].
pub fn parse(sql: &str) -> Result<Statement, ParseError> {
    Parser::new(sql).parse_statement()
}
