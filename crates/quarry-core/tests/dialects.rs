//! Text produced by each dialect for the same builder chain.

mod common;
use common::*;

use quarry_core::{
    interpolate_bindings, Connection, ConnectionConfig, DatabaseConfig, DatabaseManager,
    Direction, Grammar,
};

fn compile(grammar: Grammar) -> quarry_core::CompiledQuery {
    let mut conn = Recording::new(grammar);
    conn.table("users")
        .select(&["id", "users.name", "email as mail"])
        .where_("name", "Budi")
        .or_where_null("email")
        .order_by("id", Direction::Asc)
        .limit(10)
        .offset(20)
        .to_sql()
        .unwrap()
}

// ===================================================================
// Identifier wrapping and value placement
// ===================================================================

#[test]
fn generic_dialect() {
    let compiled = compile(Grammar::Generic);
    assert_eq!(
        compiled.sql,
        "SELECT id, users.name, email AS mail FROM users WHERE name = ? OR email IS NULL \
         ORDER BY id ASC LIMIT 10 OFFSET 20"
    );
    assert_eq!(compiled.bindings, vec![text("Budi")]);
}

#[test]
fn mysql_dialect() {
    let compiled = compile(Grammar::MySql);
    assert_eq!(
        compiled.sql,
        "SELECT `id`, `users`.`name`, `email` AS `mail` FROM `users` \
         WHERE `name` = ? OR `email` IS NULL ORDER BY `id` ASC LIMIT 10 OFFSET 20"
    );
    assert_eq!(compiled.bindings, vec![text("Budi")]);
}

#[test]
fn literal_dialect() {
    let compiled = compile(Grammar::Literal);
    assert_eq!(
        compiled.sql,
        "SELECT id, users.name, email AS mail FROM users WHERE name = 'Budi' OR email IS NULL \
         ORDER BY id ASC LIMIT 10 OFFSET 20"
    );
    assert!(compiled.bindings.is_empty());
}

#[test]
fn literal_dialect_quotes_every_value() {
    let mut conn = Recording::new(Grammar::Literal);
    let compiled = conn
        .table("users")
        .where_in("name", vec!["O'Brien", "D'Arcy"])
        .where_between("joined", "2020-01-01", "2020-12-31")
        .where_("active", false)
        .where_("nickname", None::<&str>)
        .to_sql()
        .unwrap();

    assert_eq!(
        compiled.sql,
        "SELECT * FROM users WHERE name IN ('O''Brien', 'D''Arcy') \
         AND joined BETWEEN '2020-01-01' AND '2020-12-31' AND active = 0 AND nickname = NULL"
    );
}

#[test]
fn quote_value_escapes_quotes() {
    for grammar in Grammar::ALL {
        assert_eq!(grammar.quote_value(&text("O'Brien")), "'O''Brien'");
    }
}

#[test]
fn empty_in_is_valid_text() {
    for grammar in Grammar::ALL {
        let mut conn = Recording::new(grammar);
        let compiled = conn
            .table("users")
            .where_in("id", Vec::<i64>::new())
            .to_sql()
            .unwrap();
        assert!(compiled.sql.ends_with("IN ()"), "{grammar}: {}", compiled.sql);
        assert!(compiled.bindings.is_empty());
    }
}

// ===================================================================
// Interpolation
// ===================================================================

#[test]
fn interpolating_bound_text_matches_literal_dialect() {
    let bound = compile(Grammar::Generic);
    let literal = compile(Grammar::Literal);
    assert_eq!(
        interpolate_bindings(&bound.sql, &bound.bindings, Grammar::Literal),
        literal.sql
    );
}

// ===================================================================
// Manager
// ===================================================================

#[test]
fn manager_selects_dialect_from_config() {
    let config = DatabaseConfig::from_json(
        r#"{
            "default": "primary",
            "connections": {
                "primary": { "driver": "recording", "grammar": "mysql" },
                "embedded": { "driver": "recording", "grammar": "literal" }
            }
        }"#,
    )
    .unwrap();

    let mut manager = DatabaseManager::new(config);
    manager.extend("recording", || Box::new(Recording::default()));

    let primary = manager.connection(None).unwrap();
    assert_eq!(primary.grammar(), Grammar::MySql);
    primary.table("users").where_("id", 1).get().unwrap();

    let embedded = manager.connection(Some("embedded")).unwrap();
    let compiled = embedded.table("users").where_("id", 1).to_sql().unwrap();
    assert_eq!(compiled.sql, "SELECT * FROM users WHERE id = 1");
}

#[test]
fn recording_connection_rejects_unknown_grammar() {
    let mut conn = Recording::default();
    let err = conn
        .connect(&ConnectionConfig::new("recording").grammar("oracle"))
        .unwrap_err();
    assert!(err.to_string().contains("oracle"));
    assert_eq!(conn.grammar(), Grammar::Generic);
}
