//! Invoicing - Builder Walkthrough
//!
//! Records invoices for two clients in the in-memory store and answers a few
//! billing questions through the query builder:
//! - Outstanding invoices per client
//! - Totals and averages over paid invoices
//! - Marking overdue invoices
//! - The same query compiled for every grammar
//!
//! Run with: cargo run --example invoicing -p quarry-memory

use quarry_core::{Connection, Direction, Grammar, Operator, SqlValue};
use quarry_memory::{MemoryConnection, Store};

// =============================================================================
// DATA
// =============================================================================

const INVOICES: &[(&str, &str, i64, &str)] = &[
    ("INV-001", "Acme", 1_200, "paid"),
    ("INV-002", "Acme", 450, "sent"),
    ("INV-003", "Globex", 3_000, "paid"),
    ("INV-004", "Globex", 780, "sent"),
    ("INV-005", "Acme", 99, "draft"),
];

fn seed(conn: &mut MemoryConnection) -> quarry_core::Result<()> {
    conn.table("invoices").create_table()?;
    for (number, client, amount, status) in INVOICES {
        conn.table("invoices").insert([
            ("number", SqlValue::Text((*number).into())),
            ("client", SqlValue::Text((*client).into())),
            ("amount", SqlValue::Int(*amount)),
            ("status", SqlValue::Text((*status).into())),
        ])?;
    }
    Ok(())
}

// =============================================================================
// QUERIES
// =============================================================================

fn main() -> quarry_core::Result<()> {
    let mut conn = MemoryConnection::with_store(Store::new()).with_grammar(Grammar::MySql);
    seed(&mut conn)?;

    println!("Outstanding for Acme:");
    let outstanding = conn
        .table("invoices")
        .select(&["number", "amount"])
        .where_("client", "Acme")
        .where_not_in("status", vec!["paid", "draft"])
        .order_by("number", Direction::Asc)
        .get()?;
    for row in &outstanding {
        println!("  {} {}", row["number"], row["amount"]);
    }

    let paid_total = conn.table("invoices").where_("status", "paid").sum("amount")?;
    let paid_avg = conn.table("invoices").where_("status", "paid").avg("amount")?;
    println!("Paid total: {paid_total}, average: {paid_avg}");

    let overdue = conn
        .table("invoices")
        .where_("status", "sent")
        .where_op("amount", Operator::Gt, 500)
        .update([("status", "overdue")])?;
    println!("Marked {overdue} invoice(s) overdue");

    let largest = conn
        .table("invoices")
        .order_by_desc("amount")
        .first()?
        .map(|row| row["number"].to_string());
    println!("Largest invoice: {}", largest.unwrap_or_default());

    println!();
    for grammar in [Grammar::Generic, Grammar::MySql, Grammar::Literal] {
        let compiled = conn
            .table("invoices")
            .with_grammar(grammar)
            .where_("client", "Globex")
            .where_between("amount", 100, 1_000)
            .to_sql()?;
        println!("{grammar:>8}: {}", compiled.sql);
        if !compiled.bindings.is_empty() {
            println!("{:>8}  bindings: {:?}", "", compiled.bindings);
        }
    }

    Ok(())
}
