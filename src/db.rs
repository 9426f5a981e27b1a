//! Database schema and operations
//!
//! SQLite is the store of record for the input catalog and the
//! production history. The calculator itself never touches the
//! database; callers load the catalog, allocate, then persist the
//! outcome through `apply_allocation`.

use anyhow::Result;
use rusqlite::Connection;

use crate::models::{InputItem, ProductionRun, UsageLine};
use crate::units::Unit;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Purchased raw materials and their remaining stock
        CREATE TABLE IF NOT EXISTS inputs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            unit TEXT NOT NULL,
            total_quantity REAL NOT NULL,
            paid_amount REAL NOT NULL,
            cost_per_unit REAL NOT NULL,
            remaining_quantity REAL NOT NULL
        );

        -- Recorded production runs
        CREATE TABLE IF NOT EXISTS runs (
            id INTEGER PRIMARY KEY,
            recorded_at TEXT NOT NULL,
            product_name TEXT NOT NULL,
            quantity_produced INTEGER NOT NULL,
            total_cost REAL NOT NULL,
            cost_per_unit_produced REAL NOT NULL
        );

        -- Per-input consumption snapshots for each run
        CREATE TABLE IF NOT EXISTS run_lines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id INTEGER NOT NULL,
            input_name TEXT NOT NULL,
            quantity_used REAL NOT NULL,
            unit TEXT NOT NULL,
            cost_per_unit REAL NOT NULL,
            line_cost REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_run_lines_run ON run_lines(run_id);
        "#,
    )?;
    Ok(())
}

/// Register a new input; the store assigns its id
pub fn insert_input(
    conn: &Connection,
    name: &str,
    unit: Unit,
    total_quantity: f64,
    paid_amount: f64,
) -> Result<InputItem> {
    let item = InputItem::new(0, name.to_string(), unit, total_quantity, paid_amount);
    conn.execute(
        "INSERT INTO inputs (name, unit, total_quantity, paid_amount, cost_per_unit, remaining_quantity)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            &item.name,
            item.unit,
            item.total_quantity,
            item.paid_amount,
            item.cost_per_unit,
            item.remaining_quantity,
        ),
    )?;

    Ok(InputItem {
        id: conn.last_insert_rowid(),
        ..item
    })
}

/// List the input catalog in registration order
pub fn list_inputs(conn: &Connection) -> Result<Vec<InputItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, unit, total_quantity, paid_amount, cost_per_unit, remaining_quantity
         FROM inputs ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(InputItem {
            id: row.get(0)?,
            name: row.get(1)?,
            unit: row.get(2)?,
            total_quantity: row.get(3)?,
            paid_amount: row.get(4)?,
            cost_per_unit: row.get(5)?,
            remaining_quantity: row.get(6)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Remove an input from the catalog. History is untouched: runs keep
/// their own name/cost snapshots.
pub fn remove_input(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM inputs WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

/// Next run id: a monotonic counter over the store
pub fn next_run_id(conn: &Connection) -> Result<i64> {
    let id = conn.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM runs", [], |row| {
        row.get(0)
    })?;
    Ok(id)
}

/// Persist a successful allocation: the decremented remaining
/// quantities plus the new run and its lines, in one transaction.
pub fn apply_allocation(
    conn: &mut Connection,
    catalog: &[InputItem],
    run: &ProductionRun,
) -> Result<()> {
    let tx = conn.transaction()?;

    for item in catalog {
        tx.execute(
            "UPDATE inputs SET remaining_quantity = ?1 WHERE id = ?2",
            (item.remaining_quantity, item.id),
        )?;
    }

    tx.execute(
        "INSERT INTO runs (id, recorded_at, product_name, quantity_produced, total_cost, cost_per_unit_produced)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            run.id,
            run.recorded_at,
            &run.product_name,
            run.quantity_produced,
            run.total_cost,
            run.cost_per_unit_produced,
        ),
    )?;

    for line in &run.lines {
        tx.execute(
            "INSERT INTO run_lines (run_id, input_name, quantity_used, unit, cost_per_unit, line_cost)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                run.id,
                &line.input_name,
                line.quantity_used,
                line.unit,
                line.cost_per_unit,
                line.line_cost,
            ),
        )?;
    }

    tx.commit()?;
    Ok(())
}

/// List recorded runs, most recent first
pub fn list_runs(conn: &Connection) -> Result<Vec<ProductionRun>> {
    let mut stmt = conn.prepare(
        "SELECT id, recorded_at, product_name, quantity_produced, total_cost, cost_per_unit_produced
         FROM runs ORDER BY id DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(ProductionRun {
            id: row.get(0)?,
            recorded_at: row.get(1)?,
            product_name: row.get(2)?,
            quantity_produced: row.get(3)?,
            lines: Vec::new(),
            total_cost: row.get(4)?,
            cost_per_unit_produced: row.get(5)?,
        })
    })?;

    let mut runs = Vec::new();
    for row in rows {
        runs.push(row?);
    }

    let mut line_stmt = conn.prepare(
        "SELECT input_name, quantity_used, unit, cost_per_unit, line_cost
         FROM run_lines WHERE run_id = ?1 ORDER BY id",
    )?;
    for run in &mut runs {
        let lines = line_stmt.query_map([run.id], |row| {
            Ok(UsageLine {
                input_name: row.get(0)?,
                quantity_used: row.get(1)?,
                unit: row.get(2)?,
                cost_per_unit: row.get(3)?,
                line_cost: row.get(4)?,
            })
        })?;
        for line in lines {
            run.lines.push(line?);
        }
    }

    Ok(runs)
}

/// Remove a run and its lines from the history
pub fn remove_run(conn: &mut Connection, id: i64) -> Result<bool> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM run_lines WHERE run_id = ?1", [id])?;
    let affected = tx.execute("DELETE FROM runs WHERE id = ?1", [id])?;
    tx.commit()?;
    Ok(affected > 0)
}

/// Clear the entire production history
pub fn clear_history(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM run_lines;
        DELETE FROM runs;
        "#,
    )?;
    Ok(())
}
