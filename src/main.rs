//! Licella Cost Calculator
//!
//! Registers purchased inputs ("insumos") and records production runs
//! that consume them, computing per-run and per-unit production cost.

mod calculator;
mod db;
mod format;
mod models;
mod parse;
mod units;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;

use crate::format::{format_date, format_price, unit_label};
use crate::models::{InputItem, ProductionRun, UsageRequest};
use crate::units::Unit;

#[derive(Parser)]
#[command(name = "licella-calculator")]
#[command(about = "Production cost calculator for small batch producers")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, default_value = "licella_data.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a purchased input
    AddInput {
        /// Display name, e.g. "Wheat flour"
        name: String,

        /// Unit the stock is tracked in: g, kg, un, ml or l
        unit: String,

        /// Quantity purchased, in the given unit (comma decimals accepted)
        quantity: String,

        /// Total amount paid (comma decimals accepted)
        paid: String,
    },

    /// List registered inputs and their remaining stock
    ListInputs,

    /// Remove an input from the catalog
    RemoveInput {
        /// Input id
        id: i64,
    },

    /// Record a production run and compute its cost
    Produce {
        /// Product name
        product: String,

        /// Number of units produced
        #[arg(short, long)]
        quantity: u32,

        /// Input usage as ID=QTY[UNIT], e.g. 1=200g or 2=1,5kg (repeatable);
        /// omit the unit to use the input's own
        #[arg(short, long = "use", value_name = "SPEC")]
        uses: Vec<String>,
    },

    /// Show recorded production runs, most recent first
    History {
        /// Show per-input line details
        #[arg(short, long)]
        verbose: bool,
    },

    /// Remove a production run from the history
    RemoveRun {
        /// Run id
        id: i64,
    },

    /// Clear the entire production history
    ClearHistory,

    /// Export the catalog and history as JSON
    Export,

    /// Initialize empty database with schema
    Init,
}

/// Everything the store holds, in export order
#[derive(Serialize)]
struct ExportData {
    inputs: Vec<InputItem>,
    runs: Vec<ProductionRun>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::AddInput {
            name,
            unit,
            quantity,
            paid,
        } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("input name must not be empty");
            }
            let unit: Unit = unit.parse().map_err(anyhow::Error::msg)?;
            let total_quantity = parse::parse_decimal(&quantity).context("invalid quantity")?;
            let paid_amount = parse::parse_decimal(&paid).context("invalid amount paid")?;
            if total_quantity <= 0.0 {
                bail!("quantity purchased must be positive");
            }
            if paid_amount <= 0.0 {
                bail!("amount paid must be positive");
            }

            let item = db::insert_input(&conn, name, unit, total_quantity, paid_amount)?;
            println!(
                "Registered input #{}: {} - {} {} for R$ {}",
                item.id,
                item.name,
                item.total_quantity,
                unit_label(item.total_quantity, item.unit),
                format_price(item.paid_amount, 2)
            );
            println!(
                "  Cost per {}: R$ {}",
                unit_label(1.0, item.unit),
                format_price(item.cost_per_unit, 4)
            );
        }

        Commands::ListInputs => {
            let inputs = db::list_inputs(&conn)?;
            if inputs.is_empty() {
                println!("No inputs registered yet. Run 'add-input' first.");
            } else {
                println!(
                    "{:<4} {:<24} {:>10} {:>12} {:<4} {:>10} {:>14}",
                    "ID", "Name", "Total", "Remaining", "Unit", "Paid", "Cost/unit"
                );
                println!("{}", "-".repeat(84));
                for item in inputs {
                    let marker = if item.is_depleted() { "  [depleted]" } else { "" };
                    println!(
                        "{:<4} {:<24} {:>10} {:>12} {:<4} {:>10} {:>14}{}",
                        item.id,
                        item.name,
                        item.total_quantity,
                        item.remaining_quantity,
                        item.unit.symbol(),
                        format_price(item.paid_amount, 2),
                        format_price(item.cost_per_unit, 4),
                        marker
                    );
                }
            }
        }

        Commands::RemoveInput { id } => {
            if db::remove_input(&conn, id)? {
                println!("Input #{} removed", id);
            } else {
                println!("No input with id {}", id);
            }
        }

        Commands::Produce {
            product,
            quantity,
            uses,
        } => {
            let product = product.trim();
            if product.is_empty() {
                bail!("product name must not be empty");
            }
            if quantity == 0 {
                bail!("quantity produced must be at least 1");
            }

            let mut catalog = db::list_inputs(&conn)?;

            let mut requests = Vec::new();
            for raw in &uses {
                let spec = parse::parse_usage_spec(raw)?;
                let item = catalog
                    .iter()
                    .find(|item| item.id == spec.input_id)
                    .with_context(|| format!("no input with id {}", spec.input_id))?;
                requests.push(UsageRequest {
                    input_id: spec.input_id,
                    quantity: spec.quantity,
                    unit: spec.unit.unwrap_or(item.unit),
                });
            }

            let run_id = db::next_run_id(&conn)?;
            let recorded_at = Local::now().naive_local();
            let run = calculator::allocate(
                &mut catalog,
                &requests,
                product,
                quantity,
                run_id,
                recorded_at,
            )?;
            db::apply_allocation(&mut conn, &catalog, &run)?;

            println!("{}", format::run_report(&run));
        }

        Commands::History { verbose } => {
            let runs = db::list_runs(&conn)?;
            if runs.is_empty() {
                println!("No production runs recorded yet.");
            } else if verbose {
                for run in &runs {
                    println!("#{}", run.id);
                    println!("{}", format::run_report(run));
                }
            } else {
                println!(
                    "{:<4} {:<12} {:<24} {:>8} {:>12} {:>14}",
                    "ID", "Date", "Product", "Units", "Total (R$)", "Per unit (R$)"
                );
                println!("{}", "-".repeat(80));
                for run in &runs {
                    println!(
                        "{:<4} {:<12} {:<24} {:>8} {:>12} {:>14}",
                        run.id,
                        format_date(run.recorded_at),
                        run.product_name,
                        run.quantity_produced,
                        format_price(run.total_cost, 2),
                        format_price(run.cost_per_unit_produced, 2)
                    );
                }
            }
        }

        Commands::RemoveRun { id } => {
            if db::remove_run(&mut conn, id)? {
                println!("Run #{} removed from the history", id);
            } else {
                println!("No run with id {}", id);
            }
        }

        Commands::ClearHistory => {
            db::clear_history(&conn)?;
            println!("Production history cleared");
        }

        Commands::Export => {
            let data = ExportData {
                inputs: db::list_inputs(&conn)?,
                runs: db::list_runs(&conn)?,
            };
            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }
    }

    Ok(())
}
