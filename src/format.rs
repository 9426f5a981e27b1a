//! Display formatting for prices, units and dates
//!
//! Prices render with a comma decimal separator: 2 decimal places for
//! amounts, 4 for per-unit costs. None of this touches the stored
//! values; rounding happens only at display time.

use chrono::NaiveDateTime;

use crate::models::ProductionRun;
use crate::units::Unit;

/// Format a monetary value with a comma decimal separator
pub fn format_price(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}").replace('.', ",")
}

/// Unit name pluralized by quantity
pub fn unit_label(quantity: f64, unit: Unit) -> &'static str {
    let singular = quantity == 1.0;
    match unit {
        Unit::Grams => {
            if singular {
                "gram"
            } else {
                "grams"
            }
        }
        Unit::Kilograms => {
            if singular {
                "kilogram"
            } else {
                "kilograms"
            }
        }
        Unit::Count => {
            if singular {
                "unit"
            } else {
                "units"
            }
        }
        Unit::Milliliters => {
            if singular {
                "milliliter"
            } else {
                "milliliters"
            }
        }
        Unit::Liters => {
            if singular {
                "liter"
            } else {
                "liters"
            }
        }
    }
}

pub fn format_date(timestamp: NaiveDateTime) -> String {
    timestamp.format("%d/%m/%Y").to_string()
}

/// Format a production run as a readable report
pub fn run_report(run: &ProductionRun) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} ({})\n",
        run.product_name,
        format_date(run.recorded_at)
    ));
    output.push_str(&format!(
        "  Produced:      {} {}\n",
        run.quantity_produced,
        unit_label(f64::from(run.quantity_produced), Unit::Count)
    ));
    output.push_str(&format!(
        "  Total cost:    R$ {}\n",
        format_price(run.total_cost, 2)
    ));
    output.push_str(&format!(
        "  Cost per unit: R$ {}\n",
        format_price(run.cost_per_unit_produced, 2)
    ));

    output.push_str("  Inputs used:\n");
    for line in &run.lines {
        output.push_str(&format!(
            "    {} - {} {}: R$ {} (R$ {}/{})\n",
            line.input_name,
            line.quantity_used,
            unit_label(line.quantity_used, line.unit),
            format_price(line.line_cost, 2),
            format_price(line.cost_per_unit, 4),
            line.unit
        ));
    }

    output
}
