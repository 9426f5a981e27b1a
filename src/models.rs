//! Data models for catalog inputs and production runs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// A raw material purchased in bulk and consumed across production runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputItem {
    pub id: i64,
    pub name: String,
    pub unit: Unit,          // stock and cost fields are expressed in this unit
    pub total_quantity: f64, // as purchased; fixed after creation
    pub paid_amount: f64,    // total money paid; fixed after creation
    pub cost_per_unit: f64,  // paid_amount / total_quantity, fixed at creation
    pub remaining_quantity: f64,
}

impl InputItem {
    pub fn new(id: i64, name: String, unit: Unit, total_quantity: f64, paid_amount: f64) -> Self {
        InputItem {
            id,
            name,
            unit,
            total_quantity,
            paid_amount,
            cost_per_unit: paid_amount / total_quantity,
            remaining_quantity: total_quantity,
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.remaining_quantity <= 0.0
    }
}

/// Requested consumption of one input for a production run
#[derive(Debug, Clone)]
pub struct UsageRequest {
    pub input_id: i64,
    pub quantity: f64,
    pub unit: Unit,
}

/// One consumed input as recorded on a run, snapshotted at allocation
/// time: quantity and unit as the user entered them, cost in the input's
/// native unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageLine {
    pub input_name: String,
    pub quantity_used: f64,
    pub unit: Unit,
    pub cost_per_unit: f64,
    pub line_cost: f64,
}

/// A single batch-production event; a historical record independent of
/// later catalog changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionRun {
    pub id: i64,
    pub recorded_at: NaiveDateTime,
    pub product_name: String,
    pub quantity_produced: u32,
    pub lines: Vec<UsageLine>,
    pub total_cost: f64,
    pub cost_per_unit_produced: f64,
}
