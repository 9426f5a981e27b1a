//! Measurement units and conversion between them

use std::fmt;
use std::str::FromStr;

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// The units a catalog input can be purchased and consumed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Grams,
    Kilograms,
    Count,
    Milliliters,
    Liters,
}

/// Class of physically comparable units; conversion is only meaningful
/// within a single dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Mass,
    Volume,
    Count,
}

impl Unit {
    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Grams | Unit::Kilograms => Dimension::Mass,
            Unit::Milliliters | Unit::Liters => Dimension::Volume,
            Unit::Count => Dimension::Count,
        }
    }

    /// Multiplier to the dimension's base unit (grams for mass,
    /// milliliters for volume). Volume maps 1:1 onto mass, assuming a
    /// density of 1 - the accepted business approximation.
    fn base_multiplier(self) -> f64 {
        match self {
            Unit::Grams | Unit::Milliliters | Unit::Count => 1.0,
            Unit::Kilograms | Unit::Liters => 1000.0,
        }
    }

    /// Canonical spelling, used for storage and JSON
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Grams => "grams",
            Unit::Kilograms => "kilograms",
            Unit::Count => "count",
            Unit::Milliliters => "milliliters",
            Unit::Liters => "liters",
        }
    }

    /// Short symbol for compact display
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Grams => "g",
            Unit::Kilograms => "kg",
            Unit::Count => "un",
            Unit::Milliliters => "ml",
            Unit::Liters => "L",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "g" | "gram" | "grams" => Ok(Unit::Grams),
            "kg" | "kilogram" | "kilograms" => Ok(Unit::Kilograms),
            "un" | "count" | "unit" | "units" => Ok(Unit::Count),
            "ml" | "milliliter" | "milliliters" => Ok(Unit::Milliliters),
            "l" | "liter" | "liters" => Ok(Unit::Liters),
            other => Err(format!(
                "unknown unit '{}' (expected g, kg, un, ml or l)",
                other
            )),
        }
    }
}

impl ToSql for Unit {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Unit {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Convert a quantity between units of the same dimension
///
/// Same-unit conversion is the identity. Pairs that span dimensions
/// (mass vs. volume, or anything involving counts) are not convertible;
/// the quantity passes through unchanged rather than failing, so data
/// entry is never blocked.
pub fn convert(quantity: f64, from: Unit, to: Unit) -> f64 {
    if from == to {
        return quantity;
    }

    match (from.dimension(), to.dimension()) {
        (Dimension::Mass, Dimension::Mass) | (Dimension::Volume, Dimension::Volume) => {
            quantity * from.base_multiplier() / to.base_multiplier()
        }
        _ => quantity,
    }
}
