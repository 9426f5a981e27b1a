//! Parsing of user-entered quantities and usage specs
//!
//! Users enter decimals with either a comma or a dot separator ("1,5"
//! and "1.5" are the same number). Everything here is validated before
//! the calculator is invoked; the core never sees malformed input.

use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;

use crate::units::Unit;

/// A single `--use` argument, parsed from `ID=QTY[UNIT]`
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSpec {
    pub input_id: i64,
    pub quantity: f64,
    /// None means the input's native unit
    pub unit: Option<Unit>,
}

/// Parse a non-negative decimal, accepting comma or dot as the separator
pub fn parse_decimal(input: &str) -> Result<f64> {
    let cleaned = input.trim();
    if cleaned.is_empty() {
        bail!("empty number");
    }

    let number_re = Regex::new(r"^[0-9]+([.,][0-9]+)?$")?;
    if !number_re.is_match(cleaned) {
        bail!("'{}' is not a valid number", input);
    }

    Ok(cleaned.replace(',', ".").parse()?)
}

/// Parse a usage spec of the form `ID=QTY[UNIT]`, e.g. `1=200g`,
/// `2=1,5kg` or `3=10` (unit omitted)
pub fn parse_usage_spec(spec: &str) -> Result<UsageSpec> {
    let spec_re = Regex::new(r"^([0-9]+)\s*=\s*([0-9]+(?:[.,][0-9]+)?)\s*([A-Za-z]+)?$")?;

    let caps = spec_re
        .captures(spec.trim())
        .with_context(|| format!("invalid usage spec '{}', expected ID=QTY[UNIT]", spec))?;

    let input_id = caps[1].parse()?;
    let quantity = caps[2].replace(',', ".").parse()?;
    let unit = match caps.get(3) {
        Some(m) => Some(m.as_str().parse::<Unit>().map_err(|e| anyhow!(e))?),
        None => None,
    };

    Ok(UsageSpec {
        input_id,
        quantity,
        unit,
    })
}
