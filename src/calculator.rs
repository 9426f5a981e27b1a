//! Cost allocation for production runs

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{InputItem, ProductionRun, UsageLine, UsageRequest};
use crate::units::{Unit, convert};

/// Why a production run was rejected. Both cases are expected and
/// user-facing; the catalog is left untouched on either.
#[derive(Debug, Error, PartialEq)]
pub enum AllocationError {
    /// Quantities are reported in the input's native unit, the unit its
    /// stock is tracked in
    #[error(
        "insufficient stock of {name}: requested {requested} {unit}, available {available} {unit}"
    )]
    InsufficientStock {
        name: String,
        requested: f64,
        available: f64,
        unit: Unit,
    },

    #[error("no input usage specified: a production run must consume at least one input")]
    NoUsageSpecified,
}

/// Allocate the requested input usage to a new production run
///
/// Converts each request to the input's native unit, prices it at the
/// input's fixed cost-per-unit, and on success decrements the catalog's
/// remaining quantities and returns the itemized run. Requests with a
/// non-positive quantity, or naming an unknown input, are skipped.
///
/// Every line is validated before any stock is decremented, so a failed
/// allocation leaves the catalog exactly as it was.
pub fn allocate(
    catalog: &mut [InputItem],
    requests: &[UsageRequest],
    product_name: &str,
    quantity_produced: u32,
    run_id: i64,
    recorded_at: NaiveDateTime,
) -> Result<ProductionRun, AllocationError> {
    let mut planned: Vec<(usize, f64, UsageLine)> = Vec::new();

    for request in requests {
        if request.quantity <= 0.0 {
            continue;
        }
        let Some(index) = catalog.iter().position(|item| item.id == request.input_id) else {
            continue;
        };
        let item = &catalog[index];

        let converted = convert(request.quantity, request.unit, item.unit);

        // An input may appear more than once in a run; lines already
        // planned in this call count against its availability.
        let pending: f64 = planned
            .iter()
            .filter(|(i, _, _)| *i == index)
            .map(|(_, q, _)| q)
            .sum();
        let available = item.remaining_quantity - pending;

        if converted > available {
            return Err(AllocationError::InsufficientStock {
                name: item.name.clone(),
                requested: converted,
                available,
                unit: item.unit,
            });
        }

        planned.push((
            index,
            converted,
            UsageLine {
                input_name: item.name.clone(),
                quantity_used: request.quantity,
                unit: request.unit,
                cost_per_unit: item.cost_per_unit,
                line_cost: converted * item.cost_per_unit,
            },
        ));
    }

    if planned.is_empty() {
        return Err(AllocationError::NoUsageSpecified);
    }

    let mut total_cost = 0.0;
    let mut lines = Vec::with_capacity(planned.len());
    for (index, converted, line) in planned {
        catalog[index].remaining_quantity -= converted;
        total_cost += line.line_cost;
        lines.push(line);
    }

    Ok(ProductionRun {
        id: run_id,
        recorded_at,
        product_name: product_name.to_string(),
        quantity_produced,
        lines,
        total_cost,
        cost_per_unit_produced: total_cost / f64::from(quantity_produced),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn flour_1kg_for_50() -> InputItem {
        // 1000 g for R$ 50 -> 0.05/g
        InputItem::new(1, "Flour".to_string(), Unit::Grams, 1000.0, 50.0)
    }

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 12)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn request(input_id: i64, quantity: f64, unit: Unit) -> UsageRequest {
        UsageRequest {
            input_id,
            quantity,
            unit,
        }
    }

    #[test]
    fn allocates_and_decrements_stock() {
        let mut catalog = vec![flour_1kg_for_50()];
        let requests = [request(1, 200.0, Unit::Grams)];

        let run = allocate(&mut catalog, &requests, "Bread", 10, 1, stamp()).unwrap();

        assert_eq!(run.lines.len(), 1);
        assert_eq!(run.lines[0].line_cost, 10.0);
        assert_eq!(run.total_cost, 10.0);
        assert_eq!(run.cost_per_unit_produced, 1.0);
        assert_eq!(catalog[0].remaining_quantity, 800.0);
    }

    #[test]
    fn insufficient_stock_leaves_catalog_untouched() {
        let mut catalog = vec![flour_1kg_for_50()];
        let requests = [request(1, 1500.0, Unit::Grams)];

        let err = allocate(&mut catalog, &requests, "Bread", 10, 1, stamp()).unwrap_err();

        assert_eq!(
            err,
            AllocationError::InsufficientStock {
                name: "Flour".to_string(),
                requested: 1500.0,
                available: 1000.0,
                unit: Unit::Grams,
            }
        );
        assert_eq!(catalog[0].remaining_quantity, 1000.0);
    }

    #[test]
    fn failure_on_a_later_line_rolls_back_earlier_ones() {
        let mut catalog = vec![
            flour_1kg_for_50(),
            InputItem::new(2, "Eggs".to_string(), Unit::Count, 12.0, 18.0),
        ];
        let requests = [
            request(1, 200.0, Unit::Grams),
            request(2, 30.0, Unit::Count),
        ];

        let err = allocate(&mut catalog, &requests, "Cake", 5, 1, stamp()).unwrap_err();

        assert!(matches!(err, AllocationError::InsufficientStock { .. }));
        assert_eq!(catalog[0].remaining_quantity, 1000.0);
        assert_eq!(catalog[1].remaining_quantity, 12.0);
    }

    #[test]
    fn zero_and_unknown_requests_are_skipped() {
        let mut catalog = vec![flour_1kg_for_50()];
        let requests = [
            request(1, 0.0, Unit::Grams),
            request(99, 5.0, Unit::Grams),
            request(1, 100.0, Unit::Grams),
        ];

        let run = allocate(&mut catalog, &requests, "Bread", 1, 1, stamp()).unwrap();

        assert_eq!(run.lines.len(), 1);
        assert_eq!(catalog[0].remaining_quantity, 900.0);
    }

    #[test]
    fn all_zero_usage_is_rejected() {
        let mut catalog = vec![flour_1kg_for_50()];
        let requests = [request(1, 0.0, Unit::Grams)];

        let err = allocate(&mut catalog, &requests, "Bread", 10, 1, stamp()).unwrap_err();
        assert_eq!(err, AllocationError::NoUsageSpecified);

        let err = allocate(&mut catalog, &[], "Bread", 10, 1, stamp()).unwrap_err();
        assert_eq!(err, AllocationError::NoUsageSpecified);
    }

    #[test]
    fn sequential_runs_accumulate_depletion() {
        let mut catalog = vec![flour_1kg_for_50()];

        allocate(
            &mut catalog,
            &[request(1, 200.0, Unit::Grams)],
            "Bread",
            10,
            1,
            stamp(),
        )
        .unwrap();
        allocate(
            &mut catalog,
            &[request(1, 300.0, Unit::Grams)],
            "Bread",
            10,
            2,
            stamp(),
        )
        .unwrap();

        assert_eq!(catalog[0].remaining_quantity, 500.0);
    }

    #[test]
    fn converts_requested_units_to_the_native_unit() {
        let mut catalog = vec![flour_1kg_for_50()];
        // 0.2 kg against a stock tracked in grams
        let requests = [request(1, 0.2, Unit::Kilograms)];

        let run = allocate(&mut catalog, &requests, "Bread", 1, 1, stamp()).unwrap();

        assert_eq!(run.lines[0].line_cost, 10.0);
        // the line keeps the quantity and unit as entered
        assert_eq!(run.lines[0].quantity_used, 0.2);
        assert_eq!(run.lines[0].unit, Unit::Kilograms);
        assert_eq!(catalog[0].remaining_quantity, 800.0);
    }

    #[test]
    fn cost_per_unit_produced_divides_total() {
        for quantity_produced in [1, 10, 1000] {
            let mut catalog = vec![flour_1kg_for_50()];
            let requests = [request(1, 500.0, Unit::Grams)];

            let run = allocate(
                &mut catalog,
                &requests,
                "Bread",
                quantity_produced,
                1,
                stamp(),
            )
            .unwrap();

            assert_eq!(
                run.cost_per_unit_produced,
                run.total_cost / f64::from(quantity_produced)
            );
        }
    }

    #[test]
    fn totals_sum_across_inputs_with_different_units() {
        let mut catalog = vec![
            // 2 kg of sugar for R$ 30 -> 15/kg
            InputItem::new(1, "Sugar".to_string(), Unit::Kilograms, 2.0, 30.0),
            // 12 eggs for R$ 18 -> 1.5 each
            InputItem::new(2, "Eggs".to_string(), Unit::Count, 12.0, 18.0),
        ];
        let requests = [
            request(1, 500.0, Unit::Grams), // 0.5 kg -> 7.5
            request(2, 4.0, Unit::Count),   // -> 6.0
        ];

        let run = allocate(&mut catalog, &requests, "Cake", 6, 1, stamp()).unwrap();

        assert_eq!(run.lines[0].line_cost, 7.5);
        assert_eq!(run.lines[1].line_cost, 6.0);
        assert_eq!(run.total_cost, 13.5);
        assert_eq!(catalog[0].remaining_quantity, 1.5);
        assert_eq!(catalog[1].remaining_quantity, 8.0);
    }

    #[test]
    fn repeated_input_counts_earlier_lines_against_stock() {
        let mut catalog = vec![flour_1kg_for_50()];
        let requests = [
            request(1, 700.0, Unit::Grams),
            request(1, 400.0, Unit::Grams),
        ];

        let err = allocate(&mut catalog, &requests, "Bread", 1, 1, stamp()).unwrap_err();

        assert_eq!(
            err,
            AllocationError::InsufficientStock {
                name: "Flour".to_string(),
                requested: 400.0,
                available: 300.0,
                unit: Unit::Grams,
            }
        );
        assert_eq!(catalog[0].remaining_quantity, 1000.0);
    }

    #[test]
    fn run_snapshot_carries_identity_and_product() {
        let mut catalog = vec![flour_1kg_for_50()];
        let requests = [request(1, 100.0, Unit::Grams)];

        let run = allocate(&mut catalog, &requests, "Bread", 4, 7, stamp()).unwrap();

        assert_eq!(run.id, 7);
        assert_eq!(run.recorded_at, stamp());
        assert_eq!(run.product_name, "Bread");
        assert_eq!(run.quantity_produced, 4);
        assert_eq!(run.lines[0].input_name, "Flour");
        assert_eq!(run.lines[0].cost_per_unit, 0.05);
    }
}
