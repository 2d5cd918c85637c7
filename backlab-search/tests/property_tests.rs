//! Property tests for grid enumeration and budget control.

use std::collections::BTreeMap;

use backlab_core::ParamSpec;
use backlab_search::{build_grid, GridError};
use proptest::prelude::*;

fn one_param(spec: ParamSpec) -> BTreeMap<String, ParamSpec> {
    BTreeMap::from([("p".to_string(), spec)])
}

proptest! {
    /// Integer enumeration always contains both bounds and no duplicates.
    #[test]
    fn integer_values_contain_bounds_without_dups(
        min in -500i64..500,
        span in 0i64..400,
        step in 1i64..50,
    ) {
        let max = min + span;
        let spec = ParamSpec::new(min as f64, min as f64, max as f64, step as f64);
        let grid = build_grid(&one_param(spec), &BTreeMap::new(), 1.0, u64::MAX, false)
            .unwrap();
        let values = &grid.params[0].values;

        prop_assert!(values.contains(&(min as f64)));
        prop_assert!(values.contains(&(max as f64)));
        let mut dedup = values.clone();
        dedup.dedup();
        prop_assert_eq!(&dedup, values);
        prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    /// Continuous enumeration also keeps its bounds despite rounding.
    #[test]
    fn continuous_values_contain_bounds(
        min in -50.0f64..50.0,
        span in 0.1f64..30.0,
        step in 0.1f64..5.0,
    ) {
        let min = (min * 10.0).round() / 10.0;
        let step = (step * 10.0).round() / 10.0;
        let max = ((min + span) * 10.0).round() / 10.0;
        let spec = ParamSpec::new(min, min, max, step);
        let grid = build_grid(&one_param(spec), &BTreeMap::new(), 1.0, u64::MAX, false)
            .unwrap();
        let values = &grid.params[0].values;

        prop_assert!(values.contains(&min));
        prop_assert!(values.contains(&max));
        prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    /// The estimated count is always the product of the per-parameter list
    /// lengths.
    #[test]
    fn count_is_product_of_list_lengths(
        a_max in 1i64..60,
        b_max in 1i64..60,
    ) {
        let specs = BTreeMap::from([
            ("a".to_string(), ParamSpec::new(1.0, 1.0, a_max as f64, 1.0)),
            ("b".to_string(), ParamSpec::new(1.0, 1.0, b_max as f64, 1.0)),
        ]);
        let grid = build_grid(&specs, &BTreeMap::new(), 1.0, u64::MAX, false).unwrap();
        let product: u64 = grid
            .params
            .iter()
            .map(|p| p.values.len() as u64)
            .product();
        prop_assert_eq!(grid.estimated_combinations, product);
        prop_assert_eq!(grid.combinations().count() as u64, product);
    }

    /// With auto-scaling on, the rescaled grid never exceeds its budget.
    #[test]
    fn rescaled_grid_respects_budget(
        a_max in 50i64..400,
        b_max in 50i64..400,
        budget in 4u64..200,
    ) {
        let specs = BTreeMap::from([
            ("a".to_string(), ParamSpec::new(1.0, 1.0, a_max as f64, 1.0)),
            ("b".to_string(), ParamSpec::new(1.0, 1.0, b_max as f64, 1.0)),
        ]);
        let grid = build_grid(&specs, &BTreeMap::new(), 1.0, budget, true).unwrap();
        prop_assert!(grid.estimated_combinations <= budget);
        prop_assert!(grid.step_multiplier >= 1);
    }

    /// With auto-scaling off, an over-budget grid reports its raw count.
    #[test]
    fn over_budget_error_carries_raw_count(
        a_max in 50i64..200,
    ) {
        let specs = BTreeMap::from([
            ("a".to_string(), ParamSpec::new(1.0, 1.0, a_max as f64, 1.0)),
            ("b".to_string(), ParamSpec::new(1.0, 1.0, 100.0, 1.0)),
        ]);
        let raw = a_max as u128 * 100;
        let err = build_grid(&specs, &BTreeMap::new(), 1.0, 10, false).unwrap_err();
        prop_assert_eq!(
            err,
            GridError::BudgetExceeded { raw_count: raw, budget: 10 }
        );
    }
}
