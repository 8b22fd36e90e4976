//! Property-based tests for the rule engine, binning and interpolation.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p lcsift --test property_tests
//!
//! # More cases
//! PROPTEST_CASES=10000 cargo test -p lcsift --test property_tests
//! ```

use proptest::prelude::*;

use lcsift::binning::{aggregate, BinSpec, Weighting};
use lcsift::completeness::{Interpolant, OUT_OF_DOMAIN};
use lcsift::metrics::{prepare, MetricDefinition, MetricDefinitions, NIGHT};
use lcsift::rules::{evaluate_conjunction, Operator, ResolvedRule};
use lcsift::{Column, Table};

// =============================================================================
// Test Strategies
// =============================================================================

/// Finite values with the occasional NaN.
fn cell() -> impl Strategy<Value = f64> {
    prop_oneof![
        9 => -100.0..100.0f64,
        1 => Just(f64::NAN),
    ]
}

fn operator() -> impl Strategy<Value = Operator> {
    prop::sample::select(Operator::ALL.to_vec())
}

/// Reference comparison: unordered pairs never match.
fn naive(op: Operator, lhs: f64, rhs: f64) -> bool {
    if lhs.is_nan() || rhs.is_nan() {
        return false;
    }
    match op {
        Operator::Eq => lhs == rhs,
        Operator::Ne => lhs != rhs,
        Operator::Lt => lhs < rhs,
        Operator::Le => lhs <= rhs,
        Operator::Gt => lhs > rhs,
        Operator::Ge => lhs >= rhs,
    }
}

// =============================================================================
// Rule Engine Properties
// =============================================================================

proptest! {
    #[test]
    fn float_rule_matches_naive_scan(
        values in prop::collection::vec(cell(), 0..50),
        op in operator(),
        threshold in -100.0..100.0f64,
    ) {
        let table = Table::from_columns([("x", Column::Float(values.clone()))]).unwrap();
        let mask = ResolvedRule::new("x", op, threshold).evaluate(&table).unwrap();

        let expected: Vec<bool> = values.iter().map(|v| naive(op, *v, threshold)).collect();
        prop_assert_eq!(mask, expected);
    }

    #[test]
    fn int_column_against_float_threshold(
        values in prop::collection::vec(-20i64..20, 0..50),
        op in operator(),
        threshold in -20.0..20.0f64,
    ) {
        let table = Table::from_columns([("n", Column::Int(values.clone()))]).unwrap();
        let mask = ResolvedRule::new("n", op, threshold).evaluate(&table).unwrap();

        let expected: Vec<bool> = values.iter().map(|v| naive(op, *v as f64, threshold)).collect();
        prop_assert_eq!(mask, expected);
    }

    #[test]
    fn conjunction_is_and_of_masks(
        values in prop::collection::vec(cell(), 0..50),
        low in -100.0..0.0f64,
        high in 0.0..100.0f64,
    ) {
        let table = Table::from_columns([("z", Column::Float(values.clone()))]).unwrap();
        let rules = [
            ResolvedRule::new("z", Operator::Ge, low),
            ResolvedRule::new("z", Operator::Lt, high),
        ];
        let mask = evaluate_conjunction(&table, &rules).unwrap();

        let expected: Vec<bool> = values.iter().map(|v| *v >= low && *v < high).collect();
        prop_assert_eq!(mask, expected);
    }

    #[test]
    fn ne_never_selects_nan(op in operator(), threshold in -1.0..1.0f64) {
        let table = Table::from_columns([("x", Column::from(vec![f64::NAN]))]).unwrap();
        let mask = ResolvedRule::new("x", op, threshold).evaluate(&table).unwrap();
        prop_assert_eq!(mask, vec![false]);
    }
}

// =============================================================================
// Metric Extraction Properties
// =============================================================================

proptest! {
    #[test]
    fn prepare_is_deterministic(
        times in prop::collection::vec(59000.0..59030.0f64, 1..30),
        snr in 0.0..5.0f64,
    ) {
        let n = times.len();
        let flux: Vec<f64> = (0..n).map(|i| (i % 7) as f64).collect();
        let lc = Table::from_columns([
            ("time", Column::Float(times)),
            ("flux", Column::Float(flux)),
            ("fluxerr", Column::from(vec![1.0; n])),
            ("band", Column::Str((0..n).map(|i| format!("b{}", i % 3)).collect())),
        ])
        .unwrap()
        .with_meta("z", 0.05)
        .with_meta("t0", 59010.0);

        let first = prepare(&lc, snr).unwrap();
        let second = prepare(&lc, snr).unwrap();
        prop_assert_eq!(&first, &second);

        // Nights start at 1 and never decrease.
        if first.row_count() > 0 {
            let nights = first.float_values(NIGHT).unwrap();
            prop_assert_eq!(nights[0], 1.0);
            prop_assert!(nights.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn unique_count_never_exceeds_count(
        times in prop::collection::vec(59000.0..59010.0f64, 1..30),
    ) {
        let n = times.len();
        let lc = Table::from_columns([
            ("time", Column::Float(times)),
            ("flux", Column::from(vec![10.0; n])),
            ("fluxerr", Column::from(vec![1.0; n])),
            ("band", Column::from(vec!["ztfg"; n])),
        ])
        .unwrap()
        .with_meta("z", 0.05)
        .with_meta("t0", 59005.0);

        let defs = MetricDefinitions::new(vec![
            MetricDefinition::new("n_phot", "night", "phase", "float", ">=", "-100"),
            MetricDefinition::new("n_epochs", "night", "phase", "float", ">=", "-100"),
        ]);
        let outcome = lcsift::metrics::measure(&lc, &defs, 1.0).unwrap();
        prop_assert_eq!(outcome.value("n_phot"), n as i64);
        prop_assert!(outcome.value("n_epochs") <= outcome.value("n_phot"));
        prop_assert!(outcome.value("n_epochs") >= 1);
    }
}

// =============================================================================
// Binning Properties
// =============================================================================

proptest! {
    #[test]
    fn bins_ignore_row_order(
        rows in prop::collection::vec((0.0..0.1f64, 0.0..0.1f64, any::<bool>()), 0..40),
    ) {
        let build = |rows: &[(f64, f64, bool)]| {
            Table::from_columns([
                ("z", Column::Float(rows.iter().map(|r| r.0).collect())),
                ("c_err", Column::Float(rows.iter().map(|r| r.1).collect())),
                ("sel", Column::Int(rows.iter().map(|r| i64::from(r.2)).collect())),
            ])
            .unwrap()
        };
        let mut reversed = rows.clone();
        reversed.reverse();

        let bins = BinSpec::new(0.0, 0.1, 0.02).unwrap();
        let a = aggregate(&build(&rows), "c_err", &bins, Weighting::Std).unwrap();
        let b = aggregate(&build(&reversed), "c_err", &bins, Weighting::Std).unwrap();
        prop_assert_eq!(format!("{:?}", a), format!("{:?}", b));

        let selected = rows.iter().filter(|r| r.2).count();
        prop_assert_eq!(a.iter().map(|s| s.count).sum::<usize>(), selected);
    }
}

// =============================================================================
// Interpolation Properties
// =============================================================================

proptest! {
    #[test]
    fn interpolation_stays_within_range(
        ys in prop::collection::vec(0.0..1.0f64, 2..20),
        probe in 0.0..1.0f64,
    ) {
        // Strictly increasing x on a fixed grid.
        let points: Vec<(f64, f64)> = ys.iter().enumerate().map(|(i, y)| (i as f64, *y)).collect();
        let interp = Interpolant::new(points);
        let x = probe * (ys.len() - 1) as f64;

        let value = interp.eval(x);
        let low = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let high = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(value >= low - 1e-12 && value <= high + 1e-12);
    }

    #[test]
    fn interpolation_hits_grid_exactly(
        ys in prop::collection::vec(-1.0..1.0f64, 2..20),
        index in any::<prop::sample::Index>(),
    ) {
        let points: Vec<(f64, f64)> = ys.iter().enumerate().map(|(i, y)| (i as f64 * 0.01, *y)).collect();
        let interp = Interpolant::new(points.clone());
        let (x, y) = points[index.index(points.len())];
        prop_assert_eq!(interp.eval(x), y);
    }

    #[test]
    fn outside_domain_is_fallback(
        ys in prop::collection::vec(-1.0..1.0f64, 2..20),
        offset in 0.001..10.0f64,
    ) {
        let n = ys.len() as f64;
        let interp = Interpolant::new(ys.iter().enumerate().map(|(i, y)| (i as f64, *y)));
        prop_assert_eq!(interp.eval(-offset), OUT_OF_DOMAIN);
        prop_assert_eq!(interp.eval(n - 1.0 + offset), OUT_OF_DOMAIN);
    }
}
