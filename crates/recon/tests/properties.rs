// Property-based tests for the fill / reshape / join stages.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;

use gapview_recon::engine::reconcile;
use gapview_recon::fill::{fill_row, forward_fill};
use gapview_recon::model::{Period, SourceTable, Sources};
use gapview_recon::reshape::{melt, pivot};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Cell: mostly present, sometimes missing.
fn arb_cell() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        3 => (-1.0e6..1.0e6f64).prop_map(Some),
        2 => Just(None),
    ]
}

const ENTITIES: &[&str] = &["Chad", "France", "Germany", "Peru", "US"];

/// Wide table over a random subset of ENTITIES and a random run of years.
fn arb_table(indicator: &'static str) -> impl Strategy<Value = SourceTable> {
    (
        proptest::sample::subsequence(ENTITIES, 0..=ENTITIES.len()),
        1995..2000i32,
        1..6usize,
    )
        .prop_flat_map(move |(entities, start, width)| {
            let rows = entities.len();
            (
                Just(entities),
                Just(start),
                proptest::collection::vec(proptest::collection::vec(arb_cell(), width), rows),
            )
        })
        .prop_map(move |(entities, start, cells)| {
            let width = cells.first().map(Vec::len).unwrap_or(1);
            let periods = (0..width as i32).map(|i| Period(start + i)).collect();
            let rows = entities
                .iter()
                .map(|e| e.to_string())
                .zip(cells)
                .collect();
            SourceTable::new(indicator, periods, rows).unwrap()
        })
}

fn sources(tables: Vec<SourceTable>) -> Sources {
    tables
        .into_iter()
        .map(|t| (t.indicator().to_string(), t))
        .collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn fill_is_idempotent(table in arb_table("a")) {
        let once = forward_fill(&table);
        prop_assert_eq!(forward_fill(&once), once);
    }

    #[test]
    fn fill_only_adds_values(row in proptest::collection::vec(arb_cell(), 0..12)) {
        let filled = fill_row(&row);
        prop_assert_eq!(filled.len(), row.len());
        for (orig, f) in row.iter().zip(&filled) {
            if orig.is_some() {
                prop_assert_eq!(orig, f);
            }
        }
        // Missing after fill only before the first present value
        let first_present = row.iter().position(Option::is_some).unwrap_or(row.len());
        for (i, f) in filled.iter().enumerate() {
            prop_assert_eq!(f.is_none(), i < first_present);
        }
    }

    #[test]
    fn melt_has_e_times_p_rows_and_pivots_back(table in arb_table("a")) {
        let long = melt(&table);
        prop_assert_eq!(long.rows.len(), table.entities().len() * table.periods().len());
        if !table.entities().is_empty() {
            prop_assert_eq!(pivot(&long).unwrap(), table);
        }
    }

    #[test]
    fn join_is_order_independent(
        a in arb_table("a"),
        b in arb_table("b"),
        c in arb_table("c"),
    ) {
        let abc = reconcile(&sources(vec![a.clone(), b.clone(), c.clone()])).unwrap();
        let cab = reconcile(&sources(vec![c, a, b])).unwrap();
        prop_assert_eq!(abc, cab);
    }

    #[test]
    fn joined_records_exist_in_every_filled_source(
        a in arb_table("a"),
        b in arb_table("b"),
    ) {
        let src = sources(vec![a, b]);
        let ds = reconcile(&src).unwrap();
        for rec in &ds.records {
            for (name, table) in &src {
                let filled = forward_fill(table);
                prop_assert_eq!(filled.cell(&rec.entity, rec.period), rec.value(name));
            }
        }
    }
}
