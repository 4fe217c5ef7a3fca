use std::collections::{BTreeSet, HashMap};

use crate::error::ReconError;
use crate::model::{LongRow, LongTable, Period, SourceTable};

/// Wide → long. One row per entity × period, entity-major, periods
/// ascending. Missing cells are kept with `value: None`.
pub fn melt(table: &SourceTable) -> LongTable {
    let mut rows = Vec::with_capacity(table.cell_count());
    for (entity, cells) in table.rows() {
        for (period, value) in table.periods().iter().zip(cells) {
            rows.push(LongRow {
                entity: entity.to_string(),
                period: *period,
                value: *value,
            });
        }
    }
    LongTable {
        indicator: table.indicator().to_string(),
        rows,
    }
}

/// Long → wide. Entities keep first-appearance order; periods are the
/// distinct periods seen. Combinations absent from the long table become
/// missing cells. A repeated (entity, period) is malformed.
pub fn pivot(long: &LongTable) -> Result<SourceTable, ReconError> {
    let periods: Vec<Period> = long
        .rows
        .iter()
        .map(|r| r.period)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let col_of: HashMap<Period, usize> = periods.iter().enumerate().map(|(i, p)| (*p, i)).collect();

    let mut row_of: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    let mut filled: Vec<Vec<bool>> = Vec::new();

    for r in &long.rows {
        let row_idx = *row_of.entry(r.entity.as_str()).or_insert_with(|| {
            rows.push((r.entity.clone(), vec![None; periods.len()]));
            filled.push(vec![false; periods.len()]);
            rows.len() - 1
        });
        let col = col_of[&r.period];
        if filled[row_idx][col] {
            return Err(ReconError::malformed(
                &long.indicator,
                format!("duplicate row for ('{}', {})", r.entity, r.period),
            ));
        }
        filled[row_idx][col] = true;
        rows[row_idx].1[col] = r.value;
    }

    SourceTable::new(long.indicator.clone(), periods, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceTable {
        SourceTable::new(
            "life_expectancy",
            vec![Period(2000), Period(2001), Period(2002)],
            vec![
                ("Germany".into(), vec![Some(78.0), Some(78.3), None]),
                ("Chad".into(), vec![None, Some(47.1), Some(47.5)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn melt_yields_entities_times_periods() {
        let long = melt(&sample());
        assert_eq!(long.indicator, "life_expectancy");
        assert_eq!(long.rows.len(), 2 * 3);
        assert_eq!(
            long.rows[0],
            LongRow {
                entity: "Germany".into(),
                period: Period(2000),
                value: Some(78.0)
            }
        );
        assert_eq!(long.rows[2].value, None);
        assert_eq!(long.rows[3].entity, "Chad");
        assert_eq!(long.present().count(), 4);
    }

    #[test]
    fn pivot_recovers_original() {
        let table = sample();
        assert_eq!(pivot(&melt(&table)).unwrap(), table);
    }

    #[test]
    fn pivot_sparse_long_table_fills_missing() {
        let long = LongTable {
            indicator: "x".into(),
            rows: vec![
                LongRow { entity: "A".into(), period: Period(2001), value: Some(1.0) },
                LongRow { entity: "B".into(), period: Period(2000), value: Some(2.0) },
            ],
        };
        let t = pivot(&long).unwrap();
        assert_eq!(t.periods(), &[Period(2000), Period(2001)]);
        assert_eq!(t.cell("A", Period(2000)), None);
        assert_eq!(t.cell("B", Period(2000)), Some(2.0));
    }

    #[test]
    fn pivot_rejects_duplicate_key() {
        let row = LongRow { entity: "A".into(), period: Period(2000), value: Some(1.0) };
        let long = LongTable {
            indicator: "x".into(),
            rows: vec![row.clone(), row],
        };
        assert!(pivot(&long).is_err());
    }

    #[test]
    fn melt_empty_table() {
        let t = SourceTable::new("x", vec![Period(2000)], vec![]).unwrap();
        assert!(melt(&t).rows.is_empty());
    }
}
