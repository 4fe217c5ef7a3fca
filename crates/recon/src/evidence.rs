use crate::model::{IndicatorSummary, ReconSummary, ReconciledDataset, SourceTable};
use crate::view::{entities, period_range};

/// Compute summary statistics for a run from the raw and filled tables and
/// the joined output. `raw` and `filled` are paired by position.
pub fn compute_summary(
    raw: &[&SourceTable],
    filled: &[SourceTable],
    dataset: &ReconciledDataset,
) -> ReconSummary {
    let indicators = raw
        .iter()
        .zip(filled)
        .map(|(raw, filled)| IndicatorSummary {
            indicator: raw.indicator().to_string(),
            entities: raw.entities().len(),
            periods: raw.periods().len(),
            cells: raw.cell_count(),
            present: raw.present_count(),
            present_after_fill: filled.present_count(),
        })
        .collect();

    ReconSummary {
        indicators,
        joined_rows: dataset.len(),
        entities: entities(dataset).len(),
        period_range: period_range(dataset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::forward_fill;
    use crate::model::{Period, TidyRecord};
    use std::collections::BTreeMap;

    #[test]
    fn summary_counts() {
        let raw = SourceTable::new(
            "pop",
            vec![Period(2000), Period(2001), Period(2002)],
            vec![
                ("DE".into(), vec![Some(1.0), None, None]),
                ("FR".into(), vec![None, None, None]),
            ],
        )
        .unwrap();
        let filled = vec![forward_fill(&raw)];
        let dataset = ReconciledDataset {
            indicators: vec!["pop".into()],
            records: (2000..=2002)
                .map(|y| TidyRecord {
                    entity: "DE".into(),
                    period: Period(y),
                    values: BTreeMap::from([("pop".to_string(), 1.0)]),
                })
                .collect(),
        };

        let summary = compute_summary(&[&raw], &filled, &dataset);
        let s = &summary.indicators[0];
        assert_eq!(s.indicator, "pop");
        assert_eq!(s.entities, 2);
        assert_eq!(s.periods, 3);
        assert_eq!(s.cells, 6);
        assert_eq!(s.present, 1);
        assert_eq!(s.present_after_fill, 3);
        assert_eq!(summary.joined_rows, 3);
        assert_eq!(summary.entities, 1);
        let range = summary.period_range.unwrap();
        assert_eq!((range.first, range.last), (Period(2000), Period(2002)));
    }
}
