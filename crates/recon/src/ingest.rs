use crate::error::ReconError;
use crate::model::{Period, SourceTable};

/// How a delimited text source maps onto the wide table shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Header of the column holding entity labels. All other columns are periods.
    pub entity_column: String,
    pub delimiter: u8,
    /// Cell tokens read as missing (compared after trimming).
    pub missing_values: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            entity_column: "country".into(),
            delimiter: b',',
            missing_values: default_missing_values(),
        }
    }
}

pub fn default_missing_values() -> Vec<String> {
    ["", "NA", "N/A", "NaN", "nan", "null"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl IngestOptions {
    fn is_missing(&self, cell: &str) -> bool {
        self.missing_values.iter().any(|m| m == cell)
    }
}

/// Parse one delimited text source into a `SourceTable` named `indicator`.
///
/// Header row = entity column + period labels (any position for the entity
/// column). Fails with `MalformedSource` on a missing entity column,
/// unparseable or repeated period labels, duplicate or empty entities,
/// ragged rows, or cells that are neither numeric nor a missing token.
pub fn parse_source_table(
    indicator: &str,
    csv_data: &str,
    options: &IngestOptions,
) -> Result<SourceTable, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::malformed(indicator, e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let entity_idx = headers
        .iter()
        .position(|h| *h == options.entity_column)
        .ok_or_else(|| {
            ReconError::malformed(
                indicator,
                format!("missing entity column '{}'", options.entity_column),
            )
        })?;

    let mut period_cols: Vec<usize> = Vec::with_capacity(headers.len().saturating_sub(1));
    let mut periods: Vec<Period> = Vec::with_capacity(headers.len().saturating_sub(1));
    for (i, h) in headers.iter().enumerate() {
        if i == entity_idx {
            continue;
        }
        let period: Period = h.parse().map_err(|_| {
            ReconError::malformed(indicator, format!("cannot parse period label '{h}'"))
        })?;
        period_cols.push(i);
        periods.push(period);
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        // Line 1 is the header
        let line = idx + 2;
        let record = record.map_err(|e| ReconError::malformed(indicator, e.to_string()))?;

        let entity = record.get(entity_idx).unwrap_or("").trim().to_string();

        let mut cells = Vec::with_capacity(period_cols.len());
        for (&col, period) in period_cols.iter().zip(&periods) {
            let raw = record.get(col).unwrap_or("").trim();
            if options.is_missing(raw) {
                cells.push(None);
                continue;
            }
            let value: f64 = raw.parse().map_err(|_| {
                ReconError::malformed(
                    indicator,
                    format!("line {line}, entity '{entity}', period {period}: cannot parse value '{raw}'"),
                )
            })?;
            // "NaN" spelled differently from the configured tokens still means missing
            cells.push(if value.is_nan() { None } else { Some(value) });
        }

        rows.push((entity, cells));
    }

    let table = SourceTable::new(indicator, periods, rows)?;
    log::debug!(
        "parsed '{}': {} entities × {} periods",
        indicator,
        table.entities().len(),
        table.periods().len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> Result<SourceTable, ReconError> {
        parse_source_table("population", csv, &IngestOptions::default())
    }

    #[test]
    fn parse_basic() {
        let csv = "\
country,2000,2001,2002
Germany,82.2,,82.5
France,60.9,61.2,NA
";
        let t = parse(csv).unwrap();
        assert_eq!(t.indicator(), "population");
        assert_eq!(t.entities(), &["Germany", "France"]);
        assert_eq!(t.periods(), &[Period(2000), Period(2001), Period(2002)]);
        assert_eq!(t.cell("Germany", Period(2001)), None);
        assert_eq!(t.cell("Germany", Period(2002)), Some(82.5));
        assert_eq!(t.cell("France", Period(2002)), None);
        assert_eq!(t.present_count(), 4);
    }

    #[test]
    fn entity_column_need_not_be_first() {
        let csv = "\
2001,country,2000
2.0,Chad,1.0
";
        let t = parse(csv).unwrap();
        assert_eq!(t.periods(), &[Period(2000), Period(2001)]);
        assert_eq!(t.cell("Chad", Period(2000)), Some(1.0));
        assert_eq!(t.cell("Chad", Period(2001)), Some(2.0));
    }

    #[test]
    fn semicolon_delimiter() {
        let opts = IngestOptions {
            delimiter: b';',
            ..IngestOptions::default()
        };
        let t = parse_source_table("gni", "country;1990\nPeru;4100\n", &opts).unwrap();
        assert_eq!(t.cell("Peru", Period(1990)), Some(4100.0));
    }

    #[test]
    fn custom_entity_column() {
        let opts = IngestOptions {
            entity_column: "geo".into(),
            ..IngestOptions::default()
        };
        let t = parse_source_table("gni", "geo,1990\nper,4100\n", &opts).unwrap();
        assert_eq!(t.entities(), &["per"]);
    }

    #[test]
    fn reject_missing_entity_column() {
        let err = parse("name,2000\nGermany,1\n").unwrap_err();
        assert_eq!(
            err,
            ReconError::MalformedSource {
                indicator: "population".into(),
                detail: "missing entity column 'country'".into(),
            }
        );
    }

    #[test]
    fn reject_bad_period_label() {
        let err = parse("country,2000,total\nGermany,1,2\n").unwrap_err();
        assert!(err.to_string().contains("cannot parse period label 'total'"));
    }

    #[test]
    fn reject_non_numeric_cell() {
        let err = parse("country,2000\nGermany,lots\n").unwrap_err();
        assert!(err.to_string().contains("cannot parse value 'lots'"));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn reject_duplicate_entity_rows() {
        let err = parse("country,2000\nGermany,1\nGermany,2\n").unwrap_err();
        assert!(err.to_string().contains("duplicate entity 'Germany'"));
    }

    #[test]
    fn reject_ragged_row() {
        let err = parse("country,2000,2001\nGermany,1\n").unwrap_err();
        assert!(matches!(err, ReconError::MalformedSource { .. }));
    }

    #[test]
    fn nan_literal_is_missing() {
        let opts = IngestOptions {
            missing_values: vec![],
            ..IngestOptions::default()
        };
        let t = parse_source_table("x", "country,2000\nGermany,NaN\n", &opts).unwrap();
        assert_eq!(t.cell("Germany", Period(2000)), None);
    }

    #[test]
    fn header_only_is_empty_table() {
        let t = parse("country,2000,2001\n").unwrap();
        assert!(t.entities().is_empty());
        assert_eq!(t.periods().len(), 2);
    }
}
