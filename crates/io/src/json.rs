// JSON export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gapview_recon::ReconciledDataset;
use serde_json::{Map, Value};

use crate::IoError;

/// Dataset as an array of flat objects:
/// `{"<entity_header>": .., "<period_header>": .., "<indicator>": ..}`.
pub fn to_records(dataset: &ReconciledDataset, entity_header: &str, period_header: &str) -> Value {
    let rows = dataset
        .records
        .iter()
        .map(|rec| {
            let mut obj = Map::new();
            obj.insert(entity_header.to_string(), Value::from(rec.entity.clone()));
            obj.insert(period_header.to_string(), Value::from(rec.period.0));
            for ind in &dataset.indicators {
                obj.insert(ind.clone(), rec.value(ind).map(Value::from).unwrap_or(Value::Null));
            }
            Value::Object(obj)
        })
        .collect();
    Value::Array(rows)
}

pub fn write_records<W: Write>(
    dataset: &ReconciledDataset,
    entity_header: &str,
    period_header: &str,
    out: W,
) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(out, &to_records(dataset, entity_header, period_header))
}

pub fn export(
    dataset: &ReconciledDataset,
    entity_header: &str,
    period_header: &str,
    path: &Path,
) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_records(dataset, entity_header, period_header, &mut writer)
        .map_err(|e| IoError::io(path, e))?;
    writer.flush().map_err(|e| IoError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gapview_recon::model::{Period, TidyRecord};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_json_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tidy.json");

        let dataset = ReconciledDataset {
            indicators: vec!["life_expectancy".into(), "population".into()],
            records: vec![TidyRecord {
                entity: "Peru".into(),
                period: Period(2005),
                values: BTreeMap::from([
                    ("life_expectancy".into(), 73.0),
                    ("population".into(), 27.6),
                ]),
            }],
        };

        export(&dataset, "country", "year", &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["country"], "Peru");
        assert_eq!(parsed[0]["year"], 2005);
        assert_eq!(parsed[0]["life_expectancy"], 73.0);
        assert_eq!(parsed[0]["population"], 27.6);
    }

    #[test]
    fn test_empty_dataset_is_empty_array() {
        let value = to_records(&ReconciledDataset::default(), "country", "year");
        assert_eq!(value, serde_json::json!([]));
    }
}
