// CSV/TSV decoding and tidy export

use std::io::Write;
use std::path::Path;

use gapview_recon::ReconciledDataset;

use crate::IoError;

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the header line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (lines with the header's field count) * field_count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Decode file bytes as UTF-8, falling back to Windows-1252 (common for
/// spreadsheet-exported CSVs). A leading UTF-8 BOM is dropped.
pub fn decode_utf8(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => match s.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => s,
        },
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Write the dataset in tidy form: `entity,period,<indicators...>`, one row
/// per record, indicators in dataset order.
pub fn write_tidy<W: Write>(
    dataset: &ReconciledDataset,
    entity_header: &str,
    period_header: &str,
    out: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec![entity_header.to_string(), period_header.to_string()];
    header.extend(dataset.indicators.iter().cloned());
    writer.write_record(&header)?;

    for rec in &dataset.records {
        let mut row = vec![rec.entity.clone(), rec.period.to_string()];
        for ind in &dataset.indicators {
            row.push(rec.value(ind).map(|v| v.to_string()).unwrap_or_default());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn export(
    dataset: &ReconciledDataset,
    entity_header: &str,
    period_header: &str,
    path: &Path,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::io(path, e))?;
    write_tidy(dataset, entity_header, period_header, std::io::BufWriter::new(file))
        .map_err(|e| IoError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gapview_recon::model::{Period, TidyRecord};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    fn dataset() -> ReconciledDataset {
        ReconciledDataset {
            indicators: vec!["gni".into(), "pop".into()],
            records: vec![
                TidyRecord {
                    entity: "Germany".into(),
                    period: Period(2000),
                    values: BTreeMap::from([("gni".into(), 30000.0), ("pop".into(), 82.5)]),
                },
                TidyRecord {
                    entity: "Korea, Rep.".into(),
                    period: Period(2000),
                    values: BTreeMap::from([("gni".into(), 12000.0), ("pop".into(), 47.0)]),
                },
            ],
        }
    }

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "country;2000;2001\nChad;1;2\nPeru;3;4\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "country,2000,2001\nChad,1,2\nPeru,3,4\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "country\t2000\t2001\nChad\t1\t2\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "country;2000\n\"Korea, Rep.\";1\n\"Congo, Dem. Rep.\";2\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_tsv_with_quoted_country_names() {
        // Commas inside quoted names must not outvote the tabs
        let content = "country\t1990\t2000\n\"Korea, Rep.\"\t7.3\t11.9\n\"Congo, Dem. Rep.\"\t34.9\t47.1\nChad\t5.9\t8.4\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_empty_defaults_to_comma() {
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "Curaçao" in Windows-1252
        let bytes = b"country,2000\nCura\xe7ao,1\n".to_vec();
        assert!(decode_utf8(bytes).contains("Curaçao"));
    }

    #[test]
    fn test_decode_strips_bom() {
        let bytes = b"\xef\xbb\xbfcountry,2000\n".to_vec();
        assert!(decode_utf8(bytes).starts_with("country"));
    }

    #[test]
    fn test_tidy_export() {
        let mut buf = Vec::new();
        write_tidy(&dataset(), "country", "year", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "country,year,gni,pop\nGermany,2000,30000,82.5\n\"Korea, Rep.\",2000,12000,47\n"
        );
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tidy.csv");
        export(&dataset(), "country", "year", &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("country,year,gni,pop\n"));
        assert_eq!(content.lines().count(), 3);
    }
}
