//! Source provisioning: one delimited file per indicator in a directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gapview_recon::{parse_source_table, PipelineConfig, Sources};

use crate::csv::{decode_utf8, sniff_delimiter};
use crate::IoError;

const EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Raw bytes of one indicator file, before parsing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub indicator: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Indicator name of a file: its name up to the first `.`
/// (`life_expectancy.v2.csv` → `life_expectancy`).
pub fn indicator_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Data files in `dir`, sorted by path. Hidden files, directories and
/// unrelated extensions are skipped.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let entries = std::fs::read_dir(dir).map_err(|e| IoError::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IoError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(true);
        let known_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if hidden || !known_ext {
            log::debug!("skipping {}", path.display());
            continue;
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

/// Read every data file in `dir`, keyed by indicator name.
pub fn read_sources(dir: &Path) -> Result<Vec<SourceFile>, IoError> {
    let mut by_indicator: BTreeMap<String, SourceFile> = BTreeMap::new();

    for path in discover(dir)? {
        let Some(indicator) = indicator_name(&path) else {
            continue;
        };
        if let Some(existing) = by_indicator.get(&indicator) {
            return Err(IoError::DuplicateIndicator {
                indicator,
                first: existing.path.clone(),
                second: path,
            });
        }
        let bytes = std::fs::read(&path).map_err(|e| IoError::io(&path, e))?;
        by_indicator.insert(
            indicator.clone(),
            SourceFile {
                indicator,
                path,
                bytes,
            },
        );
    }

    log::debug!("found {} indicator file(s) in {}", by_indicator.len(), dir.display());
    Ok(by_indicator.into_values().collect())
}

/// Parse raw files into wide tables. Any malformed file fails the whole load.
pub fn parse_sources(files: &[SourceFile], config: &PipelineConfig) -> Result<Sources, IoError> {
    let mut sources = Sources::new();
    for file in files {
        let text = decode_utf8(file.bytes.clone());
        let options = config.ingest_options(sniff_delimiter(&text));
        let table = parse_source_table(&file.indicator, &text, &options)?;
        sources.insert(file.indicator.clone(), table);
    }
    Ok(sources)
}

pub fn load_sources(dir: &Path, config: &PipelineConfig) -> Result<Sources, IoError> {
    parse_sources(&read_sources(dir)?, config)
}
