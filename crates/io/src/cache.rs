//! On-disk memo of reconciliation results.
//!
//! Entries are keyed by a blake3 fingerprint of everything that feeds the
//! pipeline: the engine version, the config name and ingest settings, and every source
//! file's name and bytes. Editing any source yields a new key, so an entry
//! is never served for inputs it was not computed from.

use std::path::PathBuf;

use gapview_recon::{PipelineConfig, ReconResult};

use crate::sources::SourceFile;
use crate::IoError;

/// Fingerprint of one pipeline input set, as lowercase hex.
pub fn fingerprint(files: &[SourceFile], config: &PipelineConfig) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(env!("CARGO_PKG_VERSION").as_bytes());

    // Length-prefixed fields so adjacent values cannot run together
    let mut field = |bytes: &[u8]| {
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    };

    field(config.name.as_bytes());
    field(config.entity_column.as_bytes());
    for m in &config.missing_values {
        field(m.as_bytes());
    }
    field(config.delimiter.map(String::from).unwrap_or_default().as_bytes());

    let mut sorted: Vec<&SourceFile> = files.iter().collect();
    sorted.sort_by(|a, b| a.indicator.cmp(&b.indicator));
    for file in sorted {
        field(file.indicator.as_bytes());
        field(&file.bytes);
    }

    hasher.finalize().to_hex().to_string()
}

pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<user cache dir>/gapview`, if the platform has one.
    pub fn default_location() -> Option<Self> {
        dirs::cache_dir().map(|d| Self::new(d.join("gapview")))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Cached result for `key`. Unreadable or corrupt entries count as a miss.
    pub fn get(&self, key: &str) -> Option<ReconResult> {
        let path = self.entry_path(key);
        let bytes = std::fs::read(&path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(result) => {
                log::debug!("cache hit {}", path.display());
                Some(result)
            }
            Err(e) => {
                log::warn!("ignoring corrupt cache entry {}: {e}", path.display());
                None
            }
        }
    }

    /// Store `result` under `key`. Written to a temp file first and renamed,
    /// so a concurrent reader never sees a half-written entry.
    pub fn put(&self, key: &str, result: &ReconResult) -> Result<(), IoError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| IoError::io(&self.dir, e))?;

        let json = serde_json::to_vec(result).map_err(|e| IoError::Cache(e.to_string()))?;
        let path = self.entry_path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, json).map_err(|e| IoError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| IoError::io(&path, e))?;
        log::debug!("cached {}", path.display());
        Ok(())
    }
}
