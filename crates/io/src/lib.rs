// File I/O operations

pub mod cache;
pub mod csv;
pub mod json;
pub mod sources;

use std::fmt;
use std::path::{Path, PathBuf};

use gapview_recon::ReconError;

#[derive(Debug)]
pub enum IoError {
    /// File or directory could not be read or written.
    Io { path: PathBuf, message: String },
    /// Two files map to the same indicator name (e.g. `gdp.csv` and `gdp.tsv`).
    DuplicateIndicator { indicator: String, first: PathBuf, second: PathBuf },
    /// Parsing or reconciling the loaded tables failed.
    Recon(ReconError),
    /// Cache entry could not be written.
    Cache(String),
}

impl IoError {
    pub(crate) fn io(path: &Path, err: impl fmt::Display) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::DuplicateIndicator { indicator, first, second } => write!(
                f,
                "indicator '{indicator}' supplied by both {} and {}",
                first.display(),
                second.display()
            ),
            Self::Recon(e) => write!(f, "{e}"),
            Self::Cache(msg) => write!(f, "cache error: {msg}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Recon(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReconError> for IoError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}
