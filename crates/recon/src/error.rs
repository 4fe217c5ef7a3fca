use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// A source could not be read into the wide entity × period shape.
    MalformedSource { indicator: String, detail: String },
    /// `reconcile` was called with an empty source collection.
    NoSources,
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty entity column, duplicate chart indicator, etc.).
    ConfigValidation(String),
    /// A chart encoding names an indicator the dataset does not carry.
    UnknownIndicator(String),
}

impl ReconError {
    pub(crate) fn malformed(indicator: &str, detail: impl Into<String>) -> Self {
        Self::MalformedSource {
            indicator: indicator.to_string(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedSource { indicator, detail } => {
                write!(f, "malformed source '{indicator}': {detail}")
            }
            Self::NoSources => write!(f, "no source tables to reconcile"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownIndicator(name) => write!(f, "unknown indicator: {name}"),
        }
    }
}

impl std::error::Error for ReconError {}
