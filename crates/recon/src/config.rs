use serde::Deserialize;

use crate::error::ReconError;
use crate::ingest::{default_missing_values, IngestOptions};
use crate::model::Period;
use crate::view::{ChartSpec, Selection};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub name: String,
    /// Directory holding one delimited file per indicator. Relative paths are
    /// resolved against the config file's directory by the caller.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_entity_column")]
    pub entity_column: String,
    #[serde(default = "default_missing_values")]
    pub missing_values: Vec<String>,
    /// Field delimiter. Sniffed per file when absent.
    #[serde(default)]
    pub delimiter: Option<char>,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub defaults: SelectionDefaults,
}

fn default_data_dir() -> String {
    "data".into()
}

fn default_entity_column() -> String {
    "country".into()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "gapview".into(),
            data_dir: default_data_dir(),
            entity_column: default_entity_column(),
            missing_values: default_missing_values(),
            delimiter: None,
            chart: ChartConfig::default(),
            defaults: SelectionDefaults::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart + Selection defaults
// ---------------------------------------------------------------------------

/// Which indicators drive the scatter encodings. x is always log-scaled,
/// y linear without a forced zero, size linear.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartConfig {
    pub x: String,
    pub y: String,
    pub size: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            x: "gni_per_capita".into(),
            y: "life_expectancy".into(),
            size: "population".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionDefaults {
    #[serde(default = "default_entities")]
    pub entities: Vec<String>,
    #[serde(default = "default_period")]
    pub period: Period,
}

fn default_entities() -> Vec<String> {
    vec!["Germany".into()]
}

fn default_period() -> Period {
    Period(2005)
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        Self {
            entities: default_entities(),
            period: default_period(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        if self.entity_column.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "entity_column must not be empty".into(),
            ));
        }

        if let Some(d) = self.delimiter {
            if !d.is_ascii() || d == '"' || d == '\n' || d == '\r' {
                return Err(ReconError::ConfigValidation(format!(
                    "delimiter must be a single ASCII character other than quote or newline, got {d:?}"
                )));
            }
        }

        // Each encoding must be its own indicator
        let c = &self.chart;
        for (a, b) in [(&c.x, &c.y), (&c.x, &c.size), (&c.y, &c.size)] {
            if a == b {
                return Err(ReconError::ConfigValidation(format!(
                    "chart indicators must be distinct, '{a}' used twice"
                )));
            }
        }

        Ok(())
    }

    /// Ingest options for a file whose delimiter was not configured and had to
    /// be detected.
    pub fn ingest_options(&self, sniffed_delimiter: u8) -> IngestOptions {
        IngestOptions {
            entity_column: self.entity_column.clone(),
            delimiter: self.delimiter.map(|d| d as u8).unwrap_or(sniffed_delimiter),
            missing_values: self.missing_values.clone(),
        }
    }

    pub fn chart_spec(&self) -> ChartSpec {
        ChartSpec::scatter(&self.chart.x, &self.chart.y, &self.chart.size)
    }

    pub fn default_selection(&self) -> Selection {
        Selection {
            entities: self.defaults.entities.clone(),
            period: self.defaults.period,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
