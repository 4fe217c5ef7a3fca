use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// Column key of a source table. Integer-valued (a year) so periods order
/// numerically and compare correctly against a period slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(pub i32);

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Period {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Period)
    }
}

/// Indicator name → wide table. Ordered so every stage walks indicators
/// lexicographically.
pub type Sources = BTreeMap<String, SourceTable>;

// ---------------------------------------------------------------------------
// Wide form
// ---------------------------------------------------------------------------

/// One indicator in wide form: a row per entity, a column per period.
///
/// Entities are unique and keep their input order. Periods are unique and
/// always stored ascending; `new` reorders the cells to match.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    indicator: String,
    periods: Vec<Period>,
    entities: Vec<String>,
    cells: Vec<Vec<Option<f64>>>,
}

impl SourceTable {
    pub fn new(
        indicator: impl Into<String>,
        periods: Vec<Period>,
        rows: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, ReconError> {
        let indicator = indicator.into();

        let mut seen_periods = HashSet::with_capacity(periods.len());
        for p in &periods {
            if !seen_periods.insert(*p) {
                return Err(ReconError::malformed(&indicator, format!("duplicate period {p}")));
            }
        }

        // Permutation that sorts the period columns ascending
        let mut order: Vec<usize> = (0..periods.len()).collect();
        order.sort_by_key(|&i| periods[i]);
        let sorted_periods: Vec<Period> = order.iter().map(|&i| periods[i]).collect();

        let mut seen_entities = HashSet::with_capacity(rows.len());
        let mut entities = Vec::with_capacity(rows.len());
        let mut cells = Vec::with_capacity(rows.len());

        for (entity, row) in rows {
            if entity.trim().is_empty() {
                return Err(ReconError::malformed(&indicator, "empty entity label"));
            }
            if !seen_entities.insert(entity.clone()) {
                return Err(ReconError::malformed(
                    &indicator,
                    format!("duplicate entity '{entity}'"),
                ));
            }
            if row.len() != periods.len() {
                return Err(ReconError::malformed(
                    &indicator,
                    format!(
                        "entity '{entity}' has {} cells, expected {}",
                        row.len(),
                        periods.len()
                    ),
                ));
            }
            if row.iter().flatten().any(|v| !v.is_finite()) {
                return Err(ReconError::malformed(
                    &indicator,
                    format!("entity '{entity}' has a non-finite value"),
                ));
            }
            cells.push(order.iter().map(|&i| row[i]).collect());
            entities.push(entity);
        }

        Ok(Self {
            indicator,
            periods: sorted_periods,
            entities,
            cells,
        })
    }

    pub fn indicator(&self) -> &str {
        &self.indicator
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Rows as (entity, cells-in-period-order).
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.entities
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(Vec::as_slice))
    }

    pub fn cell(&self, entity: &str, period: Period) -> Option<f64> {
        let row = self.entities.iter().position(|e| e == entity)?;
        let col = self.periods.binary_search(&period).ok()?;
        self.cells[row][col]
    }

    pub fn cell_count(&self) -> usize {
        self.entities.len() * self.periods.len()
    }

    pub fn present_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Same shape and labels, new cells. Used by stages that rewrite values
    /// without touching the row/column structure.
    pub(crate) fn with_cells(&self, cells: Vec<Vec<Option<f64>>>) -> Self {
        debug_assert_eq!(cells.len(), self.entities.len());
        Self {
            indicator: self.indicator.clone(),
            periods: self.periods.clone(),
            entities: self.entities.clone(),
            cells,
        }
    }
}

// ---------------------------------------------------------------------------
// Long form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow {
    pub entity: String,
    pub period: Period,
    /// `None` when forward-fill found nothing to carry. Such rows never join.
    pub value: Option<f64>,
}

/// One indicator in long form, entity-major then period ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct LongTable {
    pub indicator: String,
    pub rows: Vec<LongRow>,
}

impl LongTable {
    /// Rows that can take part in a join.
    pub fn present(&self) -> impl Iterator<Item = (&LongRow, f64)> {
        self.rows.iter().filter_map(|r| r.value.map(|v| (r, v)))
    }
}

// ---------------------------------------------------------------------------
// Tidy output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRecord {
    pub entity: String,
    pub period: Period,
    /// Indicator name → value. Every indicator of the dataset is present.
    pub values: BTreeMap<String, f64>,
}

impl TidyRecord {
    pub fn value(&self, indicator: &str) -> Option<f64> {
        self.values.get(indicator).copied()
    }
}

/// Result of one pipeline run. Records are ordered by (entity, period).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciledDataset {
    pub indicators: Vec<String>,
    pub records: Vec<TidyRecord>,
}

impl ReconciledDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, entity: &str, period: Period) -> Option<&TidyRecord> {
        self.records
            .binary_search_by(|r| (r.entity.as_str(), r.period).cmp(&(entity, period)))
            .ok()
            .map(|i| &self.records[i])
    }

    pub fn has_indicator(&self, indicator: &str) -> bool {
        self.indicators.iter().any(|i| i == indicator)
    }
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub indicator: String,
    pub entities: usize,
    pub periods: usize,
    pub cells: usize,
    pub present: usize,
    pub present_after_fill: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub first: Period,
    pub last: Period,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconSummary {
    pub indicators: Vec<IndicatorSummary>,
    pub joined_rows: usize,
    pub entities: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_range: Option<PeriodRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub dataset: ReconciledDataset,
}
