//! Selection and chart projection for a presentation layer.
//!
//! The dashboard calls `reconcile` once, then repeatedly narrows the result to
//! a set of entities at one period and plots it. Drawing is left to the
//! caller; this module only decides which rows are shown and which values
//! land on which encoding.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::ReconError;
use crate::model::{Period, PeriodRange, ReconciledDataset, TidyRecord};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub entities: Vec<String>,
    pub period: Period,
}

/// No entity was chosen. Not a pipeline failure: the caller should skip
/// rendering and tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptySelection;

impl fmt::Display for EmptySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "please select at least one entity")
    }
}

impl std::error::Error for EmptySelection {}

/// Distinct entities, sorted.
pub fn entities(dataset: &ReconciledDataset) -> Vec<&str> {
    let mut out: Vec<&str> = dataset.records.iter().map(|r| r.entity.as_str()).collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Smallest and largest period present, for a period slider.
pub fn period_range(dataset: &ReconciledDataset) -> Option<PeriodRange> {
    let first = dataset.records.iter().map(|r| r.period).min()?;
    let last = dataset.records.iter().map(|r| r.period).max()?;
    Some(PeriodRange { first, last })
}

/// Rows at `selection.period` for the chosen entities, ordered by entity.
/// Entities with no row at that period are simply absent from the result.
pub fn select<'a>(
    dataset: &'a ReconciledDataset,
    selection: &Selection,
) -> Result<Vec<&'a TidyRecord>, EmptySelection> {
    if selection.entities.is_empty() {
        return Err(EmptySelection);
    }
    let wanted: HashSet<&str> = selection.entities.iter().map(String::as_str).collect();
    Ok(dataset
        .records
        .iter()
        .filter(|r| r.period == selection.period && wanted.contains(r.entity.as_str()))
        .collect())
}

// ---------------------------------------------------------------------------
// Chart encodings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Scale {
    Log,
    Linear { zero: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encoding {
    pub indicator: String,
    pub scale: Scale,
}

/// Scatter encodings. Color is always the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub x: Encoding,
    pub y: Encoding,
    pub size: Encoding,
}

impl ChartSpec {
    /// x on a log scale, y linear without a forced zero, size linear from zero.
    pub fn scatter(x: &str, y: &str, size: &str) -> Self {
        Self {
            x: Encoding {
                indicator: x.into(),
                scale: Scale::Log,
            },
            y: Encoding {
                indicator: y.into(),
                scale: Scale::Linear { zero: false },
            },
            size: Encoding {
                indicator: size.into(),
                scale: Scale::Linear { zero: true },
            },
        }
    }

    /// Every encoded indicator must be a column of the dataset.
    pub fn validate(&self, dataset: &ReconciledDataset) -> Result<(), ReconError> {
        for enc in [&self.x, &self.y, &self.size] {
            if !dataset.has_indicator(&enc.indicator) {
                return Err(ReconError::UnknownIndicator(enc.indicator.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub entity: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Project rows onto the chart encodings.
///
/// A row missing an encoded indicator is skipped. So is a row whose value
/// cannot sit on a log axis (zero or negative).
pub fn scatter(spec: &ChartSpec, rows: &[&TidyRecord]) -> Vec<ScatterPoint> {
    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(x), Some(y), Some(size)) = (
            plottable(row, &spec.x),
            plottable(row, &spec.y),
            plottable(row, &spec.size),
        ) else {
            continue;
        };
        points.push(ScatterPoint {
            entity: row.entity.clone(),
            x,
            y,
            size,
        });
    }
    points
}

fn plottable(row: &TidyRecord, enc: &Encoding) -> Option<f64> {
    let v = row.value(&enc.indicator)?;
    if enc.scale == Scale::Log && v <= 0.0 {
        log::warn!(
            "skipping ({}, {}): {} = {} is not positive on a log scale",
            row.entity,
            row.period,
            enc.indicator,
            v
        );
        return None;
    }
    Some(v)
}
