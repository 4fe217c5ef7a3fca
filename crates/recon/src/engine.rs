use crate::config::PipelineConfig;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::fill::forward_fill;
use crate::join::join_all;
use crate::model::{ReconMeta, ReconResult, ReconciledDataset, SourceTable, Sources};
use crate::reshape::melt;

/// Fill, reshape and join every source into one tidy dataset.
///
/// Zero sources is an error. Any malformed source aborts the whole call;
/// no partial dataset is returned.
pub fn reconcile(sources: &Sources) -> Result<ReconciledDataset, ReconError> {
    Ok(stages(sources)?.dataset)
}

/// Run reconciliation per config. Returns the dataset plus run summary.
pub fn run(config: &PipelineConfig, sources: &Sources) -> Result<ReconResult, ReconError> {
    let out = stages(sources)?;
    let raw: Vec<&SourceTable> = sources.values().collect();
    let summary = compute_summary(&raw, &out.filled, &out.dataset);

    log::info!(
        "reconciled {} indicator(s) into {} rows over {} entities",
        sources.len(),
        summary.joined_rows,
        summary.entities
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        dataset: out.dataset,
    })
}

struct StageOutput {
    /// Filled tables in indicator order.
    filled: Vec<SourceTable>,
    dataset: ReconciledDataset,
}

fn stages(sources: &Sources) -> Result<StageOutput, ReconError> {
    if sources.is_empty() {
        return Err(ReconError::NoSources);
    }

    for (name, table) in sources {
        if table.indicator() != name {
            return Err(ReconError::malformed(
                name,
                format!("table is labelled '{}'", table.indicator()),
            ));
        }
    }

    let filled: Vec<SourceTable> = sources.values().map(forward_fill).collect();
    for (raw, f) in sources.values().zip(&filled) {
        log::debug!(
            "filled '{}': {} -> {} of {} cells present",
            raw.indicator(),
            raw.present_count(),
            f.present_count(),
            raw.cell_count()
        );
    }

    let long: Vec<_> = filled.iter().map(melt).collect();
    let records = join_all(&long)?;

    Ok(StageOutput {
        dataset: ReconciledDataset {
            indicators: sources.keys().cloned().collect(),
            records,
        },
        filled,
    })
}
