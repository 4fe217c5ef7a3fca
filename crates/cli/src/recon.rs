//! `gapview reconcile | view | describe | validate` — command implementations.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use gapview_io::cache::{fingerprint, ResultCache};
use gapview_io::sources::{parse_sources, read_sources};
use gapview_recon::model::Period;
use gapview_recon::view::{self, Selection};
use gapview_recon::{PipelineConfig, ReconError, ReconResult};

use crate::exit_codes::{
    io_exit_code, recon_exit_code, EXIT_EMPTY_SELECTION, EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_IO,
};
use crate::CliError;

/// Config file picked up from the working directory when neither
/// `--config` nor `--data` is given.
const DEFAULT_CONFIG: &str = "gapview.toml";

/// Column header for periods in tidy output.
const PERIOD_HEADER: &str = "year";

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Pipeline config (TOML). Data directory is resolved relative to it.
    #[arg(long, short = 'c', conflicts_with = "data")]
    pub config: Option<PathBuf>,

    /// Directory of indicator files; uses built-in defaults for everything else
    #[arg(long, short = 'd')]
    pub data: Option<PathBuf>,

    /// Always recompute, neither reading nor writing the result cache
    #[arg(long)]
    pub no_cache: bool,

    /// Cache directory (default: user cache dir)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

fn recon_err(err: ReconError) -> CliError {
    CliError { code: recon_exit_code(&err), message: err.to_string(), hint: None }
}

fn io_err(err: gapview_io::IoError) -> CliError {
    CliError { code: io_exit_code(&err), message: err.to_string(), hint: None }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Resolve config + data directory from the input flags.
fn resolve(input: &InputArgs) -> Result<(PipelineConfig, PathBuf), CliError> {
    if let Some(ref data) = input.data {
        return Ok((PipelineConfig::default(), data.clone()));
    }

    let config_path = match input.config {
        Some(ref p) => p.clone(),
        None if Path::new(DEFAULT_CONFIG).is_file() => PathBuf::from(DEFAULT_CONFIG),
        None => {
            let config = PipelineConfig::default();
            let dir = PathBuf::from(&config.data_dir);
            return Ok((config, dir));
        }
    };

    let config = load_config(&config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let data_dir = base_dir.join(&config.data_dir);
    Ok((config, data_dir))
}

fn load_config(path: &Path) -> Result<PipelineConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_IO,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    PipelineConfig::from_toml(&text).map_err(recon_err)
}

/// Load sources and run the pipeline, going through the result cache
/// unless disabled.
fn load_result(input: &InputArgs) -> Result<(PipelineConfig, ReconResult), CliError> {
    let (config, data_dir) = resolve(input)?;
    log::info!("loading indicators from {}", data_dir.display());

    let files = read_sources(&data_dir).map_err(io_err)?;
    if files.is_empty() {
        return Err(CliError {
            code: recon_exit_code(&ReconError::NoSources),
            message: format!("no indicator files in {}", data_dir.display()),
            hint: Some("expected one .csv/.tsv file per indicator".into()),
        });
    }

    let cache = if input.no_cache {
        None
    } else {
        input
            .cache_dir
            .clone()
            .map(ResultCache::new)
            .or_else(ResultCache::default_location)
    };
    let key = fingerprint(&files, &config);

    if let Some(hit) = cache.as_ref().and_then(|c| c.get(&key)) {
        log::info!("using cached result {key}");
        return Ok((config, hit));
    }

    let sources = parse_sources(&files, &config).map_err(io_err)?;
    let result = gapview_recon::run(&config, &sources).map_err(recon_err)?;

    if let Some(ref cache) = cache {
        if let Err(e) = cache.put(&key, &result) {
            log::warn!("could not write cache entry: {e}");
        }
    }

    Ok((config, result))
}

fn print_run_summary(result: &ReconResult) {
    let s = &result.summary;
    let range = match s.period_range {
        Some(r) => format!("{}–{}", r.first, r.last),
        None => "none".into(),
    };
    eprintln!(
        "reconciled {} indicator(s): {} rows, {} entities, periods {}",
        s.indicators.len(),
        s.joined_rows,
        s.entities,
        range,
    );
}

fn write_out(output: Option<&Path>, f: impl FnOnce(&mut dyn Write) -> Result<(), String>) -> Result<(), CliError> {
    let fail = |msg: String| CliError { code: EXIT_IO, message: msg, hint: None };
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .map_err(|e| fail(format!("cannot write {}: {e}", path.display())))?;
            let mut writer = std::io::BufWriter::new(file);
            f(&mut writer).map_err(fail)?;
            writer.flush().map_err(|e| fail(e.to_string()))?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            f(&mut lock).map_err(fail)
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn cmd_reconcile(
    input: InputArgs,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let (config, result) = load_result(&input)?;
    let entity_header = config.entity_column.as_str();

    write_out(output.as_deref(), |w| match format {
        OutputFormat::Csv => {
            gapview_io::csv::write_tidy(&result.dataset, entity_header, PERIOD_HEADER, w)
                .map_err(|e| e.to_string())
        }
        OutputFormat::Json => {
            gapview_io::json::write_records(&result.dataset, entity_header, PERIOD_HEADER, &mut *w)
                .map_err(|e| e.to_string())?;
            writeln!(w).map_err(|e| e.to_string())
        }
    })?;

    print_run_summary(&result);
    Ok(())
}

pub fn cmd_view(
    input: InputArgs,
    entities: Vec<String>,
    period: Option<i32>,
    json: bool,
) -> Result<(), CliError> {
    let (config, result) = load_result(&input)?;
    let dataset = &result.dataset;

    let spec = config.chart_spec();
    spec.validate(dataset).map_err(|e| CliError {
        code: EXIT_INVALID_CONFIG,
        message: e.to_string(),
        hint: Some(format!("available indicators: {}", dataset.indicators.join(", "))),
    })?;

    let defaults = config.default_selection();
    let selection = Selection {
        entities: if entities.is_empty() { defaults.entities } else { entities },
        period: period.map(Period).unwrap_or(defaults.period),
    };

    let rows = view::select(dataset, &selection).map_err(|e| CliError {
        code: EXIT_EMPTY_SELECTION,
        message: e.to_string(),
        hint: Some("pass --entity NAME (repeatable)".into()),
    })?;
    let points = view::scatter(&spec, &rows);

    if json {
        let out = serde_json::json!({
            "period": selection.period,
            "chart": spec,
            "points": points,
        });
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{text}");
    } else {
        println!(
            "{:<24} {:>16} {:>16} {:>16}",
            config.entity_column, spec.x.indicator, spec.y.indicator, spec.size.indicator
        );
        for p in &points {
            println!("{:<24} {:>16} {:>16} {:>16}", p.entity, p.x, p.y, p.size);
        }
    }

    if points.is_empty() {
        let hint = view::period_range(dataset)
            .map(|r| format!("periods available: {}–{}", r.first, r.last))
            .unwrap_or_else(|| "dataset is empty".into());
        eprintln!("no rows for the selected entities in {} ({hint})", selection.period);
    }

    Ok(())
}

pub fn cmd_describe(input: InputArgs, json: bool) -> Result<(), CliError> {
    let (_, result) = load_result(&input)?;

    if json {
        let out = serde_json::json!({
            "meta": result.meta,
            "summary": result.summary,
            "entities": view::entities(&result.dataset),
        });
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        println!("{text}");
        return Ok(());
    }

    println!("{} (engine {}, computed {})", result.meta.config_name, result.meta.engine_version, result.meta.run_at);
    for ind in &result.summary.indicators {
        println!(
            "  {:<24} {:>4} entities × {:>4} periods, {:>6} of {:>6} cells present ({} after fill)",
            ind.indicator, ind.entities, ind.periods, ind.present, ind.cells, ind.present_after_fill,
        );
    }
    print_run_summary(&result);
    println!("entities: {}", view::entities(&result.dataset).join(", "));
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: '{}' reading '{}' keyed by '{}', chart {} × {} sized by {}",
        config.name,
        config.data_dir,
        config.entity_column,
        config.chart.x,
        config.chart.y,
        config.chart.size,
    );
    Ok(())
}
