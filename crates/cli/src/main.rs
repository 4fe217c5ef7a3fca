// gapview CLI - reconcile per-indicator tables and query the joined dataset

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};
use recon::{InputArgs, OutputFormat};

#[derive(Parser)]
#[command(name = "gapview")]
#[command(about = "Join per-indicator country/year tables into one tidy dataset")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Forward-fill, reshape and join every indicator file; print the tidy table
    #[command(after_help = "\
Examples:
  gapview reconcile --data ./data
  gapview reconcile -c gapview.toml --format json
  gapview reconcile -c gapview.toml -o tidy.csv --no-cache")]
    Reconcile {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value = "csv")]
        format: OutputFormat,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show chart points for some entities at one period
    #[command(after_help = "\
Examples:
  gapview view -c gapview.toml
  gapview view --data ./data --entity Germany --entity Chad --period 1990
  gapview view -c gapview.toml --period 2005 --json")]
    View {
        #[command(flatten)]
        input: InputArgs,

        /// Entity to include (repeatable; default from config)
        #[arg(long, short = 'e', value_name = "NAME")]
        entity: Vec<String>,

        /// Period to show (default from config)
        #[arg(long, short = 'p')]
        period: Option<i32>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Summarize the sources and the joined dataset
    Describe {
        #[command(flatten)]
        input: InputArgs,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a pipeline config without loading data
    #[command(after_help = "\
Examples:
  gapview validate gapview.toml")]
    Validate {
        /// Path to the config file
        config: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // The fmt subscriber also installs the log → tracing bridge, so the
    // library crates' `log` records land here.
    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show usage
            eprintln!("Usage: gapview <command> [options]");
            eprintln!("       gapview --help for more information");
            Err(CliError { code: EXIT_USAGE, message: String::new(), hint: None })
        }
        Some(Commands::Reconcile { input, format, output }) => {
            recon::cmd_reconcile(input, format, output)
        }
        Some(Commands::View { input, entity, period, json }) => {
            recon::cmd_view(input, entity, period, json)
        }
        Some(Commands::Describe { input, json }) => recon::cmd_describe(input, json),
        Some(Commands::Validate { config }) => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}
