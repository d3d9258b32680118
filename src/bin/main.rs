//! XUnit CLI - explode rows of segmentation dimensions into XUnit keys
//!
//! Usage:
//!   xunit explode [FILE] [--config <xunit.toml>] [--policy <policy>] [--max-dims <n>]
//!   xunit check-config [--config <xunit.toml>]
//!
//! Examples:
//!   xunit explode rows.jsonl --max-dims 3
//!   cat rows.jsonl | xunit explode --policy marker --global false --output json
//!   xunit check-config --config xunit.toml

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};
use xunit::config::Settings;
use xunit::explode::{ExplodePolicy, Exploder};
use xunit::row::parse_row;

#[derive(Parser)]
#[command(name = "xunit")]
#[command(about = "XUnit - explode segmentation dimensions into canonical aggregation keys")]
#[command(version)]
struct Cli {
    /// Path to the settings file (defaults to ./xunit.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explode JSON rows, one per line
    Explode {
        /// Input file (stdin when omitted or "-")
        file: Option<PathBuf>,

        /// Explode policy (overrides settings)
        #[arg(short, long)]
        policy: Option<PolicyArg>,

        /// Maximum combined dimensionality for rows that do not set one
        #[arg(short, long)]
        max_dims: Option<usize>,

        /// Global flag for rows that do not set one
        #[arg(short, long)]
        global: Option<bool>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Load and validate the settings file
    CheckConfig,
}

#[derive(Clone, ValueEnum)]
enum PolicyArg {
    Constrained,
    Marker,
}

impl From<PolicyArg> for ExplodePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Constrained => ExplodePolicy::Constrained,
            PolicyArg::Marker => ExplodePolicy::Marker,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One XUnit per line
    Text,
    /// One JSON object per row, with counters
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load_or_default(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings);

    match cli.command {
        Commands::Explode {
            file,
            policy,
            max_dims,
            global,
            output,
        } => {
            let mut settings = settings;
            if let Some(policy) = policy {
                settings.explode.policy = policy.into();
            }
            if let Some(max_dims) = max_dims {
                settings.explode.max_dims = max_dims;
            }
            if let Some(global) = global {
                settings.explode.global = global;
            }
            cmd_explode(&settings, file.as_deref(), output)
        }
        Commands::CheckConfig => cmd_check_config(&settings),
    }
}

fn init_tracing(settings: &Settings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn cmd_explode(settings: &Settings, file: Option<&Path>, output: OutputFormat) -> ExitCode {
    let exploder = match Exploder::from_settings(settings) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        policy = %exploder.policy(),
        max_dims = settings.explode.max_dims,
        global = settings.explode.global,
        "exploding rows"
    );

    let reader: Box<dyn BufRead> = match file {
        None => Box::new(io::stdin().lock()),
        Some(path) if path == Path::new("-") => Box::new(io::stdin().lock()),
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::new(f)),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut rows = 0usize;
    let mut failed = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        rows += 1;

        let explosion = parse_row(&line)
            .map_err(|e| e.to_string())
            .and_then(|row| row.explode(&exploder, &settings.explode).map_err(|e| e.to_string()));

        let explosion = match explosion {
            Ok(x) => x,
            Err(e) => {
                error!(line = line_no, error = %e, "row failed");
                eprintln!("Line {}: {}", line_no, e);
                failed += 1;
                continue;
            }
        };
        debug!(
            line = line_no,
            emitted = explosion.emitted,
            filtered = explosion.filtered,
            skipped = explosion.skipped,
            "row exploded"
        );

        let written = match output {
            OutputFormat::Text => explosion
                .xunits
                .iter()
                .try_for_each(|xunit| writeln!(out, "{}", xunit)),
            OutputFormat::Json => match serde_json::to_string(&explosion) {
                Ok(json) => writeln!(out, "{}", json),
                Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
            },
        };
        if let Err(e) = written {
            eprintln!("Error writing output: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if let Err(e) = out.flush() {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }

    info!(rows, failed, "done");
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn cmd_check_config(settings: &Settings) -> ExitCode {
    match Exploder::from_settings(settings) {
        Ok(exploder) => {
            println!("Settings OK");
            println!("  policy:   {}", exploder.policy());
            println!("  max_dims: {}", settings.explode.max_dims);
            println!("  global:   {}", settings.explode.global);
            println!("  sentinel: {}", exploder.sentinel());
            println!("  logging:  {}", settings.logging.level);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Invalid settings: {}", e);
            ExitCode::FAILURE
        }
    }
}
