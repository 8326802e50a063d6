//! Promille CLI - Command-line interface for the Promille engine
//!
//! Commands:
//! - snapshot: Evaluate a drink log and print a snapshot payload
//! - validate: Report which records in a log parse cleanly

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use promille::pipeline::PromilleProcessor;
use promille::{ingest, ENGINE_VERSION, PRODUCER_NAME};

/// Promille - On-device estimation engine for blood-alcohol level and
/// drinking-session analytics
#[derive(Parser)]
#[command(name = "promille")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Evaluate drink logs into intoxication snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a drink log and print a snapshot payload
    Snapshot {
        /// Drink log file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Activity log file path
        #[arg(long)]
        activity: Option<PathBuf>,

        /// Body profile file path
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Subject to evaluate
        #[arg(short, long)]
        user: String,

        /// Reference time (RFC3339); defaults to now
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Report which records in a log parse cleanly
    Validate {
        /// Record log file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Kind of records in the log
        #[arg(long, default_value = "drinks")]
        kind: RecordKind,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordKind {
    /// Drink events
    Drinks,
    /// Step-counter samples
    Activity,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PromilleCliError> {
    match cli.command {
        Commands::Snapshot {
            input,
            activity,
            profile,
            user,
            as_of,
        } => cmd_snapshot(
            &input,
            activity.as_deref(),
            profile.as_deref(),
            &user,
            as_of.as_deref(),
        ),

        Commands::Validate { input, kind, json } => cmd_validate(&input, kind, json),
    }
}

fn cmd_snapshot(
    input: &Path,
    activity: Option<&Path>,
    profile: Option<&Path>,
    user: &str,
    as_of: Option<&str>,
) -> Result<(), PromilleCliError> {
    let drinks_json = read_input(input)?;
    let activity_json = activity.map(fs::read_to_string).transpose()?;
    let profile_json = profile.map(fs::read_to_string).transpose()?;

    let processor = PromilleProcessor::new();
    let payload = processor.snapshot_json(
        &drinks_json,
        activity_json.as_deref(),
        profile_json.as_deref(),
        user,
        as_of,
    )?;

    println!("{payload}");
    Ok(())
}

#[derive(Serialize)]
struct ValidationReport {
    producer: String,
    version: String,
    total_records: usize,
    valid_records: usize,
    dropped_records: usize,
}

fn cmd_validate(input: &Path, kind: RecordKind, json: bool) -> Result<(), PromilleCliError> {
    let data = read_input(input)?;

    let total_records = match serde_json::from_str::<Vec<serde_json::Value>>(&data) {
        Ok(records) => records.len(),
        Err(e) => return Err(PromilleCliError::Json(e)),
    };

    let valid_records = match kind {
        RecordKind::Drinks => ingest::parse_drink_log(&data)?.len(),
        RecordKind::Activity => ingest::parse_activity_log(&data)?.len(),
    };
    let dropped_records = total_records - valid_records;

    let report = ValidationReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        total_records,
        valid_records,
        dropped_records,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Promille Validation Report");
        println!("==========================");
        println!("Records:  {}", report.total_records);
        println!("Valid:    {}", report.valid_records);
        println!("Dropped:  {}", report.dropped_records);
    }

    if dropped_records > 0 {
        Err(PromilleCliError::ValidationFailed(dropped_records))
    } else {
        Ok(())
    }
}

fn read_input(input: &Path) -> Result<String, PromilleCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(PromilleCliError::InteractiveStdin);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

enum PromilleCliError {
    Io(io::Error),
    Engine(promille::EngineError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    InteractiveStdin,
}

impl From<io::Error> for PromilleCliError {
    fn from(e: io::Error) -> Self {
        PromilleCliError::Io(e)
    }
}

impl From<promille::EngineError> for PromilleCliError {
    fn from(e: promille::EngineError) -> Self {
        PromilleCliError::Engine(e)
    }
}

impl From<serde_json::Error> for PromilleCliError {
    fn from(e: serde_json::Error) -> Self {
        PromilleCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PromilleCliError> for CliError {
    fn from(e: PromilleCliError) -> Self {
        match e {
            PromilleCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PromilleCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check record log contents".to_string()),
            },
            PromilleCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PromilleCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records were dropped", count),
                hint: Some("Fix the dropped records and retry".to_string()),
            },
            PromilleCliError::InteractiveStdin => CliError {
                code: "INTERACTIVE_STDIN".to_string(),
                message: "Refusing to read records from an interactive terminal".to_string(),
                hint: Some("Pipe a record log into stdin or pass --input <file>".to_string()),
            },
        }
    }
}
