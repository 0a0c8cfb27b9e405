use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use myschedule_rust::calendar::suggested_file_name;
use myschedule_rust::config::AppConfig;
use myschedule_rust::logging::{init_logging, OperationTimer};
use myschedule_rust::extractor::entities_from_value;
use myschedule_rust::validation::InputValidator;
use myschedule_rust::{ConversionRequest, ScheduleService, ScheduleStore, ShiftExtractor};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Extra configuration file, applied after the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the shift records found in an entity file as JSON
    Extract {
        /// Entity JSON file (array or document with an "entities" field)
        input: PathBuf,
    },
    /// Convert an entity file into an iCalendar document
    Convert {
        /// Entity JSON file (array or document with an "entities" field)
        input: PathBuf,

        /// Calendar display name
        #[arg(short, long)]
        name: Option<String>,

        /// IANA timezone for event times
        #[arg(short, long)]
        timezone: Option<String>,

        /// Output file; writes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write to a file named after the calendar in this directory
        #[arg(long, conflicts_with = "output")]
        output_dir: Option<PathBuf>,

        /// Keep the conversion in the schedule store
        #[arg(long)]
        store: bool,

        /// Uploader email recorded with a stored conversion
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Print a stored calendar
    Show {
        job_id: String,

        /// Print the stored shift records instead of the calendar
        #[arg(long)]
        shifts: bool,

        /// Write the calendar to this file instead of stdout
        #[arg(short, long, conflicts_with = "shifts")]
        output: Option<PathBuf>,
    },
    /// List stored job ids
    List,
    /// Delete a stored conversion
    Remove { job_id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_with_file(cli.config.as_deref())?;

    let log_file = config.logging.file_path.as_ref().map(PathBuf::from);
    let _log_guard = init_logging(
        Some(&config.get_log_level()),
        log_file.as_deref(),
        config.logging.format == "json",
    )?;

    info!("Starting myschedule");

    match cli.command {
        Commands::Extract { input } => extract(&config, &input)?,
        Commands::Convert {
            input,
            name,
            timezone,
            output,
            output_dir,
            store,
            email,
        } => {
            if store {
                config.storage.enabled = true;
            }
            let calendar_name = name.unwrap_or_else(|| config.calendar.default_name.clone());
            let timezone = timezone.or_else(|| config.get_timezone());

            InputValidator::validate_calendar_name(&calendar_name)?;
            if let Some(tz) = &timezone {
                if let Err(e) = InputValidator::validate_timezone(tz) {
                    warn!(error = %e, "Falling back to floating local time");
                }
            }
            if let Some(email) = &email {
                InputValidator::validate_email(email)?;
            }

            let output = match (output, output_dir) {
                (Some(path), _) => Some(path),
                (None, Some(dir)) => Some(dir.join(suggested_file_name(&calendar_name))),
                (None, None) => None,
            };
            if let Some(path) = &output {
                InputValidator::validate_file_path(path)?;
            }

            let request = ConversionRequest {
                calendar_name: &calendar_name,
                timezone: timezone.as_deref(),
                owner_email: email.as_deref(),
            };
            convert(&config, &input, &request, output.as_deref())?;
        }
        Commands::Show {
            job_id,
            shifts,
            output,
        } => show(&config, &job_id, shifts, output.as_deref())?,
        Commands::List => list(&config)?,
        Commands::Remove { job_id } => remove(&config, &job_id)?,
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read entity file {}", path.display()))
}

/// Extract shift records and print them as JSON
fn extract(config: &AppConfig, input: &Path) -> Result<()> {
    let raw = read_input(input)?;
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(error = %e, "Entity file is not valid JSON");
        serde_json::Value::Null
    });

    let extractor = ShiftExtractor::new(config.extraction.clone())?;
    let shifts = extractor.extract_shifts(&entities_from_value(&value));
    info!("Found {} shifts", shifts.len());

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &shifts)?;
    writeln!(stdout)?;
    Ok(())
}

/// Convert an entity file and write the calendar
fn convert(
    config: &AppConfig,
    input: &Path,
    request: &ConversionRequest<'_>,
    output: Option<&Path>,
) -> Result<()> {
    let timer = OperationTimer::new("cli_convert");
    let raw = read_input(input)?;

    let service = ScheduleService::from_config(config).context("Failed to set up conversion")?;
    let conversion = service.convert_json(&raw, request)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &conversion.calendar)
                .with_context(|| format!("Failed to write calendar to {}", path.display()))?;
            info!("Wrote {} shifts to {}", conversion.shifts.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&conversion.calendar)?;
            stdout.flush()?;
        }
    }

    if let Some(job_id) = &conversion.job_id {
        info!(job_id = %job_id, "Conversion stored");
        writeln!(std::io::stderr(), "job id: {job_id}")?;
    }

    let snapshot = service.metrics().snapshot();
    info!(
        rows_seen = snapshot.rows_seen,
        rows_skipped = snapshot.rows_skipped,
        events = snapshot.events_encoded,
        "Conversion summary"
    );
    timer.finish();
    Ok(())
}

fn open_store(config: &AppConfig) -> Result<ScheduleStore> {
    ScheduleStore::open(Path::new(&config.storage.path))
        .with_context(|| format!("Failed to open schedule store at {}", config.storage.path))
}

/// Print a stored calendar or its shifts
fn show(config: &AppConfig, job_id: &str, shifts: bool, output: Option<&Path>) -> Result<()> {
    InputValidator::validate_job_id(job_id)?;
    let schedule = open_store(config)?.get(job_id)?;

    if let Some(path) = output {
        InputValidator::validate_file_path(path)?;
        std::fs::write(path, schedule.calendar.as_bytes())
            .with_context(|| format!("Failed to write calendar to {}", path.display()))?;
        info!("Wrote stored calendar to {}", path.display());
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    if shifts {
        serde_json::to_writer_pretty(&mut stdout, &schedule.shifts)?;
        writeln!(stdout)?;
    } else {
        stdout.write_all(schedule.calendar.as_bytes())?;
    }
    Ok(())
}

fn list(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    let mut stdout = std::io::stdout().lock();
    for job_id in store.list_jobs()? {
        if let Some(schedule) = store.load(&job_id)? {
            writeln!(
                stdout,
                "{}\t{}\t{} shifts\t{}",
                schedule.job_id,
                schedule.created_at.format("%Y-%m-%d %H:%M:%S"),
                schedule.shifts.len(),
                schedule.calendar_name
            )?;
        }
    }
    Ok(())
}

fn remove(config: &AppConfig, job_id: &str) -> Result<()> {
    InputValidator::validate_job_id(job_id)?;
    if open_store(config)?.remove(job_id)? {
        info!(job_id, "Removed stored schedule");
    } else {
        warn!(job_id, "No stored schedule with that id");
    }
    Ok(())
}
