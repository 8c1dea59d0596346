//! eventlog command-line entry point.

mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eventlog_codec::LogLevel;
use eventlog_error_tap::{ErrorTapState, HostHook, PanicHook, TapOptions};
use eventlog_store::{AppendOutcome, EventLogger, SharedLogger};
use tracing_subscriber::EnvFilter;

/// Record, query and export leveled log events.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file to use instead of the platform default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a message at the given level.
    Log {
        level: LogLevel,
        message: String,
        /// Destination code: 0 console, 1 store, 2 both.
        #[arg(long = "to")]
        destination: Option<u8>,
    },
    /// Record an error.
    Error {
        message: String,
        #[arg(long = "to")]
        destination: Option<u8>,
    },
    /// Record a warning.
    Warn {
        message: String,
        #[arg(long = "to")]
        destination: Option<u8>,
    },
    /// Record an informational message.
    Info {
        message: String,
        #[arg(long = "to")]
        destination: Option<u8>,
    },
    /// Print stored events, optionally filtered by level.
    Query {
        #[arg(default_value = "all")]
        level: LogLevel,
    },
    /// Delete the event stored under a key.
    Delete { key: String },
    /// Export every stored event to the export directory.
    Export,
    /// Delete every stored event.
    Clear,
    /// Panic with the error tap configured from `export_on_error`.
    Crash { message: String },
}

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = config::Config::load(args.config.as_deref())?;
    let mut logger = config.build_logger();

    match args.command {
        Command::Log {
            level,
            message,
            destination,
        } => record(&mut logger, level, &message, destination, &config),
        Command::Error {
            message,
            destination,
        } => record(&mut logger, LogLevel::Error, &message, destination, &config),
        Command::Warn {
            message,
            destination,
        } => record(&mut logger, LogLevel::Warning, &message, destination, &config),
        Command::Info {
            message,
            destination,
        } => record(
            &mut logger,
            LogLevel::Information,
            &message,
            destination,
            &config,
        ),
        Command::Query { level } => {
            print!("{}", logger.query(level)?);
        }
        Command::Delete { key } => {
            let removed = logger.delete(&key)?;
            tracing::info!(key = %key, removed, "delete finished");
        }
        Command::Export => logger.export_all()?,
        Command::Clear => {
            logger.clear()?;
        }
        Command::Crash { message } => crash(logger, config.tap_options(), &message),
    }

    Ok(())
}

fn record(
    logger: &mut EventLogger,
    level: LogLevel,
    message: &str,
    destination: Option<u8>,
    config: &config::Config,
) {
    let code = destination.unwrap_or(config.default_destination);
    report_append(logger.append_to_code(level, message, code));
}

fn report_append(outcome: AppendOutcome) {
    match outcome {
        AppendOutcome::Persisted(key) => tracing::debug!(key = %key, "event stored"),
        AppendOutcome::ConsoleOnly => {}
        AppendOutcome::Degraded(err) => tracing::warn!(error = %err, "event not persisted"),
        AppendOutcome::Rejected(err) => tracing::warn!(error = %err, "event rejected"),
    }
}

/// Hands the error slot to the tap configured by `options`.
///
/// With `export_on_error` off the tap stays `Disabled` and the original
/// handler keeps the slot.
fn install_tap<H: HostHook>(
    hook: H,
    logger: &SharedLogger,
    options: TapOptions,
) -> ErrorTapState<H> {
    let mut tap = ErrorTapState::new(hook);
    let state = tap.enable(options, None, logger);
    tracing::info!(?state, "error tap configured");
    tap
}

/// Panics under the configured error tap, so export-on-error can be
/// observed end to end.
fn crash(logger: EventLogger, options: TapOptions, message: &str) -> ! {
    let shared = logger.into_shared();
    let _tap = install_tap(PanicHook::new(), &shared, options);
    panic!("{message}");
}
