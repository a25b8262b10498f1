// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::sync::Arc;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use captionmerge::app_config::{self, Config};
use captionmerge::providers::youtube::YouTube;
use captionmerge::server;
use captionmerge::transcript_service::TranscriptService;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service (default command)
    Serve,

    /// Fetch and merge one transcript, printing it as JSON
    Fetch {
        /// Video URL or 11-character video ID
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Print the raw {text, start, duration} shape instead of the formatted one
        #[arg(long)]
        raw: bool,
    },

    /// Generate shell completions for captionmerge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// captionmerge - sentence level transcripts from video captions
///
/// Fetches a video's caption track and merges the short caption cues into
/// sentence segments with timestamps.
#[derive(Parser, Debug)]
#[command(name = "captionmerge")]
#[command(version)]
#[command(about = "Sentence level transcripts from video captions")]
#[command(long_about = "captionmerge fetches a video's captions and merges them into sentence segments.

EXAMPLES:
    captionmerge                                  # Serve on the configured address
    captionmerge --port 8080 serve                # Serve on another port
    captionmerge fetch https://youtu.be/dQw4w9WgXcQ
    captionmerge fetch dQw4w9WgXcQ --raw")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Interface to bind
    #[arg(long, env = "CAPTIONMERGE_HOST", global = true)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long, env = "CAPTIONMERGE_PORT", global = true)]
    port: Option<u16>,

    /// Caption language to fetch
    #[arg(long, global = true)]
    language: Option<String>,
}

// @struct: Colored stderr logger, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config tells us otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "captionmerge", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it before loading the config
    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    let provider = Arc::new(YouTube::from_config(&config.captions));
    let service = Arc::new(TranscriptService::new(provider));

    match cli.command {
        Some(Commands::Fetch { video, raw }) => run_fetch(&service, &video, raw).await,
        _ => {
            info!("Fetching '{}' captions from {}", config.captions.language, config.captions.endpoint);
            server::serve(&config.server, &config.cors, service).await
        }
    }
}

// Load the config file and apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(language) = &cli.language {
        config.captions.language = language.clone();
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

async fn run_fetch(service: &TranscriptService, video: &str, raw: bool) -> Result<()> {
    let json = if raw {
        serde_json::to_string_pretty(&service.transcript(video).await?)
    } else {
        serde_json::to_string_pretty(&service.formatted(video).await?)
    }
    .context("Failed to serialize transcript")?;

    println!("{}", json);
    Ok(())
}
