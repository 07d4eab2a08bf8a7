// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use szlk_backend::app_config::{self, Config};
use szlk_backend::data_connection::DataConnection;
use szlk_backend::database::{DatabaseConnection, Repository};
use szlk_backend::languages::LanguageCatalog;
use szlk_backend::login::SimpleLoginValidator;
use szlk_backend::server::{self, AppState};

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
    /// Run the HTTP server (default command)
    Serve(ServeArgs),

    /// Generate shell completions for szlk-backend
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// szlk-backend - translation dictionary server
#[derive(Parser, Debug)]
#[command(name = "szlk-backend")]
#[command(version)]
#[command(about = "Translation dictionary backend")]
#[command(long_about = "Serves a translation dictionary over HTTP: search by source text, batch
create/update and delete for authorized users, and the UI language catalog.

EXAMPLES:
    szlk-backend                               # Serve using conf.json
    szlk-backend -p 8080                       # Serve on another port
    szlk-backend serve -d ./translations.db    # Use a specific database file
    szlk-backend completions bash > szlk.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set from config below
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "szlk-backend", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Serve(args)) => run_serve(args).await,
        None => run_serve(cli.serve).await,
    }
}

fn load_config(options: &ServeArgs) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(host) = &options.host {
        config.server.host = host.clone();
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }
    if let Some(database) = &options.database {
        config.database.path = Some(database.clone());
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

async fn run_serve(options: ServeArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&options)?;
    log::set_max_level(config.log_level.to_level_filter());

    let db = match &config.database.path {
        Some(path) => DatabaseConnection::new(path)?,
        None => DatabaseConnection::new_default()?,
    };
    match db.stats() {
        Ok(stats) => info!("Database ready at {:?} ({})", db.path(), stats),
        Err(e) => warn!("Could not read database statistics: {}", e),
    }

    let data = DataConnection::with_max_results(
        Arc::new(Repository::new(db)),
        config.search.max_results,
    );
    let validator = SimpleLoginValidator::new(&config.login.users);
    info!("{} login user(s) configured", validator.user_count());

    let catalog = match &config.languages.catalog_path {
        Some(path) => LanguageCatalog::load(path)?,
        None => LanguageCatalog::builtin(),
    };

    let state = AppState::new(data.clone(), Arc::new(validator), catalog);
    let listener = tokio::net::TcpListener::bind(config.server.address())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.address()))?;

    let served = server::serve(listener, state, shutdown_signal()).await;

    info!("Closing data connection");
    if let Err(e) = data.close().await {
        error!("Could not close data connection before shutdown: {}", e);
    }

    served
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
