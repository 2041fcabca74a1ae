// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, error, info, warn};
use std::io::Write;
use std::path::PathBuf;

use signcast::app_config::{self, Config, Direction, Theme};
use signcast::display::{DisplayController, DisplayState, NormalizeOutcome};
use signcast::file_utils::FileManager;

/// CLI Wrapper for Direction to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliDirection {
    Row,
    #[value(alias = "column")]
    Col,
}

impl From<CliDirection> for Direction {
    fn from(cli_direction: CliDirection) -> Self {
        match cli_direction {
            CliDirection::Row => Direction::Row,
            CliDirection::Col => Direction::Column,
        }
    }
}

/// CLI Wrapper for Theme to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTheme {
    Light,
    Dark,
}

impl From<CliTheme> for Theme {
    fn from(cli_theme: CliTheme) -> Self {
        match cli_theme {
            CliTheme::Light => Theme::Light,
            CliTheme::Dark => Theme::Dark,
        }
    }
}

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

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum CliFormat {
    Png,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize FSW tokens, show them and optionally export them
    Render(RenderArgs),

    /// Generate shell completions for signcast
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// FSW tokens, in display order
    #[arg(value_name = "TOKEN")]
    tokens: Vec<String>,

    /// Read whitespace-separated tokens from a file instead
    #[arg(short, long, conflicts_with = "tokens")]
    input: Option<PathBuf>,

    /// Layout direction
    #[arg(short, long, value_enum)]
    direction: Option<CliDirection>,

    /// Glyph size in pixels
    #[arg(short, long)]
    size: Option<u32>,

    /// Background theme of image exports
    #[arg(long, value_enum)]
    theme: Option<CliTheme>,

    /// Export the display in this format
    #[arg(short, long, value_enum)]
    format: Option<CliFormat>,

    /// Directory that receives exports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Directory holding the SignWriting font files
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "signcast.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// SignCast - SignWriting display and export
///
/// Normalizes Formal SignWriting tokens, lays them out as signs and exports
/// the result as a PNG image or a plain-text report.
#[derive(Parser, Debug)]
#[command(name = "signcast")]
#[command(version)]
#[command(about = "SignWriting display and export tool")]
#[command(long_about = "SignCast normalizes Formal SignWriting (FSW) tokens and renders them as signs.

EXAMPLES:
    signcast render M508x531S15a04483x510                  # Normalize and show one sign
    signcast render -d row -f png AS10000M... M518x518...  # Export a row of signs as PNG
    signcast render -i signs.txt -f text -o ./out          # Text export of tokens in a file
    signcast completions bash > signcast.bash              # Generate bash completions

CONFIGURATION:
    Configuration is stored in signcast.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
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
            let (emoji, color) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize with the most verbose level; the effective level is set after
    // the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "signcast", &mut std::io::stdout());
            Ok(())
        }
        Commands::Render(args) => run_render(args).await,
    }
}

async fn run_render(options: RenderArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config)?;

    // Override config with CLI options if provided
    if let Some(direction) = &options.direction {
        config.display.direction = direction.clone().into();
    }
    if let Some(size) = options.size {
        config.display.sign_size = size;
    }
    if let Some(theme) = &options.theme {
        config.display.theme = theme.clone().into();
    }
    if let Some(output_dir) = &options.output_dir {
        config.export.output_dir = Some(output_dir.clone());
    }
    if let Some(font_dir) = &options.font_dir {
        config.fonts.font_dir = Some(font_dir.clone());
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let tokens = match &options.input {
        Some(path) => FileManager::read_tokens(path)?,
        None => options.tokens.clone(),
    };
    debug!("Rendering {} token(s)", tokens.len());

    let controller = DisplayController::from_config(&config)?;
    if controller.mount().await == DisplayState::FontLoadFailed {
        return Err(anyhow!("{}", DisplayState::FontLoadFailed.message().unwrap_or_default()));
    }

    match controller.set_tokens(tokens).await? {
        NormalizeOutcome::Applied { stats, .. } if stats.fallbacks() > 0 => {
            warn!("{} token(s) kept their raw form", stats.fallbacks());
        }
        outcome => debug!("Normalization outcome: {:?}", outcome),
    }

    let state = controller.state();
    println!("{}", controller.status_line());
    match state.message() {
        Some(message) => println!("{}", message),
        None => {
            for element in controller.glyph_tree().elements() {
                println!("{}: {}", element.label(), element.fsw);
            }
        }
    }

    let Some(format) = options.format else {
        return Ok(());
    };

    let result = match format {
        CliFormat::Png => controller.export_image().await,
        CliFormat::Text => controller.export_text().await,
    };

    match result {
        Ok(artifact) => {
            let path = FileManager::generate_output_path(
                config.export.resolve_output_dir(),
                &artifact.file_name,
            );
            info!("Success: {:?}", path);
            Ok(())
        }
        Err(e) => {
            error!("{}", e.user_notice());
            Err(e.into())
        }
    }
}
