// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncReadExt;

use transon::app_config::{self, Config, TranslationProvider};
use transon::errors::AppError;
use transon::{CancellationHandle, ProgressEvent, RequestContext, TranslationService, TranslationStatus};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    WebGtx,
    CloudApi,
    MobileWeb,
    Offline,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::WebGtx => TranslationProvider::WebGtx,
            CliTranslationProvider::CloudApi => TranslationProvider::CloudApi,
            CliTranslationProvider::MobileWeb => TranslationProvider::MobileWeb,
            CliTranslationProvider::Offline => TranslationProvider::Offline,
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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for transon
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// transon - translate selected text while keeping its paragraph layout
#[derive(Parser, Debug)]
#[command(name = "transon")]
#[command(version)]
#[command(about = "Translate a block of text through web, cloud or offline backends")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "transon translates a block of text and prints the result, keeping blank-line paragraph breaks intact.

EXAMPLES:
    transon \"Hello world\"                      # Translate to the configured target (default: ru)
    pbpaste | transon                          # Read the text from stdin
    transon -t uk -p cloud-api \"Good morning\"  # Cloud API, Ukrainian target
    transon --deadline-secs 10 < article.txt   # Give up after 10 seconds, keeping what was translated
    transon completions zsh > _transon         # Generate zsh completions

CONFIGURATION:
    Configuration is stored in <config dir>/transon/conf.json by default. A
    default file is created on first use. The Cloud API key may also come from
    GOOGLE_CLOUD_TRANSLATE_API_KEY, GOOGLE_TRANSLATE_API_KEY or GOOGLE_API_KEY.

SUPPORTED PROVIDERS:
    web-gtx    - Public gtx endpoint (default)
    cloud-api  - Cloud Translation API (requires API key)
    mobile-web - Mobile translation page
    offline    - Local engine executable (JSON over stdin/stdout)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Text to translate; read from stdin when omitted
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Target language code (e.g., 'ru', 'uk', 'de')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "TRANSON_CONFIG")]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Abandon remaining work after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Print the request status to stderr
    #[arg(long)]
    show_status: bool,
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

    // @returns: Marker and ANSI colour for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
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
            let (marker, colour) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, marker, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logger starts at trace so the level can be narrowed later without reinstalling it
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "transon", &mut std::io::stdout());
        return Ok(());
    }

    run_translate(cli).await?;
    Ok(())
}

/// Load the configuration and apply command line overrides
fn load_config(options: &CommandLineOptions) -> Result<Config, AppError> {
    let config_path = options.config_path.clone().unwrap_or_else(Config::default_path);
    debug!("Using config file {}", config_path.display());
    let mut config = Config::load_or_create(&config_path).map_err(AppError::config)?;

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate()
        .context("Configuration validation failed")
        .map_err(AppError::config)?;
    Ok(config)
}

/// Text from the positional argument, or all of stdin
async fn read_input(text: Option<String>) -> Result<String, AppError> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            Ok(buffer)
        }
    }
}

fn spinner() -> ProgressBar {
    let progress_bar = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    progress_bar.set_style(style);
    progress_bar.set_message("Translating...");
    progress_bar
}

async fn run_translate(options: CommandLineOptions) -> Result<(), AppError> {
    let config = load_config(&options)?;
    log::set_max_level(config.log_level.to_level_filter());

    let provider = config.translation.provider;
    info!("Translating to {} via {}", config.target_language, provider.display_name());
    let service = TranslationService::new(config).map_err(AppError::config)?;
    let input = read_input(options.text.clone()).await?;

    let cancellation = CancellationHandle::new();
    let mut ctx = RequestContext::new().with_cancellation(cancellation.clone());
    if let Some(secs) = options.deadline_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling translation");
            cancellation.cancel();
        }
    });

    let progress_bar = spinner();
    let bar = progress_bar.clone();
    let on_progress = move |event: ProgressEvent| match event {
        ProgressEvent::Started => bar.enable_steady_tick(Duration::from_millis(100)),
        ProgressEvent::ChunkCompleted { completed, total } => {
            bar.set_message(format!("Translating... {}/{} chunks", completed, total));
        }
        ProgressEvent::Finished => bar.finish_and_clear(),
    };

    let result = service.translate_with_provider(&input, provider, &ctx, &on_progress).await;
    progress_bar.finish_and_clear();
    ctrl_c.abort();
    let outcome = result?;

    if options.show_status {
        eprintln!("status: {}", outcome.status);
    }
    if outcome.status == TranslationStatus::Original {
        warn!("Translation failed, showing the original text");
    }
    if let Some(text) = outcome.text {
        println!("{}", text);
    }

    Ok(())
}
