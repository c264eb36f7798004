// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};

use dubline::app_config::{self, Config, ProviderConfig, SynthesisEngine, TranslationProvider};
use dubline::app_controller::{Controller, DubJob};
use dubline::file_utils::FileManager;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Auto,
    #[value(name = "openrouter")]
    OpenRouter,
    Groq,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Auto => TranslationProvider::Auto,
            CliTranslationProvider::OpenRouter => TranslationProvider::OpenRouter,
            CliTranslationProvider::Groq => TranslationProvider::Groq,
        }
    }
}

/// CLI Wrapper for SynthesisEngine to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSynthesisEngine {
    Command,
    Google,
}

impl From<CliSynthesisEngine> for SynthesisEngine {
    fn from(cli_engine: CliSynthesisEngine) -> Self {
        match cli_engine {
            CliSynthesisEngine::Command => SynthesisEngine::Command,
            CliSynthesisEngine::Google => SynthesisEngine::Google,
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

/// Options shared by every pipeline command
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Word-level transcript JSON
    #[arg(long, value_name = "FILE")]
    transcript: PathBuf,

    /// Speaker turns (RTTM or JSON)
    #[arg(long, value_name = "FILE")]
    diarization: PathBuf,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'zh-cn')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct DubArgs {
    /// Source video or WAV file
    #[arg(value_name = "MEDIA")]
    media: PathBuf,

    /// Output WAV path (default: <media>.<target>.wav next to the media)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Scratch directory for extracted audio and speaker references
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Speech engine: voice-cloning command or Google Cloud TTS
    #[arg(short, long, value_enum)]
    engine: Option<CliSynthesisEngine>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Output JSON path for the sentence records
    #[arg(short, long)]
    output: PathBuf,

    /// Source video or WAV, used for emotion classification
    #[arg(long)]
    media: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Produce the dubbed vocal track for a video
    Dub(DubArgs),

    /// Segment, attribute and translate only, writing the sentence records
    Plan(PlanArgs),

    /// Generate shell completions for dubline
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// dubline - time-aligned dubbing tracks from transcripts
#[derive(Parser, Debug)]
#[command(name = "dubline")]
#[command(version)]
#[command(about = "Build a time-aligned dubbed vocal track for a video")]
#[command(long_about = "dubline turns a word-level transcript and speaker turns into a dubbed vocal track
in another language that lines up with the original video.

EXAMPLES:
    dubline dub talk.mp4 --transcript talk.json --diarization talk.rttm -t fr
    dubline dub talk.wav --transcript talk.json --diarization talk.rttm -t zh-cn -p groq
    dubline dub talk.mp4 --transcript talk.json --diarization talk.rttm -t es -e google
    dubline plan --transcript talk.json --diarization talk.rttm -t de -o plan.json
    dubline completions bash > dubline.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

TRANSLATION PROVIDERS:
    auto       - OpenRouter, then Groq, whichever has a key (default)
    openrouter - OpenRouter API (OPENROUTER_API_KEY)
    groq       - Groq API (GROQ_TOKEN or GROQ_API_KEY)

SPEECH ENGINES:
    command - external voice-cloning engine, one reference per speaker (default)
    google  - Google Cloud Text-to-Speech stock voice (GOOGLE_TTS_API_KEY)")]
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
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config if needed
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "dubline", &mut std::io::stdout());
            Ok(())
        }
        Commands::Dub(args) => run_dub(args).await,
        Commands::Plan(args) => run_plan(args).await,
    }
}

async fn run_dub(args: DubArgs) -> Result<()> {
    let config = load_config(&args.common, args.engine.clone())?;

    if !args.media.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", args.media));
    }

    let output = match &args.output {
        Some(output) => output.clone(),
        None => {
            let out_dir = args.media.parent().unwrap_or(Path::new(".")).to_path_buf();
            FileManager::generate_output_path(&args.media, out_dir, &config.target_language, "wav")
        }
    };

    // A user-provided work dir is kept, the default one is removed afterwards
    let scratch;
    let work_dir = match &args.work_dir {
        Some(dir) => dir.clone(),
        None => {
            scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
            scratch.path().to_path_buf()
        }
    };

    let job = DubJob {
        media: args.media,
        transcript: args.common.transcript.clone(),
        diarization: args.common.diarization.clone(),
        output,
        work_dir,
        force_overwrite: args.force_overwrite,
    };

    let controller = Controller::with_config(config)?;
    let report = controller.run(job).await?;

    let stats = &report.reconcile;
    info!(
        "Timing: {} stretched, {} padded, {} dropped, {} stretch failures, {} synthesis failures, drift {:+.3}s",
        stats.stretched,
        stats.padded,
        stats.dropped,
        stats.stretch_failed,
        stats.synthesis_failed,
        report.assembly.drift
    );
    Ok(())
}

async fn run_plan(args: PlanArgs) -> Result<()> {
    let config = load_config(&args.common, None)?;
    let controller = Controller::with_config(config)?;
    let plan = controller
        .run_plan(args.media, &args.common.transcript, &args.common.diarization, &args.output)
        .await?;
    info!("Planned {} sentences", plan.records.len());
    Ok(())
}

/// Load or create the configuration file, then apply command line overrides
fn load_config(options: &CommonArgs, engine: Option<CliSynthesisEngine>) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    apply_overrides(&mut config, options);
    if let Some(engine) = engine {
        config.synthesis.engine = engine.into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    Ok(config)
}

/// Override config with CLI options if provided
fn apply_overrides(config: &mut Config, options: &CommonArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        // The model applies to the first provider the run will try
        if let Some(provider) = config.translation.provider.chain().into_iter().next() {
            let provider_str = provider.to_lowercase_string();
            match config.translation.available_providers.iter_mut()
                .find(|p| p.provider_type == provider_str) {
                Some(provider_config) => provider_config.model = model.clone(),
                None => {
                    let mut provider_config = ProviderConfig::new(provider);
                    provider_config.model = model.clone();
                    config.translation.available_providers.push(provider_config);
                }
            }
        }
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}
