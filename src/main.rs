// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use narrasync::app_config::{self, Config, SubtitleFormat};
use narrasync::app_controller::Controller;
use narrasync::ffmpeg_filters::{self, VideoFormat};
use narrasync::file_utils::FileManager;
use narrasync::styles::StyleRegistry;

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

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSubtitleFormat {
    Srt,
    Ass,
    Both,
}

impl From<CliSubtitleFormat> for SubtitleFormat {
    fn from(cli_format: CliSubtitleFormat) -> Self {
        match cli_format {
            CliSubtitleFormat::Srt => SubtitleFormat::Srt,
            CliSubtitleFormat::Ass => SubtitleFormat::Ass,
            CliSubtitleFormat::Both => SubtitleFormat::Both,
        }
    }
}

/// CLI Wrapper for VideoFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliVideoFormat {
    Standard,
    Youtube,
    Tiktok,
}

impl From<CliVideoFormat> for VideoFormat {
    fn from(cli_format: CliVideoFormat) -> Self {
        match cli_format {
            CliVideoFormat::Standard => VideoFormat::Standard,
            CliVideoFormat::Youtube => VideoFormat::Youtube,
            CliVideoFormat::Tiktok => VideoFormat::Tiktok,
        }
    }
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct SyncArgs {
    /// Script JSON file with a `scenes` array
    #[arg(short, long, value_name = "SCRIPT")]
    script: PathBuf,

    /// Directory holding one narration clip per scene, in file name order
    #[arg(short, long, value_name = "DIR", conflicts_with = "audio")]
    audio_dir: Option<PathBuf>,

    /// Narration clip for the next scene (repeat once per scene)
    #[arg(long, value_name = "FILE")]
    audio: Vec<PathBuf>,

    /// Directory for the generated subtitle files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Style preset (unknown names fall back to the default)
    #[arg(long)]
    style: Option<String>,

    /// Subtitle files to write
    #[arg(short, long, value_enum)]
    format: Option<CliSubtitleFormat>,

    /// Emit one caption per word
    #[arg(short, long)]
    word_by_word: bool,

    /// Wrap caption lines to the style's width
    #[arg(long)]
    wrap: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// SRT file to convert
    #[arg(value_name = "SRT_FILE")]
    input: PathBuf,

    /// Output directory (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Style preset
    #[arg(long)]
    style: Option<String>,

    /// Only highlight `{WORD:color}` markup, not dictionary words
    #[arg(long)]
    manual_only: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Subtitle file the filter should render (.srt or .ass)
    #[arg(value_name = "SUBTITLE_FILE")]
    subtitle: PathBuf,

    /// Style preset forced on SRT input
    #[arg(long)]
    style: Option<String>,

    /// Target video layout
    #[arg(long, value_enum, default_value = "standard")]
    video_format: CliVideoFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Time script narration against its audio and write SRT/ASS subtitles
    Sync(SyncArgs),

    /// Convert an SRT file into a keyword-highlighted ASS file
    Convert(ConvertArgs),

    /// List the available style presets
    Styles,

    /// Print the ffmpeg filter that burns a subtitle file into a video
    Filter(FilterArgs),

    /// Generate shell completions for narrasync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// narrasync - narration-synchronized subtitles
///
/// Times each scene's narration against its measured audio clip and writes
/// SRT and ASS subtitles ready for the video renderer.
#[derive(Parser, Debug)]
#[command(name = "narrasync")]
#[command(version)]
#[command(about = "Narration-synchronized subtitle generator")]
#[command(long_about = "narrasync splits each scene's narration into sentences, times them against the scene's audio clip, and writes one global SRT/ASS timeline.

EXAMPLES:
    narrasync sync -s script.json -a audio/            # Clips from a directory
    narrasync sync -s script.json --audio 1.mp3 --audio 2.mp3 --style tiktok
    narrasync sync -s script.json -a audio/ -f srt -w  # Word-by-word SRT only
    narrasync convert subtitles.srt                     # -> subtitles_highlighted.ass
    narrasync styles                                    # List style presets
    narrasync filter subtitles.srt --video-format tiktok
    narrasync completions bash > narrasync.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
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
        // the logger accepts everything, `log::set_max_level` does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info by default; raised or lowered once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Sync(args) => run_sync(args).await,
        Commands::Convert(args) => run_convert(args),
        Commands::Styles => {
            list_styles();
            Ok(())
        }
        Commands::Filter(args) => run_filter(args),
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "narrasync", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the config file, creating a default one when missing, and apply the log level
fn load_config(common: &CommonArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &common.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = &common.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save(config_path)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(log_level) = &common.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

async fn run_sync(args: SyncArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;

    // Override config with CLI options if provided
    if let Some(style) = &args.style {
        config.output.style = style.clone();
    }
    if let Some(format) = &args.format {
        config.output.format = format.clone().into();
    }
    if args.word_by_word {
        config.output.word_by_word = true;
    }
    if args.wrap {
        config.output.wrap_lines = true;
    }

    let audio_files = match &args.audio_dir {
        Some(dir) => {
            if !FileManager::dir_exists(dir) {
                return Err(anyhow!("Audio directory does not exist: {:?}", dir));
            }
            FileManager::find_audio_files(dir)?
        }
        None => args.audio.clone(),
    };
    if audio_files.is_empty() {
        return Err(anyhow!("No audio files given; use --audio-dir or --audio"));
    }

    info!(
        "Synchronizing {:?} with {} audio file(s), writing {}",
        args.script,
        audio_files.len(),
        config.output.format.display_name()
    );

    let controller = Controller::with_config(config)?;
    let outcome = controller
        .run_sync(&args.script, &audio_files, &args.output_dir)
        .await?;

    for skipped in &outcome.report.skipped {
        warn!("Scene {} skipped: {}", skipped.scene_index, skipped.reason);
    }
    info!(
        "Done: {} caption(s), average {:.2}s, {} warning(s)",
        outcome.track.len(),
        outcome.report.average_caption_duration(),
        outcome.warning_count()
    );
    if let Some(path) = &outcome.srt_path {
        info!("Success: {:?}", path);
    }
    if let Some(path) = &outcome.ass_path {
        info!("Success: {:?}", path);
    }

    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;
    if let Some(style) = &args.style {
        config.output.style = style.clone();
    }
    if args.manual_only {
        config.highlight.auto_detect = false;
    }

    if !FileManager::file_exists(&args.input) {
        return Err(anyhow!("Input file does not exist: {:?}", args.input));
    }

    let controller = Controller::with_config(config)?;
    let output = controller.convert_srt_to_ass(&args.input, args.output_dir.as_deref())?;
    info!("Success: {:?}", output);
    Ok(())
}

fn list_styles() {
    let registry = StyleRegistry::builtin();
    let mut stdout = std::io::stdout();
    for (name, description) in registry.available_styles() {
        let marker = if name == registry.default_preset().name() { "*" } else { " " };
        let _ = writeln!(stdout, "{} {:<14} {}", marker, name, description);
    }
}

fn run_filter(args: FilterArgs) -> Result<()> {
    let is_ass = args
        .subtitle
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ass"));

    let filter = if is_ass {
        ffmpeg_filters::ass_filter(&args.subtitle)
    } else {
        let registry = StyleRegistry::builtin();
        let style = registry.get_style(args.style.as_deref().unwrap_or(registry.default_preset().name()));
        ffmpeg_filters::subtitle_filter(style, &args.subtitle, args.video_format.into())
    };

    println!("{}", filter);
    Ok(())
}
