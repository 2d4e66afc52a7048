use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::allocator::{ClampPolicy, PunctuationPauses};
use crate::file_utils::FileManager;
use crate::styles::{parse_rgb, StyleOverrides, StyleRegistry};
use crate::synchronizer::{
    SyncSettings, DEFAULT_INTER_SCENE_GAP, DEFAULT_MAX_CHARS_PER_SECOND, DEFAULT_MIN_CHARS_PER_SECOND,
};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Timing and audio probing settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Subtitle output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Keyword highlighting in ASS output
    #[serde(default)]
    pub highlight: HighlightConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Subtitle file format to write
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    // @format: SubRip
    Srt,
    // @format: Advanced SubStation Alpha
    Ass,
    // @format: Both files
    #[default]
    Both,
}

impl SubtitleFormat {
    // @returns: Capitalized format name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Srt => "SRT",
            Self::Ass => "ASS",
            Self::Both => "SRT + ASS",
        }
    }

    pub fn writes_srt(&self) -> bool {
        matches!(self, Self::Srt | Self::Both)
    }

    pub fn writes_ass(&self) -> bool {
        matches!(self, Self::Ass | Self::Both)
    }

    // @returns: Lowercase format identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Srt => "srt".to_string(),
            Self::Ass => "ass".to_string(),
            Self::Both => "both".to_string(),
        }
    }
}

impl std::fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for SubtitleFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "ass" => Ok(Self::Ass),
            "both" => Ok(Self::Both),
            _ => Err(anyhow!("Invalid subtitle format: {}", s)),
        }
    }
}

/// Timing configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncConfig {
    // @field: Lower bound of the derived speech rate
    #[serde(default = "default_min_chars_per_second")]
    pub min_chars_per_second: f64,

    // @field: Upper bound of the derived speech rate
    #[serde(default = "default_max_chars_per_second")]
    pub max_chars_per_second: f64,

    // @field: Silence between scenes in seconds
    #[serde(default = "default_inter_scene_gap_secs")]
    pub inter_scene_gap_secs: f64,

    // @field: How clamped caption durations are rebalanced
    #[serde(default)]
    pub clamp_policy: ClampPolicy,

    // @field: Punctuation pause table
    #[serde(default)]
    pub pauses: PunctuationPauses,

    // @field: Timeout for one audio probe
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    // @field: Audio files probed at the same time
    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,
}

impl SyncConfig {
    pub fn to_settings(&self) -> SyncSettings {
        SyncSettings {
            min_chars_per_second: self.min_chars_per_second,
            max_chars_per_second: self.max_chars_per_second,
            inter_scene_gap: self.inter_scene_gap_secs,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_chars_per_second: default_min_chars_per_second(),
            max_chars_per_second: default_max_chars_per_second(),
            inter_scene_gap_secs: default_inter_scene_gap_secs(),
            clamp_policy: ClampPolicy::default(),
            pauses: PunctuationPauses::default(),
            probe_timeout_secs: default_probe_timeout_secs(),
            max_concurrent_probes: default_max_concurrent_probes(),
        }
    }
}

/// Output configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Style preset name; unknown names fall back to the default preset
    #[serde(default = "default_style")]
    pub style: String,

    /// Per-field overrides merged onto the preset
    #[serde(default)]
    pub style_overrides: StyleOverrides,

    /// Files to write
    #[serde(default)]
    pub format: SubtitleFormat,

    /// Target video width in pixels
    #[serde(default = "default_video_width")]
    pub video_width: u32,

    /// Target video height in pixels
    #[serde(default = "default_video_height")]
    pub video_height: u32,

    /// Emit one caption per word
    #[serde(default)]
    pub word_by_word: bool,

    /// Pre-wrap caption text to the style's line budget
    #[serde(default)]
    pub wrap_lines: bool,

    /// Output file name without extension
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
            style_overrides: StyleOverrides::default(),
            format: SubtitleFormat::default(),
            video_width: default_video_width(),
            video_height: default_video_height(),
            word_by_word: false,
            wrap_lines: false,
            file_stem: default_file_stem(),
        }
    }
}

/// A user-defined highlighted word
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CustomHighlightConfig {
    pub word: String,
    pub color: String,
    #[serde(default = "default_highlight_text_color")]
    pub text_color: String,
}

/// Keyword highlighting configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HighlightConfig {
    /// Whether ASS output carries highlight tags at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether dictionary words are highlighted without markup
    #[serde(default = "default_true")]
    pub auto_detect: bool,

    /// Extra words, taking precedence over the dictionary
    #[serde(default)]
    pub custom: Vec<CustomHighlightConfig>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_detect: true,
            custom: Vec::new(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_min_chars_per_second() -> f64 {
    DEFAULT_MIN_CHARS_PER_SECOND
}

fn default_max_chars_per_second() -> f64 {
    DEFAULT_MAX_CHARS_PER_SECOND
}

fn default_inter_scene_gap_secs() -> f64 {
    DEFAULT_INTER_SCENE_GAP
}

fn default_probe_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_probes() -> usize {
    4
}

fn default_style() -> String {
    "modern".to_string()
}

fn default_video_width() -> u32 {
    1280
}

fn default_video_height() -> u32 {
    720
}

fn default_file_stem() -> String {
    "subtitles".to_string()
}

fn default_highlight_text_color() -> String {
    "#FFFFFF".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        FileManager::write_to_file(path, &json)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let sync = &self.sync;

        if sync.min_chars_per_second.is_nan() || sync.min_chars_per_second <= 0.0 {
            return Err(anyhow!("sync.min_chars_per_second must be positive"));
        }
        if sync.max_chars_per_second < sync.min_chars_per_second {
            return Err(anyhow!(
                "sync.max_chars_per_second ({}) is below sync.min_chars_per_second ({})",
                sync.max_chars_per_second,
                sync.min_chars_per_second
            ));
        }
        if sync.inter_scene_gap_secs.is_nan() || sync.inter_scene_gap_secs < 0.0 {
            return Err(anyhow!("sync.inter_scene_gap_secs must not be negative"));
        }
        if sync.probe_timeout_secs == 0 {
            return Err(anyhow!("sync.probe_timeout_secs must be at least 1"));
        }
        if sync.max_concurrent_probes == 0 {
            return Err(anyhow!("sync.max_concurrent_probes must be at least 1"));
        }

        if self.output.video_width == 0 || self.output.video_height == 0 {
            return Err(anyhow!(
                "Invalid output resolution {}x{}",
                self.output.video_width,
                self.output.video_height
            ));
        }

        let overrides = &self.output.style_overrides;
        for (field, value) in [
            ("min_duration", overrides.min_duration),
            ("max_duration", overrides.max_duration),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(anyhow!(
                        "output.style_overrides.{} must be positive, got {}",
                        field,
                        value
                    ));
                }
            }
        }
        let style = StyleRegistry::builtin().create_custom_style(&self.output.style, overrides);
        if style.min_duration > style.max_duration {
            return Err(anyhow!(
                "Caption duration bounds are inverted for style '{}': min {}s > max {}s",
                self.output.style,
                style.min_duration,
                style.max_duration
            ));
        }

        for custom in &self.highlight.custom {
            if custom.word.trim().is_empty() {
                return Err(anyhow!("Custom highlight with an empty word"));
            }
            if parse_rgb(&custom.color).is_none() {
                return Err(anyhow!(
                    "Invalid color '{}' for custom highlight '{}'",
                    custom.color,
                    custom.word
                ));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            sync: SyncConfig::default(),
            output: OutputConfig::default(),
            highlight: HighlightConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
