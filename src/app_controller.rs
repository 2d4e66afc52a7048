use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::ass_writer::{AssGenerator, AssOptions};
use crate::audio_probe::{AudioProbe, DefaultAudioProbe};
use crate::file_utils::FileManager;
use crate::highlight::KeywordHighlighter;
use crate::styles::{StyleRegistry, SubtitleStyle};
use crate::subtitle_processor::CaptionTrack;
use crate::synchronizer::{self, Script, ScriptSynchronizer, SyncReport};
use crate::validation::{TimelineValidationResult, TimelineValidator, TimelineValidatorConfig};

// @module: Application controller for subtitle synchronization

/// Files and statistics produced by one synchronization run
#[derive(Debug)]
pub struct SyncOutcome {
    // @field: Synchronized timeline and skipped scenes
    pub report: SyncReport,
    // @field: Captions as written, after word splitting and wrapping
    pub track: CaptionTrack,
    pub srt_path: Option<PathBuf>,
    pub ass_path: Option<PathBuf>,
    pub validation: TimelineValidationResult,
    pub elapsed: Duration,
}

impl SyncOutcome {
    // @returns: Number of skipped scenes
    pub fn warning_count(&self) -> usize {
        self.report.warning_count()
    }
}

/// Main application controller for subtitle synchronization
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Style presets
    registry: StyleRegistry,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self {
            config,
            registry: StyleRegistry::builtin(),
        })
    }

    /// Replace the style registry
    pub fn with_registry(mut self, registry: StyleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    /// Configured preset with the configured overrides merged on top
    pub fn resolve_style(&self) -> SubtitleStyle {
        let output = &self.config.output;
        if self.registry.resolve(&output.style).name() != output.style.trim().to_lowercase() {
            warn!(
                "Unknown style '{}', using '{}'",
                output.style,
                self.registry.default_preset()
            );
        }
        self.registry.create_custom_style(&output.style, &output.style_overrides)
    }

    /// Synchronizer paced by `style` and tuned by the sync configuration
    pub fn build_synchronizer(&self, style: &SubtitleStyle) -> ScriptSynchronizer {
        ScriptSynchronizer::new(style, self.config.sync.to_settings())
            .with_pauses(self.config.sync.pauses.clone())
            .with_clamp_policy(self.config.sync.clamp_policy)
    }

    /// ASS generator for the configured frame size and custom highlights
    pub fn build_ass_generator(&self) -> AssGenerator {
        let mut highlighter = KeywordHighlighter::default();
        for custom in &self.config.highlight.custom {
            highlighter.add_custom_highlight(&custom.word, &custom.color, &custom.text_color);
        }
        AssGenerator::new(self.config.output.video_width, self.config.output.video_height)
            .with_highlighter(highlighter)
    }

    pub fn ass_options(&self) -> AssOptions {
        AssOptions {
            highlight_keywords: self.config.highlight.enabled,
            auto_detect: self.config.highlight.auto_detect,
        }
    }

    /// Synchronize a script file with its narration audio and write the subtitle files
    pub async fn run_sync(&self, script_path: &Path, audio_files: &[PathBuf], output_dir: &Path) -> Result<SyncOutcome> {
        let script = Script::load(script_path)?;
        let probe = DefaultAudioProbe::new(Duration::from_secs(self.config.sync.probe_timeout_secs));
        self.run_sync_with_probe(&script, audio_files, output_dir, &probe).await
    }

    /// Synchronize with a caller-supplied audio probe
    pub async fn run_sync_with_probe(
        &self,
        script: &Script,
        audio_files: &[PathBuf],
        output_dir: &Path,
        probe: &dyn AudioProbe,
    ) -> Result<SyncOutcome> {
        let start_time = Instant::now();

        if script.is_empty() {
            return Err(anyhow!("Script has no scenes"));
        }

        let style = self.resolve_style();
        info!(
            "Synchronizing {} scene(s) with style '{}'",
            script.len(),
            self.registry.resolve(&self.config.output.style)
        );

        let progress_bar = ProgressBar::new(script.len().min(audio_files.len()) as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} clips ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Measuring audio");

        let pb = progress_bar.clone();
        let prepared = synchronizer::prepare_scenes(
            script,
            audio_files,
            probe,
            Duration::from_secs(self.config.sync.probe_timeout_secs),
            self.config.sync.max_concurrent_probes,
            &move || pb.inc(1),
        )
        .await;
        progress_bar.finish_and_clear();

        let report = self
            .build_synchronizer(&style)
            .synchronize_prepared(prepared)
            .into_non_empty()?;

        let track = self.shape_track(CaptionTrack::new(report.captions.clone()), &style);
        let validation = self.validate_track(&track);

        FileManager::ensure_dir(output_dir)?;
        let (srt_path, ass_path) = self.write_outputs(&track, &style, output_dir)?;

        let elapsed = start_time.elapsed();
        info!(
            "Wrote {} caption(s) covering {:.2}s in {} ({} scene(s) skipped)",
            track.len(),
            report.total_duration(),
            Self::format_duration(elapsed),
            report.warning_count()
        );

        Ok(SyncOutcome {
            report,
            track,
            srt_path,
            ass_path,
            validation,
            elapsed,
        })
    }

    /// Apply word splitting and line wrapping as configured
    fn shape_track(&self, track: CaptionTrack, style: &SubtitleStyle) -> CaptionTrack {
        let track = if self.config.output.word_by_word {
            track.split_into_words()
        } else {
            track
        };
        if self.config.output.wrap_lines {
            track.wrap_for_style(style)
        } else {
            track
        }
    }

    /// Check the final timeline and log a summary
    fn validate_track(&self, track: &CaptionTrack) -> TimelineValidationResult {
        let validator = TimelineValidator::with_config(TimelineValidatorConfig {
            max_cps: self.config.sync.max_chars_per_second,
            ..Default::default()
        });
        let result = validator.validate_timeline(&track.captions);

        if !result.passed {
            warn!(
                "Timeline check found {} issue(s) in {} caption(s)",
                result.total_issues,
                result.failed_captions().len()
            );
            for failed in result.failed_captions() {
                for issue in &failed.issues {
                    debug!("Caption {}: {}", failed.index, issue);
                }
            }
        }

        result
    }

    /// Write the configured subtitle formats
    fn write_outputs(&self, track: &CaptionTrack, style: &SubtitleStyle, output_dir: &Path) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
        let format = self.config.output.format;
        let stem = &self.config.output.file_stem;

        let srt_path = if format.writes_srt() {
            let path = FileManager::generate_output_path(output_dir, stem, "srt");
            track.write_to_srt(&path)?;
            info!("SRT written to {}", path.display());
            Some(path)
        } else {
            None
        };

        let ass_path = if format.writes_ass() {
            let path = FileManager::generate_output_path(output_dir, stem, "ass");
            self.build_ass_generator()
                .write_to_file(&path, &track.captions, style, self.ass_options())?;
            info!("ASS written to {}", path.display());
            Some(path)
        } else {
            None
        };

        Ok((srt_path, ass_path))
    }

    /// Convert an SRT file into a highlighted ASS file named `<stem>_highlighted.ass`
    pub fn convert_srt_to_ass(&self, srt_path: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
        let content = FileManager::read_to_string(srt_path)?;
        let style = self.resolve_style();
        let ass = self
            .build_ass_generator()
            .generate_from_srt(&content, &style, self.ass_options())
            .with_context(|| format!("Failed to convert {}", srt_path.display()))?;

        let stem = srt_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "subtitles".to_string());
        let dir = output_dir
            .map(Path::to_path_buf)
            .or_else(|| srt_path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let output_path = FileManager::generate_output_path(dir, &format!("{}_highlighted", stem), "ass");

        FileManager::write_to_file(&output_path, &ass)?;
        info!("Converted {} to {}", srt_path.display(), output_path.display());
        Ok(output_path)
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
