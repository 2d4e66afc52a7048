/*!
 * Script-to-audio synchronization.
 *
 * Each scene of a script is backed by one rendered narration clip. The
 * synchronizer times every scene's sentences against the measured length of
 * its clip, then stitches the scenes into one global timeline, leaving a
 * fixed gap of silence between consecutive scenes.
 *
 * Synchronization runs in two passes:
 * 1. every scene is allocated independently on its own local timeline
 * 2. a running cursor offsets each scene and captions are numbered 1..N
 *
 * The cursor always advances by the measured audio duration plus the gap,
 * so a scene starts exactly when the previous clip ends even when clamping
 * made that scene's captions finish early or late.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::allocator::{ClampPolicy, PunctuationPauses, TimedSegment, TimingAllocator};
use crate::audio_probe::AudioProbe;
use crate::errors::{ProbeError, SyncError};
use crate::styles::SubtitleStyle;
use crate::subtitle_processor::TimedCaption;

// @const: Silence between two consecutive scenes, in seconds
pub const DEFAULT_INTER_SCENE_GAP: f64 = 0.5;

// @const: Readable speech rate band, in characters per second
pub const DEFAULT_MIN_CHARS_PER_SECOND: f64 = 12.0;
pub const DEFAULT_MAX_CHARS_PER_SECOND: f64 = 25.0;

/// One scene of a script as produced by the script generator
///
/// Older scripts store the narration under `text` instead of `narration`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptScene {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ScriptScene {
    /// Trimmed narration, falling back to `text`
    pub fn narration_text(&self) -> String {
        self.narration
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.text.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// Ordered scenes of a narrated video
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub scenes: Vec<ScriptScene>,
}

impl Script {
    /// Load a script from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SyncError::ScriptLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
            .map_err(|e| SyncError::ScriptLoad(format!("{}: {}", path.display(), e)))
    }

    /// Parse a script from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, SyncError> {
        serde_json::from_str(content).map_err(|e| SyncError::ScriptLoad(e.to_string()))
    }

    /// Build a script from bare narration strings
    pub fn from_narrations<I, S>(narrations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scenes: narrations
                .into_iter()
                .map(|n| ScriptScene {
                    narration: Some(n.into()),
                    text: None,
                })
                .collect(),
        }
    }

    pub fn narrations(&self) -> Vec<String> {
        self.scenes.iter().map(ScriptScene::narration_text).collect()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

/// Narration of one scene with the measured length of its audio
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNarration {
    // @field: 1-based position in the script
    pub scene_index: usize,
    pub text: String,
    pub audio_duration_seconds: f64,
}

impl SceneNarration {
    pub fn new(scene_index: usize, text: impl Into<String>, audio_duration_seconds: f64) -> Self {
        Self {
            scene_index,
            text: text.into(),
            audio_duration_seconds,
        }
    }
}

/// Why a scene produced no captions
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    EmptyText,
    InvalidDuration(f64),
    AudioUnavailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyText => write!(f, "narration text is empty"),
            SkipReason::InvalidDuration(d) => write!(f, "audio duration {:.3}s is not positive", d),
            SkipReason::AudioUnavailable(reason) => write!(f, "audio unavailable: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedScene {
    pub scene_index: usize,
    pub reason: SkipReason,
}

/// Placement of one synchronized scene on the global timeline
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTiming {
    pub scene_index: usize,
    // @field: Global time at which the scene's audio starts
    pub offset_seconds: f64,
    pub audio_duration_seconds: f64,
    pub caption_count: usize,
    // @field: Effective reading speed used for allocation
    pub chars_per_second: f64,
}

/// Outcome of a synchronization run
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub captions: Vec<TimedCaption>,
    pub scene_timings: Vec<SceneTiming>,
    pub skipped: Vec<SkippedScene>,
}

impl SyncReport {
    // @returns: Number of scenes that were skipped
    pub fn warning_count(&self) -> usize {
        self.skipped.len()
    }

    /// End of the last caption
    pub fn total_duration(&self) -> f64 {
        self.captions
            .iter()
            .map(|c| c.end_seconds)
            .fold(0.0, f64::max)
    }

    pub fn average_caption_duration(&self) -> f64 {
        if self.captions.is_empty() {
            return 0.0;
        }
        self.captions.iter().map(TimedCaption::duration).sum::<f64>() / self.captions.len() as f64
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Fail when no scene produced captions
    pub fn into_non_empty(self) -> Result<Self, SyncError> {
        if self.captions.is_empty() {
            return Err(SyncError::NoCaptions {
                skipped: self.skipped.len(),
            });
        }
        Ok(self)
    }
}

/// Scenes ready for allocation plus those that failed before it
#[derive(Debug, Clone, Default)]
pub struct PreparedScenes {
    pub scenes: Vec<SceneNarration>,
    pub skipped: Vec<SkippedScene>,
}

/// Speech rate band and scene spacing
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub min_chars_per_second: f64,
    pub max_chars_per_second: f64,
    pub inter_scene_gap: f64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            min_chars_per_second: DEFAULT_MIN_CHARS_PER_SECOND,
            max_chars_per_second: DEFAULT_MAX_CHARS_PER_SECOND,
            inter_scene_gap: DEFAULT_INTER_SCENE_GAP,
        }
    }
}

/// One scene after the local allocation pass
struct AllocatedScene {
    scene_index: usize,
    audio_duration_seconds: f64,
    chars_per_second: f64,
    segments: Vec<TimedSegment>,
}

/// Builds the global caption timeline of a script
#[derive(Debug, Clone)]
pub struct ScriptSynchronizer {
    allocator: TimingAllocator,
    settings: SyncSettings,
    // @field: Reading speed used when it cannot be derived from the audio
    fallback_chars_per_second: f64,
}

impl ScriptSynchronizer {
    /// Synchronizer pacing captions with the duration bounds and reading speed of `style`
    pub fn new(style: &SubtitleStyle, settings: SyncSettings) -> Self {
        Self {
            allocator: TimingAllocator::new(style.min_duration, style.max_duration),
            settings,
            fallback_chars_per_second: style.chars_per_second,
        }
    }

    pub fn with_pauses(mut self, pauses: PunctuationPauses) -> Self {
        self.allocator = self.allocator.with_pauses(pauses);
        self
    }

    pub fn with_clamp_policy(mut self, clamp_policy: ClampPolicy) -> Self {
        self.allocator = self.allocator.with_clamp_policy(clamp_policy);
        self
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Characters per second actually spoken in a clip, kept within the readable band
    pub fn calculate_speech_rate(&self, text: &str, audio_duration_seconds: f64) -> f64 {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() || audio_duration_seconds.is_nan() || audio_duration_seconds <= 0.0 {
            return self.fallback_chars_per_second;
        }

        let rate = normalized.chars().count() as f64 / audio_duration_seconds;
        rate.clamp(self.settings.min_chars_per_second, self.settings.max_chars_per_second)
    }

    fn allocate_scene(&self, scene: &SceneNarration) -> Result<AllocatedScene, SkippedScene> {
        let text = scene.text.trim();
        if text.is_empty() {
            return Err(SkippedScene {
                scene_index: scene.scene_index,
                reason: SkipReason::EmptyText,
            });
        }
        if !(scene.audio_duration_seconds.is_finite() && scene.audio_duration_seconds > 0.0) {
            return Err(SkippedScene {
                scene_index: scene.scene_index,
                reason: SkipReason::InvalidDuration(scene.audio_duration_seconds),
            });
        }

        let chars_per_second = self.calculate_speech_rate(text, scene.audio_duration_seconds);
        let segments = self
            .allocator
            .allocate(text, scene.audio_duration_seconds, chars_per_second);

        Ok(AllocatedScene {
            scene_index: scene.scene_index,
            audio_duration_seconds: scene.audio_duration_seconds,
            chars_per_second,
            segments,
        })
    }

    /// Synchronize scenes whose audio has already been measured
    pub fn synchronize(&self, scenes: &[SceneNarration]) -> SyncReport {
        let mut report = SyncReport::default();

        // Pass 1: local timelines, no shared state between scenes
        let allocated: Vec<Result<AllocatedScene, SkippedScene>> =
            scenes.iter().map(|scene| self.allocate_scene(scene)).collect();

        // Pass 2: global offsets and numbering
        let last_synchronized = allocated.iter().rposition(Result::is_ok);
        let mut cursor = 0.0;
        for (position, result) in allocated.into_iter().enumerate() {
            let mut scene = match result {
                Ok(scene) => scene,
                Err(skipped) => {
                    warn!("Skipping scene {}: {}", skipped.scene_index, skipped.reason);
                    report.skipped.push(skipped);
                    continue;
                }
            };

            // Captions must be gone before the next scene's audio starts
            if Some(position) != last_synchronized {
                let window = scene.audio_duration_seconds + self.settings.inter_scene_gap;
                fit_within_window(&mut scene.segments, window, scene.scene_index);
            }

            let caption_count = scene.segments.len();
            for segment in scene.segments {
                report.captions.push(TimedCaption {
                    index: report.captions.len() + 1,
                    start_seconds: cursor + segment.start,
                    end_seconds: cursor + segment.end,
                    text: segment.text,
                    scene_index: Some(scene.scene_index),
                });
            }

            info!(
                "Scene {}: {} caption(s) over {:.2}s at {:.1} chars/s",
                scene.scene_index, caption_count, scene.audio_duration_seconds, scene.chars_per_second
            );

            report.scene_timings.push(SceneTiming {
                scene_index: scene.scene_index,
                offset_seconds: cursor,
                audio_duration_seconds: scene.audio_duration_seconds,
                caption_count,
                chars_per_second: scene.chars_per_second,
            });

            cursor += scene.audio_duration_seconds + self.settings.inter_scene_gap;
        }

        debug!(
            "Synchronized {} caption(s) from {} scene(s), {} skipped",
            report.captions.len(),
            report.scene_timings.len(),
            report.skipped.len()
        );

        report
    }

    /// Synchronize prepared scenes, reporting probe failures alongside allocation skips
    pub fn synchronize_prepared(&self, prepared: PreparedScenes) -> SyncReport {
        for skipped in &prepared.skipped {
            warn!("Skipping scene {}: {}", skipped.scene_index, skipped.reason);
        }

        let mut report = self.synchronize(&prepared.scenes);
        report.skipped.extend(prepared.skipped);
        report.skipped.sort_by_key(|s| s.scene_index);
        report
    }
}

/// Compress a scene's segments so the last one ends by `window`
///
/// Minimum-duration clamping can push a scene past its slot. Segments stay
/// contiguous and keep their relative lengths.
fn fit_within_window(segments: &mut [TimedSegment], window: f64, scene_index: usize) {
    let end = segments.last().map_or(0.0, |s| s.end);
    if end <= window || window <= 0.0 {
        return;
    }

    let factor = window / end;
    debug!(
        "Scene {}: captions end at {:.2}s past the {:.2}s slot, compressing by {:.3}",
        scene_index, end, window, factor
    );
    for segment in segments.iter_mut() {
        segment.start *= factor;
        segment.end *= factor;
        segment.duration = segment.end - segment.start;
    }
    if let Some(last) = segments.last_mut() {
        last.end = window;
        last.duration = last.end - last.start;
    }
}

/// Measure the audio of every scene
///
/// Probes run concurrently, at most `concurrency` at a time, each bounded by
/// `timeout`. Results keep the script order. A failed probe skips its scene;
/// nothing is retried. `on_probed` is called once per finished probe.
pub async fn prepare_scenes(
    script: &Script,
    audio_files: &[PathBuf],
    probe: &dyn AudioProbe,
    timeout: Duration,
    concurrency: usize,
    on_probed: &(dyn Fn() + Send + Sync),
) -> PreparedScenes {
    if script.len() != audio_files.len() {
        warn!(
            "Script has {} scene(s) but {} audio file(s) were given, using the first {}",
            script.len(),
            audio_files.len(),
            script.len().min(audio_files.len())
        );
    }

    let jobs: Vec<(usize, String, &PathBuf)> = script
        .narrations()
        .into_iter()
        .zip(audio_files.iter())
        .enumerate()
        .map(|(i, (text, path))| (i + 1, text, path))
        .collect();

    let results: Vec<Result<SceneNarration, SkippedScene>> = stream::iter(jobs)
        .map(move |(scene_index, text, path)| async move {
            let measured = match tokio::time::timeout(timeout, probe.duration_seconds(path)).await {
                Ok(result) => result,
                Err(_) => Err(ProbeError::Timeout {
                    path: path.clone(),
                    secs: timeout.as_secs(),
                }),
            };
            on_probed();

            match measured {
                Ok(duration) => Ok(SceneNarration::new(scene_index, text, duration)),
                Err(e) => Err(SkippedScene {
                    scene_index,
                    reason: SkipReason::AudioUnavailable(e.to_string()),
                }),
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut prepared = PreparedScenes::default();
    for result in results {
        match result {
            Ok(scene) => prepared.scenes.push(scene),
            Err(skipped) => prepared.skipped.push(skipped),
        }
    }
    prepared
}
