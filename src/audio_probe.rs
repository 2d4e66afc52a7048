/*!
 * Audio duration probing.
 *
 * The synchronizer only needs one property of a rendered narration clip:
 * its length in seconds. This module measures it either with `ffprobe` or,
 * for pipelines running in test mode, by reading a mock audio file.
 *
 * A mock audio file is a plain text file whose first line is
 * `MOCK AUDIO FILE`, followed by either a `Duration: 3.5s` line or a JSON
 * line with a `duration_seconds` field.
 */

use async_trait::async_trait;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::errors::ProbeError;

// @const: First line of a mock audio file
pub const MOCK_AUDIO_MARKER: &str = "MOCK AUDIO FILE";

// @const: Longest first line read when looking for the mock marker
const MOCK_HEAD_LIMIT: u64 = 64;

// @const: Largest mock audio file body that is read
const MOCK_BODY_LIMIT: u64 = 64 * 1024;

// @const: Default time allowed for a single ffprobe call
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

static MOCK_DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*duration:\s*([0-9]+(?:\.[0-9]+)?)\s*s?\s*$").unwrap()
});

/// Common trait for anything that can measure an audio clip
#[async_trait]
pub trait AudioProbe: Send + Sync + Debug {
    /// Duration of the audio at `path` in seconds
    async fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// Extract the duration from the content of a mock audio file
///
/// Returns `None` when the content is not a mock file or carries no duration.
pub fn parse_mock_audio(content: &str) -> Option<f64> {
    let mut lines = content.lines();
    if lines.next()?.trim() != MOCK_AUDIO_MARKER {
        return None;
    }

    for line in lines {
        if let Some(caps) = MOCK_DURATION_REGEX.captures(line) {
            if let Ok(duration) = caps[1].parse::<f64>() {
                return Some(duration);
            }
        }

        if line.contains("duration_seconds") {
            let duration = serde_json::from_str::<Value>(line.trim())
                .ok()
                .and_then(|json| json.get("duration_seconds").and_then(Value::as_f64));
            if duration.is_some() {
                return duration;
            }
        }
    }

    None
}

/// Reads durations from mock audio files only
#[derive(Debug, Default, Clone)]
pub struct MockAudioProbe;

#[async_trait]
impl AudioProbe for MockAudioProbe {
    async fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::NotFound(path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ProbeError::CommandFailed(format!("Failed to read {}: {}", path.display(), e)))?;

        parse_mock_audio(&content)
            .ok_or_else(|| ProbeError::InvalidOutput(format!("{} is not a mock audio file with a duration", path.display())))
    }
}

/// Measures real audio files with `ffprobe`
#[derive(Debug, Clone)]
pub struct FfprobeAudioProbe {
    // @field: Upper bound for one ffprobe call
    timeout: Duration,
}

impl FfprobeAudioProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Parse the single number ffprobe prints with `nokey=1`
    pub fn parse_output(stdout: &str) -> Result<f64, ProbeError> {
        let trimmed = stdout.trim();
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .ok_or_else(|| ProbeError::InvalidOutput(format!("'{}' is not a duration", trimmed)))
    }
}

impl Default for FfprobeAudioProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS))
    }
}

#[async_trait]
impl AudioProbe for FfprobeAudioProbe {
    async fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::NotFound(path.to_path_buf()));
        }

        let ffprobe_future = Command::new("ffprobe")
            .args([
                "-v", "error",
                "-show_entries", "format=duration",
                "-of", "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = ffprobe_future => {
                result.map_err(|e| ProbeError::CommandFailed(format!("Failed to execute ffprobe: {}", e)))?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ProbeError::Timeout {
                    path: path.to_path_buf(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffprobe failed for {}: {}", path.display(), stderr.trim());
            return Err(ProbeError::CommandFailed(stderr.trim().to_string()));
        }

        let duration = Self::parse_output(&String::from_utf8_lossy(&output.stdout))?;
        debug!("ffprobe measured {:.3}s for {}", duration, path.display());
        Ok(duration)
    }
}

/// Mock audio files first, `ffprobe` for everything else
#[derive(Debug, Clone, Default)]
pub struct DefaultAudioProbe {
    ffprobe: FfprobeAudioProbe,
}

impl DefaultAudioProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            ffprobe: FfprobeAudioProbe::new(timeout),
        }
    }

    /// Read the head of a file and return its mock duration, if it is one
    async fn mock_duration(path: &Path) -> Option<f64> {
        let file = File::open(path).await.ok()?;
        let mut head_reader = BufReader::new(file).take(MOCK_HEAD_LIMIT);

        // real audio is binary and fails UTF-8 decoding here
        let mut head = String::new();
        head_reader.read_line(&mut head).await.ok()?;
        if head.trim() != MOCK_AUDIO_MARKER {
            return None;
        }

        let mut body = Vec::new();
        head_reader
            .into_inner()
            .take(MOCK_BODY_LIMIT)
            .read_to_end(&mut body)
            .await
            .ok()?;
        head.push_str(&String::from_utf8_lossy(&body));
        parse_mock_audio(&head)
    }
}

#[async_trait]
impl AudioProbe for DefaultAudioProbe {
    async fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::NotFound(path.to_path_buf()));
        }

        if let Some(duration) = Self::mock_duration(path).await {
            debug!("Mock audio {} lasts {:.3}s", path.display(), duration);
            return Ok(duration);
        }

        self.ffprobe.duration_seconds(path).await
    }
}
