/*!
 * Common test utilities for the narrasync test suite
 */

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use narrasync::audio_probe::{AudioProbe, MOCK_AUDIO_MARKER};
use narrasync::errors::ProbeError;
use tempfile::TempDir;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
"#;
    create_test_file(dir, filename, content)
}

/// Writes a mock audio file announcing the given duration
pub fn write_mock_audio(dir: &Path, filename: &str, duration_seconds: f64) -> Result<PathBuf> {
    let content = format!("{}\nDuration: {}s\n", MOCK_AUDIO_MARKER, duration_seconds);
    create_test_file(dir, filename, &content)
}

/// Writes a script JSON file with one scene per narration
pub fn write_script(dir: &Path, filename: &str, narrations: &[&str]) -> Result<PathBuf> {
    let scenes: Vec<serde_json::Value> = narrations
        .iter()
        .map(|n| serde_json::json!({ "narration": n }))
        .collect();
    let content = serde_json::to_string_pretty(&serde_json::json!({ "scenes": scenes }))?;
    create_test_file(dir, filename, &content)
}

/// Audio probe answering from a fixed table keyed by file name
#[derive(Debug, Default)]
pub struct StaticAudioProbe {
    durations: HashMap<String, f64>,
}

impl StaticAudioProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, filename: &str, duration_seconds: f64) -> Self {
        self.durations.insert(filename.to_string(), duration_seconds);
        self
    }
}

#[async_trait]
impl AudioProbe for StaticAudioProbe {
    async fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.durations
            .get(&name)
            .copied()
            .ok_or_else(|| ProbeError::NotFound(path.to_path_buf()))
    }
}

/// Approximate float comparison for timeline values
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} but got {}",
        expected,
        actual
    );
}

/// Route library logs through env_logger; repeated calls are ignored
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
