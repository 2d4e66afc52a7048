/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;

use narrasync::errors::{ProbeError, SubtitleError, SyncError, TimecodeError};

#[test]
fn test_timecodeError_malformedSrt_shouldDisplayInput() {
    let error = TimecodeError::MalformedSrt("12:xx".to_string());
    assert_eq!(error.to_string(), "Malformed SRT timestamp: '12:xx'");
}

#[test]
fn test_probeError_timeout_shouldDisplayPathAndSeconds() {
    let error = ProbeError::Timeout {
        path: PathBuf::from("scene_01.mp3"),
        secs: 30,
    };
    let display = error.to_string();
    assert!(display.contains("30s"));
    assert!(display.contains("scene_01.mp3"));
}

#[test]
fn test_probeError_notFound_shouldDisplayPath() {
    let error = ProbeError::NotFound(PathBuf::from("missing.wav"));
    assert!(error.to_string().contains("missing.wav"));
}

#[test]
fn test_subtitleError_parse_shouldDisplayReason() {
    let error = SubtitleError::Parse("no valid captions found".to_string());
    assert_eq!(error.to_string(), "Failed to parse subtitles: no valid captions found");
}

#[test]
fn test_syncError_noCaptions_shouldDisplaySkippedCount() {
    let error = SyncError::NoCaptions { skipped: 3 };
    assert_eq!(error.to_string(), "No captions were produced (3 scene(s) skipped)");
}
