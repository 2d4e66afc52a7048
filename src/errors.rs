/*!
 * Error types for the narrasync application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when a textual timestamp cannot be parsed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimecodeError {
    /// Input is not a valid `HH:MM:SS,mmm` timestamp
    #[error("Malformed SRT timestamp: '{0}'")]
    MalformedSrt(String),

    /// Input is not a valid `H:MM:SS.CC` timestamp
    #[error("Malformed ASS timestamp: '{0}'")]
    MalformedAss(String),
}

/// Errors that can occur while measuring an audio clip
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The audio file does not exist
    #[error("Audio file not found: {0}")]
    NotFound(PathBuf),

    /// The probe command could not be run or exited with an error
    #[error("Audio probe failed: {0}")]
    CommandFailed(String),

    /// The probe did not answer in time
    #[error("Audio probe timed out after {secs}s for {path}")]
    Timeout {
        /// Audio file being probed
        path: PathBuf,
        /// Timeout that elapsed
        secs: u64,
    },

    /// The probe answered with something that is not a duration
    #[error("Invalid probe output: {0}")]
    InvalidOutput(String),
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// SRT content could not be parsed into captions
    #[error("Failed to parse subtitles: {0}")]
    Parse(String),
}

/// Errors that abort a whole synchronization run
#[derive(Error, Debug)]
pub enum SyncError {
    /// The script could not be read or decoded
    #[error("Failed to load script: {0}")]
    ScriptLoad(String),

    /// Every scene was skipped, so there is nothing to write
    #[error("No captions were produced ({skipped} scene(s) skipped)")]
    NoCaptions {
        /// Number of skipped scenes
        skipped: usize,
    },
}
