/*!
 * Timeline validation for timed captions.
 *
 * This module checks that a caption timeline is:
 * - Logically consistent (start < end, non-empty text)
 * - Within duration and reading speed limits
 * - Ordered, with strictly increasing starts and no overlaps
 * - Numbered 1..N without gaps
 */

use log::debug;

use crate::subtitle_processor::TimedCaption;

/// Maximum characters per second for readable subtitles
const DEFAULT_MAX_CPS: f64 = 25.0;

/// Minimum duration for a caption in seconds
const MIN_CAPTION_DURATION: f64 = 0.5;

/// Maximum duration for a single caption in seconds
const MAX_CAPTION_DURATION: f64 = 30.0;

/// Float slack when comparing caption boundaries
const TIME_EPSILON: f64 = 1e-9;

/// Result of validating a single caption
#[derive(Debug, Clone)]
pub struct CaptionCheckResult {
    /// Index of the caption
    pub index: usize,
    /// Whether the caption passed validation
    pub passed: bool,
    /// Issues found
    pub issues: Vec<TimelineIssue>,
}

impl CaptionCheckResult {
    pub fn passed(index: usize) -> Self {
        Self {
            index,
            passed: true,
            issues: vec![],
        }
    }

    pub fn failed(index: usize, issues: Vec<TimelineIssue>) -> Self {
        Self {
            index,
            passed: false,
            issues,
        }
    }
}

/// Types of timeline issues
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineIssue {
    /// End is not after start
    InvalidTimeRange { start: f64, end: f64 },
    /// Caption has no text
    EmptyText,
    /// Duration is too short
    DurationTooShort { duration: f64, min_duration: f64 },
    /// Duration is too long
    DurationTooLong { duration: f64, max_duration: f64 },
    /// Reading speed exceeds limit
    ReadingSpeedTooHigh { cps: f64, max_cps: f64 },
    /// Starts before the previous caption ends
    OverlapsWithCaption { other_index: usize, overlap: f64 },
    /// Does not start after the previous caption
    StartNotIncreasing { previous_index: usize },
    /// Index breaks the 1..N sequence
    NumberingGap { expected: usize, found: usize },
}

impl std::fmt::Display for TimelineIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimelineIssue::InvalidTimeRange { start, end } => {
                write!(f, "Invalid time range: start {:.3}s >= end {:.3}s", start, end)
            }
            TimelineIssue::EmptyText => write!(f, "Empty caption text"),
            TimelineIssue::DurationTooShort { duration, min_duration } => {
                write!(f, "Duration too short: {:.3}s (min: {:.3}s)", duration, min_duration)
            }
            TimelineIssue::DurationTooLong { duration, max_duration } => {
                write!(f, "Duration too long: {:.3}s (max: {:.3}s)", duration, max_duration)
            }
            TimelineIssue::ReadingSpeedTooHigh { cps, max_cps } => {
                write!(f, "Reading speed too high: {:.1} CPS (max: {:.1})", cps, max_cps)
            }
            TimelineIssue::OverlapsWithCaption { other_index, overlap } => {
                write!(f, "Overlaps with caption {} by {:.3}s", other_index, overlap)
            }
            TimelineIssue::StartNotIncreasing { previous_index } => {
                write!(f, "Does not start after caption {}", previous_index)
            }
            TimelineIssue::NumberingGap { expected, found } => {
                write!(f, "Expected caption number {}, found {}", expected, found)
            }
        }
    }
}

/// Result of validating a whole timeline
#[derive(Debug, Clone)]
pub struct TimelineValidationResult {
    /// Overall pass/fail status
    pub passed: bool,
    /// Results for each caption, in timeline order
    pub caption_results: Vec<CaptionCheckResult>,
    /// Total number of issues
    pub total_issues: usize,
    /// Number of overlapping caption pairs
    pub overlap_count: usize,
}

impl TimelineValidationResult {
    pub fn failed_captions(&self) -> Vec<&CaptionCheckResult> {
        self.caption_results.iter().filter(|r| !r.passed).collect()
    }

    /// Whether any ordering or numbering rule is broken
    pub fn has_ordering_issues(&self) -> bool {
        self.caption_results.iter().flat_map(|r| &r.issues).any(|issue| {
            matches!(
                issue,
                TimelineIssue::OverlapsWithCaption { .. }
                    | TimelineIssue::StartNotIncreasing { .. }
                    | TimelineIssue::NumberingGap { .. }
            )
        })
    }
}

/// Configuration for timeline validation
#[derive(Debug, Clone)]
pub struct TimelineValidatorConfig {
    /// Maximum characters per second
    pub max_cps: f64,
    /// Minimum caption duration in seconds
    pub min_duration: f64,
    /// Maximum caption duration in seconds
    pub max_duration: f64,
    /// Whether to check overlaps and start ordering
    pub check_ordering: bool,
    /// Whether to check 1..N numbering
    pub check_numbering: bool,
}

impl Default for TimelineValidatorConfig {
    fn default() -> Self {
        Self {
            max_cps: DEFAULT_MAX_CPS,
            min_duration: MIN_CAPTION_DURATION,
            max_duration: MAX_CAPTION_DURATION,
            check_ordering: true,
            check_numbering: true,
        }
    }
}

/// Validator for caption timelines
pub struct TimelineValidator {
    config: TimelineValidatorConfig,
}

impl TimelineValidator {
    pub fn new() -> Self {
        Self {
            config: TimelineValidatorConfig::default(),
        }
    }

    pub fn with_config(config: TimelineValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a single caption in isolation
    pub fn validate_caption(&self, caption: &TimedCaption) -> CaptionCheckResult {
        let mut issues = Vec::new();

        if caption.text.trim().is_empty() {
            issues.push(TimelineIssue::EmptyText);
        }

        if caption.end_seconds <= caption.start_seconds {
            issues.push(TimelineIssue::InvalidTimeRange {
                start: caption.start_seconds,
                end: caption.end_seconds,
            });
            // Can't do further validation with invalid times
            return CaptionCheckResult::failed(caption.index, issues);
        }

        let duration = caption.duration();

        if duration + TIME_EPSILON < self.config.min_duration {
            issues.push(TimelineIssue::DurationTooShort {
                duration,
                min_duration: self.config.min_duration,
            });
        }

        if duration > self.config.max_duration + TIME_EPSILON {
            issues.push(TimelineIssue::DurationTooLong {
                duration,
                max_duration: self.config.max_duration,
            });
        }

        let cps = Self::calculate_cps(caption);
        if cps > self.config.max_cps {
            issues.push(TimelineIssue::ReadingSpeedTooHigh {
                cps,
                max_cps: self.config.max_cps,
            });
        }

        if issues.is_empty() {
            CaptionCheckResult::passed(caption.index)
        } else {
            CaptionCheckResult::failed(caption.index, issues)
        }
    }

    /// Validate a timeline in emission order
    pub fn validate_timeline(&self, captions: &[TimedCaption]) -> TimelineValidationResult {
        let mut caption_results: Vec<CaptionCheckResult> =
            captions.iter().map(|c| self.validate_caption(c)).collect();

        let mut overlap_count = 0;

        if self.config.check_numbering {
            for (i, (caption, result)) in captions.iter().zip(caption_results.iter_mut()).enumerate() {
                if caption.index != i + 1 {
                    result.issues.push(TimelineIssue::NumberingGap {
                        expected: i + 1,
                        found: caption.index,
                    });
                    result.passed = false;
                }
            }
        }

        if self.config.check_ordering {
            for i in 1..captions.len() {
                let previous = &captions[i - 1];
                let current = &captions[i];
                let result = &mut caption_results[i];

                if current.start_seconds <= previous.start_seconds {
                    result.issues.push(TimelineIssue::StartNotIncreasing {
                        previous_index: previous.index,
                    });
                    result.passed = false;
                }

                let overlap = previous.end_seconds - current.start_seconds;
                if overlap > TIME_EPSILON {
                    overlap_count += 1;
                    result.issues.push(TimelineIssue::OverlapsWithCaption {
                        other_index: previous.index,
                        overlap,
                    });
                    result.passed = false;
                }
            }
        }

        let total_issues: usize = caption_results.iter().map(|r| r.issues.len()).sum();
        let passed = caption_results.iter().all(|r| r.passed);

        debug!(
            "Timeline validation: {} captions, {} issues, {} overlaps",
            captions.len(),
            total_issues,
            overlap_count
        );

        TimelineValidationResult {
            passed,
            caption_results,
            total_issues,
            overlap_count,
        }
    }

    /// Characters per second of a caption, ignoring line breaks
    pub fn calculate_cps(caption: &TimedCaption) -> f64 {
        let duration = caption.duration();
        if duration <= 0.0 {
            return f64::INFINITY;
        }
        caption.text.chars().filter(|c| *c != '\n').count() as f64 / duration
    }
}

impl Default for TimelineValidator {
    fn default() -> Self {
        Self::new()
    }
}
