/*!
 * Sentence timing allocation.
 *
 * Given a narration block and the measured length of its audio, split the
 * text into sentences, estimate how long each one takes to say (characters
 * over reading speed, plus pauses for punctuation) and rescale the estimates
 * so that they fill the measured duration.
 *
 * Every segment is then clamped to the caption duration bounds. With the
 * default `ClampPolicy::PerCaption` the clamped durations are not rebalanced,
 * so a scene's captions can end slightly before or after its audio.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SENTENCE_BOUNDARY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s*").unwrap());

// @const: Reading speed used when the caller passes an unusable one
pub const DEFAULT_CHARS_PER_SECOND: f64 = 17.0;

/// Extra seconds of speech attributed to each punctuation mark
///
/// An ellipsis counts both as `...` and as three periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunctuationPauses {
    pub period: f64,
    pub exclamation: f64,
    pub question: f64,
    pub comma: f64,
    pub semicolon: f64,
    pub colon: f64,
    pub dash: f64,
    pub ellipsis: f64,
}

impl Default for PunctuationPauses {
    fn default() -> Self {
        Self {
            period: 0.3,
            exclamation: 0.25,
            question: 0.25,
            comma: 0.1,
            semicolon: 0.2,
            colon: 0.2,
            dash: 0.15,
            ellipsis: 0.4,
        }
    }
}

impl PunctuationPauses {
    /// Total pause time for every punctuation occurrence in `text`
    pub fn pause_for(&self, text: &str) -> f64 {
        let table = [
            (".", self.period),
            ("!", self.exclamation),
            ("?", self.question),
            (",", self.comma),
            (";", self.semicolon),
            (":", self.colon),
            ("-", self.dash),
            ("...", self.ellipsis),
        ];
        table
            .iter()
            .map(|(mark, pause)| text.matches(mark).count() as f64 * pause)
            .sum()
    }
}

/// What to do with the duration lost or gained by clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClampPolicy {
    /// Clamp each caption independently and accept drift from the measured total
    #[default]
    PerCaption,
    /// Redistribute the clamp slack across the captions that were not clamped
    Renormalize,
}

/// One locally timed sentence of a scene
#[derive(Debug, Clone, PartialEq)]
pub struct TimedSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

/// Distributes a known total duration over the sentences of a text
#[derive(Debug, Clone)]
pub struct TimingAllocator {
    pauses: PunctuationPauses,
    min_duration: f64,
    max_duration: f64,
    clamp_policy: ClampPolicy,
}

impl TimingAllocator {
    pub fn new(min_duration: f64, max_duration: f64) -> Self {
        Self {
            pauses: PunctuationPauses::default(),
            min_duration,
            max_duration: max_duration.max(min_duration),
            clamp_policy: ClampPolicy::default(),
        }
    }

    pub fn with_pauses(mut self, pauses: PunctuationPauses) -> Self {
        self.pauses = pauses;
        self
    }

    pub fn with_clamp_policy(mut self, clamp_policy: ClampPolicy) -> Self {
        self.clamp_policy = clamp_policy;
        self
    }

    pub fn min_duration(&self) -> f64 {
        self.min_duration
    }

    pub fn max_duration(&self) -> f64 {
        self.max_duration
    }

    pub fn pauses(&self) -> &PunctuationPauses {
        &self.pauses
    }

    /// Split on runs of `.`, `!` or `?`, keeping the terminators with their sentence
    ///
    /// Fragments with no text before the terminator are dropped.
    pub fn split_sentences(text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut last = 0;

        for boundary in SENTENCE_BOUNDARY_REGEX.find_iter(text) {
            if !text[last..boundary.start()].trim().is_empty() {
                sentences.push(text[last..boundary.end()].trim().to_string());
            }
            last = boundary.end();
        }

        let rest = text[last..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }

        sentences
    }

    /// Seconds a sentence would take before rescaling
    pub fn base_duration(&self, sentence: &str, reading_speed: f64) -> f64 {
        sentence.chars().count() as f64 / reading_speed + self.pauses.pause_for(sentence)
    }

    /// A single segment covering the whole duration
    fn whole_span(text: &str, total_duration: f64) -> Vec<TimedSegment> {
        vec![TimedSegment {
            text: text.trim().to_string(),
            start: 0.0,
            end: total_duration,
            duration: total_duration,
        }]
    }

    /// Time each sentence of `text` so the segments fill `total_duration`
    ///
    /// `total_duration` must be positive; callers validate it beforehand.
    pub fn allocate(&self, text: &str, total_duration: f64, reading_speed: f64) -> Vec<TimedSegment> {
        let sentences = Self::split_sentences(text);

        // A lone sentence owns the whole clip
        if sentences.len() <= 1 {
            return Self::whole_span(sentences.first().map_or(text, String::as_str), total_duration);
        }

        let reading_speed = if reading_speed.is_finite() && reading_speed > 0.0 {
            reading_speed
        } else {
            warn!("Unusable reading speed {}, using {} chars/s", reading_speed, DEFAULT_CHARS_PER_SECOND);
            DEFAULT_CHARS_PER_SECOND
        };

        let base: Vec<f64> = sentences
            .iter()
            .map(|s| self.base_duration(s, reading_speed))
            .collect();
        let total_base: f64 = base.iter().sum();

        if total_base <= 0.0 {
            return Self::whole_span(text, total_duration);
        }

        let scale = total_duration / total_base;
        let scaled: Vec<f64> = base.iter().map(|d| d * scale).collect();
        let durations = match self.clamp_policy {
            ClampPolicy::PerCaption => scaled.iter().map(|d| self.clamp(*d)).collect(),
            ClampPolicy::Renormalize => self.clamp_and_renormalize(scaled, total_duration),
        };

        let mut segments = Vec::with_capacity(sentences.len());
        let mut cursor = 0.0;
        for (sentence, duration) in sentences.into_iter().zip(durations) {
            let start = cursor;
            let end = start + duration;
            segments.push(TimedSegment {
                text: sentence,
                start,
                end,
                duration,
            });
            cursor = end;
        }

        debug!(
            "Allocated {} segments over {:.2}s (scale {:.3}, ends at {:.2}s)",
            segments.len(),
            total_duration,
            scale,
            cursor
        );

        segments
    }

    fn clamp(&self, duration: f64) -> f64 {
        duration.clamp(self.min_duration, self.max_duration)
    }

    /// Clamp, then spread the remaining time over the unclamped durations until stable
    fn clamp_and_renormalize(&self, mut durations: Vec<f64>, total_duration: f64) -> Vec<f64> {
        let mut fixed = vec![false; durations.len()];

        loop {
            let mut changed = false;
            for (duration, is_fixed) in durations.iter_mut().zip(fixed.iter_mut()) {
                if *is_fixed {
                    continue;
                }
                let clamped = self.clamp(*duration);
                if clamped != *duration {
                    *duration = clamped;
                    *is_fixed = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            let fixed_sum: f64 = durations.iter().zip(&fixed).filter(|(_, f)| **f).map(|(d, _)| d).sum();
            let free_sum: f64 = durations.iter().zip(&fixed).filter(|(_, f)| !**f).map(|(d, _)| d).sum();
            let remaining = total_duration - fixed_sum;
            if free_sum <= 0.0 || remaining <= 0.0 {
                break;
            }

            let factor = remaining / free_sum;
            for (duration, is_fixed) in durations.iter_mut().zip(&fixed) {
                if !*is_fixed {
                    *duration *= factor;
                }
            }
        }

        // anything still outside the bounds is infeasible to rebalance
        durations.into_iter().map(|d| self.clamp(d)).collect()
    }
}

impl Default for TimingAllocator {
    fn default() -> Self {
        Self::new(1.0, 6.0)
    }
}
