use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::styles::{self, SubtitleStyle};
use crate::timecode;

// @module: Timed captions, SRT serialization and parsing

// @const: SRT timing line
static TIMING_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+)\s*-->\s*(\S+)").unwrap()
});

// @struct: Single timed caption
#[derive(Debug, Clone, PartialEq)]
pub struct TimedCaption {
    // @field: 1-based position in the document
    pub index: usize,

    // @field: Start time in seconds
    pub start_seconds: f64,

    // @field: End time in seconds
    pub end_seconds: f64,

    // @field: Caption text, may hold embedded newlines once wrapped
    pub text: String,

    // @field: Scene the caption was allocated from, if any
    pub scene_index: Option<usize>,
}

impl TimedCaption {
    pub fn new(index: usize, start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        TimedCaption {
            index,
            start_seconds,
            end_seconds,
            text: text.into(),
            scene_index: None,
        }
    }

    // @creates: Validated caption
    // @validates: Time range and non-empty text
    pub fn new_validated(index: usize, start_seconds: f64, end_seconds: f64, text: &str) -> Result<Self, SubtitleError> {
        if end_seconds <= start_seconds {
            return Err(SubtitleError::Parse(format!(
                "Invalid time range for caption {}: end {} <= start {}",
                index, end_seconds, start_seconds
            )));
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SubtitleError::Parse(format!("Empty text for caption {}", index)));
        }

        Ok(Self::new(index, start_seconds, end_seconds, trimmed))
    }

    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    pub fn format_start_time(&self) -> String {
        timecode::seconds_to_srt(self.start_seconds)
    }

    pub fn format_end_time(&self) -> String {
        timecode::seconds_to_srt(self.end_seconds)
    }
}

impl fmt::Display for TimedCaption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered captions of one subtitle document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionTrack {
    pub captions: Vec<TimedCaption>,
}

impl CaptionTrack {
    pub fn new(captions: Vec<TimedCaption>) -> Self {
        CaptionTrack { captions }
    }

    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Renumber captions 1..N in their current order
    pub fn renumber(&mut self) {
        for (i, caption) in self.captions.iter_mut().enumerate() {
            caption.index = i + 1;
        }
    }

    /// Render the whole track as SRT text
    pub fn to_srt_string(&self) -> String {
        self.captions.iter().map(|c| c.to_string()).collect()
    }

    /// Write the track to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        for caption in &self.captions {
            write!(file, "{}", caption)
                .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;
        }

        debug!("Wrote {} captions to {}", self.captions.len(), path.display());
        Ok(())
    }

    /// Parse an SRT file
    pub fn parse_srt_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        Self::parse_srt_string(&content)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))
    }

    /// Parse SRT text into a track sorted by start time and numbered 1..N
    ///
    /// Blocks with a bad timing line, an inverted range or no text are skipped.
    pub fn parse_srt_string(content: &str) -> Result<Self, SubtitleError> {
        let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
        let mut captions = Vec::new();

        for (block_number, block) in content.split("\n\n").enumerate() {
            let lines: Vec<&str> = block.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
            if lines.is_empty() {
                continue;
            }

            // The counter line is optional, the timing line is not
            let (index, timing_at) = match lines[0].parse::<usize>() {
                Ok(n) => (n, 1),
                Err(_) => (block_number + 1, 0),
            };

            let Some(caps) = lines.get(timing_at).and_then(|l| TIMING_LINE_REGEX.captures(l)) else {
                warn!("Skipping subtitle block {}: missing timing line", block_number + 1);
                continue;
            };

            let times = timecode::srt_to_seconds(&caps[1])
                .and_then(|start| timecode::srt_to_seconds(&caps[2]).map(|end| (start, end)));
            let (start, end) = match times {
                Ok(times) => times,
                Err(e) => {
                    warn!("Skipping subtitle block {}: {}", block_number + 1, e);
                    continue;
                }
            };

            let text = lines[timing_at + 1..].join("\n");
            match TimedCaption::new_validated(index, start, end, &text) {
                Ok(caption) => captions.push(caption),
                Err(e) => warn!("Skipping subtitle block {}: {}", block_number + 1, e),
            }
        }

        if captions.is_empty() {
            return Err(SubtitleError::Parse("No valid subtitle entries were found in the SRT content".to_string()));
        }

        captions.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));

        let overlap_count = captions
            .windows(2)
            .filter(|w| w[0].end_seconds > w[1].start_seconds)
            .count();
        if overlap_count > 0 {
            warn!("Found {} overlapping subtitle entries", overlap_count);
        }

        let mut track = CaptionTrack::new(captions);
        track.renumber();
        Ok(track)
    }

    /// One caption per word, each word getting an equal share of its caption's time
    pub fn split_into_words(&self) -> CaptionTrack {
        let mut words = Vec::new();

        for caption in &self.captions {
            let caption_words: Vec<&str> = caption.text.split_whitespace().collect();
            if caption_words.is_empty() {
                continue;
            }

            let step = caption.duration() / caption_words.len() as f64;
            for (i, word) in caption_words.iter().enumerate() {
                let start = caption.start_seconds + step * i as f64;
                // last word ends exactly where the caption did
                let end = if i + 1 == caption_words.len() {
                    caption.end_seconds
                } else {
                    start + step
                };
                words.push(TimedCaption {
                    index: 0,
                    start_seconds: start,
                    end_seconds: end,
                    text: (*word).to_string(),
                    scene_index: caption.scene_index,
                });
            }
        }

        let mut track = CaptionTrack::new(words);
        track.renumber();
        track
    }

    /// Pre-wrap every caption to the style's line width and line budget
    pub fn wrap_for_style(&self, style: &SubtitleStyle) -> CaptionTrack {
        let captions = self
            .captions
            .iter()
            .map(|caption| TimedCaption {
                text: styles::wrap_text(&caption.text, style),
                ..caption.clone()
            })
            .collect();
        CaptionTrack::new(captions)
    }

    /// End of the last caption
    pub fn total_duration(&self) -> f64 {
        self.captions.iter().map(|c| c.end_seconds).fold(0.0, f64::max)
    }
}

impl From<Vec<TimedCaption>> for CaptionTrack {
    fn from(captions: Vec<TimedCaption>) -> Self {
        CaptionTrack::new(captions)
    }
}

impl fmt::Display for CaptionTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_srt_string())
    }
}
