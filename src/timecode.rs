/*!
 * Conversion between seconds and the two textual timestamp formats we emit.
 *
 * - SRT: `HH:MM:SS,mmm` (hours zero-padded, unbounded)
 * - ASS: `H:MM:SS.CC` (hours without padding, centiseconds)
 *
 * Formatting truncates to the target unit, it never rounds up.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TimecodeError;

// Absorbs binary representation error so that 1.001 formats as 1,001 and not 1,000
const QUANTUM_EPSILON: f64 = 1e-6;

static SRT_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})$").unwrap()
});

static ASS_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})\.(\d{1,2})$").unwrap()
});

/// Truncate a non-negative number of seconds to whole units (1000 = ms, 100 = cs)
fn truncate_to_units(seconds: f64, units_per_second: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * units_per_second + QUANTUM_EPSILON).floor() as u64
}

/// Split a unit count into (hours, minutes, seconds, remainder units)
fn split_units(total: u64, units_per_second: u64) -> (u64, u64, u64, u64) {
    let units_per_hour = 3600 * units_per_second;
    let units_per_minute = 60 * units_per_second;
    let hours = total / units_per_hour;
    let minutes = (total % units_per_hour) / units_per_minute;
    let secs = (total % units_per_minute) / units_per_second;
    let rest = total % units_per_second;
    (hours, minutes, secs, rest)
}

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`)
///
/// Negative and non-finite input formats as zero.
pub fn seconds_to_srt(seconds: f64) -> String {
    let (hours, minutes, secs, millis) = split_units(truncate_to_units(seconds, 1000.0), 1000);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Format seconds as an ASS timestamp (`H:MM:SS.CC`)
pub fn seconds_to_ass(seconds: f64) -> String {
    let (hours, minutes, secs, centis) = split_units(truncate_to_units(seconds, 100.0), 100);
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

/// Parse the captured groups of a timestamp into a count of sub-second units
fn captures_to_units(caps: &regex::Captures, units_per_second: u64) -> Option<u64> {
    let hours: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
    let secs: u64 = caps.get(3)?.as_str().parse().ok()?;
    let fraction: u64 = caps.get(4)?.as_str().parse().ok()?;

    if minutes >= 60 || secs >= 60 {
        return None;
    }

    let whole = hours.checked_mul(3600)?.checked_add(minutes * 60 + secs)?;
    whole.checked_mul(units_per_second)?.checked_add(fraction)
}

/// Parse an SRT timestamp into seconds
///
/// A `.` is accepted in place of the `,` millisecond separator.
pub fn srt_to_seconds(text: &str) -> Result<f64, TimecodeError> {
    let trimmed = text.trim();
    SRT_TIMESTAMP_REGEX
        .captures(trimmed)
        .and_then(|caps| captures_to_units(&caps, 1000))
        .map(|millis| millis as f64 / 1000.0)
        .ok_or_else(|| TimecodeError::MalformedSrt(trimmed.to_string()))
}

/// Parse an ASS timestamp into seconds
pub fn ass_to_seconds(text: &str) -> Result<f64, TimecodeError> {
    let trimmed = text.trim();
    ASS_TIMESTAMP_REGEX
        .captures(trimmed)
        .and_then(|caps| captures_to_units(&caps, 100))
        .map(|centis| centis as f64 / 100.0)
        .ok_or_else(|| TimecodeError::MalformedAss(trimmed.to_string()))
}

/// Parse an SRT timestamp, logging a warning and returning 0.0 when malformed
pub fn srt_to_seconds_or_zero(text: &str) -> f64 {
    srt_to_seconds(text).unwrap_or_else(|e| {
        warn!("{}, using 0.0", e);
        0.0
    })
}

/// Parse an ASS timestamp, logging a warning and returning 0.0 when malformed
pub fn ass_to_seconds_or_zero(text: &str) -> f64 {
    ass_to_seconds(text).unwrap_or_else(|e| {
        warn!("{}, using 0.0", e);
        0.0
    })
}
