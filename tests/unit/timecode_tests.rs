/*!
 * Tests for timecode conversion
 */

use narrasync::timecode;

/// Test that SRT and ASS formatting agree on the same instant
#[test]
fn test_formatters_withSameInstant_shouldAgreeOnWholeSeconds() {
    let seconds = 3723.456;
    assert_eq!(timecode::seconds_to_srt(seconds), "01:02:03,456");
    assert_eq!(timecode::seconds_to_ass(seconds), "1:02:03.45");
}

/// Test that formatted SRT timestamps parse back to the same millisecond
#[test]
fn test_srt_round_trip_withQuantizedValues_shouldBeExact() {
    for millis in [0u64, 1, 999, 1_001, 59_999, 3_600_000, 86_399_999] {
        let seconds = millis as f64 / 1000.0;
        let formatted = timecode::seconds_to_srt(seconds);
        assert_eq!(timecode::srt_to_seconds(&formatted).unwrap(), seconds, "{}", formatted);
    }
}

/// Test that formatted ASS timestamps parse back to the same centisecond
#[test]
fn test_ass_round_trip_withQuantizedValues_shouldBeExact() {
    for centis in [0u64, 1, 99, 101, 5_999, 360_000] {
        let seconds = centis as f64 / 100.0;
        let formatted = timecode::seconds_to_ass(seconds);
        assert_eq!(timecode::ass_to_seconds(&formatted).unwrap(), seconds, "{}", formatted);
    }
}

/// Test error display for malformed timestamps
#[test]
fn test_timecode_error_display_shouldIncludeInput() {
    let error = timecode::ass_to_seconds("nope").unwrap_err();
    assert!(error.to_string().contains("nope"));
    assert!(error.to_string().contains("ASS"));
}
