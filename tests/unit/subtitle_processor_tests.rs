/*!
 * Tests for subtitle processing functionality
 */

use std::fmt::Write;

use anyhow::Result;
use narrasync::errors::SubtitleError;
use narrasync::styles::SubtitleStyle;
use narrasync::subtitle_processor::{CaptionTrack, TimedCaption};
use crate::common;

/// Test caption display formatting
#[test]
fn test_timed_caption_display_withValidCaption_shouldFormatSrtBlock() {
    let caption = TimedCaption::new(3, 1.5, 4.25, "Test subtitle");
    let mut output = String::new();
    write!(output, "{}", caption).unwrap();

    assert_eq!(output, "3\n00:00:01,500 --> 00:00:04,250\nTest subtitle\n\n");
}

/// Test caption validation
#[test]
fn test_new_validated_withInvalidCaptions_shouldFail() {
    assert!(TimedCaption::new_validated(1, 2.0, 2.0, "text").is_err());
    assert!(TimedCaption::new_validated(1, 3.0, 2.0, "text").is_err());
    assert!(TimedCaption::new_validated(1, 0.0, 2.0, "   ").is_err());

    let caption = TimedCaption::new_validated(1, 0.0, 2.0, "  padded  ").unwrap();
    assert_eq!(caption.text, "padded");
    assert_eq!(caption.duration(), 2.0);
}

/// Test SRT rendering of a track
#[test]
fn test_to_srt_string_withTwoCaptions_shouldSeparateBlocks() {
    let track = CaptionTrack::new(vec![
        TimedCaption::new(1, 0.0, 1.0, "First"),
        TimedCaption::new(2, 1.0, 2.5, "Second\nline"),
    ]);

    let srt = track.to_srt_string();
    assert_eq!(
        srt,
        "1\n00:00:00,000 --> 00:00:01,000\nFirst\n\n2\n00:00:01,000 --> 00:00:02,500\nSecond\nline\n\n"
    );
    assert_eq!(track.to_string(), srt);
}

/// Test parsing a well-formed SRT file
#[test]
fn test_parse_srt_file_withValidFile_shouldReadAllEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "test.srt")?;

    let track = CaptionTrack::parse_srt_file(&path)?;
    assert_eq!(track.len(), 3);
    assert_eq!(track.captions[0].start_seconds, 1.0);
    assert_eq!(track.captions[1].text, "It contains multiple entries.");
    assert_eq!(track.captions[2].end_seconds, 14.0);
    Ok(())
}

/// Test parsing with CRLF line endings, a BOM and a missing counter
#[test]
fn test_parse_srt_string_withWindowsLineEndings_shouldParse() -> Result<()> {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n\r\n00:00:03,000 --> 00:00:04,000\r\nWorld\r\n";
    let track = CaptionTrack::parse_srt_string(content)?;

    assert_eq!(track.len(), 2);
    assert_eq!(track.captions[1].index, 2);
    assert_eq!(track.captions[1].text, "World");
    Ok(())
}

/// Test that broken blocks are skipped and the rest renumbered by start time
#[test]
fn test_parse_srt_string_withBrokenAndUnorderedBlocks_shouldSkipAndSort() -> Result<()> {
    let content = "1\n00:00:05,000 --> 00:00:06,000\nLate\n\n2\nnot a timing line\nBroken\n\n3\n00:00:01,000 --> 00:00:02,000\nEarly\n\n4\n00:00:04,000 --> 00:00:03,000\nInverted\n";
    let track = CaptionTrack::parse_srt_string(content)?;

    assert_eq!(track.len(), 2);
    assert_eq!(track.captions[0].text, "Early");
    assert_eq!(track.captions[0].index, 1);
    assert_eq!(track.captions[1].text, "Late");
    assert_eq!(track.captions[1].index, 2);
    Ok(())
}

/// Test parsing content without any valid entry
#[test]
fn test_parse_srt_string_withNoValidEntries_shouldFail() {
    let result = CaptionTrack::parse_srt_string("just some text\nwithout timing");
    assert!(matches!(result, Err(SubtitleError::Parse(_))));
}

/// Test writing and reading back an SRT file
#[test]
fn test_write_to_srt_thenParse_shouldPreserveCaptions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("out.srt");
    let track = CaptionTrack::new(vec![
        TimedCaption::new(1, 0.0, 1.234, "One"),
        TimedCaption::new(2, 1.234, 3.5, "Two"),
    ]);

    track.write_to_srt(&path)?;
    let parsed = CaptionTrack::parse_srt_file(&path)?;

    assert_eq!(parsed, track);
    Ok(())
}

/// Test word-by-word splitting
#[test]
fn test_split_into_words_withCaption_shouldShareDurationEqually() {
    let track = CaptionTrack::new(vec![
        TimedCaption::new(1, 0.0, 3.0, "one two three"),
        TimedCaption::new(2, 3.0, 4.0, "four"),
    ]);
    let words = track.split_into_words();

    assert_eq!(words.len(), 4);
    assert_eq!(words.captions[1].text, "two");
    common::assert_close(words.captions[1].start_seconds, 1.0);
    common::assert_close(words.captions[1].end_seconds, 2.0);
    assert_eq!(words.captions[2].end_seconds, 3.0);
    assert_eq!(words.captions[3].index, 4);
}

/// Test wrapping captions to a style
#[test]
fn test_wrap_for_style_withNarrowStyle_shouldInsertLineBreaks() {
    let style = SubtitleStyle {
        max_chars_per_line: 10,
        max_lines: 2,
        ..SubtitleStyle::default()
    };
    let track = CaptionTrack::new(vec![TimedCaption::new(1, 0.0, 2.0, "hello there my friend")]);
    let wrapped = track.wrap_for_style(&style);

    assert_eq!(wrapped.captions[0].text, "hello\nthere my");
    assert_eq!(wrapped.captions[0].start_seconds, 0.0);
}
