/*!
 * Tests for sentence splitting and duration allocation
 */

use narrasync::allocator::{ClampPolicy, PunctuationPauses, TimingAllocator};
use crate::common::assert_close;

fn silent_pauses() -> PunctuationPauses {
    PunctuationPauses {
        period: 0.0,
        exclamation: 0.0,
        question: 0.0,
        comma: 0.0,
        semicolon: 0.0,
        colon: 0.0,
        dash: 0.0,
        ellipsis: 0.0,
    }
}

/// Test that durations follow sentence length when pauses are silent
#[test]
fn test_allocate_withSilentPauses_shouldSplitProportionallyToLength() {
    let allocator = TimingAllocator::new(1.0, 6.0).with_pauses(silent_pauses());
    let segments = allocator.allocate("Aaaa. Bbbbbbbbb.", 6.0, 10.0);

    assert_eq!(segments.len(), 2);
    assert_close(segments[0].duration, 2.0);
    assert_close(segments[1].duration, 4.0);
    assert_close(segments[1].start, segments[0].end);
    assert_close(segments[1].end, 6.0);
}

/// Test that punctuation pauses shift time towards punctuated sentences
#[test]
fn test_allocate_withPauses_shouldFavorPunctuatedSentence() {
    let comma_pauses = PunctuationPauses {
        comma: 1.0,
        ..silent_pauses()
    };
    let allocator = TimingAllocator::new(0.1, 60.0).with_pauses(comma_pauses);
    let segments = allocator.allocate("Well, well, well. Okay now.", 10.0, 15.0);

    let plain = TimingAllocator::new(0.1, 60.0)
        .with_pauses(silent_pauses())
        .allocate("Well, well, well. Okay now.", 10.0, 15.0);
    assert!(segments[0].duration > plain[0].duration);
}

/// Test the per-caption clamp policy on a short sentence
#[test]
fn test_allocate_withPerCaptionClamp_shouldDriftPastTotal() {
    let allocator = TimingAllocator::new(1.0, 6.0).with_pauses(silent_pauses());
    let segments = allocator.allocate(
        "Hi. This sentence is quite a bit longer than the first one.",
        5.0,
        10.0,
    );

    assert_eq!(segments.len(), 2);
    assert_close(segments[0].duration, 1.0);
    assert!(segments[1].end > 5.0);
}

/// Test the renormalize clamp policy on the same input
#[test]
fn test_allocate_withRenormalize_shouldKeepTotalAndBounds() {
    let allocator = TimingAllocator::new(1.0, 6.0)
        .with_pauses(silent_pauses())
        .with_clamp_policy(ClampPolicy::Renormalize);
    let segments = allocator.allocate(
        "Hi. This sentence is quite a bit longer than the first one.",
        5.0,
        10.0,
    );

    assert_close(segments[0].duration, 1.0);
    assert_close(segments[1].duration, 4.0);
    assert_close(segments[1].end, 5.0);
}

/// Test that a short scene with a single sentence is not clamped
#[test]
fn test_allocate_withSingleSentenceBelowMinimum_shouldUseAudioDuration() {
    let allocator = TimingAllocator::new(1.0, 6.0);
    let segments = allocator.allocate("Go!", 0.4, 17.0);

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].end, 0.4);
}

/// Test clamp policy parsing from configuration
#[test]
fn test_clamp_policy_deserialize_shouldUseSnakeCase() {
    let policy: ClampPolicy = serde_json::from_str("\"renormalize\"").unwrap();
    assert_eq!(policy, ClampPolicy::Renormalize);
    assert_eq!(ClampPolicy::default(), ClampPolicy::PerCaption);
    assert_eq!(serde_json::to_string(&ClampPolicy::PerCaption).unwrap(), "\"per_caption\"");
}

/// Test sentence splitting on mixed terminators
#[test]
fn test_split_sentences_withMixedTerminators_shouldKeepEachRun() {
    let sentences = TimingAllocator::split_sentences("Really?! Yes. No...");
    assert_eq!(sentences, vec!["Really?!", "Yes.", "No..."]);
}
