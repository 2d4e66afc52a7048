/*!
 * Integration tests for the script to subtitle files workflow
 */

use anyhow::Result;
use narrasync::app_config::{Config, SubtitleFormat};
use narrasync::app_controller::Controller;
use narrasync::errors::SyncError;
use narrasync::subtitle_processor::CaptionTrack;
use narrasync::synchronizer::Script;
use crate::common::{self, StaticAudioProbe};

/// Test a single scene end to end with mock audio files
#[test]
fn test_run_sync_withSingleScene_shouldWriteSrtAndAss() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let script = common::write_script(temp_dir.path(), "script.json", &["Hello world. This is a test."])?;
    let audio = common::write_mock_audio(temp_dir.path(), "scene_01.mp3", 4.0)?;
    let output_dir = temp_dir.path().join("out");

    let controller = Controller::new_for_test()?;
    let outcome = tokio_test::block_on(controller.run_sync(&script, &[audio], &output_dir))?;

    assert_eq!(outcome.warning_count(), 0);
    assert_eq!(outcome.track.len(), 2);

    let srt_path = outcome.srt_path.clone().unwrap();
    let srt = std::fs::read_to_string(&srt_path)?;
    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:01,824\nHello world.\n\n2\n00:00:01,824 --> "));
    assert!(srt.contains("--> 00:00:04,000\nThis is a test.\n"));

    let parsed = CaptionTrack::parse_srt_file(&srt_path)?;
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed.captions[1].end_seconds, 4.0);

    let ass = std::fs::read_to_string(outcome.ass_path.unwrap())?;
    assert!(ass.contains("Dialogue: 0,0:00:00.00,0:00:01.82,Default,,0,0,0,,Hello world.\n"));
    assert!(ass.contains(",0:00:04.00,Default,"));
    Ok(())
}

/// Test that scene two starts after scene one's audio and the gap
#[tokio::test]
async fn test_run_sync_withTwoScenes_shouldPlaceSecondSceneAfterGap() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = Script::from_narrations(["The first scene.", "The second scene. It ends here."]);
    let audio = vec![temp_dir.path().join("1.mp3"), temp_dir.path().join("2.mp3")];
    let probe = StaticAudioProbe::new()
        .with_duration("1.mp3", 3.0)
        .with_duration("2.mp3", 4.0);

    let controller = Controller::new_for_test()?;
    let outcome = controller
        .run_sync_with_probe(&script, &audio, temp_dir.path(), &probe)
        .await?;

    let timings = &outcome.report.scene_timings;
    assert_eq!(timings.len(), 2);
    assert_eq!(timings[1].offset_seconds - timings[0].offset_seconds, 3.5);

    let srt = std::fs::read_to_string(outcome.srt_path.unwrap())?;
    assert!(srt.contains("2\n00:00:03,500 --> "));
    assert!(srt.contains("--> 00:00:07,500\nIt ends here.\n"));
    Ok(())
}

/// Test that a skipped scene is reported and the rest still written
#[tokio::test]
async fn test_run_sync_withEmptyScene_shouldCountWarning() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = Script::from_narrations(["Opening line.", "   ", "Closing line."]);
    let audio = vec![
        temp_dir.path().join("1.mp3"),
        temp_dir.path().join("2.mp3"),
        temp_dir.path().join("3.mp3"),
    ];
    let probe = StaticAudioProbe::new()
        .with_duration("1.mp3", 2.0)
        .with_duration("2.mp3", 2.0)
        .with_duration("3.mp3", 2.0);

    let controller = Controller::new_for_test()?;
    let outcome = controller
        .run_sync_with_probe(&script, &audio, temp_dir.path(), &probe)
        .await?;

    assert_eq!(outcome.warning_count(), 1);
    assert_eq!(outcome.report.skipped[0].scene_index, 2);
    assert_eq!(outcome.track.len(), 2);
    // the skipped scene does not take up time
    assert_eq!(outcome.track.captions[1].start_seconds, 2.5);
    Ok(())
}

/// Test that a run without any usable scene fails
#[tokio::test]
async fn test_run_sync_withNoUsableScene_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = Script::from_narrations(["Nobody will hear this."]);
    let audio = vec![temp_dir.path().join("missing.mp3")];

    let controller = Controller::new_for_test()?;
    let result = controller
        .run_sync_with_probe(&script, &audio, temp_dir.path(), &StaticAudioProbe::new())
        .await;

    let error = result.unwrap_err();
    assert!(matches!(
        error.downcast_ref::<SyncError>(),
        Some(SyncError::NoCaptions { skipped: 1 })
    ));
    assert!(!temp_dir.path().join("subtitles.srt").exists());
    Ok(())
}

/// Test that a failed write is reported instead of ignored
#[tokio::test]
async fn test_run_sync_withOutputDirBeingAFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let blocker = common::create_test_file(temp_dir.path(), "not_a_dir", "")?;
    let script = Script::from_narrations(["Some narration."]);
    let audio = vec![temp_dir.path().join("1.mp3")];
    let probe = StaticAudioProbe::new().with_duration("1.mp3", 2.0);

    let controller = Controller::new_for_test()?;
    let result = controller
        .run_sync_with_probe(&script, &audio, &blocker, &probe)
        .await;

    assert!(result.is_err());
    Ok(())
}

/// Test word-by-word SRT-only output
#[tokio::test]
async fn test_run_sync_withWordByWordSrtOnly_shouldWriteOneCaptionPerWord() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = Script::from_narrations(["Three little words."]);
    let audio = vec![temp_dir.path().join("1.mp3")];
    let probe = StaticAudioProbe::new().with_duration("1.mp3", 3.0);

    let mut config = Config::default();
    config.output.word_by_word = true;
    config.output.format = SubtitleFormat::Srt;
    config.output.file_stem = "words".to_string();

    let controller = Controller::with_config(config)?;
    let outcome = controller
        .run_sync_with_probe(&script, &audio, temp_dir.path(), &probe)
        .await?;

    assert!(outcome.ass_path.is_none());
    assert_eq!(outcome.srt_path, Some(temp_dir.path().join("words.srt")));

    let parsed = CaptionTrack::parse_srt_file(temp_dir.path().join("words.srt"))?;
    let words: Vec<&str> = parsed.captions.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(words, vec!["Three", "little", "words."]);
    assert_eq!(parsed.captions[1].start_seconds, 1.0);
    assert_eq!(parsed.captions[2].end_seconds, 3.0);
    Ok(())
}

/// Test that a missing script file is a load error
#[test]
fn test_run_sync_withMissingScript_shouldFailToLoad() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::new_for_test()?;

    let result = tokio_test::block_on(controller.run_sync(
        &temp_dir.path().join("nope.json"),
        &[],
        temp_dir.path(),
    ));

    let error = result.unwrap_err();
    assert!(matches!(error.downcast_ref::<SyncError>(), Some(SyncError::ScriptLoad(_))));
    Ok(())
}
