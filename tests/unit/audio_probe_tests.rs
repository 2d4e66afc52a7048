/*!
 * Tests for audio duration probing
 */

use anyhow::Result;
use narrasync::audio_probe::{AudioProbe, DefaultAudioProbe, MockAudioProbe};
use narrasync::errors::ProbeError;
use crate::common;

/// Test reading a mock audio file through the default probe
#[tokio::test]
async fn test_default_probe_withMockAudioFile_shouldReadDeclaredDuration() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::write_mock_audio(temp_dir.path(), "scene_01.mp3", 3.5)?;

    let duration = DefaultAudioProbe::default().duration_seconds(&path).await?;
    assert_eq!(duration, 3.5);
    Ok(())
}

/// Test a mock file carrying a JSON metadata line
#[tokio::test]
async fn test_mock_probe_withJsonMetadata_shouldReadDuration() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "scene_02.mp3",
        "MOCK AUDIO FILE\n{\"voice\": \"narrator\", \"duration_seconds\": 6.75}\n",
    )?;

    let duration = MockAudioProbe.duration_seconds(&path).await?;
    assert_eq!(duration, 6.75);
    Ok(())
}

/// Test the mock probe on a file that is not a mock
#[tokio::test]
async fn test_mock_probe_withPlainFile_shouldReturnInvalidOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "notes.txt", "just some notes")?;

    let result = MockAudioProbe.duration_seconds(&path).await;
    assert!(matches!(result, Err(ProbeError::InvalidOutput(_))));
    Ok(())
}

/// Test the mock probe on a missing file
#[test]
fn test_mock_probe_withMissingFile_shouldReturnNotFound() {
    let result = tokio_test::block_on(async {
        MockAudioProbe
            .duration_seconds(std::path::Path::new("/no/such/dir/scene.mp3"))
            .await
    });
    assert!(matches!(result, Err(ProbeError::NotFound(_))));
}
