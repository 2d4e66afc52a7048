/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use narrasync::app_config::Config;
use narrasync::app_controller::Controller;
use narrasync::styles::{StylePreset, StyleRegistry, SubtitleStyle};
use narrasync::synchronizer::SceneNarration;
use crate::common;

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;

    assert_eq!(controller.config().output.style, "modern");
    assert_eq!(&controller.resolve_style(), controller.registry().get(StylePreset::Modern));
    Ok(())
}

/// Test the controller with an invalid configuration
#[test]
fn test_controller_withInvalidConfig_shouldRefuseToStart() {
    let mut config = Config::default();
    config.sync.max_concurrent_probes = 0;

    assert!(Controller::with_config(config).is_err());
}

/// Test that an unknown style name falls back to the default preset
#[test]
fn test_resolve_style_withUnknownName_shouldUseDefaultPreset() -> Result<()> {
    common::init_test_logging();
    let mut config = Config::default();
    config.output.style = "vaporwave".to_string();

    let controller = Controller::with_config(config)?;
    assert_eq!(&controller.resolve_style(), StyleRegistry::builtin().default_style());
    Ok(())
}

/// Test that style overrides from the config are applied
#[test]
fn test_resolve_style_withOverrides_shouldMergeOntoPreset() -> Result<()> {
    let mut config = Config::default();
    config.output.style = "Accessibility".to_string();
    config.output.style_overrides.font_size = Some(48);

    let controller = Controller::with_config(config)?;
    let style = controller.resolve_style();

    assert_eq!(style.font_size, 48);
    assert_eq!(style.text_color, "yellow");
    assert_eq!(style.min_duration, 1.5);
    Ok(())
}

/// Test that a replaced registry record drives caption pacing
#[test]
fn test_with_registry_withCustomRecord_shouldChangeClampBounds() -> Result<()> {
    let strict = SubtitleStyle {
        min_duration: 2.0,
        max_duration: 2.0,
        ..SubtitleStyle::default()
    };
    let registry = StyleRegistry::builtin().with_style(StylePreset::Modern, strict);
    let controller = Controller::new_for_test()?.with_registry(registry);

    let style = controller.resolve_style();
    let report = controller
        .build_synchronizer(&style)
        .synchronize(&[SceneNarration::new(1, "One. Two. Three.", 3.0)]);

    assert!(report.captions.iter().all(|c| (c.duration() - 2.0).abs() < 1e-9));
    Ok(())
}

/// Test that the sync config reaches the synchronizer
#[test]
fn test_build_synchronizer_shouldCarrySyncSettings() -> Result<()> {
    let mut config = Config::default();
    config.sync.inter_scene_gap_secs = 1.25;
    config.sync.max_chars_per_second = 30.0;

    let controller = Controller::with_config(config)?;
    let synchronizer = controller.build_synchronizer(&controller.resolve_style());

    assert_eq!(synchronizer.settings().inter_scene_gap, 1.25);
    assert_eq!(synchronizer.settings().max_chars_per_second, 30.0);
    Ok(())
}
