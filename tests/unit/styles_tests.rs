/*!
 * Tests for style presets, overrides and color conversion
 */

use narrasync::styles::{
    self, FontWeight, StyleOverrides, StylePreset, StyleRegistry, SubtitleStyle, VerticalPosition,
};

/// Test that every preset is listed exactly once
#[test]
fn test_available_styles_withBuiltinRegistry_shouldListEveryPreset() {
    let registry = StyleRegistry::builtin();
    let styles = registry.available_styles();

    assert_eq!(styles.len(), 9);
    assert!(styles.iter().any(|(name, _)| *name == "casquinha"));
    assert!(styles.iter().all(|(_, description)| !description.is_empty()));
}

/// Test the duration bounds of each preset
#[test]
fn test_preset_duration_bounds_shouldMatchPresetCharacter() {
    let registry = StyleRegistry::builtin();
    let expected = [
        (StylePreset::Netflix, 1.0, 7.0),
        (StylePreset::Youtube, 1.0, 7.0),
        (StylePreset::Cinema, 1.2, 7.0),
        (StylePreset::Modern, 1.0, 6.0),
        (StylePreset::Accessibility, 1.5, 8.0),
        (StylePreset::Pop, 0.8, 5.0),
        (StylePreset::Casquinha, 1.2, 7.0),
        (StylePreset::Tiktok, 0.8, 5.0),
        (StylePreset::Highlighted, 0.5, 4.0),
    ];

    for (preset, min, max) in expected {
        let style = registry.get(preset);
        assert_eq!(style.min_duration, min, "{}", preset);
        assert_eq!(style.max_duration, max, "{}", preset);
    }
}

/// Test preset name parsing
#[test]
fn test_preset_from_str_withKnownAndUnknownNames_shouldParseOrFail() {
    assert_eq!("Pop".parse::<StylePreset>().unwrap(), StylePreset::Pop);
    assert!("neon".parse::<StylePreset>().is_err());
    assert_eq!(StylePreset::Highlighted.to_string(), "highlighted");
}

/// Test overrides deserialized from a partial JSON object
#[test]
fn test_style_overrides_fromPartialJson_shouldOnlyReplaceGivenFields() {
    let overrides: StyleOverrides =
        serde_json::from_str(r##"{"font_size": 40, "text_color": "#00FF00", "position_v": "top"}"##).unwrap();
    assert!(!overrides.is_empty());

    let registry = StyleRegistry::builtin();
    let base = registry.get(StylePreset::Netflix);
    let custom = registry.create_custom_style("netflix", &overrides);

    assert_eq!(custom.font_size, 40);
    assert_eq!(custom.text_color, "#00FF00");
    assert_eq!(custom.position_v, VerticalPosition::Top);
    assert_eq!(custom.font_family, base.font_family);
    assert_eq!(custom.max_duration, base.max_duration);
    // the registry record is untouched
    assert_eq!(registry.get(StylePreset::Netflix).font_size, 24);
}

/// Test that empty overrides reproduce the base style
#[test]
fn test_style_overrides_whenEmpty_shouldReturnBaseStyle() {
    let overrides = StyleOverrides::default();
    assert!(overrides.is_empty());

    let registry = StyleRegistry::builtin();
    assert_eq!(&registry.create_custom_style("tiktok", &overrides), registry.get(StylePreset::Tiktok));
}

/// Test ASS color conversion
#[test]
fn test_to_ass_color_withVariousInputs_shouldProduceAbgr() {
    assert_eq!(styles::to_ass_color("#FF8000", 1.0), "&H000080FF");
    assert_eq!(styles::to_ass_color("black", 0.5), "&H7F000000");
    assert_eq!(styles::to_ass_color("not-a-color", 1.0), "&H00FFFFFF");
    assert_eq!(styles::to_bgr_hex("red").as_deref(), Some("0000FF"));
    assert_eq!(styles::to_bgr_hex("#12345"), None);
}

/// Test background detection
#[test]
fn test_has_background_withTransparentOrZeroOpacity_shouldBeFalse() {
    let transparent = SubtitleStyle {
        background_color: "transparent".to_string(),
        ..SubtitleStyle::default()
    };
    let invisible = SubtitleStyle {
        background_opacity: 0.0,
        ..SubtitleStyle::default()
    };

    assert!(!transparent.has_background());
    assert!(!invisible.has_background());
    assert!(SubtitleStyle::default().has_background());
}

/// Test bold detection
#[test]
fn test_is_bold_shouldOnlyHoldForBoldWeight() {
    let medium = SubtitleStyle {
        font_weight: FontWeight::Medium,
        ..SubtitleStyle::default()
    };
    assert!(!medium.is_bold());
    assert!(SubtitleStyle::default().is_bold());
}

/// Test word wrapping on a long caption
#[test]
fn test_wrap_text_withLongCaption_shouldBreakBetweenWords() {
    let style = SubtitleStyle {
        max_chars_per_line: 12,
        max_lines: 3,
        ..SubtitleStyle::default()
    };
    let wrapped = styles::wrap_text("the quick brown fox jumps over", &style);

    assert_eq!(wrapped, "the quick\nbrown fox\njumps over");
    assert!(wrapped.lines().all(|l| l.chars().count() <= 12));
}
