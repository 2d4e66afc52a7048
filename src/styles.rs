/*!
 * Subtitle presentation styles.
 *
 * A `SubtitleStyle` carries both the look of a caption (font, colors,
 * anchors, margins) and its pacing (reading speed, min/max duration).
 * The pacing fields feed the timing allocator, so switching presets
 * changes how captions are timed and not only how they are drawn.
 *
 * Presets are a closed set (`StylePreset`). A `StyleRegistry` maps every
 * preset to a style record; it is built explicitly and handed to the
 * components that need it.
 */

use std::collections::HashMap;
use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Medium,
    #[default]
    Bold,
}

/// Vertical anchor of the caption block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerticalPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

/// Horizontal anchor of the caption block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalPosition {
    Left,
    #[default]
    Center,
    Right,
}

/// Immutable presentation and pacing settings for captions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleStyle {
    // @field: Font
    pub font_family: String,
    pub font_size: u32,
    pub font_weight: FontWeight,

    // @field: Colors (hex `#RRGGBB`, a named color, or `transparent`)
    pub text_color: String,
    pub background_color: String,
    pub background_opacity: f64,
    pub outline_color: String,
    pub outline_width: u32,

    // @field: Placement
    pub position_v: VerticalPosition,
    pub position_h: HorizontalPosition,
    pub margin_bottom: u32,
    pub margin_horizontal: u32,

    // @field: Layout
    pub max_chars_per_line: usize,
    pub max_lines: usize,
    pub line_spacing: f64,

    // @field: Pacing
    pub chars_per_second: f64,
    pub min_duration: f64,
    pub max_duration: f64,

    // @field: Shadow
    pub shadow_enabled: bool,
    pub shadow_offset: (i32, i32),
    pub shadow_blur: u32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 22,
            font_weight: FontWeight::Bold,
            text_color: "white".to_string(),
            background_color: "black".to_string(),
            background_opacity: 0.8,
            outline_color: "black".to_string(),
            outline_width: 2,
            position_v: VerticalPosition::Bottom,
            position_h: HorizontalPosition::Center,
            margin_bottom: 50,
            margin_horizontal: 20,
            max_chars_per_line: 42,
            max_lines: 2,
            line_spacing: 1.2,
            chars_per_second: 21.0,
            min_duration: 1.0,
            max_duration: 7.0,
            shadow_enabled: true,
            shadow_offset: (2, 2),
            shadow_blur: 3,
        }
    }
}

impl SubtitleStyle {
    /// ASS numpad alignment (1-3 bottom, 4-6 middle, 7-9 top)
    pub fn ass_alignment(&self) -> u8 {
        let row = match self.position_v {
            VerticalPosition::Bottom => 0,
            VerticalPosition::Center => 3,
            VerticalPosition::Top => 6,
        };
        let column = match self.position_h {
            HorizontalPosition::Left => 1,
            HorizontalPosition::Center => 2,
            HorizontalPosition::Right => 3,
        };
        row + column
    }

    /// Whether the background box should be drawn at all
    pub fn has_background(&self) -> bool {
        !self.background_color.eq_ignore_ascii_case("transparent") && self.background_opacity > 0.0
    }

    /// Whether the font is rendered bold
    pub fn is_bold(&self) -> bool {
        self.font_weight == FontWeight::Bold
    }
}

/// The closed catalogue of built-in styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    Netflix,
    Youtube,
    Cinema,
    #[default]
    Modern,
    Accessibility,
    Pop,
    Casquinha,
    Tiktok,
    Highlighted,
}

impl StylePreset {
    /// Every preset, in display order
    pub const ALL: [StylePreset; 9] = [
        StylePreset::Netflix,
        StylePreset::Youtube,
        StylePreset::Cinema,
        StylePreset::Modern,
        StylePreset::Accessibility,
        StylePreset::Pop,
        StylePreset::Casquinha,
        StylePreset::Tiktok,
        StylePreset::Highlighted,
    ];

    // @returns: Lowercase preset identifier
    pub fn name(&self) -> &'static str {
        match self {
            Self::Netflix => "netflix",
            Self::Youtube => "youtube",
            Self::Cinema => "cinema",
            Self::Modern => "modern",
            Self::Accessibility => "accessibility",
            Self::Pop => "pop",
            Self::Casquinha => "casquinha",
            Self::Tiktok => "tiktok",
            Self::Highlighted => "highlighted",
        }
    }

    // @returns: Human readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Netflix => "Bold font with high legibility",
            Self::Youtube => "Clean modern look",
            Self::Cinema => "Elegant outlined text with shadow, no box",
            Self::Modern => "Balanced, professional default",
            Self::Accessibility => "High contrast yellow on near-opaque black",
            Self::Pop => "Large yellow text for energetic content",
            Self::Casquinha => "Vibrant yellow on solid black, short lines",
            Self::Tiktok => "Large captions for vertical 9:16 video",
            Self::Highlighted => "Large font, no background, for keyword highlighting",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase();
        Self::ALL.iter().copied().find(|p| p.name() == wanted)
    }

    /// The built-in style record for this preset
    pub fn builtin_style(&self) -> SubtitleStyle {
        let base = SubtitleStyle::default();
        match self {
            Self::Netflix => SubtitleStyle {
                font_size: 24,
                background_opacity: 0.75,
                chars_per_second: 20.0,
                ..base
            },
            Self::Youtube => SubtitleStyle {
                font_family: "Roboto".to_string(),
                font_size: 20,
                font_weight: FontWeight::Normal,
                outline_width: 1,
                chars_per_second: 21.0,
                ..base
            },
            Self::Cinema => SubtitleStyle {
                font_size: 26,
                background_color: "transparent".to_string(),
                background_opacity: 0.0,
                outline_width: 3,
                max_chars_per_line: 45,
                chars_per_second: 18.0,
                min_duration: 1.2,
                ..base
            },
            Self::Modern => SubtitleStyle {
                font_family: "Helvetica".to_string(),
                font_weight: FontWeight::Medium,
                text_color: "#FFFFFF".to_string(),
                background_color: "#000000".to_string(),
                background_opacity: 0.85,
                outline_width: 1,
                max_chars_per_line: 40,
                min_duration: 1.0,
                max_duration: 6.0,
                shadow_offset: (1, 1),
                shadow_blur: 2,
                ..base
            },
            Self::Accessibility => SubtitleStyle {
                font_size: 24,
                text_color: "yellow".to_string(),
                background_opacity: 0.9,
                max_chars_per_line: 37,
                chars_per_second: 17.0,
                min_duration: 1.5,
                max_duration: 8.0,
                ..base
            },
            Self::Pop => SubtitleStyle {
                font_family: "Helvetica".to_string(),
                font_size: 26,
                text_color: "yellow".to_string(),
                max_chars_per_line: 38,
                chars_per_second: 20.0,
                min_duration: 0.8,
                max_duration: 5.0,
                shadow_blur: 4,
                ..base
            },
            Self::Casquinha => SubtitleStyle {
                font_size: 28,
                text_color: "#FFFF00".to_string(),
                background_color: "#000000".to_string(),
                background_opacity: 0.85,
                outline_color: "#000000".to_string(),
                outline_width: 3,
                max_chars_per_line: 35,
                chars_per_second: 18.0,
                min_duration: 1.2,
                margin_bottom: 60,
                ..base
            },
            Self::Tiktok => SubtitleStyle {
                font_size: 24,
                background_opacity: 0.7,
                max_chars_per_line: 30,
                chars_per_second: 20.0,
                min_duration: 0.8,
                max_duration: 5.0,
                margin_bottom: 80,
                ..base
            },
            Self::Highlighted => SubtitleStyle {
                font_family: "Arial Black".to_string(),
                font_size: 52,
                background_color: "transparent".to_string(),
                background_opacity: 0.0,
                margin_bottom: 120,
                shadow_offset: (3, 3),
                max_chars_per_line: 25,
                line_spacing: 1.3,
                min_duration: 0.5,
                max_duration: 4.0,
                ..base
            },
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for StylePreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| anyhow!("Unknown style preset: {}", s))
    }
}

/// Per-field overrides merged on top of a base style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub font_weight: Option<FontWeight>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub background_opacity: Option<f64>,
    pub outline_color: Option<String>,
    pub outline_width: Option<u32>,
    pub position_v: Option<VerticalPosition>,
    pub position_h: Option<HorizontalPosition>,
    pub margin_bottom: Option<u32>,
    pub margin_horizontal: Option<u32>,
    pub max_chars_per_line: Option<usize>,
    pub max_lines: Option<usize>,
    pub line_spacing: Option<f64>,
    pub chars_per_second: Option<f64>,
    pub min_duration: Option<f64>,
    pub max_duration: Option<f64>,
    pub shadow_enabled: Option<bool>,
    pub shadow_offset: Option<(i32, i32)>,
    pub shadow_blur: Option<u32>,
}

impl StyleOverrides {
    /// True when no field is overridden
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produce a new style from `base` with every set field replaced
    pub fn apply_to(&self, base: &SubtitleStyle) -> SubtitleStyle {
        let mut style = base.clone();
        if let Some(v) = &self.font_family {
            style.font_family = v.clone();
        }
        if let Some(v) = self.font_size {
            style.font_size = v;
        }
        if let Some(v) = self.font_weight {
            style.font_weight = v;
        }
        if let Some(v) = &self.text_color {
            style.text_color = v.clone();
        }
        if let Some(v) = &self.background_color {
            style.background_color = v.clone();
        }
        if let Some(v) = self.background_opacity {
            style.background_opacity = v.clamp(0.0, 1.0);
        }
        if let Some(v) = &self.outline_color {
            style.outline_color = v.clone();
        }
        if let Some(v) = self.outline_width {
            style.outline_width = v;
        }
        if let Some(v) = self.position_v {
            style.position_v = v;
        }
        if let Some(v) = self.position_h {
            style.position_h = v;
        }
        if let Some(v) = self.margin_bottom {
            style.margin_bottom = v;
        }
        if let Some(v) = self.margin_horizontal {
            style.margin_horizontal = v;
        }
        if let Some(v) = self.max_chars_per_line {
            style.max_chars_per_line = v;
        }
        if let Some(v) = self.max_lines {
            style.max_lines = v;
        }
        if let Some(v) = self.line_spacing {
            style.line_spacing = v;
        }
        if let Some(v) = self.chars_per_second {
            style.chars_per_second = v;
        }
        if let Some(v) = self.min_duration {
            style.min_duration = v;
        }
        if let Some(v) = self.max_duration {
            style.max_duration = v;
        }
        if let Some(v) = self.shadow_enabled {
            style.shadow_enabled = v;
        }
        if let Some(v) = self.shadow_offset {
            style.shadow_offset = v;
        }
        if let Some(v) = self.shadow_blur {
            style.shadow_blur = v;
        }
        style
    }
}

/// Preset → style mapping, built once and shared read-only
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: HashMap<StylePreset, SubtitleStyle>,
    default_preset: StylePreset,
}

impl StyleRegistry {
    /// Registry holding the built-in record for every preset
    pub fn builtin() -> Self {
        let styles = StylePreset::ALL
            .iter()
            .map(|preset| (*preset, preset.builtin_style()))
            .collect();
        Self {
            styles,
            default_preset: StylePreset::default(),
        }
    }

    /// Replace the record of one preset
    pub fn with_style(mut self, preset: StylePreset, style: SubtitleStyle) -> Self {
        self.styles.insert(preset, style);
        self
    }

    /// Change which preset unknown names fall back to
    pub fn with_default_preset(mut self, preset: StylePreset) -> Self {
        self.default_preset = preset;
        self
    }

    pub fn default_preset(&self) -> StylePreset {
        self.default_preset
    }

    /// Style for a preset
    pub fn get(&self, preset: StylePreset) -> &SubtitleStyle {
        // every preset is inserted by `builtin`, and `with_style` only replaces
        &self.styles[&preset]
    }

    /// Case-insensitive lookup; unknown names resolve to the default preset
    pub fn get_style(&self, name: &str) -> &SubtitleStyle {
        self.get(self.resolve(name))
    }

    /// Map a name to a preset, falling back to the default
    pub fn resolve(&self, name: &str) -> StylePreset {
        StylePreset::from_name(name).unwrap_or(self.default_preset)
    }

    pub fn default_style(&self) -> &SubtitleStyle {
        self.get(self.default_preset)
    }

    /// Build a custom style by merging overrides on a base preset
    pub fn create_custom_style(&self, base: &str, overrides: &StyleOverrides) -> SubtitleStyle {
        overrides.apply_to(self.get_style(base))
    }

    /// (name, description) pairs for every preset
    pub fn available_styles(&self) -> Vec<(&'static str, &'static str)> {
        StylePreset::ALL
            .iter()
            .map(|p| (p.name(), p.description()))
            .collect()
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// @const: Named colors understood in style records and highlight markup
const NAMED_COLORS: [(&str, &str); 8] = [
    ("white", "#FFFFFF"),
    ("black", "#000000"),
    ("red", "#FF0000"),
    ("green", "#00FF00"),
    ("blue", "#0000FF"),
    ("yellow", "#FFFF00"),
    ("cyan", "#00FFFF"),
    ("magenta", "#FF00FF"),
];

/// Hex equivalent of a named color
pub fn named_color_hex(name: &str) -> Option<&'static str> {
    let lower = name.trim().to_lowercase();
    NAMED_COLORS.iter().find(|(n, _)| *n == lower).map(|(_, hex)| *hex)
}

/// Parse `#RRGGBB` or a named color into RGB bytes
pub fn parse_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let trimmed = color.trim();
    let hex = named_color_hex(trimmed).unwrap_or(trimmed);
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Convert a color to ASS `&HAABBGGRR`, alpha being `1 - opacity` scaled to 0-255
///
/// Unparseable colors become opaque white.
pub fn to_ass_color(color: &str, opacity: f64) -> String {
    let (r, g, b) = parse_rgb(color).unwrap_or((0xFF, 0xFF, 0xFF));
    let alpha = ((1.0 - opacity.clamp(0.0, 1.0)) * 255.0) as u8;
    format!("&H{:02X}{:02X}{:02X}{:02X}", alpha, b, g, r)
}

/// Convert a color to the bare `BBGGRR` form used in inline override tags
pub fn to_bgr_hex(color: &str) -> Option<String> {
    parse_rgb(color).map(|(r, g, b)| format!("{:02X}{:02X}{:02X}", b, g, r))
}

/// Greedy word wrap to the style's line width and line budget
///
/// Words that do not fit in `max_lines` lines are dropped.
pub fn wrap_text(text: &str, style: &SubtitleStyle) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if candidate_len <= style.max_chars_per_line {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if lines.len() >= style.max_lines {
            break;
        }
        current = word.to_string();
    }

    if !current.is_empty() && lines.len() < style.max_lines {
        lines.push(current);
    }

    lines.join("\n")
}

/// Stretch or cap a caption's timing to what the style considers readable
pub fn validate_timing(start: f64, end: f64, text: &str, style: &SubtitleStyle) -> (f64, f64) {
    let char_count = text.chars().filter(|c| *c != '\n').count() as f64;
    let recommended = if style.chars_per_second > 0.0 {
        char_count / style.chars_per_second
    } else {
        style.min_duration
    }
    .max(style.min_duration)
    .min(style.max_duration);

    let current = end - start;
    if current < recommended {
        (start, start + recommended)
    } else if current > style.max_duration {
        (start, start + style.max_duration)
    } else {
        (start, end)
    }
}
