use std::fmt;
use std::path::Path;

use anyhow::{anyhow, Result};

use crate::styles::{to_ass_color, SubtitleStyle};

// @module: FFmpeg video filter strings for burning subtitles in

// @const: TikTok layout
const TIKTOK_FONT_SCALE: f64 = 1.3;
const TIKTOK_MIN_OUTLINE: u32 = 3;
const TIKTOK_MARGIN_V: u32 = 384;
const TIKTOK_PLAY_RES_Y: u32 = 1280;

/// Target video layout for the `subtitles=` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoFormat {
    #[default]
    Standard,
    Youtube,
    Tiktok,
}

impl VideoFormat {
    pub const ALL: [VideoFormat; 3] = [VideoFormat::Standard, VideoFormat::Youtube, VideoFormat::Tiktok];

    pub fn name(&self) -> &'static str {
        match self {
            VideoFormat::Standard => "standard",
            VideoFormat::Youtube => "youtube",
            VideoFormat::Tiktok => "tiktok",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for VideoFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        VideoFormat::ALL
            .iter()
            .copied()
            .find(|f| f.name() == lower)
            .ok_or_else(|| anyhow!("Unknown video format: {}", s))
    }
}

/// Escape a path for use inside an ffmpeg filter argument
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace(':', "\\:")
}

/// `subtitles=` filter rendering an SRT file with the style forced on it
pub fn subtitle_filter(style: &SubtitleStyle, srt_path: &Path, format: VideoFormat) -> String {
    let tiktok = format == VideoFormat::Tiktok;

    let font_size = if tiktok {
        (style.font_size as f64 * TIKTOK_FONT_SCALE) as u32
    } else {
        style.font_size
    };
    let outline = if tiktok {
        (style.outline_width + 1).max(TIKTOK_MIN_OUTLINE)
    } else {
        style.outline_width
    };

    let mut parts = vec![
        format!("Fontname={}", style.font_family),
        format!("Fontsize={}", font_size),
        format!("PrimaryColour={}", to_ass_color(&style.text_color, 1.0)),
        format!("OutlineColour={}", to_ass_color(&style.outline_color, 1.0)),
        format!("Outline={}", outline),
        format!("Bold={}", if style.is_bold() { 1 } else { 0 }),
    ];

    if tiktok {
        parts.push(format!("MarginV={}", TIKTOK_MARGIN_V));
        parts.push(format!("PlayResY={}", TIKTOK_PLAY_RES_Y));
    } else {
        parts.push(format!("MarginV={}", style.margin_bottom));
    }
    parts.push(format!("Alignment={}", style.ass_alignment()));

    if style.has_background() {
        parts.push(format!(
            "BackColour={}",
            to_ass_color(&style.background_color, style.background_opacity)
        ));
    }
    if style.shadow_enabled {
        parts.push("Shadow=2".to_string());
        parts.push("ShadowColour=&H80000000".to_string());
    }

    format!("subtitles={}:force_style='{}'", escape_filter_path(srt_path), parts.join(","))
}

/// `ass=` filter rendering an ASS file as authored
pub fn ass_filter(ass_path: &Path) -> String {
    format!("ass={}", escape_filter_path(ass_path))
}
