/*!
 * ASS (Advanced SubStation Alpha) serialization.
 *
 * An ASS document is a `[Script Info]` block, a `[V4+ Styles]` block with a
 * `Default` and a `Highlighted` style derived from a `SubtitleStyle`, and an
 * `[Events]` block with one `Dialogue:` line per caption. Caption text may
 * carry inline color overrides produced by the keyword highlighter.
 */

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use log::debug;

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::highlight::KeywordHighlighter;
use crate::styles::{to_ass_color, SubtitleStyle};
use crate::subtitle_processor::{CaptionTrack, TimedCaption};
use crate::timecode;

// @const: Back color used when the style draws no background box
const TRANSPARENT_BACK_COLOR: &str = "&H80000000";

// @const: Share of the frame height kept below captions on vertical video
const VERTICAL_MARGIN_RATIO: f64 = 0.3;

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Per-document highlighting switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssOptions {
    // @field: Run captions through the keyword highlighter
    pub highlight_keywords: bool,
    // @field: Also match the automatic dictionary, not only manual markup
    pub auto_detect: bool,
}

impl Default for AssOptions {
    fn default() -> Self {
        Self {
            highlight_keywords: true,
            auto_detect: true,
        }
    }
}

/// Renders captions as an ASS document for a given frame size
#[derive(Debug, Clone)]
pub struct AssGenerator {
    video_width: u32,
    video_height: u32,
    highlighter: KeywordHighlighter,
}

impl AssGenerator {
    pub fn new(video_width: u32, video_height: u32) -> Self {
        Self {
            video_width,
            video_height,
            highlighter: KeywordHighlighter::default(),
        }
    }

    pub fn with_highlighter(mut self, highlighter: KeywordHighlighter) -> Self {
        self.highlighter = highlighter;
        self
    }

    pub fn highlighter(&self) -> &KeywordHighlighter {
        &self.highlighter
    }

    /// Vertical margin in pixels; vertical video keeps captions above the lower UI overlay
    pub fn margin_v(&self, style: &SubtitleStyle) -> u32 {
        if self.video_height > self.video_width {
            (self.video_height as f64 * VERTICAL_MARGIN_RATIO) as u32
        } else {
            style.margin_bottom
        }
    }

    /// `[Script Info]` and `[V4+ Styles]` blocks
    pub fn header(&self, style: &SubtitleStyle) -> String {
        let alignment = style.ass_alignment();
        let margin_v = self.margin_v(style);
        let back_color = if style.has_background() {
            to_ass_color(&style.background_color, style.background_opacity)
        } else {
            TRANSPARENT_BACK_COLOR.to_string()
        };

        let mut header = String::new();
        header.push_str("[Script Info]\n");
        header.push_str("Title: Narrated Video Subtitles\n");
        header.push_str("ScriptType: v4.00+\n");
        header.push_str("WrapStyle: 0\n");
        header.push_str("ScaledBorderAndShadow: yes\n");
        header.push_str("YCbCr Matrix: TV.709\n");
        let _ = writeln!(header, "PlayResX: {}", self.video_width);
        let _ = writeln!(header, "PlayResY: {}", self.video_height);
        header.push('\n');

        header.push_str("[V4+ Styles]\n");
        header.push_str(STYLE_FORMAT);
        header.push('\n');
        let _ = writeln!(
            header,
            "Style: Default,{},{},{},&H00FFFFFF,{},{},{},0,0,0,100,100,0,0,1,{},{},{},10,10,{},1",
            style.font_family,
            style.font_size,
            to_ass_color(&style.text_color, 1.0),
            to_ass_color(&style.outline_color, 1.0),
            back_color,
            if style.is_bold() { 1 } else { 0 },
            style.outline_width,
            if style.shadow_enabled { 2 } else { 0 },
            alignment,
            margin_v
        );
        let _ = writeln!(
            header,
            "Style: Highlighted,{},{},&H00FFFFFF,&H00FFFFFF,&H00000000,&H80000000,1,0,0,0,100,100,0,0,1,{},2,{},10,10,{},1",
            style.font_family,
            style.font_size,
            style.outline_width + 1,
            alignment,
            margin_v
        );
        header.push('\n');

        header
    }

    /// Caption text as it appears in a `Dialogue:` line
    fn event_text(&self, text: &str, options: AssOptions) -> String {
        let text = if options.highlight_keywords {
            self.highlighter.generate_ass_tags(text, options.auto_detect)
        } else {
            text.to_string()
        };
        text.replace("\r\n", "\n").replace('\n', "\\N")
    }

    /// Full ASS document for the given captions
    pub fn generate(&self, captions: &[TimedCaption], style: &SubtitleStyle, options: AssOptions) -> String {
        let mut document = self.header(style);
        document.push_str("[Events]\n");
        document.push_str(EVENT_FORMAT);
        document.push('\n');

        for caption in captions {
            let _ = writeln!(
                document,
                "Dialogue: 0,{},{},Default,,0,0,0,,{}",
                timecode::seconds_to_ass(caption.start_seconds),
                timecode::seconds_to_ass(caption.end_seconds),
                self.event_text(&caption.text, options)
            );
        }

        debug!("Generated ASS document with {} events", captions.len());
        document
    }

    /// Convert SRT text into an ASS document
    pub fn generate_from_srt(&self, srt_content: &str, style: &SubtitleStyle, options: AssOptions) -> Result<String, SubtitleError> {
        let track = CaptionTrack::parse_srt_string(srt_content)?;
        Ok(self.generate(&track.captions, style, options))
    }

    /// Render and write an ASS file
    pub fn write_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        captions: &[TimedCaption],
        style: &SubtitleStyle,
        options: AssOptions,
    ) -> Result<()> {
        FileManager::write_to_file(path, &self.generate(captions, style, options))
    }
}

impl Default for AssGenerator {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}
