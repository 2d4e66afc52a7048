/*!
 * Keyword highlighting for ASS captions.
 *
 * Words are colored through inline override tags. Spans come from two places:
 * - manual markup written in the text as `{WORD:color}`
 * - an automatic dictionary of emphasis words grouped by category
 *
 * Manual spans are listed first. Overlaps are resolved by keeping the earliest
 * span and dropping any later span that overlaps it.
 */

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::styles::to_bgr_hex;

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

static MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^:}]+):([^}]+)\}").unwrap());

// @const: Color used when markup names an unknown color
const FALLBACK_MARKUP_COLOR: &str = "#007AFF";

// @const: BGR emitted when a span color cannot be parsed
const FALLBACK_BGR: &str = "0000FF";

// @const: Colors accepted by name in manual markup
const MARKUP_COLORS: [(&str, &str); 7] = [
    ("blue", "#007AFF"),
    ("green", "#34C759"),
    ("red", "#FF3B30"),
    ("orange", "#FF9500"),
    ("purple", "#AF52DE"),
    ("yellow", "#FFCC00"),
    ("pink", "#FF2D92"),
];

/// Category of automatically detected emphasis words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    Action,
    Success,
    Alert,
    Highlight,
    Creative,
}

impl KeywordCategory {
    pub const ALL: [KeywordCategory; 5] = [
        KeywordCategory::Action,
        KeywordCategory::Success,
        KeywordCategory::Alert,
        KeywordCategory::Highlight,
        KeywordCategory::Creative,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Success => "success",
            Self::Alert => "alert",
            Self::Highlight => "highlight",
            Self::Creative => "creative",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        Self::ALL.iter().copied().find(|c| c.name() == lower)
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Action => "#007AFF",
            Self::Success => "#34C759",
            Self::Alert => "#FF3B30",
            Self::Highlight => "#FF9500",
            Self::Creative => "#AF52DE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Action => "Action and creation words",
            Self::Success => "Success and positive words",
            Self::Alert => "Alert and importance words",
            Self::Highlight => "Emphasis and admiration words",
            Self::Creative => "Creative and artistic words",
        }
    }

    pub fn words(&self) -> &'static [&'static str] {
        match self {
            Self::Action => &["CREATE", "BUILD", "MAKE", "DO", "START", "GO", "PLAY", "RUN", "MOVE", "WORK"],
            Self::Success => &["SUCCESS", "WIN", "ACHIEVE", "COMPLETE", "DONE", "PERFECT", "GREAT", "EXCELLENT"],
            Self::Alert => &["STOP", "WARNING", "DANGER", "ALERT", "IMPORTANT", "URGENT", "CRITICAL"],
            Self::Highlight => &["NEW", "AMAZING", "INCREDIBLE", "WOW", "AWESOME", "FANTASTIC", "SPECIAL", "UNIQUE"],
            Self::Creative => &["CREATIVE", "ART", "DESIGN", "BEAUTIFUL", "STYLE", "COOL", "TRENDY", "MODERN"],
        }
    }
}

/// Uppercased word → color map used for automatic detection
#[derive(Debug, Clone, Default)]
pub struct KeywordDictionary {
    entries: HashMap<String, String>,
}

impl KeywordDictionary {
    /// Dictionary built from every category's word list
    pub fn builtin() -> Self {
        let mut dictionary = Self::default();
        for category in KeywordCategory::ALL {
            for word in category.words() {
                dictionary.insert(word, category.color());
            }
        }
        dictionary
    }

    pub fn insert(&mut self, word: &str, color: &str) {
        self.entries.insert(word.to_uppercase(), color.to_string());
    }

    pub fn color_for(&self, word: &str) -> Option<&str> {
        self.entries.get(&word.to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A colored range of the clean text (byte offsets)
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSpan {
    pub word: String,
    pub color: String,
    pub start: usize,
    pub end: usize,
}

/// User-added highlight that wins over the dictionary
#[derive(Debug, Clone, PartialEq)]
pub struct CustomHighlight {
    pub color: String,
    pub text_color: String,
}

/// Detects emphasis words and renders them as ASS color overrides
#[derive(Debug, Clone)]
pub struct KeywordHighlighter {
    dictionary: KeywordDictionary,
    custom_highlights: HashMap<String, CustomHighlight>,
}

impl KeywordHighlighter {
    pub fn new(dictionary: KeywordDictionary) -> Self {
        Self {
            dictionary,
            custom_highlights: HashMap::new(),
        }
    }

    /// Highlight a specific word with a color, taking precedence over the dictionary
    pub fn add_custom_highlight(&mut self, word: &str, color: &str, text_color: &str) {
        self.custom_highlights.insert(
            word.to_uppercase(),
            CustomHighlight {
                color: color.to_string(),
                text_color: text_color.to_string(),
            },
        );
    }

    /// Find dictionary and custom words in `text`
    pub fn detect_keywords(&self, text: &str) -> Vec<HighlightSpan> {
        WORD_REGEX
            .find_iter(text)
            .filter_map(|m| {
                let upper = m.as_str().to_uppercase();
                let color = match self.custom_highlights.get(&upper) {
                    Some(custom) => custom.color.clone(),
                    None => self.dictionary.color_for(&upper)?.to_string(),
                };
                Some(HighlightSpan {
                    word: m.as_str().to_string(),
                    color,
                    start: m.start(),
                    end: m.end(),
                })
            })
            .collect()
    }

    /// Resolve the color part of `{WORD:color}` markup
    fn resolve_markup_color(value: &str) -> String {
        let lower = value.trim().to_lowercase();
        if lower.starts_with('#') {
            return lower;
        }
        if let Some(category) = KeywordCategory::from_name(&lower) {
            return category.color().to_string();
        }
        MARKUP_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, hex)| hex.to_string())
            .unwrap_or_else(|| FALLBACK_MARKUP_COLOR.to_string())
    }

    /// Strip `{WORD:color}` markup, returning the clean text and the marked spans
    pub fn parse_manual_markup(&self, text: &str) -> (String, Vec<HighlightSpan>) {
        let mut clean = String::with_capacity(text.len());
        let mut spans = Vec::new();
        let mut last = 0;

        for caps in MARKUP_REGEX.captures_iter(text) {
            let (Some(whole), Some(word), Some(color)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            clean.push_str(&text[last..whole.start()]);
            let start = clean.len();
            clean.push_str(word.as_str());
            spans.push(HighlightSpan {
                word: word.as_str().to_string(),
                color: Self::resolve_markup_color(color.as_str()),
                start,
                end: clean.len(),
            });
            last = whole.end();
        }
        clean.push_str(&text[last..]);

        (clean, spans)
    }

    /// Sort by start and drop every span overlapping an earlier kept one
    pub fn remove_overlaps(spans: Vec<HighlightSpan>) -> Vec<HighlightSpan> {
        let mut sorted = spans;
        // stable: on equal starts, the span listed first (manual) wins
        sorted.sort_by_key(|s| s.start);

        let mut kept: Vec<HighlightSpan> = Vec::with_capacity(sorted.len());
        for span in sorted {
            match kept.last() {
                Some(last) if span.start < last.end => {}
                _ => kept.push(span),
            }
        }
        kept
    }

    /// Render `text` with inline ASS color tags around highlighted words
    pub fn generate_ass_tags(&self, text: &str, auto_detect: bool) -> String {
        let (clean, manual) = self.parse_manual_markup(text);

        let mut all = manual;
        if auto_detect {
            all.extend(self.detect_keywords(&clean));
        }

        let spans = Self::remove_overlaps(all);
        if spans.is_empty() {
            return clean;
        }

        let mut result = String::with_capacity(clean.len() + spans.len() * 32);
        let mut last = 0;
        for span in &spans {
            result.push_str(&clean[last..span.start]);
            let bgr = to_bgr_hex(&span.color).unwrap_or_else(|| FALLBACK_BGR.to_string());
            result.push_str(&format!("{{\\c&H{}&\\3c&H000000&\\bord2}}{}{{\\r}}", bgr, span.word));
            last = span.end;
        }
        result.push_str(&clean[last..]);
        result
    }
}

impl Default for KeywordHighlighter {
    fn default() -> Self {
        Self::new(KeywordDictionary::builtin())
    }
}
