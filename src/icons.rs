// Emoji and pictograph handling
// Text runs are split into grapheme clusters and classified as plain text or
// icons. An icon is any cluster whose leading code point is in the badge
// table or in one of the symbol/pictograph blocks, or that carries the
// combining enclosing keycap. The checkbox glyphs the renderer itself emits
// are never icons

use serde::Deserialize;
use std::collections::HashMap;
use std::iter::Peekable;
use std::sync::LazyLock;
use unicode_segmentation::{Graphemes, UnicodeSegmentation};

/// Label used in text mode for icons without a badge.
pub const UNKNOWN_ICON_LABEL: &str = "[icon]";

const KEYCAP: char = '\u{20E3}';

/// How icon clusters are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconMode {
    /// Draw icons as images looked up by code point.
    #[default]
    Embed,
    /// Replace icons with a bracketed label such as `[warning]`.
    Text,
    /// Replace each icon with one space.
    Strip,
    /// Leave icons in the text.
    Keep,
}

static ICON_BADGES: LazyLock<HashMap<char, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        // Status
        ('✅', "[correct]"),
        ('❌', "[incorrect]"),
        ('⚠', "[warning]"),
        ('ℹ', "[info]"),
        ('🛑', "[stop]"),
        ('✔', "[check]"),
        // Actions
        ('🚀', "[launch]"),
        ('⏱', "[timer]"),
        ('📊', "[analytics]"),
        ('📈', "[increase]"),
        ('📉', "[decrease]"),
        ('🔍', "[search]"),
        ('🔧', "[fix]"),
        ('🛠', "[tools]"),
        ('🔄', "[refresh]"),
        // Objects
        ('💰', "[money]"),
        ('💡', "[idea]"),
        ('🎯', "[target]"),
        ('🎁', "[bonus]"),
        ('🏆', "[achievement]"),
        ('📧', "[email]"),
        ('📞', "[phone]"),
        ('📅', "[calendar]"),
        ('📝', "[note]"),
        ('📌', "[pin]"),
        ('🔗', "[link]"),
        // Arrows
        ('➡', "[next]"),
        ('⬅', "[previous]"),
        ('⬆', "[up]"),
        ('⬇', "[down]"),
        ('↗', "[up-right]"),
        ('↘', "[down-right]"),
        // Emotions
        ('🎉', "[celebration]"),
        ('👍', "[like]"),
        ('👎', "[dislike]"),
        ('😀', "[happy]"),
        ('😢', "[sad]"),
        ('💪', "[strong]"),
        ('👌', "[ok]"),
    ])
});

/// Semantic label for a badge-mapped icon.
pub fn badge(ch: char) -> Option<&'static str> {
    ICON_BADGES.get(&ch).copied()
}

pub fn is_variation_selector(ch: char) -> bool {
    ('\u{FE00}'..='\u{FE0F}').contains(&ch)
}

/// Whether a single code point starts an icon.
pub fn is_icon_char(ch: char) -> bool {
    if ICON_BADGES.contains_key(&ch) {
        return true;
    }
    // Ballot boxes are produced by checkbox substitution and stay text.
    if matches!(ch, '☐' | '☑' | '☒') {
        return false;
    }
    matches!(ch as u32,
        0x2190..=0x21FF     // Arrows
        | 0x23E9..=0x23FF   // Miscellaneous Technical: time symbols
        | 0x2600..=0x26FF   // Miscellaneous Symbols
        | 0x2700..=0x27BF   // Dingbats
        | 0x2B00..=0x2BFF   // Miscellaneous Symbols and Arrows
        | 0x1F000..)
}

/// Whether a grapheme cluster is rendered as an icon.
///
/// Multi-code-point clusters (flags, skin tones, ZWJ sequences) are judged by
/// their first code point; keycap sequences always are icons.
pub fn is_icon_cluster(cluster: &str) -> bool {
    if cluster.contains(KEYCAP) {
        return true;
    }
    cluster.chars().next().is_some_and(is_icon_char)
}

/// A run of text that is either plain or a single icon cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub is_icon: bool,
    pub content: String,
    pub runes: Vec<char>,
}

impl TextSegment {
    fn plain(content: String) -> Self {
        let runes = content.chars().collect();
        TextSegment {
            is_icon: false,
            content,
            runes,
        }
    }

    fn icon(cluster: &str) -> Self {
        TextSegment {
            is_icon: true,
            content: cluster.to_string(),
            runes: cluster.chars().collect(),
        }
    }

    /// A badge-mapped icon directly followed by a variation selector.
    pub fn has_badge_variation(&self) -> bool {
        self.is_icon
            && self.runes.first().is_some_and(|&c| badge(c).is_some())
            && self.runes.get(1).is_some_and(|&c| is_variation_selector(c))
    }

    /// Asset file name built from the code points, variation selectors
    /// excluded: `1f680.png`, `31-20e3.png`.
    pub fn asset_name(&self) -> Option<String> {
        let parts: Vec<String> = self
            .runes
            .iter()
            .filter(|&&c| !is_variation_selector(c))
            .map(|&c| format!("{:x}", c as u32))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(format!("{}.png", parts.join("-")))
        }
    }

    /// Apply an icon mode to this segment.
    ///
    /// Plain segments only lose stray variation selectors (outside embed
    /// mode). Icons are replaced according to the mode; the variation
    /// selector after a badge-mapped icon becomes a space.
    pub fn with_mode(self, mode: IconMode) -> TextSegment {
        if !self.is_icon {
            if mode == IconMode::Embed || !self.runes.iter().any(|&c| is_variation_selector(c)) {
                return self;
            }
            let replaced: String = self
                .runes
                .iter()
                .map(|&c| if is_variation_selector(c) { ' ' } else { c })
                .collect();
            return TextSegment::plain(replaced);
        }

        let variation_space = self.has_badge_variation();
        let content = match mode {
            IconMode::Embed => return self,
            IconMode::Strip => " ".to_string(),
            IconMode::Text => {
                let label = self
                    .runes
                    .first()
                    .and_then(|&c| badge(c))
                    .unwrap_or(UNKNOWN_ICON_LABEL);
                if variation_space {
                    format!("{label} ")
                } else {
                    label.to_string()
                }
            }
            IconMode::Keep => {
                if variation_space {
                    let mut kept: String = self.runes[..1].iter().collect();
                    kept.push(' ');
                    kept.extend(self.runes[2..].iter());
                    kept
                } else {
                    self.content.clone()
                }
            }
        };
        TextSegment {
            is_icon: true,
            runes: content.chars().collect(),
            content,
        }
    }
}

/// Iterator over the segments of one text run.
///
/// Consecutive plain clusters accumulate into one segment; every icon
/// cluster is its own segment.
pub struct Segments<'a> {
    graphemes: Peekable<Graphemes<'a>>,
}

impl Iterator for Segments<'_> {
    type Item = TextSegment;

    fn next(&mut self) -> Option<TextSegment> {
        let first = self.graphemes.next()?;
        if is_icon_cluster(first) {
            return Some(TextSegment::icon(first));
        }
        let mut plain = String::from(first);
        while let Some(next) = self.graphemes.next_if(|g| !is_icon_cluster(g)) {
            plain.push_str(next);
        }
        Some(TextSegment::plain(plain))
    }
}

/// Split `text` into plain and icon segments.
pub fn segment(text: &str) -> Segments<'_> {
    Segments {
        graphemes: text.graphemes(true).peekable(),
    }
}

/// Apply an icon mode to a whole text run.
pub fn handle_icons(text: &str, mode: IconMode) -> String {
    segment(text)
        .map(|seg| seg.with_mode(mode).content)
        .collect()
}

/// Icon handling for text that can never hold inline images: table cells,
/// inline code, code blocks and HTML blocks. Embed mode behaves like keep
/// mode and the result is always restricted to the BMP.
pub fn flatten_icons(text: &str, mode: IconMode) -> String {
    let mode = match mode {
        IconMode::Embed => IconMode::Keep,
        other => other,
    };
    sanitize_bmp(&handle_icons(text, mode))
}

/// Replace code points above the Basic Multilingual Plane with spaces.
///
/// Embedded icons are drawn as images, so embed mode leaves them alone.
pub fn sanitize(text: &str, mode: IconMode) -> String {
    if mode == IconMode::Embed {
        return text.to_string();
    }
    sanitize_bmp(text)
}

/// Unconditional form of [`sanitize`], for text that is never embedded.
pub fn sanitize_bmp(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) > 0xFFFF { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> Vec<TextSegment> {
        segment(text).collect()
    }

    #[test]
    fn test_plain_text_is_one_segment() {
        let segments = collect("hello world");
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].is_icon);
        assert_eq!(segments[0].content, "hello world");
    }

    #[test]
    fn test_icons_split_plain_runs() {
        let segments = collect("Go 🚀 now✅");
        let shape: Vec<(bool, &str)> = segments
            .iter()
            .map(|s| (s.is_icon, s.content.as_str()))
            .collect();
        assert_eq!(
            shape,
            vec![(false, "Go "), (true, "🚀"), (false, " now"), (true, "✅")]
        );
    }

    #[test]
    fn test_multi_code_point_clusters_stay_whole() {
        for cluster in ["🇩🇪", "1\u{FE0F}\u{20E3}", "👍🏽", "👨\u{200D}👩\u{200D}👧", "⚠\u{FE0F}"] {
            let text = format!("a{cluster}b");
            let segments = collect(&text);
            assert_eq!(segments.len(), 3, "{cluster:?}");
            assert!(segments[1].is_icon);
            assert_eq!(segments[1].content, cluster);
        }
    }

    #[test]
    fn test_segments_reconstruct_input() {
        let text = "x ✅\u{FE0F} 🇫🇷 y → z";
        let joined: String = segment(text).map(|s| s.content).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_checkbox_glyphs_are_text() {
        assert!(!is_icon_char('☐'));
        assert!(!is_icon_char('☑'));
        assert!(is_icon_char('☀'));
        assert!(!is_icon_char('A'));
    }

    #[test]
    fn test_strip_matches_keep_boundaries() {
        let text = "ok ✅\u{FE0F} go 🚀🚀 1\u{FE0F}\u{20E3} end";
        let keep: Vec<TextSegment> = segment(text).map(|s| s.with_mode(IconMode::Keep)).collect();
        let strip: Vec<TextSegment> = segment(text).map(|s| s.with_mode(IconMode::Strip)).collect();
        assert_eq!(keep.len(), strip.len());
        for (k, s) in keep.iter().zip(&strip) {
            assert_eq!(k.is_icon, s.is_icon);
            if s.is_icon {
                assert_eq!(s.content, " ");
            } else {
                assert_eq!(k.content, s.content);
            }
        }
    }

    #[test]
    fn test_text_mode_labels() {
        assert_eq!(handle_icons("✅ done", IconMode::Text), "[correct] done");
        assert_eq!(handle_icons("⚠\u{FE0F}!", IconMode::Text), "[warning] !");
        assert_eq!(handle_icons("🦀", IconMode::Text), "[icon]");
    }

    #[test]
    fn test_keep_mode_replaces_badge_variation_selector() {
        assert_eq!(handle_icons("⚠\u{FE0F}x", IconMode::Keep), "⚠ x");
        assert_eq!(handle_icons("🦀x", IconMode::Keep), "🦀x");
    }

    #[test]
    fn test_embed_mode_is_lossless() {
        let text = "a ⚠\u{FE0F} 🦀";
        assert_eq!(handle_icons(text, IconMode::Embed), text);
        assert_eq!(sanitize(text, IconMode::Embed), text);
    }

    #[test]
    fn test_sanitize_replaces_astral_code_points() {
        assert_eq!(sanitize("a🦀b", IconMode::Keep), "a b");
        assert_eq!(sanitize("Ω€", IconMode::Text), "Ω€");
    }

    #[test]
    fn test_flatten_icons_never_leaves_astral_code_points() {
        assert_eq!(flatten_icons("a🦀b", IconMode::Embed), "a b");
        assert_eq!(flatten_icons("✅\u{FE0F}", IconMode::Embed), "✅ ");
        assert_eq!(flatten_icons("🚀", IconMode::Text), "[launch]");
    }

    #[test]
    fn test_asset_name_skips_variation_selectors() {
        let segs = collect("1\u{FE0F}\u{20E3}");
        assert_eq!(segs[0].asset_name().as_deref(), Some("31-20e3.png"));
        let segs = collect("🚀");
        assert_eq!(segs[0].asset_name().as_deref(), Some("1f680.png"));
    }

    #[test]
    fn test_badge_variation_detection() {
        let segs = collect("✅\u{FE0F}");
        assert!(segs[0].has_badge_variation());
        let segs = collect("☀\u{FE0F}");
        assert!(!segs[0].has_badge_variation());
    }
}
