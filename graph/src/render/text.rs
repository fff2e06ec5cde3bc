use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display-width aware string fitting for terminal columns
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayout;

impl TextLayout {
    /// Columns `text` occupies in a terminal (wide CJK characters count twice)
    pub fn display_width(text: &str) -> usize {
        UnicodeWidthStr::width(text)
    }

    /// Cut `text` to at most `max_width` columns without splitting a grapheme.
    /// A trailing `…` marks the cut when there is room for it.
    pub fn truncate_to_width(text: &str, max_width: usize) -> String {
        if Self::display_width(text) <= max_width {
            return text.to_string();
        }
        if max_width == 0 {
            return String::new();
        }

        let budget = max_width - 1;
        let mut result = String::new();
        let mut width = 0;
        for grapheme in text.graphemes(true) {
            let w = UnicodeWidthStr::width(grapheme);
            if width + w > budget {
                break;
            }
            result.push_str(grapheme);
            width += w;
        }
        result.push('…');
        result
    }

    /// Left-align `text` in exactly `width` columns
    pub fn pad_to_width(text: &str, width: usize) -> String {
        let fitted = Self::truncate_to_width(text, width);
        let used = Self::display_width(&fitted);
        format!("{}{}", fitted, " ".repeat(width.saturating_sub(used)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_characters_count_double() {
        assert_eq!(TextLayout::display_width("hello"), 5);
        assert_eq!(TextLayout::display_width("你好"), 4);
        assert_eq!(TextLayout::display_width("hello世界"), 9);
    }

    #[test]
    fn truncation_marks_the_cut() {
        assert_eq!(TextLayout::truncate_to_width("short", 10), "short");
        assert_eq!(TextLayout::truncate_to_width("Hello World", 6), "Hello…");

        let cut = TextLayout::truncate_to_width("Hello世界World", 8);
        assert!(TextLayout::display_width(&cut) <= 8);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn truncation_keeps_graphemes_whole() {
        let cut = TextLayout::truncate_to_width("Hi👨‍👩‍👧‍👦there", 4);
        assert!(cut.starts_with("Hi"));
        assert!(!cut.contains('\u{200d}'));
    }

    #[test]
    fn padding_fills_columns() {
        let padded = TextLayout::pad_to_width("测试", 10);
        assert_eq!(TextLayout::display_width(&padded), 10);
        assert_eq!(TextLayout::pad_to_width("toolong", 4), "too…");
    }
}
