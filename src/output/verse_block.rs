//! Verse Block Formatter
//!
//! 解決済みの節から、2段落のテキストブロック（ラベル + 本文）を組み立てる。

use crate::api::SlideStyle;
use crate::book_alias::display_english_name;
use crate::types::{Paragraph, ResolvedVerse, TextBlock, TextRun};

/// 第2言語の段落前の間隔（ポイント）
pub(crate) const SECONDARY_SPACE_BEFORE_PT: f64 = 12.0;

/// 節のテキストブロックを組み立てるフォーマッター
#[derive(Debug, Clone)]
pub struct VerseBlockFormatter {
    style: SlideStyle,
}

impl VerseBlockFormatter {
    pub fn new(style: SlideStyle) -> Self {
        Self { style }
    }

    fn run(&self, text: String, bold: bool, font_size: f64) -> TextRun {
        TextRun {
            text,
            bold,
            font_size,
            font_name: self.style.font_name.clone(),
        }
    }

    /// 解決済みの節をテキストブロックに変換
    ///
    /// ```text
    /// [창세기 1:1 ]태초에 하나님이 ...        (font_size)
    /// [Genesis 1:1 ]In the beginning ...      (font_size - 2, 12pt 間隔)
    /// ```
    ///
    /// `[]`は太字のラベルです。
    pub fn format(&self, verse: &ResolvedVerse<'_>) -> TextBlock {
        let locator = verse.locator;
        let primary_size = self.style.font_size;
        let secondary_size = self.style.secondary_font_size();

        let primary_label = format!("{} {}:{} ", locator.book, locator.chapter, locator.verse);
        let english = display_english_name(&locator.book, verse.book_eng);
        let secondary_label = format!("{} {}:{} ", english, locator.chapter, locator.verse);

        let primary = Paragraph {
            runs: vec![
                self.run(primary_label, true, primary_size),
                self.run(verse.primary.to_string(), false, primary_size),
            ],
            space_before: None,
        };

        let secondary = Paragraph {
            runs: vec![
                self.run(secondary_label, true, secondary_size),
                self.run(verse.secondary.to_string(), false, secondary_size),
            ],
            space_before: Some(SECONDARY_SPACE_BEFORE_PT),
        };

        TextBlock {
            paragraphs: vec![primary, secondary],
            word_wrap: true,
            auto_fit: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Locator;

    fn style() -> SlideStyle {
        SlideStyle {
            font_name: "Batang".to_string(),
            font_size: 30.0,
        }
    }

    #[test]
    fn test_format_korean_book_uses_alias() {
        let locator = Locator::new("요한복음", 3, 16);
        let verse = ResolvedVerse {
            locator: &locator,
            primary: "하나님이 세상을",
            secondary: "For God so loved",
            book_eng: None,
        };
        let block = VerseBlockFormatter::new(style()).format(&verse);

        assert_eq!(block.paragraphs.len(), 2);
        let primary = &block.paragraphs[0];
        assert_eq!(primary.runs[0].text, "요한복음 3:16 ");
        assert!(primary.runs[0].bold);
        assert_eq!(primary.runs[0].font_size, 30.0);
        assert_eq!(primary.runs[1].text, "하나님이 세상을");
        assert!(!primary.runs[1].bold);
        assert_eq!(primary.space_before, None);

        let secondary = &block.paragraphs[1];
        assert_eq!(secondary.runs[0].text, "John 3:16 ");
        assert!(secondary.runs[0].bold);
        assert_eq!(secondary.runs[0].font_size, 28.0);
        assert_eq!(secondary.runs[1].text, "For God so loved");
        assert_eq!(secondary.runs[1].font_size, 28.0);
        assert_eq!(secondary.space_before, Some(12.0));

        assert!(block.word_wrap);
        assert!(block.auto_fit);
        assert!(block
            .paragraphs
            .iter()
            .flat_map(|p| &p.runs)
            .all(|r| r.font_name == "Batang"));
    }

    #[test]
    fn test_format_unknown_book_falls_back() {
        let locator = Locator::new("Genesis", 1, 1);
        let verse = ResolvedVerse {
            locator: &locator,
            primary: "A",
            secondary: "B",
            book_eng: None,
        };
        let block = VerseBlockFormatter::new(style()).format(&verse);
        assert_eq!(block.paragraphs[0].plain_text(), "Genesis 1:1 A");
        assert_eq!(block.paragraphs[1].plain_text(), "Genesis 1:1 B");
    }
}
