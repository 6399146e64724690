//! Verse Resolver Module
//!
//! ロケーターと2つの言語タグから、コーパスの本文ペアを取り出す。
//! 節や言語フィールドが欠けている場合はスキップとして扱い、エラーにはしない。

use log::debug;

use crate::api::Language;
use crate::corpus::Corpus;
use crate::types::{Locator, ResolvedVerse};

/// ロケーターを本文ペアに解決する
///
/// # 戻り値
///
/// * `Some(ResolvedVerse)` - 節と両方の言語の本文が存在する場合
/// * `None` - 節、またはいずれかの言語の本文が存在しない場合（スキップ）
///
/// # 使用例
///
/// ```rust
/// use versedeck::{resolve, Corpus, Language, Locator};
///
/// # fn main() -> Result<(), versedeck::VerseDeckError> {
/// let corpus = Corpus::from_reader(r#"{"Genesis":{"1":{"1":{"kkjv":"A","niv":"B"}}}}"#.as_bytes())?;
/// let locator = Locator::new("Genesis", 1, 1);
/// let verse = resolve(&locator, &corpus, Language::Kkjv, Language::Niv).unwrap();
/// assert_eq!((verse.primary, verse.secondary), ("A", "B"));
/// assert!(resolve(&locator, &corpus, Language::Kkjv, Language::Ngayok).is_none());
/// # Ok(())
/// # }
/// ```
pub fn resolve<'a>(
    locator: &'a Locator,
    corpus: &'a Corpus,
    primary: Language,
    secondary: Language,
) -> Option<ResolvedVerse<'a>> {
    let Some(record) = corpus.verse(locator) else {
        debug!("Skipping {}: verse not in corpus", locator);
        return None;
    };

    match (record.text(primary.tag()), record.text(secondary.tag())) {
        (Some(primary_text), Some(secondary_text)) => Some(ResolvedVerse {
            locator,
            primary: primary_text,
            secondary: secondary_text,
            book_eng: record.book_eng.as_deref(),
        }),
        _ => {
            debug!(
                "Skipping {}: missing '{}' or '{}' text",
                locator, primary, secondary
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        let json = r#"{
            "창세기": {"1": {
                "1": {"kkjv": "태초에", "niv": "In the beginning", "ngayok": "N1", "book_eng": "Genesis"},
                "2": {"kkjv": "땅이", "niv": "Now the earth"}
            }}
        }"#;
        Corpus::from_reader(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_resolve_present_verse() {
        let corpus = corpus();
        let locator = Locator::new("창세기", 1, 1);
        let verse = resolve(&locator, &corpus, Language::Ngayok, Language::Niv).unwrap();
        assert_eq!(verse.primary, "N1");
        assert_eq!(verse.secondary, "In the beginning");
        assert_eq!(verse.book_eng, Some("Genesis"));
        assert_eq!(verse.locator, &locator);
    }

    #[test]
    fn test_resolve_missing_language_is_skipped() {
        let corpus = corpus();
        let locator = Locator::new("창세기", 1, 2);
        assert!(resolve(&locator, &corpus, Language::Ngayok, Language::Niv).is_none());
        assert!(resolve(&locator, &corpus, Language::Kkjv, Language::Ngayok).is_none());
        assert!(resolve(&locator, &corpus, Language::Kkjv, Language::Niv).is_some());
    }

    #[test]
    fn test_resolve_missing_verse_is_skipped() {
        let corpus = corpus();
        for locator in [
            Locator::new("창세기", 1, 3),
            Locator::new("창세기", 2, 1),
            Locator::new("출애굽기", 1, 1),
        ] {
            assert!(resolve(&locator, &corpus, Language::Kkjv, Language::Niv).is_none());
        }
    }

    #[test]
    fn test_resolve_same_language_twice() {
        let corpus = corpus();
        let locator = Locator::new("창세기", 1, 1);
        let verse = resolve(&locator, &corpus, Language::Kkjv, Language::Kkjv).unwrap();
        assert_eq!(verse.primary, verse.secondary);
    }
}
