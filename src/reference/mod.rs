//! Reference Parser Module
//!
//! 自由形式の引用文字列（例: `"이사야 1:1-2:3"`）を、順序付きのロケーター列に展開する。
//!
//! 処理は3段階に分かれます。
//!
//! 1. ダッシュ記号の正規化とトークン化（[`tokens`]）
//! 2. 文法に一致する断片の抽出と分類（[`grammar`]）
//! 3. 断片ごとの範囲展開（章をまたぐ場合はコーパスから節数を取得）

mod grammar;
mod tokens;

pub use grammar::{Fragment, RangeSpec};
pub use tokens::normalize_dashes;

use log::debug;

use crate::corpus::Corpus;
use crate::error::VerseDeckError;
use crate::types::Locator;

/// 参照文字列から断片を取り出す（展開は行わない）
///
/// ```rust
/// use versedeck::{parse_fragments, RangeSpec};
///
/// let fragments = parse_fragments("창세기 1:1\u{2013}3");
/// assert_eq!(fragments[0].range, RangeSpec::SameChapter { end_verse: 3 });
/// ```
pub fn parse_fragments(reference: &str) -> Vec<Fragment> {
    let normalized = normalize_dashes(reference);
    let tokens = tokens::tokenize(&normalized);
    grammar::scan_fragments(&tokens)
}

/// 参照文字列を解析し、ロケーター列に展開する
///
/// # 引数
///
/// * `reference` - ユーザーが入力した参照文字列
/// * `corpus` - 章をまたぐ範囲で途中の章の節数を調べるためのコーパス
///
/// # 戻り値
///
/// * `Ok(Vec<Locator>)` - 入力順に連結したロケーター列。一致する断片がなければ空
/// * `Err(VerseDeckError::MissingCorpusKey)` - 節数の取得に必要な書名・章がない場合
///
/// 重なる断片があっても重複は除去しません。
///
/// # 使用例
///
/// ```rust
/// use versedeck::{parse_reference, Corpus, Locator};
///
/// # fn main() -> Result<(), versedeck::VerseDeckError> {
/// let corpus = Corpus::default();
/// let locators = parse_reference("Genesis 1:1-3", &corpus)?;
/// assert_eq!(locators.len(), 3);
/// assert_eq!(locators[2], Locator::new("Genesis", 1, 3));
/// # Ok(())
/// # }
/// ```
pub fn parse_reference(reference: &str, corpus: &Corpus) -> Result<Vec<Locator>, VerseDeckError> {
    let fragments = parse_fragments(reference);
    debug!(
        "Found {} fragment(s) in reference '{}'",
        fragments.len(),
        reference
    );

    let mut locators = Vec::new();
    for fragment in &fragments {
        fragment.expand_into(corpus, &mut locators)?;
    }
    Ok(locators)
}

/// 範囲の終わりを章の最後の節で打ち切る（章がコーパスに無い場合はそのまま）
fn clamp_to_chapter(corpus: &Corpus, book: &str, chapter: u32, end_verse: u32) -> u32 {
    match corpus.last_verse(book, chapter) {
        Some(last) => end_verse.min(last),
        None => end_verse,
    }
}

impl Fragment {
    /// 断片を展開し、ロケーターを`out`に追加する
    pub fn expand_into(
        &self,
        corpus: &Corpus,
        out: &mut Vec<Locator>,
    ) -> Result<(), VerseDeckError> {
        match self.range {
            RangeSpec::Single => {
                out.push(Locator::new(self.book.as_str(), self.chapter, self.verse));
            }

            RangeSpec::SameChapter { end_verse } => {
                let last = clamp_to_chapter(corpus, &self.book, self.chapter, end_verse);
                out.extend(
                    (self.verse..=last).map(|v| Locator::new(self.book.as_str(), self.chapter, v)),
                );
            }

            RangeSpec::CrossChapter {
                end_chapter,
                end_verse,
            } => {
                for chapter in self.chapter..=end_chapter {
                    let first = if chapter == self.chapter { self.verse } else { 1 };
                    let last = if chapter == end_chapter {
                        clamp_to_chapter(corpus, &self.book, chapter, end_verse)
                    } else {
                        let len = corpus.chapter_len(&self.book, chapter)?;
                        u32::try_from(len).unwrap_or(u32::MAX)
                    };
                    out.extend(
                        (first..=last).map(|v| Locator::new(self.book.as_str(), chapter, v)),
                    );
                }
            }
        }
        Ok(())
    }

    /// 断片を展開したロケーター列
    pub fn expand(&self, corpus: &Corpus) -> Result<Vec<Locator>, VerseDeckError> {
        let mut out = Vec::new();
        self.expand_into(corpus, &mut out)?;
        Ok(out)
    }
}
