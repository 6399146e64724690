//! Corpus Module
//!
//! 多言語の節データ（書名 → 章 → 節 → レコード）を保持するモジュール。
//! 起動時に1回だけ読み込み、生成処理中は読み取り専用として扱う。

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::VerseDeckError;
use crate::types::{Locator, VerseRecord};

/// 節番号 -> レコード
pub type ChapterVerses = BTreeMap<String, VerseRecord>;

/// 章番号 -> 節
pub type BookChapters = BTreeMap<String, ChapterVerses>;

/// 統合済みの多言語コーパス
///
/// JSONとしては`{"<書名>": {"<章>": {"<節>": {...}}}}`の入れ子構造です。
/// 章・節のキーは常に10進数字列です。
///
/// # 使用例
///
/// ```rust
/// use versedeck::{Corpus, Locator};
///
/// # fn main() -> Result<(), versedeck::VerseDeckError> {
/// let json = r#"{"Genesis":{"1":{"1":{"kkjv":"A","niv":"B"}}}}"#;
/// let corpus = Corpus::from_reader(json.as_bytes())?;
/// let record = corpus.verse(&Locator::new("Genesis", 1, 1)).unwrap();
/// assert_eq!(record.text("niv"), Some("B"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    books: BTreeMap<String, BookChapters>,
}

impl Corpus {
    /// ファイルからコーパスを読み込む
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, VerseDeckError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let corpus = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded corpus from {} ({} books)",
            path.display(),
            corpus.book_count()
        );
        Ok(corpus)
    }

    /// リーダーからコーパスを読み込み、キーの形式を検証する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Corpus)` - 読み込みに成功した場合
    /// * `Err(VerseDeckError::Json)` - JSONが不正な場合
    /// * `Err(VerseDeckError::CorpusFormat)` - 章・節のキーが10進数字列でない場合
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, VerseDeckError> {
        let corpus: Corpus = serde_json::from_reader(reader)?;
        corpus.validate_keys()?;
        Ok(corpus)
    }

    /// 整形済みJSONとして書き出す（UTF-8、非ASCII文字はエスケープしない）
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), VerseDeckError> {
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// ファイルに書き出す。親ディレクトリが存在しない場合は作成する。
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), VerseDeckError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.to_writer(File::create(path)?)
    }

    fn validate_keys(&self) -> Result<(), VerseDeckError> {
        fn is_decimal(key: &str) -> bool {
            !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
        }

        for (book, chapters) in &self.books {
            for (chapter, verses) in chapters {
                if !is_decimal(chapter) {
                    return Err(VerseDeckError::CorpusFormat(format!(
                        "chapter key '{}' in book '{}' is not a decimal number",
                        chapter, book
                    )));
                }
                if let Some(verse) = verses.keys().find(|v| !is_decimal(v)) {
                    return Err(VerseDeckError::CorpusFormat(format!(
                        "verse key '{}' in {} {} is not a decimal number",
                        verse, book, chapter
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn from_books(books: BTreeMap<String, BookChapters>) -> Self {
        Self { books }
    }

    /// 書名の数
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// すべての節の数
    pub fn verse_count(&self) -> usize {
        self.books
            .values()
            .flat_map(|chapters| chapters.values())
            .map(|verses| verses.len())
            .sum()
    }

    /// すべての書名
    pub fn book_names(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(|s| s.as_str())
    }

    /// 書を取得
    pub fn book(&self, book: &str) -> Option<&BookChapters> {
        self.books.get(book)
    }

    /// 章を取得
    pub fn chapter(&self, book: &str, chapter: u32) -> Option<&ChapterVerses> {
        self.books.get(book)?.get(&chapter.to_string())
    }

    /// 節のレコードを取得
    pub fn verse(&self, locator: &Locator) -> Option<&VerseRecord> {
        self.chapter(&locator.book, locator.chapter)?
            .get(&locator.verse_key())
    }

    /// 章の最後の節番号（書名または章が無い場合は`None`）
    pub fn last_verse(&self, book: &str, chapter: u32) -> Option<u32> {
        self.chapter(book, chapter)?
            .keys()
            .filter_map(|verse| verse.parse::<u32>().ok())
            .max()
    }

    /// 章に含まれる節の数
    ///
    /// 章をまたぐ範囲の展開で、途中の章の最終節を決めるために使用します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(usize)` - 章のエントリ数
    /// * `Err(VerseDeckError::MissingCorpusKey)` - 書名または章が存在しない場合
    pub fn chapter_len(&self, book: &str, chapter: u32) -> Result<usize, VerseDeckError> {
        let chapters = self
            .books
            .get(book)
            .ok_or_else(|| VerseDeckError::MissingCorpusKey {
                book: book.to_string(),
                chapter: None,
            })?;
        chapters
            .get(&chapter.to_string())
            .map(|verses| verses.len())
            .ok_or_else(|| VerseDeckError::MissingCorpusKey {
                book: book.to_string(),
                chapter: Some(chapter),
            })
    }
}
