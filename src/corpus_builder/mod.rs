//! Corpus Builder Module
//!
//! 言語ごとの本文テーブルを節単位に分割し、1つの多言語コーパスに統合するモジュール。

mod blob;
mod source;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::Language;
use crate::book_alias::english_book_name;
use crate::corpus::{BookChapters, ChapterVerses, Corpus};
use crate::error::VerseDeckError;
use crate::types::VerseRecord;

pub use source::{VerseRow, VerseTableSource, WorkbookTableSource};

/// 読み込み元の指定（`<言語>=<パス>[#<テーブル>]`）
///
/// テーブル名を省略した場合は、ファイル名の拡張子を除いた部分を大文字にしたものを使用します
/// （`kkjvdb.xlsx` -> `KKJVDB`）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub language: Language,
    pub path: PathBuf,
    pub table: String,
}

impl SourceSpec {
    /// テーブル名をファイル名から導出して生成
    pub fn new(language: Language, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let table = default_table_name(&path);
        Self {
            language,
            path,
            table,
        }
    }

    /// テーブル名を指定する
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}

fn default_table_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_uppercase())
        .unwrap_or_default()
}

impl FromStr for SourceSpec {
    type Err = VerseDeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (language, location) = s.split_once('=').ok_or_else(|| {
            VerseDeckError::Config(format!(
                "Invalid source '{}': expected <LANG>=<PATH>[#TABLE]",
                s
            ))
        })?;
        let language: Language = language.parse()?;

        let spec = match location.rsplit_once('#') {
            Some((path, table)) if !table.trim().is_empty() => {
                SourceSpec::new(language, path).with_table(table.trim())
            }
            _ => SourceSpec::new(language, location),
        };
        if spec.path.as_os_str().is_empty() {
            return Err(VerseDeckError::Config(format!("Invalid source '{}': empty path", s)));
        }
        Ok(spec)
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}#{}", self.language, self.path.display(), self.table)
    }
}

/// コーパスの明示的なビルダー
///
/// 観測されたキーのみを追加します。
/// 同じ（書名、章、節、言語）の重複と、行の章番号と食い違うマーカーはエラーです。
///
/// # 使用例
///
/// ```rust
/// use versedeck::{CorpusBuilder, Language, VerseRow};
///
/// # fn main() -> Result<(), versedeck::VerseDeckError> {
/// let mut builder = CorpusBuilder::new();
/// builder.add_row(Language::Kkjv, &VerseRow::new("창세기", 1, "1:1 태초에 1:2 땅이"))?;
/// builder.add_row(Language::Niv, &VerseRow::new("창세기", 1, "1:1 In the beginning"))?;
/// let corpus = builder.finish();
/// assert_eq!(corpus.verse_count(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    /// 書名 -> 章 -> 節 -> レコード
    books: BTreeMap<String, BTreeMap<u32, BTreeMap<u32, VerseRecord>>>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1節分の本文を追加する
    ///
    /// # 戻り値
    ///
    /// * `Err(VerseDeckError::DuplicateVerse)` - 同じ節・言語の本文が既にある場合
    pub fn insert(
        &mut self,
        language: Language,
        book: &str,
        chapter: u32,
        verse: u32,
        text: impl Into<String>,
    ) -> Result<(), VerseDeckError> {
        let record = self
            .books
            .entry(book.to_string())
            .or_default()
            .entry(chapter)
            .or_default()
            .entry(verse)
            .or_default();

        if record.texts.contains_key(language.tag()) {
            return Err(VerseDeckError::DuplicateVerse {
                book: book.to_string(),
                chapter,
                verse,
                language: language.tag().to_string(),
            });
        }
        record.texts.insert(language.tag().to_string(), text.into());
        Ok(())
    }

    /// テーブルの1行を節に分割して追加し、追加した節の数を返す
    pub fn add_row(&mut self, language: Language, row: &VerseRow) -> Result<usize, VerseDeckError> {
        let verses = blob::split_verses(&row.content)?;
        for verse in &verses {
            if verse.chapter != row.chapter {
                return Err(VerseDeckError::AmbiguousMarker {
                    book: row.book.clone(),
                    chapter: row.chapter,
                    marker: verse.marker.to_string(),
                });
            }
            self.insert(language, &row.book, verse.chapter, verse.verse, verse.text)?;
        }
        Ok(verses.len())
    }

    /// 読み込み元の全行を追加し、追加した節の数を返す
    pub fn add_source<S: VerseTableSource + ?Sized>(
        &mut self,
        language: Language,
        source: &mut S,
    ) -> Result<usize, VerseDeckError> {
        let rows = source.rows()?;
        let mut count = 0;
        for row in &rows {
            count += self.add_row(language, row)?;
        }
        log::info!(
            "Read {} rows ({} verses) of {} from {}",
            rows.len(),
            count,
            language,
            source.describe()
        );
        Ok(count)
    }

    /// 各レコードに英語の書名を設定し、コーパスを完成させる
    ///
    /// 別名表に無い書名の`book_eng`は空文字列になります。
    pub fn finish(self) -> Corpus {
        let books = self
            .books
            .into_iter()
            .map(|(book, chapters)| {
                let english = english_book_name(&book).unwrap_or_default().to_string();
                let chapters: BookChapters = chapters
                    .into_iter()
                    .map(|(chapter, verses)| {
                        let verses: ChapterVerses = verses
                            .into_iter()
                            .map(|(verse, mut record)| {
                                record.book_eng = Some(english.clone());
                                (verse.to_string(), record)
                            })
                            .collect();
                        (chapter.to_string(), verses)
                    })
                    .collect();
                (book, chapters)
            })
            .collect();
        Corpus::from_books(books)
    }
}

/// 指定された全読み込み元からコーパスを構築する
///
/// # 使用例
///
/// ```rust,no_run
/// use versedeck::{build_corpus, SourceSpec};
///
/// # fn main() -> Result<(), versedeck::VerseDeckError> {
/// let sources: Vec<SourceSpec> = vec!["kkjv=legacy/kkjvdb.xlsx".parse()?, "niv=legacy/nivdb.xlsx".parse()?];
/// let corpus = build_corpus(&sources)?;
/// corpus.write_to_path("bible_data/bible_combined.json")?;
/// # Ok(())
/// # }
/// ```
pub fn build_corpus(sources: &[SourceSpec]) -> Result<Corpus, VerseDeckError> {
    let mut builder = CorpusBuilder::new();
    for spec in sources {
        let mut source = WorkbookTableSource::new(&spec.path, &spec.table);
        builder.add_source(spec.language, &mut source)?;
    }

    let corpus = builder.finish();
    log::info!(
        "Built corpus with {} books and {} verses",
        corpus.book_count(),
        corpus.verse_count()
    );
    Ok(corpus)
}
