//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 節の完全な所在（書名、章、節）
///
/// 参照パーサーが生成し、リゾルバーが消費します。
/// 同じ値を持つロケーター同士は区別されません。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locator {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl Locator {
    /// 新しいロケーターを生成
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
        }
    }

    /// コーパスの章キー（10進数字列）
    pub fn chapter_key(&self) -> String {
        self.chapter.to_string()
    }

    /// コーパスの節キー（10進数字列）
    pub fn verse_key(&self) -> String {
        self.verse.to_string()
    }
}

/// `"<書名> <章>:<節>"`形式で表示
impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// コーパスの1節分のレコード
///
/// 言語タグごとのテキストと、英語の書名（`book_eng`）を保持します。
/// JSON上はフラットなオブジェクトです。
///
/// ```json
/// { "kkjv": "태초에 ...", "niv": "In the beginning ...", "book_eng": "Genesis" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    /// 英語の書名（手書きのコーパスでは省略可能）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_eng: Option<String>,

    /// 言語タグ -> 本文
    #[serde(flatten)]
    pub texts: BTreeMap<String, String>,
}

impl VerseRecord {
    /// 指定した言語タグの本文を取得
    pub fn text(&self, tag: &str) -> Option<&str> {
        self.texts.get(tag).map(|s| s.as_str())
    }
}

/// 2言語分の本文が揃った節
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVerse<'a> {
    pub locator: &'a Locator,
    pub primary: &'a str,
    pub secondary: &'a str,
    /// コーパスに記録された英語の書名
    pub book_eng: Option<&'a str>,
}

/// テキストの1区間（同じ書式の文字列）
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    /// ポイント
    pub font_size: f64,
    pub font_name: String,
}

/// 段落
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    /// 段落前の間隔（ポイント）
    pub space_before: Option<f64>,
}

impl Paragraph {
    /// 段落内の全テキストを連結
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// スライド1枚分のテキストブロック
///
/// スライドシンクに渡される唯一の単位です。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    pub paragraphs: Vec<Paragraph>,
    pub word_wrap: bool,
    /// テキストに合わせて図形のサイズを自動調整する
    pub auto_fit: bool,
}
