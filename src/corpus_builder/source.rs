//! Verse Table Sources
//!
//! 言語ごとの本文テーブル（`BOOK`、`TCHP`、`CONTENT`の3列）を行単位で読み込む。

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use crate::error::VerseDeckError;
use crate::security::SecurityConfig;

/// 本文テーブルの1行（1章分）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRow {
    /// 書名（前後の空白を除去済み）
    pub book: String,
    /// 章番号（`TCHP`列）
    pub chapter: u32,
    /// 節マーカー付きの本文
    pub content: String,
}

impl VerseRow {
    pub fn new(book: impl Into<String>, chapter: u32, content: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            chapter,
            content: content.into(),
        }
    }
}

/// 本文テーブルの読み込み元
pub trait VerseTableSource {
    /// 全行を読み込む
    fn rows(&mut self) -> Result<Vec<VerseRow>, VerseDeckError>;

    /// ログ用の名前
    fn describe(&self) -> String;
}

impl VerseTableSource for Vec<VerseRow> {
    fn rows(&mut self) -> Result<Vec<VerseRow>, VerseDeckError> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory rows", self.len())
    }
}

/// calamineで読めるワークブック（xlsx、xls、xlsb、ods）のシート
///
/// 1行目以降で最初に`BOOK`、`TCHP`、`CONTENT`をすべて含む行をヘッダーとし
/// （大文字小文字は区別しない、列の順序は自由）、それ以降の行を読み込みます。
#[derive(Debug, Clone)]
pub struct WorkbookTableSource {
    path: PathBuf,
    table: String,
}

/// ヘッダー行における各列の位置
#[derive(Debug, Clone, Copy)]
struct Columns {
    book: usize,
    chapter: usize,
    content: usize,
}

impl Columns {
    fn detect(row: &[Data]) -> Option<Self> {
        let position = |name: &str| {
            row.iter().position(|cell| match cell {
                Data::String(s) => s.trim().eq_ignore_ascii_case(name),
                _ => false,
            })
        };
        Some(Self {
            book: position("BOOK")?,
            chapter: position("TCHP")?,
            content: position("CONTENT")?,
        })
    }
}

impl WorkbookTableSource {
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn read_workbook(&self) -> Result<Vec<u8>, VerseDeckError> {
        let security_config = SecurityConfig::default();
        let file = File::open(&self.path)?;
        security_config.check_input_size(file.metadata()?.len())?;

        let mut buffer = Vec::new();
        BufReader::new(file).read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

impl VerseTableSource for WorkbookTableSource {
    fn rows(&mut self) -> Result<Vec<VerseRow>, VerseDeckError> {
        let buffer = self.read_workbook()?;
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        let range = workbook.worksheet_range(&self.table)?;

        let mut rows = range.rows().enumerate();
        let columns = rows
            .by_ref()
            .find_map(|(_, row)| Columns::detect(row))
            .ok_or_else(|| {
                VerseDeckError::CorpusFormat(format!(
                    "Table '{}' has no BOOK/TCHP/CONTENT header",
                    self.table
                ))
            })?;

        let mut verse_rows = Vec::new();
        for (idx, row) in rows {
            let cell = |col: usize| row.get(col).unwrap_or(&Data::Empty);
            let book = cell_text(cell(columns.book));
            let content = cell_text(cell(columns.content));
            if book.is_empty() && content.is_empty() {
                continue;
            }

            let chapter = cell_chapter(cell(columns.chapter)).ok_or_else(|| {
                VerseDeckError::CorpusFormat(format!(
                    "Invalid TCHP value in table '{}' row {}: {:?}",
                    self.table,
                    idx + 1,
                    cell(columns.chapter)
                ))
            })?;

            verse_rows.push(VerseRow {
                book,
                chapter,
                content,
            });
        }

        Ok(verse_rows)
    }

    fn describe(&self) -> String {
        format!("{}#{}", self.path.display(), self.table)
    }
}

/// セルの文字列（前後の空白を除去）
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// `TCHP`セルを章番号として解釈
fn cell_chapter(cell: &Data) -> Option<u32> {
    match cell {
        Data::Int(i) => u32::try_from(*i).ok(),
        Data::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64 => Some(*f as u32),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_columns_any_order() {
        let header = vec![
            Data::String("content".to_string()),
            Data::String(" Book ".to_string()),
            Data::String("TCHP".to_string()),
        ];
        let columns = Columns::detect(&header).unwrap();
        assert_eq!(columns.book, 1);
        assert_eq!(columns.chapter, 2);
        assert_eq!(columns.content, 0);

        let incomplete = vec![Data::String("BOOK".to_string()), Data::Empty];
        assert!(Columns::detect(&incomplete).is_none());
    }

    #[test]
    fn test_cell_chapter() {
        assert_eq!(cell_chapter(&Data::Int(3)), Some(3));
        assert_eq!(cell_chapter(&Data::Int(-1)), None);
        assert_eq!(cell_chapter(&Data::Float(12.0)), Some(12));
        assert_eq!(cell_chapter(&Data::Float(1.5)), None);
        assert_eq!(cell_chapter(&Data::String(" 7 ".to_string())), Some(7));
        assert_eq!(cell_chapter(&Data::String("seven".to_string())), None);
        assert_eq!(cell_chapter(&Data::Empty), None);
    }

    #[test]
    fn test_cell_text_trims() {
        assert_eq!(cell_text(&Data::String("  창세기 ".to_string())), "창세기");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_missing_workbook() {
        let mut source = WorkbookTableSource::new("does/not/exist.xlsx", "KKJVDB");
        assert!(matches!(source.rows(), Err(VerseDeckError::Io(_))));
        assert_eq!(source.describe(), "does/not/exist.xlsx#KKJVDB");
    }
}
