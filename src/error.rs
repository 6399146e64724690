//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// versedeckクレート全体で使用するエラー型
///
/// 参照文字列の解析、コーパスの読み込み、スライド生成、コーパス構築の
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Validation`: ユーザー入力の検証エラー（参照が見つからない、文書未指定）
/// - `MissingCorpusKey`: 章をまたぐ範囲の展開時に書名・章がコーパスに存在しない
/// - `Io` / `Zip` / `Xml`: 文書・ファイルの読み書きエラー
/// - `DuplicateVerse` / `AmbiguousMarker`: コーパス構築時に拒否された節マーカー
///
/// 節や言語フィールドの欠落はエラーではなく、スキップとして扱われます。
///
/// # 使用例
///
/// ```rust,no_run
/// use versedeck::{Corpus, VerseDeckError};
///
/// fn load(path: &str) -> Result<Corpus, VerseDeckError> {
///     let corpus = Corpus::from_path(path)?;
///     Ok(corpus)
/// }
/// ```
#[derive(Error, Debug)]
pub enum VerseDeckError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSONの解析・書き込みエラー（コーパス、スタイル設定）
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// レガシー表データの解析中に発生したエラー（calamine由来）
    #[error("Failed to read verse table: {0}")]
    Parse(#[from] calamine::Error),

    /// PPTXパッケージ（ZIPアーカイブ）のエラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// PPTXパッケージ内のXMLのエラー
    #[error("XML error: {0}")]
    Xml(String),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `GeneratorBuilder::build()`時、またはスタイル設定ファイルの読み込み時に
    /// 無効な設定が検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// ユーザー入力の検証エラー
    ///
    /// 参照文字列から節が1つも見つからない場合などに発生します。
    /// 副作用なしで処理を中断します。
    ///
    /// ```rust,no_run
    /// use versedeck::VerseDeckError;
    ///
    /// let error = VerseDeckError::Validation("No valid verses found.".to_string());
    /// assert_eq!(error.to_string(), "No valid verses found.");
    /// ```
    #[error("{0}")]
    Validation(String),

    /// コーパスに書名または章が存在しない
    ///
    /// 章をまたぐ範囲の展開で章の節数を取得する必要がある場合にのみ発生します。
    /// `chapter`が`None`の場合は書名そのものが存在しません。
    #[error("Verse not found: book '{book}'{}", chapter_suffix(.chapter))]
    MissingCorpusKey {
        /// 書名
        book: String,
        /// 章（書名が存在しない場合は`None`）
        chapter: Option<u32>,
    },

    /// コーパスファイルの構造が不正
    ///
    /// 章・節のキーが10進数字列でない場合などに発生します。
    #[error("Malformed corpus: {0}")]
    CorpusFormat(String),

    /// 同じ節が同じ言語で2回出現した
    #[error("Duplicate verse marker {chapter}:{verse} in '{book}' for language '{language}'")]
    DuplicateVerse {
        book: String,
        chapter: u32,
        verse: u32,
        language: String,
    },

    /// 節マーカーの章が行の章番号と一致しない
    #[error("Verse marker {marker} in '{book}' does not belong to chapter {chapter}")]
    AmbiguousMarker {
        book: String,
        chapter: u32,
        marker: String,
    },

    /// セキュリティ制限に違反したエラー
    ///
    /// PPTXパッケージのエントリ数、サイズ、パスの検証に失敗した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

fn chapter_suffix(chapter: &Option<u32>) -> String {
    match chapter {
        Some(c) => format!(", chapter {}", c),
        None => String::new(),
    }
}

impl From<zip::result::ZipError> for VerseDeckError {
    fn from(e: zip::result::ZipError) -> Self {
        VerseDeckError::Zip(e.to_string())
    }
}

impl From<quick_xml::Error> for VerseDeckError {
    fn from(e: quick_xml::Error) -> Self {
        VerseDeckError::Xml(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: VerseDeckError = io_err.into();

        match error {
            VerseDeckError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let error: VerseDeckError = calamine::Error::Msg("Corrupted file").into();
        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to read verse table"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: VerseDeckError = json_err.into();
        assert!(matches!(error, VerseDeckError::Json(_)));
        assert!(error.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_validation_error_is_plain_message() {
        let error = VerseDeckError::Validation("No valid verses found.".to_string());
        assert_eq!(error.to_string(), "No valid verses found.");
    }

    #[test]
    fn test_missing_corpus_key_display() {
        let error = VerseDeckError::MissingCorpusKey {
            book: "이사야".to_string(),
            chapter: Some(2),
        };
        assert_eq!(error.to_string(), "Verse not found: book '이사야', chapter 2");

        let error = VerseDeckError::MissingCorpusKey {
            book: "Tobit".to_string(),
            chapter: None,
        };
        assert_eq!(error.to_string(), "Verse not found: book 'Tobit'");
    }

    #[test]
    fn test_duplicate_verse_display() {
        let error = VerseDeckError::DuplicateVerse {
            book: "창세기".to_string(),
            chapter: 1,
            verse: 3,
            language: "kkjv".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("1:3"));
        assert!(msg.contains("kkjv"));
    }

    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), VerseDeckError> {
            let _file = std::fs::File::open("nonexistent_file.pptx")?;
            Ok(())
        }

        match io_operation() {
            Err(VerseDeckError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }
}
