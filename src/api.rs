//! Public API Types
//!
//! 公開APIで使用する列挙型と設定型を定義するモジュール。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use crate::error::VerseDeckError;

/// 翻訳（言語タグ）
///
/// コーパスの各節レコードから取り出すテキストフィールドを選択します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Language {
    /// 한글킹제임스 (Korean King James Version)
    Kkjv,

    /// New International Version
    Niv,

    /// Ngayok
    Ngayok,
}

impl Language {
    /// サポートされているすべての言語
    pub const ALL: [Language; 3] = [Language::Kkjv, Language::Niv, Language::Ngayok];

    /// コーパスのフィールド名として使用されるタグ
    ///
    /// ```rust
    /// use versedeck::Language;
    ///
    /// assert_eq!(Language::Niv.tag(), "niv");
    /// ```
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Kkjv => "kkjv",
            Language::Niv => "niv",
            Language::Ngayok => "ngayok",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = VerseDeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.tag().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                VerseDeckError::Config(format!(
                    "Unknown language tag '{}' (expected one of: kkjv, niv, ngayok)",
                    s
                ))
            })
    }
}

/// スライドの書式設定
///
/// `template/slide_format.json`の`"default"`レコードから読み込みます。
///
/// ```json
/// { "default": { "font_name": "맑은 고딕", "font_size": 28 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideStyle {
    /// フォント名
    pub font_name: String,

    /// 第1言語のフォントサイズ（ポイント）。第2言語は2ポイント小さくなります。
    pub font_size: f64,
}

#[derive(Deserialize)]
struct StyleFile {
    default: SlideStyle,
}

impl Default for SlideStyle {
    fn default() -> Self {
        Self {
            font_name: "Malgun Gothic".to_string(),
            font_size: 28.0,
        }
    }
}

impl SlideStyle {
    /// 第2言語との差（ポイント）
    pub const SECONDARY_SIZE_DELTA: f64 = 2.0;

    /// 第2言語のフォントサイズ
    pub fn secondary_font_size(&self) -> f64 {
        self.font_size - Self::SECONDARY_SIZE_DELTA
    }

    /// スタイル設定ファイルを読み込む
    ///
    /// # 戻り値
    ///
    /// * `Ok(SlideStyle)` - `"default"`レコードの読み込みに成功した場合
    /// * `Err(VerseDeckError)` - ファイルが開けない、またはJSONが不正な場合
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, VerseDeckError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// リーダーからスタイル設定を読み込む
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, VerseDeckError> {
        let file: StyleFile = serde_json::from_reader(reader)?;
        Ok(file.default)
    }
}

/// テキストボックスの配置（EMU単位）
///
/// デフォルト値は左1.0インチ、上2.0インチ、幅11.33インチ、高さ4.5インチです。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideGeometry {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl SlideGeometry {
    /// 1インチあたりのEMU
    pub const EMU_PER_INCH: i64 = 914_400;

    /// インチ単位で配置を指定する
    pub fn from_inches(left: f64, top: f64, width: f64, height: f64) -> Self {
        let emu = |inches: f64| (inches * Self::EMU_PER_INCH as f64).round() as i64;
        Self {
            left: emu(left),
            top: emu(top),
            width: emu(width),
            height: emu(height),
        }
    }
}

impl Default for SlideGeometry {
    fn default() -> Self {
        Self::from_inches(1.0, 2.0, 11.33, 4.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_str() {
        assert_eq!("kkjv".parse::<Language>().unwrap(), Language::Kkjv);
        assert_eq!("NIV".parse::<Language>().unwrap(), Language::Niv);
        assert_eq!(" ngayok ".parse::<Language>().unwrap(), Language::Ngayok);
    }

    #[test]
    fn test_language_from_str_unknown() {
        match "esv".parse::<Language>() {
            Err(VerseDeckError::Config(msg)) => assert!(msg.contains("esv")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_language_display_matches_tag() {
        for lang in Language::ALL {
            assert_eq!(lang.to_string(), lang.tag());
        }
    }

    #[test]
    fn test_style_from_reader() {
        let json = r#"{"default": {"font_name": "Batang", "font_size": 32}}"#;
        let style = SlideStyle::from_reader(json.as_bytes()).unwrap();
        assert_eq!(style.font_name, "Batang");
        assert_eq!(style.font_size, 32.0);
        assert_eq!(style.secondary_font_size(), 30.0);
    }

    #[test]
    fn test_style_missing_default_record() {
        let json = r#"{"title": {"font_name": "Batang", "font_size": 32}}"#;
        assert!(matches!(
            SlideStyle::from_reader(json.as_bytes()),
            Err(VerseDeckError::Json(_))
        ));
    }

    #[test]
    fn test_default_geometry_in_emu() {
        let geometry = SlideGeometry::default();
        assert_eq!(geometry.left, 914_400);
        assert_eq!(geometry.top, 1_828_800);
        assert_eq!(geometry.width, 10_360_152);
        assert_eq!(geometry.height, 4_114_800);
    }
}
