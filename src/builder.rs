//! Builder Module
//!
//! Fluent Builder APIを提供し、`Generator`インスタンスを段階的に構築する。

use std::path::Path;

use crate::api::{Language, SlideGeometry, SlideStyle};
use crate::corpus::Corpus;
use crate::error::VerseDeckError;
use crate::output::{SlideSink, VerseBlockFormatter};
use crate::presentation::{Presentation, DEFAULT_LAYOUT_INDEX};
use crate::reference::parse_reference;
use crate::resolver::resolve;
use crate::types::Locator;

/// 生成処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct GenerationConfig {
    /// スライドの書式
    pub style: SlideStyle,

    /// 上段（第1言語）
    pub primary: Language,

    /// 下段（第2言語）
    pub secondary: Language,

    /// 最初のスライドマスター内のレイアウト番号
    pub layout_index: usize,

    /// テキストボックスの配置
    pub geometry: SlideGeometry,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            style: SlideStyle::default(),
            primary: Language::Ngayok,
            secondary: Language::Niv,
            layout_index: DEFAULT_LAYOUT_INDEX,
            geometry: SlideGeometry::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Generator`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use versedeck::{GeneratorBuilder, Language, SlideStyle};
///
/// # fn main() -> Result<(), versedeck::VerseDeckError> {
/// let generator = GeneratorBuilder::new()
///     .with_style(SlideStyle::from_path("template/slide_format.json")?)
///     .with_languages(Language::Kkjv, Language::Niv)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GeneratorBuilder {
    /// 内部設定（構築中）
    config: GenerationConfig,
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 書式: Malgun Gothic、28ポイント
    /// - 言語: 上段 ngayok、下段 niv
    /// - レイアウト: 6番目（インデックス5）
    /// - 配置: 左1.0インチ、上2.0インチ、幅11.33インチ、高さ4.5インチ
    pub fn new() -> Self {
        Self {
            config: GenerationConfig::default(),
        }
    }

    /// スライドの書式を設定する
    pub fn with_style(mut self, style: SlideStyle) -> Self {
        self.config.style = style;
        self
    }

    /// 上段・下段の言語を設定する
    ///
    /// 同じ言語を両方に指定することもできます。
    pub fn with_languages(mut self, primary: Language, secondary: Language) -> Self {
        self.config.primary = primary;
        self.config.secondary = secondary;
        self
    }

    /// 追加するスライドのレイアウト番号を設定する
    ///
    /// 範囲の検証はプレゼンテーションを開いた時点で行います。
    pub fn with_layout_index(mut self, index: usize) -> Self {
        self.config.layout_index = index;
        self
    }

    /// テキストボックスの配置を設定する
    pub fn with_geometry(mut self, geometry: SlideGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    /// 設定を検証し、`Generator`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Generator)` - 設定が有効な場合
    /// * `Err(VerseDeckError::Config)` - フォント名が空、またはフォントサイズが小さすぎる場合
    pub fn build(self) -> Result<Generator, VerseDeckError> {
        let style = &self.config.style;

        // 1. フォント名の検証
        if style.font_name.trim().is_empty() {
            return Err(VerseDeckError::Config("Font name must not be empty".to_string()));
        }

        // 2. フォントサイズの検証（第2言語のサイズも正であること）
        if !style.font_size.is_finite() || style.font_size <= SlideStyle::SECONDARY_SIZE_DELTA {
            return Err(VerseDeckError::Config(format!(
                "Font size must be greater than {}pt: {}",
                SlideStyle::SECONDARY_SIZE_DELTA,
                style.font_size
            )));
        }

        // 3. 配置の検証
        let geometry = &self.config.geometry;
        if geometry.width <= 0 || geometry.height <= 0 {
            return Err(VerseDeckError::Config(format!(
                "Text box size must be positive: {}x{} EMU",
                geometry.width, geometry.height
            )));
        }

        Ok(Generator::new(self.config))
    }
}

/// 生成結果の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// 参照から展開されたロケーター
    pub locators: Vec<Locator>,

    /// 追加したスライド数
    pub emitted: usize,

    /// 本文が揃わずスキップしたロケーター
    pub skipped: Vec<Locator>,
}

/// スライド生成のファサード
///
/// 参照文字列を解析し、各節を2言語のスライドとしてシンクに追加します。
///
/// # 使用例
///
/// ```rust,no_run
/// use versedeck::{Corpus, GeneratorBuilder};
///
/// # fn main() -> Result<(), versedeck::VerseDeckError> {
/// let corpus = Corpus::from_path("bible_data/bible_combined.json")?;
/// let generator = GeneratorBuilder::new().build()?;
/// let report = generator.generate_into_file("창세기 1:1-3", &corpus, Some("service.pptx".as_ref()))?;
/// println!("{} slides", report.emitted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Generator {
    /// 生成設定
    config: GenerationConfig,

    /// テキストブロックのフォーマッター
    formatter: VerseBlockFormatter,
}

impl Generator {
    pub(crate) fn new(config: GenerationConfig) -> Self {
        Self {
            formatter: VerseBlockFormatter::new(config.style.clone()),
            config,
        }
    }

    /// 上段の言語
    pub fn primary(&self) -> Language {
        self.config.primary
    }

    /// 下段の言語
    pub fn secondary(&self) -> Language {
        self.config.secondary
    }

    /// 参照の各節をシンクにスライドとして追加する
    ///
    /// # 引数
    ///
    /// * `reference` - 参照文字列（例: `"창세기 1:1-3, 요한복음 3:16"`）
    /// * `corpus` - 読み込み済みのコーパス
    /// * `sink` - スライドの出力先
    ///
    /// # 戻り値
    ///
    /// * `Ok(GenerationReport)` - 追加数0も成功として返します
    /// * `Err(VerseDeckError::Validation)` - 参照が1つも見つからない場合
    /// * `Err(VerseDeckError::MissingCorpusKey)` - 範囲の展開に必要な書・章が無い場合
    pub fn generate<S: SlideSink>(
        &self,
        reference: &str,
        corpus: &Corpus,
        sink: S,
    ) -> Result<GenerationReport, VerseDeckError> {
        let locators = parse_nonempty(reference, corpus)?;
        self.emit(reference, locators, corpus, sink)
    }

    /// 展開済みのロケーターを解決し、スライドとして出力する
    fn emit<S: SlideSink>(
        &self,
        reference: &str,
        locators: Vec<Locator>,
        corpus: &Corpus,
        mut sink: S,
    ) -> Result<GenerationReport, VerseDeckError> {
        let mut emitted = 0;
        let mut skipped = Vec::new();
        for locator in &locators {
            match resolve(locator, corpus, self.config.primary, self.config.secondary) {
                Some(verse) => {
                    sink.append_text_slide(&self.formatter.format(&verse))?;
                    emitted += 1;
                }
                None => skipped.push(locator.clone()),
            }
        }

        if emitted == 0 {
            log::warn!("No slides were added for '{}'", reference);
        } else {
            log::info!(
                "Added {} slides ({} skipped) for '{}'",
                emitted,
                skipped.len(),
                reference
            );
        }

        Ok(GenerationReport {
            locators,
            emitted,
            skipped,
        })
    }

    /// プレゼンテーションファイルを開いてスライドを追加し、同じパスに保存する
    ///
    /// 参照の解析はファイルを開く前に行うため、参照が無効な場合はファイルに触れません。
    ///
    /// # 戻り値
    ///
    /// * `Err(VerseDeckError::Validation)` - `path`が`None`、または参照が1つも見つからない場合
    pub fn generate_into_file(
        &self,
        reference: &str,
        corpus: &Corpus,
        path: Option<&Path>,
    ) -> Result<GenerationReport, VerseDeckError> {
        let path = path
            .ok_or_else(|| VerseDeckError::Validation("No PowerPoint file selected.".to_string()))?;

        let locators = parse_nonempty(reference, corpus)?;

        let mut presentation = Presentation::open(path)?;
        presentation.set_slide_layout(self.config.layout_index)?;
        presentation.set_geometry(self.config.geometry);

        let report = self.emit(reference, locators, corpus, &mut presentation)?;
        presentation.save(path)?;
        Ok(report)
    }
}

/// 参照を展開し、1つも見つからない場合は検証エラーにする
fn parse_nonempty(reference: &str, corpus: &Corpus) -> Result<Vec<Locator>, VerseDeckError> {
    let locators = parse_reference(reference, corpus)?;
    if locators.is_empty() {
        return Err(VerseDeckError::Validation("No valid verses found.".to_string()));
    }
    Ok(locators)
}
