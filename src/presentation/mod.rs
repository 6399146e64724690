//! Presentation Module
//!
//! `.pptx`パッケージ（ZIPアーカイブ）を読み込み、テキストスライドを追加して保存するモジュール。
//!
//! パッケージのパートはアーカイブ内の順序のまま保持し、
//! スライドの追加時に以下のパートを書き換えます。
//!
//! - `ppt/slides/slideN.xml`と`ppt/slides/_rels/slideN.xml.rels`（新規）
//! - `ppt/presentation.xml`（`sldIdLst`）
//! - `ppt/_rels/presentation.xml.rels`
//! - `[Content_Types].xml`

mod parts;
mod slide_xml;

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::api::SlideGeometry;
use crate::error::VerseDeckError;
use crate::output::SlideSink;
use crate::security::SecurityConfig;
use crate::types::TextBlock;

use parts::{
    add_content_type_override, add_slide_id, append_relationship, list_relationship_ids,
    next_relationship_id, parse_relationships, relative_target, rels_part_name, resolve_target,
    set_modified_timestamp, Relationship, CONTENT_TYPE_SLIDE, REL_TYPE_SLIDE,
    REL_TYPE_SLIDE_LAYOUT, REL_TYPE_SLIDE_MASTER,
};

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PRESENTATION_PART: &str = "ppt/presentation.xml";
const CORE_PROPERTIES_PART: &str = "docProps/core.xml";
const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// 既定のスライドレイアウト（最初のスライドマスターの6番目のレイアウト）
pub const DEFAULT_LAYOUT_INDEX: usize = 5;

/// 編集中の`.pptx`パッケージ
///
/// [`SlideSink`]を実装しており、テキストブロックごとに1枚のスライドを追加します。
///
/// # 使用例
///
/// ```rust,no_run
/// use versedeck::{Presentation, SlideSink, TextBlock};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut presentation = Presentation::open("service.pptx")?;
/// presentation.append_text_slide(&TextBlock::default())?;
/// presentation.save("service.pptx")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Presentation {
    /// パート名 -> 内容（アーカイブ内の順序）
    parts: Vec<(String, Vec<u8>)>,
    /// 最初のスライドマスターのレイアウトのパート名（マスター内の順序）
    layouts: Vec<String>,
    layout_index: usize,
    geometry: SlideGeometry,
}

impl Presentation {
    /// ファイルパスからパッケージを開く
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VerseDeckError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        SecurityConfig::default().check_input_size(file.metadata()?.len())?;

        let presentation = Self::from_reader(BufReader::new(file))?;
        let slide_count = presentation.slide_count()?;
        log::info!(
            "Opened presentation {} ({} slides, {} layouts)",
            path.display(),
            slide_count,
            presentation.layout_count()
        );
        Ok(presentation)
    }

    /// メモリ上のバイト列からパッケージを読み込む
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, VerseDeckError> {
        SecurityConfig::default().check_input_size(bytes.len() as u64)?;
        Self::from_reader(Cursor::new(bytes))
    }

    /// リーダーからパッケージを読み込む
    ///
    /// # 引数
    ///
    /// * `reader` - `.pptx`を読み込むリーダー（Read + Seekトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// * `Ok(Presentation)` - 必須パートが揃っている場合
    /// * `Err(VerseDeckError)` - ZIPが壊れている、制限を超えている、または必須パートが無い場合
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, VerseDeckError> {
        let security_config = SecurityConfig::default();
        let mut archive = ZipArchive::new(reader)?;
        security_config.check_file_count(archive.len())?;

        let mut parts = Vec::with_capacity(archive.len());
        let mut total_decompressed_size = 0u64;
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            security_config.check_entry(&name, file.size(), &mut total_decompressed_size)?;

            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push((name, data));
        }

        let mut presentation = Self {
            parts,
            layouts: Vec::new(),
            layout_index: DEFAULT_LAYOUT_INDEX,
            geometry: SlideGeometry::default(),
        };
        for required in [CONTENT_TYPES_PART, PRESENTATION_PART] {
            if presentation.part(required).is_none() {
                return Err(VerseDeckError::Zip(format!(
                    "Not a presentation package: missing part '{}'",
                    required
                )));
            }
        }
        presentation.layouts = presentation.resolve_layouts()?;
        Ok(presentation)
    }

    /// パートの内容を取得
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(part, _)| part == name)
            .map(|(_, data)| data.as_slice())
    }

    /// パート名の一覧（アーカイブ内の順序）
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    fn part_str(&self, name: &str) -> Result<&str, VerseDeckError> {
        let data = self
            .part(name)
            .ok_or_else(|| VerseDeckError::Zip(format!("Missing part '{}'", name)))?;
        Ok(std::str::from_utf8(data)?)
    }

    fn relationships_of(&self, part: &str) -> Result<Vec<Relationship>, VerseDeckError> {
        match self.part(&rels_part_name(part)) {
            Some(data) => parse_relationships(std::str::from_utf8(data)?),
            None => Ok(Vec::new()),
        }
    }

    /// パートを置き換える（存在しない場合は末尾に追加）
    fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|(part, _)| part == name) {
            Some((_, existing)) => *existing = data,
            None => self.parts.push((name.to_string(), data)),
        }
    }

    /// `r:id`をリレーションシップで解決し、ターゲットのパート名を返す
    ///
    /// リレーションシップの種類が`rel_type`と異なる場合はエラーになります。
    fn resolve_ids(
        &self,
        source_part: &str,
        ids: &[String],
        rel_type: &str,
    ) -> Result<Vec<String>, VerseDeckError> {
        let relationships = self.relationships_of(source_part)?;
        ids.iter()
            .map(|id| {
                let rel = relationships.iter().find(|rel| &rel.id == id).ok_or_else(|| {
                    VerseDeckError::Xml(format!(
                        "Relationship '{}' not found for '{}'",
                        id, source_part
                    ))
                })?;
                if rel.rel_type != rel_type {
                    return Err(VerseDeckError::Xml(format!(
                        "Relationship '{}' of '{}' has type '{}', expected '{}'",
                        id, source_part, rel.rel_type, rel_type
                    )));
                }
                Ok(resolve_target(source_part, &rel.target))
            })
            .collect()
    }

    /// 最初のスライドマスターのレイアウトを、マスター内の順序で解決する
    fn resolve_layouts(&self) -> Result<Vec<String>, VerseDeckError> {
        let presentation = self.part_str(PRESENTATION_PART)?;
        let master_ids = list_relationship_ids(presentation, b"sldMasterId")?;
        let master = match self
            .resolve_ids(PRESENTATION_PART, &master_ids, REL_TYPE_SLIDE_MASTER)?
            .into_iter()
            .next()
        {
            Some(master) => master,
            None => return Ok(Vec::new()),
        };

        let layout_ids = list_relationship_ids(self.part_str(&master)?, b"sldLayoutId")?;
        self.resolve_ids(&master, &layout_ids, REL_TYPE_SLIDE_LAYOUT)
    }

    /// 利用可能なスライドレイアウト数
    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// スライドのパート名（プレゼンテーション内の表示順）
    pub fn slide_part_names(&self) -> Result<Vec<String>, VerseDeckError> {
        let slide_ids = list_relationship_ids(self.part_str(PRESENTATION_PART)?, b"sldId")?;
        self.resolve_ids(PRESENTATION_PART, &slide_ids, REL_TYPE_SLIDE)
    }

    /// スライド数
    pub fn slide_count(&self) -> Result<usize, VerseDeckError> {
        Ok(self.slide_part_names()?.len())
    }

    /// 指定したスライドの段落ごとのテキスト
    pub fn slide_paragraphs(&self, index: usize) -> Result<Vec<String>, VerseDeckError> {
        let slides = self.slide_part_names()?;
        let part = slides.get(index).ok_or_else(|| {
            VerseDeckError::Config(format!(
                "Slide index {} is out of range ({} slides)",
                index,
                slides.len()
            ))
        })?;
        slide_xml::read_paragraph_texts(self.part_str(part)?)
    }

    /// 追加するスライドのレイアウトを設定
    pub fn set_slide_layout(&mut self, index: usize) -> Result<(), VerseDeckError> {
        self.layout_part(index)?;
        self.layout_index = index;
        Ok(())
    }

    /// 追加するテキストボックスの位置とサイズを設定
    pub fn set_geometry(&mut self, geometry: SlideGeometry) {
        self.geometry = geometry;
    }

    fn layout_part(&self, index: usize) -> Result<&str, VerseDeckError> {
        self.layouts.get(index).map(|s| s.as_str()).ok_or_else(|| {
            VerseDeckError::Config(format!(
                "Slide layout index {} is out of range ({} layouts available)",
                index,
                self.layouts.len()
            ))
        })
    }

    fn next_slide_number(&self) -> u32 {
        self.part_names()
            .filter_map(|name| name.strip_prefix(SLIDE_PREFIX)?.strip_suffix(".xml"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1
    }

    /// テキストブロックを新しいスライドとして追加し、スライドのパート名を返す
    pub fn add_slide(&mut self, block: &TextBlock) -> Result<String, VerseDeckError> {
        let layout = self.layout_part(self.layout_index)?.to_string();
        let slide_part = format!("{}{}.xml", SLIDE_PREFIX, self.next_slide_number());

        let slide = slide_xml::build_slide_xml(block, &self.geometry)?;
        let slide_rels = slide_xml::build_slide_rels(&relative_target(&slide_part, &layout))?;

        let presentation_rels_part = rels_part_name(PRESENTATION_PART);
        let relationship = Relationship {
            id: next_relationship_id(&self.relationships_of(PRESENTATION_PART)?),
            rel_type: REL_TYPE_SLIDE.to_string(),
            target: relative_target(PRESENTATION_PART, &slide_part),
        };
        let presentation_rels = match self.part(&presentation_rels_part) {
            Some(data) => append_relationship(Some(std::str::from_utf8(data)?), &relationship)?,
            None => append_relationship(None, &relationship)?,
        };
        let presentation = add_slide_id(self.part_str(PRESENTATION_PART)?, &relationship.id)?;
        let content_types = add_content_type_override(
            self.part_str(CONTENT_TYPES_PART)?,
            &slide_part,
            CONTENT_TYPE_SLIDE,
        )?;

        self.set_part(&slide_part, slide);
        self.set_part(&rels_part_name(&slide_part), slide_rels);
        self.set_part(&presentation_rels_part, presentation_rels);
        self.set_part(PRESENTATION_PART, presentation);
        self.set_part(CONTENT_TYPES_PART, content_types);

        log::debug!("Appended {} using layout {}", slide_part, layout);
        Ok(slide_part)
    }

    /// パッケージをZIPとして書き出す
    ///
    /// `docProps/core.xml`がある場合は更新日時（`dcterms:modified`）を現在時刻にします。
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W, VerseDeckError> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut zip = ZipWriter::new(writer);
        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            if name == CORE_PROPERTIES_PART {
                let stamped = set_modified_timestamp(std::str::from_utf8(data)?, &timestamp)?;
                zip.write_all(&stamped)?;
            } else {
                zip.write_all(data)?;
            }
        }
        Ok(zip.finish()?)
    }

    /// メモリ上のバイト列に書き出す
    pub fn to_bytes(&self) -> Result<Vec<u8>, VerseDeckError> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// ファイルに保存する
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), VerseDeckError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
        log::info!("Saved presentation {}", path.display());
        Ok(())
    }
}

impl SlideSink for Presentation {
    fn append_text_slide(&mut self, block: &TextBlock) -> Result<(), VerseDeckError> {
        self.add_slide(block).map(|_| ())
    }
}
