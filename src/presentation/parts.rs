//! Package Part Helpers
//!
//! パート名の解決、リレーションシップの読み書き、
//! `presentation.xml`と`[Content_Types].xml`へのエントリ追加を提供します。

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::VerseDeckError;

pub(crate) const REL_TYPE_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_TYPE_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_TYPE_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const CONTENT_TYPE_SLIDE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub(crate) const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// リレーションシップ（`.rels`の`<Relationship>`要素）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// パートに対応する`.rels`のパート名
///
/// `ppt/presentation.xml` -> `ppt/_rels/presentation.xml.rels`
pub(crate) fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// ソースパートからの相対ターゲットを絶対パート名に解決する
///
/// `("ppt/slideMasters/slideMaster1.xml", "../slideLayouts/slideLayout1.xml")`
/// -> `ppt/slideLayouts/slideLayout1.xml`
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// ソースパートから見た相対ターゲットを作る（`resolve_target`の逆）
pub(crate) fn relative_target(source_part: &str, target_part: &str) -> String {
    let from: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to: Vec<&str> = target_part.split('/').collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to[common..]);
    parts.join("/")
}

/// 名前空間接頭辞を除いたローカル名
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// 要素名の名前空間接頭辞（`p:presentation` -> `Some("p")`）
fn prefix_of(name: &[u8]) -> Option<String> {
    name.iter()
        .position(|b| *b == b':')
        .map(|idx| String::from_utf8_lossy(&name[..idx]).into_owned())
}

fn qualified(prefix: &Option<String>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{}:{}", p, local),
        None => local.to_string(),
    }
}

fn attribute_value(
    reader: &Reader<&[u8]>,
    element: &BytesStart<'_>,
    matches: impl Fn(&[u8]) -> bool,
) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| matches(attr.key.as_ref()))
        .and_then(|attr| {
            attr.decode_and_unescape_value(reader)
                .ok()
                .map(|v| v.into_owned())
        })
}

/// `r:id`属性（接頭辞付きの`id`）かどうか
fn is_relationship_id(key: &[u8]) -> bool {
    key.ends_with(b":id")
}

/// `.rels`の内容を解析する
pub(crate) fn parse_relationships(xml: &str) -> Result<Vec<Relationship>, VerseDeckError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut relationships = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let id = attribute_value(&reader, &e, |k| k == b"Id").unwrap_or_default();
                let rel_type = attribute_value(&reader, &e, |k| k == b"Type").unwrap_or_default();
                let target = attribute_value(&reader, &e, |k| k == b"Target").unwrap_or_default();
                relationships.push(Relationship {
                    id,
                    rel_type,
                    target,
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(VerseDeckError::Xml(format!(
                    "XML parse error in relationships: {}",
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// 未使用の`rIdN`を採番する
pub(crate) fn next_relationship_id(relationships: &[Relationship]) -> String {
    let max = relationships
        .iter()
        .filter_map(|rel| rel.id.strip_prefix("rId"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("rId{}", max + 1)
}

/// 要素リストの`r:id`属性を文書順に取得する
///
/// `sldMasterId`（presentation.xml）や`sldLayoutId`（slideMaster.xml）の取得に使用します。
pub(crate) fn list_relationship_ids(
    xml: &str,
    element: &[u8],
) -> Result<Vec<String>, VerseDeckError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut ids = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if local_name(e.name().as_ref()) == element => {
                if let Some(id) = attribute_value(&reader, &e, is_relationship_id) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(VerseDeckError::Xml(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

/// 新しいリレーションシップを追加した`.rels`を返す（パートが無い場合は新規作成）
pub(crate) fn append_relationship(
    existing: Option<&str>,
    relationship: &Relationship,
) -> Result<Vec<u8>, VerseDeckError> {
    let element = |prefix: &Option<String>| {
        let mut e = BytesStart::new(qualified(prefix, "Relationship"));
        e.push_attribute(("Id", relationship.id.as_str()));
        e.push_attribute(("Type", relationship.rel_type.as_str()));
        e.push_attribute(("Target", relationship.target.as_str()));
        e
    };

    match existing {
        Some(xml) => insert_before_root_end(xml, |writer, prefix| {
            writer.write_event(Event::Empty(element(prefix)))?;
            Ok(())
        }),
        None => {
            let mut writer = Writer::new(Vec::new());
            super::slide_xml::write_declaration(&mut writer)?;
            let mut root = BytesStart::new("Relationships");
            root.push_attribute(("xmlns", RELATIONSHIPS_NS));
            writer.write_event(Event::Start(root))?;
            writer.write_event(Event::Empty(element(&None)))?;
            writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
            Ok(writer.into_inner())
        }
    }
}

/// `[Content_Types].xml`にスライドの`<Override>`を追加する
pub(crate) fn add_content_type_override(
    xml: &str,
    part_name: &str,
    content_type: &str,
) -> Result<Vec<u8>, VerseDeckError> {
    let part_name = format!("/{}", part_name);
    insert_before_root_end(xml, |writer, prefix| {
        let mut e = BytesStart::new(qualified(prefix, "Override"));
        e.push_attribute(("PartName", part_name.as_str()));
        e.push_attribute(("ContentType", content_type));
        writer.write_event(Event::Empty(e))?;
        Ok(())
    })
}

/// ルート要素の終了タグ直前に要素を挿入する
fn insert_before_root_end<F>(xml: &str, insert: F) -> Result<Vec<u8>, VerseDeckError>
where
    F: FnOnce(&mut Writer<Vec<u8>>, &Option<String>) -> Result<(), VerseDeckError>,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut prefix = None;
    let mut insert = Some(insert);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if depth == 0 {
                    prefix = prefix_of(e.name().as_ref());
                }
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(insert) = insert.take() {
                        insert(&mut writer, &prefix)?;
                    }
                }
                writer.write_event(Event::End(e))?;
            }
            Ok(Event::Empty(e)) if depth == 0 => {
                // 子要素のないルート（`<Types/>`）は開始・終了タグに展開する
                prefix = prefix_of(e.name().as_ref());
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                writer.write_event(Event::Start(e))?;
                if let Some(insert) = insert.take() {
                    insert(&mut writer, &prefix)?;
                }
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event)?,
            Err(e) => return Err(VerseDeckError::Xml(format!("XML parse error: {}", e))),
        }
        buf.clear();
    }

    if insert.is_some() {
        return Err(VerseDeckError::Xml("Document has no root element".to_string()));
    }
    Ok(writer.into_inner())
}

/// `presentation.xml`の`sldIdLst`にスライドを追加する
///
/// `sldIdLst`が存在しない場合は、`sldSz`（無ければ`notesSz`）の直前に作成します。
/// スライドIDは既存の最大値+1（最小256）です。
pub(crate) fn add_slide_id(xml: &str, relationship_id: &str) -> Result<Vec<u8>, VerseDeckError> {
    let next_id = max_slide_id(xml)?.map_or(256, |max| max + 1).to_string();

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();
    let mut prefix: Option<String> = None;
    let mut rel_prefix = "r".to_string();
    let mut depth = 0usize;
    let mut inserted = false;

    let slide_id = |prefix: &Option<String>, rel_prefix: &str| {
        let mut e = BytesStart::new(qualified(prefix, "sldId"));
        e.push_attribute(("id", next_id.as_str()));
        e.push_attribute((format!("{}:id", rel_prefix).as_str(), relationship_id));
        e
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name();
                if depth == 0 {
                    prefix = prefix_of(name.as_ref());
                    if let Some(p) = relationships_prefix(&reader, &e) {
                        rel_prefix = p;
                    }
                }
                let local = local_name(name.as_ref()).to_vec();
                if depth == 1 && !inserted && (local == b"sldSz" || local == b"notesSz") {
                    write_slide_list(&mut writer, &prefix, slide_id(&prefix, &rel_prefix))?;
                    inserted = true;
                }
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Ok(Event::Empty(e)) => {
                let local = local_name(e.name().as_ref()).to_vec();
                if depth == 1 && !inserted && local == b"sldIdLst" {
                    write_slide_list(&mut writer, &prefix, slide_id(&prefix, &rel_prefix))?;
                    inserted = true;
                } else {
                    if depth == 1 && !inserted && (local == b"sldSz" || local == b"notesSz") {
                        write_slide_list(&mut writer, &prefix, slide_id(&prefix, &rel_prefix))?;
                        inserted = true;
                    }
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                if depth == 1 && !inserted && local_name(e.name().as_ref()) == b"sldIdLst" {
                    writer.write_event(Event::Empty(slide_id(&prefix, &rel_prefix)))?;
                    inserted = true;
                }
                writer.write_event(Event::End(e))?;
            }
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event)?,
            Err(e) => {
                return Err(VerseDeckError::Xml(format!(
                    "XML parse error in presentation.xml: {}",
                    e
                )))
            }
        }
        buf.clear();
    }

    if !inserted {
        return Err(VerseDeckError::Xml(
            "presentation.xml has no place for a slide list".to_string(),
        ));
    }
    Ok(writer.into_inner())
}

fn write_slide_list(
    writer: &mut Writer<Vec<u8>>,
    prefix: &Option<String>,
    slide_id: BytesStart<'_>,
) -> Result<(), VerseDeckError> {
    let list = qualified(prefix, "sldIdLst");
    writer.write_event(Event::Start(BytesStart::new(list.as_str())))?;
    writer.write_event(Event::Empty(slide_id))?;
    writer.write_event(Event::End(BytesEnd::new(list)))?;
    Ok(())
}

/// ルート要素で宣言されたリレーションシップ名前空間の接頭辞
fn relationships_prefix(reader: &Reader<&[u8]>, root: &BytesStart<'_>) -> Option<String> {
    const OFFICE_RELATIONSHIPS_NS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    root.attributes().flatten().find_map(|attr| {
        let key = attr.key.as_ref();
        let prefix = key.strip_prefix(b"xmlns:")?;
        let value = attr.decode_and_unescape_value(reader).ok()?;
        (value == OFFICE_RELATIONSHIPS_NS).then(|| String::from_utf8_lossy(prefix).into_owned())
    })
}

fn max_slide_id(xml: &str) -> Result<Option<u32>, VerseDeckError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut max = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(id) = attribute_value(&reader, &e, |k| k == b"id")
                    .and_then(|v| v.parse::<u32>().ok())
                {
                    max = Some(max.map_or(id, |m: u32| m.max(id)));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(VerseDeckError::Xml(format!(
                    "XML parse error in presentation.xml: {}",
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(max)
}

/// `docProps/core.xml`の`dcterms:modified`を書き換える
pub(crate) fn set_modified_timestamp(xml: &str, timestamp: &str) -> Result<Vec<u8>, VerseDeckError> {
    use quick_xml::events::BytesText;

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();
    let mut in_modified = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                in_modified = local_name(e.name().as_ref()) == b"modified";
                writer.write_event(Event::Start(e))?;
            }
            Ok(Event::Text(_)) if in_modified => {
                writer.write_event(Event::Text(BytesText::new(timestamp)))?;
                in_modified = false;
            }
            Ok(Event::End(e)) => {
                if in_modified {
                    // 空の<dcterms:modified></dcterms:modified>
                    writer.write_event(Event::Text(BytesText::new(timestamp)))?;
                    in_modified = false;
                }
                writer.write_event(Event::End(e))?;
            }
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event)?,
            Err(e) => {
                return Err(VerseDeckError::Xml(format!(
                    "XML parse error in core properties: {}",
                    e
                )))
            }
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}
