//! Slide XML
//!
//! テキストボックス1つを持つスライドのXML生成と、スライド本文の読み取り。

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::parts::{local_name, Relationship, REL_TYPE_SLIDE_LAYOUT, RELATIONSHIPS_NS};
use crate::api::SlideGeometry;
use crate::error::VerseDeckError;
use crate::types::{Paragraph, TextBlock, TextRun};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

type XmlWriter = Writer<Vec<u8>>;

pub(crate) fn write_declaration(writer: &mut XmlWriter) -> Result<(), VerseDeckError> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(())
}

fn start(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), VerseDeckError> {
    let mut e = BytesStart::new(name);
    for attr in attrs {
        e.push_attribute(*attr);
    }
    writer.write_event(Event::Start(e))?;
    Ok(())
}

fn empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), VerseDeckError> {
    let mut e = BytesStart::new(name);
    for attr in attrs {
        e.push_attribute(*attr);
    }
    writer.write_event(Event::Empty(e))?;
    Ok(())
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<(), VerseDeckError> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// ポイントを1/100ポイント単位の整数に変換（`sz`、`spcPts`で使用）
fn hundredths(points: f64) -> String {
    ((points * 100.0).round() as i64).to_string()
}

/// テキストブロックからスライドXML（`p:sld`）を生成
///
/// 空のスライドにテキストボックスを1つ配置します。
/// レイアウトのプレースホルダーは複製しません。
pub(crate) fn build_slide_xml(
    block: &TextBlock,
    geometry: &SlideGeometry,
) -> Result<Vec<u8>, VerseDeckError> {
    let mut w = Writer::new(Vec::new());
    write_declaration(&mut w)?;

    start(
        &mut w,
        "p:sld",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)],
    )?;
    start(&mut w, "p:cSld", &[])?;
    start(&mut w, "p:spTree", &[])?;

    start(&mut w, "p:nvGrpSpPr", &[])?;
    empty(&mut w, "p:cNvPr", &[("id", "1"), ("name", "")])?;
    empty(&mut w, "p:cNvGrpSpPr", &[])?;
    empty(&mut w, "p:nvPr", &[])?;
    end(&mut w, "p:nvGrpSpPr")?;

    start(&mut w, "p:grpSpPr", &[])?;
    start(&mut w, "a:xfrm", &[])?;
    empty(&mut w, "a:off", &[("x", "0"), ("y", "0")])?;
    empty(&mut w, "a:ext", &[("cx", "0"), ("cy", "0")])?;
    empty(&mut w, "a:chOff", &[("x", "0"), ("y", "0")])?;
    empty(&mut w, "a:chExt", &[("cx", "0"), ("cy", "0")])?;
    end(&mut w, "a:xfrm")?;
    end(&mut w, "p:grpSpPr")?;

    write_text_box(&mut w, block, geometry)?;

    end(&mut w, "p:spTree")?;
    end(&mut w, "p:cSld")?;

    start(&mut w, "p:clrMapOvr", &[])?;
    empty(&mut w, "a:masterClrMapping", &[])?;
    end(&mut w, "p:clrMapOvr")?;

    end(&mut w, "p:sld")?;
    Ok(w.into_inner())
}

fn write_text_box(
    w: &mut XmlWriter,
    block: &TextBlock,
    geometry: &SlideGeometry,
) -> Result<(), VerseDeckError> {
    start(w, "p:sp", &[])?;

    start(w, "p:nvSpPr", &[])?;
    empty(w, "p:cNvPr", &[("id", "2"), ("name", "TextBox 1")])?;
    empty(w, "p:cNvSpPr", &[("txBox", "1")])?;
    empty(w, "p:nvPr", &[])?;
    end(w, "p:nvSpPr")?;

    let (x, y) = (geometry.left.to_string(), geometry.top.to_string());
    let (cx, cy) = (geometry.width.to_string(), geometry.height.to_string());
    start(w, "p:spPr", &[])?;
    start(w, "a:xfrm", &[])?;
    empty(w, "a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
    empty(w, "a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    end(w, "a:xfrm")?;
    start(w, "a:prstGeom", &[("prst", "rect")])?;
    empty(w, "a:avLst", &[])?;
    end(w, "a:prstGeom")?;
    empty(w, "a:noFill", &[])?;
    end(w, "p:spPr")?;

    start(w, "p:txBody", &[])?;
    let wrap = if block.word_wrap { "square" } else { "none" };
    if block.auto_fit {
        start(w, "a:bodyPr", &[("wrap", wrap), ("rtlCol", "0")])?;
        empty(w, "a:spAutoFit", &[])?;
        end(w, "a:bodyPr")?;
    } else {
        empty(w, "a:bodyPr", &[("wrap", wrap), ("rtlCol", "0")])?;
    }
    empty(w, "a:lstStyle", &[])?;
    for paragraph in &block.paragraphs {
        write_paragraph(w, paragraph)?;
    }
    if block.paragraphs.is_empty() {
        // txBodyには少なくとも1つの段落が必要
        empty(w, "a:p", &[])?;
    }
    end(w, "p:txBody")?;

    end(w, "p:sp")?;
    Ok(())
}

fn write_paragraph(w: &mut XmlWriter, paragraph: &Paragraph) -> Result<(), VerseDeckError> {
    start(w, "a:p", &[])?;
    if let Some(points) = paragraph.space_before {
        start(w, "a:pPr", &[])?;
        start(w, "a:spcBef", &[])?;
        let spacing = hundredths(points);
        empty(w, "a:spcPts", &[("val", spacing.as_str())])?;
        end(w, "a:spcBef")?;
        end(w, "a:pPr")?;
    }
    for run in &paragraph.runs {
        write_run(w, run)?;
    }
    end(w, "a:p")?;
    Ok(())
}

fn write_run(w: &mut XmlWriter, run: &TextRun) -> Result<(), VerseDeckError> {
    start(w, "a:r", &[])?;

    let size = hundredths(run.font_size);
    let bold = if run.bold { "1" } else { "0" };
    start(
        w,
        "a:rPr",
        &[("sz", size.as_str()), ("b", bold), ("dirty", "0")],
    )?;
    empty(w, "a:latin", &[("typeface", run.font_name.as_str())])?;
    empty(w, "a:ea", &[("typeface", run.font_name.as_str())])?;
    end(w, "a:rPr")?;

    start(w, "a:t", &[])?;
    w.write_event(Event::Text(BytesText::new(&run.text)))?;
    end(w, "a:t")?;

    end(w, "a:r")?;
    Ok(())
}

/// スライドの`.rels`（レイアウトへの参照のみ）
pub(crate) fn build_slide_rels(layout_target: &str) -> Result<Vec<u8>, VerseDeckError> {
    let mut w = Writer::new(Vec::new());
    write_declaration(&mut w)?;
    start(&mut w, "Relationships", &[("xmlns", RELATIONSHIPS_NS)])?;
    let layout = Relationship {
        id: "rId1".to_string(),
        rel_type: REL_TYPE_SLIDE_LAYOUT.to_string(),
        target: layout_target.to_string(),
    };
    empty(
        &mut w,
        "Relationship",
        &[
            ("Id", layout.id.as_str()),
            ("Type", layout.rel_type.as_str()),
            ("Target", layout.target.as_str()),
        ],
    )?;
    end(&mut w, "Relationships")?;
    Ok(w.into_inner())
}

/// スライドXMLから段落ごとのテキストを取り出す
///
/// `a:p`ごとに、含まれる全`a:t`のテキストを連結した文字列を返します。
pub(crate) fn read_paragraph_texts(xml: &str) -> Result<Vec<String>, VerseDeckError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"p" => current = Some(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if local_name(e.name().as_ref()) == b"p" => {
                paragraphs.push(String::new());
            }
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| VerseDeckError::Xml(format!("XML parse error in slide: {}", e)))?;
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"p" => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(VerseDeckError::Xml(format!("XML parse error in slide: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, bold: bool, font_size: f64) -> TextRun {
        TextRun {
            text: text.to_string(),
            bold,
            font_size,
            font_name: "Malgun Gothic".to_string(),
        }
    }

    fn sample_block() -> TextBlock {
        TextBlock {
            paragraphs: vec![
                Paragraph {
                    runs: vec![run("창세기 1:1 ", true, 28.0), run("태초에 <하나님이>", false, 28.0)],
                    space_before: None,
                },
                Paragraph {
                    runs: vec![run("Genesis 1:1 ", true, 26.0), run("In the beginning & end", false, 26.0)],
                    space_before: Some(12.0),
                },
            ],
            word_wrap: true,
            auto_fit: true,
        }
    }

    #[test]
    fn test_build_slide_xml_structure() {
        let xml = build_slide_xml(&sample_block(), &SlideGeometry::default()).unwrap();
        let xml = String::from_utf8(xml).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains(r#"<p:cNvSpPr txBox="1"/>"#));
        assert!(xml.contains(r#"<a:off x="914400" y="1828800"/>"#));
        assert!(xml.contains(r#"<a:ext cx="10360152" cy="4114800"/>"#));
        assert!(xml.contains(r#"<a:bodyPr wrap="square" rtlCol="0"><a:spAutoFit/></a:bodyPr>"#));
        assert!(xml.contains(r#"<a:spcBef><a:spcPts val="1200"/></a:spcBef>"#));
        assert!(xml.contains(r#"sz="2800" b="1""#));
        assert!(xml.contains(r#"sz="2600" b="0""#));
        assert!(xml.contains(r#"<a:latin typeface="Malgun Gothic"/><a:ea typeface="Malgun Gothic"/>"#));
        // 特殊文字はエスケープされる
        assert!(xml.contains("태초에 &lt;하나님이&gt;"));
        assert!(xml.contains("In the beginning &amp; end"));
    }

    #[test]
    fn test_read_paragraph_texts() {
        let xml = build_slide_xml(&sample_block(), &SlideGeometry::default()).unwrap();
        let paragraphs = read_paragraph_texts(std::str::from_utf8(&xml).unwrap()).unwrap();
        assert_eq!(
            paragraphs,
            vec![
                "창세기 1:1 태초에 <하나님이>".to_string(),
                "Genesis 1:1 In the beginning & end".to_string(),
            ]
        );
    }

    #[test]
    fn test_build_slide_without_auto_fit() {
        let mut block = sample_block();
        block.auto_fit = false;
        block.word_wrap = false;
        let xml = String::from_utf8(build_slide_xml(&block, &SlideGeometry::default()).unwrap())
            .unwrap();
        assert!(xml.contains(r#"<a:bodyPr wrap="none" rtlCol="0"/>"#));
        assert!(!xml.contains("spAutoFit"));
    }

    #[test]
    fn test_build_slide_rels() {
        let rels = build_slide_rels("../slideLayouts/slideLayout6.xml").unwrap();
        let rels = String::from_utf8(rels).unwrap();
        assert!(rels.contains(r#"Id="rId1""#));
        assert!(rels.contains(REL_TYPE_SLIDE_LAYOUT));
        assert!(rels.contains(r#"Target="../slideLayouts/slideLayout6.xml""#));
    }
}
