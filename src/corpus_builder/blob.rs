//! Verse Blob Splitter
//!
//! 1章分の本文（`"1:1 태초에 ... 1:2 땅이 ..."`）を節ごとに分割する。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::VerseDeckError;

/// 節マーカー（`<章>:<節>`の後に空白）
static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+):([0-9]+)\s+").expect("valid verse marker regex"));

/// 本文の終端（次の`<数字>:<数字>`）
static BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+:[0-9]+").expect("valid verse boundary regex"));

/// 本文から切り出した1節
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MarkedVerse<'a> {
    pub marker: &'a str,
    pub chapter: u32,
    pub verse: u32,
    pub text: &'a str,
}

/// 本文を節マーカーで分割する
///
/// 各節の本文はマーカー直後の空白の後から、次に現れる`<数字>:<数字>`
/// （空白が続かないものも含む）の直前、または末尾までです。前後の空白は除去します。
/// マーカーより前のテキストは無視します。
pub(crate) fn split_verses(content: &str) -> Result<Vec<MarkedVerse<'_>>, VerseDeckError> {
    let mut verses = Vec::new();
    let mut pos = 0;

    while let Some(caps) = MARKER.captures_at(content, pos) {
        let (Some(whole), Some(chapter), Some(verse)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            break;
        };

        let text_start = whole.end();
        let text_end = BOUNDARY
            .find_at(content, text_start)
            .map_or(content.len(), |m| m.start());

        let number = |s: &str| {
            s.parse::<u32>().map_err(|_| {
                VerseDeckError::CorpusFormat(format!(
                    "Verse marker out of range: '{}:{}'",
                    chapter.as_str(),
                    verse.as_str()
                ))
            })
        };

        verses.push(MarkedVerse {
            marker: &content[chapter.start()..verse.end()],
            chapter: number(chapter.as_str())?,
            verse: number(verse.as_str())?,
            text: content[text_start..text_end].trim(),
        });
        pos = text_end;
    }

    Ok(verses)
}
