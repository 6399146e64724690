//! Reference Grammar Module
//!
//! トークン列から参照断片を取り出し、範囲の種類を分類します。
//!
//! ```text
//! fragment := Word Space Number ":" Number [ "-" Number [ ":" Number ] ]
//! ```

use super::tokens::Token;

/// 範囲指定の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// 単一の節（例: `로마서 1:1`）
    Single,

    /// 同じ章内の範囲（例: `창세기 1:1-3`）
    SameChapter { end_verse: u32 },

    /// 章をまたぐ範囲（例: `이사야 1:1-2:3`）
    CrossChapter { end_chapter: u32, end_verse: u32 },
}

/// 参照断片
///
/// 入力文字列中で文法に一致した1つの引用です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub range: RangeSpec,
}

/// 断片の照合結果と消費したトークン数
struct Matched {
    fragment: Fragment,
    consumed: usize,
}

/// `tokens[pos..]`の先頭から1つの断片を照合する
fn match_at(tokens: &[Token<'_>], pos: usize) -> Option<Matched> {
    let book = match tokens.get(pos)? {
        Token::Word(word) => *word,
        _ => return None,
    };
    if tokens.get(pos + 1)? != &Token::Space {
        return None;
    }
    let chapter = tokens.get(pos + 2)?.as_number()?;
    if tokens.get(pos + 3)? != &Token::Colon {
        return None;
    }
    let verse = tokens.get(pos + 4)?.as_number()?;

    let mut consumed = 5;
    let mut range = RangeSpec::Single;

    let end = tokens
        .get(pos + 5)
        .filter(|t| t.is_range_dash())
        .and_then(|_| tokens.get(pos + 6))
        .and_then(Token::as_number);

    if let Some(end) = end {
        consumed = 7;
        range = RangeSpec::SameChapter { end_verse: end };

        let end_verse = tokens
            .get(pos + 7)
            .filter(|t| **t == Token::Colon)
            .and_then(|_| tokens.get(pos + 8))
            .and_then(Token::as_number);

        if let Some(end_verse) = end_verse {
            consumed = 9;
            range = RangeSpec::CrossChapter {
                end_chapter: end,
                end_verse,
            };
        }
    }

    Some(Matched {
        fragment: Fragment {
            book: book.to_string(),
            chapter,
            verse,
            range,
        },
        consumed,
    })
}

/// トークン列を左から走査し、重ならない断片をすべて取り出す
///
/// 断片が始まらないトークンは読み飛ばします。
pub(crate) fn scan_fragments(tokens: &[Token<'_>]) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        match match_at(tokens, pos) {
            Some(matched) => {
                fragments.push(matched.fragment);
                pos += matched.consumed;
            }
            None => pos += 1,
        }
    }

    fragments
}
