//! Reference Token Module
//!
//! 参照文字列の字句解析（ダッシュの正規化とトークン化）を提供します。

/// 正規化の対象となるダッシュ記号
///
/// en dash、em dash、マイナス記号、ノーブレークハイフン。ASCIIハイフンはそのまま。
pub(crate) const DASH_VARIANTS: [char; 4] = ['\u{2013}', '\u{2014}', '\u{2212}', '\u{2011}'];

/// すべてのダッシュ記号をASCIIハイフンに置き換える
pub fn normalize_dashes(input: &str) -> String {
    input
        .chars()
        .map(|c| if DASH_VARIANTS.contains(&c) { '-' } else { c })
        .collect()
}

/// 参照トークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// 数字・空白・コロン以外の文字の連続（書名、範囲記号`-`など）
    Word(&'a str),

    /// 空白の連続
    Space,

    /// ASCII数字の連続
    Number(&'a str),

    /// `:`（1文字ずつ）
    Colon,
}

impl Token<'_> {
    /// 範囲記号（ちょうど`-`のみの語）かどうか
    pub fn is_range_dash(&self) -> bool {
        matches!(self, Token::Word("-"))
    }

    /// 数値として取得（`u32`に収まらない場合は`None`）
    pub fn as_number(&self) -> Option<u32> {
        match self {
            Token::Number(digits) => digits.parse().ok(),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Digit,
    Colon,
}

fn classify(c: char) -> CharClass {
    if c.is_ascii_digit() {
        CharClass::Digit
    } else if c.is_whitespace() {
        CharClass::Space
    } else if c == ':' {
        CharClass::Colon
    } else {
        CharClass::Word
    }
}

/// 正規化済みの文字列をトークン列に分割する
pub(crate) fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let class = classify(c);
        if class == CharClass::Colon {
            tokens.push(Token::Colon);
            continue;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(idx, next)) = chars.peek() {
            if classify(next) != class {
                break;
            }
            end = idx + next.len_utf8();
            chars.next();
        }

        let text = &input[start..end];
        tokens.push(match class {
            CharClass::Word => Token::Word(text),
            CharClass::Space => Token::Space,
            CharClass::Digit => Token::Number(text),
            CharClass::Colon => unreachable!("colons are emitted one at a time"),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dashes() {
        assert_eq!(normalize_dashes("1:1\u{2013}3"), "1:1-3");
        assert_eq!(normalize_dashes("1:1\u{2014}3"), "1:1-3");
        assert_eq!(normalize_dashes("1:1\u{2212}3"), "1:1-3");
        assert_eq!(normalize_dashes("1:1\u{2011}3"), "1:1-3");
        assert_eq!(normalize_dashes("1:1-3"), "1:1-3");
    }

    #[test]
    fn test_tokenize_single_reference() {
        let tokens = tokenize("Genesis 1:1");
        assert_eq!(
            tokens,
            vec![
                Token::Word("Genesis"),
                Token::Space,
                Token::Number("1"),
                Token::Colon,
                Token::Number("1"),
            ]
        );
    }

    #[test]
    fn test_tokenize_hyphen_is_word() {
        let tokens = tokenize("1:1-3");
        assert_eq!(
            tokens,
            vec![
                Token::Number("1"),
                Token::Colon,
                Token::Number("1"),
                Token::Word("-"),
                Token::Number("3"),
            ]
        );
        assert!(tokens[3].is_range_dash());
    }

    #[test]
    fn test_tokenize_korean_and_double_colon() {
        let tokens = tokenize("이사야  2::3");
        assert_eq!(
            tokens,
            vec![
                Token::Word("이사야"),
                Token::Space,
                Token::Number("2"),
                Token::Colon,
                Token::Colon,
                Token::Number("3"),
            ]
        );
    }

    #[test]
    fn test_number_overflow() {
        assert_eq!(Token::Number("42").as_number(), Some(42));
        assert_eq!(Token::Number("99999999999").as_number(), None);
        assert_eq!(Token::Word("x").as_number(), None);
    }
}
