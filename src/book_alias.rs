//! Book Alias Module
//!
//! 韓国語の書名から英語の書名への静的マッピング。
//! 表示用ラベルとコーパスの`book_eng`フィールドにのみ使用し、検索キーには使用しない。

/// (韓国語の書名, 英語の書名)。正典の順序。
pub const BOOK_ALIASES: [(&str, &str); 66] = [
    ("창세기", "Genesis"),
    ("출애굽기", "Exodus"),
    ("레위기", "Leviticus"),
    ("민수기", "Numbers"),
    ("신명기", "Deuteronomy"),
    ("여호수아", "Joshua"),
    ("사사기", "Judges"),
    ("룻기", "Ruth"),
    ("사무엘상", "1 Samuel"),
    ("사무엘하", "2 Samuel"),
    ("열왕기상", "1 Kings"),
    ("열왕기하", "2 Kings"),
    ("역대상", "1 Chronicles"),
    ("역대하", "2 Chronicles"),
    ("에스라", "Ezra"),
    ("느헤미야", "Nehemiah"),
    ("에스더", "Esther"),
    ("욥기", "Job"),
    ("시편", "Psalms"),
    ("잠언", "Proverbs"),
    ("전도서", "Ecclesiastes"),
    ("아가", "Song of Songs"),
    ("이사야", "Isaiah"),
    ("예레미야", "Jeremiah"),
    ("예레미야애가", "Lamentations"),
    ("에스겔", "Ezekiel"),
    ("다니엘", "Daniel"),
    ("호세아", "Hosea"),
    ("요엘", "Joel"),
    ("아모스", "Amos"),
    ("오바댜", "Obadiah"),
    ("요나", "Jonah"),
    ("미가", "Micah"),
    ("나훔", "Nahum"),
    ("하박국", "Habakkuk"),
    ("스바냐", "Zephaniah"),
    ("학개", "Haggai"),
    ("스가랴", "Zechariah"),
    ("말라기", "Malachi"),
    ("마태복음", "Matthew"),
    ("마가복음", "Mark"),
    ("누가복음", "Luke"),
    ("요한복음", "John"),
    ("사도행전", "Acts"),
    ("로마서", "Romans"),
    ("고린도전서", "1 Corinthians"),
    ("고린도후서", "2 Corinthians"),
    ("갈라디아서", "Galatians"),
    ("에베소서", "Ephesians"),
    ("빌립보서", "Philippians"),
    ("골로새서", "Colossians"),
    ("데살로니가전서", "1 Thessalonians"),
    ("데살로니가후서", "2 Thessalonians"),
    ("디모데전서", "1 Timothy"),
    ("디모데후서", "2 Timothy"),
    ("디도서", "Titus"),
    ("빌레몬서", "Philemon"),
    ("히브리서", "Hebrews"),
    ("야고보서", "James"),
    ("베드로전서", "1 Peter"),
    ("베드로후서", "2 Peter"),
    ("요한일서", "1 John"),
    ("요한이서", "2 John"),
    ("요한삼서", "3 John"),
    ("유다서", "Jude"),
    ("요한계시록", "Revelation"),
];

/// 韓国語の書名に対応する英語の書名を取得
///
/// ```rust
/// use versedeck::english_book_name;
///
/// assert_eq!(english_book_name("요한복음"), Some("John"));
/// assert_eq!(english_book_name("Genesis"), None);
/// ```
pub fn english_book_name(book: &str) -> Option<&'static str> {
    BOOK_ALIASES
        .iter()
        .find(|(korean, _)| *korean == book)
        .map(|(_, english)| *english)
}

/// 表示用の英語ラベルに使う書名
///
/// 静的マッピング、コーパスの`book_eng`（空でない場合）、書名そのものの順に使用します。
pub(crate) fn display_english_name<'a>(book: &'a str, book_eng: Option<&'a str>) -> &'a str {
    english_book_name(book)
        .or_else(|| book_eng.filter(|name| !name.is_empty()))
        .unwrap_or(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_aliases_are_unique() {
        let korean: HashSet<_> = BOOK_ALIASES.iter().map(|(k, _)| k).collect();
        let english: HashSet<_> = BOOK_ALIASES.iter().map(|(_, e)| e).collect();
        assert_eq!(korean.len(), 66);
        assert_eq!(english.len(), 66);
    }

    #[test]
    fn test_english_book_name() {
        assert_eq!(english_book_name("창세기"), Some("Genesis"));
        assert_eq!(english_book_name("요한계시록"), Some("Revelation"));
        assert_eq!(english_book_name("창"), None);
    }

    #[test]
    fn test_display_english_name_fallbacks() {
        assert_eq!(display_english_name("이사야", Some("ignored")), "Isaiah");
        assert_eq!(display_english_name("Ngayok Book", Some("Custom")), "Custom");
        assert_eq!(display_english_name("Genesis", Some("")), "Genesis");
        assert_eq!(display_english_name("Genesis", None), "Genesis");
    }
}
