//! Slide Output Module
//!
//! スライドの出力先（シンク）の抽象化と、節のテキストブロックの組み立てを提供するモジュール。

mod verse_block;

use crate::error::VerseDeckError;
use crate::types::TextBlock;

pub use verse_block::VerseBlockFormatter;

/// テキストブロックを受け取るスライドの出力先
///
/// 本番では[`Presentation`](crate::Presentation)が実装します。
/// テストでは`Vec<TextBlock>`をシンクとして使用できます。
pub trait SlideSink {
    /// テキストブロック1つを新しいスライドとして追加する
    fn append_text_slide(&mut self, block: &TextBlock) -> Result<(), VerseDeckError>;
}

impl SlideSink for Vec<TextBlock> {
    fn append_text_slide(&mut self, block: &TextBlock) -> Result<(), VerseDeckError> {
        self.push(block.clone());
        Ok(())
    }
}

impl<S: SlideSink + ?Sized> SlideSink for &mut S {
    fn append_text_slide(&mut self, block: &TextBlock) -> Result<(), VerseDeckError> {
        (**self).append_text_slide(block)
    }
}
