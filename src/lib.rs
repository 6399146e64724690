//! versedeck - Bilingual scripture slides for PowerPoint decks
//!
//! This crate parses free-form scripture citations (for example `"창세기 1:1-3, 요한복음 3:16"`),
//! looks each verse up in a multilingual corpus, and appends one slide per verse to an
//! existing `.pptx` presentation. Each slide shows the verse in two translations.
//! It also builds the corpus JSON from legacy per-language verse tables.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use versedeck::{Corpus, GeneratorBuilder, Language};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load the merged corpus
//!     let corpus = Corpus::from_path("bible_data/bible_combined.json")?;
//!
//!     // Korean King James on top, NIV below
//!     let generator = GeneratorBuilder::new()
//!         .with_languages(Language::Kkjv, Language::Niv)
//!         .build()?;
//!
//!     // Append the slides and save the presentation in place
//!     let report = generator.generate_into_file(
//!         "창세기 1:1-3",
//!         &corpus,
//!         Some("service.pptx".as_ref()),
//!     )?;
//!     println!("{} slides added", report.emitted);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Parsing only
//!
//! ```rust
//! use versedeck::{parse_reference, Corpus, Locator};
//!
//! # fn main() -> Result<(), versedeck::VerseDeckError> {
//! let corpus = Corpus::from_reader(r#"{"Genesis":{"1":{"1":{"niv":"A"},"2":{"niv":"B"}}}}"#.as_bytes())?;
//! let locators = parse_reference("Genesis 1:1-2", &corpus)?;
//! assert_eq!(locators, vec![Locator::new("Genesis", 1, 1), Locator::new("Genesis", 1, 2)]);
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Slide Sink
//!
//! Slides go through the [`SlideSink`] trait. A `Vec<TextBlock>` collects the
//! text blocks in memory instead of writing a presentation:
//!
//! ```rust
//! use versedeck::{Corpus, GeneratorBuilder, Language, TextBlock};
//!
//! # fn main() -> Result<(), versedeck::VerseDeckError> {
//! let corpus = Corpus::from_reader(r#"{"Genesis":{"1":{"1":{"kkjv":"A","niv":"B"}}}}"#.as_bytes())?;
//! let generator = GeneratorBuilder::new()
//!     .with_languages(Language::Kkjv, Language::Niv)
//!     .build()?;
//!
//! let mut slides: Vec<TextBlock> = Vec::new();
//! generator.generate("Genesis 1:1", &corpus, &mut slides)?;
//! assert_eq!(slides[0].paragraphs[0].plain_text(), "Genesis 1:1 A");
//! # Ok(())
//! # }
//! ```

mod api;
mod book_alias;
mod builder;
mod corpus;
mod corpus_builder;
mod error;
mod output;
mod presentation;
mod reference;
mod resolver;
mod security;
mod types;

// 公開API
pub use api::{Language, SlideGeometry, SlideStyle};
pub use book_alias::{english_book_name, BOOK_ALIASES};
pub use builder::{GenerationReport, Generator, GeneratorBuilder};
pub use corpus::{BookChapters, ChapterVerses, Corpus};
pub use corpus_builder::{
    build_corpus, CorpusBuilder, SourceSpec, VerseRow, VerseTableSource, WorkbookTableSource,
};
pub use error::VerseDeckError;
pub use output::{SlideSink, VerseBlockFormatter};
pub use presentation::{Presentation, DEFAULT_LAYOUT_INDEX};
pub use reference::{normalize_dashes, parse_fragments, parse_reference, Fragment, RangeSpec};
pub use resolver::resolve;
pub use types::{Locator, Paragraph, ResolvedVerse, TextBlock, TextRun, VerseRecord};
