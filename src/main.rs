//! versedeck CLI - Append bilingual scripture slides to a presentation
//!
//! A command-line interface for generating verse slides and building the corpus.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use versedeck::{
    build_corpus, parse_reference, Corpus, GeneratorBuilder, Language, SlideStyle, SourceSpec,
    DEFAULT_LAYOUT_INDEX,
};

const DEFAULT_CORPUS: &str = "bible_data/bible_combined.json";
const DEFAULT_STYLE: &str = "template/slide_format.json";

#[derive(Parser, Debug)]
#[command(name = "versedeck", version, about = "Bilingual scripture slides for PowerPoint")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append one slide per verse to an existing presentation and save it in place
    Generate {
        /// Scripture reference, e.g. "창세기 1:1-3, 요한복음 3:16"
        #[arg(short, long)]
        reference: String,

        /// Presentation (.pptx) to modify
        #[arg(short, long, value_name = "PPTX")]
        presentation: PathBuf,

        /// Translation shown on top
        #[arg(long, default_value = "ngayok")]
        top: Language,

        /// Translation shown below
        #[arg(long, default_value = "niv")]
        bottom: Language,

        /// Merged corpus JSON
        #[arg(long, value_name = "JSON", default_value = DEFAULT_CORPUS)]
        corpus: PathBuf,

        /// Slide style JSON (default: template/slide_format.json when present)
        #[arg(long, value_name = "JSON")]
        style: Option<PathBuf>,

        /// Slide layout index within the first slide master
        #[arg(long, value_name = "INDEX", default_value_t = DEFAULT_LAYOUT_INDEX)]
        layout: usize,
    },

    /// Build the merged corpus JSON from per-language verse tables
    BuildCorpus {
        /// Verse table as <LANG>=<PATH>[#TABLE], e.g. kkjv=legacy/kkjvdb.xlsx
        #[arg(short, long = "source", value_name = "SOURCE", required = true)]
        sources: Vec<SourceSpec>,

        /// Output corpus JSON
        #[arg(short, long, value_name = "JSON", default_value = DEFAULT_CORPUS)]
        output: PathBuf,
    },

    /// Print the verses a reference expands to, one per line
    Parse {
        /// Scripture reference
        #[arg(short, long)]
        reference: String,

        /// Merged corpus JSON (needed for cross-chapter ranges)
        #[arg(long, value_name = "JSON", default_value = DEFAULT_CORPUS)]
        corpus: PathBuf,
    },
}

fn load_corpus(path: &Path) -> Result<Corpus> {
    Corpus::from_path(path).with_context(|| format!("Failed to load corpus {}", path.display()))
}

fn load_style(path: Option<&Path>) -> Result<SlideStyle> {
    match path {
        Some(path) => SlideStyle::from_path(path)
            .with_context(|| format!("Failed to load slide style {}", path.display())),
        None if Path::new(DEFAULT_STYLE).exists() => SlideStyle::from_path(DEFAULT_STYLE)
            .with_context(|| format!("Failed to load slide style {}", DEFAULT_STYLE)),
        None => {
            log::warn!("{} not found, using the default slide style", DEFAULT_STYLE);
            Ok(SlideStyle::default())
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Commands::Generate {
            reference,
            presentation,
            top,
            bottom,
            corpus,
            style,
            layout,
        } => {
            let corpus = load_corpus(&corpus)?;
            let generator = GeneratorBuilder::new()
                .with_style(load_style(style.as_deref())?)
                .with_languages(top, bottom)
                .with_layout_index(layout)
                .build()?;

            let report = generator
                .generate_into_file(&reference, &corpus, Some(presentation.as_path()))
                .with_context(|| format!("Failed to add slides to {}", presentation.display()))?;

            if report.emitted == 0 {
                log::warn!("No slides were added to {}", presentation.display());
            }
            println!(
                "{} slides added to {} ({} verses, {} skipped)",
                report.emitted,
                presentation.display(),
                report.locators.len(),
                report.skipped.len()
            );
        }

        Commands::BuildCorpus { sources, output } => {
            let corpus = build_corpus(&sources).context("Failed to build corpus")?;
            corpus
                .write_to_path(&output)
                .with_context(|| format!("Failed to write corpus {}", output.display()))?;
            println!(
                "Wrote {} books, {} verses to {}",
                corpus.book_count(),
                corpus.verse_count(),
                output.display()
            );
        }

        Commands::Parse { reference, corpus } => {
            let corpus = load_corpus(&corpus)?;
            let locators = parse_reference(&reference, &corpus)?;
            if locators.is_empty() {
                bail!("No valid verses found.");
            }
            for locator in locators {
                println!("{}", locator);
            }
        }
    }

    Ok(())
}
