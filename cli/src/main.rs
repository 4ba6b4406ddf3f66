//! wordlens CLI - word formatting and paragraph comparison for Word documents
//!
//! A command-line tool for inspecting and formatting individual words of
//! DOCX paragraphs and comparing paragraphs word by word.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use wordlens::{
    CompareOptions, DocumentService, DocxDocument, FontAttributes, InsertLocation, ParagraphComparison,
    WordInfo,
};

/// Word-indexed formatting and paragraph comparison for Word documents
#[derive(Parser)]
#[command(
    name = "wordlens",
    author = "iyulab",
    version,
    about = "Format and compare words in Word documents",
    long_about = "wordlens - word-indexed formatting and paragraph comparison for DOCX files.\n\n\
                  Words are whitespace-delimited and numbered from 1 within each paragraph."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the words of a paragraph with their formatting
    Words {
        /// Input file path
        input: PathBuf,

        /// Paragraph number (default: every paragraph)
        #[arg(short, long)]
        paragraph: Option<usize>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Make a word bold, or remove bold
    Bold {
        #[command(flatten)]
        target: WordTarget,

        /// Remove the formatting instead of applying it
        #[arg(long)]
        off: bool,
    },

    /// Underline a word, or remove its underline
    Underline {
        #[command(flatten)]
        target: WordTarget,

        /// Remove the formatting instead of applying it
        #[arg(long)]
        off: bool,
    },

    /// Set the font size of a word
    Size {
        #[command(flatten)]
        target: WordTarget,

        /// Font size in points
        points: f64,
    },

    /// Compare two paragraphs word by word
    Compare {
        /// Input file path
        input: PathBuf,

        /// First paragraph number
        #[arg(long, default_value = "1")]
        first: usize,

        /// Second paragraph number
        #[arg(long, default_value = "2")]
        second: usize,

        /// Treat unequal word counts as a difference
        #[arg(long)]
        strict: bool,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Insert a paragraph of plain text
    Insert {
        /// Input file path
        input: PathBuf,

        /// Paragraph text
        text: String,

        /// Where to insert the paragraph
        #[arg(long, default_value = "end")]
        at: Location,

        /// Output file path (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// A word addressed by paragraph and word number
#[derive(clap::Args)]
struct WordTarget {
    /// Input file path
    input: PathBuf,

    /// Paragraph number
    #[arg(short, long)]
    paragraph: usize,

    /// Word number within the paragraph
    #[arg(short, long)]
    word: usize,

    /// Output file path (default: overwrite input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Insert location
#[derive(Clone, ValueEnum)]
enum Location {
    /// Before the first paragraph
    Start,
    /// After the last paragraph
    End,
}

impl From<Location> for InsertLocation {
    fn from(location: Location) -> Self {
        match location {
            Location::Start => InsertLocation::Start,
            Location::End => InsertLocation::End,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Words {
            input,
            paragraph,
            json,
        } => {
            let mut doc = open_document(&input)?;

            let numbers: Vec<usize> = match paragraph {
                Some(n) => vec![n],
                None => (1..=doc.document().len()).collect(),
            };

            let mut listing = Vec::new();
            for n in numbers {
                let paragraph = wordlens::paragraph_at(&mut doc, n)?;
                listing.push((n, wordlens::read_words(&mut doc, paragraph)?));
            }

            if json {
                let value: Vec<_> = listing
                    .iter()
                    .map(|(n, words)| serde_json::json!({ "paragraph": n, "words": words }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                for (n, words) in &listing {
                    println!("{} {}", "Paragraph".cyan().bold(), n);
                    for word in words {
                        print_word(word);
                    }
                }
            }
        }

        Commands::Bold { target, off } => {
            format_target(&target, |doc, paragraph| {
                wordlens::set_or_cancel_word_bold(doc, paragraph, target.word, !off).map(|_| ())
            })?;
        }

        Commands::Underline { target, off } => {
            format_target(&target, |doc, paragraph| {
                wordlens::set_or_cancel_word_underline(doc, paragraph, target.word, !off).map(|_| ())
            })?;
        }

        Commands::Size { target, points } => {
            format_target(&target, |doc, paragraph| {
                wordlens::set_word_size(doc, paragraph, target.word, points).map(|_| ())
            })?;
        }

        Commands::Compare {
            input,
            first,
            second,
            strict,
            json,
        } => {
            let mut doc = open_document(&input)?;
            let left = wordlens::paragraph_at(&mut doc, first)?;
            let right = wordlens::paragraph_at(&mut doc, second)?;

            let options = CompareOptions::new().with_trailing_words(strict);
            let comparison = wordlens::compare_paragraphs_with_options(&mut doc, left, right, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                print_comparison(first, second, &comparison);
            }
        }

        Commands::Insert {
            input,
            text,
            at,
            output,
        } => {
            let mut doc = open_document(&input)?;
            wordlens::insert_paragraph(&mut doc, &text, at.into())?;
            save_document(&doc, output.as_deref().unwrap_or(&input))?;
        }

        Commands::Info { input } => {
            let mut doc = open_document(&input)?;
            let paragraphs = doc.document().len();
            let mut words = 0;
            for n in 1..=paragraphs {
                let paragraph = wordlens::paragraph_at(&mut doc, n)?;
                words += wordlens::read_words(&mut doc, paragraph)?.len();
            }

            println!("{}", "Document Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Paragraphs".bold(), paragraphs);
            println!("{}: {}", "Words".bold(), words);
            println!("{}: {}", "Default font".bold(), describe_font(&doc.default_font()));
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Open a document, apply one word edit and save it.
fn format_target<F>(target: &WordTarget, edit: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut DocxDocument, wordlens::ParagraphRef) -> wordlens::Result<()>,
{
    let mut doc = open_document(&target.input)?;
    let paragraph = wordlens::paragraph_at(&mut doc, target.paragraph)?;
    edit(&mut doc, paragraph)?;

    let word = wordlens::inspect_word(&mut doc, paragraph, target.word)?;
    print_word(&word);
    save_document(&doc, target.output.as_deref().unwrap_or(&target.input))
}

fn open_document(path: &Path) -> Result<DocxDocument, Box<dyn std::error::Error>> {
    let pb = create_spinner("Opening document...");
    let doc = wordlens::open_docx(path);
    pb.finish_and_clear();
    Ok(doc?)
}

fn save_document(doc: &DocxDocument, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if doc.has_pending() {
        log::warn!("Saving with uncommitted operations");
    }
    doc.save(path)?;
    println!("{} Saved: {}", "✓".green().bold(), path.display());
    Ok(())
}

fn describe_font(font: &FontAttributes) -> String {
    let mut parts = Vec::new();
    if font.bold {
        parts.push("bold".to_string());
    }
    if font.underline.is_underlined() {
        parts.push(format!("underline {}", font.underline.ooxml_value()));
    }
    parts.push(format!("{}pt", font.size));
    parts.join(", ")
}

fn print_word(word: &WordInfo) {
    println!(
        "  {:>3}. {}  {}",
        word.index,
        word.text.bold(),
        describe_font(&word.font).dimmed()
    );
}

fn print_comparison(first: usize, second: usize, comparison: &ParagraphComparison) {
    println!(
        "{} {} and {}",
        "Comparing paragraphs".cyan().bold(),
        first,
        second
    );
    println!("{}", "─".repeat(40));

    for verdict in &comparison.per_word {
        let mark = if verdict.words_equal {
            "=".green().bold()
        } else {
            "≠".red().bold()
        };
        let mut details = Vec::new();
        if !verdict.text_equal {
            details.push("text");
        }
        if !verdict.bold_equal {
            details.push("bold");
        }
        if !verdict.underline_equal {
            details.push("underline");
        }
        if !verdict.size_equal {
            details.push("size");
        }

        if details.is_empty() {
            println!("  {} {:>3}. {}", mark, verdict.index, verdict.left_text);
        } else {
            println!(
                "  {} {:>3}. {} / {}  ({})",
                mark,
                verdict.index,
                verdict.left_text,
                verdict.right_text,
                details.join(", ").yellow()
            );
        }
    }

    if comparison.left_words != comparison.right_words {
        println!(
            "{} {} of {} / {} words compared",
            "!".yellow().bold(),
            comparison.compared(),
            comparison.left_words,
            comparison.right_words
        );
    }

    if comparison.equal {
        println!("{} Paragraphs are equal", "✓".green().bold());
    } else {
        println!(
            "{} Paragraphs differ ({} word pairs)",
            "✗".red().bold(),
            comparison.differences().count()
        );
    }
}

fn print_version() {
    println!("{} {}", "wordlens".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Word-indexed formatting and paragraph comparison for Word documents");
    println!();
    println!("Library version: {}", wordlens::version());
    println!("Repository: https://github.com/iyulab/wordlens");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}");
    if let Ok(style) = style {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
