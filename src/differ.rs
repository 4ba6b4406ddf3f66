//! Word-by-word paragraph comparison.
//!
//! Both paragraphs are segmented independently and the first
//! `n = min(left words, right words)` pairs are compared on text, bold,
//! underline and size. Text comparison is exact and case-sensitive; size
//! comparison is exact with no tolerance.
//!
//! A paragraph with no words cannot be compared and fails with
//! `InsufficientWords`. Trailing words of the longer paragraph do not affect
//! the verdict unless [`CompareOptions::include_trailing_words`] is set.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::locator::{load_words, segment, WordInfo};
use crate::options::CompareOptions;
use crate::service::{Batch, DocumentService, ParagraphRef};

/// Verdict for one pair of words at the same index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordVerdict {
    /// 1-based word index
    pub index: usize,
    /// Word from the first paragraph
    pub left_text: String,
    /// Word from the second paragraph
    pub right_text: String,
    pub text_equal: bool,
    pub bold_equal: bool,
    pub underline_equal: bool,
    pub size_equal: bool,
    /// All four comparisons hold
    pub words_equal: bool,
}

impl WordVerdict {
    /// Compare two words.
    pub fn new(left: &WordInfo, right: &WordInfo) -> Self {
        let text_equal = left.text == right.text;
        let bold_equal = left.font.bold == right.font.bold;
        let underline_equal = left.font.underline == right.font.underline;
        let size_equal = left.font.size == right.font.size;

        Self {
            index: left.index,
            left_text: left.text.clone(),
            right_text: right.text.clone(),
            text_equal,
            bold_equal,
            underline_equal,
            size_equal,
            words_equal: text_equal && bold_equal && underline_equal && size_equal,
        }
    }
}

/// Result of comparing two paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParagraphComparison {
    /// One verdict per compared word pair, in paragraph order
    pub per_word: Vec<WordVerdict>,
    /// Aggregate verdict
    pub equal: bool,
    /// Word count of the first paragraph
    pub left_words: usize,
    /// Word count of the second paragraph
    pub right_words: usize,
}

impl ParagraphComparison {
    /// Number of word pairs that were compared.
    pub fn compared(&self) -> usize {
        self.per_word.len()
    }

    /// Verdicts for the pairs that differ.
    pub fn differences(&self) -> impl Iterator<Item = &WordVerdict> {
        self.per_word.iter().filter(|v| !v.words_equal)
    }
}

/// Compare two paragraphs word by word with default options.
///
/// # Example
///
/// ```
/// use wordlens::{compare_paragraphs, MemoryDocument};
///
/// let mut doc = MemoryDocument::from_texts(["red blue green", "red blue green extra"]);
/// let refs = doc.paragraph_refs();
/// let comparison = compare_paragraphs(&mut doc, refs[0], refs[1])?;
/// assert!(comparison.equal);
/// assert_eq!(comparison.compared(), 3);
/// # Ok::<(), wordlens::Error>(())
/// ```
pub fn compare_paragraphs<S>(
    service: &mut S,
    left: ParagraphRef,
    right: ParagraphRef,
) -> Result<ParagraphComparison>
where
    S: DocumentService + ?Sized,
{
    compare_paragraphs_with_options(service, left, right, &CompareOptions::default())
}

/// Compare two paragraphs word by word.
pub fn compare_paragraphs_with_options<S>(
    service: &mut S,
    left: ParagraphRef,
    right: ParagraphRef,
    options: &CompareOptions,
) -> Result<ParagraphComparison>
where
    S: DocumentService + ?Sized,
{
    let mut batch = Batch::new(service);
    let mut segmented = segment(&mut batch, &[left, right])?.into_iter();
    let left_words = segmented.next().unwrap_or_default();
    let right_words = segmented.next().unwrap_or_default();

    if left_words.is_empty() || right_words.is_empty() {
        return Err(Error::InsufficientWords {
            left: left_words.len(),
            right: right_words.len(),
        });
    }

    let n = left_words.len().min(right_words.len());
    let left_info = load_words(&mut batch, &left_words[..n])?;
    let right_info = load_words(&mut batch, &right_words[..n])?;

    let per_word: Vec<WordVerdict> = left_info
        .iter()
        .zip(&right_info)
        .map(|(l, r)| WordVerdict::new(l, r))
        .collect();

    let mut equal = per_word.iter().all(|v| v.words_equal);
    if options.include_trailing_words && left_words.len() != right_words.len() {
        equal = false;
    }

    log::debug!(
        "Compared paragraphs {} and {}: {} of {} word pairs equal",
        left.id,
        right.id,
        per_word.iter().filter(|v| v.words_equal).count(),
        per_word.len()
    );

    Ok(ParagraphComparison {
        per_word,
        equal,
        left_words: left_words.len(),
        right_words: right_words.len(),
    })
}

/// Compare the first two paragraphs of the document.
///
/// Fails with `InsufficientParagraphs` when the document has fewer than two.
pub fn compare_first_paragraphs<S>(service: &mut S, options: &CompareOptions) -> Result<ParagraphComparison>
where
    S: DocumentService + ?Sized,
{
    let mut batch = Batch::new(service);
    let paragraphs = batch.paragraphs();
    batch.sync()?;
    let paragraphs = paragraphs.get()?;

    match paragraphs.as_slice() {
        [first, second, ..] => {
            let (first, second) = (*first, *second);
            drop(batch);
            compare_paragraphs_with_options(service, first, second, options)
        }
        _ => Err(Error::InsufficientParagraphs {
            found: paragraphs.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{set_or_cancel_word_bold, set_word_size};
    use crate::model::{FontAttributes, Paragraph, TextRun, UnderlineStyle};
    use crate::service::MemoryDocument;

    fn pair(left: &str, right: &str) -> (MemoryDocument, ParagraphRef, ParagraphRef) {
        let doc = MemoryDocument::from_texts([left, right]);
        let refs = doc.paragraph_refs();
        (doc, refs[0], refs[1])
    }

    #[test]
    fn test_identical_paragraphs() {
        let (mut doc, a, b) = pair("Hello world today", "Hello world today");
        let result = compare_paragraphs(&mut doc, a, b).unwrap();
        assert!(result.equal);
        assert_eq!(result.compared(), 3);
        assert!(result.per_word.iter().all(|v| v.words_equal));
    }

    #[test]
    fn test_trailing_words_ignored() {
        let (mut doc, a, b) = pair("red blue green", "red blue green extra");
        let result = compare_paragraphs(&mut doc, a, b).unwrap();
        assert!(result.equal);
        assert_eq!(result.compared(), 3);
        assert_eq!((result.left_words, result.right_words), (3, 4));
    }

    #[test]
    fn test_trailing_words_with_strict_options() {
        let (mut doc, a, b) = pair("red blue green", "red blue green extra");
        let result = compare_paragraphs_with_options(&mut doc, a, b, &CompareOptions::strict()).unwrap();
        assert!(!result.equal);
        assert!(result.per_word.iter().all(|v| v.words_equal));
    }

    #[test]
    fn test_bold_difference() {
        let (mut doc, a, b) = pair("same words here", "same words here");
        set_or_cancel_word_bold(&mut doc, a, 1, true).unwrap();

        let result = compare_paragraphs(&mut doc, a, b).unwrap();
        assert!(!result.per_word[0].bold_equal);
        assert!(result.per_word[0].text_equal);
        assert!(!result.per_word[0].words_equal);
        assert!(result.per_word[1].words_equal);
        assert!(!result.equal);
        assert_eq!(result.differences().count(), 1);
    }

    #[test]
    fn test_text_is_case_sensitive() {
        let (mut doc, a, b) = pair("Hello world", "hello world");
        let result = compare_paragraphs(&mut doc, a, b).unwrap();
        assert!(!result.per_word[0].text_equal);
        assert!(result.per_word[0].bold_equal);
        assert!(!result.equal);
    }

    #[test]
    fn test_size_is_exact() {
        let (mut doc, a, b) = pair("one two", "one two");
        set_word_size(&mut doc, a, 2, 11.0001).unwrap();
        let result = compare_paragraphs(&mut doc, a, b).unwrap();
        assert!(!result.per_word[1].size_equal);
        assert!(!result.equal);
    }

    #[test]
    fn test_underline_difference() {
        let mut doc = MemoryDocument::new();
        let a = doc.push_paragraph(Paragraph::from_runs(vec![TextRun::styled(
            "word",
            FontAttributes {
                underline: UnderlineStyle::Double,
                ..Default::default()
            },
        )]));
        let b = doc.push_paragraph(Paragraph::from_runs(vec![TextRun::styled(
            "word",
            FontAttributes::underlined(),
        )]));
        let result = compare_paragraphs(&mut doc, a, b).unwrap();
        assert!(!result.per_word[0].underline_equal);
        assert!(!result.equal);
    }

    #[test]
    fn test_swapping_keeps_verdict() {
        let (mut doc, a, b) = pair("alpha beta gamma delta", "alpha Beta gamma");
        set_or_cancel_word_bold(&mut doc, b, 3, true).unwrap();

        let forward = compare_paragraphs(&mut doc, a, b).unwrap();
        let backward = compare_paragraphs(&mut doc, b, a).unwrap();
        assert_eq!(forward.equal, backward.equal);
        assert_eq!(forward.compared(), backward.compared());
        assert_eq!(forward.per_word[1].left_text, backward.per_word[1].right_text);
    }

    #[test]
    fn test_zero_words_is_insufficient() {
        let (mut doc, a, b) = pair("   ", "some words");
        assert!(matches!(
            compare_paragraphs(&mut doc, a, b),
            Err(Error::InsufficientWords { left: 0, right: 2 })
        ));
        assert!(matches!(
            compare_paragraphs(&mut doc, b, a),
            Err(Error::InsufficientWords { left: 2, right: 0 })
        ));
    }

    #[test]
    fn test_compare_first_paragraphs() {
        let mut doc = MemoryDocument::from_texts(["one two", "one two", "three"]);
        let result = compare_first_paragraphs(&mut doc, &CompareOptions::default()).unwrap();
        assert!(result.equal);

        let mut single = MemoryDocument::from_texts(["only"]);
        assert!(matches!(
            compare_first_paragraphs(&mut single, &CompareOptions::default()),
            Err(Error::InsufficientParagraphs { found: 1 })
        ));
    }

    #[test]
    fn test_concurrent_edit_fails_comparison() {
        let (mut doc, a, b) = pair("red blue", "red blue");
        doc.remove_paragraph(b).unwrap();
        match compare_paragraphs(&mut doc, a, b) {
            Err(Error::DocumentService(message)) => {
                assert_eq!(message, format!("paragraph {} not found", b.id))
            }
            other => panic!("expected missing paragraph, got {:?}", other),
        }
    }
}
