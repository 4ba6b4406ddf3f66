//! Paragraph comparison options.

/// Options for comparing paragraphs.
///
/// # Example
///
/// ```
/// use wordlens::CompareOptions;
///
/// let options = CompareOptions::new().with_trailing_words(true);
/// assert!(options.include_trailing_words);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    /// Treat unequal word counts as a difference.
    ///
    /// Off by default: only the first `min(left, right)` word pairs decide
    /// the verdict and trailing words of the longer paragraph are ignored.
    pub include_trailing_words: bool,
}

impl CompareOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that also require equal word counts.
    pub fn strict() -> Self {
        Self {
            include_trailing_words: true,
        }
    }

    /// Set whether trailing unmatched words make paragraphs unequal.
    pub fn with_trailing_words(mut self, include: bool) -> Self {
        self.include_trailing_words = include;
        self
    }
}
