//! Paragraph and text run models.

use serde::{Deserialize, Serialize};

use super::font::{ExplicitAttributes, FontAttribute, FontAttributes};
use crate::error::{Error, Result};

/// A run property carried through unchanged from the source document.
///
/// Only bold, underline and size are interpreted; everything else found in a
/// run's property block (fonts, color, language, ...) is kept as raw XML so
/// that rewriting the run does not lose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunProperty {
    /// Qualified element name, e.g. `w:color`
    pub name: String,
    /// Verbatim XML of the element
    pub xml: String,
}

/// Source XML written back in place of runs that cannot be regenerated.
///
/// Drawings, field codes, footnote references and wrappers such as
/// hyperlinks are kept this way. Runs sharing a `group` came from one
/// element, which is written once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verbatim {
    /// Identifies the source element within its paragraph
    pub group: usize,
    /// Verbatim XML of the element
    pub xml: String,
}

/// A run of text with consistent formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Formatting of every character in the run
    #[serde(default)]
    pub font: FontAttributes,

    /// Uninterpreted properties from the source document
    #[serde(skip)]
    pub properties: Vec<RunProperty>,

    /// Attributes the source stated directly
    #[serde(skip)]
    pub explicit: ExplicitAttributes,

    /// Set when the run must be written back unchanged
    #[serde(skip)]
    pub verbatim: Option<Verbatim>,
}

impl TextRun {
    /// Create a run with default formatting.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a run with the given formatting.
    pub fn styled(text: impl Into<String>, font: FontAttributes) -> Self {
        Self {
            text: text.into(),
            font,
            ..Default::default()
        }
    }

    /// Check if this run is empty.
    ///
    /// A verbatim run is never empty, even without text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.verbatim.is_none()
    }

    /// Whether the run is written back from its source XML.
    pub fn is_verbatim(&self) -> bool {
        self.verbatim.is_some()
    }

    fn same_format(&self, other: &TextRun) -> bool {
        self.font == other.font
            && self.explicit == other.explicit
            && self.properties == other.properties
    }
}

/// A paragraph of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in this paragraph
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with the given text and default formatting.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
        }
    }

    /// Create a paragraph from runs.
    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    /// Get the plain text content.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Length of the plain text in bytes.
    pub fn text_len(&self) -> usize {
        self.runs.iter().map(|r| r.text.len()).sum()
    }

    /// Check if this paragraph has no text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    /// Formatting of the character starting at byte `offset`.
    pub fn font_at(&self, offset: usize) -> Option<FontAttributes> {
        let mut start = 0;
        for run in &self.runs {
            let end = start + run.text.len();
            if offset >= start && offset < end {
                return Some(run.font);
            }
            start = end;
        }
        None
    }

    /// Set one attribute on the byte range `start..end`.
    ///
    /// Runs are split at the range boundaries so that text outside the
    /// range keeps its formatting. Offsets must lie on char boundaries.
    /// Verbatim text cannot be reformatted, so a range overlapping it fails
    /// without changing the paragraph.
    pub fn apply_font(&mut self, start: usize, end: usize, attribute: FontAttribute) -> Result<()> {
        if start >= end {
            return Ok(());
        }

        let mut run_start = 0;
        for run in &self.runs {
            let run_end = run_start + run.text.len();
            if run.is_verbatim() && !run.text.is_empty() && run_start < end && run_end > start {
                return Err(Error::DocumentService(format!(
                    "range {}..{} lies in content that is kept verbatim",
                    start, end
                )));
            }
            run_start = run_end;
        }

        self.split_at(start);
        self.split_at(end);

        let mut run_start = 0;
        for run in &mut self.runs {
            let run_end = run_start + run.text.len();
            if run_start >= start && run_end <= end && !run.text.is_empty() {
                run.font.apply(attribute);
                run.explicit.mark(attribute);
            }
            run_start = run_end;
        }

        self.merge_adjacent_runs();
        Ok(())
    }

    /// Ensure a run boundary exists at byte `offset`.
    fn split_at(&mut self, offset: usize) {
        let mut run_start = 0;
        for i in 0..self.runs.len() {
            let run_end = run_start + self.runs[i].text.len();
            if offset > run_start && offset < run_end {
                let tail_text = self.runs[i].text.split_off(offset - run_start);
                let tail = TextRun {
                    text: tail_text,
                    ..self.runs[i].clone()
                };
                self.runs.insert(i + 1, tail);
                return;
            }
            run_start = run_end;
        }
    }

    /// Merge consecutive runs with the same formatting.
    ///
    /// Empty runs are dropped. Verbatim runs are kept as they are.
    pub fn merge_adjacent_runs(&mut self) {
        if self.runs.len() <= 1 {
            return;
        }

        let mut merged: Vec<TextRun> = Vec::with_capacity(self.runs.len());

        for run in self.runs.drain(..) {
            if run.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if !last.is_verbatim() && !run.is_verbatim() && last.same_format(&run) => {
                    last.text.push_str(&run.text)
                }
                _ => merged.push(run),
            }
        }

        self.runs = merged;
    }
}
