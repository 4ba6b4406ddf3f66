//! Body paragraph extraction from `word/document.xml`.
//!
//! Besides the paragraph content, the parser records where every body
//! paragraph sits in the source text so that the writer can splice modified
//! paragraphs back in and copy everything else untouched.
//!
//! Content the writer cannot regenerate (drawings, field characters,
//! footnote references, hyperlinks, tracked changes, bookmarks) becomes runs
//! marked [`Verbatim`] that carry their source XML.

use std::ops::Range;

use quick_xml::events::{BytesStart, Event};

use super::styles::{apply_run_property, attr_value};
use crate::error::{Error, Result};
use crate::model::{ExplicitAttributes, FontAttributes, Paragraph, RunProperty, TextRun, Verbatim};

/// A body paragraph and its location in the source XML.
#[derive(Debug, Clone)]
pub(crate) struct ParsedParagraph {
    /// Byte span of the whole `w:p` element
    pub span: Range<usize>,
    /// Opening `w:p` tag, including its attributes
    pub open_tag: String,
    /// Verbatim `w:pPr` element
    pub properties: Option<String>,
    pub paragraph: Paragraph,
}

/// Body paragraphs plus the insertion points of the body.
#[derive(Debug, Clone)]
pub(crate) struct BodyLayout {
    /// Offset just after `<w:body>`
    pub start: usize,
    /// Offset of the body-level `w:sectPr`, or of `</w:body>`
    pub end: usize,
    pub paragraphs: Vec<ParsedParagraph>,
}

#[derive(Default)]
struct PropertyChild {
    depth: u32,
    start: usize,
    name: String,
}

/// An element being skipped over while its span is recorded.
struct Element {
    start: usize,
    depth: u32,
}

impl Element {
    fn open(start: usize) -> Self {
        Self { start, depth: 1 }
    }

    /// Track an end tag. Returns `true` once the element itself closes.
    fn close(&mut self) -> bool {
        self.depth -= 1;
        self.depth == 0
    }
}

/// A paragraph-level element wrapping runs, e.g. `w:hyperlink` or `w:ins`.
struct Wrapper {
    element: Element,
    /// Index of the first run inside the wrapper
    mark: usize,
    /// Alternatives hold the same runs twice, so none are read
    opaque: bool,
}

struct RunState {
    open_tag: String,
    /// Verbatim `w:rPr`, empty when the run has none
    properties_xml: String,
    text: String,
    font: FontAttributes,
    explicit: ExplicitAttributes,
    properties: Vec<RunProperty>,
    in_text: bool,
    /// Set while inside `w:rPr`
    rpr: Option<PropertyChild>,
    rpr_start: usize,
    /// Non-text child being skipped
    object: Option<Element>,
    pieces: Vec<TextRun>,
}

impl RunState {
    fn new(open_tag: &str, defaults: &FontAttributes) -> Self {
        Self {
            open_tag: open_tag.to_string(),
            properties_xml: String::new(),
            text: String::new(),
            font: *defaults,
            explicit: ExplicitAttributes::default(),
            properties: Vec::new(),
            in_text: false,
            rpr: None,
            rpr_start: 0,
            object: None,
            pieces: Vec::new(),
        }
    }

    fn piece(&self, text: String, verbatim: Option<Verbatim>) -> TextRun {
        TextRun {
            text,
            font: self.font,
            explicit: self.explicit,
            properties: self.properties.clone(),
            verbatim,
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            let piece = self.piece(text, None);
            self.pieces.push(piece);
        }
    }

    /// Add a child that is written back on its own, wrapped in this run's tags.
    fn push_object(&mut self, object_xml: &str, text: &str) {
        self.flush_text();
        let xml = format!("{}{}{}</w:r>", self.open_tag, self.properties_xml, object_xml);
        let piece = self.piece(text.to_string(), Some(Verbatim { group: 0, xml }));
        self.pieces.push(piece);
    }
}

struct ParagraphState {
    start: usize,
    open_tag: String,
    pending_properties: Option<Element>,
    properties: Option<String>,
    runs: Vec<TextRun>,
    run: Option<RunState>,
    wrapper: Option<Wrapper>,
    groups: usize,
}

impl ParagraphState {
    fn new(start: usize, open_tag: &str) -> Self {
        Self {
            start,
            open_tag: open_tag.to_string(),
            pending_properties: None,
            properties: None,
            runs: Vec::new(),
            run: None,
            wrapper: None,
            groups: 0,
        }
    }

    fn next_group(&mut self) -> usize {
        self.groups += 1;
        self.groups - 1
    }

    fn push_verbatim(&mut self, xml: &str) {
        let group = self.next_group();
        self.runs.push(TextRun {
            verbatim: Some(Verbatim {
                group,
                xml: xml.to_string(),
            }),
            ..Default::default()
        });
    }

    fn start_element(&mut self, xml: &str, e: &BytesStart, span: Range<usize>, defaults: &FontAttributes) {
        let name = e.name();
        let name = name.as_ref();

        // w:pPrChange nests another w:pPr
        if let Some(properties) = self.pending_properties.as_mut() {
            properties.depth += 1;
            return;
        }

        let Some(run) = self.run.as_mut() else {
            let wrapper = self.wrapper.as_mut().filter(|w| w.opaque || name != b"w:r");
            if let Some(wrapper) = wrapper {
                wrapper.element.depth += 1;
            } else if name == b"w:r" {
                self.run = Some(RunState::new(&xml[span], defaults));
            } else if name == b"w:pPr" {
                self.pending_properties = Some(Element::open(span.start));
            } else {
                self.wrapper = Some(Wrapper {
                    element: Element::open(span.start),
                    mark: self.runs.len(),
                    opaque: name == b"mc:AlternateContent",
                });
            }
            return;
        };

        if let Some(object) = run.object.as_mut() {
            object.depth += 1;
            return;
        }

        if let Some(child) = run.rpr.as_mut() {
            if child.depth == 0 {
                child.start = span.start;
                child.name = String::from_utf8_lossy(name).to_string();
            }
            child.depth += 1;
            return;
        }

        match name {
            b"w:rPr" => {
                run.rpr = Some(PropertyChild::default());
                run.rpr_start = span.start;
            }
            b"w:t" => run.in_text = true,
            _ => {
                run.flush_text();
                run.object = Some(Element::open(span.start));
            }
        }
    }

    fn empty_element(&mut self, xml: &str, e: &BytesStart, span: Range<usize>) {
        let name = e.name();
        let name = name.as_ref();

        if self.pending_properties.is_some() {
            return;
        }

        let Some(run) = self.run.as_mut() else {
            if self.wrapper.is_some() {
                return;
            }
            match name {
                b"w:pPr" => self.properties = Some(xml[span].to_string()),
                b"w:r" => {}
                _ => self.push_verbatim(&xml[span]),
            }
            return;
        };

        if run.object.is_some() {
            return;
        }

        if let Some(child) = run.rpr.as_ref() {
            if child.depth == 0 && !apply_run_property(&mut run.font, &mut run.explicit, e) {
                run.properties.push(RunProperty {
                    name: String::from_utf8_lossy(name).to_string(),
                    xml: xml[span].to_string(),
                });
            }
            return;
        }

        match name {
            b"w:tab" => run.text.push('\t'),
            b"w:cr" => run.text.push('\n'),
            b"w:br" => match attr_value(e, b"w:type").as_deref() {
                None | Some("textWrapping") => run.text.push('\n'),
                // Page and column breaks still separate words
                Some(_) => run.push_object(&xml[span], "\n"),
            },
            b"w:t" | b"w:rPr" => {}
            _ => run.push_object(&xml[span], ""),
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            if run.in_text && run.rpr.is_none() && run.object.is_none() {
                run.text.push_str(text);
            }
        }
    }

    fn end_element(&mut self, xml: &str, name: &[u8], after: usize) {
        if let Some(properties) = self.pending_properties.as_mut() {
            if properties.close() {
                self.properties = Some(xml[properties.start..after].to_string());
                self.pending_properties = None;
            }
            return;
        }

        let Some(run) = self.run.as_mut() else {
            if let Some(wrapper) = self.wrapper.as_mut() {
                if wrapper.element.close() {
                    let start = wrapper.element.start;
                    let mark = wrapper.mark;
                    self.wrapper = None;
                    self.close_wrapper(&xml[start..after], mark);
                }
            }
            return;
        };

        if let Some(object) = run.object.as_mut() {
            if object.close() {
                let start = object.start;
                run.object = None;
                run.push_object(&xml[start..after], "");
            }
            return;
        }

        if let Some(child) = run.rpr.as_mut() {
            if child.depth == 0 {
                // End of w:rPr itself
                run.rpr = None;
                run.properties_xml = xml[run.rpr_start..after].to_string();
                return;
            }
            child.depth -= 1;
            if child.depth == 0 {
                run.properties.push(RunProperty {
                    name: child.name.clone(),
                    xml: xml[child.start..after].to_string(),
                });
            }
            return;
        }

        match name {
            b"w:r" => {
                if let Some(mut run) = self.run.take() {
                    run.flush_text();
                    for mut piece in run.pieces {
                        if let Some(verbatim) = piece.verbatim.as_mut() {
                            verbatim.group = self.next_group();
                        }
                        self.runs.push(piece);
                    }
                }
            }
            b"w:t" => run.in_text = false,
            _ => {}
        }
    }

    /// Mark the runs of a closed wrapper as one verbatim group.
    fn close_wrapper(&mut self, wrapper_xml: &str, mark: usize) {
        if mark == self.runs.len() {
            self.push_verbatim(wrapper_xml);
            return;
        }
        let group = self.next_group();
        for run in &mut self.runs[mark..] {
            run.verbatim = Some(Verbatim {
                group,
                xml: wrapper_xml.to_string(),
            });
        }
    }

    fn finish(self, end: usize) -> ParsedParagraph {
        let mut paragraph = Paragraph::from_runs(self.runs);
        paragraph.merge_adjacent_runs();
        ParsedParagraph {
            span: self.start..end,
            open_tag: self.open_tag,
            properties: self.properties,
            paragraph,
        }
    }
}

/// Turn `<w:p .../>` into `<w:p ...>`.
fn open_form(tag: &str) -> String {
    match tag.strip_suffix("/>") {
        Some(head) => format!("{}>", head.trim_end()),
        None => tag.to_string(),
    }
}

/// Parse the body paragraphs of a `word/document.xml` part.
///
/// Paragraphs inside tables and nested paragraphs (text boxes) are not
/// body paragraphs and are left to the surrounding XML.
pub(crate) fn parse_body(xml: &str, defaults: &FontAttributes) -> Result<BodyLayout> {
    let mut reader = quick_xml::Reader::from_str(xml);
    // Keep whitespace: it is part of run text and of the byte offsets
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut in_body = false;
    let mut body_start: Option<usize> = None;
    let mut body_end: Option<usize> = None;
    let mut table_depth: u32 = 0;
    let mut para_depth: u32 = 0;
    let mut current: Option<ParagraphState> = None;
    let mut paragraphs = Vec::new();

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) => match e.name().as_ref() {
                b"w:body" if !in_body => {
                    in_body = true;
                    body_start = Some(after);
                }
                _ if !in_body => {}
                b"w:tbl" if para_depth == 0 => table_depth += 1,
                b"w:p" if para_depth == 0 && table_depth == 0 => {
                    para_depth = 1;
                    current = Some(ParagraphState::new(before, &xml[before..after]));
                }
                b"w:p" if para_depth > 0 => para_depth += 1,
                b"w:sectPr" if para_depth == 0 && table_depth == 0 => {
                    body_end.get_or_insert(before);
                }
                _ if para_depth == 1 => {
                    if let Some(state) = current.as_mut() {
                        state.start_element(xml, e, before..after, defaults);
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                _ if !in_body => {}
                b"w:p" if para_depth == 0 && table_depth == 0 => {
                    let state = ParagraphState::new(before, &open_form(&xml[before..after]));
                    paragraphs.push(state.finish(after));
                }
                b"w:sectPr" if para_depth == 0 && table_depth == 0 => {
                    body_end.get_or_insert(before);
                }
                _ if para_depth == 1 => {
                    if let Some(state) = current.as_mut() {
                        state.empty_element(xml, e, before..after);
                    }
                }
                _ => {}
            },
            Event::Text(ref e) if para_depth == 1 => {
                let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                if let Some(state) = current.as_mut() {
                    state.text(&text);
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                _ if !in_body => {}
                b"w:body" if para_depth == 0 => {
                    body_end.get_or_insert(before);
                    in_body = false;
                }
                b"w:tbl" if para_depth == 0 => table_depth = table_depth.saturating_sub(1),
                b"w:p" if para_depth > 0 => {
                    para_depth -= 1;
                    if para_depth == 0 {
                        if let Some(state) = current.take() {
                            paragraphs.push(state.finish(after));
                        }
                    }
                }
                name if para_depth == 1 => {
                    if let Some(state) = current.as_mut() {
                        state.end_element(xml, name, after);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let start = body_start.ok_or_else(|| Error::MissingComponent("w:body".to_string()))?;
    let end = body_end.ok_or_else(|| Error::XmlParse("unterminated w:body".to_string()))?;

    Ok(BodyLayout {
        start,
        end,
        paragraphs,
    })
}
