//! Paragraph XML generation.

use quick_xml::escape::escape;

use crate::model::{FontAttributes, Paragraph, TextRun};

/// Schema order of `w:rPr` children. Word rejects run properties that are
/// out of order, so generated and preserved properties are merged by rank.
const RPR_ORDER: &[&str] = &[
    "w:rStyle",
    "w:rFonts",
    "w:b",
    "w:bCs",
    "w:i",
    "w:iCs",
    "w:caps",
    "w:smallCaps",
    "w:strike",
    "w:dstrike",
    "w:outline",
    "w:shadow",
    "w:emboss",
    "w:imprint",
    "w:noProof",
    "w:snapToGrid",
    "w:vanish",
    "w:webHidden",
    "w:color",
    "w:spacing",
    "w:w",
    "w:kern",
    "w:position",
    "w:sz",
    "w:szCs",
    "w:highlight",
    "w:u",
    "w:effect",
    "w:bdr",
    "w:shd",
    "w:fitText",
    "w:vertAlign",
    "w:rtl",
    "w:cs",
    "w:em",
    "w:lang",
    "w:eastAsianLayout",
    "w:specVanish",
    "w:oMath",
];

fn rank(name: &str) -> usize {
    RPR_ORDER
        .iter()
        .position(|n| *n == name)
        .unwrap_or(RPR_ORDER.len())
}

/// Size in half-points, as `w:sz` stores it.
fn half_points(size: f64) -> u32 {
    (size * 2.0).round().max(1.0) as u32
}

/// Build the `w:rPr` element of a run, or an empty string if it has none.
///
/// An attribute is written when the run states it explicitly or when it
/// differs from the document defaults.
fn run_properties(run: &TextRun, defaults: &FontAttributes) -> String {
    let mut children: Vec<(usize, String)> = run
        .properties
        .iter()
        .map(|p| (rank(&p.name), p.xml.clone()))
        .collect();

    let explicit = run.explicit;
    if explicit.bold || run.font.bold != defaults.bold {
        let b = if run.font.bold { "<w:b/>" } else { r#"<w:b w:val="0"/>"# };
        children.push((rank("w:b"), b.to_string()));
    }
    if explicit.size || half_points(run.font.size) != half_points(defaults.size) {
        children.push((
            rank("w:sz"),
            format!(r#"<w:sz w:val="{}"/>"#, half_points(run.font.size)),
        ));
    }
    if explicit.underline || run.font.underline != defaults.underline {
        children.push((
            rank("w:u"),
            format!(r#"<w:u w:val="{}"/>"#, run.font.underline.ooxml_value()),
        ));
    }

    if children.is_empty() {
        return String::new();
    }

    children.sort_by_key(|(rank, _)| *rank);
    let mut xml = String::from("<w:rPr>");
    for (_, child) in children {
        xml.push_str(&child);
    }
    xml.push_str("</w:rPr>");
    xml
}

/// Write run text, mapping tabs and line breaks back to their elements.
fn run_content(text: &str, out: &mut String) {
    let mut chunk = String::new();
    let flush = |chunk: &mut String, out: &mut String| {
        if !chunk.is_empty() {
            out.push_str(r#"<w:t xml:space="preserve">"#);
            out.push_str(&escape(chunk.as_str()));
            out.push_str("</w:t>");
            chunk.clear();
        }
    };

    for c in text.chars() {
        match c {
            '\t' => {
                flush(&mut chunk, out);
                out.push_str("<w:tab/>");
            }
            '\n' => {
                flush(&mut chunk, out);
                out.push_str("<w:br/>");
            }
            _ => chunk.push(c),
        }
    }
    flush(&mut chunk, out);
}

/// Serialize a paragraph as a `w:p` element.
///
/// `open_tag` and `properties` are the paragraph's original opening tag and
/// `w:pPr`, written back verbatim. Run formatting is written relative to the
/// document defaults. Verbatim runs are copied from their source, once per
/// group.
pub(crate) fn write_paragraph(
    open_tag: &str,
    properties: Option<&str>,
    paragraph: &Paragraph,
    defaults: &FontAttributes,
) -> String {
    let mut xml = String::from(open_tag);
    if let Some(properties) = properties {
        xml.push_str(properties);
    }

    let mut last_group = None;
    for run in paragraph.runs.iter().filter(|r| !r.is_empty()) {
        if let Some(verbatim) = &run.verbatim {
            if last_group != Some(verbatim.group) {
                xml.push_str(&verbatim.xml);
                last_group = Some(verbatim.group);
            }
            continue;
        }
        last_group = None;
        xml.push_str("<w:r>");
        xml.push_str(&run_properties(run, defaults));
        run_content(&run.text, &mut xml);
        xml.push_str("</w:r>");
    }

    xml.push_str("</w:p>");
    xml
}
