//! Run property interpretation and document defaults.

use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::model::{ExplicitAttributes, FontAttributes, UnderlineStyle};

/// Font size WordprocessingML assumes when no `w:sz` is given anywhere.
pub const OOXML_DEFAULT_SIZE: f64 = 10.0;

/// Get an attribute value as a string.
pub(crate) fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}

/// Helper to get a boolean attribute value.
fn get_bool_attr(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_value(e, key).map(|val| val != "0" && val != "false" && val != "off")
}

/// Apply a `w:rPr` child to a font.
///
/// Every tracked property is recorded in `explicit`. Returns `false` for
/// properties that are not tracked, which the caller keeps verbatim.
pub(crate) fn apply_run_property(
    font: &mut FontAttributes,
    explicit: &mut ExplicitAttributes,
    e: &BytesStart,
) -> bool {
    match e.name().as_ref() {
        b"w:b" => {
            font.bold = get_bool_attr(e, b"w:val").unwrap_or(true);
            explicit.bold = true;
            true
        }
        b"w:u" => {
            font.underline = attr_value(e, b"w:val")
                .map(|val| UnderlineStyle::from_ooxml(&val))
                .unwrap_or(UnderlineStyle::Single);
            explicit.underline = true;
            true
        }
        b"w:sz" => {
            // Half-points
            let half_points = attr_value(e, b"w:val")
                .and_then(|val| val.parse::<f64>().ok())
                .filter(|hp| *hp > 0.0);
            if let Some(hp) = half_points {
                font.size = hp / 2.0;
                explicit.size = true;
            }
            true
        }
        _ => false,
    }
}

/// Parse the default run formatting from `word/styles.xml`.
///
/// Only `w:docDefaults/w:rPrDefault/w:rPr` is read.
pub fn parse_default_font(xml: &str) -> Result<FontAttributes> {
    let mut font = FontAttributes::with_size(OOXML_DEFAULT_SIZE);

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_defaults = false;
    let mut in_rpr = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:rPrDefault" => in_defaults = true,
                b"w:rPr" if in_defaults => in_rpr = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) if in_rpr => {
                apply_run_property(&mut font, &mut ExplicitAttributes::default(), e);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:rPr" => in_rpr = false,
                b"w:rPrDefault" => in_defaults = false,
                b"w:docDefaults" => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(font)
}
