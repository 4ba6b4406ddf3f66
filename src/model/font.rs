//! Character formatting attributes tracked per word.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Underline style of a run of text.
///
/// Variant names follow the WordprocessingML `w:u` values; heavy and
/// long variants fold into their base style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    Thick,
    Dotted,
    Dash,
    Wave,
    /// Underline words but not the spaces between them
    Words,
}

impl UnderlineStyle {
    /// Map a `w:u w:val` value to a style.
    ///
    /// Unknown values are treated as `Single`, since Word renders them
    /// as a plain underline.
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "none" => UnderlineStyle::None,
            "single" => UnderlineStyle::Single,
            "double" => UnderlineStyle::Double,
            "thick" => UnderlineStyle::Thick,
            "dotted" | "dottedHeavy" => UnderlineStyle::Dotted,
            "dash" | "dashedHeavy" | "dashLong" | "dashLongHeavy" | "dotDash" | "dashDotHeavy"
            | "dotDotDash" | "dashDotDotHeavy" => UnderlineStyle::Dash,
            "wave" | "wavyHeavy" | "wavyDouble" => UnderlineStyle::Wave,
            "words" => UnderlineStyle::Words,
            _ => UnderlineStyle::Single,
        }
    }

    /// The `w:u w:val` value for this style.
    pub fn ooxml_value(&self) -> &'static str {
        match self {
            UnderlineStyle::None => "none",
            UnderlineStyle::Single => "single",
            UnderlineStyle::Double => "double",
            UnderlineStyle::Thick => "thick",
            UnderlineStyle::Dotted => "dotted",
            UnderlineStyle::Dash => "dash",
            UnderlineStyle::Wave => "wave",
            UnderlineStyle::Words => "words",
        }
    }

    /// Check if this style draws any underline.
    pub fn is_underlined(&self) -> bool {
        !matches!(self, UnderlineStyle::None)
    }
}

/// Snapshot of the formatting attributes of a range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontAttributes {
    /// Bold text
    pub bold: bool,

    /// Underline style
    pub underline: UnderlineStyle,

    /// Font size in points
    pub size: f64,
}

impl Default for FontAttributes {
    fn default() -> Self {
        Self {
            bold: false,
            underline: UnderlineStyle::None,
            size: Self::DEFAULT_SIZE,
        }
    }
}

impl FontAttributes {
    /// Font size used when nothing else specifies one.
    pub const DEFAULT_SIZE: f64 = 11.0;

    /// Create plain attributes with the given size.
    pub fn with_size(size: f64) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Create bold attributes at the default size.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Create singly underlined attributes at the default size.
    pub fn underlined() -> Self {
        Self {
            underline: UnderlineStyle::Single,
            ..Default::default()
        }
    }

    /// Set exactly one attribute, leaving the others untouched.
    pub fn apply(&mut self, attribute: FontAttribute) {
        match attribute {
            FontAttribute::Bold(bold) => self.bold = bold,
            FontAttribute::Underline(style) => self.underline = style,
            FontAttribute::Size(size) => self.size = size,
        }
    }
}

/// A single formatting write.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "lowercase")]
pub enum FontAttribute {
    Bold(bool),
    Underline(UnderlineStyle),
    /// Font size in points
    Size(f64),
}

impl FontAttribute {
    /// Attribute name as used in log and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FontAttribute::Bold(_) => "bold",
            FontAttribute::Underline(_) => "underline",
            FontAttribute::Size(_) => "size",
        }
    }

    /// Reject values no host can apply.
    pub fn validate(&self) -> Result<()> {
        match *self {
            FontAttribute::Size(points) if !points.is_finite() || points <= 0.0 => {
                Err(Error::InvalidAttributeValue(format!(
                    "font size must be a positive number of points, got {}",
                    points
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Attributes a run states directly instead of inheriting them.
///
/// An explicit value is written back even when it matches the document
/// default, since a paragraph style may say otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplicitAttributes {
    pub bold: bool,
    pub underline: bool,
    pub size: bool,
}

impl ExplicitAttributes {
    /// Record that an attribute was set on the run.
    pub fn mark(&mut self, attribute: FontAttribute) {
        match attribute {
            FontAttribute::Bold(_) => self.bold = true,
            FontAttribute::Underline(_) => self.underline = true,
            FontAttribute::Size(_) => self.size = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underline_mapping() {
        assert_eq!(UnderlineStyle::from_ooxml("none"), UnderlineStyle::None);
        assert_eq!(UnderlineStyle::from_ooxml("single"), UnderlineStyle::Single);
        assert_eq!(UnderlineStyle::from_ooxml("wavyHeavy"), UnderlineStyle::Wave);
        assert_eq!(UnderlineStyle::from_ooxml("bogus"), UnderlineStyle::Single);
        assert_eq!(UnderlineStyle::Double.ooxml_value(), "double");
        assert!(!UnderlineStyle::None.is_underlined());
        assert!(UnderlineStyle::Words.is_underlined());
    }

    #[test]
    fn test_apply_touches_one_attribute() {
        let mut font = FontAttributes::with_size(14.0);
        font.apply(FontAttribute::Bold(true));
        assert!(font.bold);
        assert_eq!(font.underline, UnderlineStyle::None);
        assert_eq!(font.size, 14.0);

        font.apply(FontAttribute::Size(9.5));
        assert!(font.bold);
        assert_eq!(font.size, 9.5);
    }

    #[test]
    fn test_validate_size() {
        assert!(FontAttribute::Size(12.0).validate().is_ok());
        assert!(matches!(
            FontAttribute::Size(0.0).validate(),
            Err(Error::InvalidAttributeValue(_))
        ));
        assert!(FontAttribute::Size(-3.0).validate().is_err());
        assert!(FontAttribute::Size(f64::NAN).validate().is_err());
        assert!(FontAttribute::Bold(false).validate().is_ok());
    }

    #[test]
    fn test_mark_explicit() {
        let mut explicit = ExplicitAttributes::default();
        explicit.mark(FontAttribute::Underline(UnderlineStyle::None));
        assert!(explicit.underline);
        assert!(!explicit.bold && !explicit.size);
    }

    #[test]
    fn test_font_serialization() {
        let json = serde_json::to_string(&FontAttributes::underlined()).unwrap();
        assert!(json.contains("\"underline\":\"single\""));
    }
}
