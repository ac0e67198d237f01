//! Standard Type1 fonts and their metrics
//!
//! The base-14 fonts are available in every PDF reader, so nothing has to be
//! embedded. Widths come from the Adobe AFM files for the printable ASCII
//! range; everything else falls back to the width of a digit.

use lopdf::{Dictionary, Object};

/// Helvetica widths for code points 32..=126 (1/1000 em)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold widths for code points 32..=126 (1/1000 em)
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

/// One of the four Helvetica variants from the PDF base-14 set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    #[default]
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFont {
    /// Pick the variant for a weight/style combination
    pub fn from_style(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Helvetica,
            (true, false) => Self::HelveticaBold,
            (false, true) => Self::HelveticaOblique,
            (true, true) => Self::HelveticaBoldOblique,
        }
    }

    /// PostScript name used as `/BaseFont`
    pub fn base_font(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// Page resource name (e.g., "F1")
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::Helvetica => "F1",
            Self::HelveticaBold => "F2",
            Self::HelveticaOblique => "F3",
            Self::HelveticaBoldOblique => "F4",
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, Self::HelveticaBold | Self::HelveticaBoldOblique)
    }

    /// Advance width of a character in 1/1000 em
    ///
    /// Oblique variants share the metrics of their upright counterpart.
    pub fn char_width(self, c: char) -> u16 {
        let table = if self.is_bold() {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };

        match c as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            // no-break space renders like a space
            0xA0 => table[0],
            _ => FALLBACK_WIDTH,
        }
    }

    /// Width of a string in points at the given size
    pub fn text_width_points(self, text: &str, font_size: f32) -> f64 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f64 * font_size as f64 / 1000.0
    }

    /// Font dictionary for this variant
    pub fn to_pdf_dictionary(self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        dict.set(
            "BaseFont",
            Object::Name(self.base_font().as_bytes().to_vec()),
        );
        dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_style() {
        assert_eq!(StandardFont::from_style(false, false), StandardFont::Helvetica);
        assert_eq!(StandardFont::from_style(true, false), StandardFont::HelveticaBold);
        assert_eq!(
            StandardFont::from_style(true, true),
            StandardFont::HelveticaBoldOblique
        );
    }

    #[test]
    fn test_char_widths() {
        assert_eq!(StandardFont::Helvetica.char_width(' '), 278);
        assert_eq!(StandardFont::Helvetica.char_width('0'), 556);
        assert_eq!(StandardFont::Helvetica.char_width('W'), 944);
        assert_eq!(StandardFont::Helvetica.char_width('~'), 584);
        assert_eq!(StandardFont::HelveticaBold.char_width('b'), 611);
        assert_eq!(StandardFont::HelveticaOblique.char_width('i'), 222);
        assert_eq!(StandardFont::Helvetica.char_width('ก'), FALLBACK_WIDTH);
    }

    #[test]
    fn test_text_width_points() {
        // "1000.00" = 6 digits + '.' = 6*556 + 278 = 3614 units
        let width = StandardFont::Helvetica.text_width_points("1000.00", 10.0);
        assert!((width - 36.14).abs() < 1e-9);
        assert_eq!(StandardFont::Helvetica.text_width_points("", 12.0), 0.0);
    }

    #[test]
    fn test_pdf_dictionary() {
        let dict = StandardFont::HelveticaBold.to_pdf_dictionary();
        assert_eq!(dict.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica-Bold");
        assert_eq!(
            dict.get(b"Encoding").unwrap().as_name().unwrap(),
            b"WinAnsiEncoding"
        );
    }
}
