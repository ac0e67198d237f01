//! Text rendering utilities

use crate::document::Color;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: &'static str,
    /// Font size in points
    pub font_size: f32,
    /// Text color (RGB)
    pub color: Color,
}

/// Encode text as WinAnsi bytes
///
/// Latin-1 maps straight through; the typographic characters WinAnsi places
/// in 0x80..0x9F are translated. Anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

/// Build a PDF literal string `( ... )` with escaping applied
fn literal_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(b'(');
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out.push(b')');
    out
}

/// Generate PDF operators for text insertion
///
/// # Arguments
/// * `text` - Text to show (will be WinAnsi-encoded)
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate of the baseline (PDF coordinates, from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(text: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = Vec::new();

    ops.extend_from_slice(b"BT\n");
    ops.extend_from_slice(
        format!("{} {} {} rg\n", ctx.color.r, ctx.color.g, ctx.color.b).as_bytes(),
    );
    ops.extend_from_slice(format!("/{} {} Tf\n", ctx.font_name, ctx.font_size).as_bytes());
    ops.extend_from_slice(format!("{x:.2} {y:.2} Td\n").as_bytes());
    ops.extend_from_slice(&literal_string(&encode_win_ansi(text)));
    ops.extend_from_slice(b" Tj\nET\n");

    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TextRenderContext {
        TextRenderContext {
            font_name: "F1",
            font_size: 10.0,
            color: Color::black(),
        }
    }

    #[test]
    fn test_generate_text_operators() {
        let ops = generate_text_operators("Hello", 72.0, 700.0, &ctx());
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("BT\n"));
        assert!(ops_str.contains("/F1 10 Tf"));
        assert!(ops_str.contains("72.00 700.00 Td"));
        assert!(ops_str.contains("(Hello) Tj"));
        assert!(ops_str.ends_with("ET\n"));
    }

    #[test]
    fn test_text_operators_escape_parentheses() {
        let ops = generate_text_operators("a (b) c\\", 0.0, 0.0, &ctx());
        let ops_str = String::from_utf8(ops).unwrap();
        assert!(ops_str.contains(r"(a \(b\) c\\) Tj"));
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Abc"), b"Abc".to_vec());
        assert_eq!(encode_win_ansi("é"), vec![0xE9]);
        assert_eq!(encode_win_ansi("€ – •"), vec![0x80, b' ', 0x96, b' ', 0x95]);
        assert_eq!(encode_win_ansi("ก"), b"?".to_vec());
    }
}
