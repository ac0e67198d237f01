//! Style resolution
//!
//! Understands `style` attributes, a handful of presentational attributes,
//! `<style>` rules whose selectors are a tag, one or more classes, or both
//! (`td`, `.date-col`, `td.balance-amount`, `*`), and the `@page` size and
//! margin. Rules with other selectors are skipped.

use crate::dom::{Element, Node};
use pdf_core::{Align, Color, PageSize, StandardFont};

/// Inherited text properties
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub font_size: f32,
    pub color: Color,
    pub align: Align,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            font_size: 10.0,
            color: Color::black(),
            align: Align::Left,
        }
    }
}

impl TextStyle {
    pub fn font(&self) -> StandardFont {
        StandardFont::from_style(self.bold, self.italic)
    }

    /// Height of one line of text
    pub fn line_height(&self) -> f64 {
        self.font_size as f64 * 1.2
    }

    /// Style for an element's content: tag defaults, then attributes, then
    /// the inline `style` declarations.
    pub fn for_element(&self, el: &Element) -> TextStyle {
        let mut style = self.clone();

        match el.tag.as_str() {
            "h1" => style.heading(2.0),
            "h2" => style.heading(1.5),
            "h3" => style.heading(1.17),
            "h4" => style.heading(1.0),
            "h5" => style.heading(0.83),
            "h6" => style.heading(0.67),
            "b" | "strong" => style.bold = true,
            "i" | "em" | "cite" => style.italic = true,
            "small" => style.font_size *= 0.83,
            "th" => {
                style.bold = true;
                style.align = Align::Center;
            }
            "td" => style.align = Align::Left,
            "center" => style.align = Align::Center,
            _ => {}
        }

        if let Some(align) = el.attr("align").and_then(parse_align) {
            style.align = align;
        }

        for (property, value) in declarations(el) {
            match property.as_str() {
                "font-weight" => {
                    style.bold = match value.as_str() {
                        "bold" | "bolder" => true,
                        "normal" | "lighter" => false,
                        number => number.parse::<u32>().map(|w| w >= 600).unwrap_or(style.bold),
                    }
                }
                "font-style" => style.italic = matches!(value.as_str(), "italic" | "oblique"),
                "font-size" => {
                    if let Some(size) = parse_font_size(&value, style.font_size) {
                        style.font_size = size;
                    }
                }
                "color" => {
                    if let Some(color) = parse_color(&value) {
                        style.color = color;
                    }
                }
                "text-align" => {
                    if let Some(align) = parse_align(&value) {
                        style.align = align;
                    }
                }
                _ => {}
            }
        }

        style
    }

    fn heading(&mut self, scale: f32) {
        self.font_size *= scale;
        self.bold = true;
    }
}

/// Non-inherited box properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxStyle {
    pub background: Option<Color>,
    pub border: bool,
    pub width: Option<Length>,
    pub height: Option<f64>,
}

impl BoxStyle {
    pub fn for_element(el: &Element, font_size: f32) -> Self {
        let mut style = BoxStyle {
            background: el.attr("bgcolor").and_then(parse_color),
            border: el
                .attr("border")
                .map(|b| b.trim().parse::<f64>().map(|w| w > 0.0).unwrap_or(true))
                .unwrap_or(false),
            width: el.attr("width").and_then(|w| Length::parse(w, font_size)),
            height: el
                .attr("height")
                .and_then(|h| Length::parse(h, font_size))
                .and_then(Length::absolute),
        };

        for (property, value) in declarations(el) {
            match property.as_str() {
                "background" | "background-color" => {
                    if let Some(color) = value.split_whitespace().find_map(parse_color) {
                        style.background = Some(color);
                    }
                }
                "border" => {
                    style.border = !matches!(value.as_str(), "none" | "0" | "hidden");
                }
                "width" => style.width = Length::parse(&value, font_size).or(style.width),
                "height" => {
                    style.height = Length::parse(&value, font_size)
                        .and_then(Length::absolute)
                        .or(style.height)
                }
                _ => {}
            }
        }

        style
    }
}

/// A CSS length resolved to points, or a percentage of the container
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Points(f64),
    Percent(f64),
}

impl Length {
    /// Parse `12pt`, `16px`, `1.5em`, `50%`, `2cm`, `10mm`, `1in`, or a bare
    /// number (pixels)
    pub fn parse(value: &str, font_size: f32) -> Option<Length> {
        let value = value.trim().to_ascii_lowercase();
        let split = value
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
            .unwrap_or(value.len());
        let number: f64 = value[..split].parse().ok()?;

        let length = match value[split..].trim() {
            "" | "px" => Length::Points(number * 0.75),
            "pt" => Length::Points(number),
            "em" | "rem" => Length::Points(number * font_size as f64),
            "%" => Length::Percent(number),
            "cm" => Length::Points(number * 72.0 / 2.54),
            "mm" => Length::Points(number * 72.0 / 25.4),
            "in" => Length::Points(number * 72.0),
            _ => return None,
        };
        Some(length)
    }

    pub fn resolve(self, container: f64) -> f64 {
        match self {
            Length::Points(points) => points,
            Length::Percent(percent) => container * percent / 100.0,
        }
    }

    fn absolute(self) -> Option<f64> {
        match self {
            Length::Points(points) => Some(points),
            Length::Percent(_) => None,
        }
    }
}

fn parse_font_size(value: &str, parent: f32) -> Option<f32> {
    let size = match value {
        "xx-small" => 7.0,
        "x-small" => 7.5,
        "small" => 10.0,
        "medium" => 12.0,
        "large" => 13.5,
        "x-large" => 18.0,
        "xx-large" => 24.0,
        "smaller" => parent * 0.83,
        "larger" => parent * 1.2,
        other => Length::parse(other, parent)?.resolve(parent as f64) as f32,
    };
    (size > 0.0).then_some(size)
}

fn parse_align(value: &str) -> Option<Align> {
    match value.trim().to_ascii_lowercase().as_str() {
        "left" | "start" | "justify" => Some(Align::Left),
        "center" => Some(Align::Center),
        "right" | "end" => Some(Align::Right),
        _ => None,
    }
}

/// `property: value` pairs that apply to an element, lowercased: matching
/// stylesheet rules first, then its `style` attribute
pub fn declarations(el: &Element) -> Vec<(String, String)> {
    let mut declarations = el.rules.clone();
    if let Some(style) = el.attr("style") {
        declarations.extend(parse_declarations(style));
    }
    declarations
}

pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_ascii_lowercase();
            (!property.is_empty() && !value.is_empty()).then_some((property, value))
        })
        .collect()
}

/// A compound selector: optional tag plus classes
#[derive(Debug, Clone, PartialEq)]
struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    fn parse(text: &str) -> Option<Selector> {
        let text = text.trim();
        if text.is_empty()
            || text.contains(|c: char| c.is_whitespace() || "#:[>+~".contains(c))
        {
            return None;
        }

        let mut parts = text.split('.');
        let tag = match parts.next()? {
            "" | "*" => None,
            tag => Some(tag.to_ascii_lowercase()),
        };
        let classes: Vec<String> = parts.map(str::to_string).collect();
        if classes.iter().any(String::is_empty) {
            return None;
        }
        Some(Selector { tag, classes })
    }

    fn matches(&self, el: &Element) -> bool {
        self.tag.as_ref().map_or(true, |tag| *tag == el.tag)
            && self
                .classes
                .iter()
                .all(|class| el.classes().any(|c| c == class))
    }

    /// (classes, tags), compared lexicographically
    fn specificity(&self) -> (usize, usize) {
        (self.classes.len(), usize::from(self.tag.is_some()))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Rule {
    selector: Selector,
    declarations: Vec<(String, String)>,
}

/// Rules collected from `<style>` blocks, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

impl Stylesheet {
    /// Parse style sheet text; at-rules and unsupported selectors are skipped
    pub fn parse(css: &str) -> Self {
        let css = strip_comments(css);
        let mut rules = Vec::new();
        let mut rest = css.as_str();

        while let Some(open) = rest.find('{') {
            let Some(close) = matching_brace(rest, open) else {
                break;
            };
            let prelude = rest[..open].trim();

            if !prelude.starts_with('@') {
                let declarations = parse_declarations(&rest[open + 1..close]);
                for selector in prelude.split(',').filter_map(Selector::parse) {
                    rules.push(Rule {
                        selector,
                        declarations: declarations.clone(),
                    });
                }
            }
            rest = &rest[close + 1..];
        }

        Stylesheet { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Declarations of the rules matching `el`, by specificity then source order
    pub fn matching(&self, el: &Element) -> Vec<(String, String)> {
        let mut matched: Vec<(usize, &Rule)> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.selector.matches(el))
            .collect();
        matched.sort_by_key(|(order, rule)| (rule.selector.specificity(), *order));

        matched
            .into_iter()
            .flat_map(|(_, rule)| rule.declarations.iter().cloned())
            .collect()
    }

    /// Record matching declarations on `el` and all of its descendants
    pub fn apply(&self, el: &mut Element) {
        if self.is_empty() {
            return;
        }
        el.rules = self.matching(el);
        for child in &mut el.children {
            if let Node::Element(child) = child {
                self.apply(child);
            }
        }
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        rest = match rest[start + 2..].find("*/") {
            Some(end) => &rest[start + 2 + end + 2..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}

/// Index of the `}` closing the block opened at `open`
fn matching_brace(css: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in css[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse `#rgb`, `#rrggbb`, `rgb(r, g, b)`, or a basic color name
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;
        return match digits.as_slice() {
            [r, g, b] => Some(Color::from_rgb(r * 17, g * 17, b * 17)),
            [r1, r2, g1, g2, b1, b2] => {
                Some(Color::from_rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2))
            }
            _ => None,
        };
    }

    if let Some(args) = value
        .strip_prefix("rgb(")
        .or_else(|| value.strip_prefix("rgba("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels: Vec<u8> = args
            .split(',')
            .take(3)
            .map(|c| c.trim().parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0) as u8))
            .collect::<Option<_>>()?;
        return match channels.as_slice() {
            [r, g, b] => Some(Color::from_rgb(*r, *g, *b)),
            _ => None,
        };
    }

    let (r, g, b) = match value.as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "red" => (255, 0, 0),
        "maroon" => (128, 0, 0),
        "green" => (0, 128, 0),
        "darkgreen" => (0, 100, 0),
        "blue" => (0, 0, 255),
        "navy" => (0, 0, 128),
        "orange" => (255, 165, 0),
        _ => return None,
    };
    Some(Color::from_rgb(r, g, b))
}

/// Page size from an `@page { size: ... }` rule
///
/// Understands `A4`, `letter`, either followed by `landscape` or `portrait`,
/// a bare `landscape`, and two explicit lengths.
pub fn page_size_from_css(css: &str) -> Option<PageSize> {
    let size = page_rule_property(css, "size")?;
    let words: Vec<&str> = size.split_whitespace().collect();
    let landscape = words.contains(&"landscape");

    let page = match words.first().copied()? {
        "a4" | "landscape" | "portrait" | "auto" => {
            if landscape {
                PageSize::A4Landscape
            } else {
                PageSize::A4
            }
        }
        "letter" => {
            if landscape {
                PageSize::LetterLandscape
            } else {
                PageSize::Letter
            }
        }
        first => {
            let width = Length::parse(first, 12.0)?.absolute()?;
            let height = match words.get(1) {
                Some(second) => Length::parse(second, 12.0)?.absolute()?,
                None => width,
            };
            PageSize::Custom(width, height)
        }
    };
    Some(page)
}

/// Uniform page margin from an `@page { margin: ... }` rule
///
/// Only the first value of a shorthand is used.
pub fn page_margin_from_css(css: &str) -> Option<f64> {
    let margin = page_rule_property(css, "margin")?;
    Length::parse(margin.split_whitespace().next()?, 12.0)?.absolute()
}

fn page_rule_property(css: &str, name: &str) -> Option<String> {
    let lower = css.to_ascii_lowercase();
    let start = lower.find("@page")?;
    let block_start = start + lower[start..].find('{')? + 1;
    let block_end = block_start + lower[block_start..].find('}')?;

    parse_declarations(&lower[block_start..block_end])
        .into_iter()
        .find(|(property, _)| property == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;
    use pretty_assertions::assert_eq;

    fn element(html: &str, tag: &str) -> Element {
        parse(html).root.find(tag).unwrap().clone()
    }

    #[test]
    fn test_tag_defaults() {
        let base = TextStyle::default();
        let h1 = base.for_element(&element("<h1>x</h1>", "h1"));
        assert!(h1.bold);
        assert_eq!(h1.font_size, 20.0);

        let th = base.for_element(&element("<table><tr><th>x</th></tr></table>", "th"));
        assert!(th.bold);
        assert_eq!(th.align, Align::Center);
    }

    #[test]
    fn test_inline_style_overrides_defaults() {
        let base = TextStyle::default();
        let td = element(
            "<table><tr><td style='font-weight: bold; text-align:right; font-size: 8pt; color:#ff0000'>x</td></tr></table>",
            "td",
        );
        let style = base.for_element(&td);

        assert!(style.bold);
        assert_eq!(style.align, Align::Right);
        assert_eq!(style.font_size, 8.0);
        assert_eq!(style.color, Color::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_box_style() {
        let tr = element(
            "<table><tr style='font-weight: bold; background-color: #f0f0f0;'><td>TOTAL</td></tr></table>",
            "tr",
        );
        let style = BoxStyle::for_element(&tr, 10.0);
        assert_eq!(style.background, Some(Color::from_rgb(240, 240, 240)));
        assert!(!style.border);

        let table = element("<table border='1' width='100%'></table>", "table");
        let style = BoxStyle::for_element(&table, 10.0);
        assert!(style.border);
        assert_eq!(style.width, Some(Length::Percent(100.0)));

        let table = element("<table border='0'></table>", "table");
        assert!(!BoxStyle::for_element(&table, 10.0).border);
    }

    fn styled(css: &str, html: &str, tag: &str) -> Element {
        let mut doc = parse(html);
        Stylesheet::parse(css).apply(&mut doc.root);
        doc.root.find(tag).unwrap().clone()
    }

    #[test]
    fn test_stylesheet_selectors() {
        let sheet = Stylesheet::parse(
            "/* columns */ @page { size: A4 } td, .x { color: red } \
             td.balance-amount { text-align: right } \
             div p { color: blue } a:hover { color: blue } @media print { p { color: blue } }",
        );
        // td, .x, td.balance-amount
        assert_eq!(sheet.len(), 3);

        let td = styled(
            "",
            "<table><tr><td class='balance-col balance-amount'>1</td></tr></table>",
            "td",
        );
        assert_eq!(
            sheet.matching(&td),
            vec![
                ("color".to_string(), "red".to_string()),
                ("text-align".to_string(), "right".to_string()),
            ]
        );
    }

    #[test]
    fn test_class_rule_applies_to_text_style() {
        let p = styled(".x { font-weight: bold; }", "<p class='x'>Hi</p>", "p");
        let style = TextStyle::default().for_element(&p);

        assert!(style.bold);
        assert_eq!(style.font(), StandardFont::HelveticaBold);
    }

    #[test]
    fn test_class_beats_tag_and_inline_beats_both() {
        let css = ".table-credit { text-align: right; color: #008000 } td { text-align: center; color: red }";
        let td = styled(
            css,
            "<table><tr><td class='table-credit' style='color: blue'>5.00</td><td>x</td></tr></table>",
            "td",
        );
        let style = TextStyle::default().for_element(&td);

        assert_eq!(style.align, Align::Right);
        assert_eq!(style.color, Color::from_rgb(0, 0, 255));
    }

    #[test]
    fn test_class_rule_applies_to_box_style() {
        let tr = styled(
            "tr.totals { background-color: #f0f0f0 }",
            "<table><tr class='totals'><td>TOTAL</td></tr></table>",
            "tr",
        );
        assert_eq!(
            BoxStyle::for_element(&tr, 10.0).background,
            Some(Color::from_rgb(240, 240, 240))
        );
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#fff"), Some(Color::white()));
        assert_eq!(parse_color("#F0F0F0"), Some(Color::from_rgb(240, 240, 240)));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Color::from_rgb(1, 2, 3)));
        assert_eq!(parse_color("black"), Some(Color::black()));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("transparent"), None);
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(Length::parse("16px", 10.0), Some(Length::Points(12.0)));
        assert_eq!(Length::parse("9pt", 10.0), Some(Length::Points(9.0)));
        assert_eq!(Length::parse("1.5em", 10.0), Some(Length::Points(15.0)));
        assert_eq!(Length::parse("50%", 10.0), Some(Length::Percent(50.0)));
        assert_eq!(Length::parse("1in", 10.0), Some(Length::Points(72.0)));
        assert_eq!(Length::parse("auto", 10.0), None);
        assert_eq!(Length::Percent(50.0).resolve(300.0), 150.0);
    }

    #[test]
    fn test_page_size_from_css() {
        assert_eq!(
            page_size_from_css("body { margin: 0 } @page { size: A4 landscape; margin: 1cm }"),
            Some(PageSize::A4Landscape)
        );
        assert_eq!(page_size_from_css("@page { size: letter; }"), Some(PageSize::Letter));
        assert_eq!(page_size_from_css("@page{size:landscape}"), Some(PageSize::A4Landscape));
        assert_eq!(
            page_size_from_css("@page { size: 100pt 200pt }"),
            Some(PageSize::Custom(100.0, 200.0))
        );
        assert_eq!(page_size_from_css("@page { margin: 1cm }"), None);
        assert_eq!(page_size_from_css("td { color: red }"), None);
    }

    #[test]
    fn test_page_margin_from_css() {
        assert_eq!(page_margin_from_css("@page { size: A4; margin: 1in }"), Some(72.0));
        assert_eq!(page_margin_from_css("@page { margin: 20pt 10pt }"), Some(20.0));
        assert_eq!(page_margin_from_css("@page { size: A4 }"), None);
    }
}
