//! Block, inline and table layout onto [`PdfDocument`] pages
//!
//! Layout is a single top-to-bottom pass. Block elements stack vertically,
//! inline content is broken into lines by measured word widths, and tables
//! are measured row by row before drawing so that backgrounds, text and
//! borders land in the right order. Rows never split across pages; header
//! rows from `<thead>` repeat after every page break.
//!
//! Backgrounds and borders are only drawn for tables, rows and cells.

use crate::dom::{Element, Node};
use crate::resource::decode_data_uri;
use crate::style::{BoxStyle, TextStyle};
use crate::Result;
use log::warn;
use pdf_core::{Align, Color, PdfDocument};
use std::rc::Rc;

/// Cell padding when the table gives no `cellpadding`
const DEFAULT_CELL_PADDING: f64 = 3.0;
/// Points per CSS pixel
const PX: f64 = 0.75;
const BORDER_WIDTH: f64 = 0.5;
/// Largest honored `colspan`, as in browsers
const MAX_COLSPAN: usize = 1000;

/// Tags laid out as blocks; everything else flows inline
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "center", "dd", "div", "dl", "dt",
    "fieldset", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "html", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "tfoot", "thead", "tr",
    "ul",
];

/// Tags whose content is never rendered
const HIDDEN_TAGS: &[&str] = &["head", "link", "meta", "noscript", "script", "style", "title"];

fn is_block(el: &Element) -> bool {
    BLOCK_TAGS.contains(&el.tag.as_str())
}

fn is_hidden(el: &Element) -> bool {
    HIDDEN_TAGS.contains(&el.tag.as_str())
}

/// HTML whitespace; unlike `char::is_whitespace` this keeps NBSP
fn is_html_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

/// A unit of inline content
#[derive(Debug, Clone)]
enum Inline {
    Word {
        text: String,
        style: TextStyle,
        space_before: bool,
    },
    Image {
        data: Rc<[u8]>,
        width: f64,
        height: f64,
        space_before: bool,
    },
    Break,
}

/// Inline content collected for one block, with whitespace collapsed
#[derive(Debug, Default)]
struct InlineRun {
    items: Vec<Inline>,
    pending_space: bool,
}

impl InlineRun {
    fn push_text(&mut self, text: &str, style: &TextStyle) {
        let mut words = text.split(is_html_space).filter(|w| !w.is_empty()).peekable();
        if words.peek().is_none() {
            self.pending_space |= !text.is_empty();
            return;
        }

        let mut space_before = self.pending_space || text.starts_with(is_html_space);
        for word in words {
            self.items.push(Inline::Word {
                text: word.to_string(),
                style: style.clone(),
                space_before,
            });
            space_before = true;
        }
        self.pending_space = text.ends_with(is_html_space);
    }

    fn push_image(&mut self, data: Rc<[u8]>, width: f64, height: f64) {
        self.items.push(Inline::Image {
            data,
            width,
            height,
            space_before: self.pending_space,
        });
        self.pending_space = false;
    }

    fn push_break(&mut self) {
        self.items.push(Inline::Break);
        self.pending_space = false;
    }

    /// End the current line unless nothing is on it
    fn end_line(&mut self) {
        if matches!(
            self.items.last(),
            Some(Inline::Word { .. } | Inline::Image { .. })
        ) {
            self.push_break();
        }
        self.pending_space = false;
    }

    fn take(&mut self) -> Vec<Inline> {
        self.pending_space = false;
        std::mem::take(&mut self.items)
    }
}

#[derive(Debug, Clone)]
enum FragmentContent {
    Text { text: String, style: TextStyle },
    Image { data: Rc<[u8]>, height: f64 },
}

/// Positioned piece of a line
#[derive(Debug, Clone)]
struct Fragment {
    x: f64,
    width: f64,
    content: FragmentContent,
}

#[derive(Debug, Clone, Default)]
struct Line {
    fragments: Vec<Fragment>,
    width: f64,
    height: f64,
    descent: f64,
}

/// Break inline content into lines no wider than `max_width`
///
/// A single word wider than `max_width` gets a line of its own and overflows.
fn build_lines(items: &[Inline], max_width: f64, empty_line_height: f64) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();

    for item in items {
        let (width, space_width, space_before) = match item {
            Inline::Break => {
                if current.fragments.is_empty() {
                    current.height = current.height.max(empty_line_height);
                }
                lines.push(std::mem::take(&mut current));
                continue;
            }
            Inline::Word {
                text,
                style,
                space_before,
            } => {
                let font = style.font();
                (
                    font.text_width_points(text, style.font_size),
                    font.text_width_points(" ", style.font_size),
                    *space_before,
                )
            }
            Inline::Image {
                width,
                space_before,
                ..
            } => (*width, 0.0, *space_before),
        };

        let mut space = if space_before && !current.fragments.is_empty() {
            space_width
        } else {
            0.0
        };
        if !current.fragments.is_empty() && current.width + space + width > max_width + 0.01 {
            lines.push(std::mem::take(&mut current));
            space = 0.0;
        }

        let x = current.width + space;
        match item {
            Inline::Word { text, style, .. } => {
                current.height = current.height.max(style.line_height());
                current.descent = current.descent.max(style.font_size as f64 * 0.22);

                // Extend the previous fragment when the style is unchanged
                if let Some(Fragment {
                    width: last_width,
                    content: FragmentContent::Text { text: last, style: last_style },
                    ..
                }) = current.fragments.last_mut()
                {
                    if last_style == style {
                        if space > 0.0 {
                            last.push(' ');
                        }
                        last.push_str(text);
                        *last_width += space + width;
                        current.width = x + width;
                        continue;
                    }
                }

                current.fragments.push(Fragment {
                    x,
                    width,
                    content: FragmentContent::Text {
                        text: text.clone(),
                        style: style.clone(),
                    },
                });
            }
            Inline::Image { data, height, .. } => {
                current.height = current.height.max(*height);
                current.fragments.push(Fragment {
                    x,
                    width,
                    content: FragmentContent::Image {
                        data: Rc::clone(data),
                        height: *height,
                    },
                });
            }
            Inline::Break => {}
        }
        current.width = x + width;
    }

    if !current.fragments.is_empty() {
        lines.push(current);
    }
    lines
}

/// Narrowest and single-line widths of inline content
fn content_widths(items: &[Inline]) -> (f64, f64) {
    let mut minimum: f64 = 0.0;
    let mut natural: f64 = 0.0;
    let mut line: f64 = 0.0;

    for item in items {
        match item {
            Inline::Break => {
                natural = natural.max(line);
                line = 0.0;
            }
            Inline::Word {
                text,
                style,
                space_before,
            } => {
                let font = style.font();
                let width = font.text_width_points(text, style.font_size);
                if *space_before && line > 0.0 {
                    line += font.text_width_points(" ", style.font_size);
                }
                line += width;
                minimum = minimum.max(width);
            }
            Inline::Image { width, .. } => {
                line += width;
                minimum = minimum.max(*width);
            }
        }
    }

    (minimum, natural.max(line))
}

/// A table cell with its content collected
struct TableCell {
    style: TextStyle,
    boxed: BoxStyle,
    colspan: usize,
    items: Vec<Inline>,
}

struct TableRow {
    cells: Vec<TableCell>,
    background: Option<Color>,
    min_height: f64,
    header: bool,
}

/// A measured cell ready to draw
struct PlacedCell {
    x: f64,
    width: f64,
    align: Align,
    background: Option<Color>,
    border: bool,
    lines: Vec<Line>,
}

struct PlacedRow {
    width: f64,
    height: f64,
    padding: f64,
    background: Option<Color>,
    header: bool,
    cells: Vec<PlacedCell>,
}

/// Measure a row against the final column widths
fn place_row(row: &TableRow, widths: &[f64], padding: f64, table_border: bool) -> PlacedRow {
    let mut cells = Vec::with_capacity(row.cells.len());
    let mut height = row.min_height;
    let mut x = 0.0;
    let mut column = 0;

    for cell in &row.cells {
        if column >= widths.len() {
            break;
        }
        let span = cell.colspan.min(widths.len() - column);
        let width: f64 = widths[column..column + span].iter().sum();
        let lines = build_lines(
            &cell.items,
            (width - 2.0 * padding).max(1.0),
            cell.style.line_height(),
        );
        let content: f64 = lines
            .iter()
            .map(|line| line.height)
            .sum::<f64>()
            .max(cell.style.line_height());

        height = height
            .max(content + 2.0 * padding)
            .max(cell.boxed.height.unwrap_or(0.0));
        cells.push(PlacedCell {
            x,
            width,
            align: cell.style.align,
            background: cell.boxed.background,
            border: table_border || cell.boxed.border,
            lines,
        });

        x += width;
        column += span;
    }

    PlacedRow {
        width: widths.iter().sum(),
        height,
        padding,
        background: row.background,
        header: row.header,
        cells,
    }
}

/// Lays out a document body page by page
pub(crate) struct LayoutEngine<'a> {
    doc: &'a mut PdfDocument,
    fast_mode: bool,
    margin: f64,
    page_width: f64,
    page_height: f64,
    page: usize,
    y: f64,
}

impl<'a> LayoutEngine<'a> {
    /// Starts the first page
    pub fn new(doc: &'a mut PdfDocument, fast_mode: bool, margin: f64) -> Self {
        let (page_width, page_height) = doc.page_dimensions();
        let page = doc.add_page();
        Self {
            doc,
            fast_mode,
            margin,
            page_width,
            page_height,
            page,
            y: margin,
        }
    }

    pub fn layout_body(&mut self, body: &Element) -> Result<()> {
        let style = TextStyle::default().for_element(body);
        let width = (self.page_width - 2.0 * self.margin).max(1.0);
        self.layout_children(body, &style, self.margin, width)
    }

    fn bottom(&self) -> f64 {
        self.page_height - self.margin
    }

    fn new_page(&mut self) {
        self.page = self.doc.add_page();
        self.y = self.margin;
    }

    /// Break the page unless `height` fits; content taller than a page is
    /// placed at the top of a fresh one and overflows.
    fn ensure_space(&mut self, height: f64) {
        if self.y + height > self.bottom() && self.y > self.margin {
            self.new_page();
        }
    }

    fn layout_children(&mut self, el: &Element, style: &TextStyle, x: f64, width: f64) -> Result<()> {
        let mut run = InlineRun::default();

        for child in &el.children {
            match child {
                Node::Text(text) => run.push_text(text, style),
                Node::Element(child) if is_hidden(child) => {}
                Node::Element(child) if is_block(child) => {
                    self.flush_inline(&mut run, style, x, width)?;
                    self.layout_block(child, style, x, width)?;
                }
                Node::Element(child) => self.collect_inline(child, style, &mut run, width),
            }
        }

        self.flush_inline(&mut run, style, x, width)
    }

    /// Gather inline content, flattening any nested blocks into lines
    fn collect_inline(&mut self, el: &Element, parent: &TextStyle, run: &mut InlineRun, max_width: f64) {
        match el.tag.as_str() {
            "br" => return run.push_break(),
            "img" => {
                if let Some((data, width, height)) = self.load_image(el, max_width) {
                    run.push_image(data, width, height);
                }
                return;
            }
            _ if is_hidden(el) => return,
            _ => {}
        }

        let style = parent.for_element(el);
        let block = is_block(el);
        if block {
            run.end_line();
        }
        for child in &el.children {
            match child {
                Node::Text(text) => run.push_text(text, &style),
                Node::Element(child) => self.collect_inline(child, &style, run, max_width),
            }
        }
        if block {
            run.end_line();
        } else if matches!(el.tag.as_str(), "td" | "th") {
            run.pending_space = true;
        }
    }

    fn flush_inline(&mut self, run: &mut InlineRun, style: &TextStyle, x: f64, width: f64) -> Result<()> {
        let items = run.take();
        if items.is_empty() {
            return Ok(());
        }

        for line in build_lines(&items, width, style.line_height()) {
            self.ensure_space(line.height);
            self.draw_line(&line, x, self.y, width, style.align)?;
            self.y += line.height;
        }
        Ok(())
    }

    fn draw_line(&mut self, line: &Line, x: f64, top: f64, width: f64, align: Align) -> Result<()> {
        let offset = match align {
            Align::Left => 0.0,
            Align::Center => ((width - line.width) / 2.0).max(0.0),
            Align::Right => (width - line.width).max(0.0),
        };
        let baseline = top + line.height - line.descent;

        for fragment in &line.fragments {
            let left = x + offset + fragment.x;
            match &fragment.content {
                FragmentContent::Text { text, style } => {
                    self.doc.set_font(style.font(), style.font_size);
                    self.doc.set_text_color(style.color);
                    self.doc
                        .insert_text(text, self.page, left, baseline, Align::Left)?;
                }
                FragmentContent::Image { data, height } => {
                    self.doc.insert_image(
                        data,
                        self.page,
                        left,
                        baseline - height,
                        fragment.width,
                        *height,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn layout_block(&mut self, el: &Element, parent: &TextStyle, x: f64, width: f64) -> Result<()> {
        match el.tag.as_str() {
            "table" => return self.layout_table(el, parent, x, width),
            "hr" => {
                self.ensure_space(8.0);
                self.y += 4.0;
                self.doc
                    .draw_line(self.page, x, self.y, x + width, self.y, Color::gray(), 0.75)?;
                self.y += 4.0;
                return Ok(());
            }
            _ => {}
        }

        let style = parent.for_element(el);
        let boxed = BoxStyle::for_element(el, style.font_size);
        let width = boxed
            .width
            .map(|w| w.resolve(width).min(width))
            .unwrap_or(width);
        let em = style.font_size as f64;
        let (before, after) = match el.tag.as_str() {
            "p" | "ul" | "ol" | "blockquote" | "dl" => (0.0, 0.8 * em),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => (0.4 * em, 0.5 * em),
            _ => (0.0, 0.0),
        };

        self.y += before;
        let start = self.y;
        match el.tag.as_str() {
            "ul" | "ol" => self.layout_list(el, &style, x, width)?,
            "blockquote" | "dd" => self.layout_children(el, &style, x + 2.0 * em, width - 2.0 * em)?,
            _ => self.layout_children(el, &style, x, width)?,
        }
        if let Some(height) = boxed.height {
            // Content is not clipped to the declared height
            self.y = self.y.max(start + height);
        }
        self.y += after;
        Ok(())
    }

    fn layout_list(&mut self, list: &Element, style: &TextStyle, x: f64, width: f64) -> Result<()> {
        let indent = 1.5 * style.font_size as f64;
        let ordered = list.tag == "ol";

        for (index, item) in list.elements().filter(|el| el.tag == "li").enumerate() {
            let item_style = style.for_element(item);
            let mut run = InlineRun::default();
            let marker = if ordered {
                format!("{}.", index + 1)
            } else {
                "\u{2022}".to_string()
            };
            run.push_text(&format!("{marker} "), &item_style);
            for child in &item.children {
                match child {
                    Node::Text(text) => run.push_text(text, &item_style),
                    Node::Element(child) => {
                        self.collect_inline(child, &item_style, &mut run, width - indent)
                    }
                }
            }
            self.flush_inline(&mut run, &item_style, x + indent, width - indent)?;
        }
        Ok(())
    }

    /// Decode an `<img>` and size it in points
    fn load_image(&mut self, el: &Element, max_width: f64) -> Option<(Rc<[u8]>, f64, f64)> {
        let src = el.attr("src").unwrap_or_default();
        let Some(uri) = decode_data_uri(src) else {
            let shown: String = src.chars().take(60).collect();
            warn!("Skipping image with non-embedded source '{shown}'");
            return None;
        };

        let (pixel_width, pixel_height) = match self.doc.image_dimensions(&uri.data) {
            Ok(dimensions) => dimensions,
            Err(err) => {
                warn!("Skipping undecodable {} image: {err}", uri.mime_type);
                return None;
            }
        };
        if pixel_width == 0 || pixel_height == 0 {
            return None;
        }
        let aspect = pixel_height as f64 / pixel_width as f64;

        let boxed = BoxStyle::for_element(el, 10.0);
        let width = boxed.width.map(|w| w.resolve(max_width));
        let (mut width, mut height) = match (width, boxed.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w * aspect),
            (None, Some(h)) => (h / aspect, h),
            (None, None) => (pixel_width as f64 * PX, pixel_height as f64 * PX),
        };
        if width > max_width && max_width > 0.0 {
            height *= max_width / width;
            width = max_width;
        }

        Some((Rc::from(uri.data), width, height))
    }

    fn layout_table(&mut self, table: &Element, parent: &TextStyle, x: f64, width: f64) -> Result<()> {
        let style = parent.for_element(table);
        let boxed = BoxStyle::for_element(table, style.font_size);
        let table_width = boxed
            .width
            .map(|w| w.resolve(width).min(width))
            .unwrap_or(width);
        let padding = table
            .attr("cellpadding")
            .and_then(|p| p.trim().parse::<f64>().ok())
            .map(|p| p * PX)
            .unwrap_or(DEFAULT_CELL_PADDING);

        let rows = self.collect_rows(table, &style, table_width);
        let columns = rows
            .iter()
            .map(|row| row.cells.iter().map(|cell| cell.colspan).sum::<usize>())
            .max()
            .unwrap_or(0);
        if columns == 0 {
            return Ok(());
        }

        let widths = self.column_widths(&rows, columns, table_width, padding);
        let placed: Vec<PlacedRow> = rows
            .iter()
            .map(|row| place_row(row, &widths, padding, boxed.border))
            .collect();

        let header_height: f64 = placed
            .iter()
            .take_while(|row| row.header)
            .map(|row| row.height)
            .sum();
        let repeat_header = header_height > 0.0 && header_height < (self.bottom() - self.margin) / 2.0;

        for row in &placed {
            if self.y + row.height > self.bottom() && self.y > self.margin {
                self.new_page();
                if repeat_header && !row.header {
                    for header in placed.iter().take_while(|row| row.header) {
                        self.draw_row(header, x)?;
                    }
                }
            }
            self.draw_row(row, x)?;
        }

        self.y += 0.5 * style.font_size as f64;
        Ok(())
    }

    fn collect_rows(&mut self, table: &Element, style: &TextStyle, table_width: f64) -> Vec<TableRow> {
        let mut rows = Vec::new();

        for child in table.elements() {
            match child.tag.as_str() {
                "tr" => rows.push(self.collect_row(child, style, false, table_width)),
                "thead" | "tbody" | "tfoot" => {
                    let section_style = style.for_element(child);
                    let header = child.tag == "thead";
                    for tr in child.elements().filter(|el| el.tag == "tr") {
                        rows.push(self.collect_row(tr, &section_style, header, table_width));
                    }
                }
                _ => {}
            }
        }

        rows
    }

    fn collect_row(&mut self, tr: &Element, parent: &TextStyle, header: bool, table_width: f64) -> TableRow {
        let style = parent.for_element(tr);
        let boxed = BoxStyle::for_element(tr, style.font_size);

        let cells = tr
            .elements()
            .filter(|el| matches!(el.tag.as_str(), "td" | "th"))
            .map(|cell| {
                let cell_style = style.for_element(cell);
                let mut run = InlineRun::default();
                for child in &cell.children {
                    match child {
                        Node::Text(text) => run.push_text(text, &cell_style),
                        Node::Element(child) => {
                            self.collect_inline(child, &cell_style, &mut run, table_width)
                        }
                    }
                }
                TableCell {
                    boxed: BoxStyle::for_element(cell, cell_style.font_size),
                    colspan: cell
                        .attr("colspan")
                        .and_then(|span| span.trim().parse::<u64>().ok())
                        .map_or(1, |span| span.clamp(1, MAX_COLSPAN as u64) as usize),
                    items: run.take(),
                    style: cell_style,
                }
            })
            .collect();

        TableRow {
            cells,
            background: boxed.background,
            min_height: boxed.height.unwrap_or(0.0),
            header,
        }
    }

    /// Equal widths in fast mode; otherwise widths follow content, giving
    /// every column at least its longest word when the table allows it.
    fn column_widths(&self, rows: &[TableRow], columns: usize, table_width: f64, padding: f64) -> Vec<f64> {
        let equal = vec![table_width / columns as f64; columns];
        if self.fast_mode {
            return equal;
        }

        let floor = 2.0 * padding + 1.0;
        let mut minimum = vec![floor; columns];
        let mut natural = vec![floor; columns];
        let mut fixed: Vec<Option<f64>> = vec![None; columns];

        for row in rows {
            let mut column = 0;
            for cell in &row.cells {
                if column >= columns {
                    break;
                }
                if cell.colspan == 1 {
                    let (min, nat) = content_widths(&cell.items);
                    minimum[column] = minimum[column].max(min + 2.0 * padding);
                    natural[column] = natural[column].max(nat + 2.0 * padding);
                    if let Some(width) = cell.boxed.width {
                        fixed[column] = Some(width.resolve(table_width));
                    }
                }
                column += cell.colspan;
            }
        }

        for (column, width) in fixed.iter().enumerate() {
            if let Some(width) = *width {
                minimum[column] = width;
                natural[column] = width;
            }
        }

        let total_minimum: f64 = minimum.iter().sum();
        let total_natural: f64 = natural.iter().sum();

        if total_natural <= table_width {
            let scale = table_width / total_natural;
            natural.iter().map(|w| w * scale).collect()
        } else if total_minimum >= table_width {
            let scale = table_width / total_minimum;
            minimum.iter().map(|w| w * scale).collect()
        } else {
            let share = (table_width - total_minimum) / (total_natural - total_minimum);
            minimum
                .iter()
                .zip(&natural)
                .map(|(min, nat)| min + (nat - min) * share)
                .collect()
        }
    }

    fn draw_row(&mut self, row: &PlacedRow, x: f64) -> Result<()> {
        let top = self.y;

        if let Some(background) = row.background {
            self.doc
                .fill_rect(self.page, x, top, row.width, row.height, background)?;
        }
        for cell in &row.cells {
            if let Some(background) = cell.background {
                self.doc
                    .fill_rect(self.page, x + cell.x, top, cell.width, row.height, background)?;
            }
        }

        for cell in &row.cells {
            let inner_width = (cell.width - 2.0 * row.padding).max(0.0);
            let mut line_top = top + row.padding;
            for line in &cell.lines {
                self.draw_line(line, x + cell.x + row.padding, line_top, inner_width, cell.align)?;
                line_top += line.height;
            }
        }

        for cell in row.cells.iter().filter(|cell| cell.border) {
            self.doc.stroke_rect(
                self.page,
                x + cell.x,
                top,
                cell.width,
                row.height,
                Color::black(),
                BORDER_WIDTH,
            )?;
        }

        self.y += row.height;
        Ok(())
    }
}
