//! HTML to PDF rendering
//!
//! Renders the HTML subset used by document templates: headings,
//! paragraphs, lists, inline bold/italic, line breaks, rules, `data:` URI
//! images, and tables with borders, row/cell backgrounds, and `<thead>`
//! rows that repeat on each page. Text is set in the standard Helvetica
//! family, so nothing has to be embedded.
//!
//! # Example
//!
//! ```
//! use html_render::HtmlRenderer;
//!
//! let pdf = HtmlRenderer::new()
//!     .with_producer("KRA Document Generator")
//!     .render("<html><body><h1>P9</h1><p>Tax deduction card</p></body></html>")
//!     .unwrap();
//! assert!(pdf.starts_with(b"%PDF"));
//! ```

pub mod dom;
mod layout;
pub mod resource;
pub mod style;

use chrono::Local;
use layout::LayoutEngine;
use log::debug;
use pdf_core::{DocumentInfo, PageSize, PdfDocument, PdfError};
use thiserror::Error;

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Document has no content")]
    EmptyDocument,
}

/// Result type for rendering
pub type Result<T> = std::result::Result<T, RenderError>;

/// Page margin when the markup declares none
pub const DEFAULT_MARGIN: f64 = 36.0;

/// Converts HTML markup to PDF bytes
///
/// Page size and margin come from an `@page` rule when the markup has one,
/// otherwise from the renderer's settings.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    fast_mode: bool,
    producer: Option<String>,
    page_size: PageSize,
    margin: f64,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            fast_mode: false,
            producer: None,
            page_size: PageSize::A4,
            margin: DEFAULT_MARGIN,
        }
    }

    /// Skip content measurement for table columns and split them evenly
    pub fn use_fast_mode(self) -> Self {
        self.with_fast_mode(true)
    }

    pub fn with_fast_mode(mut self, fast_mode: bool) -> Self {
        self.fast_mode = fast_mode;
        self
    }

    /// Producer recorded in the document information dictionary
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn is_fast_mode(&self) -> bool {
        self.fast_mode
    }

    /// Render markup to an in-memory PDF
    pub fn render(&self, html: &str) -> Result<Vec<u8>> {
        if html.trim().is_empty() {
            return Err(RenderError::EmptyDocument);
        }

        let mut document = dom::parse(html);
        let css = document.stylesheets().join("\n");
        let stylesheet = style::Stylesheet::parse(&css);
        stylesheet.apply(&mut document.root);
        let page_size = style::page_size_from_css(&css).unwrap_or(self.page_size);
        let margin = style::page_margin_from_css(&css).unwrap_or(self.margin);

        let mut pdf = PdfDocument::new(page_size);
        pdf.set_info(DocumentInfo {
            producer: self.producer.clone(),
            title: document.title(),
            creation_date: Some(Local::now().format("D:%Y%m%d%H%M%S").to_string()),
        });

        LayoutEngine::new(&mut pdf, self.fast_mode, margin).layout_body(document.body())?;

        debug!(
            "Laid out {} page(s) at {:?} with {} style rule(s){}",
            pdf.page_count(),
            page_size,
            stylesheet.len(),
            if self.fast_mode { " in fast mode" } else { "" }
        );
        Ok(pdf.to_bytes()?)
    }
}
