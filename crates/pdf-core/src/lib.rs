//! PDF Core - Low-level PDF writing
//!
//! This crate provides functionality for:
//! - Creating new PDF documents with A4/Letter pages
//! - Writing text with the standard Helvetica family (no embedding needed)
//! - Drawing filled rectangles and lines
//! - Inserting images (JPEG, PNG)
//! - Setting document information (producer, title, creation date)
//!
//! All coordinates passed to [`PdfDocument`] are in points with the origin at
//! the *top-left* corner of the page, which is how layout code thinks about a
//! page. Conversion to PDF's bottom-left origin happens internally.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, PageSize, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::new(PageSize::A4);
//! let page = doc.add_page();
//! doc.set_font(StandardFont::HelveticaBold, 14.0);
//! doc.insert_text("Hello, World!", page, 72.0, 72.0, Align::Left)?;
//! doc.save("output.pdf")?;
//! ```

mod document;
mod font;
mod image;
mod text;

pub use document::{Color, DocumentInfo, PageSize, PdfDocument};
pub use font::StandardFont;
pub use image::ImageXObject;
pub use text::encode_win_ansi;

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
