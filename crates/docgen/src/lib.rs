//! Document Generator - P9 reports and account statements as PDF
//!
//! Each generation request loads an HTML template and a JSON data file,
//! fills the template's `{{TOKEN}}` markers and table rows, and renders the
//! result to `{output_dir}/{prefix}_{yyyyMMdd_HHmmss}.pdf`.
//!
//! # Example
//!
//! ```no_run
//! use docgen::{DocumentGenerator, GeneratorConfig};
//!
//! let generator = DocumentGenerator::new(GeneratorConfig::default());
//! let path = generator.generate_p9()?;
//! println!("P9 PDF generated: {}", path.display());
//! # Ok::<(), docgen::GenerationError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod output;
pub mod render;

pub use config::{DocumentRequest, GeneratorConfig, DEFAULT_PRODUCER};
pub use error::{ConfigError, GenerationError, Result};
pub use generator::{
    populate_p9, populate_statement, DocumentGenerator, P9_ROWS_TOKEN, P9_TOKENS,
    STATEMENT_ROWS_TOKEN, STATEMENT_TOKENS,
};
pub use output::{output_file_name, output_path, Clock, DocumentKind, FixedClock, SystemClock};
pub use render::{HtmlPdfRenderer, PdfRenderer};
