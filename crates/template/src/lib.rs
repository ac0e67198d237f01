//! Template Engine - HTML templates populated from JSON data
//!
//! This crate provides:
//! - Template and data loading
//! - Data binding via JSONPath-like expressions
//! - Literal `{{TOKEN}}` substitution through an ordered token table
//! - Table row generation for P9 monthly entries and statement transactions
//! - Currency formatting
//! - Embedding image assets as `data:` URIs
//!
//! # Example
//!
//! ```
//! use template::{TokenBinding, TokenTable};
//!
//! let data = serde_json::json!({ "year": 2024, "totals": { "payeTax": 1234.5 } });
//! let bindings = [
//!     TokenBinding::text("YEAR", "$.year"),
//!     TokenBinding::currency("TOTAL_TAX", "$.totals.payeTax"),
//! ];
//! let table = TokenTable::from_bindings(&bindings, &data).unwrap();
//! assert_eq!(table.apply("{{YEAR}}: {{TOTAL_TAX}}"), "2024: 1234.50");
//! ```

pub mod assets;
pub mod binding;
pub mod format;
pub mod loader;
pub mod rows;
pub mod tokens;

pub use assets::{data_uri, embed_asset, mime_type_for};
pub use binding::{require_binding, resolve_binding, value_to_f64, value_to_string};
pub use format::format_currency;
pub use loader::{load_data, load_template};
pub use rows::{
    monthly_entries, p9_rows, transaction_rows, transactions, MonthlyEntry, Movement, P9Column,
    Totals, Transaction,
};
pub use tokens::{marker, TokenBinding, TokenKind, TokenTable};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Expected {expected} at {path}")]
    UnexpectedType { path: String, expected: &'static str },

    #[error("Invalid JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TemplateError::MissingFile(PathBuf::from("resources/p-nine-report.html"));
        assert_eq!(err.to_string(), "File not found: resources/p-nine-report.html");

        let err = TemplateError::MissingField("$.employer.pin".to_string());
        assert_eq!(err.to_string(), "Missing field: $.employer.pin");

        let err = TemplateError::UnexpectedType {
            path: "$.monthlyData".to_string(),
            expected: "an array",
        };
        assert_eq!(err.to_string(), "Expected an array at $.monthlyData");
    }
}
