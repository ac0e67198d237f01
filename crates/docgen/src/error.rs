//! Error types for document generation and configuration

use html_render::RenderError;
use std::io;
use std::path::PathBuf;
use template::TemplateError;
use thiserror::Error;

/// Failure of a single generation request
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Loading, binding or row generation failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The PDF backend rejected the document
    #[error("PDF generation failed")]
    RenderFailure(#[source] RenderError),

    #[error("Failed to create output directory {}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<RenderError> for GenerationError {
    fn from(err: RenderError) -> Self {
        GenerationError::RenderFailure(err)
    }
}

/// Result type for generation requests
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to read configuration {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid YAML in {}", path.display())]
    InvalidYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
