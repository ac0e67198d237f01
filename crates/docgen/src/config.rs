//! Generator configuration
//!
//! Every field has a default, so a config file only needs the keys it
//! changes. Keys are camelCase:
//!
//! ```yaml
//! outputDir: build/pdf
//! producer: Payroll Office
//! fastMode: false
//! ```

use crate::error::ConfigError;
use crate::output::DocumentKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_PRODUCER: &str = "KRA Document Generator";

/// Paths, output location and rendering options for both flows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub p9_template: PathBuf,
    pub p9_data: PathBuf,
    pub statement_template: PathBuf,
    pub statement_data: PathBuf,
    /// Logo embedded into the statement
    pub logo_file: PathBuf,
    /// Literal reference to the logo inside the statement template
    pub logo_reference: String,
    pub output_dir: PathBuf,
    /// Written to the PDF `Producer` entry
    pub producer: String,
    /// Equal-width table columns instead of measured ones
    pub fast_mode: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            p9_template: PathBuf::from("resources/p-nine-report.html"),
            p9_data: PathBuf::from("resources/data/p9-data.json"),
            statement_template: PathBuf::from("resources/account-statements.html"),
            statement_data: PathBuf::from("resources/data/account-statements-data.json"),
            logo_file: PathBuf::from("resources/assets/ukulima-sacco-logo.png"),
            logo_reference: "assets/ukulima-sacco-logo.png".to_string(),
            output_dir: PathBuf::from("out"),
            producer: DEFAULT_PRODUCER.to_string(),
            fast_mode: true,
        }
    }
}

impl GeneratorConfig {
    /// Load a YAML configuration file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let config = Self::from_yaml(&content).map_err(|source| ConfigError::InvalidYaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without validating; an empty document yields the defaults
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.producer.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "producer",
                reason: "must not be empty".to_string(),
            });
        }
        if self.logo_reference.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logoReference",
                reason: "must not be empty".to_string(),
            });
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "outputDir",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Template and data paths for one document kind
    pub fn request(&self, kind: DocumentKind) -> DocumentRequest {
        let (template, data) = match kind {
            DocumentKind::P9Report => (&self.p9_template, &self.p9_data),
            DocumentKind::AccountStatement => (&self.statement_template, &self.statement_data),
        };
        DocumentRequest {
            kind,
            template: template.clone(),
            data: data.clone(),
        }
    }
}

/// One template + data pair, producing one PDF
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRequest {
    pub kind: DocumentKind,
    pub template: PathBuf,
    pub data: PathBuf,
}
