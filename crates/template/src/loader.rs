//! Template and data loading

use crate::{Result, TemplateError};
use log::debug;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read an HTML template into a string
pub fn load_template(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let html = read_to_string(path)?;
    debug!("Loaded template {} ({} bytes)", path.display(), html.len());
    Ok(html)
}

/// Parse a JSON data file
pub fn load_data(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let json = read_to_string(path)?;
    serde_json::from_str(&json).map_err(|source| TemplateError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => TemplateError::MissingFile(path.to_path_buf()),
        _ => TemplateError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}
