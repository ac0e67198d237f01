//! Writing populated markup out as a PDF file

use crate::config::GeneratorConfig;
use crate::error::{GenerationError, Result};
use html_render::HtmlRenderer;
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Turns final HTML into a PDF at `output`
pub trait PdfRenderer {
    fn render_to_file(&self, html: &str, output: &Path) -> Result<()>;
}

/// Production renderer backed by [`HtmlRenderer`]
#[derive(Debug, Clone)]
pub struct HtmlPdfRenderer {
    renderer: HtmlRenderer,
}

impl HtmlPdfRenderer {
    pub fn new(producer: &str, fast_mode: bool) -> Self {
        Self {
            renderer: HtmlRenderer::new()
                .with_producer(producer)
                .with_fast_mode(fast_mode),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(&config.producer, config.fast_mode)
    }
}

impl PdfRenderer for HtmlPdfRenderer {
    fn render_to_file(&self, html: &str, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !parent.is_dir() {
                fs::create_dir_all(parent).map_err(|source| GenerationError::OutputDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let bytes = self.renderer.render(html)?;

        if let Err(source) = fs::write(output, &bytes) {
            if output.exists() {
                if let Err(err) = fs::remove_file(output) {
                    warn!("Could not remove partial file {}: {err}", output.display());
                }
            }
            return Err(GenerationError::Write {
                path: output.to_path_buf(),
                source,
            });
        }

        info!("Wrote {} ({} bytes)", output.display(), bytes.len());
        Ok(())
    }
}
