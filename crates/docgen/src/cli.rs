//! Command line arguments and the generation loop behind the `docgen` binary

use crate::config::GeneratorConfig;
use crate::generator::DocumentGenerator;
use crate::output::DocumentKind;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;

/// Every requested document was written
pub const EXIT_SUCCESS: u8 = 0;
/// Configuration was rejected or at least one document failed
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "docgen")]
#[command(version, about = "Generate P9 reports and account statements as PDF", long_about = None)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the PDFs are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Generate a single document instead of both
    #[arg(long, value_enum)]
    pub only: Option<Only>,

    /// Producer recorded in the PDF metadata
    #[arg(long)]
    pub producer: Option<String>,

    /// Size table columns by their content instead of splitting them evenly
    #[arg(long)]
    pub measured_layout: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Only {
    P9,
    Statement,
}

impl Only {
    pub fn kind(self) -> DocumentKind {
        match self {
            Only::P9 => DocumentKind::P9Report,
            Only::Statement => DocumentKind::AccountStatement,
        }
    }
}

impl Cli {
    /// Requested documents, in generation order
    pub fn kinds(&self) -> Vec<DocumentKind> {
        match self.only {
            Some(only) => vec![only.kind()],
            None => DocumentKind::ALL.to_vec(),
        }
    }

    /// Config file (if any) with command line overrides applied
    pub fn load_config(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => GeneratorConfig::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(producer) = &self.producer {
            config.producer = producer.clone();
        }
        if self.measured_layout {
            config.fast_mode = false;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Generate every requested document, reporting each outcome
///
/// A failed document does not stop the next one. Successes go to `out` as
/// `{kind} PDF generated: {path}`; failures go to `err` as an `Error:` line
/// followed by one `Caused by:` line per underlying cause.
pub fn run(cli: &Cli, out: &mut impl Write, err: &mut impl Write) -> io::Result<u8> {
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(error) => {
            report(err, &error)?;
            return Ok(EXIT_FAILURE);
        }
    };

    let generator = DocumentGenerator::new(config);
    let mut status = EXIT_SUCCESS;

    for kind in cli.kinds() {
        let request = generator.config().request(kind);
        match generator
            .generate(&request)
            .with_context(|| format!("{kind} generation failed"))
        {
            Ok(path) => writeln!(out, "{kind} PDF generated: {}", path.display())?,
            Err(error) => {
                report(err, &error)?;
                status = EXIT_FAILURE;
            }
        }
    }

    Ok(status)
}

fn report(err: &mut impl Write, error: &anyhow::Error) -> io::Result<()> {
    writeln!(err, "Error: {error}")?;
    for cause in error.chain().skip(1) {
        writeln!(err, "  Caused by: {cause}")?;
    }
    Ok(())
}
