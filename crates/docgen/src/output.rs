//! Output naming and the generation clock

use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::path::{Path, PathBuf};

/// Timestamp embedded in output file names, local time
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The two documents the generator knows how to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    P9Report,
    AccountStatement,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::P9Report, DocumentKind::AccountStatement];

    /// File name prefix
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentKind::P9Report => "P9_Report",
            DocumentKind::AccountStatement => "Account_Statement",
        }
    }

    /// Human-readable name used in console output
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::P9Report => "P9",
            DocumentKind::AccountStatement => "Account Statement",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `{prefix}_{yyyyMMdd_HHmmss}.pdf`
pub fn output_file_name(prefix: &str, timestamp: NaiveDateTime) -> String {
    format!("{prefix}_{}.pdf", timestamp.format(TIMESTAMP_FORMAT))
}

pub fn output_path(dir: &Path, kind: DocumentKind, timestamp: NaiveDateTime) -> PathBuf {
    dir.join(output_file_name(kind.prefix(), timestamp))
}

/// Source of the generation timestamp
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
