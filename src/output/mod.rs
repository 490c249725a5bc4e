mod helvetica;
pub mod pdf;
pub mod text;

use crate::config::Output;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use pdf::PdfWriter;
pub use text::{render_text, TextWriter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Txt,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pdf => f.write_str("pdf"),
            OutputFormat::Txt => f.write_str("txt"),
        }
    }
}

/// Writes the final pages to one artifact under `out_dir` and returns its path.
pub trait OutputWriter {
    fn write(&self, pages: &[String], out_dir: &Path) -> Result<PathBuf>;
}

pub fn writer_for(format: OutputFormat, cfg: &Output) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Pdf => Box::new(PdfWriter::new(cfg)),
        OutputFormat::Txt => Box::new(TextWriter::new(cfg)),
    }
}
