use super::OutputWriter;
use crate::config::Output;
use crate::error::{Error, Result};
use crate::util::ensure_dir;
use std::path::{Path, PathBuf};
use tracing::info;

/// `Page N:` blocks in one UTF-8 file with a fresh name per run.
pub struct TextWriter {
    prefix: String,
}

impl TextWriter {
    pub fn new(cfg: &Output) -> Self {
        Self {
            prefix: cfg.text_prefix.clone(),
        }
    }
}

pub fn render_text(pages: &[String]) -> String {
    let mut out = String::new();
    for (i, text) in pages.iter().enumerate() {
        out.push_str(&format!("Page {}:\n{}\n\n", i + 1, text));
    }
    out
}

impl OutputWriter for TextWriter {
    fn write(&self, pages: &[String], out_dir: &Path) -> Result<PathBuf> {
        ensure_dir(out_dir).map_err(|e| Error::output(out_dir, format!("{e:#}")))?;
        let name = format!("{}_{}.txt", self.prefix, uuid::Uuid::new_v4().simple());
        let path = out_dir.join(name);
        std::fs::write(&path, render_text(pages)).map_err(|e| Error::output(&path, e))?;
        info!("wrote {} pages to {}", pages.len(), path.display());
        Ok(path)
    }
}
