use crate::config::Config;
use crate::error::{Error, Result};
use lopdf::Document;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

/// Page texts in document order, plus the pages whose text could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub pages: Vec<String>,
    /// Page number (1-based) to the extraction error. Those pages hold `""`.
    pub unreadable: BTreeMap<u32, String>,
}

impl Extraction {
    pub fn unreadable_reason(&self, page: u32) -> Option<&str> {
        self.unreadable.get(&page).map(String::as_str)
    }
}

impl From<Vec<String>> for Extraction {
    fn from(pages: Vec<String>) -> Self {
        Self {
            pages,
            unreadable: BTreeMap::new(),
        }
    }
}

/// Extracts one string per page, in document order.
///
/// Pages whose text cannot be decoded become empty strings, so the result
/// always has exactly one entry per page.
pub fn extract_pages(cfg: &Config, input: &Path) -> Result<Vec<String>> {
    Ok(extract_document(cfg, input)?.pages)
}

/// Like [`extract_pages`], but keeps track of which pages failed to decode.
pub fn extract_document(cfg: &Config, input: &Path) -> Result<Extraction> {
    let doc = load(cfg, input)?;
    let pages = doc.get_pages();

    if pages.is_empty() {
        return Err(Error::unsupported(input, "document has zero pages"));
    }
    if pages.len() as u64 > u64::from(cfg.limits.max_input_pages) {
        return Err(Error::file_access(
            input,
            format!("exceeds max_input_pages: {}", pages.len()),
        ));
    }

    let mut out = Extraction {
        pages: Vec::with_capacity(pages.len()),
        unreadable: BTreeMap::new(),
    };
    for (i, &page_number) in pages.keys().enumerate() {
        let position = i as u32 + 1;
        let raw = match doc.extract_text(&[page_number]) {
            Ok(t) => t,
            Err(e) => {
                warn!("page {position}: text extraction failed: {e}");
                out.unreadable.insert(position, e.to_string());
                String::new()
            }
        };
        let text = if cfg.extract.sanitize {
            sanitize(&raw, cfg.extract.normalize_unicode)
        } else {
            raw
        };
        debug!("page {position}: {} chars", text.chars().count());
        out.pages.push(text);
    }

    info!(
        "extracted {} pages from {} ({} unreadable)",
        out.pages.len(),
        input.display(),
        out.unreadable.len()
    );
    Ok(out)
}

pub fn page_count(cfg: &Config, input: &Path) -> Result<usize> {
    Ok(load(cfg, input)?.get_pages().len())
}

fn load(cfg: &Config, input: &Path) -> Result<Document> {
    let meta = std::fs::metadata(input).map_err(|e| Error::file_access(input, e))?;
    if !meta.is_file() {
        return Err(Error::file_access(input, "not a regular file"));
    }
    if meta.len() > cfg.limits.max_input_file_bytes {
        return Err(Error::file_access(
            input,
            format!("exceeds max_input_file_bytes: {}", meta.len()),
        ));
    }

    let bytes = std::fs::read(input).map_err(|e| Error::file_access(input, e))?;
    if !bytes.starts_with(b"%PDF-") {
        return Err(Error::unsupported(input, "missing %PDF- header"));
    }
    Document::load_mem(&bytes).map_err(|e| Error::unsupported(input, e))
}

/// Drops characters that do not survive a trip through plain UTF-8 text.
pub fn sanitize(raw: &str, normalize_unicode: bool) -> String {
    let s = raw.replace("\r\n", "\n");
    let s: String = if normalize_unicode {
        s.nfkc().collect()
    } else {
        s
    };

    let cleaned: String = s
        .chars()
        .filter(|&ch| match ch {
            '\n' | '\r' | '\t' => true,
            '\u{FEFF}' | '\u{FFFD}' => false,
            c => !c.is_control(),
        })
        .collect();

    cleaned
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}
