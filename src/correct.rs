use crate::llm::Completer;
use crate::prompt;
use crate::scrutinize::ErrorReport;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditStatus {
    /// No findings for the page; text passed through.
    Unchanged,
    /// Text replaced by the model's rewrite.
    Edited,
    /// Rewrite failed; original text kept.
    Kept { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEdit {
    pub text: String,
    pub status: EditStatus,
}

/// Final pages plus which of them changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub pages: Vec<String>,
    pub edited: Vec<u32>,
    pub kept: Vec<u32>,
}

impl Correction {
    pub fn from_edits(edits: Vec<PageEdit>) -> Self {
        let mut out = Correction::default();
        for (i, edit) in edits.into_iter().enumerate() {
            let page = i as u32 + 1;
            match edit.status {
                EditStatus::Unchanged => {}
                EditStatus::Edited => out.edited.push(page),
                EditStatus::Kept { .. } => out.kept.push(page),
            }
            out.pages.push(edit.text);
        }
        out
    }
}

pub struct Corrector<'a, C: Completer + ?Sized> {
    completer: &'a C,
}

impl<'a, C: Completer + ?Sized> Corrector<'a, C> {
    pub fn new(completer: &'a C) -> Self {
        Self { completer }
    }

    /// Rewrites one page when the report has findings for it. Never fails.
    pub fn correct_page(&self, page_number: u32, text: &str, report: &ErrorReport) -> PageEdit {
        let Some(items) = report.findings(page_number).filter(|i| !i.is_empty()) else {
            debug!("page {page_number}: no findings; unchanged");
            return PageEdit {
                text: text.to_string(),
                status: EditStatus::Unchanged,
            };
        };

        let corrections = items.join("\n");
        let prompt = prompt::edit_prompt(text, &corrections);
        match self.completer.complete(&prompt) {
            Ok(r) if !r.trim().is_empty() => {
                info!("page {page_number}: applied {} corrections", items.len());
                PageEdit {
                    text: r.trim().to_string(),
                    status: EditStatus::Edited,
                }
            }
            Ok(_) => keep(page_number, text, "empty completion".into()),
            Err(e) => keep(page_number, text, e.to_string()),
        }
    }
}

fn keep(page_number: u32, text: &str, reason: String) -> PageEdit {
    warn!("page {page_number}: edit failed ({reason}); keeping original text");
    PageEdit {
        text: text.to_string(),
        status: EditStatus::Kept { reason },
    }
}
