use crate::config::Scrutiny;
use crate::error::{Error, Result};
use crate::llm::Completer;
use crate::prompt;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// What the model said about one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Clean,
    Findings { raw: String, items: Vec<String> },
    Failed { reason: String },
}

/// Page number (1-based) to outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub pages: BTreeMap<u32, PageOutcome>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub clean: usize,
    pub findings: usize,
    pub failed: usize,
}

impl ErrorReport {
    pub fn from_outcomes(outcomes: Vec<PageOutcome>) -> Self {
        Self {
            pages: outcomes
                .into_iter()
                .enumerate()
                .map(|(i, o)| (i as u32 + 1, o))
                .collect(),
        }
    }

    pub fn outcome(&self, page: u32) -> Option<&PageOutcome> {
        self.pages.get(&page)
    }

    pub fn findings(&self, page: u32) -> Option<&[String]> {
        match self.pages.get(&page) {
            Some(PageOutcome::Findings { items, .. }) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn counts(&self) -> OutcomeCounts {
        let mut c = OutcomeCounts::default();
        for o in self.pages.values() {
            match o {
                PageOutcome::Clean => c.clean += 1,
                PageOutcome::Findings { .. } => c.findings += 1,
                PageOutcome::Failed { .. } => c.failed += 1,
            }
        }
        c
    }

    pub fn has_findings(&self) -> bool {
        self.counts().findings > 0
    }

    /// Labelled text form: one `Page N:` block per page with findings or a failure.
    pub fn render(&self) -> String {
        let mut blocks = Vec::new();
        for (page, outcome) in &self.pages {
            match outcome {
                PageOutcome::Clean => {}
                PageOutcome::Findings { raw, .. } => blocks.push(format!("Page {page}:\n{raw}")),
                PageOutcome::Failed { reason } => {
                    blocks.push(format!("Page {page}: not checked ({reason})"))
                }
            }
        }
        blocks.join("\n")
    }
}

pub struct Scrutinizer<'a, C: Completer + ?Sized> {
    completer: &'a C,
    cfg: &'a Scrutiny,
    bullet: Regex,
    clean_phrase: Regex,
}

impl<'a, C: Completer + ?Sized> Scrutinizer<'a, C> {
    pub fn new(completer: &'a C, cfg: &'a Scrutiny) -> Result<Self> {
        let bullet = Regex::new(r"^\s*(?:[-*\x{2022}]|\d+[.)])\s+(.*\S)\s*$")
            .map_err(|e| Error::Configuration(format!("bullet pattern: {e}")))?;
        let clean_phrase = Regex::new(
            r"(?i)^(?:there\s+(?:are|were)\s+)?no\s+(?:issues|errors|problems|mistakes|corrections(?:\s+needed)?)(?:\s+(?:were\s+)?(?:found|detected|identified))?(?:\s+(?:on|in)\s+(?:this\s+)?page(?:\s+\d+)?)?\s*[.!]*$",
        )
        .map_err(|e| Error::Configuration(format!("clean phrase pattern: {e}")))?;
        Ok(Self {
            completer,
            cfg,
            bullet,
            clean_phrase,
        })
    }

    /// One completion for one page. Transport failures abort unless `continue_on_error`.
    pub fn scrutinize_page(&self, page_number: u32, text: &str) -> Result<PageOutcome> {
        if self.cfg.skip_empty_pages && text.trim().is_empty() {
            debug!("page {page_number}: no text; skipping");
            return Ok(PageOutcome::Clean);
        }

        let prompt = prompt::scrutinize_prompt(text, page_number, &self.cfg.clean_sentinel);
        let response = match self.completer.complete(&prompt) {
            Ok(r) => r,
            Err(e) if self.cfg.continue_on_error => {
                warn!("page {page_number}: scrutiny failed: {e}");
                return Ok(PageOutcome::Failed {
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                return Err(Error::Completion {
                    page: page_number,
                    reason: e.to_string(),
                });
            }
        };

        Ok(self.classify(page_number, &response))
    }

    fn classify(&self, page_number: u32, response: &str) -> PageOutcome {
        let trimmed = response.trim();
        if trimmed.is_empty() {
            warn!("page {page_number}: empty completion");
            return PageOutcome::Failed {
                reason: "empty completion".into(),
            };
        }
        if is_sentinel(trimmed, &self.cfg.clean_sentinel)
            || (self.cfg.accept_clean_phrasing && self.clean_phrase.is_match(trimmed))
        {
            return PageOutcome::Clean;
        }
        PageOutcome::Findings {
            raw: trimmed.to_string(),
            items: self.parse_findings(trimmed),
        }
    }

    /// Bullet lines with their markers stripped; every non-empty line when there are no bullets.
    pub fn parse_findings(&self, raw: &str) -> Vec<String> {
        let bullets: Vec<String> = raw
            .lines()
            .filter_map(|l| self.bullet.captures(l))
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect();
        if !bullets.is_empty() {
            return bullets;
        }
        raw.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn is_sentinel(trimmed: &str, sentinel: &str) -> bool {
    let t = trimmed.trim_end_matches('.');
    !sentinel.is_empty() && t.eq_ignore_ascii_case(sentinel)
}
