use crate::{correct::Correction, output::OutputFormat, scrutinize::{ErrorReport, OutcomeCounts}};
use serde::{Deserialize, Serialize};

/// Summary of one run, printed and optionally written as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub input: String,
    pub input_sha256: String,
    pub page_count: usize,
    pub outcomes: OutcomeCounts,
    pub applied: bool,
    #[serde(default)]
    pub edited_pages: Vec<u32>,
    #[serde(default)]
    pub kept_pages: Vec<u32>,
    #[serde(default)]
    pub output: Option<OutputArtifact>,
    pub started: String,
    pub finished: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub path: String,
    pub format: OutputFormat,
}

impl RunReport {
    pub fn new(
        input: String,
        input_sha256: String,
        page_count: usize,
        report: &ErrorReport,
        started: String,
    ) -> Self {
        Self {
            input,
            input_sha256,
            page_count,
            outcomes: report.counts(),
            applied: false,
            edited_pages: Vec::new(),
            kept_pages: Vec::new(),
            output: None,
            started,
            finished: String::new(),
        }
    }

    pub fn record_correction(&mut self, correction: &Correction) {
        self.applied = true;
        self.edited_pages = correction.edited.clone();
        self.kept_pages = correction.kept.clone();
    }
}
