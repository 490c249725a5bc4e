use crate::{
    config::Config,
    correct::{Correction, Corrector},
    error::Result,
    extract::Extraction,
    interactive::Prompter,
    llm::Completer,
    scrutinize::{ErrorReport, PageOutcome, Scrutinizer},
};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{info, warn};

pub struct Pipeline<C: Completer> {
    cfg: Config,
    completer: C,
}

/// What one session produced: always a report, a correction only when applied.
pub struct SessionOutput {
    pub report: ErrorReport,
    pub correction: Option<Correction>,
}

impl<C: Completer> Pipeline<C> {
    pub fn new(cfg: &Config, completer: C) -> Self {
        Self {
            cfg: cfg.clone(),
            completer,
        }
    }

    pub fn scrutinize(&self, pages: &[String]) -> Result<ErrorReport> {
        self.scrutinize_pages(pages, &BTreeMap::new())
    }

    /// Pages that failed extraction are reported as failed without a completion.
    pub fn scrutinize_document(&self, doc: &Extraction) -> Result<ErrorReport> {
        self.scrutinize_pages(&doc.pages, &doc.unreadable)
    }

    fn scrutinize_pages(
        &self,
        pages: &[String],
        unreadable: &BTreeMap<u32, String>,
    ) -> Result<ErrorReport> {
        let started = Instant::now();
        let scrutinizer = Scrutinizer::new(&self.completer, &self.cfg.scrutiny)?;
        let outcomes = self.try_map_pages(pages, |page, text| {
            if let Some(reason) = unreadable.get(&page) {
                return Ok(PageOutcome::Failed {
                    reason: format!("text extraction failed: {reason}"),
                });
            }
            info!("scrutinizing page {page}/{}", pages.len());
            scrutinizer.scrutinize_page(page, text)
        })?;
        let report = ErrorReport::from_outcomes(outcomes);
        let counts = report.counts();
        info!(
            "scrutiny done clean={} findings={} failed={} elapsed={:?}",
            counts.clean,
            counts.findings,
            counts.failed,
            started.elapsed()
        );
        Ok(report)
    }

    pub fn correct(&self, pages: &[String], report: &ErrorReport) -> Correction {
        let corrector = Corrector::new(&self.completer);
        let edits = match self.try_map_pages(pages, |page, text| {
            Ok::<_, std::convert::Infallible>(corrector.correct_page(page, text, report))
        }) {
            Ok(edits) => edits,
            Err(never) => match never {},
        };
        let correction = Correction::from_edits(edits);
        info!(
            "correction done edited={:?} kept={:?}",
            correction.edited, correction.kept
        );
        correction
    }

    /// Scrutinize, show the report, ask (unless `apply` is given), then correct.
    pub fn run_session<R: BufRead, W: Write>(
        &self,
        doc: &Extraction,
        apply: Option<bool>,
        prompter: &mut Prompter<R, W>,
    ) -> Result<SessionOutput> {
        let pages = doc.pages.as_slice();
        let report = self.scrutinize_document(doc)?;

        prompter.say("Errors Found:")?;
        prompter.say(&report.render())?;

        let apply = match apply {
            Some(a) => a,
            None => prompter.confirm()?,
        };
        if !apply {
            prompter.say("No changes were made.")?;
            return Ok(SessionOutput {
                report,
                correction: None,
            });
        }

        if !report.has_findings() {
            info!("no findings; every page passes through unchanged");
        }
        let correction = self.correct(pages, &report);

        if self.cfg.global.show_corrected_pages {
            prompter.say("Edits applied. Here are the corrected texts per page:")?;
            for (i, text) in correction.pages.iter().enumerate() {
                prompter.say(&format!("Page {}:\n{}", i + 1, text))?;
            }
        }

        Ok(SessionOutput {
            report,
            correction: Some(correction),
        })
    }

    /// Runs `f` for every page (1-based) and returns results in page order.
    ///
    /// With `max_parallel_pages > 1`, pages run in windows of that many scoped
    /// threads; a failure stops after the window it occurred in.
    fn try_map_pages<T, E, F>(&self, pages: &[String], f: F) -> std::result::Result<Vec<T>, E>
    where
        T: Send,
        E: Send,
        F: Fn(u32, &str) -> std::result::Result<T, E> + Sync,
    {
        let width = self.cfg.concurrency.max_parallel_pages.max(1);
        if width == 1 {
            return pages
                .iter()
                .enumerate()
                .map(|(i, text)| f(i as u32 + 1, text.as_str()))
                .collect();
        }

        if width > pages.len() && pages.len() > 1 {
            warn!(
                "max_parallel_pages={width} exceeds page count {}; using {}",
                pages.len(),
                pages.len()
            );
        }

        let mut out = Vec::with_capacity(pages.len());
        for (w, window) in pages.chunks(width).enumerate() {
            let base = w * width;
            let results: Vec<std::result::Result<T, E>> = std::thread::scope(|s| {
                let handles: Vec<_> = window
                    .iter()
                    .enumerate()
                    .map(|(i, text)| {
                        let f = &f;
                        s.spawn(move || f((base + i) as u32 + 1, text.as_str()))
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
                    .collect()
            });
            for r in results {
                out.push(r?);
            }
        }
        Ok(out)
    }
}
