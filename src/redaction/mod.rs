//! Redaction planning, strategies and the service tying them together.
//!
//! This module provides a strategy pattern for the two ways of obscuring a
//! target (secure removal and visual overlay) and a service that runs a
//! [`RedactionConfig`] over a whole document.

pub mod overlay;
pub mod planner;
pub mod secure;
pub mod strategy;

pub use overlay::OverlayRedactionStrategy;
pub use planner::{PagePlan, RedactionPlanner};
pub use secure::SecureRedactionStrategy;
pub use strategy::{
    Color, Mode, PageReport, PageStage, RedactionReport, RedactionStrategy, RedactionTarget,
    TargetSource,
};

use crate::calibration::{grid_font, render_grid, GridOptions, GRID_FONT};
use crate::config::RedactionConfig;
use crate::error::{RedactorError, RedactorResult};
use crate::pdf::PdfDocument;
use std::path::Path;

/// Redaction service coordinating strategy execution.
///
/// Every page is planned before anything is changed. A failure on any
/// page aborts the run and no output is produced.
pub struct RedactionService {
    secure: Box<dyn RedactionStrategy>,
    overlay: Box<dyn RedactionStrategy>,
}

impl Default for RedactionService {
    fn default() -> Self {
        Self::new()
    }
}

impl RedactionService {
    /// Creates a service with the secure and overlay strategies.
    pub fn new() -> Self {
        Self::with_strategies(
            Box::new(SecureRedactionStrategy::new()),
            Box::new(OverlayRedactionStrategy::new()),
        )
    }

    /// Creates a service with custom strategies for each mode.
    pub fn with_strategies(
        secure: Box<dyn RedactionStrategy>,
        overlay: Box<dyn RedactionStrategy>,
    ) -> Self {
        Self { secure, overlay }
    }

    /// The strategy used for `mode`.
    pub fn strategy(&self, mode: Mode) -> &dyn RedactionStrategy {
        match mode {
            Mode::Destructive => self.secure.as_ref(),
            Mode::Overlay => self.overlay.as_ref(),
        }
    }

    /// Redacts `input` and returns the new document bytes.
    pub fn process(&self, input: &[u8], config: &RedactionConfig) -> RedactorResult<Vec<u8>> {
        self.process_with_report(input, config)
            .map(|(bytes, _)| bytes)
    }

    /// Redacts `input`, returning the new bytes and what was done.
    ///
    /// When no page has a target the input bytes are returned unchanged.
    pub fn process_with_report(
        &self,
        input: &[u8],
        config: &RedactionConfig,
    ) -> RedactorResult<(Vec<u8>, RedactionReport)> {
        config.validate()?;
        let mut doc = PdfDocument::load(input)?;
        let strategy = self.strategy(config.mode);

        let mut report = RedactionReport {
            pages_processed: doc.page_count(),
            secure: strategy.is_secure(),
            ..Default::default()
        };
        if config.is_empty() {
            log::debug!("nothing configured, returning input unchanged");
            return Ok((input.to_vec(), report));
        }

        log::debug!(
            "redacting {} page(s) with {} strategy",
            doc.page_count(),
            strategy.name()
        );
        let plans = plan_pages(&doc, config)?;
        if plans.is_empty() {
            return Ok((input.to_vec(), report));
        }

        for page_report in strategy.apply(&mut doc, &plans)? {
            report.record(page_report);
        }
        Ok((doc.save()?, report))
    }

    /// Redacts the PDF at `input` into `output`.
    pub fn redact(
        &self,
        input: &Path,
        output: &Path,
        config: &RedactionConfig,
    ) -> RedactorResult<RedactionReport> {
        config.validate()?;
        let bytes = read(input)?;
        let (redacted, report) = self.process_with_report(&bytes, config)?;
        std::fs::write(output, redacted).map_err(|source| RedactorError::Io {
            path: output.to_path_buf(),
            source,
        })?;
        Ok(report)
    }

    /// Returns the planned targets of every page that has any, without
    /// changing the document.
    pub fn locate(&self, input: &[u8], config: &RedactionConfig) -> RedactorResult<Vec<PagePlan>> {
        config.validate()?;
        let doc = PdfDocument::load(input)?;
        plan_pages(&doc, config)
    }

    /// Draws a calibration grid over every page.
    pub fn calibrate(&self, input: &[u8], options: &GridOptions) -> RedactorResult<Vec<u8>> {
        options.validate()?;
        let mut doc = PdfDocument::load(input)?;

        for index in 0..doc.page_count() {
            let geometry = doc.geometry(index)?;
            let ops = render_grid(&geometry, options)?;
            doc.add_font_resource(index, GRID_FONT, grid_font())?;
            doc.append_overlay(index, ops)?;
        }
        doc.save()
    }

    /// Extracts text from a PDF for inspection.
    pub fn extract_text(&self, input: &Path) -> RedactorResult<String> {
        let bytes = read(input)?;
        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| RedactorError::parse(format!("text extraction failed: {}", e), None))
    }
}

/// Plans every page in order, keeping the non-empty plans. Errors carry
/// the page they happened on.
fn plan_pages(doc: &PdfDocument, config: &RedactionConfig) -> RedactorResult<Vec<PagePlan>> {
    let planner = RedactionPlanner::new(config);
    let mut plans = Vec::new();
    for index in 0..doc.page_count() {
        let page = doc.page(index)?;
        let plan = planner
            .plan_page(&page)
            .map_err(|e| e.on_page(page.number()))?;
        if !plan.is_empty() {
            plans.push(plan);
        }
    }
    Ok(plans)
}

fn read(path: &Path) -> RedactorResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| RedactorError::Io {
        path: path.to_path_buf(),
        source,
    })
}
