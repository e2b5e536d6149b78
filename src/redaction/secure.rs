//! Secure redaction: remove what lies under the targets, then paint.
//!
//! 1. **Mark**: the destructive targets of every page are collected, and
//!    the characters and image placements they overlap are counted.
//! 2. **Flatten**: MuPDF redaction annotations are placed over the marked
//!    areas and applied. Glyphs under them are deleted from the content
//!    streams (form XObjects included) and image pixels under them are
//!    cleared. Remaining glyphs keep their positions.
//! 3. **Paint**: the fill rectangles are drawn in a stream appended after
//!    the page's content.
//!
//! Vector art under a target is covered by the fill but left in the file.

use super::overlay::fill_operations;
use super::planner::PagePlan;
use super::strategy::{Mode, PageReport, PageStage, RedactionStrategy};
use crate::error::RedactorResult;
use crate::geometry::Rect;
use crate::pdf::{PageLayout, PdfDocument};

/// Secure redaction strategy that physically removes content.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureRedactionStrategy;

impl SecureRedactionStrategy {
    /// Creates a new secure redaction strategy.
    pub fn new() -> Self {
        Self
    }
}

/// What removal will take off one page.
#[derive(Debug, Default)]
struct Marked {
    areas: Vec<Rect>,
    glyphs: usize,
    images: usize,
}

fn mark(layout: &PageLayout, areas: Vec<Rect>) -> Marked {
    let covered = |bbox: &Rect| areas.iter().any(|area| bbox.intersects(area));
    let glyphs = layout
        .chars()
        .filter(|c| !c.is_whitespace() && covered(&c.bbox))
        .count();
    let images = layout.images.iter().filter(|image| covered(&image.bbox)).count();
    Marked {
        areas,
        glyphs,
        images,
    }
}

impl RedactionStrategy for SecureRedactionStrategy {
    fn apply(&self, doc: &mut PdfDocument, plans: &[PagePlan]) -> RedactorResult<Vec<PageReport>> {
        let mut stages = vec![PageStage::Pending; plans.len()];

        let mut marked = Vec::with_capacity(plans.len());
        for (plan, stage) in plans.iter().zip(stages.iter_mut()) {
            let page = doc.page(plan.page)?;
            let areas = plan
                .targets
                .iter()
                .filter(|t| t.mode == Mode::Destructive)
                .map(|t| t.rect)
                .collect();
            marked.push(mark(page.layout(), areas));
            stage.advance(PageStage::Marked, page.number());
        }

        let removals: Vec<(usize, Vec<Rect>)> = plans
            .iter()
            .zip(&marked)
            .filter(|(_, m)| !m.areas.is_empty())
            .map(|(plan, m)| (plan.page, m.areas.clone()))
            .collect();
        if !removals.is_empty() {
            doc.remove_content(&removals)?;
        }
        for (plan, stage) in plans.iter().zip(stages.iter_mut()) {
            stage.advance(PageStage::Flattened, plan.page + 1);
        }

        let mut reports = Vec::with_capacity(plans.len());
        for ((plan, mut stage), m) in plans.iter().zip(stages).zip(marked) {
            let number = plan.page + 1;
            let ops = fill_operations(&doc.geometry(plan.page)?, &plan.targets);
            doc.append_overlay(plan.page, ops)
                .map_err(|e| e.on_page(number))?;
            stage.advance(PageStage::Painted, number);

            log::debug!(
                "page {}: removed {} glyph(s) and {} image(s) under {} area(s)",
                number,
                m.glyphs,
                m.images,
                m.areas.len()
            );
            reports.push(PageReport {
                page: number,
                stage,
                targets_painted: plan.targets.len(),
                glyphs_removed: m.glyphs,
                images_removed: m.images,
            });
        }
        Ok(reports)
    }

    fn name(&self) -> &str {
        "Secure (content removal)"
    }

    fn is_secure(&self) -> bool {
        true
    }
}
