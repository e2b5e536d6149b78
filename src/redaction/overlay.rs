//! Visual-only redaction: paint filled rectangles over the targets.
//!
//! The page's original content streams are not touched. They are wrapped
//! in `q … Q` so that any graphics state they leave behind cannot leak
//! into the overlay, and the fill is appended as a new stream. Everything
//! under the fill stays in the file and remains extractable.

use super::planner::PagePlan;
use super::strategy::{PageReport, PageStage, RedactionStrategy, RedactionTarget};
use crate::error::RedactorResult;
use crate::geometry::PageGeometry;
use crate::pdf::{real, PdfDocument};
use lopdf::content::Operation;

/// Overlay (non-destructive) redaction strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayRedactionStrategy;

impl OverlayRedactionStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl RedactionStrategy for OverlayRedactionStrategy {
    fn apply(&self, doc: &mut PdfDocument, plans: &[PagePlan]) -> RedactorResult<Vec<PageReport>> {
        let mut reports = Vec::with_capacity(plans.len());
        for plan in plans {
            let number = plan.page + 1;
            let mut stage = PageStage::Pending;
            let ops = fill_operations(&doc.geometry(plan.page)?, &plan.targets);
            doc.append_overlay(plan.page, ops)
                .map_err(|e| e.on_page(number))?;
            stage.advance(PageStage::Painted, number);

            reports.push(PageReport {
                page: number,
                stage,
                targets_painted: plan.targets.len(),
                ..Default::default()
            });
        }
        Ok(reports)
    }

    fn name(&self) -> &str {
        "Overlay (visual-only)"
    }

    fn is_secure(&self) -> bool {
        false
    }
}

/// `q`, one filled rectangle per target in its fill colour, `Q`.
pub(crate) fn fill_operations(geometry: &PageGeometry, targets: &[RedactionTarget]) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(targets.len() * 3 + 2);
    ops.push(Operation::new("q", vec![]));
    let mut current_fill = None;
    for target in targets {
        if current_fill != Some(target.fill) {
            let c = target.fill;
            ops.push(Operation::new("rg", vec![real(c.r), real(c.g), real(c.b)]));
            current_fill = Some(c);
        }
        let rect = geometry.to_user_space(&target.rect);
        ops.push(Operation::new(
            "re",
            vec![real(rect.x), real(rect.y), real(rect.width), real(rect.height)],
        ));
        ops.push(Operation::new("f", vec![]));
    }
    ops.push(Operation::new("Q", vec![]));
    ops
}
