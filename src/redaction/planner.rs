//! Turns a configuration into per-page redaction targets.

use super::strategy::{RedactionTarget, TargetSource};
use crate::config::RedactionConfig;
use crate::error::RedactorResult;
use crate::geometry::Rect;
use crate::locate::{find_images_below, find_text};
use crate::pdf::PdfPage;

/// The ordered targets of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePlan {
    /// 0-based page index.
    pub page: usize,
    pub targets: Vec<RedactionTarget>,
}

impl PagePlan {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Collects targets for a page: explicit regions first, then text matches
/// pattern by pattern, then images. Overlapping targets are kept as they
/// are.
#[derive(Debug, Clone, Copy)]
pub struct RedactionPlanner<'a> {
    config: &'a RedactionConfig,
}

impl<'a> RedactionPlanner<'a> {
    pub fn new(config: &'a RedactionConfig) -> Self {
        Self { config }
    }

    pub fn plan_page(&self, page: &PdfPage) -> RedactorResult<PagePlan> {
        let mut plan = PagePlan {
            page: page.index(),
            targets: Vec::new(),
        };

        for (index, region) in self.config.regions.iter().enumerate() {
            let rect = region.resolve(page.geometry())?;
            self.push(&mut plan, rect, TargetSource::Explicit(index));
        }

        if !self.config.text_patterns.is_empty() {
            if let Err(e) = page.check_text() {
                log::debug!("{}; affected text cannot match", e);
            }
        }
        for pattern in &self.config.text_patterns {
            for rect in find_text(page, pattern) {
                self.push(&mut plan, rect, TargetSource::Text(pattern.text.clone()));
            }
        }

        if let Some(threshold) = self.config.bottom_image_threshold {
            for rect in find_images_below(page, threshold)? {
                self.push(&mut plan, rect, TargetSource::Image);
            }
        }

        log::debug!(
            "page {}: {} target(s) planned",
            page.number(),
            plan.targets.len()
        );
        Ok(plan)
    }

    fn push(&self, plan: &mut PagePlan, rect: Rect, source: TargetSource) {
        if rect.is_empty() {
            log::debug!(
                "page {}: dropping zero-area target from {}",
                plan.page + 1,
                source
            );
            return;
        }
        plan.targets.push(RedactionTarget {
            rect,
            mode: self.config.mode,
            fill: self.config.fill,
            source,
        });
    }
}
