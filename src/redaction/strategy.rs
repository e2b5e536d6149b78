//! Redaction strategy trait and supporting types.
//!
//! A strategy applies the planned targets of a document's pages. The
//! secure strategy removes what lies under the targets before painting;
//! the overlay strategy only paints.

use crate::error::{RedactorError, RedactorResult};
use crate::geometry::Rect;
use super::planner::PagePlan;
use crate::pdf::PdfDocument;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a target is obscured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Remove underlying text and images, then paint.
    #[default]
    Destructive,
    /// Paint over the content and leave it in the file.
    Overlay,
}

impl FromStr for Mode {
    type Err = RedactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "destructive" | "secure" => Ok(Mode::Destructive),
            "overlay" | "visual" => Ok(Mode::Overlay),
            other => Err(RedactorError::config(
                "mode",
                format!("unknown mode '{}', expected destructive or overlay", other),
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Destructive => write!(f, "destructive"),
            Mode::Overlay => write!(f, "overlay"),
        }
    }
}

/// DeviceRGB fill colour, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn validate(&self) -> RedactorResult<()> {
        for component in [self.r, self.g, self.b] {
            if !component.is_finite() || !(0.0..=1.0).contains(&component) {
                return Err(RedactorError::config(
                    "fill",
                    format!("colour components must be within [0, 1], got {:?}", self),
                ));
            }
        }
        Ok(())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = RedactorError;

    /// Parses `r,g,b`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RedactorError::config("fill", format!("'{}': {}", s, e)))?;
        let [r, g, b] = parts.as_slice() else {
            return Err(RedactorError::config(
                "fill",
                format!("'{}' must have three components r,g,b", s),
            ));
        };
        let color = Color::rgb(*r, *g, *b);
        color.validate()?;
        Ok(color)
    }
}

/// Where a target came from, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSource {
    /// An explicit region, by its position in the configuration.
    Explicit(usize),
    /// A text match for the given pattern.
    Text(String),
    /// An image placement below the threshold line.
    Image,
}

impl fmt::Display for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSource::Explicit(index) => write!(f, "region #{}", index + 1),
            TargetSource::Text(pattern) => write!(f, "text '{}'", pattern),
            TargetSource::Image => write!(f, "image"),
        }
    }
}

/// A rectangle to obscure, in the page's own bottom-left coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionTarget {
    pub rect: Rect,
    pub mode: Mode,
    pub fill: Color,
    pub source: TargetSource,
}

/// Progress of one page through a strategy.
///
/// Overlay pages go `Pending -> Painted`; destructive pages go
/// `Pending -> Marked -> Flattened -> Painted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageStage {
    #[default]
    Pending,
    /// Underlying content selected for removal.
    Marked,
    /// Marked content removed from the document.
    Flattened,
    /// Fill painted. Terminal.
    Painted,
}

impl PageStage {
    /// Whether `self -> next` is a legal step.
    pub fn can_advance_to(self, next: PageStage) -> bool {
        matches!(
            (self, next),
            (PageStage::Pending, PageStage::Marked)
                | (PageStage::Pending, PageStage::Painted)
                | (PageStage::Marked, PageStage::Flattened)
                | (PageStage::Flattened, PageStage::Painted)
        )
    }

    pub(crate) fn advance(&mut self, next: PageStage, page: usize) {
        debug_assert!(
            self.can_advance_to(next),
            "illegal stage change {:?} -> {:?}",
            self,
            next
        );
        log::trace!("page {}: {:?} -> {:?}", page, self, next);
        *self = next;
    }
}

/// What a strategy did to one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageReport {
    /// 1-based page number.
    pub page: usize,
    pub stage: PageStage,
    pub targets_painted: usize,
    pub glyphs_removed: usize,
    pub images_removed: usize,
}

/// Statistics about a redaction run over a whole document.
#[derive(Debug, Clone, Default)]
pub struct RedactionReport {
    /// Pages processed
    pub pages_processed: usize,

    /// Pages with at least one target
    pub pages_modified: usize,

    pub targets_painted: usize,
    pub glyphs_removed: usize,
    pub images_removed: usize,

    /// Whether content was physically removed (vs visually obscured)
    pub secure: bool,

    /// One entry per modified page.
    pub pages: Vec<PageReport>,
}

impl RedactionReport {
    /// Creates a report indicating no redactions were needed.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if any target was painted.
    pub fn has_redactions(&self) -> bool {
        self.targets_painted > 0
    }

    pub(crate) fn record(&mut self, page: PageReport) {
        self.pages_modified += 1;
        self.targets_painted += page.targets_painted;
        self.glyphs_removed += page.glyphs_removed;
        self.images_removed += page.images_removed;
        self.pages.push(page);
    }
}

/// Strategy for obscuring the planned targets of a document.
///
/// An implementation either applies every plan or returns an error; the
/// caller then discards the document.
pub trait RedactionStrategy: Send + Sync {
    /// Applies `plans` (each non-empty, targets page-local) to `doc` and
    /// returns one report per plan, in the same order.
    fn apply(&self, doc: &mut PdfDocument, plans: &[PagePlan]) -> RedactorResult<Vec<PageReport>>;

    /// Returns a human-readable name for this strategy.
    fn name(&self) -> &str;

    /// Returns whether this strategy physically removes content.
    fn is_secure(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction_report() {
        let report = RedactionReport::none();
        assert!(!report.has_redactions());

        let mut report = RedactionReport::none();
        report.record(PageReport {
            page: 2,
            stage: PageStage::Painted,
            targets_painted: 3,
            glyphs_removed: 14,
            ..Default::default()
        });
        assert!(report.has_redactions());
        assert_eq!(report.pages_modified, 1);
        assert_eq!(report.glyphs_removed, 14);
    }

    #[test]
    fn test_stage_transitions() {
        use PageStage::*;
        assert!(Pending.can_advance_to(Painted));
        assert!(Pending.can_advance_to(Marked));
        assert!(Marked.can_advance_to(Flattened));
        assert!(Flattened.can_advance_to(Painted));
        assert!(!Painted.can_advance_to(Pending));
        assert!(!Marked.can_advance_to(Painted));
        assert!(!Pending.can_advance_to(Flattened));
    }

    #[test]
    fn test_parse_mode_and_color() {
        assert_eq!("Overlay".parse::<Mode>().unwrap(), Mode::Overlay);
        assert_eq!("destructive".parse::<Mode>().unwrap(), Mode::Destructive);
        assert!("blur".parse::<Mode>().unwrap_err().is_configuration());

        assert_eq!("0, 0, 0".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!(Color::default(), Color::WHITE);
        assert!("1,1".parse::<Color>().is_err());
        assert!("1,2,0".parse::<Color>().is_err());
        assert!("a,b,c".parse::<Color>().is_err());
    }
}
