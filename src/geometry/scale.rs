//! Mapping rectangles authored against one page size onto another.

use super::{PageGeometry, Rect};
use crate::error::{RedactorError, RedactorResult};
use serde::{Deserialize, Serialize};

/// The page dimensions a set of authored rectangles was measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    pub width: f64,
    pub height: f64,
}

impl ReferenceFrame {
    pub fn new(width: f64, height: f64) -> RedactorResult<Self> {
        let frame = Self { width, height };
        frame.validate()?;
        Ok(frame)
    }

    /// Both dimensions must be finite and strictly positive.
    pub fn validate(&self) -> RedactorResult<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(self.width) || !ok(self.height) {
            return Err(RedactorError::config(
                "reference_frame",
                format!(
                    "width and height must be positive (got {} x {})",
                    self.width, self.height
                ),
            ));
        }
        Ok(())
    }

    /// `(scale_x, scale_y)` taking this frame onto `page`.
    pub fn scale_factors(&self, page: &PageGeometry) -> (f64, f64) {
        (page.width() / self.width, page.height() / self.height)
    }
}

/// Scales `rect` from `frame` onto `page`.
///
/// Scaling is per axis, so a frame with a different aspect ratio than the
/// page stretches the rectangle. All arithmetic is `f64` with no rounding.
pub fn scale_rect(rect: &Rect, frame: &ReferenceFrame, page: &PageGeometry) -> RedactorResult<Rect> {
    frame.validate()?;
    rect.validate()?;

    let (sx, sy) = frame.scale_factors(page);
    Ok(Rect {
        x: rect.x * sx,
        y: rect.y * sy,
        width: rect.width * sx,
        height: rect.height * sy,
    })
}
