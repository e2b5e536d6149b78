//! Region location: where on a page the things to redact are.
//!
//! Both locators return rectangles in page-local, bottom-left-origin
//! coordinates of the page they were run on.

mod text;

pub use text::find_text;

use crate::error::{RedactorError, RedactorResult};
use crate::geometry::Rect;
use crate::pdf::PdfPage;

/// Returns the placement rectangle of every image lying entirely in the
/// bottom `1 - threshold` of the page.
///
/// The threshold line sits `height * threshold` below the top edge; an
/// image qualifies when its top edge is strictly below that line. Results
/// follow content order, one rectangle per placement (an image drawn twice
/// yields two rectangles, and images drawn by form XObjects count too).
///
/// # Errors
///
/// [`RedactorError::Configuration`] when `threshold` is outside `[0, 1]`.
pub fn find_images_below(page: &PdfPage, threshold: f64) -> RedactorResult<Vec<Rect>> {
    validate_threshold(threshold)?;

    let geometry = page.geometry();
    let threshold_y = geometry.height() * threshold;

    Ok(page
        .layout()
        .images
        .iter()
        .map(|image| image.bbox)
        .filter(|rect| geometry.height() - rect.top() > threshold_y)
        .collect())
}

pub(crate) fn validate_threshold(threshold: f64) -> RedactorResult<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(RedactorError::config(
            "bottom_image_threshold",
            format!("must be within [0, 1], got {}", threshold),
        ));
    }
    Ok(())
}
