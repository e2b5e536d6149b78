//! Coordinate-scaled PDF redaction and overlay engine.
//!
//! `pagemask` finds regions on the pages of a PDF and obscures them, either
//! by removing the content underneath (destructive) or by painting over it
//! (overlay). Regions come from three sources:
//!
//! - **Explicit regions** authored against a reference page size and
//!   scaled onto each page, so one set of coordinates works for documents
//!   rendered at different sizes
//! - **Literal text**, located character by character as MuPDF lays the
//!   page out
//! - **Images** lying in the bottom part of the page
//!
//! # Architecture
//!
//! - [`geometry`]: rectangles, matrices, page frames and scaling
//! - [`pdf`]: document loading (lopdf) and page layout and content
//!   removal (MuPDF)
//! - [`locate`]: text and image locators
//! - [`redaction`]: planner, strategies and the service layer
//! - [`calibration`]: ruled grid for reading coordinates off a page
//! - [`config`]: per-call job configuration
//! - [`error`]: error taxonomy
//!
//! All coordinates the engine exchanges are page-local, bottom-left-origin
//! points measured from the lower-left corner of the page's MediaBox.
//!
//! # Quick Start
//!
//! ```no_run
//! use pagemask::{ExplicitRegion, Rect, RedactionConfig, ReferenceFrame, SearchPattern};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = std::fs::read("order.pdf")?;
//!
//! let config = RedactionConfig::new()
//!     // a banner authored on a 1229x2008 screenshot
//!     .with_region(ExplicitRegion::new(
//!         Rect::new(0.0, 0.0, 1229.0, 250.0)?,
//!         ReferenceFrame::new(1229.0, 2008.0)?,
//!     ))
//!     .with_text(SearchPattern::new("ORDER-1"))
//!     .with_bottom_image_threshold(0.8);
//!
//! let output = pagemask::process(&input, &config)?;
//! std::fs::write("Redacted_order.pdf", output)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Overlay mode
//!
//! ```no_run
//! use pagemask::{Color, Mode, RedactionConfig, RedactionService, SearchPattern};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RedactionConfig::new()
//!     .with_text(SearchPattern::new("Torod Customer"))
//!     .with_mode(Mode::Overlay)
//!     .with_fill(Color::BLACK);
//!
//! let report = RedactionService::new().redact(
//!     Path::new("invoice.pdf"),
//!     Path::new("invoice-masked.pdf"),
//!     &config,
//! )?;
//! println!("{} target(s) painted", report.targets_painted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Scaling
//!
//! ```
//! use pagemask::{scale_rect, PageGeometry, Rect, ReferenceFrame};
//!
//! let frame = ReferenceFrame::new(1229.0, 2008.0).unwrap();
//! let page = PageGeometry::new(614.5, 1004.0).unwrap();
//! let rect = Rect::new(0.0, 0.0, 1229.0, 250.0).unwrap();
//!
//! let scaled = scale_rect(&rect, &frame, &page).unwrap();
//! assert_eq!(scaled, Rect::new(0.0, 0.0, 614.5, 125.0).unwrap());
//! ```

// Public API
pub mod calibration;
pub mod config;
pub mod error;
pub mod geometry;
pub mod locate;
pub mod pdf;
pub mod redaction;

// Re-exports for convenient access
pub use calibration::{render_grid, GridOptions};
pub use config::{ExplicitRegion, RedactionConfig, SearchPattern};
pub use error::{RedactorError, RedactorResult};
pub use geometry::{scale_rect, Matrix, Origin, PageGeometry, Rect, ReferenceFrame};
pub use locate::{find_images_below, find_text};
pub use pdf::{PdfDocument, PdfPage};
pub use redaction::{
    Color, Mode, OverlayRedactionStrategy, PagePlan, PageReport, PageStage, RedactionPlanner,
    RedactionReport, RedactionService, RedactionStrategy, RedactionTarget,
    SecureRedactionStrategy, TargetSource,
};

/// Redacts `input` according to `config` and returns the new document.
///
/// The configuration is validated before the document is parsed. Either
/// every page is processed and the full output is returned, or an error is
/// returned and no output exists.
pub fn process(input: &[u8], config: &RedactionConfig) -> RedactorResult<Vec<u8>> {
    RedactionService::new().process(input, config)
}
