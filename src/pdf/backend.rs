//! MuPDF: text and image layout of pages, and content removal.
//!
//! MuPDF works on files, so every call copies the document into a scratch
//! directory first. Its coordinates are those of the displayed page (top
//! left origin, Y down); [`PageGeometry::device_matrix`] converts between
//! them and page-local coordinates.

use super::layout::{ImagePlacement, PageLayout, TextChar, TextLine, REPLACEMENT};
use crate::error::{RedactorError, RedactorResult};
use crate::geometry::{Matrix, PageGeometry, Rect};
use mupdf::pdf::{PdfAnnotationType, PdfDocument, PdfPage};
use mupdf::{Page, Quad, Rect as MuRect, TextBlockType, TextPageOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::TempDir;

/// MuPDF's font loading is not safe to run from two threads at once.
static MUPDF_LOCK: Mutex<()> = Mutex::new(());

/// Rectangles to remove from one page, page-local.
#[derive(Debug, Clone)]
pub(crate) struct RemovalMarks {
    /// 0-based page index.
    pub page: usize,
    pub geometry: PageGeometry,
    pub rects: Vec<Rect>,
}

fn backend_error(message: impl Into<String>, page: Option<usize>) -> impl FnOnce(mupdf::Error) -> RedactorError {
    let message = message.into();
    move |e| RedactorError::Backend {
        message: format!("{}: {}", message, e),
        page,
        source: Some(Box::new(e)),
    }
}

/// A copy of the document on disk for MuPDF to open.
struct Scratch {
    dir: TempDir,
    input: PathBuf,
}

impl Scratch {
    fn new(bytes: &[u8]) -> RedactorResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("pagemask")
            .tempdir()
            .map_err(|source| RedactorError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        let input = dir.path().join("input.pdf");
        std::fs::write(&input, bytes).map_err(|source| RedactorError::Io {
            path: input.clone(),
            source,
        })?;
        Ok(Self { dir, input })
    }

    fn open(&self) -> RedactorResult<PdfDocument> {
        PdfDocument::open(utf8(&self.input)?).map_err(backend_error("failed to open PDF with MuPDF", None))
    }
}

fn utf8(path: &Path) -> RedactorResult<&str> {
    path.to_str().ok_or_else(|| {
        RedactorError::config(
            "scratch directory",
            format!("{} contains invalid UTF-8", path.display()),
        )
    })
}

fn page_count(doc: &PdfDocument) -> RedactorResult<usize> {
    let count = doc
        .page_count()
        .map_err(backend_error("failed to get page count", None))?;
    Ok(count.max(0) as usize)
}

fn load_page(doc: &PdfDocument, index: usize) -> RedactorResult<Page> {
    let number = index + 1;
    doc.load_page(index as i32)
        .map_err(backend_error(format!("failed to load page {}", number), Some(number)))
}

fn mu_rect(rect: MuRect) -> Rect {
    Rect::from_corners(
        f64::from(rect.x0),
        f64::from(rect.y0),
        f64::from(rect.x1),
        f64::from(rect.y1),
    )
}

/// Bounding box of a character quad, taken to page-local space.
fn quad_rect(quad: &Quad, to_page: &Matrix) -> Rect {
    let points = [quad.ul, quad.ur, quad.lr, quad.ll]
        .map(|p| to_page.transform_point(f64::from(p.x), f64::from(p.y)));
    let (mut x0, mut y0) = points[0];
    let (mut x1, mut y1) = points[0];
    for &(x, y) in &points[1..] {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    Rect::from_corners(x0, y0, x1, y1)
}

/// Lays out every page: text lines with character boxes, and image
/// placements. Form XObjects are descended into.
///
/// `geometries` holds one entry per page, in page order.
pub(crate) fn extract_layouts(bytes: &[u8], geometries: &[PageGeometry]) -> RedactorResult<Vec<PageLayout>> {
    let _guard = MUPDF_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let scratch = Scratch::new(bytes)?;
    let doc = scratch.open()?;

    let count = page_count(&doc)?;
    if count != geometries.len() {
        return Err(RedactorError::parse(
            format!(
                "page tree lists {} pages, MuPDF found {}",
                geometries.len(),
                count
            ),
            None,
        ));
    }

    geometries
        .iter()
        .enumerate()
        .map(|(index, geometry)| {
            let page = load_page(&doc, index)?;
            lay_out(&page, geometry, index + 1)
        })
        .collect()
}

fn lay_out(page: &Page, geometry: &PageGeometry, number: usize) -> RedactorResult<PageLayout> {
    let bounds = page
        .bounds()
        .map_err(backend_error("failed to get page bounds", Some(number)))?;
    let to_page = geometry
        .device_matrix()
        .invert()
        .ok_or_else(|| RedactorError::parse("degenerate page transform", Some(number)))?;

    let displayed = geometry.device_matrix().transform_rect(&geometry.view());
    let measured = mu_rect(bounds);
    if (displayed.width - measured.width).abs() > 0.5 || (displayed.height - measured.height).abs() > 0.5 {
        log::warn!(
            "page {}: MuPDF lays the page out at {:.1}x{:.1}, expected {:.1}x{:.1}",
            number,
            measured.width,
            measured.height,
            displayed.width,
            displayed.height
        );
    }

    let text_page = match page.to_text_page(TextPageOptions::PRESERVE_IMAGES) {
        Ok(text_page) => text_page,
        Err(e) => {
            let feature = format!("text layout unavailable: {}", e);
            log::warn!("page {}: {}", number, feature);
            return Ok(PageLayout {
                unsupported: Some(feature),
                ..Default::default()
            });
        }
    };

    let mut layout = PageLayout::default();
    for block in text_page.blocks() {
        match block.r#type() {
            TextBlockType::Image => layout.images.push(ImagePlacement {
                bbox: to_page.transform_rect(&mu_rect(block.bounds())),
            }),
            TextBlockType::Text => {
                for line in block.lines() {
                    let chars: Vec<TextChar> = line
                        .chars()
                        .map(|ch| TextChar {
                            ch: ch.char().unwrap_or(REPLACEMENT),
                            bbox: quad_rect(&ch.quad(), &to_page),
                        })
                        .collect();
                    if !chars.is_empty() {
                        layout.lines.push(TextLine { chars });
                    }
                }
            }
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }

    let unmapped = layout.chars().filter(|c| c.ch == REPLACEMENT).count();
    if unmapped > 0 {
        log::warn!(
            "page {}: {} character(s) have no text mapping and cannot match",
            number,
            unmapped
        );
        layout.unsupported = Some(format!("{} character(s) without text mapping", unmapped));
    }
    log::trace!(
        "page {}: {} text line(s), {} image(s)",
        number,
        layout.lines.len(),
        layout.images.len()
    );
    Ok(layout)
}

/// Removes everything drawn under `marks`: MuPDF redaction annotations
/// are placed over each rectangle and applied, which deletes the glyphs
/// and image pixels underneath, form XObjects included.
///
/// Returns the rewritten document. Nothing is painted; the caller adds
/// its own fills afterwards.
pub(crate) fn apply_redactions(bytes: &[u8], marks: &[RemovalMarks]) -> RedactorResult<Vec<u8>> {
    let _guard = MUPDF_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let scratch = Scratch::new(bytes)?;
    let doc = scratch.open()?;

    for mark in marks.iter().filter(|mark| !mark.rects.is_empty()) {
        let number = mark.page + 1;
        let page = load_page(&doc, mark.page)?;
        let mut pdf_page = PdfPage::try_from(page)
            .map_err(backend_error("not a PDF page", Some(number)))?;

        let to_device = mark.geometry.device_matrix();
        for rect in &mark.rects {
            let device = to_device.transform_rect(rect);
            let annot = pdf_page
                .create_annotation(PdfAnnotationType::Redact)
                .map_err(backend_error("failed to create redaction annotation", Some(number)))?;
            let area = MuRect {
                x0: device.x as f32,
                y0: device.y as f32,
                x1: device.right() as f32,
                y1: device.top() as f32,
            };
            // SAFETY: `annot` is a live annotation of `pdf_page`
            unsafe {
                ffi::set_annotation_rect(&annot, area);
            }
        }

        pdf_page
            .redact()
            .map_err(backend_error(format!("failed to apply redactions on page {}", number), Some(number)))?;
        log::debug!("page {}: applied {} removal area(s)", number, mark.rects.len());
    }

    let output = scratch.dir.path().join("redacted.pdf");
    doc.save(utf8(&output)?)
        .map_err(backend_error("failed to save redacted PDF", None))?;
    std::fs::read(&output).map_err(|source| RedactorError::Io {
        path: output.clone(),
        source,
    })
}

mod ffi {
    //! The safe bindings cannot set an annotation's rectangle, so this
    //! goes through mupdf-sys directly.

    use mupdf::pdf::PdfAnnotation;
    use mupdf::Rect;

    /// Sets the rectangle of a PDF annotation, in page (device) space.
    ///
    /// # Safety
    ///
    /// `annot` must be a valid annotation; `PdfAnnotation` is assumed to
    /// hold its `pdf_annot` pointer as its only field.
    pub unsafe fn set_annotation_rect(annot: &PdfAnnotation, rect: Rect) {
        #[repr(C)]
        struct PdfAnnotRaw {
            inner: *mut mupdf_sys::pdf_annot,
        }

        let annot_raw = std::mem::transmute::<&PdfAnnotation, &PdfAnnotRaw>(annot);
        let ctx = mupdf_sys::mupdf_new_base_context();
        if !ctx.is_null() {
            let fz_rect = mupdf_sys::fz_rect {
                x0: rect.x0,
                y0: rect.y0,
                x1: rect.x1,
                y1: rect.y1,
            };
            mupdf_sys::pdf_set_annot_rect(ctx, annot_raw.inner, fz_rect);
            mupdf_sys::mupdf_drop_base_context(ctx);
        }
    }
}
