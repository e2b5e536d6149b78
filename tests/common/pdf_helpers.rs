//! PDF manipulation and inspection helpers.

#![allow(dead_code)]

use anyhow::Result;
use lopdf::Object;
use pagemask::{find_text, PdfDocument, Rect, SearchPattern};

/// Text of one page as the engine sees it, one line per text line.
pub fn page_text(bytes: &[u8], page: usize) -> Result<String> {
    let doc = PdfDocument::load(bytes)?;
    let text = doc.page(page)?.layout().text();
    Ok(text)
}

/// Extracts text with `pdf-extract`, independent of the engine.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| anyhow::anyhow!("Failed to extract text: {}", e))
}

/// Occurrences of `text` on a page.
pub fn locate(bytes: &[u8], page: usize, text: &str) -> Result<Vec<Rect>> {
    let doc = PdfDocument::load(bytes)?;
    Ok(find_text(&doc.page(page)?, &SearchPattern::new(text)))
}

/// Rectangles painted with `re` on a page, in page-local coordinates.
pub fn painted_rects(bytes: &[u8], page: usize) -> Result<Vec<Rect>> {
    let doc = PdfDocument::load(bytes)?;
    let geometry = doc.geometry(page)?;
    let mut rects = Vec::new();
    for op in doc.operations(page)? {
        if op.operator != "re" {
            continue;
        }
        let values: Vec<f64> = op
            .operands
            .iter()
            .filter_map(|o| match o {
                Object::Integer(i) => Some(*i as f64),
                Object::Real(r) => Some(f64::from(*r)),
                _ => None,
            })
            .collect();
        if let [x, y, w, h] = values.as_slice() {
            rects.push(geometry.from_user_space(&Rect::from_corners(*x, *y, x + w, y + h)));
        }
    }
    Ok(rects)
}

/// Decoded content stream bytes of a page.
pub fn content_bytes(bytes: &[u8], page: usize) -> Result<Vec<u8>> {
    Ok(PdfDocument::load(bytes)?.content_bytes(page)?)
}

/// Number of pages.
pub fn page_count(bytes: &[u8]) -> Result<usize> {
    Ok(PdfDocument::load(bytes)?.page_count())
}

/// Validates that a PDF is loadable and has basic structure.
pub fn is_valid_pdf(bytes: &[u8]) -> bool {
    ::lopdf::Document::load_mem(bytes).is_ok()
}

/// Whether two rectangles match within `tolerance` on every component.
pub fn rects_close(a: &Rect, b: &Rect, tolerance: f64) -> bool {
    (a.x - b.x).abs() <= tolerance
        && (a.y - b.y).abs() <= tolerance
        && (a.width - b.width).abs() <= tolerance
        && (a.height - b.height).abs() <= tolerance
}
