//! PDF access.
//!
//! - [`document`]: loading, page lookup, overlay streams and saving, on
//!   top of `lopdf`
//! - [`layout`]: text lines, character boxes and image placements of a page
//! - `backend`: MuPDF, which lays pages out and removes content

mod backend;
pub mod document;
pub mod layout;
#[cfg(test)]
pub(crate) mod testing;

pub use document::{PdfDocument, PdfPage};
pub use layout::{ImagePlacement, PageLayout, TextChar, TextLine};

use lopdf::{Document, Object};

/// PDF header every document starts with.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// How far into a file the header may start. Readers tolerate a little
/// junk (mail headers, a BOM) in front of it.
pub const HEADER_SEARCH_WINDOW: usize = 1024;

/// Offset of the `%PDF-` header when it starts within the first
/// [`HEADER_SEARCH_WINDOW`] bytes.
pub fn header_offset(bytes: &[u8]) -> Option<usize> {
    let end = bytes.len().min(HEADER_SEARCH_WINDOW + PDF_MAGIC.len() - 1);
    bytes[..end]
        .windows(PDF_MAGIC.len())
        .position(|window| window == PDF_MAGIC)
}

/// Maximum number of indirect hops followed when resolving a reference.
const MAX_REFERENCE_DEPTH: usize = 32;

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Builds a real-number operand.
pub(crate) fn real(value: f64) -> Object {
    Object::Real(value as _)
}

/// Follows indirect references until a direct object is reached.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Reads a resolved numeric array such as `/MediaBox`.
pub(crate) fn number_array(doc: &Document, obj: &Object) -> Option<Vec<f64>> {
    let array = resolve(doc, obj)?.as_array().ok()?;
    array
        .iter()
        .map(|item| resolve(doc, item).and_then(object_to_f64))
        .collect()
}
