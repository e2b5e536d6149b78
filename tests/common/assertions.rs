//! Custom assertions for PDF redaction testing.
//!
//! Provides domain-specific assertions that make tests more readable
//! and provide better error messages.

#![allow(dead_code)]

use super::pdf_helpers::{is_valid_pdf, locate, page_text, painted_rects, rects_close};
use pagemask::Rect;

/// Asserts that `pattern` can no longer be found on the page, neither by
/// the engine's text search nor in the raw file bytes.
///
/// # Panics
/// Panics if the pattern is still present.
pub fn assert_redacted(bytes: &[u8], page: usize, pattern: &str) {
    let found = locate(bytes, page, pattern).expect("failed to search output PDF");
    assert!(
        found.is_empty(),
        "Pattern '{}' should be redacted but was found on page {} at {:?}",
        pattern,
        page + 1,
        found
    );

    let text = page_text(bytes, page).expect("failed to read output page");
    assert!(
        !text.contains(pattern),
        "Pattern '{}' should be redacted but is still in the text of page {}",
        pattern,
        page + 1
    );

    assert!(
        !bytes
            .windows(pattern.len())
            .any(|window| window == pattern.as_bytes()),
        "Pattern '{}' should be redacted but survives in the file bytes",
        pattern
    );
}

/// Asserts that `pattern` is still present on the page.
///
/// # Panics
/// Panics if the pattern is not found.
pub fn assert_preserved(bytes: &[u8], page: usize, pattern: &str) {
    let text = page_text(bytes, page).expect("failed to read output page");
    assert!(
        text.contains(pattern),
        "Pattern '{}' should be preserved but was not found on page {} (text: {:?})",
        pattern,
        page + 1,
        text
    );
}

/// Asserts that a fill rectangle matching `expected` was painted.
///
/// # Panics
/// Panics if no painted rectangle is within `1e-3` of `expected`.
pub fn assert_painted(bytes: &[u8], page: usize, expected: &Rect) {
    let painted = painted_rects(bytes, page).expect("failed to read painted rectangles");
    assert!(
        painted.iter().any(|rect| rects_close(rect, expected, 1e-3)),
        "Expected a fill at {:?} on page {}, painted: {:?}",
        expected,
        page + 1,
        painted
    );
}

/// Asserts that the bytes form a loadable PDF.
///
/// # Panics
/// Panics if lopdf cannot load the document.
pub fn assert_valid_pdf(bytes: &[u8]) {
    assert!(!bytes.is_empty(), "PDF should not be empty");
    assert!(bytes.starts_with(b"%PDF-"), "PDF should start with the PDF header");
    assert!(is_valid_pdf(bytes), "PDF should be loadable");
}
