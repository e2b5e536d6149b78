//! Literal text search over the character boxes of each text line.

use crate::config::SearchPattern;
use crate::geometry::Rect;
use crate::pdf::{PdfPage, TextLine};
use std::cmp::Ordering;

/// Returns the bounding box of every occurrence of `pattern` on the page,
/// in page-local coordinates, top to bottom then left to right.
///
/// Matching runs within one text line as laid out by the renderer, which
/// follows glyphs into form XObjects and measures them with the font's
/// real widths. Occurrences never overlap; after a match the search
/// resumes behind it. Text broken across two lines (a wrap, a column gap)
/// is not found. Characters without a text mapping read as U+FFFD and
/// never match.
pub fn find_text(page: &PdfPage, pattern: &SearchPattern) -> Vec<Rect> {
    let needle = fold(&pattern.text, pattern.case_sensitive);
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Rect> = page
        .layout()
        .lines
        .iter()
        .flat_map(|line| line_matches(line, &needle, pattern.case_sensitive))
        .collect();

    matches.sort_by(reading_order);
    matches
}

fn line_matches(line: &TextLine, needle: &[char], case_sensitive: bool) -> Vec<Rect> {
    let haystack: Vec<char> = line
        .chars
        .iter()
        .map(|c| fold_char(c.ch, case_sensitive))
        .collect();

    let mut found = Vec::new();
    let mut start = 0;
    while start + needle.len() <= haystack.len() {
        if haystack[start..start + needle.len()] == needle[..] {
            let bbox = line.chars[start..start + needle.len()]
                .iter()
                .map(|c| c.bbox)
                .reduce(|acc, rect| acc.union(&rect));
            found.extend(bbox);
            start += needle.len();
        } else {
            start += 1;
        }
    }
    found
}

/// Top edge descending, then left edge ascending.
fn reading_order(a: &Rect, b: &Rect) -> Ordering {
    b.top().total_cmp(&a.top()).then(a.x.total_cmp(&b.x))
}

fn fold_char(ch: char, case_sensitive: bool) -> char {
    if case_sensitive {
        ch
    } else {
        ch.to_lowercase().next().unwrap_or(ch)
    }
}

fn fold(text: &str, case_sensitive: bool) -> Vec<char> {
    text.chars().map(|ch| fold_char(ch, case_sensitive)).collect()
}
