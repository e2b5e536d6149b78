//! What a page draws, as the renderer lays it out.
//!
//! Every box here is page-local, bottom-left origin.

use crate::geometry::Rect;

/// Stand-in for characters the renderer could not map to Unicode.
pub const REPLACEMENT: char = '\u{FFFD}';

/// One rendered character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextChar {
    pub ch: char,
    /// Advance box of the glyph: from its origin to the next pen
    /// position, font descent to ascent.
    pub bbox: Rect,
}

impl TextChar {
    pub fn is_whitespace(&self) -> bool {
        self.ch.is_whitespace()
    }
}

/// A content run: characters on one line, in the order they are read.
/// Gaps wide enough to separate words carry a synthetic space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLine {
    pub chars: Vec<TextChar>,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.chars.iter().map(|c| c.ch).collect()
    }
}

/// One drawing of an image (XObject or inline), including those drawn
/// from inside form XObjects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// Bounding box of the image's unit square on the page.
    pub bbox: Rect,
}

/// Everything drawn on a page that redaction cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    /// Text lines, block by block in content order.
    pub lines: Vec<TextLine>,
    /// Image placements in content order.
    pub images: Vec<ImagePlacement>,
    /// Why the text of this page could not be read, if it could not.
    pub unsupported: Option<String>,
}

impl PageLayout {
    /// Page text, one line per text line.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of characters that are not whitespace.
    pub fn glyph_count(&self) -> usize {
        self.chars().filter(|c| !c.is_whitespace()).count()
    }

    pub fn chars(&self) -> impl Iterator<Item = &TextChar> {
        self.lines.iter().flat_map(|line| line.chars.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(ch: char, x: f64) -> TextChar {
        TextChar {
            ch,
            bbox: Rect::new(x, 0.0, 5.0, 10.0).unwrap(),
        }
    }

    #[test]
    fn test_text_and_glyph_count() {
        let layout = PageLayout {
            lines: vec![
                TextLine {
                    chars: vec![ch('a', 0.0), ch(' ', 5.0), ch('b', 10.0)],
                },
                TextLine {
                    chars: vec![ch('c', 0.0)],
                },
            ],
            ..Default::default()
        };
        assert_eq!(layout.text(), "a b\nc");
        assert_eq!(layout.glyph_count(), 3);
    }
}
