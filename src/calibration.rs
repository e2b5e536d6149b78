//! Calibration grid: a ruled overlay for reading coordinates off a page.
//!
//! Print or view a gridded copy of a sample document, read the rectangle
//! to redact off the labels, and use the page size as the reference frame.
//! Labels are page-local bottom-left coordinates, the same system
//! explicit regions are written in.

use crate::error::{RedactorError, RedactorResult};
use crate::geometry::PageGeometry;
use crate::pdf::real;
use lopdf::content::Operation;
use lopdf::{dictionary, Dictionary, Object};

/// Font resource name the grid labels are drawn with.
pub const GRID_FONT: &str = "PmGrid";

/// Upper bound on lines per axis.
const MAX_LINES: f64 = 5000.0;

const MINOR_GREY: f64 = 0.8;
const MINOR_WIDTH: f64 = 0.25;
const MAJOR_WIDTH: f64 = 0.75;

/// Grid layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    /// Distance between lines, in points.
    pub step: f64,
    /// Every n-th line is a labelled major line.
    pub major_every: u32,
    /// Label font size, in points.
    pub label_size: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            step: 10.0,
            major_every: 5,
            label_size: 6.0,
        }
    }
}

impl GridOptions {
    pub fn validate(&self) -> RedactorResult<()> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(RedactorError::config(
                "step",
                format!("must be positive, got {}", self.step),
            ));
        }
        if self.major_every < 1 {
            return Err(RedactorError::config("major_every", "must be at least 1"));
        }
        if !self.label_size.is_finite() || self.label_size <= 0.0 {
            return Err(RedactorError::config(
                "label_size",
                format!("must be positive, got {}", self.label_size),
            ));
        }
        Ok(())
    }
}

/// The font dictionary registered as [`GRID_FONT`].
pub(crate) fn grid_font() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    }
}

fn label(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Line positions `0, step, 2*step, ...` up to `extent`.
fn positions(extent: f64, step: f64) -> RedactorResult<Vec<f64>> {
    let count = (extent / step).floor();
    if count > MAX_LINES {
        return Err(RedactorError::config(
            "step",
            format!("{} is too small for a page extent of {}", step, extent),
        ));
    }
    Ok((0..=count as usize).map(|i| i as f64 * step).collect())
}

/// Content operations drawing the grid over a page.
///
/// The result is self-contained (`q … Q`) and expects [`GRID_FONT`] in the
/// page's font resources.
pub fn render_grid(geometry: &PageGeometry, options: &GridOptions) -> RedactorResult<Vec<Operation>> {
    options.validate()?;

    let origin = geometry.media_box();
    let (width, height) = (geometry.width(), geometry.height());
    let xs = positions(width, options.step)?;
    let ys = positions(height, options.step)?;
    let major = options.major_every as usize;

    let vertical = |x: f64| {
        [
            Operation::new("m", vec![real(origin.x + x), real(origin.y)]),
            Operation::new("l", vec![real(origin.x + x), real(origin.y + height)]),
        ]
    };
    let horizontal = |y: f64| {
        [
            Operation::new("m", vec![real(origin.x), real(origin.y + y)]),
            Operation::new("l", vec![real(origin.x + width), real(origin.y + y)]),
        ]
    };

    let mut ops = vec![Operation::new("q", vec![])];

    ops.push(Operation::new(
        "RG",
        vec![real(MINOR_GREY), real(MINOR_GREY), real(MINOR_GREY)],
    ));
    ops.push(Operation::new("w", vec![real(MINOR_WIDTH)]));
    for (_, x) in xs.iter().enumerate().filter(|(i, _)| i % major != 0) {
        ops.extend(vertical(*x));
    }
    for (_, y) in ys.iter().enumerate().filter(|(i, _)| i % major != 0) {
        ops.extend(horizontal(*y));
    }
    ops.push(Operation::new("S", vec![]));

    ops.push(Operation::new("RG", vec![real(1.0), real(0.0), real(0.0)]));
    ops.push(Operation::new("w", vec![real(MAJOR_WIDTH)]));
    for x in xs.iter().step_by(major) {
        ops.extend(vertical(*x));
    }
    for y in ys.iter().step_by(major) {
        ops.extend(horizontal(*y));
    }
    ops.push(Operation::new("S", vec![]));

    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(GRID_FONT.as_bytes().to_vec()), real(options.label_size)],
    ));
    ops.push(Operation::new("rg", vec![real(1.0), real(0.0), real(0.0)]));
    let mut place = |x: f64, y: f64, text: String| {
        ops.push(Operation::new(
            "Tm",
            vec![
                1.into(),
                0.into(),
                0.into(),
                1.into(),
                real(origin.x + x + 1.0),
                real(origin.y + y + 1.0),
            ],
        ));
        ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    };
    for x in xs.iter().step_by(major) {
        place(*x, 0.0, label(*x));
    }
    for y in ys.iter().step_by(major).skip(1) {
        place(0.0, *y, label(*y));
    }
    ops.push(Operation::new("ET", vec![]));

    ops.push(Operation::new("Q", vec![]));
    Ok(ops)
}
