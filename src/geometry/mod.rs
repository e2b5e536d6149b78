//! Page geometry: rectangles, affine matrices and page coordinate frames.
//!
//! Every rectangle that leaves this module is expressed in page-local,
//! bottom-left-origin units: `x` grows to the right, `y` grows upward, and
//! `(0, 0)` is the lower-left corner of the page's MediaBox. Conversions
//! from other origins happen here and nowhere else.

pub mod scale;

pub use scale::{scale_rect, ReferenceFrame};

use crate::error::{RedactorError, RedactorResult};
use serde::{Deserialize, Serialize};

/// Minimum overlap, in page units, for two rectangles to count as
/// intersecting. Touching edges never overlap.
pub const OVERLAP_EPSILON: f64 = 1e-6;

/// Where a coordinate system puts its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// PDF native: origin at the lower-left corner, Y up.
    #[default]
    BottomLeft,
    /// Screen/raster convention: origin at the upper-left corner, Y down.
    TopLeft,
}

/// Axis-aligned rectangle `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Creates a rectangle, rejecting negative or non-finite components.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> RedactorResult<Self> {
        let rect = Self {
            x,
            y,
            width,
            height,
        };
        rect.validate()?;
        Ok(rect)
    }

    /// Bounding box of two corner points, in any order.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// Checks the rectangle invariant (finite, non-negative size).
    pub fn validate(&self) -> RedactorResult<()> {
        let parts = [self.x, self.y, self.width, self.height];
        if parts.iter().any(|v| !v.is_finite()) {
            return Err(RedactorError::config(
                "rect",
                format!("{:?} has a non-finite component", self),
            ));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(RedactorError::config(
                "rect",
                format!(
                    "width and height must not be negative (got {} x {})",
                    self.width, self.height
                ),
            ));
        }
        Ok(())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True when the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= OVERLAP_EPSILON || self.height <= OVERLAP_EPSILON
    }

    /// Geometric intersection, if it has positive area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.top().min(other.top());
        if x1 - x0 > OVERLAP_EPSILON && y1 - y0 > OVERLAP_EPSILON {
            Some(Rect::from_corners(x0, y0, x1, y1))
        } else {
            None
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.top().max(other.top()),
        )
    }

    /// Returns the rectangle shifted by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// The four corners, counter-clockwise from the lower-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.right(), self.y),
            (self.right(), self.top()),
            (self.x, self.top()),
        ]
    }
}

/// PDF affine transformation `[a b c d e f]`.
///
/// Points are row vectors: `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Bounding box of `rect` mapped through the matrix.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let pts = rect.corners().map(|(x, y)| self.transform_point(x, y));
        let (mut x0, mut y0) = pts[0];
        let (mut x1, mut y1) = pts[0];
        for &(x, y) in &pts[1..] {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Rect::from_corners(x0, y0, x1, y1)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse matrix, or `None` for a degenerate transform.
    pub fn invert(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det.abs() < 1e-12 {
            return None;
        }
        Some(Matrix {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

/// Size and placement of one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// MediaBox in default user space, normalized so that
    /// `media_box.x/y` is the lower-left corner.
    media_box: Rect,
    /// Visible area (CropBox clipped to the MediaBox), page-local.
    view: Rect,
    /// `/Rotate`, normalized to 0, 90, 180 or 270.
    rotation: u16,
}

impl PageGeometry {
    /// Geometry of a page whose MediaBox starts at the user-space origin.
    pub fn new(width: f64, height: f64) -> RedactorResult<Self> {
        Self::from_media_box(Rect::new(0.0, 0.0, width, height)?)
    }

    /// Geometry from a user-space MediaBox.
    pub fn from_media_box(media_box: Rect) -> RedactorResult<Self> {
        media_box.validate()?;
        if media_box.is_empty() {
            return Err(RedactorError::parse(
                format!("MediaBox {:?} has no area", media_box),
                None,
            ));
        }
        Ok(Self {
            media_box,
            view: Rect {
                x: 0.0,
                y: 0.0,
                width: media_box.width,
                height: media_box.height,
            },
            rotation: 0,
        })
    }

    /// Sets the visible area and display rotation of the page.
    ///
    /// `crop_box` is in default user space and is clipped to the MediaBox;
    /// a CropBox outside the MediaBox leaves the whole MediaBox visible.
    /// `rotate` is any multiple of 90, negative values included.
    pub fn with_view(mut self, crop_box: Option<Rect>, rotate: i64) -> RedactorResult<Self> {
        if rotate % 90 != 0 {
            return Err(RedactorError::parse(
                format!("/Rotate {} is not a multiple of 90", rotate),
                None,
            ));
        }
        self.rotation = rotate.rem_euclid(360) as u16;
        if let Some(crop) = crop_box {
            if let Some(visible) = crop.intersection(&self.media_box) {
                self.view = self.from_user_space(&visible);
            }
        }
        Ok(self)
    }

    pub fn width(&self) -> f64 {
        self.media_box.width
    }

    pub fn height(&self) -> f64 {
        self.media_box.height
    }

    pub fn media_box(&self) -> Rect {
        self.media_box
    }

    /// Visible area of the page, page-local.
    pub fn view(&self) -> Rect {
        self.view
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    /// Maps page-local coordinates to the top-left-origin space a
    /// renderer lays the displayed page out in: the visible area, turned
    /// clockwise by the page rotation, with its upper-left corner at
    /// `(0, 0)` and Y growing downward.
    ///
    /// Its inverse takes renderer coordinates back to page-local ones.
    pub fn device_matrix(&self) -> Matrix {
        let view = self.view;
        let (w, h) = (view.width, view.height);
        // unrotated: flip inside the visible area
        let flip = Matrix::new(1.0, 0.0, 0.0, -1.0, -view.x, view.top());
        let turn = match self.rotation {
            90 => Matrix::new(0.0, 1.0, -1.0, 0.0, h, 0.0),
            180 => Matrix::new(-1.0, 0.0, 0.0, -1.0, w, h),
            270 => Matrix::new(0.0, -1.0, 1.0, 0.0, 0.0, w),
            _ => Matrix::identity(),
        };
        flip.multiply(&turn)
    }

    /// The whole page in page-local coordinates.
    pub fn bounds(&self) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: self.width(),
            height: self.height(),
        }
    }

    /// Normalizes a page-sized rectangle expressed with `native` origin to
    /// bottom-left origin. Identity for [`Origin::BottomLeft`].
    pub fn to_bottom_left_origin(&self, rect: Rect, native: Origin) -> Rect {
        flip_to_bottom_left(rect, self.height(), native)
    }

    /// Page-local rectangle to PDF default user space.
    pub fn to_user_space(&self, rect: &Rect) -> Rect {
        rect.translate(self.media_box.x, self.media_box.y)
    }

    /// PDF default user space rectangle to page-local coordinates.
    pub fn from_user_space(&self, rect: &Rect) -> Rect {
        rect.translate(-self.media_box.x, -self.media_box.y)
    }
}

/// Vertical flip inside a frame of the given height.
pub(crate) fn flip_to_bottom_left(rect: Rect, frame_height: f64, native: Origin) -> Rect {
    match native {
        Origin::BottomLeft => rect,
        Origin::TopLeft => Rect {
            y: frame_height - rect.y - rect.height,
            ..rect
        },
    }
}
