// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer rectangles and pixel-alignment helpers.
//!
//! Floating geometry is expressed with [`kurbo::Rect`] in points
//! (device-independent units). [`PixelRect`] is the integer rectangle handed to
//! partial presentation: left/top inclusive, right/bottom exclusive.
//!
//! Every conversion from floating to integer geometry in this module rounds
//! *outward* (floor on the low edge, ceiling on the high edge), so the integer
//! result always covers the floating input.

use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Rect, Vec2};

/// Tolerance used when deciding whether a coordinate already sits on a pixel
/// boundary.
const ALIGN_EPSILON: f64 = 1e-6;

/// Which unit space a dirty rectangle was recorded in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CoordinateSpace {
    /// Already in device pixels; passed through unchanged at flush time.
    #[default]
    DevicePixels,
    /// Device-independent points; scaled by the DPI factor at flush time.
    Points,
}

/// An axis-aligned integer rectangle.
///
/// Edges follow the half-open convention: a point `(x, y)` is inside when
/// `x0 <= x < x1` and `y0 <= y < y1`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub x0: i32,
    /// Top edge (inclusive).
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl PixelRect {
    /// The zero rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle from its edges.
    #[inline]
    #[must_use]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Creates a rectangle from an origin and a size.
    #[inline]
    #[must_use]
    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Rounds a floating rectangle outward to integer coordinates.
    #[inline]
    #[must_use]
    pub fn round_out(rect: Rect) -> Self {
        Self::new(
            floor_to_i32(rect.x0),
            floor_to_i32(rect.y0),
            ceil_to_i32(rect.x1),
            ceil_to_i32(rect.y1),
        )
    }

    /// Width of the rectangle; zero when the rectangle is inverted.
    #[inline]
    #[must_use]
    pub const fn width(self) -> i32 {
        if self.x1 > self.x0 {
            self.x1 - self.x0
        } else {
            0
        }
    }

    /// Height of the rectangle; zero when the rectangle is inverted.
    #[inline]
    #[must_use]
    pub const fn height(self) -> i32 {
        if self.y1 > self.y0 {
            self.y1 - self.y0
        } else {
            0
        }
    }

    /// Returns `true` if the edges are ordered (`x0 <= x1` and `y0 <= y1`).
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.x0 <= self.x1 && self.y0 <= self.y1
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Returns `true` if the pixel at `(x, y)` lies inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    ///
    /// An empty `other` is contained by any valid rectangle.
    #[inline]
    #[must_use]
    pub const fn contains_rect(self, other: Self) -> bool {
        if other.is_empty() {
            return self.is_valid();
        }
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }

    /// The smallest rectangle covering both inputs. Empty inputs are ignored.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// The overlap of both rectangles, or a zero-area rectangle at the
    /// clamped corner when they do not overlap.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let x0 = self.x0.max(other.x0);
        let y0 = self.y0.max(other.y0);
        Self::new(x0, y0, self.x1.min(other.x1).max(x0), self.y1.min(other.y1).max(y0))
    }

    /// Moves the rectangle by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x0.saturating_add(dx),
            self.y0.saturating_add(dy),
            self.x1.saturating_add(dx),
            self.y1.saturating_add(dy),
        )
    }

    /// Scales the rectangle by `scale`, rounding outward.
    ///
    /// The low edges use `floor(edge * scale)` and the high edges
    /// `ceil(edge * scale)`, so the result always contains the exact scaled
    /// rectangle.
    #[inline]
    #[must_use]
    pub fn scale_out(self, scale: f64) -> Self {
        Self::new(
            floor_to_i32(f64::from(self.x0) * scale),
            floor_to_i32(f64::from(self.y0) * scale),
            ceil_to_i32(f64::from(self.x1) * scale),
            ceil_to_i32(f64::from(self.y1) * scale),
        )
    }

    /// Converts to a floating rectangle.
    #[inline]
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        )
    }
}

impl fmt::Debug for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelRect({}, {}, {}, {})",
            self.x0, self.y0, self.x1, self.y1
        )
    }
}

impl From<PixelRect> for Rect {
    #[inline]
    fn from(rect: PixelRect) -> Self {
        rect.to_rect()
    }
}

/// Converts tagged rectangles to device pixels, appending to `out`.
///
/// Point-space entries are scaled with [`PixelRect::scale_out`];
/// device-pixel entries are copied unchanged. `rects` and `spaces` are
/// parallel slices.
pub fn scale_tagged_into(
    rects: &[PixelRect],
    spaces: &[CoordinateSpace],
    scale: f64,
    out: &mut alloc::vec::Vec<PixelRect>,
) {
    debug_assert_eq!(
        rects.len(),
        spaces.len(),
        "rectangle and tag sequences must stay parallel"
    );
    out.reserve(rects.len());
    out.extend(
        rects
            .iter()
            .zip(spaces)
            .map(|(rect, space)| match space {
                CoordinateSpace::Points => rect.scale_out(scale),
                CoordinateSpace::DevicePixels => *rect,
            }),
    );
}

/// Returns `true` if `value` (in points) falls on a device-pixel boundary.
#[inline]
#[must_use]
pub fn is_pixel_aligned(value: f64, points_per_pixel: f64) -> bool {
    if points_per_pixel <= 0.0 {
        return false;
    }
    let pixels = value / points_per_pixel;
    (pixels - pixels.round()).abs() < ALIGN_EPSILON
}

/// Returns `true` if both components of `offset` fall on pixel boundaries.
#[inline]
#[must_use]
pub fn is_offset_pixel_aligned(offset: Vec2, points_per_pixel: f64) -> bool {
    is_pixel_aligned(offset.x, points_per_pixel) && is_pixel_aligned(offset.y, points_per_pixel)
}

/// Rounds a point-space rectangle outward to the nearest device-pixel
/// boundaries, still expressed in points.
///
/// Edges already within a rounding tolerance of a pixel boundary snap to it
/// rather than growing by a whole pixel.
#[must_use]
pub fn align_rect_out(rect: Rect, points_per_pixel: f64) -> Rect {
    if points_per_pixel <= 0.0 || !points_per_pixel.is_finite() {
        return rect;
    }
    let ppp = points_per_pixel;
    Rect::new(
        snap_floor(rect.x0 / ppp) * ppp,
        snap_floor(rect.y0 / ppp) * ppp,
        snap_ceil(rect.x1 / ppp) * ppp,
        snap_ceil(rect.y1 / ppp) * ppp,
    )
}

fn snap_floor(v: f64) -> f64 {
    let nearest = v.round();
    if (v - nearest).abs() < ALIGN_EPSILON {
        nearest
    } else {
        v.floor()
    }
}

fn snap_ceil(v: f64) -> f64 {
    let nearest = v.round();
    if (v - nearest).abs() < ALIGN_EPSILON {
        nearest
    } else {
        v.ceil()
    }
}

#[inline]
#[expect(
    clippy::cast_possible_truncation,
    reason = "float-to-int casts saturate; surfaces never approach i32 range"
)]
fn floor_to_i32(v: f64) -> i32 {
    v.floor() as i32
}

#[inline]
#[expect(
    clippy::cast_possible_truncation,
    reason = "float-to-int casts saturate; surfaces never approach i32 range"
)]
fn ceil_to_i32(v: f64) -> i32 {
    v.ceil() as i32
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn round_out_floors_low_and_ceils_high() {
        let r = PixelRect::round_out(Rect::new(0.4, 1.6, 9.1, 9.9));
        assert_eq!(r, PixelRect::new(0, 1, 10, 10));

        let neg = PixelRect::round_out(Rect::new(-0.5, -2.5, -0.1, 0.0));
        assert_eq!(neg, PixelRect::new(-1, -3, 0, 0));
    }

    #[test]
    fn scale_out_covers_scaled_rect() {
        let scales = [1.0, 1.25, 1.5, 1.75, 2.0, 2.25, 3.0, 1.333_333];
        let rects = [
            PixelRect::new(0, 0, 10, 10),
            PixelRect::new(3, 7, 11, 13),
            PixelRect::new(-5, -3, 1, 2),
            PixelRect::new(101, 57, 333, 999),
        ];
        for &s in &scales {
            for &r in &rects {
                let out = r.scale_out(s);
                let exact = Rect::new(
                    f64::from(r.x0) * s,
                    f64::from(r.y0) * s,
                    f64::from(r.x1) * s,
                    f64::from(r.y1) * s,
                );
                assert!(
                    f64::from(out.x0) <= exact.x0
                        && f64::from(out.y0) <= exact.y0
                        && f64::from(out.x1) >= exact.x1
                        && f64::from(out.y1) >= exact.y1,
                    "{r:?} at {s} produced {out:?}, which does not cover {exact:?}"
                );
            }
        }
    }

    #[test]
    fn scale_out_at_one_and_a_half() {
        assert_eq!(
            PixelRect::new(0, 0, 10, 10).scale_out(1.5),
            PixelRect::new(0, 0, 15, 15)
        );
        assert_eq!(
            PixelRect::new(1, 1, 2, 2).scale_out(1.5),
            PixelRect::new(1, 1, 3, 3)
        );
    }

    #[test]
    fn contains_is_half_open() {
        let r = PixelRect::new(0, 0, 4, 4);
        assert!(r.contains(0, 0));
        assert!(r.contains(3, 3));
        assert!(!r.contains(4, 0));
        assert!(!r.contains(0, 4));
        assert!(r.contains_rect(PixelRect::new(1, 1, 4, 4)));
        assert!(!r.contains_rect(PixelRect::new(1, 1, 5, 4)));
    }

    #[test]
    fn union_and_intersect_ignore_empty() {
        let a = PixelRect::new(0, 0, 4, 4);
        let b = PixelRect::new(2, 2, 8, 6);
        assert_eq!(a.union(b), PixelRect::new(0, 0, 8, 6));
        assert_eq!(a.union(PixelRect::ZERO), a);
        assert_eq!(a.intersect(b), PixelRect::new(2, 2, 4, 4));

        let apart = a.intersect(PixelRect::new(10, 10, 12, 12));
        assert!(apart.is_empty());
        assert!(apart.is_valid(), "intersection must never invert");
    }

    #[test]
    fn scale_tagged_passes_device_pixels_through() {
        let rects = [PixelRect::new(0, 0, 10, 10), PixelRect::new(5, 5, 8, 8)];
        let spaces = [CoordinateSpace::Points, CoordinateSpace::DevicePixels];
        let mut out = Vec::new();
        scale_tagged_into(&rects, &spaces, 1.5, &mut out);
        assert_eq!(
            out,
            [PixelRect::new(0, 0, 15, 15), PixelRect::new(5, 5, 8, 8)]
        );
    }

    #[test]
    fn align_rect_out_snaps_near_boundaries() {
        // 150% scale: one device pixel is 2/3 of a point.
        let ppp = 2.0 / 3.0;
        let r = align_rect_out(Rect::new(10.0, 0.1, 20.0, 5.0), ppp);
        assert!((r.x0 - 10.0).abs() < 1e-9, "10pt is 15px exactly");
        assert!((r.y0 - 0.0).abs() < 1e-9, "0.1pt floors to pixel 0");
        assert!((r.x1 - 20.0).abs() < 1e-9, "20pt is 30px exactly");
        assert!((r.y1 - 16.0 / 3.0).abs() < 1e-9, "5pt = 7.5px ceils to 8px");
    }

    #[test]
    fn pixel_alignment_checks() {
        assert!(is_pixel_aligned(3.0, 1.0));
        assert!(!is_pixel_aligned(3.5, 1.0));
        assert!(is_pixel_aligned(3.5, 0.5));
        assert!(is_pixel_aligned(10.0, 2.0 / 3.0));
        assert!(!is_pixel_aligned(1.0, 2.0 / 3.0));
        assert!(is_offset_pixel_aligned(Vec2::new(2.0, 4.0), 1.0));
        assert!(!is_offset_pixel_aligned(Vec2::new(2.0, 4.25), 1.0));
    }
}
