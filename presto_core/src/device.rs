// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing surface contract consumed by
//! [`RegionalRenderingContext`](crate::region::RegionalRenderingContext).
//!
//! A [`DeviceContext`] is the immediate-mode 2D drawing API owned by the
//! presentation host. The core only needs a current transform, a stack of
//! axis-aligned clips and a handful of primitives; resource types (brushes,
//! geometries, bitmaps, text layouts, images) stay opaque associated types so
//! backends can plug in their native handles.
//!
//! All coordinates are in points, interpreted through the current transform.

use kurbo::{Affine, Ellipse, Line, Point, Rect, RoundedRect};

/// How the edges of an axis-aligned clip are rasterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AntialiasMode {
    /// Edges are antialiased per primitive.
    #[default]
    PerPrimitive,
    /// Edges snap to whole pixels without blending.
    Aliased,
}

/// An immediate-mode 2D drawing target.
pub trait DeviceContext {
    /// Paint source for fills and strokes.
    type Brush: ?Sized;
    /// Arbitrary path geometry.
    type Geometry: ?Sized;
    /// Device bitmap.
    type Bitmap: ?Sized;
    /// Shaped text produced by the text service.
    type TextLayout: ?Sized;
    /// Composited image (effect output, command list, ...).
    type Image: ?Sized;

    /// Returns the current point-space transform.
    fn transform(&self) -> Affine;

    /// Replaces the current transform.
    fn set_transform(&mut self, transform: Affine);

    /// Pushes an axis-aligned clip, interpreted through the current transform.
    fn push_axis_aligned_clip(&mut self, rect: Rect, antialias: AntialiasMode);

    /// Pops the most recently pushed axis-aligned clip.
    fn pop_axis_aligned_clip(&mut self);

    /// Fills `rect`.
    fn fill_rect(&mut self, rect: Rect, brush: &Self::Brush);

    /// Strokes the outline of `rect`.
    fn stroke_rect(&mut self, rect: Rect, brush: &Self::Brush, width: f64);

    /// Fills a rounded rectangle.
    fn fill_rounded_rect(&mut self, rect: RoundedRect, brush: &Self::Brush);

    /// Strokes the outline of a rounded rectangle.
    fn stroke_rounded_rect(&mut self, rect: RoundedRect, brush: &Self::Brush, width: f64);

    /// Fills an ellipse.
    fn fill_ellipse(&mut self, ellipse: Ellipse, brush: &Self::Brush);

    /// Strokes the outline of an ellipse.
    fn stroke_ellipse(&mut self, ellipse: Ellipse, brush: &Self::Brush, width: f64);

    /// Draws a line segment.
    fn draw_line(&mut self, line: Line, brush: &Self::Brush, width: f64);

    /// Fills a geometry.
    fn fill_geometry(&mut self, geometry: &Self::Geometry, brush: &Self::Brush);

    /// Strokes a geometry.
    fn stroke_geometry(&mut self, geometry: &Self::Geometry, brush: &Self::Brush, width: f64);

    /// Draws `bitmap` (or its `source` sub-rectangle) into `dest`.
    fn draw_bitmap(
        &mut self,
        bitmap: &Self::Bitmap,
        dest: Rect,
        opacity: f32,
        source: Option<Rect>,
    );

    /// Draws shaped text with its layout box anchored at `origin`.
    fn draw_text_layout(&mut self, origin: Point, layout: &Self::TextLayout, brush: &Self::Brush);

    /// Draws an image with its top-left corner at `origin`.
    fn draw_image(&mut self, image: &Self::Image, origin: Point);
}
