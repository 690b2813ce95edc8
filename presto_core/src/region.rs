// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scoped sub-regions of a device context.
//!
//! A [`RegionalRenderingContext`] pushes one axis-aligned clip and one
//! translation onto a [`DeviceContext`] so that everything drawn through it is
//! expressed in local coordinates starting at `(0, 0)`. Dirty marks are
//! translated back to global points before they reach the
//! [`DirtyRegionCollector`].
//!
//! ```text
//!   root    offset (20, 40)   clip pushed in surface space
//!    └─ child   offset (20+8, 40+4)   clip pushed in root-local space
//!        └─ grandchild ...
//! ```
//!
//! A child mutably reborrows its parent, so the borrow checker enforces the
//! LIFO push/pop order: a parent cannot draw, derive another child or be
//! dropped while a child is alive. Disposal happens at most once, on the first
//! call to [`dispose`](RegionalRenderingContext::dispose) or on drop.

use kurbo::{Affine, Ellipse, Line, Point, Rect, RoundedRect, Size, Vec2};

use crate::device::{AntialiasMode, DeviceContext};
use crate::dirty::DirtyRegionCollector;
use crate::geometry::{align_rect_out, is_offset_pixel_aligned};

/// The clip a context pushed, as seen by its parent's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipToken {
    /// Clip rectangle in the parent's local coordinates.
    pub rect: Rect,
    /// Edge mode the clip was pushed with.
    pub antialias: AntialiasMode,
}

/// A translated, clipped view of a device context that records dirty areas.
pub struct RegionalRenderingContext<'a, D: DeviceContext + ?Sized> {
    device: &'a mut D,
    collector: Option<&'a mut DirtyRegionCollector>,
    clip: ClipToken,
    saved_transform: Affine,
    offset: Vec2,
    points_per_pixel: f64,
    pixel_aligned: bool,
    disposed: bool,
}

impl<D: DeviceContext + ?Sized> core::fmt::Debug for RegionalRenderingContext<'_, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegionalRenderingContext")
            .field("clip", &self.clip)
            .field("offset", &self.offset)
            .field("points_per_pixel", &self.points_per_pixel)
            .field("pixel_aligned", &self.pixel_aligned)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<'a, D: DeviceContext + ?Sized> RegionalRenderingContext<'a, D> {
    /// Opens a root region on `device`.
    ///
    /// `clip_rect` is in the device's current coordinate space, taken to be
    /// global points. It is rounded outward to device-pixel boundaries, pushed
    /// as a clip, and the transform is translated to its origin. The rounded
    /// rectangle is available from [`clip_rect`](Self::clip_rect).
    ///
    /// Pass `None` (or the empty collector) to draw without dirty tracking.
    #[must_use]
    pub fn create(
        device: &'a mut D,
        collector: Option<&'a mut DirtyRegionCollector>,
        points_per_pixel: f64,
        clip_rect: Rect,
        antialias: AntialiasMode,
    ) -> Self {
        let clip = align_rect_out(clip_rect, points_per_pixel);
        Self::enter(
            device,
            collector,
            points_per_pixel,
            clip,
            antialias,
            Vec2::ZERO,
        )
    }

    fn enter(
        device: &'a mut D,
        collector: Option<&'a mut DirtyRegionCollector>,
        points_per_pixel: f64,
        clip: Rect,
        antialias: AntialiasMode,
        parent_offset: Vec2,
    ) -> Self {
        let saved_transform = device.transform();
        device.push_axis_aligned_clip(clip, antialias);
        device.set_transform(saved_transform * Affine::translate(clip.origin().to_vec2()));
        let offset = parent_offset + clip.origin().to_vec2();
        Self {
            device,
            collector,
            clip: ClipToken {
                rect: clip,
                antialias,
            },
            saved_transform,
            offset,
            points_per_pixel,
            pixel_aligned: is_offset_pixel_aligned(offset, points_per_pixel),
            disposed: false,
        }
    }

    /// Derives a child region; `rect` is in this region's local coordinates.
    #[must_use]
    pub fn with_axis_aligned_clip(
        &mut self,
        rect: Rect,
        antialias: AntialiasMode,
    ) -> RegionalRenderingContext<'_, D> {
        RegionalRenderingContext::enter(
            &mut *self.device,
            self.collector.as_deref_mut(),
            self.points_per_pixel,
            rect,
            antialias,
            self.offset,
        )
    }

    /// Derives a child region whose edges land on device pixels.
    ///
    /// `rect` is rounded outward in global space before the clip is pushed,
    /// so a chain of fractional offsets cannot introduce seams.
    #[must_use]
    pub fn with_pixel_aligned_clip(
        &mut self,
        rect: Rect,
        antialias: AntialiasMode,
    ) -> RegionalRenderingContext<'_, D> {
        let aligned = self.align_through_global(rect);
        self.with_axis_aligned_clip(aligned, antialias)
    }

    /// Returns a view sharing this region's device state that drops every
    /// dirty mark and never restores or pops anything.
    #[must_use]
    pub fn with_empty_dirty_collector(&mut self) -> RegionalRenderingContext<'_, D> {
        RegionalRenderingContext {
            device: &mut *self.device,
            collector: None,
            clip: self.clip,
            saved_transform: self.saved_transform,
            offset: self.offset,
            points_per_pixel: self.points_per_pixel,
            pixel_aligned: self.pixel_aligned,
            disposed: true,
        }
    }

    /// The rounded clip this region pushed, in its parent's coordinates.
    #[must_use]
    pub fn clip_rect(&self) -> Rect {
        self.clip.rect
    }

    /// The clip token this region pushed.
    #[must_use]
    pub fn clip_token(&self) -> ClipToken {
        self.clip
    }

    /// Size of the region.
    #[must_use]
    pub fn size(&self) -> Size {
        self.clip.rect.size()
    }

    /// The region in local coordinates, anchored at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.size().to_rect()
    }

    /// Global offset of the local origin, in points.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Points per device pixel.
    #[must_use]
    pub fn points_per_pixel(&self) -> f64 {
        self.points_per_pixel
    }

    /// Whether the local origin lands on a device pixel.
    #[must_use]
    pub fn is_pixel_aligned(&self) -> bool {
        self.pixel_aligned
    }

    /// Whether this region has already restored its parent's state.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether dirty marks reach a tracking collector.
    #[must_use]
    pub fn tracks_dirty(&self) -> bool {
        self.collector
            .as_deref()
            .is_some_and(|c| !c.is_empty_instance())
    }

    /// Marks the whole region dirty.
    pub fn mark_dirty(&mut self) {
        self.mark_dirty_rect(self.bounds());
    }

    /// Marks a local rectangle dirty.
    pub fn mark_dirty_rect(&mut self, rect: Rect) {
        if let Some(collector) = self.collector.as_deref_mut() {
            collector.mark_dirty_points(rect + self.offset);
        }
    }

    /// Clamps `rect` to this region and rounds it outward to device pixels.
    ///
    /// When the local origin is itself off the pixel grid the rectangle is
    /// rounded in global space and translated back, so the result is
    /// pixel-exact on screen rather than in local units.
    #[must_use]
    pub fn pixel_aligned_rect(&self, rect: Rect) -> Rect {
        let clamped = rect.intersect(self.bounds());
        if self.pixel_aligned {
            align_rect_out(clamped, self.points_per_pixel)
        } else {
            self.align_through_global(clamped)
        }
    }

    /// The rectangle to stroke for a one-device-pixel border around `rect`.
    #[must_use]
    pub fn border_rect(&self, rect: Rect) -> Rect {
        self.border_rect_with_width(rect, self.points_per_pixel)
    }

    /// The rectangle to stroke for a border of `width` points around `rect`.
    ///
    /// The pixel-aligned rectangle is inset by half the stroke width so the
    /// stroke stays inside it.
    #[must_use]
    pub fn border_rect_with_width(&self, rect: Rect, width: f64) -> Rect {
        let aligned = self.pixel_aligned_rect(rect);
        let half = width * 0.5;
        let x0 = aligned.x0 + half;
        let y0 = aligned.y0 + half;
        Rect::new(x0, y0, (aligned.x1 - half).max(x0), (aligned.y1 - half).max(y0))
    }

    fn align_through_global(&self, rect: Rect) -> Rect {
        align_rect_out(rect + self.offset, self.points_per_pixel) - self.offset
    }

    /// Fills a local rectangle.
    pub fn fill_rect(&mut self, rect: Rect, brush: &D::Brush) {
        self.device.fill_rect(rect, brush);
    }

    /// Strokes a local rectangle.
    pub fn stroke_rect(&mut self, rect: Rect, brush: &D::Brush, width: f64) {
        self.device.stroke_rect(rect, brush, width);
    }

    /// Fills a rounded rectangle.
    pub fn fill_rounded_rect(&mut self, rect: RoundedRect, brush: &D::Brush) {
        self.device.fill_rounded_rect(rect, brush);
    }

    /// Strokes a rounded rectangle.
    pub fn stroke_rounded_rect(&mut self, rect: RoundedRect, brush: &D::Brush, width: f64) {
        self.device.stroke_rounded_rect(rect, brush, width);
    }

    /// Fills an ellipse.
    pub fn fill_ellipse(&mut self, ellipse: Ellipse, brush: &D::Brush) {
        self.device.fill_ellipse(ellipse, brush);
    }

    /// Strokes an ellipse.
    pub fn stroke_ellipse(&mut self, ellipse: Ellipse, brush: &D::Brush, width: f64) {
        self.device.stroke_ellipse(ellipse, brush, width);
    }

    /// Draws a line segment.
    pub fn draw_line(&mut self, line: Line, brush: &D::Brush, width: f64) {
        self.device.draw_line(line, brush, width);
    }

    /// Fills a geometry.
    pub fn fill_geometry(&mut self, geometry: &D::Geometry, brush: &D::Brush) {
        self.device.fill_geometry(geometry, brush);
    }

    /// Strokes a geometry.
    pub fn stroke_geometry(&mut self, geometry: &D::Geometry, brush: &D::Brush, width: f64) {
        self.device.stroke_geometry(geometry, brush, width);
    }

    /// Draws a bitmap into `dest`.
    pub fn draw_bitmap(
        &mut self,
        bitmap: &D::Bitmap,
        dest: Rect,
        opacity: f32,
        source: Option<Rect>,
    ) {
        self.device.draw_bitmap(bitmap, dest, opacity, source);
    }

    /// Draws shaped text.
    pub fn draw_text_layout(&mut self, origin: Point, layout: &D::TextLayout, brush: &D::Brush) {
        self.device.draw_text_layout(origin, layout, brush);
    }

    /// Draws an image.
    pub fn draw_image(&mut self, image: &D::Image, origin: Point) {
        self.device.draw_image(image, origin);
    }

    /// Restores the saved transform and pops this region's clip.
    ///
    /// Only the first call has any effect.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.device.set_transform(self.saved_transform);
        self.device.pop_axis_aligned_clip();
    }
}

impl<D: DeviceContext + ?Sized> Drop for RegionalRenderingContext<'_, D> {
    fn drop(&mut self) {
        self.dispose();
    }
}
