// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording test doubles for [`DeviceContext`] and [`PresentHost`].
//!
//! Enabled by the `test-helpers` feature so downstream crates can drive the
//! collector, regional contexts and the controller without a GPU.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, BezPath, Ellipse, Line, Point, Rect, RoundedRect, Size};

use crate::device::{AntialiasMode, DeviceContext};
use crate::geometry::PixelRect;
use crate::host::PresentHost;

/// One recorded drawing call, with the transform in effect when it was made.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// `fill_rect`.
    FillRect(Rect, Affine),
    /// `stroke_rect` with its stroke width.
    StrokeRect(Rect, f64, Affine),
    /// `fill_rounded_rect`.
    FillRoundedRect(RoundedRect, Affine),
    /// `stroke_rounded_rect`.
    StrokeRoundedRect(RoundedRect, f64, Affine),
    /// `fill_ellipse`.
    FillEllipse(Ellipse, Affine),
    /// `stroke_ellipse`.
    StrokeEllipse(Ellipse, f64, Affine),
    /// `draw_line`.
    Line(Line, f64, Affine),
    /// `fill_geometry`.
    FillGeometry(Affine),
    /// `stroke_geometry`.
    StrokeGeometry(f64, Affine),
    /// `draw_bitmap`.
    Bitmap(Rect, Affine),
    /// `draw_text_layout` with the text that was drawn.
    Text(Point, String, Affine),
    /// `draw_image`.
    Image(Point, Affine),
}

/// A pushed clip as the device context saw it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordedClip {
    /// Clip rectangle in local points.
    pub rect: Rect,
    /// Transform in effect at push time.
    pub transform: Affine,
    /// Edge mode.
    pub antialias: AntialiasMode,
}

/// A [`DeviceContext`] that records state changes and drawing calls.
#[derive(Clone, Debug, Default)]
pub struct RecordingContext {
    /// Current transform.
    pub transform: Affine,
    /// Currently pushed clips, innermost last.
    pub clips: Vec<RecordedClip>,
    /// Total number of clip pushes.
    pub pushes: usize,
    /// Total number of clip pops.
    pub pops: usize,
    /// Drawing calls in order.
    pub ops: Vec<DrawOp>,
}

impl RecordingContext {
    /// Creates a context with an identity transform and no clips.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceContext for RecordingContext {
    type Brush = u32;
    type Geometry = BezPath;
    type Bitmap = ();
    type TextLayout = str;
    type Image = ();

    fn transform(&self) -> Affine {
        self.transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn push_axis_aligned_clip(&mut self, rect: Rect, antialias: AntialiasMode) {
        self.pushes += 1;
        self.clips.push(RecordedClip {
            rect,
            transform: self.transform,
            antialias,
        });
    }

    fn pop_axis_aligned_clip(&mut self) {
        assert!(self.clips.pop().is_some(), "clip stack underflow");
        self.pops += 1;
    }

    fn fill_rect(&mut self, rect: Rect, _brush: &u32) {
        self.ops.push(DrawOp::FillRect(rect, self.transform));
    }

    fn stroke_rect(&mut self, rect: Rect, _brush: &u32, width: f64) {
        self.ops.push(DrawOp::StrokeRect(rect, width, self.transform));
    }

    fn fill_rounded_rect(&mut self, rect: RoundedRect, _brush: &u32) {
        self.ops.push(DrawOp::FillRoundedRect(rect, self.transform));
    }

    fn stroke_rounded_rect(&mut self, rect: RoundedRect, _brush: &u32, width: f64) {
        self.ops
            .push(DrawOp::StrokeRoundedRect(rect, width, self.transform));
    }

    fn fill_ellipse(&mut self, ellipse: Ellipse, _brush: &u32) {
        self.ops.push(DrawOp::FillEllipse(ellipse, self.transform));
    }

    fn stroke_ellipse(&mut self, ellipse: Ellipse, _brush: &u32, width: f64) {
        self.ops
            .push(DrawOp::StrokeEllipse(ellipse, width, self.transform));
    }

    fn draw_line(&mut self, line: Line, _brush: &u32, width: f64) {
        self.ops.push(DrawOp::Line(line, width, self.transform));
    }

    fn fill_geometry(&mut self, _geometry: &BezPath, _brush: &u32) {
        self.ops.push(DrawOp::FillGeometry(self.transform));
    }

    fn stroke_geometry(&mut self, _geometry: &BezPath, _brush: &u32, width: f64) {
        self.ops.push(DrawOp::StrokeGeometry(width, self.transform));
    }

    fn draw_bitmap(&mut self, _bitmap: &(), dest: Rect, _opacity: f32, _source: Option<Rect>) {
        self.ops.push(DrawOp::Bitmap(dest, self.transform));
    }

    fn draw_text_layout(&mut self, origin: Point, layout: &str, _brush: &u32) {
        self.ops
            .push(DrawOp::Text(origin, String::from(layout), self.transform));
    }

    fn draw_image(&mut self, _image: &(), origin: Point) {
        self.ops.push(DrawOp::Image(origin, self.transform));
    }
}

/// A present call as the host saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PresentCall {
    /// `present`.
    Full,
    /// `present_rects`.
    Partial(Vec<PixelRect>),
    /// `try_present`.
    TryFull,
    /// `try_present_rects`.
    TryPartial(Vec<PixelRect>),
}

/// A [`PresentHost`] that records every present.
#[derive(Clone, Debug)]
pub struct RecordingHost {
    /// Device context handed to the render pass.
    pub context: RecordingContext,
    /// Present calls in order.
    pub presents: Vec<PresentCall>,
    /// When set, `try_` presents report failure.
    pub occluded: bool,
    /// Reported partial-presentation capability.
    pub partial_supported: bool,
    /// Reported device pixels per point.
    pub dpi: f64,
    /// Reported surface size in points.
    pub size: Size,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHost {
    /// Creates a 100×100 point host that supports partial presentation at
    /// scale 1.0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            context: RecordingContext::new(),
            presents: Vec::new(),
            occluded: false,
            partial_supported: true,
            dpi: 1.0,
            size: Size::new(100.0, 100.0),
        }
    }

    /// Creates a host reporting `dpi` device pixels per point.
    #[must_use]
    pub fn with_dpi(dpi: f64) -> Self {
        Self {
            dpi,
            ..Self::new()
        }
    }
}

impl PresentHost for RecordingHost {
    type Context = RecordingContext;

    fn device_context(&mut self) -> &mut RecordingContext {
        &mut self.context
    }

    fn present(&mut self) {
        self.presents.push(PresentCall::Full);
    }

    fn present_rects(&mut self, rects: &[PixelRect]) {
        self.presents.push(PresentCall::Partial(rects.to_vec()));
    }

    fn try_present(&mut self) -> bool {
        self.presents.push(PresentCall::TryFull);
        !self.occluded
    }

    fn try_present_rects(&mut self, rects: &[PixelRect]) -> bool {
        self.presents.push(PresentCall::TryPartial(rects.to_vec()));
        !self.occluded
    }

    fn surface_size(&self) -> Size {
        self.size
    }

    fn supports_partial_presentation(&self) -> bool {
        self.partial_supported
    }

    fn dpi_scale(&self) -> f64 {
        self.dpi
    }
}
