// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation host contract.
//!
//! The host owns the swap chain and the device context. Device creation,
//! adapter selection and feature-level negotiation all live behind it; the
//! core only asks for:
//!
//! - **Device context** — the surface the render pass draws into.
//! - **Present** — full-surface or partial (a list of changed device-pixel
//!   rectangles), each with a `try_` variant that reports whether the frame
//!   was shown (for occlusion detection).
//! - **Capability** — whether partial presentation is supported at all.
//! - **Scale** — the current DPI scale (device pixels per point) and the
//!   surface size in points.
//!
//! Hosts without partial presentation may rely on the default methods, which
//! ignore the rectangle list and fall back to a full present.

use kurbo::Size;

use crate::device::DeviceContext;
use crate::geometry::PixelRect;

/// A swap-chain owner that the render pass draws into and presents through.
///
/// Only the render thread calls into a host.
pub trait PresentHost {
    /// The device context type handed to the render pass.
    type Context: DeviceContext + ?Sized;

    /// Returns the device context for the current back buffer.
    fn device_context(&mut self) -> &mut Self::Context;

    /// Presents the entire surface.
    fn present(&mut self);

    /// Size of the drawable surface, in points.
    fn surface_size(&self) -> Size;

    /// Presents only the given device-pixel rectangles.
    fn present_rects(&mut self, rects: &[PixelRect]) {
        _ = rects;
        self.present();
    }

    /// Presents the entire surface, returning `false` if the frame was not
    /// shown (for example because the window is occluded).
    fn try_present(&mut self) -> bool {
        self.present();
        true
    }

    /// Presents only the given rectangles, returning `false` if the frame was
    /// not shown.
    fn try_present_rects(&mut self, rects: &[PixelRect]) -> bool {
        _ = rects;
        self.try_present()
    }

    /// Whether the swap chain honors rectangle lists.
    fn supports_partial_presentation(&self) -> bool {
        false
    }

    /// Device pixels per point for the surface.
    fn dpi_scale(&self) -> f64 {
        1.0
    }
}
