// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-region collection and partial presentation.
//!
//! A [`DirtyRegionCollector`] accumulates the rectangles a render pass touched
//! and, once the pass is over, turns them into the device-pixel rectangle list
//! handed to [`PresentHost::present_rects`].
//!
//! # Entry tagging
//!
//! Each entry records the [`CoordinateSpace`] it was marked in. Device-pixel
//! entries are integer-exact and pass through untouched; point-space entries
//! are scaled by the DPI factor at flush time, rounding outward so that the
//! presented region never under-covers the changed pixels.
//!
//! # Flush paths
//!
//! ```text
//!   present-all set? ──yes──► full present, lists dropped
//!        │no
//!   list empty? ──yes──► full present (never tracked) / skip (drained)
//!        │no
//!   scale == 1 and no point entries? ──yes──► backing buffer as-is
//!        │no
//!   rent scratch buffer, scale point entries ──► partial present
//! ```
//!
//! The collector is not synchronized. It is written and flushed by the render
//! thread only, within a single pass.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::geometry::{CoordinateSpace, PixelRect, scale_tagged_into};
use crate::host::PresentHost;
use crate::pool::RectPool;

/// What a flush ended up asking the host to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresentOutcome {
    /// The whole surface was presented.
    Full,
    /// The given number of rectangles were presented.
    Partial(usize),
    /// Nothing was presented because nothing changed.
    Skipped,
    /// The host reported that the frame was not shown.
    Occluded,
}

impl PresentOutcome {
    /// Returns `true` if the host showed a frame.
    #[must_use]
    pub const fn is_presented(self) -> bool {
        matches!(self, Self::Full | Self::Partial(_))
    }
}

#[derive(Debug, Default)]
struct Tracking {
    rects: Vec<PixelRect>,
    spaces: Vec<CoordinateSpace>,
    point_entries: usize,
    ever_tracked: bool,
    pool: RectPool,
}

impl Tracking {
    fn push(&mut self, rect: PixelRect, space: CoordinateSpace) {
        self.rects.push(rect);
        self.spaces.push(space);
        if space == CoordinateSpace::Points {
            self.point_entries += 1;
        }
        self.ever_tracked = true;
    }

    fn clear(&mut self) {
        self.rects.clear();
        self.spaces.clear();
        self.point_entries = 0;
    }
}

/// Accumulates dirty rectangles between presentations.
///
/// Created either tracking ([`new`](Self::new)) or as the empty instance
/// ([`empty`](Self::empty)), which ignores every mutation, never reports a
/// dirty area, and always presents the full surface.
#[derive(Debug, Default)]
pub struct DirtyRegionCollector {
    tracking: Option<Tracking>,
    present_all: bool,
}

impl DirtyRegionCollector {
    /// Creates a collector that tracks dirty rectangles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tracking: Some(Tracking::default()),
            present_all: false,
        }
    }

    /// Creates the empty instance: no lists, all marks ignored.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            tracking: None,
            present_all: false,
        }
    }

    /// Creates a tracking collector if `host` honors partial presentation,
    /// otherwise the empty instance.
    #[must_use]
    pub fn for_host<H: PresentHost + ?Sized>(host: &H) -> Self {
        if host.supports_partial_presentation() {
            Self::new()
        } else {
            Self::empty()
        }
    }

    /// Returns `true` for the empty instance.
    #[must_use]
    pub const fn is_empty_instance(&self) -> bool {
        self.tracking.is_none()
    }

    /// Records a rectangle already expressed in device pixels.
    ///
    /// Rectangles covering no pixels are ignored.
    pub fn mark_dirty_pixels(&mut self, rect: PixelRect) {
        if let Some(tracking) = &mut self.tracking
            && !rect.is_empty()
        {
            tracking.push(rect, CoordinateSpace::DevicePixels);
        }
    }

    /// Records a rectangle in points; it is scaled to pixels at flush time.
    ///
    /// The rectangle is rounded outward to whole points on entry. Rectangles
    /// covering no area are ignored.
    pub fn mark_dirty_points(&mut self, rect: Rect) {
        if let Some(tracking) = &mut self.tracking {
            let rect = PixelRect::round_out(rect);
            if !rect.is_empty() {
                tracking.push(rect, CoordinateSpace::Points);
            }
        }
    }

    /// Records a rectangle tagged with an explicit coordinate space.
    pub fn mark_dirty(&mut self, rect: PixelRect, space: CoordinateSpace) {
        if let Some(tracking) = &mut self.tracking
            && !rect.is_empty()
        {
            tracking.push(rect, space);
        }
    }

    /// Makes the next flush present the whole surface and drop the list.
    pub fn use_present_all_mode_once(&mut self) {
        if self.tracking.is_some() {
            self.present_all = true;
        }
    }

    /// Returns `true` if present-all is pending.
    #[must_use]
    pub const fn is_present_all_pending(&self) -> bool {
        self.present_all
    }

    /// Returns `true` if the next flush has anything to present.
    #[must_use]
    pub fn has_any_dirty_area(&self) -> bool {
        match &self.tracking {
            Some(tracking) => self.present_all || !tracking.rects.is_empty(),
            None => false,
        }
    }

    /// Number of rectangles recorded since the last flush.
    #[must_use]
    pub fn dirty_rect_count(&self) -> usize {
        self.tracking.as_ref().map_or(0, |t| t.rects.len())
    }

    /// The accumulated rectangles, in arrival order and untranslated.
    #[must_use]
    pub fn pending_rects(&self) -> &[PixelRect] {
        match &self.tracking {
            Some(tracking) => &tracking.rects,
            None => &[],
        }
    }

    /// The coordinate-space tag of each pending rectangle.
    #[must_use]
    pub fn pending_spaces(&self) -> &[CoordinateSpace] {
        match &self.tracking {
            Some(tracking) => &tracking.spaces,
            None => &[],
        }
    }

    /// Drops everything recorded so far, including a pending present-all.
    pub fn clear(&mut self) {
        self.present_all = false;
        if let Some(tracking) = &mut self.tracking {
            tracking.clear();
        }
    }

    /// Converts the pending rectangles to device pixels.
    ///
    /// The returned guard borrows the collector; dropping it clears the lists
    /// and returns any scratch buffer to the pool. Returns [`None`] for the
    /// empty instance. Present-all is not consulted here.
    #[must_use]
    pub fn flush(&mut self, dpi_scale: f64) -> Option<Flush<'_>> {
        self.tracking
            .as_mut()
            .map(|tracking| Flush::new(tracking, dpi_scale))
    }

    /// Flushes the collector and presents through `host`.
    ///
    /// An empty list presents the full surface only if this collector has
    /// never recorded a rectangle; once tracking has started, an empty list
    /// means nothing changed and the present is skipped.
    pub fn present<H: PresentHost + ?Sized>(
        &mut self,
        host: &mut H,
        dpi_scale: f64,
    ) -> PresentOutcome {
        let Some(tracking) = &mut self.tracking else {
            host.present();
            return PresentOutcome::Full;
        };
        if core::mem::take(&mut self.present_all) {
            tracking.clear();
            host.present();
            return PresentOutcome::Full;
        }
        if tracking.rects.is_empty() {
            if tracking.ever_tracked {
                return PresentOutcome::Skipped;
            }
            host.present();
            return PresentOutcome::Full;
        }

        let flush = Flush::new(tracking, dpi_scale);
        host.present_rects(flush.rects());
        PresentOutcome::Partial(flush.len())
    }

    /// Like [`present`](Self::present), but uses the host's `try_` calls and
    /// reports whether a frame was shown.
    ///
    /// An empty list still reaches the host as a full `try_present`, which
    /// lets the host probe for occlusion.
    pub fn try_present<H: PresentHost + ?Sized>(&mut self, host: &mut H, dpi_scale: f64) -> bool {
        let Some(tracking) = &mut self.tracking else {
            return host.try_present();
        };
        if core::mem::take(&mut self.present_all) {
            tracking.clear();
            return host.try_present();
        }
        if tracking.rects.is_empty() {
            return host.try_present();
        }

        let flush = Flush::new(tracking, dpi_scale);
        host.try_present_rects(flush.rects())
    }
}

/// Device-pixel rectangles produced by [`DirtyRegionCollector::flush`].
///
/// Dropping the guard clears the collector's lists and returns the scratch
/// buffer, including when the present call unwinds.
#[derive(Debug)]
pub struct Flush<'a> {
    tracking: &'a mut Tracking,
    scratch: Option<Vec<PixelRect>>,
}

impl<'a> Flush<'a> {
    fn new(tracking: &'a mut Tracking, dpi_scale: f64) -> Self {
        debug_assert!(
            dpi_scale.is_finite() && dpi_scale > 0.0,
            "DPI scale must be positive and finite, got {dpi_scale}"
        );
        let scratch = if dpi_scale == 1.0 && tracking.point_entries == 0 {
            None
        } else {
            let mut buf = tracking.pool.rent(tracking.rects.len());
            scale_tagged_into(&tracking.rects, &tracking.spaces, dpi_scale, &mut buf);
            Some(buf)
        };
        Self { tracking, scratch }
    }

    /// The rectangles to present, in device pixels.
    #[must_use]
    pub fn rects(&self) -> &[PixelRect] {
        match &self.scratch {
            Some(buf) => buf,
            None => &self.tracking.rects,
        }
    }

    /// Number of rectangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects().len()
    }

    /// Returns `true` if there are no rectangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects().is_empty()
    }

    /// Returns `true` if [`rects`](Self::rects) is the collector's own
    /// backing buffer (no scaling was needed).
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        self.scratch.is_none()
    }
}

impl Drop for Flush<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.scratch.take() {
            self.tracking.pool.give_back(buf);
        }
        self.tracking.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{PresentCall, RecordingHost};

    #[test]
    fn empty_instance_ignores_marks_and_presents_full() {
        let mut host = RecordingHost::new();
        let mut collector = DirtyRegionCollector::empty();
        collector.mark_dirty_pixels(PixelRect::new(0, 0, 10, 10));
        collector.mark_dirty_points(Rect::new(0.0, 0.0, 10.0, 10.0));
        collector.use_present_all_mode_once();

        assert!(!collector.has_any_dirty_area());
        assert_eq!(collector.dirty_rect_count(), 0);
        assert_eq!(collector.present(&mut host, 1.0), PresentOutcome::Full);
        assert_eq!(host.presents, [PresentCall::Full]);
        assert!(collector.flush(1.0).is_none());
    }

    #[test]
    fn present_all_discards_rects() {
        let mut host = RecordingHost::new();
        let mut collector = DirtyRegionCollector::new();
        collector.mark_dirty_pixels(PixelRect::new(0, 0, 4, 4));
        collector.use_present_all_mode_once();
        collector.mark_dirty_pixels(PixelRect::new(8, 8, 9, 9));
        assert!(collector.has_any_dirty_area());

        assert_eq!(collector.present(&mut host, 2.0), PresentOutcome::Full);
        assert_eq!(host.presents, [PresentCall::Full]);
        assert!(!collector.is_present_all_pending(), "flag is one-shot");
        assert_eq!(collector.dirty_rect_count(), 0);
        assert!(!collector.has_any_dirty_area());
    }

    #[test]
    fn present_all_alone_counts_as_dirty() {
        let mut collector = DirtyRegionCollector::new();
        assert!(!collector.has_any_dirty_area());
        collector.use_present_all_mode_once();
        assert!(collector.has_any_dirty_area());
    }

    #[test]
    fn identity_scale_reuses_backing_buffer() {
        let mut collector = DirtyRegionCollector::new();
        collector.mark_dirty_pixels(PixelRect::new(0, 0, 1, 1));
        collector.mark_dirty_pixels(PixelRect::new(2, 2, 3, 3));
        collector.mark_dirty_pixels(PixelRect::new(4, 4, 5, 5));
        let backing = collector.pending_rects().as_ptr();

        let flush = collector.flush(1.0).expect("tracking collector");
        assert!(flush.is_borrowed());
        assert!(core::ptr::eq(flush.rects().as_ptr(), backing));
        assert_eq!(flush.len(), 3);
        drop(flush);
        assert_eq!(collector.dirty_rect_count(), 0);
    }

    #[test]
    fn mixed_tags_at_one_and_a_half() {
        let mut host = RecordingHost::new();
        let mut collector = DirtyRegionCollector::new();
        collector.mark_dirty_points(Rect::new(0.0, 0.0, 10.0, 10.0));
        collector.mark_dirty_pixels(PixelRect::new(5, 5, 8, 8));
        assert_eq!(
            collector.pending_spaces(),
            [CoordinateSpace::Points, CoordinateSpace::DevicePixels]
        );

        {
            let flush = collector.flush(1.5).expect("tracking collector");
            assert!(!flush.is_borrowed());
            assert_eq!(
                flush.rects(),
                [PixelRect::new(0, 0, 15, 15), PixelRect::new(5, 5, 8, 8)]
            );
        }

        collector.mark_dirty_points(Rect::new(0.0, 0.0, 10.0, 10.0));
        collector.mark_dirty_pixels(PixelRect::new(5, 5, 8, 8));
        assert_eq!(collector.present(&mut host, 1.5), PresentOutcome::Partial(2));
        assert_eq!(
            host.presents,
            [PresentCall::Partial(alloc::vec![
                PixelRect::new(0, 0, 15, 15),
                PixelRect::new(5, 5, 8, 8)
            ])]
        );
    }

    #[test]
    fn point_entries_force_scaling_even_at_identity() {
        let mut collector = DirtyRegionCollector::new();
        collector.mark_dirty_points(Rect::new(0.5, 0.5, 2.5, 2.5));
        let flush = collector.flush(1.0).expect("tracking collector");
        assert!(!flush.is_borrowed());
        assert_eq!(flush.rects(), [PixelRect::new(0, 0, 3, 3)]);
    }

    #[test]
    fn scratch_buffer_returns_to_pool() {
        let mut collector = DirtyRegionCollector::new();
        for _ in 0..3 {
            collector.mark_dirty_points(Rect::new(0.0, 0.0, 3.0, 3.0));
            let flush = collector.flush(2.0).expect("tracking collector");
            assert_eq!(flush.rects(), [PixelRect::new(0, 0, 6, 6)]);
        }
        let tracking = collector.tracking.as_ref().expect("tracking collector");
        assert_eq!(tracking.pool.available(), 1, "one buffer reused each frame");
    }

    #[test]
    fn never_tracked_presents_full_then_drained_skips() {
        let mut host = RecordingHost::new();
        let mut collector = DirtyRegionCollector::new();
        assert_eq!(collector.present(&mut host, 1.0), PresentOutcome::Full);

        collector.mark_dirty_pixels(PixelRect::new(0, 0, 2, 2));
        assert_eq!(collector.present(&mut host, 1.0), PresentOutcome::Partial(1));
        assert_eq!(collector.present(&mut host, 1.0), PresentOutcome::Skipped);
        assert_eq!(
            host.presents,
            [
                PresentCall::Full,
                PresentCall::Partial(alloc::vec![PixelRect::new(0, 0, 2, 2)])
            ]
        );
    }

    #[test]
    fn try_present_delegates_empty_list_to_host() {
        let mut host = RecordingHost::new();
        host.occluded = true;
        let mut collector = DirtyRegionCollector::new();
        collector.mark_dirty_pixels(PixelRect::new(0, 0, 2, 2));
        assert!(!collector.try_present(&mut host, 1.0));
        assert!(!collector.try_present(&mut host, 1.0));
        assert_eq!(
            host.presents,
            [
                PresentCall::TryPartial(alloc::vec![PixelRect::new(0, 0, 2, 2)]),
                PresentCall::TryFull
            ]
        );
        assert_eq!(collector.dirty_rect_count(), 0, "failed flush still clears");
    }

    #[test]
    fn degenerate_marks_are_ignored() {
        let mut collector = DirtyRegionCollector::new();
        collector.mark_dirty_pixels(PixelRect::new(3, 3, 3, 8));
        collector.mark_dirty_points(Rect::new(2.0, 2.0, 2.0, 2.0));
        assert!(!collector.has_any_dirty_area());
    }

    #[test]
    fn for_host_respects_capability() {
        let mut host = RecordingHost::new();
        assert!(!DirtyRegionCollector::for_host(&host).is_empty_instance());
        host.partial_supported = false;
        assert!(DirtyRegionCollector::for_host(&host).is_empty_instance());
    }
}
