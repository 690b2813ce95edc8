// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A render callback that draws into a host and presents the dirty region.

use presto_core::device::AntialiasMode;
use presto_core::dirty::{DirtyRegionCollector, PresentOutcome};
use presto_core::host::PresentHost;
use presto_core::reasons::RenderReasons;
use presto_core::region::RegionalRenderingContext;
use presto_core::trace::{PresentEvent, TraceSink, Tracer};

use crate::clock;
use crate::controller::RenderCallback;

/// Adapts a draw closure and a [`PresentHost`] into a [`RenderCallback`].
///
/// Each frame it forces present-all when the reasons call for a full redraw,
/// opens a root [`RegionalRenderingContext`] over the whole surface at the
/// host's DPI scale, runs the draw closure, and presents through the
/// collector.
pub struct PresentingRenderer<H, F> {
    host: H,
    draw: F,
    antialias: AntialiasMode,
    use_try_present: bool,
    frame_index: u64,
    last_outcome: Option<PresentOutcome>,
    sink: Option<Box<dyn TraceSink + Send>>,
}

impl<H, F> core::fmt::Debug for PresentingRenderer<H, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PresentingRenderer")
            .field("antialias", &self.antialias)
            .field("use_try_present", &self.use_try_present)
            .field("frame_index", &self.frame_index)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

impl<H, F> PresentingRenderer<H, F>
where
    H: PresentHost,
    F: FnMut(&mut RegionalRenderingContext<'_, H::Context>, RenderReasons),
{
    /// Wraps `host` and the widget `draw` closure.
    #[must_use]
    pub fn new(host: H, draw: F) -> Self {
        Self {
            host,
            draw,
            antialias: AntialiasMode::PerPrimitive,
            use_try_present: false,
            frame_index: 0,
            last_outcome: None,
            sink: None,
        }
    }

    /// Sets the edge mode of the root clip.
    #[must_use]
    pub fn with_antialias(mut self, antialias: AntialiasMode) -> Self {
        self.antialias = antialias;
        self
    }

    /// Presents with the host's `try_` calls, reporting occluded frames.
    #[must_use]
    pub fn with_try_present(mut self, enabled: bool) -> Self {
        self.use_try_present = enabled;
        self
    }

    /// Reports every present to `sink`.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink + Send>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The wrapped host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The wrapped host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Unwraps the host.
    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    /// What the most recent frame asked the host to do.
    #[must_use]
    pub fn last_outcome(&self) -> Option<PresentOutcome> {
        self.last_outcome
    }

    /// Draws and presents one frame.
    pub fn render_frame(&mut self, reasons: RenderReasons, collector: &mut DirtyRegionCollector) {
        if reasons.requires_full_present() {
            collector.use_present_all_mode_once();
        }
        let dpi_scale = self.host.dpi_scale();
        let bounds = self.host.surface_size().to_rect();
        {
            let mut root = RegionalRenderingContext::create(
                self.host.device_context(),
                Some(&mut *collector),
                dpi_scale.recip(),
                bounds,
                self.antialias,
            );
            (self.draw)(&mut root, reasons);
        }

        let outcome = if self.use_try_present {
            let pending = collector.dirty_rect_count();
            let full = pending == 0 || collector.is_present_all_pending();
            if !collector.try_present(&mut self.host, dpi_scale) {
                PresentOutcome::Occluded
            } else if full {
                PresentOutcome::Full
            } else {
                PresentOutcome::Partial(pending)
            }
        } else {
            collector.present(&mut self.host, dpi_scale)
        };
        self.last_outcome = Some(outcome);

        let mut tracer = Tracer::from_option(self.sink.as_deref_mut().map(|s| {
            let s: &mut dyn TraceSink = s;
            s
        }));
        tracer.present(&PresentEvent {
            frame_index: self.frame_index,
            outcome,
            timestamp: clock::now(),
        });
        self.frame_index += 1;
    }
}

impl<H, F> RenderCallback for PresentingRenderer<H, F>
where
    H: PresentHost,
    F: FnMut(&mut RegionalRenderingContext<'_, H::Context>, RenderReasons),
{
    fn render(&mut self, reasons: RenderReasons, collector: &mut DirtyRegionCollector) {
        self.render_frame(reasons, collector);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect, Size};
    use presto_core::geometry::PixelRect;
    use presto_core::testing::{DrawOp, PresentCall, RecordingContext, RecordingHost};

    use super::*;

    fn painter(
        dirty: Rect,
    ) -> impl FnMut(&mut RegionalRenderingContext<'_, RecordingContext>, RenderReasons) {
        move |region: &mut RegionalRenderingContext<'_, RecordingContext>, _: RenderReasons| {
            region.fill_rect(dirty, &0xffff_ffff);
            region.mark_dirty_rect(dirty);
        }
    }

    #[test]
    fn redraw_all_presents_full_surface() {
        let mut renderer =
            PresentingRenderer::new(RecordingHost::new(), painter(Rect::new(1.0, 1.0, 3.0, 3.0)));
        let mut collector = DirtyRegionCollector::new();
        renderer.render_frame(RenderReasons::REDRAW_ALL, &mut collector);
        assert_eq!(renderer.last_outcome(), Some(PresentOutcome::Full));
        assert_eq!(renderer.host().presents, [PresentCall::Full]);
        assert!(!collector.has_any_dirty_area());
    }

    #[test]
    fn incremental_frame_presents_scaled_dirty_rects() {
        let mut renderer = PresentingRenderer::new(
            RecordingHost::with_dpi(2.0),
            painter(Rect::new(1.0, 1.0, 3.5, 3.0)),
        );
        let mut collector = DirtyRegionCollector::new();
        renderer.render_frame(RenderReasons::empty(), &mut collector);
        assert_eq!(renderer.last_outcome(), Some(PresentOutcome::Partial(1)));
        assert_eq!(
            renderer.host().presents,
            [PresentCall::Partial(vec![PixelRect::new(2, 2, 8, 6)])],
            "points rounded out, then doubled"
        );
    }

    #[test]
    fn root_region_covers_surface_and_restores_state() {
        let mut host = RecordingHost::with_dpi(2.0);
        host.size = Size::new(40.25, 30.0);
        let mut renderer = PresentingRenderer::new(host, painter(Rect::new(0.0, 0.0, 1.0, 1.0)));
        renderer.render_frame(RenderReasons::empty(), &mut DirtyRegionCollector::new());

        let context = &renderer.host().context;
        assert_eq!(context.pushes, 1);
        assert_eq!(context.pops, 1);
        assert!(context.clips.is_empty());
        assert!(matches!(context.ops[..], [DrawOp::FillRect(..)]));
    }

    #[test]
    fn try_present_reports_occlusion() {
        let mut host = RecordingHost::new();
        host.occluded = true;
        let mut renderer =
            PresentingRenderer::new(host, painter(Rect::new(0.0, 0.0, 2.0, 2.0))).with_try_present(true);
        renderer.render_frame(RenderReasons::empty(), &mut DirtyRegionCollector::new());
        assert_eq!(renderer.last_outcome(), Some(PresentOutcome::Occluded));
        assert_eq!(
            renderer.into_host().presents,
            [PresentCall::TryPartial(vec![PixelRect::new(0, 0, 2, 2)])]
        );
    }

    #[test]
    fn empty_collector_always_presents_full() {
        let mut host = RecordingHost::new();
        host.partial_supported = false;
        let mut collector = DirtyRegionCollector::for_host(&host);
        let mut renderer = PresentingRenderer::new(host, painter(Rect::new(0.0, 0.0, 2.0, 2.0)));
        renderer.render_frame(RenderReasons::empty(), &mut collector);
        renderer.render_frame(RenderReasons::empty(), &mut collector);
        assert_eq!(renderer.host().presents, [PresentCall::Full, PresentCall::Full]);
    }
}
