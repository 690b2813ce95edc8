// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the render loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! render thread calls at each stage. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] collects timestamps during a frame and produces a
//! [`FrameSummary`] at the end.

use crate::dirty::PresentOutcome;
use crate::reasons::RenderReasons;
use crate::time::HostTime;

/// Emitted right before the render callback is invoked.
#[derive(Clone, Copy, Debug)]
pub struct RenderBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Reasons snapshotted for this frame.
    pub reasons: RenderReasons,
    /// Host time at the start of the callback.
    pub timestamp: HostTime,
}

/// Emitted right after the render callback returns.
#[derive(Clone, Copy, Debug)]
pub struct RenderEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Host time when the callback returned.
    pub timestamp: HostTime,
}

/// Emitted after a collector has been flushed to its host.
#[derive(Clone, Copy, Debug)]
pub struct PresentEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// What the host was asked to do.
    pub outcome: PresentOutcome,
    /// Host time of the present call.
    pub timestamp: HostTime,
}

/// Emitted when requests were suppressed by a controller lock.
#[derive(Clone, Copy, Debug)]
pub struct RequestDroppedEvent {
    /// Frame that replayed the lock, i.e. the first frame after unlocking.
    pub frame_index: u64,
    /// Number of requests ignored while locked.
    pub dropped: u32,
}

/// Per-frame timing summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Reasons snapshotted for this frame.
    pub reasons: RenderReasons,
    /// Host time when the render thread woke for this frame.
    pub woke_at: HostTime,
    /// Pacing deadline the frame was held to, if any.
    pub deadline: Option<HostTime>,
    /// Ticks spent inside the render callback (0 if not measured).
    pub render_ticks: u64,
    /// Ticks the wake landed after the deadline (0 if on time or unpaced).
    pub late_ticks: u64,
}

/// Receives trace events from the render loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called before the render callback runs.
    fn on_render_begin(&mut self, e: &RenderBeginEvent) {
        _ = e;
    }

    /// Called after the render callback returns.
    fn on_render_end(&mut self, e: &RenderEndEvent) {
        _ = e;
    }

    /// Called after a present.
    fn on_present(&mut self, e: &PresentEvent) {
        _ = e;
    }

    /// Called when requests suppressed by a lock are folded into a frame.
    fn on_request_dropped(&mut self, e: &RequestDroppedEvent) {
        _ = e;
    }

    /// Called with a per-frame timing summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer from an optional sink.
    #[inline]
    #[must_use]
    pub fn from_option(sink: Option<&'a mut dyn TraceSink>) -> Self {
        match sink {
            Some(s) => Self::new(s),
            None => Self::none(),
        }
    }

    /// Emits a [`RenderBeginEvent`].
    #[inline]
    pub fn render_begin(&mut self, e: &RenderBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RenderEndEvent`].
    #[inline]
    pub fn render_end(&mut self, e: &RenderEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PresentEvent`].
    #[inline]
    pub fn present(&mut self, e: &PresentEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_present(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RequestDroppedEvent`].
    #[inline]
    pub fn request_dropped(&mut self, e: &RequestDroppedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_request_dropped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

/// Collects timestamps during a frame and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    frame_index: u64,
    reasons: RenderReasons,
    woke_at: HostTime,
    deadline: Option<HostTime>,
    render_begin: Option<HostTime>,
    render_end: Option<HostTime>,
}

impl FrameSummaryBuilder {
    /// Starts a summary for a frame that woke at `woke_at`.
    #[must_use]
    pub fn new(
        frame_index: u64,
        reasons: RenderReasons,
        woke_at: HostTime,
        deadline: Option<HostTime>,
    ) -> Self {
        Self {
            frame_index,
            reasons,
            woke_at,
            deadline,
            render_begin: None,
            render_end: None,
        }
    }

    /// Records the start of the render callback.
    pub fn render_begin(&mut self, t: HostTime) {
        self.render_begin = Some(t);
    }

    /// Records the end of the render callback.
    pub fn render_end(&mut self, t: HostTime) {
        self.render_end = Some(t);
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        let render_ticks = match (self.render_begin, self.render_end) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        };
        let late_ticks = self
            .deadline
            .map_or(0, |d| self.woke_at.saturating_duration_since(d).ticks());
        FrameSummary {
            frame_index: self.frame_index,
            reasons: self.reasons,
            woke_at: self.woke_at,
            deadline: self.deadline,
            render_ticks,
            late_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> RenderBeginEvent {
        RenderBeginEvent {
            frame_index: 42,
            reasons: RenderReasons::REDRAW_ALL,
            timestamp: HostTime(1_000_000),
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_render_begin(&sample_begin());
        sink.on_present(&PresentEvent {
            frame_index: 42,
            outcome: PresentOutcome::Full,
            timestamp: HostTime(0),
        });
        sink.on_request_dropped(&RequestDroppedEvent {
            frame_index: 1,
            dropped: 3,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.render_begin(&sample_begin());
        tracer.render_end(&RenderEndEvent {
            frame_index: 42,
            timestamp: HostTime(5),
        });
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut builder = FrameSummaryBuilder::new(
            7,
            RenderReasons::RESIZE,
            HostTime(1_000_250),
            Some(HostTime(1_000_000)),
        );
        builder.render_begin(HostTime(1_000_300));
        builder.render_end(HostTime(1_002_300));
        let summary = builder.finish();
        assert_eq!(summary.frame_index, 7);
        assert_eq!(summary.render_ticks, 2_000);
        assert_eq!(summary.late_ticks, 250, "woke 250 ticks after the deadline");
        assert_eq!(summary.reasons, RenderReasons::RESIZE);
    }

    #[test]
    fn summary_builder_missing_render_is_zero() {
        let summary =
            FrameSummaryBuilder::new(0, RenderReasons::empty(), HostTime(10), None).finish();
        assert_eq!(summary.render_ticks, 0);
        assert_eq!(summary.late_ticks, 0, "unpaced frames are never late");
    }

    #[test]
    fn early_wake_is_not_late() {
        let summary = FrameSummaryBuilder::new(
            0,
            RenderReasons::empty(),
            HostTime(10),
            Some(HostTime(50)),
        )
        .finish();
        assert_eq!(summary.late_ticks, 0);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            frames: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_render_begin(&mut self, e: &RenderBeginEvent) {
                self.frames.push(e.frame_index);
            }
        }

        let mut sink = RecordingSink { frames: Vec::new() };
        let mut tracer = Tracer::from_option(Some(&mut sink));
        tracer.render_begin(&sample_begin());
        drop(tracer);
        assert_eq!(sink.frames, &[42]);
    }
}
