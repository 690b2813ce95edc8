// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace events through the `log` facade.
//!
//! [`LogSink`] emits per-phase events at `trace` level and per-frame
//! summaries, dropped requests and late or occluded frames at `debug`, all
//! under a configurable target.

use presto_core::dirty::PresentOutcome;
use presto_core::trace::{
    FrameSummary, PresentEvent, RenderBeginEvent, RenderEndEvent, RequestDroppedEvent, TraceSink,
};

/// Forwards trace events to [`log`] records.
#[derive(Clone, Copy, Debug)]
pub struct LogSink {
    target: &'static str,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink {
    /// Creates a sink logging under the `presto::trace` target.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_target("presto::trace")
    }

    /// Creates a sink logging under `target`.
    #[must_use]
    pub const fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    /// The log target records are emitted under.
    #[must_use]
    pub const fn target(&self) -> &'static str {
        self.target
    }
}

impl TraceSink for LogSink {
    fn on_render_begin(&mut self, e: &RenderBeginEvent) {
        log::trace!(
            target: self.target,
            "frame {} render begin reasons={:?} at {}t",
            e.frame_index,
            e.reasons,
            e.timestamp.ticks(),
        );
    }

    fn on_render_end(&mut self, e: &RenderEndEvent) {
        log::trace!(
            target: self.target,
            "frame {} render end at {}t",
            e.frame_index,
            e.timestamp.ticks(),
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        if e.outcome == PresentOutcome::Occluded {
            log::debug!(target: self.target, "frame {} occluded", e.frame_index);
        } else {
            log::trace!(
                target: self.target,
                "frame {} present {:?}",
                e.frame_index,
                e.outcome,
            );
        }
    }

    fn on_request_dropped(&mut self, e: &RequestDroppedEvent) {
        log::debug!(
            target: self.target,
            "frame {} replays {} request(s) made while locked",
            e.frame_index,
            e.dropped,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        log::debug!(
            target: self.target,
            "frame {} reasons={:?} render={}t late={}t",
            s.frame_index,
            s.reasons,
            s.render_ticks,
            s.late_ticks,
        );
    }
}
