// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use presto_core::dirty::PresentOutcome;
use presto_core::time::{HostTime, Timebase};
use presto_core::trace::{
    FrameSummary, PresentEvent, RenderBeginEvent, RenderEndEvent, RequestDroppedEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

fn outcome_label(outcome: PresentOutcome) -> String {
    match outcome {
        PresentOutcome::Full => "full".into(),
        PresentOutcome::Partial(n) => format!("partial({n})"),
        PresentOutcome::Skipped => "skipped".into(),
        PresentOutcome::Occluded => "OCCLUDED".into(),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_render_begin(&mut self, e: &RenderBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[render:begin] frame={} reasons={:?} at {:.1}µs",
            e.frame_index,
            e.reasons,
            self.host_us(e.timestamp),
        );
    }

    fn on_render_end(&mut self, e: &RenderEndEvent) {
        let _ = writeln!(
            self.writer,
            "[render:end] frame={} at {:.1}µs",
            e.frame_index,
            self.host_us(e.timestamp),
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        let _ = writeln!(
            self.writer,
            "[present] frame={} {} at {:.1}µs",
            e.frame_index,
            outcome_label(e.outcome),
            self.host_us(e.timestamp),
        );
    }

    fn on_request_dropped(&mut self, e: &RequestDroppedEvent) {
        let _ = writeln!(
            self.writer,
            "[dropped] frame={} requests={}",
            e.frame_index, e.dropped,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let deadline = match s.deadline {
            None => "none".to_owned(),
            Some(_) if s.late_ticks > 0 => format!("LATE {:.1}µs", self.ticks_to_us(s.late_ticks)),
            Some(_) => "ok".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} reasons={:?} render={:.1}µs deadline={deadline}",
            s.frame_index,
            s.reasons,
            self.ticks_to_us(s.render_ticks),
        );
    }
}

#[cfg(test)]
mod tests {
    use presto_core::reasons::RenderReasons;

    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).expect("sink writes UTF-8")
    }

    #[test]
    fn pretty_print_render_begin() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_render_begin(&RenderBeginEvent {
            frame_index: 1,
            reasons: RenderReasons::RESIZE,
            timestamp: HostTime(1_000_000),
        });
        let output = output(sink);
        assert!(output.contains("[render:begin]"), "got: {output}");
        assert!(output.contains("frame=1"), "got: {output}");
        assert!(output.contains("1000.0µs"), "got: {output}");
        assert!(output.contains("RESIZE"), "got: {output}");
    }

    #[test]
    fn pretty_print_present_outcomes() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        for (frame_index, outcome) in [PresentOutcome::Partial(3), PresentOutcome::Occluded]
            .into_iter()
            .enumerate()
        {
            sink.on_present(&PresentEvent {
                frame_index: frame_index as u64,
                outcome,
                timestamp: HostTime(0),
            });
        }
        let output = output(sink);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2, "one line per event, got: {output}");
        assert!(lines[0].contains("partial(3)"), "got: {output}");
        assert!(lines[1].contains("OCCLUDED"), "got: {output}");
    }

    #[test]
    fn pretty_print_late_summary() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_frame_summary(&FrameSummary {
            frame_index: 9,
            reasons: RenderReasons::empty(),
            woke_at: HostTime(2_000_000),
            deadline: Some(HostTime(1_500_000)),
            render_ticks: 250_000,
            late_ticks: 500_000,
        });
        sink.on_request_dropped(&RequestDroppedEvent {
            frame_index: 9,
            dropped: 4,
        });
        let output = output(sink);
        assert!(output.contains("render=250.0µs"), "got: {output}");
        assert!(output.contains("deadline=LATE 500.0µs"), "got: {output}");
        assert!(output.contains("[dropped] frame=9 requests=4"), "got: {output}");
    }
}
