// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] takes events from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use presto_core::dirty::PresentOutcome;
use presto_core::time::Timebase;

use crate::recorder::RecordedEvent;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Render callbacks become duration slices; presents, dropped requests and
/// frame summaries become instant events.
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
/// Dropped-request events carry no timestamp of their own and are placed at
/// the most recent timestamp seen.
pub fn export(
    events: &[RecordedEvent],
    timebase: Timebase,
    writer: &mut dyn Write,
) -> io::Result<()> {
    let mut out: Vec<Value> = Vec::with_capacity(events.len());
    let mut last_ts = 0.0;

    for recorded in events {
        match recorded {
            RecordedEvent::RenderBegin(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                out.push(json!({
                    "ph": "B",
                    "name": "Render",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "reasons": format!("{:?}", e.reasons),
                    }
                }));
            }
            RecordedEvent::RenderEnd(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                out.push(json!({
                    "ph": "E",
                    "name": "Render",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::Present(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                let (outcome, rects) = match e.outcome {
                    PresentOutcome::Full => ("Full", None),
                    PresentOutcome::Partial(n) => ("Partial", Some(n)),
                    PresentOutcome::Skipped => ("Skipped", None),
                    PresentOutcome::Occluded => ("Occluded", None),
                };
                out.push(json!({
                    "ph": "i",
                    "name": "Present",
                    "cat": "Present",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "outcome": outcome,
                        "rects": rects,
                    }
                }));
            }
            RecordedEvent::RequestDropped(e) => {
                out.push(json!({
                    "ph": "i",
                    "name": "RequestsDropped",
                    "cat": "Controller",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "dropped": e.dropped,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                last_ts = ticks_to_us(s.woke_at.ticks(), timebase);
                out.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Controller",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "reasons": format!("{:?}", s.reasons),
                        "deadline_us": s.deadline.map(|d| ticks_to_us(d.ticks(), timebase)),
                        "render_us": ticks_to_us(s.render_ticks, timebase),
                        "late_us": ticks_to_us(s.late_ticks, timebase),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use presto_core::reasons::RenderReasons;
    use presto_core::time::HostTime;
    use presto_core::trace::{
        PresentEvent, RenderBeginEvent, RenderEndEvent, RequestDroppedEvent, TraceSink,
    };

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_render_begin(&RenderBeginEvent {
            frame_index: 0,
            reasons: RenderReasons::REDRAW_ALL,
            timestamp: HostTime(1_000_000),
        });
        rec.on_render_end(&RenderEndEvent {
            frame_index: 0,
            timestamp: HostTime(1_500_000),
        });
        rec.on_present(&PresentEvent {
            frame_index: 0,
            outcome: PresentOutcome::Partial(4),
            timestamp: HostTime(1_600_000),
        });
        rec.on_request_dropped(&RequestDroppedEvent {
            frame_index: 0,
            dropped: 2,
        });

        let mut out = Vec::new();
        export(&rec.events(), Timebase::NANOS, &mut out).expect("export to a Vec");
        let json_str = String::from_utf8(out).expect("JSON is UTF-8");

        let parsed: Vec<Value> = serde_json::from_str(&json_str).expect("a JSON array");
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "B", "render callback opens a slice");
        assert_eq!(parsed[0]["name"], "Render");
        assert_eq!(parsed[0]["ts"], 1000.0);

        assert_eq!(parsed[1]["ph"], "E", "and closes it");
        assert_eq!(parsed[1]["ts"], 1500.0);

        assert_eq!(parsed[2]["name"], "Present");
        assert_eq!(parsed[2]["args"]["outcome"], "Partial");
        assert_eq!(parsed[2]["args"]["rects"], 4);

        assert_eq!(parsed[3]["name"], "RequestsDropped");
        assert_eq!(parsed[3]["ts"], 1600.0, "placed at the last seen timestamp");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).expect("export to a Vec");
        let json_str = String::from_utf8(out).expect("JSON is UTF-8");
        let parsed: Vec<Value> = serde_json::from_str(&json_str).expect("a JSON array");
        assert!(parsed.is_empty(), "no events, empty array");
    }
}
