// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event, in order,
//! as a [`RecordedEvent`]. Hand it to a controller, stop the controller, then
//! inspect the events or pass them to [`chrome::export`](crate::chrome::export).
//!
//! The render thread owns its sink, so [`RecorderSink::shared`] returns a
//! handle that can read the recording from another thread.

use std::sync::Arc;

use presto_core::trace::{
    FrameSummary, PresentEvent, RenderBeginEvent, RenderEndEvent, RequestDroppedEvent, TraceSink,
};

/// One recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`RenderBeginEvent`].
    RenderBegin(RenderBeginEvent),
    /// A [`RenderEndEvent`].
    RenderEnd(RenderEndEvent),
    /// A [`PresentEvent`].
    Present(PresentEvent),
    /// A [`RequestDroppedEvent`].
    RequestDropped(RequestDroppedEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
}

impl RecordedEvent {
    /// The frame the event belongs to.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::RenderBegin(e) => e.frame_index,
            Self::RenderEnd(e) => e.frame_index,
            Self::Present(e) => e.frame_index,
            Self::RequestDropped(e) => e.frame_index,
            Self::FrameSummary(s) => s.frame_index,
        }
    }
}

type Events = Arc<parking_lot::Mutex<Vec<RecordedEvent>>>;

/// A [`TraceSink`] that records events in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Events,
}

/// A read handle onto a [`RecorderSink`] that may live on another thread.
#[derive(Clone, Debug)]
pub struct SharedRecording {
    events: Events,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that observes this recorder's events.
    #[must_use]
    pub fn shared(&self) -> SharedRecording {
        SharedRecording {
            events: Arc::clone(&self.events),
        }
    }

    /// Returns a copy of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    fn push(&self, event: RecordedEvent) {
        self.events.lock().push(event);
    }
}

impl SharedRecording {
    /// Returns a copy of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Number of events recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TraceSink for RecorderSink {
    fn on_render_begin(&mut self, e: &RenderBeginEvent) {
        self.push(RecordedEvent::RenderBegin(*e));
    }

    fn on_render_end(&mut self, e: &RenderEndEvent) {
        self.push(RecordedEvent::RenderEnd(*e));
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.push(RecordedEvent::Present(*e));
    }

    fn on_request_dropped(&mut self, e: &RequestDroppedEvent) {
        self.push(RecordedEvent::RequestDropped(*e));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.push(RecordedEvent::FrameSummary(*s));
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use presto_core::dirty::PresentOutcome;
    use presto_core::reasons::RenderReasons;
    use presto_core::time::HostTime;

    use super::*;

    #[test]
    fn records_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_render_begin(&RenderBeginEvent {
            frame_index: 3,
            reasons: RenderReasons::RESIZE,
            timestamp: HostTime(100),
        });
        rec.on_present(&PresentEvent {
            frame_index: 3,
            outcome: PresentOutcome::Partial(2),
            timestamp: HostTime(180),
        });
        rec.on_render_end(&RenderEndEvent {
            frame_index: 3,
            timestamp: HostTime(200),
        });

        let events = rec.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            RecordedEvent::RenderBegin(e) if e.reasons == RenderReasons::RESIZE
        ));
        assert!(matches!(
            events[1],
            RecordedEvent::Present(e) if e.outcome == PresentOutcome::Partial(2)
        ));
        assert!(matches!(
            events[2],
            RecordedEvent::RenderEnd(e) if e.timestamp == HostTime(200)
        ));
        assert!(
            events.iter().all(|e| e.frame_index() == 3),
            "every event tagged with its frame"
        );
    }

    #[test]
    fn shared_handle_sees_events_from_another_thread() {
        let rec = RecorderSink::new();
        let shared = rec.shared();
        assert!(shared.is_empty());

        let mut rec = rec;
        thread::spawn(move || {
            rec.on_request_dropped(&RequestDroppedEvent {
                frame_index: 1,
                dropped: 5,
            });
        })
        .join()
        .expect("recording thread");

        assert_eq!(shared.len(), 1);
        assert!(matches!(
            shared.events()[0],
            RecordedEvent::RequestDropped(RequestDroppedEvent { dropped: 5, .. })
        ));
    }
}
