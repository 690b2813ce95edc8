// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame-paced render thread.
//!
//! A [`RenderingController`] owns one background thread, the only thread that
//! ever calls the [`RenderCallback`] (and so the only one touching the device
//! context, the collector and the host). Other threads talk to it through
//! atomics plus a wake signal:
//!
//! ```text
//!   request_update ──fetch_or(flags)──► pending ──swap(0)──► render(reasons)
//!          └──────────wake_up()──────────► wait handle ◄── render thread parks
//! ```
//!
//! # Pacing
//!
//! After each frame the thread computes an absolute deadline, one frame
//! interval after the callback returned. A wake that arrives after the
//! deadline (the thread was idle) renders immediately. A wake that arrives
//! before it is held until the deadline, so every request landing within one
//! frame interval is batched into a single frame.
//!
//! # States
//!
//! ```text
//!   Idle ──request──► Pending ──deadline──► Rendering ──► Idle
//!     │                                                    │
//!     └── lock ──► Locked ── unlock (replays RESIZE|REDRAW_ALL) ──► Pending
//!   any ── stop ──► Stopped
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use presto_core::dirty::DirtyRegionCollector;
use presto_core::reasons::RenderReasons;
use presto_core::time::{self as host_time, HostTime};
use presto_core::trace::{
    FrameSummaryBuilder, RenderBeginEvent, RenderEndEvent, RequestDroppedEvent, TraceSink, Tracer,
};

use crate::clock;
use crate::config::ControllerConfig;
use crate::error::{ControllerError, WaitError};
use crate::wait::{WaitHandle, WaitStrategy};

/// Set on every accepted request so a render happens even with no reasons.
const REQUESTED: u32 = 1 << 31;

/// Frame-cycle value that tells the render thread to exit.
const STOP_SENTINEL: i64 = -1;

const PHASE_IDLE: u8 = 0;
const PHASE_PENDING: u8 = 1;
const PHASE_RENDERING: u8 = 2;
const PHASE_STOPPED: u8 = 3;

/// Draws one frame.
///
/// `reasons` is the snapshot of everything requested since the previous
/// frame. Implementations draw through regional contexts, mark what they
/// touched on `collector`, and typically present before returning.
pub trait RenderCallback {
    /// Renders a frame.
    fn render(&mut self, reasons: RenderReasons, collector: &mut DirtyRegionCollector);
}

impl<F> RenderCallback for F
where
    F: FnMut(RenderReasons, &mut DirtyRegionCollector),
{
    fn render(&mut self, reasons: RenderReasons, collector: &mut DirtyRegionCollector) {
        self(reasons, collector);
    }
}

/// Observable controller state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerState {
    /// Nothing pending; the thread is parked.
    Idle,
    /// A request is waiting for the next frame.
    Pending,
    /// The render callback is running.
    Rendering,
    /// Requests are being dropped.
    Locked,
    /// The thread is exiting or has exited.
    Stopped,
}

/// State shared between the controller handle and its render thread.
#[derive(Debug)]
struct Shared {
    pending: AtomicU32,
    locked: AtomicBool,
    /// Frame interval in host ticks; negative once stopped.
    frame_cycle_ticks: AtomicI64,
    frames_per_second: AtomicU32,
    dropped: AtomicU32,
    phase: AtomicU8,
    frames_rendered: AtomicU64,
    /// Auto-reset: requests and stop.
    wake: WaitHandle,
    /// Manual-reset: set whenever no callback is running.
    rendering_done: WaitHandle,
    /// Manual-reset: set once the thread has left its loop.
    exited: WaitHandle,
}

impl Shared {
    fn is_stopped(&self) -> bool {
        self.frame_cycle_ticks.load(Ordering::Acquire) < 0
    }

    fn set_phase(&self, phase: u8) {
        self.phase.store(phase, Ordering::Release);
    }
}

/// Drives a [`RenderCallback`] from a dedicated, frame-paced thread.
pub struct RenderingController {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<Result<(), WaitError>>>,
    exit_timeout: Duration,
}

impl core::fmt::Debug for RenderingController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderingController")
            .field("state", &self.state())
            .field("frames_per_second", &self.frames_per_second())
            .field("exit_timeout", &self.exit_timeout)
            .finish_non_exhaustive()
    }
}

impl RenderingController {
    /// Starts a render thread. It stays idle until the first request.
    pub fn spawn<C>(
        config: ControllerConfig,
        collector: DirtyRegionCollector,
        callback: C,
    ) -> Result<Self, ControllerError>
    where
        C: RenderCallback + Send + 'static,
    {
        Self::spawn_inner(config, collector, callback, None)
    }

    /// Starts a render thread that reports frame events to `sink`.
    pub fn spawn_traced<C>(
        config: ControllerConfig,
        collector: DirtyRegionCollector,
        callback: C,
        sink: Box<dyn TraceSink + Send>,
    ) -> Result<Self, ControllerError>
    where
        C: RenderCallback + Send + 'static,
    {
        Self::spawn_inner(config, collector, callback, Some(sink))
    }

    fn spawn_inner<C>(
        config: ControllerConfig,
        collector: DirtyRegionCollector,
        callback: C,
        sink: Option<Box<dyn TraceSink + Send>>,
    ) -> Result<Self, ControllerError>
    where
        C: RenderCallback + Send + 'static,
    {
        let strategy = config.wait_strategy.unwrap_or_else(WaitStrategy::detect);
        let fps = config.frames_per_second.max(1);
        let shared = Arc::new(Shared {
            pending: AtomicU32::new(0),
            locked: AtomicBool::new(false),
            frame_cycle_ticks: AtomicI64::new(frame_cycle_ticks(fps)),
            frames_per_second: AtomicU32::new(fps),
            dropped: AtomicU32::new(0),
            phase: AtomicU8::new(PHASE_IDLE),
            frames_rendered: AtomicU64::new(0),
            wake: strategy.create_handle(false),
            rendering_done: strategy.create_handle(true),
            exited: strategy.create_handle(true),
        });
        shared.rendering_done.wake_up();

        let thread = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name(config.thread_name.into())
                .spawn(move || {
                    let mut render_loop = RenderLoop {
                        shared: &shared,
                        callback,
                        collector,
                        sink,
                        next_deadline: None,
                        frame_index: 0,
                    };
                    render_loop.run()
                })
                .map_err(ControllerError::Spawn)?
        };
        log::debug!(
            "render thread started ({strategy:?}, {fps} fps, {:?})",
            config.thread_name
        );

        Ok(Self {
            shared,
            thread: Some(thread),
            exit_timeout: config.exit_timeout,
        })
    }

    /// Requests a frame. With `force`, the frame redraws everything.
    ///
    /// Ignored while locked.
    pub fn request_update(&self, force: bool) {
        let reasons = if force {
            RenderReasons::REDRAW_ALL
        } else {
            RenderReasons::empty()
        };
        self.request(reasons);
    }

    /// Requests a full redraw after a size change. Ignored while locked.
    pub fn request_resize(&self) {
        self.request(RenderReasons::RESIZE | RenderReasons::REDRAW_ALL);
    }

    /// Requests a full redraw for an interactive, still-changing resize.
    ///
    /// Ignored while locked.
    pub fn request_temporary_resize(&self) {
        self.request(
            RenderReasons::RESIZE | RenderReasons::RESIZE_TEMPORARILY | RenderReasons::REDRAW_ALL,
        );
    }

    fn request(&self, reasons: RenderReasons) {
        if self.shared.locked.load(Ordering::Acquire) {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.shared
            .pending
            .fetch_or(reasons.bits() | REQUESTED, Ordering::Release);
        self.shared.wake.wake_up();
    }

    /// Suppresses all requests and rendering until [`unlock`](Self::unlock).
    pub fn lock(&self) {
        self.shared.locked.store(true, Ordering::Release);
    }

    /// Lifts a lock and schedules one resize-and-redraw-all frame covering
    /// whatever changed meanwhile.
    ///
    /// Returns `false` if the controller was not locked.
    pub fn unlock(&self) -> bool {
        if !self.shared.locked.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.shared.pending.fetch_or(
            (RenderReasons::RESIZE | RenderReasons::REDRAW_ALL).bits() | REQUESTED,
            Ordering::Release,
        );
        self.shared.wake.wake_up();
        true
    }

    /// Whether requests are currently being dropped.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.shared.locked.load(Ordering::Acquire)
    }

    /// Changes the target cadence; zero is treated as one.
    ///
    /// Applies from the next computed deadline. A deadline already being
    /// waited on is not re-armed.
    pub fn set_frames_per_second(&self, fps: u32) {
        let fps = fps.max(1);
        self.shared.frames_per_second.store(fps, Ordering::Relaxed);
        let ticks = frame_cycle_ticks(fps);
        // Never overwrite the stop sentinel.
        _ = self.shared.frame_cycle_ticks.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |current| (current >= 0).then_some(ticks),
        );
    }

    /// The target cadence.
    #[must_use]
    pub fn frames_per_second(&self) -> u32 {
        self.shared.frames_per_second.load(Ordering::Relaxed)
    }

    /// Number of times the render callback has returned.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.shared.frames_rendered.load(Ordering::Acquire)
    }

    /// Blocks until no render callback is running, or until `timeout`.
    ///
    /// Returns `true` if the render thread is between frames.
    pub fn wait_for_rendering(&self, timeout: Option<Duration>) -> bool {
        match self.shared.rendering_done.wait(timeout) {
            Ok(done) => done,
            Err(err) => {
                log::error!("waiting for the rendering gate failed: {err}");
                false
            }
        }
    }

    /// Asks the render thread to exit after the frame in progress, if any.
    pub fn stop(&self) {
        self.shared
            .frame_cycle_ticks
            .store(STOP_SENTINEL, Ordering::Release);
        self.shared.wake.wake_up();
    }

    /// Blocks until the render thread has left its loop, or until `timeout`.
    pub fn wait_for_exit(&self, timeout: Option<Duration>) -> bool {
        match self.shared.exited.wait(timeout) {
            Ok(exited) => exited,
            Err(err) => {
                log::error!("waiting for render thread exit failed: {err}");
                false
            }
        }
    }

    /// The controller's current state.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        let phase = self.shared.phase.load(Ordering::Acquire);
        if phase == PHASE_STOPPED || self.shared.is_stopped() {
            ControllerState::Stopped
        } else if phase == PHASE_RENDERING {
            ControllerState::Rendering
        } else if self.shared.locked.load(Ordering::Acquire) {
            ControllerState::Locked
        } else if phase == PHASE_PENDING || self.shared.pending.load(Ordering::Acquire) != 0 {
            ControllerState::Pending
        } else {
            ControllerState::Idle
        }
    }

    /// Stops the render thread and reports how it ended.
    ///
    /// Waits at most the configured exit timeout; on timeout the thread is
    /// detached.
    pub fn shutdown(mut self) -> Result<(), ControllerError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<(), ControllerError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        self.stop();
        if !self.wait_for_exit(Some(self.exit_timeout)) {
            return Err(ControllerError::ExitTimeout);
        }
        match thread.join() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(ControllerError::Wait(err)),
            Err(_) => Err(ControllerError::RenderPanicked),
        }
    }
}

impl Drop for RenderingController {
    fn drop(&mut self) {
        match self.finish() {
            Ok(()) => {}
            Err(ControllerError::ExitTimeout) => {
                log::warn!(
                    "render thread did not exit within {:?}; detaching",
                    self.exit_timeout
                );
            }
            Err(err) => log::error!("render thread ended abnormally: {err}"),
        }
    }
}

fn frame_cycle_ticks(fps: u32) -> i64 {
    let ticks = host_time::Duration::frame_interval(fps, clock::timebase()).ticks();
    i64::try_from(ticks).unwrap_or(i64::MAX)
}

/// Render-thread side of the controller.
struct RenderLoop<'a, C> {
    shared: &'a Shared,
    callback: C,
    collector: DirtyRegionCollector,
    sink: Option<Box<dyn TraceSink + Send>>,
    next_deadline: Option<HostTime>,
    frame_index: u64,
}

/// Releases the rendering gate and the exit signal however the thread ends.
struct ExitGuard<'a>(&'a Shared);

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        self.0.set_phase(PHASE_STOPPED);
        self.0.rendering_done.wake_up();
        self.0.exited.wake_up();
    }
}

impl<C: RenderCallback> RenderLoop<'_, C> {
    fn run(&mut self) -> Result<(), WaitError> {
        let _exit = ExitGuard(self.shared);
        loop {
            self.shared.set_phase(PHASE_IDLE);
            self.shared.wake.wait(None)?;
            if self.shared.is_stopped() {
                return Ok(());
            }
            if !self.hold_until_deadline()? {
                return Ok(());
            }
            if self.shared.locked.load(Ordering::Acquire) {
                continue;
            }
            let bits = self.shared.pending.swap(0, Ordering::AcqRel);
            if bits == 0 {
                continue;
            }
            self.render_frame(RenderReasons::from_bits_truncate(bits & !REQUESTED));
        }
    }

    /// Waits out the rest of the current frame interval.
    ///
    /// Wakes during the hold are absorbed; their flags stay pending for the
    /// frame at the deadline. Returns `false` if a stop arrived.
    fn hold_until_deadline(&mut self) -> Result<bool, WaitError> {
        let Some(deadline) = self.next_deadline else {
            return Ok(true);
        };
        self.shared.set_phase(PHASE_PENDING);
        while let Some(remaining) = clock::until(deadline) {
            self.shared.wake.wait(Some(remaining))?;
            if self.shared.is_stopped() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn render_frame(&mut self, reasons: RenderReasons) {
        let woke_at = clock::now();
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let mut tracer = Tracer::from_option(self.sink.as_deref_mut().map(|s| {
            let s: &mut dyn TraceSink = s;
            s
        }));
        let mut summary =
            FrameSummaryBuilder::new(frame_index, reasons, woke_at, self.next_deadline);

        let dropped = self.shared.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            tracer.request_dropped(&RequestDroppedEvent {
                frame_index,
                dropped,
            });
        }

        self.shared.rendering_done.reset();
        self.shared.set_phase(PHASE_RENDERING);
        let begin = clock::now();
        summary.render_begin(begin);
        tracer.render_begin(&RenderBeginEvent {
            frame_index,
            reasons,
            timestamp: begin,
        });

        let result = catch_unwind(AssertUnwindSafe(|| {
            self.callback.render(reasons, &mut self.collector);
        }));

        let end = clock::now();
        self.shared.set_phase(PHASE_IDLE);
        self.shared.rendering_done.wake_up();
        if let Err(payload) = result {
            log::error!("render callback panicked on frame {frame_index}; render thread exiting");
            resume_unwind(payload);
        }
        self.shared.frames_rendered.fetch_add(1, Ordering::AcqRel);

        summary.render_end(end);
        tracer.render_end(&RenderEndEvent {
            frame_index,
            timestamp: end,
        });
        tracer.frame_summary(&summary.finish());

        let interval = self.shared.frame_cycle_ticks.load(Ordering::Acquire).max(0);
        self.next_deadline = Some(end.saturating_add(host_time::Duration(interval.unsigned_abs())));
    }
}
