// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-paced rendering on a dedicated thread.
//!
//! `presto_pacing` drives the render passes of `presto_core`. Any thread may
//! ask for a frame; requests are coalesced into [`RenderReasons`] and the
//! render thread runs at most one frame per interval.
//!
//! [`RenderReasons`]: presto_core::reasons::RenderReasons
//!
//! # Architecture
//!
//! ```text
//!   UI thread(s)                         render thread
//!   ─────────────                        ─────────────
//!   request_update ──► pending flags ──► RenderCallback::render(reasons, collector)
//!   lock / unlock  ──► locked gate         │
//!   wait_for_rendering ◄── rendering_done ◄┘
//! ```
//!
//! **[`controller`]** — [`RenderingController`]: the thread, its request
//! flags, locking, pacing and shutdown.
//!
//! **[`renderer`]** — [`PresentingRenderer`]: a ready-made callback that
//! opens a root regional context, runs a draw closure and presents the dirty
//! region.
//!
//! **[`wait`]** — [`WaitHandle`] events backed by a futex on Linux or a
//! `parking_lot` condition variable elsewhere.
//!
//! **[`clock`]** — Monotonic host time.
//!
//! **[`config`]** / **[`error`]** — [`ControllerConfig`] and error types.
//!
//! # Crate features
//!
//! - `trace` (enabled by default): Forwards controller and renderer events to
//!   an attached [`TraceSink`](presto_core::trace::TraceSink).

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod renderer;
pub mod wait;

pub use config::ControllerConfig;
pub use controller::{ControllerState, RenderCallback, RenderingController};
pub use error::{ControllerError, WaitError};
pub use renderer::PresentingRenderer;
pub use wait::{WaitHandle, WaitStrategy};
