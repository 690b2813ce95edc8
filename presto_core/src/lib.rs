// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-region tracking and scoped rendering contexts.
//!
//! `presto_core` holds the single-threaded half of an incremental UI renderer:
//! the data a render pass writes into and the rules for turning it into a
//! partial present. It is `no_std` compatible (with `alloc`). The threaded
//! frame pacing that drives a render pass lives in `presto_pacing`.
//!
//! # Architecture
//!
//! ```text
//!   render pass (one thread)
//!       │
//!       ▼
//!   RegionalRenderingContext ──draw──► DeviceContext
//!       │ mark_dirty (local → global points)
//!       ▼
//!   DirtyRegionCollector ──flush (scale, round out)──► PresentHost::present_rects
//! ```
//!
//! **[`geometry`]** — [`PixelRect`](geometry::PixelRect), the coordinate-space
//! tag, and outward-rounding pixel-alignment helpers.
//!
//! **[`dirty`]** — [`DirtyRegionCollector`](dirty::DirtyRegionCollector):
//! tagged dirty rectangles, one-shot present-all, and the flush that builds
//! the device-pixel rectangle list.
//!
//! **[`pool`]** — Scratch buffers reused across flushes.
//!
//! **[`region`]** — [`RegionalRenderingContext`](region::RegionalRenderingContext),
//! a scoped translate-and-clip over a device context.
//!
//! **[`device`]** / **[`host`]** — The drawing and presentation contracts a
//! graphics backend implements.
//!
//! **[`reasons`]** — Why a frame is being rendered.
//!
//! **[`time`]** — Monotonic host time and timebase conversion.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! render-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `test-helpers` (disabled by default): Exposes the recording doubles in
//!   `testing`.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod device;
pub mod dirty;
pub mod geometry;
pub mod host;
pub mod pool;
pub mod reasons;
pub mod region;
pub mod time;
pub mod trace;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;
