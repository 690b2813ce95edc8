// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace sinks for inspecting the presto render loop.
//!
//! This crate provides [`TraceSink`](presto_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`log_sink::LogSink`] — forwards events to the `log` facade.
//! - [`recorder::RecorderSink`] — keeps every event in memory for later
//!   inspection.
//! - [`chrome::export`] — writes recorded events as Chrome Trace Event Format
//!   JSON.

pub mod chrome;
pub mod log_sink;
pub mod pretty;
pub mod recorder;

pub use log_sink::LogSink;
pub use pretty::PrettyPrintSink;
pub use recorder::{RecordedEvent, RecorderSink, SharedRecording};
