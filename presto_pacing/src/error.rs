// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the render thread and its wait primitives.

use std::fmt;
use std::io;

/// An unexpected failure from a wait primitive.
///
/// Timeouts, spurious wakeups and interrupted waits are handled internally;
/// anything else means the host OS cannot park the render thread and is fatal
/// to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitError {
    /// The OS reported an error code.
    Os(i32),
}

impl fmt::Display for WaitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Os(code) => write!(f, "wait primitive failed (os error {code})"),
        }
    }
}

impl core::error::Error for WaitError {}

/// Errors reported by [`RenderingController`](crate::RenderingController).
#[derive(Debug)]
pub enum ControllerError {
    /// The render thread could not be started.
    Spawn(io::Error),
    /// The render thread stopped because a wait failed.
    Wait(WaitError),
    /// The render thread did not acknowledge a stop within the exit timeout.
    ExitTimeout,
    /// The render callback panicked and the render thread terminated.
    RenderPanicked,
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to spawn render thread: {err}"),
            Self::Wait(err) => write!(f, "render thread aborted: {err}"),
            Self::ExitTimeout => f.write_str("render thread did not exit in time"),
            Self::RenderPanicked => f.write_str("render callback panicked"),
        }
    }
}

impl core::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::Wait(err) => Some(err),
            Self::ExitTimeout | Self::RenderPanicked => None,
        }
    }
}

impl From<WaitError> for ControllerError {
    fn from(err: WaitError) -> Self {
        Self::Wait(err)
    }
}
