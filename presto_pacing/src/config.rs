// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller configuration.

use std::time::Duration;

use crate::wait::WaitStrategy;

/// Tunables for a [`RenderingController`](crate::RenderingController).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Target frame cadence. Zero is treated as one.
    pub frames_per_second: u32,
    /// Wait primitive to use; `None` uses the process-wide probe result.
    pub wait_strategy: Option<WaitStrategy>,
    /// How long disposal waits for the render thread to exit.
    pub exit_timeout: Duration,
    /// Name given to the render thread.
    pub thread_name: &'static str,
}

impl ControllerConfig {
    /// 60 fps with the detected wait primitive.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frames_per_second: 60,
            wait_strategy: None,
            exit_timeout: Duration::from_secs(1),
            thread_name: "presto-render",
        }
    }

    /// Paced to a 60 Hz display.
    #[must_use]
    pub const fn vsync_60() -> Self {
        Self::new()
    }

    /// Paced to a 30 Hz display, or half-rate on a 60 Hz one.
    #[must_use]
    pub const fn vsync_30() -> Self {
        Self::new().with_frames_per_second(30)
    }

    /// Returns a copy targeting `fps` frames per second, clamped to at least 1.
    #[must_use]
    pub const fn with_frames_per_second(mut self, fps: u32) -> Self {
        self.frames_per_second = if fps == 0 { 1 } else { fps };
        self
    }

    /// Returns a copy that forces a specific wait primitive.
    #[must_use]
    pub const fn with_wait_strategy(mut self, strategy: WaitStrategy) -> Self {
        self.wait_strategy = Some(strategy);
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(ControllerConfig::vsync_60().frames_per_second, 60);
        assert_eq!(ControllerConfig::vsync_30().frames_per_second, 30);
        assert_eq!(ControllerConfig::default(), ControllerConfig::new());
        assert_eq!(
            ControllerConfig::new().with_frames_per_second(0).frames_per_second,
            1,
            "zero fps clamps to one"
        );
    }

    #[test]
    fn strategy_override() {
        let config = ControllerConfig::new().with_wait_strategy(WaitStrategy::Legacy);
        assert_eq!(config.wait_strategy, Some(WaitStrategy::Legacy));
        assert_eq!(ControllerConfig::new().wait_strategy, None);
    }
}
