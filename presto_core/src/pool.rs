// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable scratch buffers for dirty-rectangle scaling.

use alloc::vec::Vec;

use crate::geometry::PixelRect;

/// A small free list of rectangle buffers.
///
/// Buffers keep their capacity between rentals, so a steady-state frame loop
/// stops allocating once the largest dirty list has been seen.
#[derive(Debug, Default)]
pub struct RectPool {
    free: Vec<Vec<PixelRect>>,
}

impl RectPool {
    /// Number of returned buffers retained for reuse.
    pub const MAX_RETAINED: usize = 4;

    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Takes an empty buffer with room for at least `capacity` rectangles.
    #[must_use]
    pub fn rent(&mut self, capacity: usize) -> Vec<PixelRect> {
        let mut buf = self.free.pop().unwrap_or_default();
        buf.clear();
        buf.reserve(capacity);
        buf
    }

    /// Returns a buffer to the pool.
    pub fn give_back(&mut self, mut buf: Vec<PixelRect>) {
        if self.free.len() < Self::MAX_RETAINED {
            buf.clear();
            self.free.push(buf);
        }
    }

    /// Number of buffers currently available for rent.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }
}
