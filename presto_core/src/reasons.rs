// Copyright 2026 the Presto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Why a render pass was requested.

use bitflags::bitflags;

bitflags! {
    /// Reasons accumulated between two render passes.
    ///
    /// Requests OR their bits into a pending mask; the render thread takes the
    /// whole mask at once, so several requests landing within one frame
    /// interval reach the render callback as a single set of reasons.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RenderReasons: u32 {
        /// Every element must redraw; partial tracking is pointless.
        const REDRAW_ALL = 1 << 0;
        /// The surface changed size.
        const RESIZE = 1 << 1;
        /// The resize is transient (e.g. an interactive drag) and a cheaper
        /// layout may be used. Always accompanied by [`Self::RESIZE`].
        const RESIZE_TEMPORARILY = 1 << 2;
    }
}

impl RenderReasons {
    /// Returns `true` if the pass must invalidate the whole surface.
    #[must_use]
    pub const fn requires_full_present(self) -> bool {
        self.intersects(Self::REDRAW_ALL.union(Self::RESIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_present_reasons() {
        assert!(!RenderReasons::empty().requires_full_present());
        assert!(RenderReasons::REDRAW_ALL.requires_full_present());
        assert!(RenderReasons::RESIZE.requires_full_present());
        assert!(
            (RenderReasons::RESIZE | RenderReasons::RESIZE_TEMPORARILY).requires_full_present()
        );
    }

    #[test]
    fn unknown_bits_are_truncated() {
        let raw = (1 << 31) | RenderReasons::RESIZE.bits();
        assert_eq!(RenderReasons::from_bits_truncate(raw), RenderReasons::RESIZE);
    }
}
