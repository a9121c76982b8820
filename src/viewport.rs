//! Scroll position and row windowing.
//!
//! Distances are in the same unit as the estimated row height (pixels in a
//! browser, cells in a terminal).

use std::ops::Range;

use crate::config::TableConfig;

/// What the scroll container reports on every scroll event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportMetrics {
    /// Distance scrolled from the top
    pub scroll_top: f64,
    /// Full height of the scrollable content
    pub scroll_height: f64,
    /// Height of the visible area
    pub client_height: f64,
}

impl ViewportMetrics {
    /// Creates a metrics triple.
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Unscrolled distance below the visible area.
    pub fn remaining(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    /// Returns true if less than `threshold` is left to scroll.
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.remaining() < threshold
    }
}

/// Scroll state for a fixed-height viewport over growing content.
///
/// Keeps the offset within `[0, content_height - viewport_height]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollState {
    /// Current scroll offset (distance from the top)
    offset: f64,
    /// Height of all rows
    content_height: f64,
    /// Height of the visible area
    viewport_height: f64,
}

impl ScrollState {
    /// Create a new scroll state at the top.
    pub fn new(content_height: f64, viewport_height: f64) -> Self {
        Self {
            offset: 0.0,
            content_height: content_height.max(0.0),
            viewport_height: viewport_height.max(0.0),
        }
    }

    /// Get current scroll offset
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Set scroll offset with bounds clamping
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = self.clamp_offset(offset);
    }

    /// Scroll by a signed distance
    pub fn scroll_by(&mut self, delta: f64) {
        self.set_offset(self.offset + delta);
    }

    /// Get content height
    #[inline]
    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Update content height, e.g. after a page arrives
    pub fn set_content_height(&mut self, height: f64) {
        self.content_height = height.max(0.0);
        self.offset = self.clamp_offset(self.offset);
    }

    /// Get viewport height
    #[inline]
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Update viewport height
    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(0.0);
        self.offset = self.clamp_offset(self.offset);
    }

    /// Jump to the top
    pub fn scroll_to_top(&mut self) {
        self.offset = 0.0;
    }

    /// The metrics a scroll container would report in this state.
    pub fn metrics(&self) -> ViewportMetrics {
        ViewportMetrics {
            scroll_top: self.offset,
            scroll_height: self.content_height.max(self.viewport_height),
            client_height: self.viewport_height,
        }
    }

    fn max_offset(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    fn clamp_offset(&self, offset: f64) -> f64 {
        if offset.is_nan() {
            return 0.0;
        }
        offset.clamp(0.0, self.max_offset())
    }
}

/// Fixed-height row windowing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualWindow {
    row_height: f64,
    overscan: usize,
}

impl Default for VirtualWindow {
    fn default() -> Self {
        Self::from_config(&TableConfig::default())
    }
}

impl VirtualWindow {
    /// Creates a window; non-positive heights fall back to 1.
    pub fn new(row_height: f64, overscan: usize) -> Self {
        let row_height = if row_height.is_finite() && row_height > 0.0 {
            row_height
        } else {
            1.0
        };
        Self {
            row_height,
            overscan,
        }
    }

    /// Creates a window from the configured row height and overscan.
    pub fn from_config(config: &TableConfig) -> Self {
        Self::new(config.row_height, config.overscan)
    }

    /// Estimated row height.
    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Extra rows rendered on each side.
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Height of `row_count` rows.
    #[allow(clippy::cast_precision_loss)]
    pub fn total_size(&self, row_count: usize) -> f64 {
        row_count as f64 * self.row_height
    }

    /// Top edge of row `index`.
    #[allow(clippy::cast_precision_loss)]
    pub fn row_offset(&self, index: usize) -> f64 {
        index as f64 * self.row_height
    }

    /// Index of the row covering distance `offset`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn index_at(&self, offset: f64) -> usize {
        if offset <= 0.0 || offset.is_nan() {
            return 0;
        }
        (offset / self.row_height).floor() as usize
    }

    /// Rows to render for the current scroll position, overscan included.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn visible_range(&self, scroll: &ScrollState, row_count: usize) -> Range<usize> {
        if row_count == 0 {
            return 0..0;
        }
        let first = self.index_at(scroll.offset()).min(row_count - 1);
        let bottom = scroll.offset() + scroll.viewport_height();
        let last = ((bottom / self.row_height).ceil().max(0.0) as usize).min(row_count);

        let start = first.saturating_sub(self.overscan);
        let end = last.saturating_add(self.overscan).min(row_count);
        start..end.max(start)
    }
}
