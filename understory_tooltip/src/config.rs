// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover configuration and timing constants.
//!
//! All times are host-supplied monotonic milliseconds.

/// Idle time, in milliseconds, before the pointer position is resolved to a tooltip.
pub const DEFAULT_HOVER_DELAY: u64 = 750;

/// Delay, in milliseconds, before resolution restarts after a state update
/// dropped a pending request.
pub const SETTLE_DELAY: u64 = 20;

/// Distance, in pixels, the pointer may stray from a hovered range before the
/// tooltip is dismissed.
pub const RANGE_MARGIN: f64 = 6.0;

/// Vertical coordinate used to park views that should not be visible.
pub const OUTSIDE: f64 = -10000.0;

/// Options for one hover source.
///
/// ```
/// use understory_tooltip::config::HoverConfig;
///
/// let config = HoverConfig::default().with_hover_delay(300).with_hide_on_change(true);
/// assert_eq!(config.hover_delay, 300);
/// assert!(config.hide_on_change);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HoverConfig {
    /// Idle time before resolving, in milliseconds.
    pub hover_delay: u64,
    /// Hide the active tooltip whenever the document or selection changes.
    pub hide_on_change: bool,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            hover_delay: DEFAULT_HOVER_DELAY,
            hide_on_change: false,
        }
    }
}

impl HoverConfig {
    /// Set the idle delay. A zero delay falls back to [`DEFAULT_HOVER_DELAY`].
    #[must_use]
    pub fn with_hover_delay(mut self, ms: u64) -> Self {
        self.hover_delay = if ms == 0 { DEFAULT_HOVER_DELAY } else { ms };
        self
    }

    /// Set the hide-on-change policy.
    #[must_use]
    pub fn with_hide_on_change(mut self, hide: bool) -> Self {
        self.hide_on_change = hide;
        self
    }
}
