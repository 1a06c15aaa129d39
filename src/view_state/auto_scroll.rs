//! Bottom-pinning state machine.
//!
//! ```text
//!            user scrolls > epsilon above bottom
//!   Pinned ──────────────────────────────────────▶ Unpinned
//!     ▲                                               │
//!     └───────────── settled at bottom ───────────────┘
//! ```
//!
//! While pinned, growth of the sequence arms a pending auto-scroll that
//! waits for the newest item to be measured, so the directive targets the
//! real bottom rather than one computed from the estimate.

use tracing::debug;

use super::height_cache::HeightCache;
use super::scroll_controller::{distance_from_bottom, AppliedScroll, ScrollIntent, SettleReport};
use super::types::{sanitize, ItemIndex};

/// Whether new items should scroll into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinState {
    /// Following the latest item.
    #[default]
    Pinned,
    /// The user scrolled away; new items don't move the offset.
    Unpinned,
}

/// An auto-scroll waiting for the height of the newest item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAutoScroll {
    /// Item whose measured height the directive depends on.
    pub awaiting: ItemIndex,
}

/// Decides when the feed follows new items.
#[derive(Debug, Clone)]
pub struct AutoScrollPolicy {
    state: PinState,
    pending: Option<PendingAutoScroll>,
    epsilon: f64,
}

impl AutoScrollPolicy {
    /// Create a policy in the initial `Pinned` state.
    ///
    /// Negative or non-finite `epsilon` is treated as 0.
    pub fn new(epsilon: f64) -> Self {
        Self {
            state: PinState::Pinned,
            pending: None,
            epsilon: sanitize(epsilon),
        }
    }

    /// Current pin state.
    pub fn state(&self) -> PinState {
        self.state
    }

    /// Shorthand for `state() == PinState::Pinned`.
    pub fn is_pinned(&self) -> bool {
        self.state == PinState::Pinned
    }

    /// The auto-scroll waiting for a measurement, if any.
    pub fn pending(&self) -> Option<PendingAutoScroll> {
        self.pending
    }

    /// Feed an applied scroll sample.
    ///
    /// Only user-driven samples can unpin; our own directive echoes never do.
    /// Returns `true` if the state changed.
    pub fn on_scroll_applied(
        &mut self,
        applied: AppliedScroll,
        total_height: f64,
        viewport_height: f64,
    ) -> bool {
        if applied.intent != ScrollIntent::UserDriven || self.state == PinState::Unpinned {
            return false;
        }

        let distance = distance_from_bottom(applied.offset, total_height, viewport_height);
        if distance <= self.epsilon {
            return false;
        }

        debug!(offset = applied.offset, distance, "user scrolled away from bottom; unpinning");
        self.state = PinState::Unpinned;
        self.pending = None;
        true
    }

    /// Feed a settle evaluation. Returns `true` if the state changed.
    pub fn on_settled(&mut self, report: SettleReport) -> bool {
        if report == SettleReport::AtBottom && self.state == PinState::Unpinned {
            debug!("settled at bottom; pinning");
            self.state = PinState::Pinned;
            return true;
        }
        false
    }

    /// Feed a growth of the sequence to `new_len` items.
    ///
    /// Pinned: arms (or retargets) the pending auto-scroll at the newest item.
    /// Unpinned: does nothing.
    pub fn on_items_appended(&mut self, new_len: usize) {
        if self.state == PinState::Unpinned || new_len == 0 {
            return;
        }
        let awaiting = ItemIndex::new(new_len - 1);
        debug!(%awaiting, "auto-scroll armed");
        self.pending = Some(PendingAutoScroll { awaiting });
    }

    /// Take the pending auto-scroll if the item it waits for is now measured.
    pub fn take_ready(&mut self, heights: &HeightCache) -> Option<PendingAutoScroll> {
        let pending = self.pending?;
        if heights.is_measured(pending.awaiting) {
            self.pending = None;
            Some(pending)
        } else {
            None
        }
    }

    /// Drop the pending auto-scroll (e.g. the awaited item no longer exists).
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::types::PixelHeight;

    fn user(offset: f64) -> AppliedScroll {
        AppliedScroll {
            offset,
            intent: ScrollIntent::UserDriven,
        }
    }

    fn cache(len: usize) -> HeightCache {
        let mut cache = HeightCache::new(PixelHeight::new(120.0).unwrap());
        cache.resize(len);
        cache
    }

    #[test]
    fn starts_pinned() {
        let policy = AutoScrollPolicy::new(10.0);
        assert_eq!(policy.state(), PinState::Pinned);
        assert!(policy.pending().is_none());
    }

    #[test]
    fn user_scroll_above_epsilon_unpins() {
        let mut policy = AutoScrollPolicy::new(10.0);
        assert!(policy.on_scroll_applied(user(500.0), 1200.0, 600.0));
        assert_eq!(policy.state(), PinState::Unpinned);
    }

    #[test]
    fn user_scroll_within_epsilon_stays_pinned() {
        let mut policy = AutoScrollPolicy::new(10.0);
        assert!(!policy.on_scroll_applied(user(592.0), 1200.0, 600.0));
        assert!(policy.is_pinned());
    }

    #[test]
    fn invalid_epsilon_means_exact_bottom() {
        for epsilon in [-5.0, f64::NAN, f64::INFINITY] {
            let mut policy = AutoScrollPolicy::new(epsilon);
            assert!(!policy.on_scroll_applied(user(600.0), 1200.0, 600.0));
            assert!(policy.is_pinned(), "epsilon {epsilon}: at bottom must stay pinned");

            assert!(policy.on_scroll_applied(user(599.0), 1200.0, 600.0));
            assert_eq!(policy.state(), PinState::Unpinned);
        }
    }

    #[test]
    fn programmatic_scroll_never_unpins() {
        let mut policy = AutoScrollPolicy::new(10.0);
        let applied = AppliedScroll {
            offset: 0.0,
            intent: ScrollIntent::ProgrammaticAutoScroll,
        };
        assert!(!policy.on_scroll_applied(applied, 1200.0, 600.0));
        assert!(policy.is_pinned());
    }

    #[test]
    fn unpinning_cancels_pending_auto_scroll() {
        let mut policy = AutoScrollPolicy::new(10.0);
        policy.on_items_appended(11);
        policy.on_scroll_applied(user(0.0), 1320.0, 600.0);
        assert!(policy.pending().is_none());
    }

    #[test]
    fn settle_at_bottom_repins() {
        let mut policy = AutoScrollPolicy::new(10.0);
        policy.on_scroll_applied(user(0.0), 1200.0, 600.0);

        assert!(!policy.on_settled(SettleReport::AwayFromBottom));
        assert_eq!(policy.state(), PinState::Unpinned);

        assert!(policy.on_settled(SettleReport::AtBottom));
        assert_eq!(policy.state(), PinState::Pinned);
    }

    #[test]
    fn append_while_pinned_awaits_newest_item() {
        let mut policy = AutoScrollPolicy::new(10.0);
        policy.on_items_appended(11);
        assert_eq!(
            policy.pending(),
            Some(PendingAutoScroll {
                awaiting: ItemIndex::new(10)
            })
        );

        policy.on_items_appended(12);
        assert_eq!(policy.pending().unwrap().awaiting, ItemIndex::new(11));
    }

    #[test]
    fn append_while_unpinned_does_nothing() {
        let mut policy = AutoScrollPolicy::new(10.0);
        policy.on_scroll_applied(user(0.0), 1200.0, 600.0);
        policy.on_items_appended(11);
        assert!(policy.pending().is_none());
    }

    #[test]
    fn take_ready_waits_for_measurement() {
        let mut policy = AutoScrollPolicy::new(10.0);
        let mut heights = cache(11);
        policy.on_items_appended(11);

        assert!(policy.take_ready(&heights).is_none());

        heights.set(ItemIndex::new(10), PixelHeight::new(90.0).unwrap());
        assert!(policy.take_ready(&heights).is_some());
        assert!(policy.pending().is_none());
    }
}
