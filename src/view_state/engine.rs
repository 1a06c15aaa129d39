//! Virtualization engine - composes the height cache, window calculator,
//! scroll controller and auto-scroll policy behind one host-facing API.
//!
//! The host drives the engine with four kinds of input:
//!
//! - the item sequence (`set_items`) and viewport height (`set_viewport`)
//! - raw scroll samples (`on_scroll`) and display frames (`on_frame`)
//! - measured heights from the renderer (`report_height`)
//! - wall-clock wakeups at `next_deadline` (`tick`)
//!
//! and reads back the current window, item placements, and at most one
//! pending scroll directive at a time.
//!
//! The window always covers the offset the container is at (or is about to
//! land on, for a directive not yet echoed). While a pinned append waits for
//! the newest item's height, that item is mounted on its own next to the
//! window, so the rows on screen stay mounted until the jump happens.
//!
//! Every mutation that moves a height, the item count, the viewport, or the
//! applied offset recomputes the window exactly once before returning.

use std::time::Instant;

use tracing::{debug, trace, warn};

use super::auto_scroll::{AutoScrollPolicy, PinState};
use super::height_cache::HeightCache;
use super::scroll_controller::{ScrollController, ScrollIntent, SettleReport};
use super::types::{sanitize, Generation, ItemIndex, PixelHeight, SequenceId, ViewportState};
use super::window::{compute_window, placements, ItemPlacement, VisibleWindow, WindowParams};
use crate::config::EngineConfig;

/// Bottom movements smaller than this (px) don't re-issue a follow directive.
const FOLLOW_TOLERANCE: f64 = 0.5;

/// Absolute scroll target the host must apply exactly once.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ScrollDirective {
    /// Scroll offset to move the container to.
    pub target: f64,
    /// Generation the target was computed under.
    pub generation: Generation,
}

/// A measured height from the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightReport {
    /// Generation the item was rendered under.
    pub generation: Generation,
    /// Which item was measured.
    pub index: ItemIndex,
    /// Measured height in pixels. Validated on receipt.
    pub height: f64,
}

/// Counters describing what the engine has done so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct EngineStats {
    /// Window recomputations.
    pub recomputes: u64,
    /// Scroll directives issued (including ones superseded before being taken).
    pub directives_issued: u64,
    /// Height reports dropped for a stale generation or out-of-range index.
    pub stale_reports: u64,
    /// Height reports dropped for an invalid height.
    pub rejected_reports: u64,
    /// Scroll samples applied on a frame.
    pub frames_applied: u64,
}

/// Chat feed virtualization engine.
///
/// Single-threaded: every mutation takes `&mut self`.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    /// Identity of the sequence currently shown; `None` before the first `set_items`.
    sequence: Option<SequenceId>,
    item_count: usize,
    generation: Generation,
    /// Viewport height and the last applied scroll offset.
    viewport: ViewportState,
    heights: HeightCache,
    controller: ScrollController,
    policy: AutoScrollPolicy,
    window: VisibleWindow,
    directive: Option<ScrollDirective>,
    stats: EngineStats,
    torn_down: bool,
}

impl Engine {
    /// Create an engine with no items and a zero-height viewport.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sequence: None,
            item_count: 0,
            generation: Generation::default(),
            viewport: ViewportState::default(),
            heights: HeightCache::new(config.estimated_item_height),
            controller: ScrollController::new(
                config.settle_delay,
                config.frame_interval,
                config.bottom_epsilon,
            ),
            policy: AutoScrollPolicy::new(config.bottom_epsilon),
            window: VisibleWindow::default(),
            directive: None,
            stats: EngineStats::default(),
            torn_down: false,
        }
    }

    // === Inputs ===

    /// Set the viewport height. Negative or non-finite values clamp to 0.
    pub fn set_viewport(&mut self, height: f64) {
        if self.torn_down {
            return;
        }
        let height = sanitize(height);
        if height == self.viewport.height {
            return;
        }
        debug!(height, "viewport resized");
        self.viewport.height = height;
        self.follow_bottom();
        self.recompute();
    }

    /// Set the identity and length of the item sequence.
    ///
    /// A new identity resets every per-item state and bumps the generation.
    /// Under the same identity, growth arms an auto-scroll while pinned and
    /// shrinking drops the tail's heights.
    pub fn set_items(&mut self, sequence: SequenceId, len: usize) {
        if self.torn_down {
            return;
        }

        let reset = self.sequence != Some(sequence);
        if reset {
            self.reset(sequence);
        } else if len == self.item_count {
            return;
        }

        let previous = self.item_count;
        self.heights.resize(len);
        self.item_count = len;

        if len > previous {
            self.policy.on_items_appended(len);
        } else if len < previous {
            debug!(previous, len, "sequence shrank under the same identity");
            let orphaned = self
                .policy
                .pending()
                .is_some_and(|pending| pending.awaiting.get() >= len);
            if orphaned {
                self.policy.cancel_pending();
            }
            self.follow_bottom();
        }

        self.recompute();
    }

    /// Record a raw scroll sample from the container.
    ///
    /// Returns `true` if the host should request a frame callback.
    pub fn on_scroll(&mut self, offset: f64, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }
        self.controller.on_sample(offset, now)
    }

    /// Display frame: apply the coalesced scroll sample, if one is due.
    ///
    /// Returns `true` if a sample was applied.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }

        let total = self.heights.total();
        let Some(applied) = self.controller.on_frame(now, total) else {
            return false;
        };

        self.stats.frames_applied += 1;
        self.viewport.scroll_offset = applied.offset;
        self.policy
            .on_scroll_applied(applied, total, self.viewport.height);
        self.recompute();
        true
    }

    /// Fire every timer that is due at `now`.
    ///
    /// Applies a waiting frame, then evaluates the settle timer. Returns the
    /// settle evaluation if the timer fired.
    pub fn tick(&mut self, now: Instant) -> Option<SettleReport> {
        if self.torn_down {
            return None;
        }

        self.on_frame(now);

        let report = self
            .controller
            .poll_settle(now, self.heights.total(), self.viewport.height)?;
        if self.policy.on_settled(report) && self.follow_bottom() {
            self.recompute();
        }
        Some(report)
    }

    /// Accept a measured height from the renderer.
    ///
    /// Reports from another generation or for an index outside the sequence
    /// are dropped. Invalid heights are dropped and the previous value kept.
    pub fn report_height(&mut self, report: HeightReport) {
        if self.torn_down {
            return;
        }

        let HeightReport {
            generation,
            index,
            height,
        } = report;

        if generation != self.generation || index.get() >= self.item_count {
            self.stats.stale_reports += 1;
            debug!(
                %index,
                report_generation = generation.get(),
                current_generation = self.generation.get(),
                item_count = self.item_count,
                "dropping stale height report"
            );
            return;
        }

        let height = match PixelHeight::new(height) {
            Ok(height) => height,
            Err(err) => {
                self.stats.rejected_reports += 1;
                warn!(%index, %err, "rejected height report");
                return;
            }
        };

        let changed = self.heights.set(index, height);

        let directed = if let Some(ready) = self.policy.take_ready(&self.heights) {
            debug!(awaiting = %ready.awaiting, "newest item measured; finalizing auto-scroll");
            self.issue_directive(self.bottom_offset());
            true
        } else {
            changed && self.follow_bottom()
        };

        if changed || directed {
            self.recompute();
        }
    }

    /// Stop responding to input and cancel every pending timer and frame.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        debug!("engine torn down");
        self.controller.cancel();
        self.policy.cancel_pending();
        self.directive = None;
        self.torn_down = true;
    }

    // === Outputs ===

    /// The window computed after the most recent input.
    pub fn current_window(&self) -> VisibleWindow {
        self.window
    }

    /// Absolute placement of every item the host must mount.
    ///
    /// The window's items in order, followed by the awaited newest item when
    /// it lies outside the window.
    pub fn placements(&self) -> Vec<ItemPlacement> {
        let mut placed = placements(&self.window, &self.heights);
        placed.extend(self.awaited_placement());
        placed
    }

    /// The newest item, mounted outside the window while a pending
    /// auto-scroll waits for its height.
    pub fn awaited_placement(&self) -> Option<ItemPlacement> {
        let index = self.policy.pending()?.awaiting;
        if self.window.contains(index) {
            return None;
        }
        Some(ItemPlacement {
            index,
            top: self.heights.prefix_sum(index.get()),
            height: self.heights.get(index),
        })
    }

    /// Take the pending scroll directive. Returns each directive at most once.
    pub fn take_scroll_directive(&mut self) -> Option<ScrollDirective> {
        self.directive.take()
    }

    /// Whether a sample is waiting for a display frame.
    pub fn needs_frame(&self) -> bool {
        !self.torn_down && self.controller.has_pending_sample()
    }

    /// Earliest instant the host should call `on_frame` or `tick`.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        if self.torn_down {
            return None;
        }
        self.controller.next_deadline(now)
    }

    // === Accessors ===

    /// Current pin state.
    pub fn pin_state(&self) -> PinState {
        self.policy.state()
    }

    /// Classification of the last applied scroll sample.
    pub fn scroll_intent(&self) -> ScrollIntent {
        self.controller.intent()
    }

    /// Current reset generation. Height reports must carry it.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Viewport height and last applied scroll offset.
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    /// Number of items in the current sequence.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Identity of the current sequence.
    pub fn sequence(&self) -> Option<SequenceId> {
        self.sequence
    }

    /// Measured-or-estimated heights of the current sequence.
    pub fn heights(&self) -> &HeightCache {
        &self.heights
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Activity counters.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Whether `teardown` has been called.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // === Internals ===

    fn reset(&mut self, sequence: SequenceId) {
        self.generation = self.generation.next();
        debug!(
            sequence = sequence.0,
            generation = self.generation.get(),
            "sequence identity changed; resetting"
        );
        self.sequence = Some(sequence);
        self.item_count = 0;
        self.heights.clear();
        self.controller.reset();
        self.policy = AutoScrollPolicy::new(self.config.bottom_epsilon);
        self.viewport.scroll_offset = 0.0;
        self.directive = None;
    }

    /// Bottom-most scroll offset under the current heights.
    fn bottom_offset(&self) -> f64 {
        self.viewport.max_offset(self.heights.total())
    }

    /// Offset the window is computed at: the landing of the newest directive
    /// not yet echoed, otherwise the applied offset.
    fn anchor_offset(&self) -> f64 {
        self.controller
            .expected_landing()
            .unwrap_or(self.viewport.scroll_offset)
    }

    /// Re-target the bottom if pinned with nothing pending and it moved.
    ///
    /// Returns `true` if a directive was issued.
    fn follow_bottom(&mut self) -> bool {
        if !self.policy.is_pinned() || self.policy.pending().is_some() || self.item_count == 0 {
            return false;
        }
        let target = self.bottom_offset();
        let current = self
            .controller
            .expected_landing()
            .unwrap_or(self.viewport.scroll_offset);
        if (target - current).abs() <= FOLLOW_TOLERANCE {
            return false;
        }
        self.issue_directive(target);
        true
    }

    fn issue_directive(&mut self, target: f64) {
        self.controller.expect_programmatic(target);
        self.directive = Some(ScrollDirective {
            target,
            generation: self.generation,
        });
        self.stats.directives_issued += 1;
        debug!(target, generation = self.generation.get(), "scroll directive issued");
    }

    fn recompute(&mut self) {
        let params = WindowParams {
            item_count: self.item_count,
            scroll_offset: self.anchor_offset(),
            viewport_height: self.viewport.height,
            buffer: self.config.buffer,
        };
        self.window = compute_window(params, &self.heights);
        self.stats.recomputes += 1;
        trace!(
            start = ?self.window.start_index(),
            end = ?self.window.end_index(),
            offset_y = self.window.offset_y,
            total_height = self.window.total_height,
            "window recomputed"
        );
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
