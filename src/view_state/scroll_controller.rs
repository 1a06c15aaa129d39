//! Scroll sample ingestion: frame coalescing, intent, and settle detection.
//!
//! The scroll container reports its offset at native event rate. Samples are
//! recorded in a [`FrameThrottle`] and applied at most once per display frame.
//! Every sample also pushes back a [`DebounceTimer`]; when it fires the
//! controller checks whether the feed came to rest at the bottom.
//!
//! Offsets the engine asked the host to scroll to are registered with
//! [`ScrollController::expect_programmatic`], so the echo of our own
//! directive is not mistaken for the user scrolling. A directive can be
//! superseded before the host applies it, so every unechoed landing is kept
//! until a sample matches it or the user takes over.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::trace;

use super::timer::{DebounceTimer, FrameThrottle};
use super::types::sanitize;

/// Unechoed directives remembered at once; the oldest is forgotten first.
const MAX_OUTSTANDING_DIRECTIVES: usize = 8;

/// Who caused the most recent change of scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollIntent {
    /// No scroll activity since the last settle.
    #[default]
    Idle,
    /// The user moved the scroll container.
    UserDriven,
    /// The container moved because the engine issued a directive.
    ProgrammaticAutoScroll,
}

/// A sample applied on a frame boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedScroll {
    /// Offset now in effect (clamped to the content).
    pub offset: f64,
    /// Classification of the sample.
    pub intent: ScrollIntent,
}

/// Outcome of the settle timer firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleReport {
    /// Scrolling stopped within epsilon of the bottom.
    AtBottom,
    /// Scrolling stopped somewhere above the bottom.
    AwayFromBottom,
}

/// Distance between `offset` and the bottom-most scroll offset.
pub fn distance_from_bottom(offset: f64, total_height: f64, viewport_height: f64) -> f64 {
    ((total_height - viewport_height).max(0.0) - offset).max(0.0)
}

/// Ingests raw scroll samples and turns them into per-frame updates.
#[derive(Debug, Clone)]
pub struct ScrollController {
    /// Offset of the last applied sample.
    offset: f64,
    /// Classification of the last applied sample.
    intent: ScrollIntent,
    throttle: FrameThrottle<f64>,
    settle: DebounceTimer,
    /// Landing offsets of issued directives whose echo hasn't arrived yet,
    /// oldest first.
    expected: VecDeque<f64>,
    epsilon: f64,
}

impl ScrollController {
    /// Create a controller at offset 0.
    ///
    /// # Arguments
    /// - `settle_delay`: quiet period after the last sample before settling
    /// - `frame_interval`: minimum spacing of applied samples
    /// - `epsilon`: pixel tolerance for "at bottom" and for directive echoes
    pub fn new(settle_delay: Duration, frame_interval: Duration, epsilon: f64) -> Self {
        Self {
            offset: 0.0,
            intent: ScrollIntent::Idle,
            throttle: FrameThrottle::new(frame_interval),
            settle: DebounceTimer::new(settle_delay),
            expected: VecDeque::new(),
            epsilon: sanitize(epsilon),
        }
    }

    /// Offset of the last applied sample.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Classification of the last applied sample.
    pub fn intent(&self) -> ScrollIntent {
        self.intent
    }

    /// Landing offset of the newest issued directive that hasn't echoed back yet.
    pub fn expected_landing(&self) -> Option<f64> {
        self.expected.back().copied()
    }

    /// Whether a sample is waiting for the next frame.
    pub fn has_pending_sample(&self) -> bool {
        self.throttle.is_pending()
    }

    /// Record a raw sample from the scroll container.
    ///
    /// Restarts the settle timer. Returns `true` if the host needs to request
    /// a frame callback.
    pub fn on_sample(&mut self, offset: f64, now: Instant) -> bool {
        self.settle.schedule(now);
        self.throttle.submit(sanitize(offset))
    }

    /// Register the landing offset of a directive the engine just issued.
    pub fn expect_programmatic(&mut self, target: f64) {
        if self.expected.len() == MAX_OUTSTANDING_DIRECTIVES {
            self.expected.pop_front();
        }
        self.expected.push_back(target);
    }

    /// Apply the coalesced sample, if one is waiting and a frame is due.
    ///
    /// The offset is clamped to `[0, total_height]`.
    pub fn on_frame(&mut self, now: Instant, total_height: f64) -> Option<AppliedScroll> {
        let raw = self.throttle.take(now)?;
        let offset = raw.min(total_height.max(0.0));

        // Echoes arrive in issue order: a match also retires every older landing.
        let echoed = self
            .expected
            .iter()
            .position(|target| (offset - target).abs() <= self.epsilon);
        let intent = match echoed {
            Some(position) => {
                self.expected.drain(..=position);
                ScrollIntent::ProgrammaticAutoScroll
            }
            None => {
                self.expected.clear();
                ScrollIntent::UserDriven
            }
        };

        trace!(offset, ?intent, "applied scroll sample");
        self.offset = offset;
        self.intent = intent;
        Some(AppliedScroll { offset, intent })
    }

    /// Fire the settle timer if due and evaluate the resting position.
    pub fn poll_settle(
        &mut self,
        now: Instant,
        total_height: f64,
        viewport_height: f64,
    ) -> Option<SettleReport> {
        if !self.settle.poll(now) {
            return None;
        }

        self.intent = ScrollIntent::Idle;
        let distance = distance_from_bottom(self.offset, total_height, viewport_height);
        let report = if distance <= self.epsilon {
            SettleReport::AtBottom
        } else {
            SettleReport::AwayFromBottom
        };
        trace!(offset = self.offset, distance, ?report, "scroll settled");
        Some(report)
    }

    /// Earliest instant the host must call back (frame or settle timer).
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        match (self.throttle.next_frame_at(now), self.settle.deadline()) {
            (Some(frame), Some(settle)) => Some(frame.min(settle)),
            (frame, settle) => frame.or(settle),
        }
    }

    /// Cancel both timers and forget any expected echo.
    pub fn cancel(&mut self) {
        self.throttle.cancel();
        self.settle.cancel();
        self.expected.clear();
    }

    /// Cancel everything and return to offset 0, `Idle`.
    pub fn reset(&mut self) {
        self.cancel();
        self.offset = 0.0;
        self.intent = ScrollIntent::Idle;
    }
}
