//! Explicit, cancellable timers for the scroll path.
//!
//! Neither timer owns a clock or an event loop. The host passes `now` in and
//! asks for the next deadline, so the same code runs under a terminal poll
//! loop, a browser animation frame, or a test advancing time by hand.
//!
//! Both timers are last-write-wins: a new qualifying event replaces whatever
//! was pending.

use std::time::{Duration, Instant};

/// A single-shot deadline that every `schedule` call pushes back.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    /// Create an idle timer that fires `delay` after the last `schedule`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Configured quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending deadline and arm a new one at `now + delay`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is armed.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The armed deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire if the deadline has passed.
    ///
    /// Returns `true` at most once per `schedule`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Coalesces high-rate samples into at most one per display frame.
///
/// `submit` records the latest sample, replacing an unapplied one. `take`
/// hands it out on the next frame, and refuses to hand out two samples less
/// than `frame_interval` apart.
#[derive(Debug, Clone)]
pub struct FrameThrottle<T> {
    pending: Option<T>,
    frame_interval: Duration,
    last_applied: Option<Instant>,
}

impl<T> FrameThrottle<T> {
    /// Create a throttle for a display refreshing every `frame_interval`.
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            pending: None,
            frame_interval,
            last_applied: None,
        }
    }

    /// Record a sample.
    ///
    /// Returns `true` if this sample is the first since the last frame, i.e.
    /// the host must request a frame callback.
    pub fn submit(&mut self, sample: T) -> bool {
        self.pending.replace(sample).is_none()
    }

    /// Whether a sample is waiting for a frame.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Peek at the waiting sample.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    /// Earliest instant, not before `now`, at which `take` will release the
    /// waiting sample. `None` if nothing is waiting.
    pub fn next_frame_at(&self, now: Instant) -> Option<Instant> {
        self.pending.as_ref()?;
        let earliest = self
            .last_applied
            .map_or(now, |last| last + self.frame_interval);
        Some(earliest.max(now))
    }

    /// Release the waiting sample if a frame boundary has been reached.
    pub fn take(&mut self, now: Instant) -> Option<T> {
        let due = self
            .last_applied
            .map_or(true, |last| now.saturating_duration_since(last) >= self.frame_interval);
        if !due {
            return None;
        }
        let sample = self.pending.take()?;
        self.last_applied = Some(now);
        Some(sample)
    }

    /// Drop the waiting sample without applying it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    mod debounce {
        use super::*;

        #[test]
        fn new_timer_is_idle() {
            let mut timer = DebounceTimer::new(500 * MS);
            assert!(!timer.is_pending());
            assert!(!timer.poll(Instant::now()));
        }

        #[test]
        fn fires_after_delay() {
            let t0 = Instant::now();
            let mut timer = DebounceTimer::new(500 * MS);
            timer.schedule(t0);

            assert!(!timer.poll(t0 + 499 * MS));
            assert!(timer.poll(t0 + 500 * MS));
        }

        #[test]
        fn fires_only_once() {
            let t0 = Instant::now();
            let mut timer = DebounceTimer::new(500 * MS);
            timer.schedule(t0);

            assert!(timer.poll(t0 + 600 * MS));
            assert!(!timer.poll(t0 + 700 * MS));
            assert!(!timer.is_pending());
        }

        #[test]
        fn reschedule_pushes_deadline_back() {
            let t0 = Instant::now();
            let mut timer = DebounceTimer::new(500 * MS);
            timer.schedule(t0);
            timer.schedule(t0 + 400 * MS);

            assert!(!timer.poll(t0 + 600 * MS));
            assert_eq!(timer.deadline(), Some(t0 + 900 * MS));
            assert!(timer.poll(t0 + 900 * MS));
        }

        #[test]
        fn cancel_disarms() {
            let t0 = Instant::now();
            let mut timer = DebounceTimer::new(500 * MS);
            timer.schedule(t0);
            timer.cancel();

            assert!(!timer.poll(t0 + 10_000 * MS));
        }
    }

    mod frame_throttle {
        use super::*;

        #[test]
        fn first_submit_requests_frame() {
            let mut throttle = FrameThrottle::new(16 * MS);
            assert!(throttle.submit(1.0));
            assert!(!throttle.submit(2.0));
        }

        #[test]
        fn last_sample_wins() {
            let t0 = Instant::now();
            let mut throttle = FrameThrottle::new(16 * MS);
            throttle.submit(1.0);
            throttle.submit(2.0);
            throttle.submit(3.0);

            assert_eq!(throttle.take(t0), Some(3.0));
            assert_eq!(throttle.take(t0 + 100 * MS), None);
        }

        #[test]
        fn at_most_one_sample_per_frame() {
            let t0 = Instant::now();
            let mut throttle = FrameThrottle::new(16 * MS);
            throttle.submit(1.0);
            assert_eq!(throttle.take(t0), Some(1.0));

            throttle.submit(2.0);
            assert_eq!(throttle.take(t0 + 5 * MS), None);
            assert!(throttle.is_pending());
            assert_eq!(throttle.next_frame_at(t0 + 5 * MS), Some(t0 + 16 * MS));
            assert_eq!(throttle.next_frame_at(t0 + 30 * MS), Some(t0 + 30 * MS));
            assert_eq!(throttle.take(t0 + 16 * MS), Some(2.0));
        }

        #[test]
        fn cancel_drops_pending() {
            let mut throttle = FrameThrottle::new(16 * MS);
            throttle.submit(1.0);
            throttle.cancel();
            assert!(!throttle.is_pending());
            assert_eq!(throttle.take(Instant::now()), None);
        }
    }
}
