//! HeightCache - measured-or-estimated pixel height per item.
//!
//! Wraps a [`HeightIndex`] whose values are the *effective* height of every
//! tracked item: the measured height where a report has arrived, the
//! configured estimate otherwise. Window computation reads prefix sums and
//! offset lookups straight from the index.
//!
//! All mutation goes through `set`, `resize`, and `clear`, so the caller can
//! tell from the return value whether a recompute is needed.

use super::height_index::HeightIndex;
use super::types::{ItemIndex, PixelHeight};

/// Per-index store of measured heights with an estimate fallback.
#[derive(Debug, Clone)]
pub struct HeightCache {
    /// Effective heights (measured or estimate) backing prefix-sum queries.
    index: HeightIndex,
    /// `Some` where the renderer has reported a real height.
    measured: Vec<Option<PixelHeight>>,
    /// Substituted for every unmeasured item.
    estimate: PixelHeight,
    /// Number of `Some` entries in `measured`.
    measured_count: usize,
}

impl HeightCache {
    /// Create an empty cache that estimates unmeasured items at `estimate`.
    pub fn new(estimate: PixelHeight) -> Self {
        Self {
            index: HeightIndex::default(),
            measured: Vec::new(),
            estimate,
            measured_count: 0,
        }
    }

    /// The configured estimate for unmeasured items.
    pub fn estimate(&self) -> PixelHeight {
        self.estimate
    }

    /// Number of tracked items.
    pub fn len(&self) -> usize {
        self.measured.len()
    }

    /// True when no items are tracked.
    pub fn is_empty(&self) -> bool {
        self.measured.is_empty()
    }

    /// Number of tracked items with a measured height.
    pub fn measured_count(&self) -> usize {
        self.measured_count
    }

    /// Height of the item at `index`.
    ///
    /// Returns the estimate if the item has not been measured, including
    /// indices past the tracked length.
    pub fn get(&self, index: ItemIndex) -> f64 {
        self.measured
            .get(index.get())
            .copied()
            .flatten()
            .unwrap_or(self.estimate)
            .get()
    }

    /// Whether the item at `index` has a measured height.
    pub fn is_measured(&self, index: ItemIndex) -> bool {
        matches!(self.measured.get(index.get()), Some(Some(_)))
    }

    /// Store a measured height.
    ///
    /// Indices past the tracked length grow the cache, filling the gap with
    /// estimates.
    ///
    /// # Returns
    /// `true` if the effective height changed (a recompute is needed), `false`
    /// if the same height was already stored.
    pub fn set(&mut self, index: ItemIndex, height: PixelHeight) -> bool {
        let idx = index.get();
        if idx >= self.len() {
            self.resize(idx + 1);
        }

        let slot = &mut self.measured[idx];
        if *slot == Some(height) {
            return false;
        }
        if slot.is_none() {
            self.measured_count += 1;
        }
        *slot = Some(height);

        if self.index.get(idx) == height.get() {
            // Measured height equals the estimate; the sums don't move.
            return false;
        }
        self.index.set(idx, height.get());
        true
    }

    /// Track exactly `len` items.
    ///
    /// Growing appends unmeasured items at the estimate; shrinking drops the
    /// tail together with its measurements.
    pub fn resize(&mut self, len: usize) {
        let current = self.len();
        if len < current {
            self.measured_count -= self.measured[len..].iter().filter(|m| m.is_some()).count();
            self.measured.truncate(len);
            self.index.truncate(len);
        } else {
            for _ in current..len {
                self.measured.push(None);
                self.index.push(self.estimate.get());
            }
        }
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.measured.clear();
        self.index.clear();
        self.measured_count = 0;
    }

    /// Sum of heights for indices `[0, count)`.
    pub fn prefix_sum(&self, count: usize) -> f64 {
        self.index.sum_before(count)
    }

    /// Sum of heights of all tracked items.
    pub fn total(&self) -> f64 {
        self.index.total()
    }

    /// Index of the item containing vertical offset `offset` (first index whose
    /// cumulative height exceeds it). `None` if `offset >= total()`.
    pub fn index_at_offset(&self, offset: f64) -> Option<ItemIndex> {
        self.index.lower_bound(offset).map(ItemIndex::new)
    }

    /// First index whose cumulative height reaches `offset`. `None` if
    /// `offset > total()`.
    pub fn index_reaching(&self, offset: f64) -> Option<ItemIndex> {
        self.index.first_reaching(offset).map(ItemIndex::new)
    }
}
