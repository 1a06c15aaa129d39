//! HeightIndex - O(log n) prefix sums and offset search via Fenwick tree
//!
//! Provides efficient operations for computing cumulative heights and finding
//! item indices by vertical offset (scroll position).
//!
//! # Complexity
//!
//! - `set`: O(log n)
//! - `prefix_sum`: O(log n)
//! - `lower_bound` / `first_reaching`: O(log n) (tree descent)
//! - `push`: O(log n)
//! - `total`: O(log n)
//! - `truncate`: O(1) amortized
//! - `len`: O(1)
//! - `clear`: O(1)

/// HeightIndex wraps a Fenwick tree for O(log n) prefix sum queries and updates.
///
/// Maintains cumulative pixel heights for a sequence of items, supporting:
/// - Setting individual item heights
/// - Computing prefix sums (cumulative height up to index)
/// - Descending the tree to find the item holding a vertical offset
///
/// The tree uses the 0-based layout of the `fenwick` crate: node `i` holds
/// the sum of values `[i & (i + 1), i]`. The tree is always exactly `len`
/// nodes long, so every node is consistent with the values it covers.
#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    /// Fenwick tree backing storage.
    tree: Vec<f64>,
    /// Plain per-index values, kept so deltas are computed exactly.
    values: Vec<f64>,
}

impl HeightIndex {
    /// Creates a new HeightIndex with the given initial capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scrollfeed::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::new(100);
    /// assert_eq!(index.len(), 0);
    /// assert_eq!(index.total(), 0.0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Builds an index from a slice of heights in O(n).
    ///
    /// # Examples
    ///
    /// ```
    /// # use scrollfeed::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights(&[3.0, 4.0, 5.0]);
    /// assert_eq!(index.total(), 12.0);
    /// ```
    pub fn from_heights(heights: &[f64]) -> Self {
        let mut tree = heights.to_vec();
        let len = tree.len();
        for i in 0..len {
            let parent = i | (i + 1);
            if parent < len {
                tree[parent] += tree[i];
            }
        }
        Self {
            tree,
            values: heights.to_vec(),
        }
    }

    /// Returns the height stored at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Sets the height at the given index.
    ///
    /// Computes the delta from the current height and updates the Fenwick tree.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scrollfeed::view_state::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(10);
    /// index.push(5.0);
    /// index.set(0, 10.0);
    /// assert_eq!(index.prefix_sum(0), 10.0);
    /// ```
    pub fn set(&mut self, index: usize, height: f64) {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        let delta = height - self.values[index];
        self.values[index] = height;
        if delta != 0.0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Returns the cumulative height up to and including the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scrollfeed::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights(&[3.0, 4.0, 5.0]);
    /// assert_eq!(index.prefix_sum(0), 3.0);
    /// assert_eq!(index.prefix_sum(1), 7.0);
    /// assert_eq!(index.prefix_sum(2), 12.0);
    /// ```
    pub fn prefix_sum(&self, index: usize) -> f64 {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        fenwick::array::prefix_sum(&self.tree, index)
    }

    /// Returns the cumulative height of the first `count` entries.
    ///
    /// `sum_before(0)` is `0.0`; `count` past the end is clamped to `len()`.
    pub fn sum_before(&self, count: usize) -> f64 {
        let count = count.min(self.len());
        if count == 0 {
            0.0
        } else {
            self.prefix_sum(count - 1)
        }
    }

    /// First index where `prefix_sum(index) > value`.
    ///
    /// Returns the index of the item containing the given vertical offset.
    ///
    /// # Returns
    ///
    /// - `Some(index)` if there exists an index where `prefix_sum(index) > value`
    /// - `None` if `value >= total()` or the index is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use scrollfeed::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights(&[10.0, 20.0, 15.0]);
    /// assert_eq!(index.lower_bound(0.0), Some(0));
    /// assert_eq!(index.lower_bound(10.0), Some(1));
    /// assert_eq!(index.lower_bound(29.5), Some(1));
    /// assert_eq!(index.lower_bound(30.0), Some(2));
    /// assert_eq!(index.lower_bound(100.0), None);
    /// ```
    pub fn lower_bound(&self, value: f64) -> Option<usize> {
        self.descend(|sum| sum <= value)
    }

    /// First index where `prefix_sum(index) >= value`.
    ///
    /// Returns the item holding the pixel row just above `value`, i.e. the last
    /// item a viewport ending at `value` touches.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scrollfeed::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights(&[10.0, 20.0, 15.0]);
    /// assert_eq!(index.first_reaching(10.0), Some(0));
    /// assert_eq!(index.first_reaching(10.5), Some(1));
    /// assert_eq!(index.first_reaching(45.0), Some(2));
    /// assert_eq!(index.first_reaching(45.5), None);
    /// ```
    pub fn first_reaching(&self, value: f64) -> Option<usize> {
        self.descend(|sum| sum < value)
    }

    /// Fenwick descent: finds the number of leading items whose cumulative sum
    /// still satisfies `advance`, which is the first index that does not.
    fn descend(&self, advance: impl Fn(f64) -> bool) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }

        let mut pos = 0;
        let mut acc = 0.0;
        let mut step = 1usize << (usize::BITS - 1 - len.leading_zeros());

        while step > 0 {
            let next = pos + step;
            if next <= len {
                let candidate = acc + self.tree[next - 1];
                if advance(candidate) {
                    pos = next;
                    acc = candidate;
                }
            }
            step >>= 1;
        }

        if pos >= len {
            None
        } else {
            Some(pos)
        }
    }

    /// Returns the total cumulative height of all entries.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scrollfeed::view_state::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(10);
    /// assert_eq!(index.total(), 0.0);
    /// index.push(5.0);
    /// assert_eq!(index.total(), 5.0);
    /// index.push(3.0);
    /// assert_eq!(index.total(), 8.0);
    /// ```
    pub fn total(&self) -> f64 {
        self.sum_before(self.len())
    }

    /// Returns the number of entries in the index.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the index contains no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends a new entry with the given height.
    ///
    /// The new node covers `[n & (n + 1), n]`, so it is seeded with the sum of
    /// the earlier values in that range.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scrollfeed::view_state::height_index::HeightIndex;
    /// let mut index = HeightIndex::new(0);
    /// for _ in 0..9 {
    ///     index.push(2.0);
    /// }
    /// assert_eq!(index.len(), 9);
    /// assert_eq!(index.total(), 18.0);
    /// ```
    pub fn push(&mut self, height: f64) {
        let n = self.len();
        let covered_from = n & (n + 1);
        let node = height + (self.sum_before(n) - self.sum_before(covered_from));
        self.tree.push(node);
        self.values.push(height);
    }

    /// Drops every entry at or after `len`.
    ///
    /// Remaining nodes only cover indices below themselves, so no rebuild is needed.
    pub fn truncate(&mut self, len: usize) {
        self.tree.truncate(len);
        self.values.truncate(len);
    }

    /// Clears all entries, resetting to empty state.
    ///
    /// Retains allocated capacity for reuse.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.values.clear();
    }
}
