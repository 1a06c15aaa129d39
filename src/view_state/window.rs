//! Visible window calculation
//!
//! [`compute_window`] maps (item count, scroll offset, viewport height,
//! buffer, heights) to the contiguous range of items the host must mount.
//! It is a pure function over the [`HeightCache`]; both searches are Fenwick
//! descents, so a call costs O(log n) regardless of sequence length.

use super::height_cache::HeightCache;
use super::types::{sanitize, ItemIndex};

/// Range of items selected for rendering, plus the geometry the host needs to
/// position them.
///
/// # Invariants
/// - `bounds` is `None` exactly when the sequence is empty
/// - `start <= end` (both inclusive)
/// - `offset_y == Σ height[0, start)`
/// - `total_height == Σ height[0, n)`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisibleWindow {
    /// First and last (inclusive) item index to mount.
    pub bounds: Option<(ItemIndex, ItemIndex)>,
    /// Cumulative height of every item before the first mounted one.
    pub offset_y: f64,
    /// Cumulative height of the whole sequence.
    pub total_height: f64,
}

impl VisibleWindow {
    /// Create a non-empty window.
    ///
    /// # Panics
    /// In debug builds, panics if start > end.
    pub fn new(start: ItemIndex, end: ItemIndex, offset_y: f64, total_height: f64) -> Self {
        debug_assert!(start <= end, "window start {} after end {}", start, end);
        Self {
            bounds: Some((start, end)),
            offset_y,
            total_height,
        }
    }

    /// First mounted item, `None` for an empty sequence.
    pub fn start_index(&self) -> Option<ItemIndex> {
        self.bounds.map(|(start, _)| start)
    }

    /// Last mounted item (inclusive), `None` for an empty sequence.
    pub fn end_index(&self) -> Option<ItemIndex> {
        self.bounds.map(|(_, end)| end)
    }

    /// Number of mounted items.
    pub fn len(&self) -> usize {
        self.bounds
            .map(|(start, end)| end.get() - start.get() + 1)
            .unwrap_or(0)
    }

    /// Check if the window mounts nothing.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Iterate over mounted item indices.
    pub fn indices(&self) -> impl Iterator<Item = ItemIndex> {
        let range = match self.bounds {
            Some((start, end)) => start.get()..end.get() + 1,
            None => 0..0,
        };
        range.map(ItemIndex::new)
    }

    /// Check if a specific item is mounted.
    pub fn contains(&self, index: ItemIndex) -> bool {
        self.bounds
            .is_some_and(|(start, end)| start <= index && index <= end)
    }
}

/// Absolute vertical placement of a mounted item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPlacement {
    /// Which item.
    pub index: ItemIndex,
    /// Distance from the top of the content to the top of the item.
    pub top: f64,
    /// Height used for the item (measured or estimate).
    pub height: f64,
}

/// Inputs to [`compute_window`] other than the heights themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowParams {
    /// Number of items in the sequence.
    pub item_count: usize,
    /// Current scroll offset.
    pub scroll_offset: f64,
    /// Viewport height.
    pub viewport_height: f64,
    /// Extra items mounted on each side of the visible range.
    pub buffer: usize,
}

/// Compute the window of items to mount.
///
/// 1. The item holding pixel row `s` (first cumulative height above `s`),
///    minus `buffer` and clamped to 0, is the start.
/// 2. The item holding the last visible row (first cumulative height reaching
///    `s + v`), plus `buffer` and clamped to `n - 1`, is the end.
/// 3. `offset_y` is the sum of heights before the start.
///
/// The scroll offset is clamped to `[0, max(0, total - v)]` so a viewport
/// scrolled past the content still mounts the tail.
///
/// The cache must track at least `item_count` items.
pub fn compute_window(params: WindowParams, heights: &HeightCache) -> VisibleWindow {
    let n = params.item_count;
    if n == 0 {
        return VisibleWindow::default();
    }
    debug_assert!(
        heights.len() >= n,
        "height cache tracks {} items, window needs {}",
        heights.len(),
        n
    );

    let total_height = heights.prefix_sum(n);
    let viewport = sanitize(params.viewport_height);
    let max_offset = (total_height - viewport).max(0.0);
    let scroll = sanitize(params.scroll_offset).min(max_offset);
    let last = n - 1;

    let first_visible = heights
        .index_at_offset(scroll)
        .map_or(last, |idx| idx.get().min(last));
    let last_visible = heights
        .index_reaching(scroll + viewport)
        .map_or(last, |idx| idx.get().min(last))
        .max(first_visible);

    let start = first_visible.saturating_sub(params.buffer);
    let end = last_visible.saturating_add(params.buffer).min(last);

    VisibleWindow::new(
        ItemIndex::new(start),
        ItemIndex::new(end),
        heights.prefix_sum(start),
        total_height,
    )
}

/// Absolute placement of every item in `window`.
///
/// The first item sits at `offset_y`; each following item directly below the
/// previous one.
pub fn placements(window: &VisibleWindow, heights: &HeightCache) -> Vec<ItemPlacement> {
    let mut top = window.offset_y;
    window
        .indices()
        .map(|index| {
            let height = heights.get(index);
            let placement = ItemPlacement { index, top, height };
            top += height;
            placement
        })
        .collect()
}
