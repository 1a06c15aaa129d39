//! Property-based tests for window computation.
//!
//! Every property runs against the Fenwick-backed `compute_window` and, where
//! it applies, a straightforward linear scan over the same heights. Heights
//! are whole pixels so every sum is exact.

use proptest::prelude::*;
use scrollfeed::view_state::height_cache::HeightCache;
use scrollfeed::view_state::types::{ItemIndex, PixelHeight};
use scrollfeed::view_state::window::{compute_window, VisibleWindow, WindowParams};

// ===== Helpers =====

fn cache_from(heights: &[f64]) -> HeightCache {
    let mut cache = HeightCache::new(PixelHeight::new(120.0).unwrap());
    cache.resize(heights.len());
    for (i, &h) in heights.iter().enumerate() {
        cache.set(ItemIndex::new(i), PixelHeight::new(h).unwrap());
    }
    cache
}

fn window(heights: &HeightCache, n: usize, s: f64, v: f64, b: usize) -> VisibleWindow {
    compute_window(
        WindowParams {
            item_count: n,
            scroll_offset: s,
            viewport_height: v,
            buffer: b,
        },
        heights,
    )
}

/// Reference implementation: two running-sum scans.
fn linear_window(heights: &[f64], s: f64, v: f64, b: usize) -> Option<(usize, usize, f64, f64)> {
    let n = heights.len();
    if n == 0 {
        return None;
    }
    let total: f64 = heights.iter().sum();
    let s = s.max(0.0).min((total - v).max(0.0));

    let mut first = n - 1;
    let mut acc = 0.0;
    for (i, h) in heights.iter().enumerate() {
        acc += h;
        if acc > s {
            first = i;
            break;
        }
    }

    let mut last = n - 1;
    acc = 0.0;
    for (i, h) in heights.iter().enumerate() {
        acc += h;
        if acc >= s + v {
            last = i;
            break;
        }
    }
    let last = last.max(first);

    let start = first.saturating_sub(b);
    let end = (last + b).min(n - 1);
    let offset_y = heights[..start].iter().sum();
    Some((start, end, offset_y, total))
}

fn as_tuple(w: VisibleWindow) -> Option<(usize, usize, f64, f64)> {
    w.bounds
        .map(|(start, end)| (start.get(), end.get(), w.offset_y, w.total_height))
}

// ===== Arbitrary Strategies =====

fn arb_heights(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((1u32..=400).prop_map(f64::from), 0..max_len)
}

/// Heights plus a scroll fraction in `[0, 1.2]` of the total (overshoot included).
fn arb_scenario() -> impl Strategy<Value = (Vec<f64>, f64, f64, usize)> {
    (
        arb_heights(200),
        0.0f64..=1.2,
        (1u32..=2000).prop_map(f64::from),
        0usize..=10,
    )
        .prop_map(|(heights, fraction, v, b)| {
            let total: f64 = heights.iter().sum();
            let s = (total * fraction).floor();
            (heights, s, v, b)
        })
}

// ===== Properties =====

proptest! {
    #[test]
    fn fenwick_window_matches_linear_scan((heights, s, v, b) in arb_scenario()) {
        let cache = cache_from(&heights);
        let fast = as_tuple(window(&cache, heights.len(), s, v, b));
        prop_assert_eq!(fast, linear_window(&heights, s, v, b));
    }

    #[test]
    fn total_height_equals_sum_of_heights((heights, s, v, b) in arb_scenario()) {
        let cache = cache_from(&heights);
        let w = window(&cache, heights.len(), s, v, b);
        let sum: f64 = (0..heights.len()).map(|i| cache.get(ItemIndex::new(i))).sum();
        prop_assert_eq!(w.total_height, sum);
    }

    #[test]
    fn offset_y_equals_sum_before_start((heights, s, v, b) in arb_scenario()) {
        prop_assume!(!heights.is_empty());
        let cache = cache_from(&heights);
        let w = window(&cache, heights.len(), s, v, b);
        let start = w.start_index().unwrap().get();
        let sum: f64 = (0..start).map(|i| cache.get(ItemIndex::new(i))).sum();
        prop_assert_eq!(w.offset_y, sum);
    }

    #[test]
    fn window_span_contains_viewport((heights, s, v, b) in arb_scenario()) {
        prop_assume!(!heights.is_empty());
        let cache = cache_from(&heights);
        let n = heights.len();
        let w = window(&cache, n, s, v, b);
        let (start, end) = w.bounds.unwrap();

        let max_offset = (w.total_height - v).max(0.0);
        let clamped = s.min(max_offset);
        let span_bottom = cache.prefix_sum(end.get() + 1);

        prop_assert!(start <= end);
        prop_assert!(w.offset_y <= clamped, "top {} below row {}", w.offset_y, clamped);
        prop_assert!(
            span_bottom >= (clamped + v).min(w.total_height),
            "bottom {} above row {}", span_bottom, clamped + v
        );
        if s >= max_offset {
            prop_assert_eq!(end.get(), n - 1, "tail must be mounted");
        }
    }

    #[test]
    fn window_size_bounded_by_smallest_height(
        heights in prop::collection::vec((40u32..=400).prop_map(f64::from), 1..300),
        fraction in 0.0f64..=1.0,
        b in 0usize..=5,
    ) {
        let v = 600.0;
        let cache = cache_from(&heights);
        let total: f64 = heights.iter().sum();
        let w = window(&cache, heights.len(), (total * fraction).floor(), v, b);

        // At most v/40 fully visible items, plus two partial ones, plus buffers.
        let bound = (v / 40.0) as usize + 2 + 2 * b;
        prop_assert!(w.len() <= bound, "window of {} exceeds {}", w.len(), bound);
    }

    #[test]
    fn updates_keep_window_consistent(
        initial in arb_heights(120),
        updates in prop::collection::vec((0usize..120, (1u32..=400).prop_map(f64::from)), 0..40),
        fraction in 0.0f64..=1.0,
        v in (1u32..=1500).prop_map(f64::from),
        b in 0usize..=4,
    ) {
        prop_assume!(!initial.is_empty());
        let mut heights = initial.clone();
        let mut cache = cache_from(&initial);
        for (index, h) in updates {
            let index = index % heights.len();
            heights[index] = h;
            cache.set(ItemIndex::new(index), PixelHeight::new(h).unwrap());
        }

        let total: f64 = heights.iter().sum();
        let s = (total * fraction).floor();
        let fast = as_tuple(window(&cache, heights.len(), s, v, b));
        prop_assert_eq!(fast, linear_window(&heights, s, v, b));
    }
}

// ===== Fixed Scenarios =====

#[test]
fn window_size_independent_of_item_count() {
    let small = cache_from(&[120.0; 10]);
    let mut large = HeightCache::new(PixelHeight::new(120.0).unwrap());
    large.resize(100_000);

    let small_window = window(&small, 10, 0.0, 600.0, 3);
    let large_window = window(&large, 100_000, 0.0, 600.0, 3);
    assert_eq!(small_window.len(), large_window.len());
    assert_eq!(small_window.bounds, large_window.bounds);

    for s in [1_000.0, 777_777.0, 6_000_000.0, 11_999_400.0, 50_000_000.0] {
        let w = window(&large, 100_000, s, 600.0, 3);
        assert!(w.len() <= 12, "offset {s}: window of {} items", w.len());
    }
}

#[test]
fn empty_sequence_yields_empty_window() {
    let cache = HeightCache::new(PixelHeight::new(120.0).unwrap());
    let w = window(&cache, 0, 500.0, 600.0, 3);
    assert!(w.is_empty());
    assert_eq!(w.total_height, 0.0);
    assert_eq!(w.offset_y, 0.0);
}

#[test]
fn concrete_scenario_before_and_after_measurement() {
    let mut cache = cache_from(&[120.0; 10]);
    let w = window(&cache, 10, 0.0, 600.0, 3);
    assert_eq!(as_tuple(w), Some((0, 7, 0.0, 1200.0)));

    cache.set(ItemIndex::new(0), PixelHeight::new(50.0).unwrap());
    let w = window(&cache, 10, 0.0, 600.0, 3);
    assert_eq!(w.total_height, 1130.0);
    assert_eq!(cache.prefix_sum(1), 50.0, "index 1 now starts 70px higher");
}
