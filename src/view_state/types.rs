//! Core view-state newtypes

/// Measured pixel height of a single item. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PixelHeight(f64);

/// Error returned when a height report carries a zero, negative, or non-finite value.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("PixelHeight must be positive and finite (got {0})")]
pub struct InvalidHeight(pub f64);

impl PixelHeight {
    /// Estimate used for unmeasured items when nothing else is configured.
    pub const DEFAULT_ESTIMATE: Self = Self(120.0);

    /// Smart constructor that validates the height is positive and finite.
    pub fn new(height: f64) -> Result<Self, InvalidHeight> {
        if height.is_finite() && height > 0.0 {
            Ok(Self(height))
        } else {
            Err(InvalidHeight(height))
        }
    }

    /// Get the raw pixel value.
    pub fn get(&self) -> f64 {
        self.0
    }
}

/// Position of an item in the sequence. 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ItemIndex(usize);

impl ItemIndex {
    /// Create a new ItemIndex from a raw 0-based value.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw 0-based index value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Get the next item index.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Get the previous item index, saturating at 0.
    pub fn prev(&self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl From<usize> for ItemIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for ItemIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of an item sequence (e.g. one conversation).
///
/// Supplied by the message store. A change of identity resets all per-item
/// state held by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SequenceId(pub u64);

/// Reset counter. Bumped every time the sequence identity changes.
///
/// Height reports carry the generation they were measured under so that
/// reports for a sequence that is no longer shown can be discarded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    /// Create a generation from its raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// The generation following this one.
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Scroll offset and viewport height of the scroll container, in pixels.
///
/// # Invariants
/// - `scroll_offset >= 0`
/// - `height > 0` once the host has reported a layout; `0` before that
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportState {
    /// Distance from the top of the content to the top of the viewport.
    pub scroll_offset: f64,
    /// Height of the visible region.
    pub height: f64,
}

impl ViewportState {
    /// Create new viewport state, clamping negative or non-finite input to zero.
    pub fn new(scroll_offset: f64, height: f64) -> Self {
        Self {
            scroll_offset: sanitize(scroll_offset),
            height: sanitize(height),
        }
    }

    /// Largest scroll offset that still shows a full viewport of content.
    pub fn max_offset(&self, total_height: f64) -> f64 {
        (total_height - self.height).max(0.0)
    }
}

/// Clamp a pixel value to a finite, non-negative number.
pub(crate) fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
