//! View-state layer - heights, windowing, scrolling, and auto-scroll
//!
//! This module implements the virtualization core: deciding which items of an
//! unbounded feed must be mounted, tracking their measured heights, and
//! following the newest item without fighting the user's own scrolling.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (PixelHeight, ItemIndex, SequenceId, Generation, ViewportState)
//! - `height_index`: HeightIndex - O(log n) prefix sums via Fenwick tree
//! - `height_cache`: HeightCache - measured-or-estimated height per item
//! - `window`: VisibleWindow and the pure window calculation
//! - `timer`: DebounceTimer and FrameThrottle - explicit, cancellable deadlines
//! - `scroll_controller`: ScrollController - frame coalescing, intent, settle detection
//! - `auto_scroll`: AutoScrollPolicy - Pinned/Unpinned state machine
//! - `engine`: Engine - orchestrator exposed to the host

pub mod auto_scroll;
pub mod engine;
pub mod height_cache;
pub mod height_index;
pub mod scroll_controller;
pub mod timer;
pub mod types;
pub mod window;

pub use auto_scroll::PinState;
pub use engine::{Engine, EngineStats, HeightReport, ScrollDirective};
pub use scroll_controller::{ScrollIntent, SettleReport};
pub use types::{Generation, ItemIndex, PixelHeight, SequenceId, ViewportState};
pub use window::{ItemPlacement, VisibleWindow};
