//! scrollfeed - virtualization engine for chat feeds
//!
//! Renders an unbounded, append-mostly sequence of chat items inside a fixed
//! viewport by mounting only a window of them. Heights are discovered lazily
//! as the renderer measures items; the feed stays pinned to the newest item
//! until the user scrolls away.
//!
//! The core ([`view_state`]) is pure and clock-free. The outer shell
//! ([`config`], [`logging`], [`replay`]) handles files, environment, and the
//! `scrollfeed-replay` driver.

pub mod config;
pub mod logging;
pub mod replay;
pub mod view_state;

pub use config::EngineConfig;
pub use view_state::Engine;
