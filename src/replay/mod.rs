//! Scripted replay of host events against the [`Engine`](crate::view_state::Engine).
//!
//! A replay script is JSONL: one timestamped host event per line. The
//! [`Replay`] runner plays the role of the hosting view. It feeds each event
//! to the engine, applies every emitted scroll directive by sending the
//! target back as a scroll sample, and records one [`TranscriptLine`] per
//! event.
//!
//! ```text
//! {"at_ms":0,"event":"viewport","height":600}
//! {"at_ms":0,"event":"items","sequence":1,"len":10}
//! {"at_ms":20,"event":"height","index":9,"height":80}
//! {"at_ms":36,"event":"frame"}
//! ```
//!
//! Malformed lines are reported with their line number and skipped; the rest
//! of the script still runs.

pub mod runner;
pub mod script;

pub use runner::{write_transcript, Replay, TranscriptLine, WindowSummary};
pub use script::{parse_line, parse_lines, read_script, ScriptEvent, ScriptLine};

use thiserror::Error;

/// Errors from reading or writing replay scripts.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A script line is not a valid event.
    ///
    /// Non-fatal: the line is skipped and the error reported.
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// 1-based line number in the script.
        line: usize,
        /// Parser error message.
        message: String,
    },

    /// Reading the script or writing the transcript failed.
    #[error("Replay I/O error: {0}")]
    Io(#[from] std::io::Error),
}
