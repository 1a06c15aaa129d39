//! Replay runner: plays the host against an engine and records a transcript.

use std::io::Write;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use super::script::{ScriptEvent, ScriptLine};
use super::ReplayError;
use crate::config::EngineConfig;
use crate::view_state::{
    Engine, Generation, HeightReport, ItemIndex, PinState, ScrollDirective, ScrollIntent,
    SequenceId, SettleReport, VisibleWindow,
};

/// Flattened view of a [`VisibleWindow`] for the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSummary {
    /// First mounted index, `null` when empty.
    pub start: Option<usize>,
    /// Last mounted index (inclusive), `null` when empty.
    pub end: Option<usize>,
    /// Sum of heights before `start`.
    pub offset_y: f64,
    /// Sum of all heights.
    pub total_height: f64,
}

impl From<VisibleWindow> for WindowSummary {
    fn from(window: VisibleWindow) -> Self {
        Self {
            start: window.start_index().map(|i| i.get()),
            end: window.end_index().map(|i| i.get()),
            offset_y: window.offset_y,
            total_height: window.total_height,
        }
    }
}

/// Engine state after one script event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptLine {
    /// Script line the event came from.
    pub line: usize,
    /// Event timestamp.
    pub at_ms: u64,
    /// Event tag.
    pub event: &'static str,
    /// Window after the event.
    pub window: WindowSummary,
    /// Newest item mounted outside the window while an auto-scroll waits for it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awaiting: Option<usize>,
    /// Last applied scroll offset.
    pub scroll_offset: f64,
    /// Pin state after the event.
    pub pin: PinState,
    /// Scroll intent after the event.
    pub intent: ScrollIntent,
    /// Directive emitted by this event, already sent back as a scroll sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<ScrollDirective>,
    /// Settle evaluation, for `tick` events that fired the settle timer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled: Option<SettleReport>,
}

/// Scripted host driving an [`Engine`].
#[derive(Debug)]
pub struct Replay {
    engine: Engine,
    origin: Instant,
}

impl Replay {
    /// Create a runner whose `at_ms = 0` is now.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_origin(config, Instant::now())
    }

    /// Create a runner with an explicit time origin.
    pub fn with_origin(config: EngineConfig, origin: Instant) -> Self {
        Self {
            engine: Engine::new(config),
            origin,
        }
    }

    /// The engine under replay.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Apply one event and describe the resulting state.
    pub fn apply(&mut self, line: &ScriptLine) -> TranscriptLine {
        let now = self.origin + Duration::from_millis(line.at_ms);
        let mut settled = None;

        match line.event {
            ScriptEvent::Viewport { height } => self.engine.set_viewport(height),
            ScriptEvent::Items { sequence, len } => self.engine.set_items(SequenceId(sequence), len),
            ScriptEvent::Scroll { offset } => {
                self.engine.on_scroll(offset, now);
            }
            ScriptEvent::Frame => {
                self.engine.on_frame(now);
            }
            ScriptEvent::Height {
                index,
                height,
                generation,
            } => {
                let generation = generation.map_or(self.engine.generation(), Generation::new);
                self.engine.report_height(HeightReport {
                    generation,
                    index: ItemIndex::new(index),
                    height,
                });
            }
            ScriptEvent::Tick => settled = self.engine.tick(now),
            ScriptEvent::Teardown => self.engine.teardown(),
        }

        let directive = self.engine.take_scroll_directive();
        if let Some(directive) = directive {
            debug!(line = line.line, target = directive.target, "applying directive");
            self.engine.on_scroll(directive.target, now);
        }

        TranscriptLine {
            line: line.line,
            at_ms: line.at_ms,
            event: line.event.name(),
            window: self.engine.current_window().into(),
            awaiting: self.engine.awaited_placement().map(|p| p.index.get()),
            scroll_offset: self.engine.viewport().scroll_offset,
            pin: self.engine.pin_state(),
            intent: self.engine.scroll_intent(),
            directive,
            settled,
        }
    }

    /// Apply every event in order.
    pub fn run<'a>(&mut self, lines: impl IntoIterator<Item = &'a ScriptLine>) -> Vec<TranscriptLine> {
        let transcript: Vec<_> = lines.into_iter().map(|line| self.apply(line)).collect();
        info!(
            events = transcript.len(),
            stats = ?self.engine.stats(),
            "replay finished"
        );
        transcript
    }
}

/// Write a transcript as JSONL.
///
/// # Errors
/// `ReplayError::Io` if writing fails.
pub fn write_transcript(
    transcript: &[TranscriptLine],
    mut writer: impl Write,
) -> Result<(), ReplayError> {
    for line in transcript {
        serde_json::to_writer(&mut writer, line).map_err(std::io::Error::from)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}
