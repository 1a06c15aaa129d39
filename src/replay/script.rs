//! JSONL replay script parsing.

use super::ReplayError;
use serde::Deserialize;
use std::io::BufRead;

/// One host event from a replay script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Viewport resized.
    Viewport {
        /// New viewport height in pixels.
        height: f64,
    },
    /// Item sequence identity and length.
    Items {
        /// Sequence identity; a change resets the engine.
        sequence: u64,
        /// Number of items.
        len: usize,
    },
    /// Raw scroll sample from the container.
    Scroll {
        /// Scroll offset in pixels.
        offset: f64,
    },
    /// Display frame callback.
    Frame,
    /// Measured height from the renderer.
    Height {
        /// Item index.
        index: usize,
        /// Measured height in pixels.
        height: f64,
        /// Generation the measurement belongs to. Defaults to the current one.
        #[serde(default)]
        generation: Option<u64>,
    },
    /// Timer wakeup.
    Tick,
    /// Host view unmounted.
    Teardown,
}

impl ScriptEvent {
    /// The `event` tag as written in scripts.
    pub fn name(&self) -> &'static str {
        match self {
            ScriptEvent::Viewport { .. } => "viewport",
            ScriptEvent::Items { .. } => "items",
            ScriptEvent::Scroll { .. } => "scroll",
            ScriptEvent::Frame => "frame",
            ScriptEvent::Height { .. } => "height",
            ScriptEvent::Tick => "tick",
            ScriptEvent::Teardown => "teardown",
        }
    }
}

/// A parsed script line: an event and when it happens.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptLine {
    /// Milliseconds since the start of the replay.
    pub at_ms: u64,
    /// The event.
    #[serde(flatten)]
    pub event: ScriptEvent,
    /// 1-based line number in the script.
    #[serde(skip)]
    pub line: usize,
}

/// Parse one script line.
///
/// Blank lines yield `Ok(None)`.
///
/// # Errors
/// `ReplayError::InvalidJson` if the line is not a valid event.
pub fn parse_line(raw: &str, line_number: usize) -> Result<Option<ScriptLine>, ReplayError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let mut line: ScriptLine =
        serde_json::from_str(raw).map_err(|e| ReplayError::InvalidJson {
            line: line_number,
            message: e.to_string(),
        })?;
    line.line = line_number;
    Ok(Some(line))
}

/// Parse a batch of lines, collecting events and errors separately.
///
/// `starting_line_number` is the 1-based number of the first line.
pub fn parse_lines<I, S>(lines: I, starting_line_number: usize) -> (Vec<ScriptLine>, Vec<ReplayError>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut events = Vec::new();
    let mut errors = Vec::new();

    for (offset, raw) in lines.into_iter().enumerate() {
        match parse_line(raw.as_ref(), starting_line_number + offset) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(err) => errors.push(err),
        }
    }

    (events, errors)
}

/// Read and parse a whole script.
///
/// # Errors
/// Only I/O failures are returned as `Err`; malformed lines come back in the
/// error list alongside the parsed events.
pub fn read_script(reader: impl BufRead) -> Result<(Vec<ScriptLine>, Vec<ReplayError>), ReplayError> {
    let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
    Ok(parse_lines(lines, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_event_kind() {
        let script = [
            r#"{"at_ms":0,"event":"viewport","height":600}"#,
            r#"{"at_ms":0,"event":"items","sequence":1,"len":10}"#,
            r#"{"at_ms":16,"event":"scroll","offset":300}"#,
            r#"{"at_ms":16,"event":"frame"}"#,
            r#"{"at_ms":20,"event":"height","index":3,"height":80}"#,
            r#"{"at_ms":21,"event":"height","index":4,"height":90,"generation":2}"#,
            r#"{"at_ms":600,"event":"tick"}"#,
            r#"{"at_ms":700,"event":"teardown"}"#,
        ];

        let (events, errors) = parse_lines(script, 1);

        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        let kinds: Vec<_> = events.iter().map(|e| e.event.name()).collect();
        assert_eq!(
            kinds,
            ["viewport", "items", "scroll", "frame", "height", "height", "tick", "teardown"]
        );
        assert_eq!(
            events[4].event,
            ScriptEvent::Height {
                index: 3,
                height: 80.0,
                generation: None
            }
        );
        assert_eq!(
            events[5].event,
            ScriptEvent::Height {
                index: 4,
                height: 90.0,
                generation: Some(2)
            }
        );
        assert_eq!(events[6].at_ms, 600);
        assert_eq!(events[6].line, 7);
    }

    #[test]
    fn blank_lines_are_skipped_but_counted() {
        let (events, errors) = parse_lines(["", "   ", r#"{"at_ms":5,"event":"frame"}"#], 1);
        assert!(errors.is_empty());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].line, 3);
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let (events, errors) = parse_lines(
            [
                r#"{"at_ms":0,"event":"frame"}"#,
                r#"{"at_ms":1,"event":"explode"}"#,
                "not json",
                r#"{"at_ms":2,"event":"tick"}"#,
            ],
            10,
        );

        assert_eq!(events.len(), 2);
        let lines: Vec<_> = errors
            .iter()
            .map(|e| match e {
                ReplayError::InvalidJson { line, .. } => *line,
                other => panic!("unexpected error {other:?}"),
            })
            .collect();
        assert_eq!(lines, [11, 12]);
        assert!(errors[1].to_string().contains("line 12"));
    }

    #[test]
    fn missing_field_is_an_error() {
        let result = parse_line(r#"{"at_ms":0,"event":"scroll"}"#, 1);
        assert!(matches!(result, Err(ReplayError::InvalidJson { line: 1, .. })));
    }

    #[test]
    fn read_script_numbers_from_one() {
        let input = "{\"at_ms\":0,\"event\":\"frame\"}\n{oops}\n";
        let (events, errors) = read_script(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(errors[0], ReplayError::InvalidJson { line: 2, .. }));
    }
}
