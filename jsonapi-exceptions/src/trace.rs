//! Call frames attached to failures for debug diagnostics.
//!
//! Frames are free-form JSON objects so that hosts can record whatever their
//! runtime knows about a frame. An `args` member, if present, holds argument
//! values and is never exposed in rendered errors.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Frame member holding argument values, stripped before exposure.
const ARGS: &str = "args";

static FRAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+:\s+(?P<function>.+?)\s*$").expect("valid regex"));

static LOCATION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*at\s+(?P<file>.+):(?P<line>\d+):(?P<column>\d+)\s*$").expect("valid regex")
});

/// One call frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame(Map<String, Value>);

impl Frame {
    /// Creates an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frame for the named function.
    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self::new().with("function", name.into())
    }

    /// Adds a member.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Looks up a member.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The frame as exposed in debug output: every member except `args`.
    #[must_use]
    pub fn without_args(&self) -> Map<String, Value> {
        self.0
            .iter()
            .filter(|(key, _)| key.as_str() != ARGS)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl From<Map<String, Value>> for Frame {
    fn from(members: Map<String, Value>) -> Self {
        Self(members)
    }
}

/// Captures the current call stack as frames.
///
/// Honours `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`: when capturing is
/// disabled the result is empty.
#[must_use]
pub fn capture() -> Vec<Frame> {
    frames_of(&Backtrace::capture())
}

fn frames_of(backtrace: &Backtrace) -> Vec<Frame> {
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    parse(&backtrace.to_string())
}

/// Parses the text rendering of a [`Backtrace`].
///
/// Each numbered line opens a frame; a following `at file:line:column`
/// line adds the location.
fn parse(rendered: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for line in rendered.lines() {
        if let Some(captures) = FRAME_LINE.captures(line) {
            frames.push(Frame::function(&captures["function"]));
        } else if let Some(captures) = LOCATION_LINE.captures(line) {
            let Some(frame) = frames.pop() else {
                continue;
            };
            let mut frame = frame.with("file", &captures["file"]);
            if let Ok(number) = captures["line"].parse::<u64>() {
                frame = frame.with("line", number);
            }
            if let Ok(number) = captures["column"].parse::<u64>() {
                frame = frame.with("column", number);
            }
            frames.push(frame);
        }
    }
    frames
}
