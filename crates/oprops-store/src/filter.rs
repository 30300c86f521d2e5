//! Suppression of the timestamp comment in text output.
//!
//! The engine writes the caller's comment lines, then exactly one `#<date>`
//! line, then the data lines. [`CommentFilteringWriter`] always holds back
//! the most recent complete comment line and releases it only when another
//! comment line completes. When data starts, the held line is the date line
//! and it is discarded.

use std::io;

use oprops_engine::{CharSink, COMMENT_MARKERS, LINE_SEPARATOR};
use tracing::trace;

#[derive(Debug, PartialEq, Eq)]
enum FilterState {
    /// Chunks go straight to the inner sink.
    Passthrough,
    /// A comment line is being assembled.
    Buffering(String),
}

/// A [`CharSink`] decorator that drops the last comment line preceding the
/// data lines.
///
/// Of N consecutive leading comment lines, the first N−1 are written and the
/// last is dropped. Input must follow the engine's framing: a comment line
/// begins with a chunk starting with `#` or `!` and ends with a chunk
/// ending in the line separator.
#[derive(Debug)]
pub struct CommentFilteringWriter<S> {
    inner: S,
    state: FilterState,
    withheld: Option<String>,
}

impl<S: CharSink> CommentFilteringWriter<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            state: FilterState::Passthrough,
            withheld: None,
        }
    }

    /// Returns the inner sink. A withheld line is discarded.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Returns `true` while a comment line is being assembled.
    pub fn is_buffering(&self) -> bool {
        matches!(self.state, FilterState::Buffering(_))
    }

    /// The complete comment line currently held back.
    pub fn withheld(&self) -> Option<&str> {
        self.withheld.as_deref()
    }

    /// Called once `line` is a complete comment line: release the previously
    /// withheld line and hold this one instead.
    fn complete(&mut self, line: String) -> io::Result<()> {
        self.state = FilterState::Passthrough;
        if let Some(previous) = self.withheld.replace(line) {
            self.inner.write_str(&previous)?;
        }
        Ok(())
    }
}

impl<S: CharSink> CharSink for CommentFilteringWriter<S> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        if s.is_empty() {
            return Ok(());
        }
        match &mut self.state {
            FilterState::Buffering(line) => {
                line.push_str(s);
                if s.ends_with(LINE_SEPARATOR) {
                    let line = std::mem::take(line);
                    self.complete(line)?;
                }
                Ok(())
            }
            FilterState::Passthrough if s.starts_with(&COMMENT_MARKERS[..]) => {
                if s.ends_with(LINE_SEPARATOR) {
                    self.complete(s.to_string())
                } else {
                    self.state = FilterState::Buffering(s.to_string());
                    Ok(())
                }
            }
            FilterState::Passthrough => {
                if let Some(dropped) = self.withheld.take() {
                    trace!(line = %dropped.trim_end(), "dropped timestamp comment");
                }
                self.inner.write_str(s)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
