//! Reader for the `.properties` line grammar.

use tracing::trace;

use crate::error::{EngineError, Result};
use crate::escape::unescape;
use crate::storage::PropertySink;
use crate::COMMENT_MARKERS;

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn is_eol(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

/// A logical line: natural lines joined across backslash continuations,
/// with comments and blank lines already skipped.
struct LogicalLine {
    text: Vec<char>,
    line: usize,
}

/// Splits input into logical lines.
struct LineReader<'a> {
    input: &'a [char],
    pos: usize,
    line: usize,
}

impl<'a> LineReader<'a> {
    fn new(input: &'a [char]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = *self.input.get(self.pos)?;
        self.pos += 1;
        if c == '\n' || (c == '\r' && self.input.get(self.pos) != Some(&'\n')) {
            self.line += 1;
        }
        Some(c)
    }

    fn next_line(&mut self) -> Option<LogicalLine> {
        let mut text = Vec::new();
        let mut start_line = self.line;
        let mut skip_blank = true;
        let mut appending = false;
        let mut is_comment = false;
        let mut is_new_line = true;
        let mut preceding_backslash = false;
        let mut skip_lf = false;

        loop {
            let Some(c) = self.bump() else {
                if text.is_empty() || is_comment {
                    return None;
                }
                if preceding_backslash {
                    text.pop();
                }
                return Some(LogicalLine {
                    text,
                    line: start_line,
                });
            };

            if skip_lf {
                skip_lf = false;
                if c == '\n' {
                    continue;
                }
            }

            if is_comment {
                if is_eol(c) {
                    is_comment = false;
                    is_new_line = true;
                    skip_blank = true;
                }
                continue;
            }

            if skip_blank {
                if is_blank(c) || (!appending && is_eol(c)) {
                    continue;
                }
                skip_blank = false;
                appending = false;
            }

            if is_new_line {
                is_new_line = false;
                start_line = self.line;
                if COMMENT_MARKERS.contains(&c) {
                    is_comment = true;
                    continue;
                }
            }

            if !is_eol(c) {
                text.push(c);
                preceding_backslash = c == '\\' && !preceding_backslash;
                continue;
            }

            if preceding_backslash {
                text.pop();
                preceding_backslash = false;
                skip_blank = true;
                appending = true;
                skip_lf = c == '\r';
                continue;
            }

            return Some(LogicalLine {
                text,
                line: start_line,
            });
        }
    }
}

/// Split a logical line into raw key and value segments.
///
/// The key ends at the first unescaped `=`, `:` or blank. Blanks around the
/// separator and at most one `=` or `:` are skipped.
fn split_entry(text: &[char]) -> (&[char], &[char]) {
    let mut key_len = 0;
    let mut value_start = text.len();
    let mut has_separator = false;
    let mut preceding_backslash = false;

    while key_len < text.len() {
        let c = text[key_len];
        if !preceding_backslash {
            if c == '=' || c == ':' {
                value_start = key_len + 1;
                has_separator = true;
                break;
            }
            if is_blank(c) {
                value_start = key_len + 1;
                break;
            }
        }
        preceding_backslash = c == '\\' && !preceding_backslash;
        key_len += 1;
    }

    while value_start < text.len() {
        let c = text[value_start];
        if !is_blank(c) {
            if !has_separator && (c == '=' || c == ':') {
                has_separator = true;
            } else {
                break;
            }
        }
        value_start += 1;
    }

    (&text[..key_len], &text[value_start..])
}

/// Parse `input` and put every entry into `sink` in the order read.
///
/// Entries parsed before an error remain in the sink.
pub(crate) fn read_text<S: PropertySink + ?Sized>(input: &[char], sink: &mut S) -> Result<usize> {
    let mut reader = LineReader::new(input);
    let mut count = 0;
    while let Some(line) = reader.next_line() {
        let (raw_key, raw_value) = split_entry(&line.text);
        let format_err = |reason: String| EngineError::Format {
            line: line.line,
            reason,
        };
        let key = unescape(raw_key).map_err(format_err)?;
        let value = unescape(raw_value).map_err(format_err)?;
        trace!(line = line.line, key = %key, "property read");
        sink.put_property(key, value);
        count += 1;
    }
    Ok(count)
}
