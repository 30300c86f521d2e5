//! Writer for the `.properties` line grammar.

use std::io;

use chrono::{DateTime, Utc};

use crate::escape::{escape_key, escape_value, push_unicode_escape};
use crate::sink::CharSink;
use crate::{COMMENT_MARKERS, LINE_SEPARATOR};

/// Values longer than this are truncated by [`write_listing`].
const LIST_VALUE_LIMIT: usize = 40;

/// Format of the timestamp comment line.
pub(crate) const DATE_FORMAT: &str = "%a %b %d %H:%M:%S UTC %Y";

/// Write the caller's comment block.
///
/// Each line becomes a `#` comment line; line breaks may be `\n`, `\r` or
/// `\r\n`. A line that already starts with a comment marker is not prefixed
/// again. Characters above U+00FF are written as `\uXXXX`.
pub(crate) fn write_comments<W: CharSink + ?Sized>(sink: &mut W, comments: &str) -> io::Result<()> {
    let chars: Vec<char> = comments.chars().collect();
    let mut segment = String::new();

    sink.write_str("#")?;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if u32::from(c) > 0xFF {
            push_unicode_escape(&mut segment, c);
        } else if c == '\n' || c == '\r' {
            if !segment.is_empty() {
                sink.write_str(&segment)?;
                segment.clear();
            }
            sink.write_str(LINE_SEPARATOR)?;
            if c == '\r' && chars.get(i + 1) == Some(&'\n') {
                i += 1;
            }
            let continues_marked = chars
                .get(i + 1)
                .is_some_and(|next| COMMENT_MARKERS.contains(next));
            if !continues_marked {
                sink.write_str("#")?;
            }
        } else {
            segment.push(c);
        }
        i += 1;
    }
    if !segment.is_empty() {
        sink.write_str(&segment)?;
    }
    sink.write_str(LINE_SEPARATOR)
}

/// Write the `#<date>` comment line.
pub(crate) fn write_date_line<W: CharSink + ?Sized>(
    sink: &mut W,
    timestamp: &DateTime<Utc>,
) -> io::Result<()> {
    sink.write_str(&format!("#{}", timestamp.format(DATE_FORMAT)))?;
    sink.write_str(LINE_SEPARATOR)
}

/// Write one `key=value` line.
pub(crate) fn write_entry<W: CharSink + ?Sized>(
    sink: &mut W,
    key: &str,
    value: &str,
    escape_unicode: bool,
) -> io::Result<()> {
    let line = format!(
        "{}={}",
        escape_key(key, escape_unicode),
        escape_value(value, escape_unicode)
    );
    sink.write_str(&line)?;
    sink.write_str(LINE_SEPARATOR)
}

/// Write the human-readable listing header and entries. Nothing is escaped.
pub(crate) fn write_listing<'a, W, I>(sink: &mut W, entries: I) -> io::Result<()>
where
    W: CharSink + ?Sized,
    I: Iterator<Item = (&'a str, Option<&'a str>)>,
{
    sink.write_str("-- listing properties --")?;
    sink.write_str(LINE_SEPARATOR)?;
    for (key, value) in entries {
        let value = value.unwrap_or("null");
        let shown = if value.chars().count() > LIST_VALUE_LIMIT {
            let head: String = value.chars().take(LIST_VALUE_LIMIT - 3).collect();
            format!("{head}...")
        } else {
            value.to_string()
        };
        sink.write_str(&format!("{key}={shown}"))?;
        sink.write_str(LINE_SEPARATOR)?;
    }
    Ok(())
}
