//! Character sinks for the text writer.

use std::io::{self, BufWriter, Write};

/// A character-oriented output the text writer emits chunks into.
///
/// Errors are plain [`io::Error`]s so stream failures reach the caller
/// unchanged.
pub trait CharSink {
    /// Write one chunk of characters.
    fn write_str(&mut self, s: &str) -> io::Result<()>;

    /// Flush buffered output to the underlying stream.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CharSink for String {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.push_str(s);
        Ok(())
    }
}

impl<T: CharSink + ?Sized> CharSink for &mut T {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        (**self).write_str(s)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Encodes characters as ISO-8859-1 bytes.
///
/// Characters above U+00FF cannot be represented and are written as `?`.
/// The text writer escapes such characters before they get here when
/// unicode escaping is on.
pub struct Latin1Sink<W: Write> {
    inner: BufWriter<W>,
    buf: Vec<u8>,
}

impl<W: Write> Latin1Sink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
            buf: Vec::new(),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.inner.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> CharSink for Latin1Sink<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.buf.clear();
        self.buf
            .extend(s.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')));
        self.inner.write_all(&self.buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Encodes characters as UTF-8 bytes.
pub struct Utf8Sink<W: Write> {
    inner: BufWriter<W>,
}

impl<W: Write> Utf8Sink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.inner.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> CharSink for Utf8Sink<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.inner.write_all(s.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
