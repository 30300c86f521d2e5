//! The [`Engine`] entry point.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::encoding::{decode_latin1, Encoding};
use crate::error::{EngineError, Result};
use crate::sink::CharSink;
use crate::storage::{PropertySink, PropertySource};
use crate::{text_reader, text_writer, xml_reader, xml_writer};

/// A transient engine bound to a storage.
///
/// Build one per operation. The engine reads entries from and writes entries
/// into `storage` directly; it keeps no state between calls.
#[derive(Debug)]
pub struct Engine<S> {
    storage: S,
}

impl<S> Engine<S> {
    /// Bind an engine to `storage`.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Release the storage binding.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S: PropertySink> Engine<S> {
    /// Parse `.properties` text from an ISO-8859-1 byte stream.
    ///
    /// Returns the number of entries read. Entries parsed before an error
    /// remain in the storage.
    pub fn load<R: Read>(&mut self, mut reader: R) -> Result<usize> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let chars: Vec<char> = decode_latin1(&bytes).chars().collect();
        self.load_from_chars(&chars)
    }

    /// Parse `.properties` text from a UTF-8 character stream.
    pub fn load_chars<R: Read>(&mut self, mut reader: R) -> Result<usize> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.load_str(&text)
    }

    /// Parse `.properties` text held in memory.
    pub fn load_str(&mut self, text: &str) -> Result<usize> {
        let chars: Vec<char> = text.chars().collect();
        self.load_from_chars(&chars)
    }

    fn load_from_chars(&mut self, chars: &[char]) -> Result<usize> {
        let count = text_reader::read_text(chars, &mut self.storage)?;
        debug!(entries = count, "loaded properties text");
        Ok(count)
    }

    /// Parse an XML properties document. The declared encoding is honored.
    pub fn load_xml<R: Read>(&mut self, mut reader: R) -> Result<usize> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let count = xml_reader::read_xml(&bytes, &mut self.storage)?;
        debug!(entries = count, "loaded properties XML");
        Ok(count)
    }
}

impl<S: PropertySource> Engine<S> {
    /// Collect all entries, failing on the first null-like value before
    /// anything is written.
    fn writable_entries(&self) -> Result<Vec<(&str, &str)>> {
        self.storage
            .property_entries()
            .map(|(key, value)| {
                value.map(|v| (key, v)).ok_or_else(|| EngineError::NullValue {
                    key: key.to_string(),
                })
            })
            .collect()
    }

    /// Write `.properties` text stamped with the current time.
    ///
    /// Writes the optional comment block, a `#<date>` line, then one
    /// `key=value` line per entry in storage order, and flushes `sink`.
    /// With `escape_unicode`, characters outside printable ASCII are written
    /// as `\uXXXX`.
    pub fn store<W: CharSink + ?Sized>(
        &self,
        sink: &mut W,
        comments: Option<&str>,
        escape_unicode: bool,
    ) -> Result<()> {
        self.store_at(sink, comments, escape_unicode, Utc::now())
    }

    /// Like [`Engine::store`] with an explicit timestamp.
    pub fn store_at<W: CharSink + ?Sized>(
        &self,
        sink: &mut W,
        comments: Option<&str>,
        escape_unicode: bool,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let entries = self.writable_entries()?;
        if let Some(comments) = comments {
            text_writer::write_comments(sink, comments)?;
        }
        text_writer::write_date_line(sink, &timestamp)?;
        for (key, value) in &entries {
            text_writer::write_entry(sink, key, value, escape_unicode)?;
        }
        sink.flush()?;
        debug!(entries = entries.len(), "stored properties text");
        Ok(())
    }

    /// Write an XML properties document in `encoding`.
    pub fn store_xml<W: Write>(&self, mut out: W, comment: Option<&str>, encoding: &str) -> Result<()> {
        let resolved = Encoding::from_label(encoding)?;
        let entries = self.writable_entries()?;
        xml_writer::write_xml(
            &mut out,
            entries.iter().copied(),
            comment,
            encoding,
            resolved,
        )?;
        debug!(entries = entries.len(), encoding = %resolved, "stored properties XML");
        Ok(())
    }

    /// Write a diagnostic listing of all entries.
    pub fn list<W: CharSink + ?Sized>(&self, sink: &mut W) -> Result<()> {
        text_writer::write_listing(sink, self.storage.property_entries())?;
        sink.flush()?;
        Ok(())
    }
}
