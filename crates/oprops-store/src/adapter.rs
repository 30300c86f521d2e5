//! Binding of the properties engine to an [`OrderedMap`].
//!
//! Every call builds a fresh [`Engine`] whose storage is the caller's map
//! itself: parsed entries are inserted straight into it and written entries
//! are read straight out of it, in the map's order. Nothing is copied into
//! the engine and nothing outlives the call.

use std::io::{Read, Write};

use oprops_engine::{CharSink, Engine, PropertySink, PropertySource};
use oprops_map::OrderedMap;
use tracing::trace;

use crate::error::Result;

/// Read-side binding: the engine enumerates the map.
struct MapSource<'a> {
    map: &'a OrderedMap,
}

impl PropertySource for MapSource<'_> {
    fn property_entries(&self) -> Box<dyn Iterator<Item = (&str, Option<&str>)> + '_> {
        Box::new(self.map.iter())
    }
}

/// Write-side binding: the engine inserts into the map.
struct MapSink<'a> {
    map: &'a mut OrderedMap,
}

impl PropertySink for MapSink<'_> {
    fn put_property(&mut self, key: String, value: String) -> Option<String> {
        self.map.insert(key, Some(value))
    }
}

/// Stateless façade running engine operations against an [`OrderedMap`].
pub(crate) struct EngineAdapter;

impl EngineAdapter {
    fn reader(map: &mut OrderedMap) -> Engine<MapSink<'_>> {
        trace!(entries = map.len(), "binding engine for read");
        Engine::new(MapSink { map })
    }

    fn writer(map: &OrderedMap) -> Engine<MapSource<'_>> {
        trace!(entries = map.len(), "binding engine for write");
        Engine::new(MapSource { map })
    }

    pub(crate) fn load<R: Read>(map: &mut OrderedMap, reader: R) -> Result<usize> {
        Ok(Self::reader(map).load(reader)?)
    }

    pub(crate) fn load_chars<R: Read>(map: &mut OrderedMap, reader: R) -> Result<usize> {
        Ok(Self::reader(map).load_chars(reader)?)
    }

    pub(crate) fn load_str(map: &mut OrderedMap, text: &str) -> Result<usize> {
        Ok(Self::reader(map).load_str(text)?)
    }

    pub(crate) fn load_xml<R: Read>(map: &mut OrderedMap, reader: R) -> Result<usize> {
        Ok(Self::reader(map).load_xml(reader)?)
    }

    pub(crate) fn store<W: CharSink + ?Sized>(
        map: &OrderedMap,
        sink: &mut W,
        comments: Option<&str>,
        escape_unicode: bool,
    ) -> Result<()> {
        Ok(Self::writer(map).store(sink, comments, escape_unicode)?)
    }

    pub(crate) fn store_xml<W: Write>(
        map: &OrderedMap,
        out: W,
        comment: Option<&str>,
        encoding: &str,
    ) -> Result<()> {
        Ok(Self::writer(map).store_xml(out, comment, encoding)?)
    }

    pub(crate) fn list<W: CharSink + ?Sized>(map: &OrderedMap, sink: &mut W) -> Result<()> {
        Ok(Self::writer(map).list(sink)?)
    }
}
