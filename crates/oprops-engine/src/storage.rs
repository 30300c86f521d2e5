//! Storage-binding traits.
//!
//! The engine never keeps entries of its own. Parsers put every entry into a
//! [`PropertySink`] the moment it is read, and writers enumerate a
//! [`PropertySource`] in whatever order the source yields.

/// Read access to the entries an engine writes out.
pub trait PropertySource {
    /// All entries in output order. A `None` value is null-like.
    fn property_entries(&self) -> Box<dyn Iterator<Item = (&str, Option<&str>)> + '_>;
}

/// Write access for the entries an engine parses.
pub trait PropertySink {
    /// Insert or overwrite `key`, returning the previous value.
    fn put_property(&mut self, key: String, value: String) -> Option<String>;
}
