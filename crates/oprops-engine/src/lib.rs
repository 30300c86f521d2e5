//! Properties text and XML engine.
//!
//! The engine knows the `.properties` line grammar, its escaping rules and
//! the XML properties schema. It owns no entries: every read and write goes
//! through the [`PropertySource`] and [`PropertySink`] traits, so the caller
//! decides where entries live and in which order they are enumerated.
//!
//! # Architecture
//!
//! - [`Engine`]: one transient instance per operation, bound to a storage
//! - [`storage`]: the storage-binding traits
//! - [`sink`]: [`CharSink`], the character-oriented output the text writer
//!   emits line chunks into, plus ISO-8859-1 and UTF-8 byte adapters
//! - `text_reader` / `text_writer`: the line grammar
//! - `xml_reader` / `xml_writer`: the XML schema
//! - [`encoding`]: the character encodings the engine reads and writes
//!
//! # Text output framing
//!
//! The text writer emits a comment line as a `#` chunk, the comment text
//! chunks, then a separate [`LINE_SEPARATOR`] chunk. Data lines are one
//! `key=value` chunk followed by a separator chunk. Decorating sinks may rely
//! on this framing.

pub mod encoding;
pub mod engine;
pub mod error;
pub mod escape;
pub mod sink;
pub mod storage;

mod text_reader;
mod text_writer;
mod xml_reader;
mod xml_writer;

pub use encoding::Encoding;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use sink::{CharSink, Latin1Sink, Utf8Sink};
pub use storage::{PropertySink, PropertySource};

/// Line separator emitted by the text writer.
pub const LINE_SEPARATOR: &str = "\n";

/// Comment-line markers recognized by the text grammar.
pub const COMMENT_MARKERS: [char; 2] = ['#', '!'];

#[cfg(test)]
pub(crate) mod testing {
    use crate::storage::{PropertySink, PropertySource};

    /// Discovery-ordered storage for engine tests.
    #[derive(Debug, Default)]
    pub struct VecStorage {
        pub entries: Vec<(String, Option<String>)>,
    }

    impl VecStorage {
        pub fn with(pairs: &[(&str, &str)]) -> Self {
            Self {
                entries: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                    .collect(),
            }
        }

        pub fn keys(&self) -> Vec<&str> {
            self.entries.iter().map(|(k, _)| k.as_str()).collect()
        }

        pub fn get(&self, key: &str) -> Option<&str> {
            self.entries
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.as_deref())
        }
    }

    impl PropertySource for VecStorage {
        fn property_entries(&self) -> Box<dyn Iterator<Item = (&str, Option<&str>)> + '_> {
            Box::new(self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref())))
        }
    }

    impl PropertySink for VecStorage {
        fn put_property(&mut self, key: String, value: String) -> Option<String> {
            if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
                return slot.1.replace(value);
            }
            self.entries.push((key, Some(value)));
            None
        }
    }
}
