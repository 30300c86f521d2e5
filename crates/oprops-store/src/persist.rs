//! Persisted form of an [`OrderedStore`].
//!
//! The persisted form is the entry sequence plus the store settings:
//!
//! ```json
//! {"entries": [["b", "222"], ["a", null]], "suppress_date": true, "xml_encoding": "UTF-8"}
//! ```
//!
//! `entries` and `suppress_date` are required. A comparator is code and is
//! not persisted. [`OrderedStore::from_persisted`] restores into insertion
//! order, which reproduces the persisted sequence;
//! [`OrderedStore::from_persisted_with_ordering`] and
//! [`StoreBuilder::restore`](crate::StoreBuilder::restore) take the
//! comparator back from the caller.

use oprops_engine::Encoding;
use oprops_map::{KeyComparator, OrderedMap};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::store::OrderedStore;

#[derive(Serialize)]
struct PersistedRef<'a> {
    entries: Vec<(&'a str, Option<&'a str>)>,
    suppress_date: bool,
    xml_encoding: &'a str,
}

#[derive(Deserialize)]
struct Persisted {
    entries: Vec<(String, Option<String>)>,
    suppress_date: bool,
    #[serde(default = "default_xml_encoding")]
    xml_encoding: String,
}

fn default_xml_encoding() -> String {
    Encoding::Utf8.label().to_string()
}

impl Persisted {
    fn into_store(self, ordering: Option<KeyComparator>) -> std::result::Result<OrderedStore, String> {
        Encoding::from_label(&self.xml_encoding).map_err(|e| e.to_string())?;

        let mut map = match ordering {
            Some(comparator) => OrderedMap::with_comparator(comparator),
            None => OrderedMap::new(),
        };
        for (key, value) in self.entries {
            if map.contains_key(&key) {
                return Err(format!("duplicate key {key:?}"));
            }
            map.insert(key, value);
        }

        let config = StoreConfig {
            suppress_date_in_comment: self.suppress_date,
            xml_encoding: self.xml_encoding,
        };
        Ok(OrderedStore::from_parts(map, &config))
    }
}

impl Serialize for OrderedStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let config = self.config();
        PersistedRef {
            entries: self.iter().collect(),
            suppress_date: config.suppress_date_in_comment,
            xml_encoding: &config.xml_encoding,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OrderedStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Persisted::deserialize(deserializer)?
            .into_store(None)
            .map_err(D::Error::custom)
    }
}

impl OrderedStore {
    /// Serialize entries and settings to JSON.
    pub fn to_persisted(&self) -> Result<String> {
        let json = serde_json::to_string(self).map_err(|e| StoreError::InvalidState(e.to_string()))?;
        debug!(entries = self.len(), bytes = json.len(), "persisted store");
        Ok(json)
    }

    /// Restore a store from [`to_persisted`](Self::to_persisted) output,
    /// in insertion order.
    pub fn from_persisted(json: &str) -> Result<Self> {
        Self::from_persisted_with_ordering(json, None)
    }

    /// Restore a store and order its keys with `ordering`.
    ///
    /// Keys `ordering` deems equal count as duplicates.
    pub fn from_persisted_with_ordering(json: &str, ordering: Option<KeyComparator>) -> Result<Self> {
        let persisted: Persisted =
            serde_json::from_str(json).map_err(|e| StoreError::InvalidState(e.to_string()))?;
        let sorted = ordering.is_some();
        let store = persisted.into_store(ordering).map_err(StoreError::InvalidState)?;
        debug!(entries = store.len(), sorted, "restored store");
        Ok(store)
    }
}
