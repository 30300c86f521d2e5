//! Fluent construction of [`OrderedStore`]s.

use oprops_map::{KeyComparator, OrderedMap};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::store::OrderedStore;

/// Builds [`OrderedStore`]s with a chosen ordering and date behavior.
///
/// A builder can be reused: every [`build`](Self::build) produces a fresh,
/// empty store with the same settings.
#[derive(Clone, Debug, Default)]
pub struct StoreBuilder {
    comparator: Option<KeyComparator>,
    config: StoreConfig,
}

impl StoreBuilder {
    /// Insertion order, date comment written, UTF-8 XML.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from serialized settings. Ordering stays insertion order.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            comparator: None,
            config: config.clone(),
        })
    }

    /// Order keys with `comparator`. `None` restores insertion order.
    pub fn with_ordering(mut self, comparator: impl Into<Option<KeyComparator>>) -> Self {
        self.comparator = comparator.into();
        self
    }

    /// Omit the `#<date>` comment line from text output.
    pub fn with_suppress_date_in_comment(mut self, suppress: bool) -> Self {
        self.config.suppress_date_in_comment = suppress;
        self
    }

    /// Encoding for [`OrderedStore::store_xml`].
    pub fn with_xml_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.config.xml_encoding = encoding.into();
        self
    }

    pub fn build(&self) -> OrderedStore {
        let map = match &self.comparator {
            Some(comparator) => OrderedMap::with_comparator(comparator.clone()),
            None => OrderedMap::new(),
        };
        debug!(
            sorted = self.comparator.is_some(),
            suppress_date = self.config.suppress_date_in_comment,
            "building ordered store"
        );
        OrderedStore::from_parts(map, &self.config)
    }

    /// Restore a persisted store with this builder's ordering.
    ///
    /// Date and encoding settings come from the persisted form.
    pub fn restore(&self, json: &str) -> Result<OrderedStore> {
        OrderedStore::from_persisted_with_ordering(json, self.comparator.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn defaults() {
        let store = StoreBuilder::new().build();
        assert!(store.comparator().is_none());
        assert!(!store.suppresses_date());
        assert!(store.is_empty());
        assert_eq!(store.config(), StoreConfig::default());
    }

    #[test]
    fn ordering_and_reset() {
        let builder = StoreBuilder::new().with_ordering(KeyComparator::natural());
        assert!(builder.build().comparator().is_some());

        let builder = builder.with_ordering(None::<KeyComparator>);
        let mut store = builder.build();
        store.set("b", "1");
        store.set("a", "2");
        assert_eq!(store.keys(), vec!["b", "a"]);
    }

    #[test]
    fn builds_are_independent() {
        let builder = StoreBuilder::new().with_suppress_date_in_comment(true);
        let mut first = builder.build();
        first.set("k", "v");
        let second = builder.build();
        assert!(second.is_empty());
        assert!(second.suppresses_date());
    }

    #[test]
    fn comparator_is_shared() {
        let cmp = KeyComparator::ascii_case_insensitive();
        let builder = StoreBuilder::new().with_ordering(cmp.clone());
        let a = builder.build();
        let b = builder.build();
        assert!(a.comparator().unwrap().ptr_eq(&cmp));
        assert!(b.comparator().unwrap().ptr_eq(&cmp));
    }

    #[test]
    fn from_config() {
        let config = StoreConfig {
            suppress_date_in_comment: true,
            xml_encoding: "US-ASCII".into(),
        };
        let store = StoreBuilder::from_config(&config).unwrap().build();
        assert!(store.suppresses_date());
        assert_eq!(store.config(), config);

        let bad = StoreConfig {
            xml_encoding: "UTF-32".into(),
            ..StoreConfig::default()
        };
        assert!(matches!(
            StoreBuilder::from_config(&bad),
            Err(StoreError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn restore_applies_builder_ordering() {
        let builder = StoreBuilder::new().with_ordering(KeyComparator::reverse_natural());
        let mut store = builder.build();
        store.set("a", "1");
        store.set("c", "3");
        let json = store.to_persisted().unwrap();

        let mut restored = builder.restore(&json).unwrap();
        restored.set("b", "2");
        assert_eq!(restored.keys(), vec!["c", "b", "a"]);

        let mut plain = StoreBuilder::new().restore(&json).unwrap();
        plain.set("b", "2");
        assert_eq!(plain.keys(), vec!["c", "a", "b"]);
    }

    #[test]
    fn restore_keeps_persisted_settings() {
        let json = r#"{"entries": [], "suppress_date": true, "xml_encoding": "US-ASCII"}"#;
        let restored = StoreBuilder::new().restore(json).unwrap();
        assert!(restored.suppresses_date());
        assert_eq!(restored.config().xml_encoding, "US-ASCII");
        assert!(matches!(
            StoreBuilder::new().restore("{}"),
            Err(StoreError::InvalidState(_))
        ));
    }

    #[test]
    fn xml_encoding_flows_to_store() {
        let mut store = StoreBuilder::new().with_xml_encoding("ISO-8859-1").build();
        store.set("k", "v");
        let mut out = Vec::new();
        store.store_xml(&mut out, None).unwrap();
        assert!(out.starts_with(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\""));
    }
}
