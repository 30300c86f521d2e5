//! The [`OrderedStore`] container.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};

use oprops_engine::{CharSink, Latin1Sink, Utf8Sink};
use oprops_map::{Iter, KeyComparator, OrderedMap};
use tracing::debug;

use crate::adapter::EngineAdapter;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::filter::CommentFilteringWriter;

/// A properties store with a well-defined iteration order.
///
/// By default keys iterate in the order they were first added, whether
/// through [`set`](Self::set) or by reading them top-to-bottom from a
/// properties document. A custom order is configured through
/// [`StoreBuilder`](crate::StoreBuilder).
///
/// Default-property chains are not supported.
///
/// The store does no internal locking. Guard a store shared between threads
/// behind a single lock if any of them mutates it.
///
/// # Null-like values
///
/// [`set_null`](Self::set_null) keeps a key with no value:
/// [`contains`](Self::contains) reports it, [`get`](Self::get) does not.
/// Such a key must be given a value or removed before the store is written.
#[derive(Clone)]
pub struct OrderedStore {
    map: OrderedMap,
    suppress_date: bool,
    xml_encoding: String,
}

impl OrderedStore {
    /// An empty store in insertion order that writes the date comment.
    pub fn new() -> Self {
        Self::from_parts(OrderedMap::new(), &StoreConfig::default())
    }

    pub(crate) fn from_parts(map: OrderedMap, config: &StoreConfig) -> Self {
        Self {
            map,
            suppress_date: config.suppress_date_in_comment,
            xml_encoding: config.xml_encoding.clone(),
        }
    }

    /// A store with the same entries and the same behavior as `source`.
    ///
    /// A custom comparator is shared with `source`, not duplicated.
    pub fn copy_of(source: &OrderedStore) -> Self {
        source.clone()
    }

    /// The comparator, or `None` for insertion order.
    pub fn comparator(&self) -> Option<&KeyComparator> {
        self.map.comparator()
    }

    /// Returns `true` if text output omits the date comment.
    pub fn suppresses_date(&self) -> bool {
        self.suppress_date
    }

    /// The settings this store was built with.
    pub fn config(&self) -> StoreConfig {
        StoreConfig {
            suppress_date_in_comment: self.suppress_date,
            xml_encoding: self.xml_encoding.clone(),
        }
    }

    // ---------------------------------------------------------------
    // Entry access
    // ---------------------------------------------------------------

    /// The value for `key`, or `None` if absent or null-like.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key)
    }

    /// The value for `key`, or `default` if absent or null-like.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Set `key` to `value`, returning the previous value.
    ///
    /// In insertion order an existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.map.insert(key, Some(value.into()))
    }

    /// Set `key` to a value that may be null-like.
    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<String>) -> Option<String> {
        self.map.insert(key, value)
    }

    /// Keep `key` with a null-like value, returning the previous value.
    pub fn set_null(&mut self, key: impl Into<String>) -> Option<String> {
        self.map.insert(key, None)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.map.remove(key)
    }

    /// Returns `true` if `key` is present, even with a null-like value.
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the store has no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Snapshot of the keys in store order.
    pub fn keys(&self) -> Vec<String> {
        self.map.keys().map(str::to_string).collect()
    }

    /// Snapshot of the entries in store order.
    pub fn entries(&self) -> Vec<(String, Option<String>)> {
        self.map
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    /// Borrowing iterator over the entries in store order.
    pub fn iter(&self) -> Iter<'_> {
        self.map.iter()
    }

    /// Unordered copy for code expecting a plain map.
    ///
    /// Keys with a null-like value are left out.
    pub fn to_hash_map(&self) -> HashMap<String, String> {
        self.map
            .iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), v.to_string())))
            .collect()
    }

    // ---------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------
    //
    // Entries are inserted as they are parsed. A failed load leaves the
    // entries read before the failure in the store.

    /// Read `.properties` text from an ISO-8859-1 byte stream.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<()> {
        EngineAdapter::load(&mut self.map, reader)?;
        Ok(())
    }

    /// Read `.properties` text from a UTF-8 character stream.
    pub fn load_chars<R: Read>(&mut self, reader: R) -> Result<()> {
        EngineAdapter::load_chars(&mut self.map, reader)?;
        Ok(())
    }

    /// Read `.properties` text from a string.
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        EngineAdapter::load_str(&mut self.map, text)?;
        Ok(())
    }

    /// Read an XML properties document.
    pub fn load_xml<R: Read>(&mut self, reader: R) -> Result<()> {
        EngineAdapter::load_xml(&mut self.map, reader)?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Storing
    // ---------------------------------------------------------------

    /// Write `.properties` text to a byte stream as ISO-8859-1, with
    /// characters outside printable ASCII written as `\uXXXX`.
    ///
    /// `comments` becomes a leading `#` comment block. Unless the date is
    /// suppressed, a `#<date>` line follows it.
    pub fn store<W: Write>(&self, out: W, comments: Option<&str>) -> Result<()> {
        self.store_text(Latin1Sink::new(out), comments, true)
    }

    /// Write `.properties` text to a character stream as UTF-8, without
    /// unicode escapes.
    pub fn store_chars<W: Write>(&self, out: W, comments: Option<&str>) -> Result<()> {
        self.store_text(Utf8Sink::new(out), comments, false)
    }

    /// Render `.properties` text into a string, without unicode escapes.
    pub fn store_to_string(&self, comments: Option<&str>) -> Result<String> {
        let mut text = String::new();
        self.store_text(&mut text, comments, false)?;
        Ok(text)
    }

    fn store_text<S: CharSink>(&self, mut sink: S, comments: Option<&str>, escape_unicode: bool) -> Result<()> {
        if self.suppress_date {
            let mut filtered = CommentFilteringWriter::new(sink);
            EngineAdapter::store(&self.map, &mut filtered, comments, escape_unicode)
        } else {
            EngineAdapter::store(&self.map, &mut sink, comments, escape_unicode)
        }
    }

    /// Write an XML properties document in the configured encoding
    /// (UTF-8 unless configured otherwise). The date is never written.
    pub fn store_xml<W: Write>(&self, out: W, comment: Option<&str>) -> Result<()> {
        self.store_xml_with_encoding(out, comment, &self.xml_encoding)
    }

    /// Write an XML properties document in `encoding`.
    pub fn store_xml_with_encoding<W: Write>(
        &self,
        out: W,
        comment: Option<&str>,
        encoding: &str,
    ) -> Result<()> {
        EngineAdapter::store_xml(&self.map, out, comment, encoding)
    }

    /// Write a diagnostic listing as UTF-8. Values longer than 40
    /// characters are truncated.
    pub fn list<W: Write>(&self, out: W) -> Result<()> {
        let mut sink = Utf8Sink::new(out);
        EngineAdapter::list(&self.map, &mut sink)?;
        debug!(entries = self.map.len(), "listed properties");
        Ok(())
    }
}

impl Default for OrderedStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Order-sensitive: equal stores hold equal entries in the same order.
impl PartialEq for OrderedStore {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl Eq for OrderedStore {}

impl Hash for OrderedStore {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

impl<'a> IntoIterator for &'a OrderedStore {
    type Item = (&'a str, Option<&'a str>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// `{k1=v1, k2=v2}` in store order; null-like values print as `null`.
impl fmt::Display for OrderedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={}", value.unwrap_or("null"))?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for OrderedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedStore")
            .field("entries", &self.map)
            .field("ordering", &self.comparator().map_or("insertion", |_| "comparator"))
            .field("suppress_date", &self.suppress_date)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StoreBuilder;
    use crate::error::StoreError;
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;
    use std::io;

    fn sample(store: &mut OrderedStore) {
        store.set("b", "222");
        store.set("c", "333");
        store.set("a", "111");
    }

    fn suppressed() -> OrderedStore {
        StoreBuilder::new().with_suppress_date_in_comment(true).build()
    }

    fn hash_of(store: &OrderedStore) -> u64 {
        let mut h = DefaultHasher::new();
        store.hash(&mut h);
        h.finish()
    }

    #[test]
    fn store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OrderedStore>();
    }

    #[test]
    fn insertion_order_preserved() {
        let mut store = OrderedStore::new();
        sample(&mut store);
        assert_eq!(store.keys(), vec!["b", "c", "a"]);
        assert_eq!(
            store.entries(),
            vec![
                ("b".to_string(), Some("222".to_string())),
                ("c".to_string(), Some("333".to_string())),
                ("a".to_string(), Some("111".to_string())),
            ]
        );
    }

    #[test]
    fn reset_keeps_position() {
        let mut store = OrderedStore::new();
        sample(&mut store);
        assert_eq!(store.set("b", "999").as_deref(), Some("222"));
        assert_eq!(store.keys(), vec!["b", "c", "a"]);
        assert_eq!(store.get("b"), Some("999"));
    }

    #[test]
    fn custom_ordering() {
        let mut store = StoreBuilder::new()
            .with_ordering(KeyComparator::natural())
            .build();
        sample(&mut store);
        assert_eq!(store.keys(), vec!["a", "b", "c"]);
        store.set("0", "zero");
        assert_eq!(store.keys(), vec!["0", "a", "b", "c"]);
    }

    #[test]
    fn get_with_default() {
        let mut store = OrderedStore::new();
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.get_or("missing", "d"), "d");
        store.set("k", "v");
        assert_eq!(store.get_or("k", "d"), "v");
    }

    #[test]
    fn set_opt_accepts_both_forms() {
        let mut store = OrderedStore::new();
        assert_eq!(store.set_opt("k", Some("v".into())), None);
        assert_eq!(store.get("k"), Some("v"));
        assert_eq!(store.set_opt("k", None).as_deref(), Some("v"));
        assert!(store.contains("k"));
        assert_eq!(store.get("k"), None);
        assert_eq!(store.set_opt("k", Some("w".into())), None);
        assert_eq!(store.keys(), vec!["k"]);
    }

    #[test]
    fn null_value_semantics() {
        let mut store = OrderedStore::new();
        store.set("k", "v");
        assert_eq!(store.set_null("k").as_deref(), Some("v"));
        assert!(store.contains("k"));
        assert_eq!(store.get("k"), None);
        assert_eq!(store.get_or("k", "d"), "d");
        assert_eq!(store.len(), 1);
        assert_eq!(store.remove("k"), None);
        assert!(!store.contains("k"));
        assert!(store.is_empty());
    }

    #[test]
    fn snapshots_are_independent() {
        let mut store = OrderedStore::new();
        sample(&mut store);
        let keys = store.keys();
        store.remove("c");
        store.set("d", "444");
        assert_eq!(keys, vec!["b", "c", "a"]);
        assert_eq!(store.keys(), vec!["b", "a", "d"]);
    }

    #[test]
    fn store_suppressed_without_comment() {
        let mut store = suppressed();
        sample(&mut store);
        assert_eq!(store.store_to_string(None).unwrap(), "b=222\nc=333\na=111\n");
    }

    #[test]
    fn store_suppressed_with_comment() {
        let mut store = suppressed();
        sample(&mut store);
        assert_eq!(
            store.store_to_string(Some("some comment")).unwrap(),
            "#some comment\nb=222\nc=333\na=111\n"
        );
    }

    #[test]
    fn store_suppressed_with_multiline_comment() {
        let mut store = suppressed();
        sample(&mut store);
        assert_eq!(
            store.store_to_string(Some("line1\nline2")).unwrap(),
            "#line1\n#line2\nb=222\nc=333\na=111\n"
        );
    }

    #[test]
    fn store_chars_suppressed_with_multiline_comment() {
        let mut store = suppressed();
        store.set("b", "222");
        store.set("k", "\u{263a}");
        let mut out = Vec::new();
        store.store_chars(&mut out, Some("line1\nline2")).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#line1\n#line2\nb=222\nk=\u{263a}\n"
        );
    }

    #[test]
    fn store_chars_writes_unescaped_utf8() {
        let mut store = OrderedStore::new();
        store.set("caf\u{e9}", "\u{263a} \u{1F600}");
        let mut out = Vec::new();
        store.store_chars(&mut out, None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("caf\u{e9}=\u{263a} \u{1F600}\n"));
        assert!(!text.contains("\\u"));

        let mut loaded = OrderedStore::new();
        loaded.load_chars(text.as_bytes()).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn store_suppressed_byte_stream() {
        let mut store = suppressed();
        store.set("k", "caf\u{e9}");
        let mut out = Vec::new();
        store.store(&mut out, Some("c")).unwrap();
        assert_eq!(out, b"#c\nk=caf\\u00E9\n");
    }

    #[test]
    fn store_with_date() {
        let mut store = OrderedStore::new();
        sample(&mut store);
        let text = store.store_to_string(None).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with('#'));
        assert!(text.ends_with("b=222\nc=333\na=111\n"));

        let text = store.store_to_string(Some("hello")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#hello");
        assert!(lines[1].starts_with('#') && lines[1].contains("UTC"));
        assert_eq!(&lines[2..], ["b=222", "c=333", "a=111"]);
    }

    #[test]
    fn load_text_in_order() {
        let mut store = OrderedStore::new();
        store.load("b=222\nc=333\na=111\n".as_bytes()).unwrap();
        assert_eq!(store.keys(), vec!["b", "c", "a"]);
        assert_eq!(store.get("b"), Some("222"));
        assert_eq!(store.get("c"), Some("333"));
        assert_eq!(store.get("a"), Some("111"));
    }

    #[test]
    fn load_chars_and_str() {
        let mut store = OrderedStore::new();
        store.load_chars("k=\u{263a}\n".as_bytes()).unwrap();
        store.load_str("j=1").unwrap();
        assert_eq!(store.keys(), vec!["k", "j"]);
        assert_eq!(store.get("k"), Some("\u{263a}"));
    }

    #[test]
    fn roundtrip_text() {
        for build in [StoreBuilder::new(), StoreBuilder::new().with_ordering(KeyComparator::natural())] {
            let mut store = build.build();
            sample(&mut store);
            store.set("spaced key", " v=1 ");
            store.set("unicode", "\u{e9}\u{263a}");
            let mut out = Vec::new();
            store.store(&mut out, Some("comment")).unwrap();

            let mut loaded = build.build();
            loaded.load(out.as_slice()).unwrap();
            assert_eq!(loaded, store);
            assert_eq!(loaded.entries(), store.entries());
        }
    }

    #[test]
    fn roundtrip_xml() {
        let mut store = OrderedStore::new();
        sample(&mut store);
        let mut out = Vec::new();
        store.store_xml(&mut out, Some("xml comment")).unwrap();
        let xml = String::from_utf8(out.clone()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n"));
        assert!(xml.contains("<comment>xml comment</comment>"));

        let mut loaded = OrderedStore::new();
        loaded.load_xml(out.as_slice()).unwrap();
        assert_eq!(loaded.keys(), vec!["b", "c", "a"]);
        assert_eq!(loaded, store);
    }

    #[test]
    fn xml_encoding_override() {
        let mut store = OrderedStore::new();
        store.set("k", "\u{e9}");
        let mut out = Vec::new();
        store
            .store_xml_with_encoding(&mut out, None, "ISO-8859-1")
            .unwrap();
        assert!(out.starts_with(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\""));
        assert!(out.contains(&0xE9));

        let err = store.store_xml_with_encoding(Vec::new(), None, "bogus").unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedEncoding(_)));
    }

    #[test]
    fn xml_is_never_date_filtered() {
        let mut store = suppressed();
        store.set("k", "v");
        let mut out = Vec::new();
        store.store_xml(&mut out, Some("keep me")).unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains("<comment>keep me</comment>"));
    }

    #[test]
    fn malformed_text_is_format_error() {
        let mut store = OrderedStore::new();
        let err = store.load_str("first=1\nbad=\\uXYZ1\n").unwrap_err();
        assert!(matches!(err, StoreError::Format(_)));
        assert_eq!(store.keys(), vec!["first"]);
    }

    #[test]
    fn malformed_xml_is_format_error() {
        let mut store = OrderedStore::new();
        let err = store.load_xml("<properties><entry key=\"a\">".as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::Format(_)));
    }

    #[test]
    fn io_errors_propagate() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }
        impl Write for Failing {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut store = OrderedStore::new();
        let err = store.load(Failing).unwrap_err();
        assert!(matches!(err, StoreError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));

        store.set("k", "v");
        let err = store.store(Failing, None).unwrap_err();
        assert!(matches!(err, StoreError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn null_value_cannot_be_stored() {
        let mut store = OrderedStore::new();
        store.set("a", "1");
        store.set_null("b");
        let err = store.store_to_string(None).unwrap_err();
        assert!(matches!(err, StoreError::NullValue { ref key } if key == "b"));
        let err = store.store_xml(Vec::new(), None).unwrap_err();
        assert!(matches!(err, StoreError::NullValue { .. }));
    }

    #[test]
    fn hash_map_export() {
        let mut store = OrderedStore::new();
        sample(&mut store);
        store.set_null("n");
        let map = store.to_hash_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("a").map(String::as_str), Some("111"));
        assert!(!map.contains_key("n"));
    }

    #[test]
    fn equality_and_hash_are_order_sensitive() {
        let mut a = OrderedStore::new();
        sample(&mut a);
        let mut b = OrderedStore::new();
        b.set("a", "111");
        b.set("b", "222");
        b.set("c", "333");
        assert_ne!(a, b);

        let c = OrderedStore::copy_of(&a);
        assert_eq!(a, c);
        assert_eq!(hash_of(&a), hash_of(&c));
    }

    #[test]
    fn copy_keeps_behavior() {
        let cmp = KeyComparator::reverse_natural();
        let mut source = StoreBuilder::new()
            .with_ordering(cmp.clone())
            .with_suppress_date_in_comment(true)
            .build();
        sample(&mut source);

        let mut copy = OrderedStore::copy_of(&source);
        assert!(copy.suppresses_date());
        assert!(copy.comparator().unwrap().ptr_eq(&cmp));
        copy.set("d", "444");
        assert_eq!(copy.keys(), vec!["d", "c", "b", "a"]);
        assert_eq!(source.keys(), vec!["c", "b", "a"]);
    }

    #[test]
    fn display_and_list() {
        let mut store = OrderedStore::new();
        store.set("b", "2");
        store.set_null("a");
        assert_eq!(store.to_string(), "{b=2, a=null}");

        store.set("long", "y".repeat(50));
        let mut out = Vec::new();
        store.list(&mut out).unwrap();
        let listing = String::from_utf8(out).unwrap();
        assert_eq!(
            listing,
            format!("-- listing properties --\nb=2\na=null\nlong={}...\n", "y".repeat(37))
        );
    }

    proptest! {
        #[test]
        fn text_roundtrip_preserves_sequence(
            entries in proptest::collection::vec(("[ -~\u{e9}\u{263a}]{1,12}", "[ -~\u{e9}\u{263a}\n\t]{0,16}"), 0..16)
        ) {
            let mut store = OrderedStore::new();
            for (k, v) in &entries {
                store.set(k.clone(), v.clone());
            }
            let mut out = Vec::new();
            store.store(&mut out, Some("generated")).unwrap();
            let mut loaded = OrderedStore::new();
            loaded.load(out.as_slice()).unwrap();
            prop_assert_eq!(loaded.entries(), store.entries());
        }
    }
}
