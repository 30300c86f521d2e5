use oprops_engine::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Serializable store settings.
///
/// The key ordering is not part of the configuration: a comparator is code,
/// so it is supplied through [`StoreBuilder::with_ordering`](crate::StoreBuilder::with_ordering).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Omit the timestamp comment line when storing text.
    pub suppress_date_in_comment: bool,
    /// Encoding used by [`OrderedStore::store_xml`](crate::OrderedStore::store_xml).
    pub xml_encoding: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            suppress_date_in_comment: false,
            xml_encoding: Encoding::Utf8.label().to_string(),
        }
    }
}

impl StoreConfig {
    /// Reject settings no store could use.
    pub fn validate(&self) -> Result<()> {
        Encoding::from_label(&self.xml_encoding)
            .map(|_| ())
            .map_err(|_| StoreError::UnsupportedEncoding(self.xml_encoding.clone()))
    }
}
