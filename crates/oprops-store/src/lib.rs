//! # oprops-store
//!
//! Ordered properties: a `.properties` store whose keys iterate in insertion
//! order or in a caller-supplied order, with text and XML persistence and an
//! option to leave the timestamp comment out of text output.
//!
//! ```
//! use oprops_store::StoreBuilder;
//!
//! let mut store = StoreBuilder::new()
//!     .with_suppress_date_in_comment(true)
//!     .build();
//! store.set("b", "222");
//! store.set("a", "111");
//! assert_eq!(store.store_to_string(None).unwrap(), "b=222\na=111\n");
//! ```
//!
//! # Architecture
//!
//! - [`store`]: [`OrderedStore`], the store itself
//! - [`builder`]: [`StoreBuilder`], ordering and date behavior
//! - [`filter`]: [`CommentFilteringWriter`], drops the timestamp comment line
//! - [`config`]: [`StoreConfig`], serializable settings
//! - [`persist`]: JSON persisted form
//! - [`error`]: error types
//!
//! Parsing and formatting live in `oprops-engine`; the entry container lives
//! in `oprops-map`.

mod adapter;
pub mod builder;
pub mod config;
pub mod error;
pub mod filter;
pub mod persist;
pub mod store;

pub use builder::StoreBuilder;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use filter::CommentFilteringWriter;
pub use oprops_map::KeyComparator;
pub use store::OrderedStore;
