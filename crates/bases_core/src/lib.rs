//! Core data model for base rendering: attribute values, records, the corpus,
//! property-path resolution and the parsed base definition.

pub mod corpus;
pub mod definition;
pub mod error;
pub mod path;
pub mod record;
pub mod value;

pub use corpus::{Corpus, CorpusProvider};
pub use definition::{
    BaseDefinition, Condition, Filter, MarkerStyle, PropertyConfig, RowHeight, SortDirection,
    SortRule, View, ViewKind, DEFAULT_ORDER_PATH,
};
pub use error::CorpusError;
pub use path::{resolve_path, select, split_namespace, Namespace};
pub use record::{FileInfo, Record};
pub use value::{parse_date, parse_iso_date, DateValue, Value};
