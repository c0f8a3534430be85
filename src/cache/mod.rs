//! Persistent answer caching keyed by a digest of the query text.

pub mod answer_store;

pub use answer_store::{cache_key, AnswerStore, JsonFileStore};
