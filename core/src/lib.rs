//! Content-based song recommendations over a lyrics catalog.
//!
//! An [`Engine`] is built once from a CSV dataset (`artist`, `song`, `link`,
//! `text` columns). Construction normalizes the catalog, builds a unigram and
//! bigram vocabulary, and stores one L2-normalized TF-IDF vector per song.
//! Queries resolve a title (optionally with an artist) to a catalog row and
//! rank every other row by cosine similarity.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod ranker;
pub mod resolver;
pub mod tokenizer;
pub mod vocab;

pub use catalog::{Catalog, CatalogEntry};
pub use engine::{BuildOptions, Engine, EngineStats};
pub use error::{Error, Result};
pub use ranker::{Recommendation, RecommendationResult};
pub use resolver::QueryResolution;

/// Row position of an entry in the catalog, in original input order.
pub type RowId = usize;
pub type TermId = u32;
