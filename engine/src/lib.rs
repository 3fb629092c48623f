//! In-memory boolean and positional text indexing.
//!
//! A corpus of raw documents runs through the analysis pipeline (normalize,
//! filter, stem) into a pair of frozen indexes, which then answer boolean
//! term-algebra queries (`cat AND sat NOT dog`) and proximity queries
//! (`cat sat / 2`). Everything after the build barrier is read-only.

pub mod analyze;
pub mod doc_id;
pub mod index;
pub mod query;

pub use analyze::{Analyzer, EnglishStemmer, Stem, StopwordSet};
pub use doc_id::DocId;
pub use index::{IndexBuilder, Indexes, InvertedIndex, PositionalIndex};
pub use query::{
    evaluate_boolean, evaluate_proximity, parse, parse_proximity, process_query,
    MatchedPositions, ParsedQuery, QueryError, QueryResult,
};
