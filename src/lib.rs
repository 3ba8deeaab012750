//! filebrain - local BM25 keyword search over your own files.
//!
//! filebrain crawls a set of directories, extracts best-effort plain text
//! from what it finds (plain text, Markdown, reStructuredText, DOCX, PDF,
//! optionally OCR-scanned PDF), and serves ranked keyword search over the
//! result with a BM25 relevance model. Indexing and search are two
//! independent phases sharing three persisted artifacts: a document
//! catalog, the BM25 index blob, and a metadata sequence positionally
//! aligned with the index.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use filebrain::{
//!     Bm25Params, DataDir, IgnoreSet, SearchParams, crawler, indexer, query,
//! };
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//!
//! // Offline phase: crawl and build.
//! let roots = vec![PathBuf::from("/home/me/Documents")];
//! let records =
//!     crawler::discover(&roots, &IgnoreSet::default(), None).unwrap();
//! indexer::write_catalog(&data_dir, &records).unwrap();
//! indexer::build_index(&data_dir, None, Bm25Params::default()).unwrap();
//!
//! // Online phase: query.
//! let params = SearchParams {
//!     query: "latest tax form".to_string(),
//!     k: 25,
//!     recency_boost: true,
//! };
//! for hit in query::search(&data_dir, &params).unwrap() {
//!     println!("{} (score: {:.3})", hit.entry.record.path, hit.score);
//! }
//! ```

pub mod bm25;
pub mod cli;
pub mod crawler;
pub mod data_dir;
pub mod error;
pub mod extract;
pub mod ignore;
pub mod indexer;
pub mod query;
pub mod storage;
pub mod tokenize;

pub use bm25::{Bm25Model, Bm25Params};
pub use crawler::FileRecord;
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use extract::OcrBackend;
pub use ignore::IgnoreSet;
pub use indexer::CorpusEntry;
pub use query::{QueryResult, SearchParams};
