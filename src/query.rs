use std::cmp::Ordering;

use serde::Serialize;

use crate::{
    bm25::Bm25Model,
    data_dir::DataDir,
    error::Result,
    indexer::CorpusEntry,
    storage,
    tokenize::tokenize,
};

/// Words that signal "most recent" intent and trigger the recency override.
const RECENCY_TERMS: &[&str] = &["latest", "recent", "newest"];

#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub k: usize,
    pub recency_boost: bool,
}

/// A ranked hit: corpus metadata plus its BM25 score. Transient, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub score: f64,
    #[serde(flatten)]
    pub entry: CorpusEntry,
}

/// Score the query against the persisted index and return the top-k hits.
///
/// Ranking is by BM25 score descending with ties kept in corpus order
/// (stable sort), so repeated searches over an unchanged index are
/// deterministic. When the query expresses recency intent and the boost is
/// enabled, the already-selected top-k subset is re-sorted by modification
/// time; the reported scores stay the pre-override BM25 scores.
pub fn search(
    data_dir: &DataDir,
    params: &SearchParams,
) -> Result<Vec<QueryResult>> {
    let model: Bm25Model =
        storage::read_json(&data_dir.index_path(), "BM25 index")?;
    let metadata: Vec<CorpusEntry> =
        storage::read_json(&data_dir.metadata_path(), "index metadata")?;

    let tokens = tokenize(&params.query);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let scores = model.scores(&tokens);
    let mut ranked: Vec<QueryResult> = metadata
        .into_iter()
        .zip(scores)
        .map(|(entry, score)| QueryResult { score, entry })
        .collect();

    ranked.retain(|r| r.score > 0.0);
    ranked.sort_by(|a, b| {
        b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
    });
    ranked.truncate(params.k);

    if params.recency_boost && wants_recent(&params.query) {
        ranked.sort_by(|a, b| {
            b.entry.record.modified_at.cmp(&a.entry.record.modified_at)
        });
    }

    Ok(ranked)
}

fn wants_recent(query: &str) -> bool {
    let lower = query.to_lowercase();
    RECENCY_TERMS.iter().any(|term| lower.contains(term))
}

/// Human-readable result listing in the style of the `find` command.
pub fn format_human(results: &[QueryResult], elapsed_ms: f64) {
    if results.is_empty() {
        println!("No matches. Completed in {elapsed_ms:.2} ms.");
        return;
    }

    println!("Results ({} docs) in {elapsed_ms:.2} ms", results.len());
    for (i, r) in results.iter().enumerate() {
        println!(
            "{}. {}  (score={:.3})",
            i + 1,
            r.entry.record.basename,
            r.score
        );
        println!("   path: {}", r.entry.record.path);
        println!("   modified: {}", r.entry.record.modified_at);
        println!();
    }
}

/// JSON result listing for scripting.
pub fn format_json(results: &[QueryResult], query: &str) -> Result<()> {
    let payload = serde_json::json!({
        "query": query,
        "result_count": results.len(),
        "results": results,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bm25::Bm25Params,
        crawler::FileRecord,
        error::Error,
        indexer::{build_index, write_catalog},
    };

    fn record(path: &std::path::Path, modified_at: &str) -> FileRecord {
        FileRecord {
            path: path.to_string_lossy().to_string(),
            basename: path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .to_string(),
            extension: ".txt".to_string(),
            size_bytes: 0,
            modified_at: modified_at.to_string(),
            created_at: modified_at.to_string(),
            accessed_at: modified_at.to_string(),
        }
    }

    /// Two-document fixture: A is older, B is newer and has a
    /// higher "apple" term frequency.
    fn fixture() -> (tempfile::TempDir, DataDir) {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("A.txt");
        let b = tmp.path().join("B.txt");
        std::fs::write(&a, "apple banana").unwrap();
        std::fs::write(&b, "apple apple cherry").unwrap();

        let data_dir =
            DataDir::resolve(Some(&tmp.path().join("data"))).unwrap();
        write_catalog(
            &data_dir,
            &[
                record(&a, "2024-01-01T00:00:00"),
                record(&b, "2024-06-01T00:00:00"),
            ],
        )
        .unwrap();
        build_index(&data_dir, None, Bm25Params::default()).unwrap();
        (tmp, data_dir)
    }

    fn params(query: &str) -> SearchParams {
        SearchParams {
            query: query.to_string(),
            k: 25,
            recency_boost: true,
        }
    }

    #[test]
    fn search_before_index_is_a_missing_prerequisite() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = DataDir::resolve(Some(tmp.path())).unwrap();
        let err = search(&data_dir, &params("apple")).unwrap_err();
        assert!(matches!(err, Error::MissingPrerequisite { .. }));
    }

    #[test]
    fn empty_query_returns_empty_list() {
        let (_tmp, data_dir) = fixture();
        assert!(search(&data_dir, &params("")).unwrap().is_empty());
        assert!(search(&data_dir, &params("  \t ")).unwrap().is_empty());
    }

    #[test]
    fn unmatched_query_returns_empty_list() {
        let (_tmp, data_dir) = fixture();
        assert!(search(&data_dir, &params("zeppelin")).unwrap().is_empty());
    }

    #[test]
    fn term_frequency_drives_ranking() {
        let (_tmp, data_dir) = fixture();
        let results = search(&data_dir, &params("apple")).unwrap();
        assert_eq!(results.len(), 2);
        // B has "apple" twice and ranks at least as high as A.
        assert_eq!(results[0].entry.record.basename, "B.txt");
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn recency_intent_reorders_by_modified_time() {
        let (_tmp, data_dir) = fixture();
        let results = search(&data_dir, &params("latest apple")).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.record.modified_at, "2024-06-01T00:00:00");
        assert_eq!(results[1].entry.record.modified_at, "2024-01-01T00:00:00");
        // Scores stay the pre-override BM25 values.
        assert!(results.iter().all(|r| r.score > 0.0));
    }

    #[test]
    fn recency_boost_can_be_disabled() {
        let (_tmp, data_dir) = fixture();
        let mut p = params("newest banana");
        p.recency_boost = false;
        let results = search(&data_dir, &p).unwrap();
        // Only A contains "banana"; without the boost nothing re-sorts and
        // relevance alone decides.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.record.basename, "A.txt");
    }

    #[test]
    fn k_limits_result_count() {
        let (_tmp, data_dir) = fixture();
        let mut p = params("apple");
        p.k = 1;
        let results = search(&data_dir, &p).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn repeated_searches_are_stable() {
        let (_tmp, data_dir) = fixture();
        let mut p = params("apple cherry");
        p.recency_boost = false;

        let first = search(&data_dir, &p).unwrap();
        let second = search(&data_dir, &p).unwrap();
        let key = |rs: &[QueryResult]| {
            rs.iter()
                .map(|r| (r.entry.record.path.clone(), r.score))
                .collect::<Vec<_>>()
        };
        assert_eq!(key(&first), key(&second));
    }

    #[test]
    fn recency_words_match_case_insensitively() {
        assert!(wants_recent("LATEST invoice"));
        assert!(wants_recent("most recent tax form"));
        assert!(!wants_recent("later alligator"));
    }
}
