use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    bm25::{Bm25Model, Bm25Params},
    crawler::FileRecord,
    data_dir::DataDir,
    error::{Error, Result},
    extract::{OcrBackend, extract},
    storage,
    tokenize::tokenize,
};

/// A FileRecord that survived extraction and tokenization, enriched with
/// its term count. Position `i` of the persisted metadata sequence always
/// describes the document at position `i` of the BM25 corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    #[serde(flatten)]
    pub record: FileRecord,
    pub num_terms: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexStats {
    pub documents: usize,
    pub total_terms: u64,
}

/// Persist one crawl's catalog, replacing the previous one wholesale.
pub fn write_catalog(data_dir: &DataDir, records: &[FileRecord]) -> Result<()> {
    storage::write_json_atomic(&data_dir.catalog_path(), records)
}

/// Build the BM25 index and its parallel metadata from the persisted
/// catalog, replacing both artifacts atomically.
///
/// Documents yielding no usable text are dropped from the corpus; the
/// metadata sequence is therefore a strict, order-preserving subset of the
/// catalog. Fails with `MissingPrerequisite` when no catalog exists and
/// `EmptyCorpus` when nothing survives extraction, leaving any prior index
/// untouched in both cases.
pub fn build_index(
    data_dir: &DataDir,
    ocr: Option<&dyn OcrBackend>,
    params: Bm25Params,
) -> Result<IndexStats> {
    let catalog: Vec<FileRecord> =
        storage::read_json(&data_dir.catalog_path(), "document catalog")?;

    // Extraction dominates build time; fan it out while keeping catalog
    // order (indexed parallel map collects in input order).
    let tokenized: Vec<Vec<String>> = catalog
        .par_iter()
        .map(|record| {
            let text = extract(Path::new(&record.path), ocr);
            if text.trim().is_empty() {
                Vec::new()
            } else {
                tokenize(&text)
            }
        })
        .collect();

    let mut corpus: Vec<Vec<String>> = Vec::new();
    let mut metadata: Vec<CorpusEntry> = Vec::new();
    for (record, tokens) in catalog.into_iter().zip(tokenized) {
        if tokens.is_empty() {
            continue;
        }
        metadata.push(CorpusEntry {
            num_terms: tokens.len(),
            record,
        });
        corpus.push(tokens);
    }

    if corpus.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    let total_terms: u64 =
        corpus.iter().map(|tokens| tokens.len() as u64).sum();
    let model = Bm25Model::build(&corpus, params);

    storage::write_json_atomic(&data_dir.index_path(), &model)?;
    storage::write_json_atomic(&data_dir.metadata_path(), &metadata)?;

    info!(
        "built BM25 index over {} documents ({} tokens)",
        metadata.len(),
        total_terms
    );
    Ok(IndexStats {
        documents: metadata.len(),
        total_terms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{crawler::discover, ignore::IgnoreSet};

    fn data_dir_at(tmp: &tempfile::TempDir) -> DataDir {
        DataDir::resolve(Some(&tmp.path().join("data"))).unwrap()
    }

    fn crawl_into(data_dir: &DataDir, root: &Path) {
        let records =
            discover(&[root.to_path_buf()], &IgnoreSet::default(), None)
                .unwrap();
        write_catalog(data_dir, &records).unwrap();
    }

    #[test]
    fn missing_catalog_is_a_missing_prerequisite() {
        let tmp = tempfile::tempdir().unwrap();
        let err = build_index(&data_dir_at(&tmp), None, Bm25Params::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingPrerequisite { .. }));
    }

    #[test]
    fn builds_index_and_aligned_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        std::fs::write(docs.join("a.txt"), "apple banana").unwrap();
        std::fs::write(docs.join("b.txt"), "apple apple cherry").unwrap();

        let data_dir = data_dir_at(&tmp);
        crawl_into(&data_dir, &docs);
        let stats =
            build_index(&data_dir, None, Bm25Params::default()).unwrap();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.total_terms, 5);

        let metadata: Vec<CorpusEntry> =
            storage::read_json(&data_dir.metadata_path(), "metadata").unwrap();
        assert_eq!(metadata.len(), 2);
        // Catalog order is file-name order, and num_terms tracks each doc.
        assert_eq!(metadata[0].record.basename, "a.txt");
        assert_eq!(metadata[0].num_terms, 2);
        assert_eq!(metadata[1].record.basename, "b.txt");
        assert_eq!(metadata[1].num_terms, 3);
    }

    #[test]
    fn documents_without_text_are_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        std::fs::write(docs.join("readable.txt"), "some words here").unwrap();
        std::fs::write(docs.join("blank.txt"), "   \n\t ").unwrap();
        std::fs::write(docs.join("image.png"), [0x89, 0x50]).unwrap();
        // A PDF with no text layer and no OCR backend requested.
        std::fs::write(docs.join("scan.pdf"), "%PDF-1.4 garbage").unwrap();

        let data_dir = data_dir_at(&tmp);
        crawl_into(&data_dir, &docs);
        let stats =
            build_index(&data_dir, None, Bm25Params::default()).unwrap();
        assert_eq!(stats.documents, 1);

        let metadata: Vec<CorpusEntry> =
            storage::read_json(&data_dir.metadata_path(), "metadata").unwrap();
        assert_eq!(metadata[0].record.basename, "readable.txt");
    }

    #[test]
    fn empty_corpus_is_fatal_and_preserves_prior_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        std::fs::write(docs.join("good.txt"), "indexable words").unwrap();

        let data_dir = data_dir_at(&tmp);
        crawl_into(&data_dir, &docs);
        build_index(&data_dir, None, Bm25Params::default()).unwrap();

        // Re-crawl a tree with nothing extractable.
        let empty = tmp.path().join("empty");
        std::fs::create_dir(&empty).unwrap();
        std::fs::write(empty.join("image.png"), [0u8]).unwrap();
        crawl_into(&data_dir, &empty);

        let err = build_index(&data_dir, None, Bm25Params::default())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));

        // The previous index is still loadable and still has one document.
        let model: Bm25Model =
            storage::read_json(&data_dir.index_path(), "index").unwrap();
        assert_eq!(model.doc_count(), 1);
    }
}
