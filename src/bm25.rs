use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// BM25 free parameters. Conventional defaults; overridable from the CLI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// A BM25 model over a fixed corpus, persisted as the index blob.
///
/// Scores are reported positionally: `scores()[i]` belongs to the document
/// that occupied position `i` of the corpus passed to `build`. Callers pair
/// them with metadata kept in the same order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bm25Model {
    params: Bm25Params,
    doc_lens: Vec<u32>,
    avg_doc_len: f64,
    /// term -> (corpus position, term frequency), positions ascending.
    postings: HashMap<String, Vec<(u32, u32)>>,
}

impl Bm25Model {
    pub fn build(corpus: &[Vec<String>], params: Bm25Params) -> Self {
        let doc_lens: Vec<u32> =
            corpus.iter().map(|tokens| tokens.len() as u32).collect();
        let total: u64 = doc_lens.iter().map(|&len| len as u64).sum();
        let avg_doc_len = if corpus.is_empty() {
            0.0
        } else {
            total as f64 / corpus.len() as f64
        };

        let mut postings: HashMap<String, Vec<(u32, u32)>> = HashMap::new();
        for (pos, tokens) in corpus.iter().enumerate() {
            let mut freqs: HashMap<&str, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for (term, tf) in freqs {
                postings
                    .entry(term.to_string())
                    .or_default()
                    .push((pos as u32, tf));
            }
        }
        for list in postings.values_mut() {
            list.sort_unstable_by_key(|&(pos, _)| pos);
        }

        Self {
            params,
            doc_lens,
            avg_doc_len,
            postings,
        }
    }

    pub fn doc_count(&self) -> usize {
        self.doc_lens.len()
    }

    /// Score every corpus position against `query_tokens`, returning one
    /// value per position in corpus order. Terms absent from the corpus
    /// contribute nothing; repeated query terms contribute once per
    /// occurrence, matching the standard formulation.
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f64> {
        let n = self.doc_lens.len();
        let mut scores = vec![0.0; n];
        if n == 0 {
            return scores;
        }

        let Bm25Params { k1, b } = self.params;
        for term in query_tokens {
            let Some(list) = self.postings.get(term) else {
                continue;
            };
            let df = list.len() as f64;
            let idf = ((n as f64 - df + 0.5) / (df + 0.5) + 1.0).ln();
            for &(pos, tf) in list {
                let tf = tf as f64;
                let len_norm = 1.0 - b
                    + b * self.doc_lens[pos as usize] as f64 / self.avg_doc_len;
                scores[pos as usize] +=
                    idf * tf * (k1 + 1.0) / (tf + k1 * len_norm);
            }
        }
        scores
    }
}
