/// Normalize text into index terms: split on whitespace, lower-case, and
/// drop pieces containing control characters. No stemming, no stop words,
/// no de-duplication; term frequency is preserved for the BM25 statistics.
///
/// The same function is used for corpus documents and for queries. Scores
/// are only meaningful when both sides go through identical normalization.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|piece| piece.chars().all(|c| !c.is_control()))
        .map(|piece| piece.to_lowercase())
        .collect()
}
