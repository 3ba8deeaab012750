use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{artifact} missing; run `filebrain index` first")]
    MissingPrerequisite { artifact: &'static str },

    #[error("no documents with text content to index")]
    EmptyCorpus,

    #[error("data directory does not exist and could not be created: {0}")]
    DataDir(PathBuf),
}
