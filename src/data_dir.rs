use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Handle to the directory holding the persisted artifacts: the document
/// catalog, the BM25 index blob, and the corpus metadata. Passing the handle
/// around (rather than a module-wide path) lets tests run against isolated
/// directories.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the data directory from, in order of priority:
    /// 1. An explicit path (from --data-dir)
    /// 2. The FILEBRAIN_DATA_DIR environment variable
    /// 3. The XDG data directory (~/.local/share/filebrain/)
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var("FILEBRAIN_DATA_DIR") {
            PathBuf::from(val)
        } else {
            xdg::BaseDirectories::with_prefix("filebrain")
                .get_data_home()
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// One crawl's worth of FileRecords, overwritten wholesale per crawl.
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join("documents.json")
    }

    /// The persisted BM25 model.
    pub fn index_path(&self) -> PathBuf {
        self.root.join("bm25_index.json")
    }

    /// CorpusEntry sequence, positionally parallel to the index.
    pub fn metadata_path(&self) -> PathBuf {
        self.root.join("bm25_metadata.json")
    }
}
